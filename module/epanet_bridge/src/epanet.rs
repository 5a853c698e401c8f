// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Binding to the EPANET 2.2 toolkit library (`epanet2`).

use libc::{c_char, c_float, c_int, c_long};

use std::ffi::CString;

use crate::toolkit::{Toolkit, MAX_ID_LEN};

const UNDEFINED_NODE: i32 = 240;
const UNDEFINED_LINK: i32 = 241;
const CANNOT_OPEN_INPUT: i32 = 302;

#[link(name = "epanet2")]
extern "system" {
    fn ENopen(inp_file: *const c_char, rpt_file: *const c_char, out_file: *const c_char) -> c_int;
    fn ENclose() -> c_int;

    fn ENopenH() -> c_int;
    fn ENinitH(init_flag: c_int) -> c_int;
    fn ENrunH(current_time: *mut c_long) -> c_int;
    fn ENnextH(t_step: *mut c_long) -> c_int;
    fn ENcloseH() -> c_int;

    fn ENopenQ() -> c_int;
    fn ENinitQ(save_flag: c_int) -> c_int;
    fn ENrunQ(current_time: *mut c_long) -> c_int;
    fn ENcloseQ() -> c_int;

    fn ENgetqualtype(qual_type: *mut c_int, trace_node: *mut c_int) -> c_int;

    fn ENgetnodeindex(id: *const c_char, index: *mut c_int) -> c_int;
    fn ENgetlinkindex(id: *const c_char, index: *mut c_int) -> c_int;

    fn ENgetnodevalue(index: c_int, property: c_int, value: *mut c_float) -> c_int;
    fn ENsetnodevalue(index: c_int, property: c_int, value: c_float) -> c_int;
    fn ENgetlinkvalue(index: c_int, property: c_int, value: *mut c_float) -> c_int;
    fn ENsetlinkvalue(index: c_int, property: c_int, value: c_float) -> c_int;
    fn ENgetpatternvalue(index: c_int, period: c_int, value: *mut c_float) -> c_int;
    fn ENsetpatternvalue(index: c_int, period: c_int, value: c_float) -> c_int;
}

/// The process-wide EPANET project of the legacy toolkit API. Only one
/// instance should be in use at a time.
#[derive(Debug, Default)]
pub struct EpanetToolkit;

fn element_id(id: &str) -> Option<CString> {
    let mut end = id.len().min(MAX_ID_LEN);
    while !id.is_char_boundary(end) {
        end -= 1;
    }
    CString::new(&id[..end]).ok()
}

impl Toolkit for EpanetToolkit {
    fn open(&mut self, inp_file: &str, rpt_file: &str, out_file: &str) -> i32 {
        let (inp, rpt, out) = match (CString::new(inp_file), CString::new(rpt_file), CString::new(out_file)) {
            (Ok(inp), Ok(rpt), Ok(out)) => (inp, rpt, out),
            _ => return CANNOT_OPEN_INPUT,
        };
        unsafe { ENopen(inp.as_ptr(), rpt.as_ptr(), out.as_ptr()) }
    }

    fn close(&mut self) -> i32 {
        unsafe { ENclose() }
    }

    fn open_h(&mut self) -> i32 {
        unsafe { ENopenH() }
    }

    fn init_h(&mut self, flag: i32) -> i32 {
        unsafe { ENinitH(flag) }
    }

    fn run_h(&mut self) -> (i32, i64) {
        let mut t: c_long = 0;
        let code = unsafe { ENrunH(&mut t) };
        (code, t as i64)
    }

    fn next_h(&mut self) -> (i32, i64) {
        let mut step: c_long = 0;
        let code = unsafe { ENnextH(&mut step) };
        (code, step as i64)
    }

    fn close_h(&mut self) -> i32 {
        unsafe { ENcloseH() }
    }

    fn open_q(&mut self) -> i32 {
        unsafe { ENopenQ() }
    }

    fn init_q(&mut self, flag: i32) -> i32 {
        unsafe { ENinitQ(flag) }
    }

    fn run_q(&mut self) -> (i32, i64) {
        let mut t: c_long = 0;
        let code = unsafe { ENrunQ(&mut t) };
        (code, t as i64)
    }

    fn close_q(&mut self) -> i32 {
        unsafe { ENcloseQ() }
    }

    fn get_qual_type(&self) -> (i32, i32, i32) {
        let mut qual_type: c_int = 0;
        let mut trace_node: c_int = 0;
        let code = unsafe { ENgetqualtype(&mut qual_type, &mut trace_node) };
        (code, qual_type, trace_node)
    }

    fn get_node_index(&self, id: &str) -> (i32, i32) {
        let id = match element_id(id) {
            Some(id) => id,
            None => return (UNDEFINED_NODE, 0),
        };
        let mut index: c_int = 0;
        let code = unsafe { ENgetnodeindex(id.as_ptr(), &mut index) };
        (code, index)
    }

    fn get_link_index(&self, id: &str) -> (i32, i32) {
        let id = match element_id(id) {
            Some(id) => id,
            None => return (UNDEFINED_LINK, 0),
        };
        let mut index: c_int = 0;
        let code = unsafe { ENgetlinkindex(id.as_ptr(), &mut index) };
        (code, index)
    }

    fn get_node_value(&self, index: i32, property: i32) -> (i32, f32) {
        let mut value: c_float = 0.0;
        let code = unsafe { ENgetnodevalue(index, property, &mut value) };
        (code, value)
    }

    fn set_node_value(&mut self, index: i32, property: i32, value: f32) -> i32 {
        unsafe { ENsetnodevalue(index, property, value) }
    }

    fn get_link_value(&self, index: i32, property: i32) -> (i32, f32) {
        let mut value: c_float = 0.0;
        let code = unsafe { ENgetlinkvalue(index, property, &mut value) };
        (code, value)
    }

    fn set_link_value(&mut self, index: i32, property: i32, value: f32) -> i32 {
        unsafe { ENsetlinkvalue(index, property, value) }
    }

    fn get_pattern_value(&self, index: i32, period: i32) -> (i32, f32) {
        let mut value: c_float = 0.0;
        let code = unsafe { ENgetpatternvalue(index, period, &mut value) };
        (code, value)
    }

    fn set_pattern_value(&mut self, index: i32, period: i32, value: f32) -> i32 {
        unsafe { ENsetpatternvalue(index, period, value) }
    }
}
