// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Raw hydraulic toolkit seam.
//!
//! The calls mirror the EPANET 2.2 legacy toolkit: every operation returns
//! the engine's integer status code (0 on success), values travel as `f32`
//! and simulation clock values as seconds.

/// Node property codes.
pub mod node {
    pub const BASEDEMAND: i32 = 1;
    pub const EMITTER: i32 = 3;
    pub const TANKLEVEL: i32 = 8;
    pub const DEMAND: i32 = 9;
    pub const HEAD: i32 = 10;
    pub const PRESSURE: i32 = 11;
    pub const QUALITY: i32 = 12;
}

/// Link property codes.
pub mod link {
    pub const FLOW: i32 = 8;
    pub const VELOCITY: i32 = 9;
    pub const HEADLOSS: i32 = 10;
    pub const STATUS: i32 = 11;
    pub const SETTING: i32 = 12;
    pub const QUALITY: i32 = 14;
}

/// Longest element ID the engine stores.
pub const MAX_ID_LEN: usize = 31;

/// `init_h` flag: do not save hydraulics to file.
pub const INIT_NO_SAVE: i32 = 0;

/// Water quality analysis kinds as reported by `get_qual_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityType {
    None,
    Chemical,
    Age,
    Trace,
}

impl QualityType {
    pub fn from_code(code: i32) -> QualityType {
        match code {
            1 => QualityType::Chemical,
            2 => QualityType::Age,
            3 => QualityType::Trace,
            _ => QualityType::None,
        }
    }
}

pub trait Toolkit: Send {
    fn open(&mut self, inp_file: &str, rpt_file: &str, out_file: &str) -> i32;
    fn close(&mut self) -> i32;

    fn open_h(&mut self) -> i32;
    fn init_h(&mut self, flag: i32) -> i32;
    /// Solves hydraulics at the current time, returned with the status.
    fn run_h(&mut self) -> (i32, i64);
    /// Advances the clock, returning the step taken (0 when the run is over).
    fn next_h(&mut self) -> (i32, i64);
    fn close_h(&mut self) -> i32;

    fn open_q(&mut self) -> i32;
    fn init_q(&mut self, flag: i32) -> i32;
    fn run_q(&mut self) -> (i32, i64);
    fn close_q(&mut self) -> i32;

    /// Status, quality analysis code and trace node index.
    fn get_qual_type(&self) -> (i32, i32, i32);

    fn get_node_index(&self, id: &str) -> (i32, i32);
    fn get_link_index(&self, id: &str) -> (i32, i32);

    fn get_node_value(&self, index: i32, property: i32) -> (i32, f32);
    fn set_node_value(&mut self, index: i32, property: i32, value: f32) -> i32;
    fn get_link_value(&self, index: i32, property: i32) -> (i32, f32);
    fn set_link_value(&mut self, index: i32, property: i32, value: f32) -> i32;
    fn get_pattern_value(&self, index: i32, period: i32) -> (i32, f32);
    fn set_pattern_value(&mut self, index: i32, period: i32, value: f32) -> i32;
}
