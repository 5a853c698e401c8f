// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

pub mod buffer;
pub mod interface;
pub use xf_base::{errors, types};

#[doc(hidden)]
pub use once_cell::sync::Lazy;

use std::panic::{self, AssertUnwindSafe};
use std::slice;
use std::sync::{Mutex, PoisonError};

use buffer::{pointer_to_slot, ErrorBuffer};
use interface::XfIf;
use xf_base::errors::XfError;
use xf_base::types::{XfMethod, XfStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
}

/// Owns a module and drives it through the protocol phases.
pub struct XfSession<M: XfIf> {
    module: M,
    state: SessionState,
    errors: ErrorBuffer,
}

impl<M: XfIf> XfSession<M> {
    pub fn new(module: M) -> XfSession<M> {
        XfSession {
            module,
            state: SessionState::Uninitialized,
            errors: ErrorBuffer::new(),
        }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Text of the last failure.
    pub fn last_error(&self) -> &str {
        self.errors.as_str()
    }

    /// Runs one protocol call. On `FailureWithMessage` the address of the
    /// message is stored in `outargs[0]`.
    pub fn call(&mut self, method: i32, inargs: &[f64], outargs: &mut [f64]) -> XfStatus {
        let method = match XfMethod::try_from(method) {
            Ok(method) => method,
            Err(code) => {
                self.errors.set(&XfError::UnknownMethod(code).to_string());
                return XfStatus::Failure;
            }
        };

        let result = match method {
            XfMethod::Initialize => self.initialize(),
            XfMethod::Calculate => self.calculate(inargs, outargs),
            XfMethod::ReportVersion => {
                if let Some(slot) = outargs.first_mut() {
                    *slot = self.module.version();
                }
                Ok(())
            }
            XfMethod::ReportArguments => self.report_arguments(outargs),
            XfMethod::Cleanup => {
                self.module.cleanup();
                self.state = SessionState::Uninitialized;
                Ok(())
            }
        };

        match result {
            Ok(()) => XfStatus::Success,
            Err(err) => {
                let msg = self.errors.set(&err.to_string());
                if let Some(slot) = outargs.first_mut() {
                    *slot = pointer_to_slot(msg);
                }
                XfStatus::FailureWithMessage
            }
        }
    }

    fn initialize(&mut self) -> Result<(), XfError> {
        match self.module.initialize() {
            Ok(()) => {
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Uninitialized;
                Err(err)
            }
        }
    }

    fn calculate(&mut self, inargs: &[f64], outargs: &mut [f64]) -> Result<(), XfError> {
        if !self.is_ready() {
            return Err(XfError::InvalidCallingOrder(XfMethod::Calculate));
        }
        self.module.calculate(inargs, outargs)
    }

    fn report_arguments(&mut self, outargs: &mut [f64]) -> Result<(), XfError> {
        let (inputs, outputs) = self.module.argument_counts()?;
        if let Some(slot) = outargs.get_mut(0) {
            *slot = inputs as f64;
        }
        if let Some(slot) = outargs.get_mut(1) {
            *slot = outputs as f64;
        }
        Ok(())
    }

    fn raw_lengths(&self, method: i32) -> (usize, usize) {
        match XfMethod::try_from(method) {
            Ok(XfMethod::Calculate) => match self.module.live_argument_counts() {
                Some((inputs, outputs)) if self.is_ready() => (inputs, outputs.max(1)),
                _ => (0, 1),
            },
            Ok(XfMethod::ReportArguments) => (0, 2),
            Ok(_) => (0, 1),
            Err(_) => (0, 0),
        }
    }

    /// Runs one protocol call on driver-owned arrays.
    ///
    /// # Safety
    /// Non-null `inargs` must point to at least as many doubles as the live
    /// session declares inputs; non-null `outargs` to at least as many as it
    /// declares outputs, never fewer than one, and two for XF_REP_ARGUMENTS.
    pub unsafe fn call_raw(&mut self, method: i32, inargs: *const f64, outargs: *mut f64) -> XfStatus {
        let (n_in, n_out) = self.raw_lengths(method);

        let inputs: &[f64] = if inargs.is_null() || n_in == 0 {
            &[]
        } else {
            slice::from_raw_parts(inargs, n_in)
        };
        let outputs: &mut [f64] = if outargs.is_null() || n_out == 0 {
            &mut []
        } else {
            slice::from_raw_parts_mut(outargs, n_out)
        };

        self.call(method, inputs, outputs)
    }
}

/// Entry point body shared by all exported modules: serialises callers,
/// keeps panics from unwinding into the driver and reports the status.
///
/// # Safety
/// See [`XfSession::call_raw`]; `status` may be null.
pub unsafe fn dispatch<M: XfIf>(
    session: &Mutex<XfSession<M>>,
    method: i32,
    status: *mut i32,
    inargs: *mut f64,
    outargs: *mut f64,
) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        session.call_raw(method, inargs, outargs)
    }));

    let code = result.unwrap_or(XfStatus::Failure);
    if !status.is_null() {
        *status = code.into();
    }
}

/// Exports `$entry` with the external-function signature
/// `(method, *status, *inargs, *outargs)`, backed by a single
/// process-wide session around the module built by `$init`.
#[macro_export]
macro_rules! xf_export {
    ($entry:ident, $module:ty, $init:expr) => {
        static XF_SESSION: $crate::Lazy<::std::sync::Mutex<$crate::XfSession<$module>>> =
            $crate::Lazy::new(|| ::std::sync::Mutex::new($crate::XfSession::new($init)));

        /// # Safety
        /// Called by the driver with arrays sized to the declared argument counts.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn $entry(method: i32, status: *mut i32, inargs: *mut f64, outargs: *mut f64) {
            $crate::dispatch(&XF_SESSION, method, status, inargs, outargs)
        }
    };
}
