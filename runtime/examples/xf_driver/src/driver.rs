// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use anyhow::{bail, format_err, Context, Result};
use xf_rs::buffer::message_from_slot;
use xf_rs::types::{XfMethod, XfStatus};

/// External-function entry point: `(method, *status, *inargs, *outargs)`.
pub type EntryPoint = unsafe extern "C" fn(i32, *mut i32, *mut f64, *mut f64);

/// Calls an external-function entry point the way a time-stepped driver
/// does, with arrays sized from the reported argument counts.
pub struct Driver {
    entry: EntryPoint,
}

impl Driver {
    pub fn new(entry: EntryPoint) -> Driver {
        Driver { entry }
    }

    fn call(&self, method: XfMethod, inargs: &mut [f64], outargs: &mut [f64]) -> Result<()> {
        let mut status = XfStatus::Failure as i32;
        let inptr = if inargs.is_empty() {
            std::ptr::null_mut()
        } else {
            inargs.as_mut_ptr()
        };

        unsafe { (self.entry)(method as i32, &mut status, inptr, outargs.as_mut_ptr()) };

        match status {
            s if s == XfStatus::Success as i32 || s == XfStatus::CleanupNow as i32 => Ok(()),
            s if s == XfStatus::FailureWithMessage as i32 => {
                let message = outargs
                    .first()
                    .and_then(|slot| unsafe { message_from_slot(*slot) })
                    .map(|m| m.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "no message".to_string());
                bail!("{} failed: {}", method, message)
            }
            s if s == XfStatus::IncreaseMemory as i32 => {
                bail!("{} needs {} output values", method, outargs.first().copied().unwrap_or(0.0))
            }
            s => bail!("{} failed with status {}", method, s),
        }
    }

    pub fn version(&self) -> Result<f64> {
        let mut out = [0.0];
        self.call(XfMethod::ReportVersion, &mut [], &mut out)?;
        Ok(out[0])
    }

    pub fn argument_counts(&self) -> Result<(usize, usize)> {
        let mut out = [0.0; 2];
        self.call(XfMethod::ReportArguments, &mut [], &mut out)?;
        Ok((out[0] as usize, out[1] as usize))
    }

    pub fn initialize(&self) -> Result<()> {
        self.call(XfMethod::Initialize, &mut [], &mut [0.0])
    }

    /// One step; returns the first `outputs` values of the output array.
    pub fn calculate(&self, inargs: &mut [f64], outputs: usize) -> Result<Vec<f64>> {
        let mut out = vec![0.0; outputs.max(1)];
        self.call(XfMethod::Calculate, inargs, &mut out)?;
        out.truncate(outputs);
        Ok(out)
    }

    pub fn cleanup(&self) -> Result<()> {
        self.call(XfMethod::Cleanup, &mut [], &mut [0.0])
    }
}

/// Parses `slot=value` pairs into a vector of `inputs` values. Slot 0 is
/// the elapsed time and cannot be set.
pub fn parse_slot_values(params: &[String], inputs: usize) -> Result<Vec<f64>> {
    let mut values = vec![0.0; inputs];

    for param in params {
        let (slot, value) = param
            .split_once('=')
            .ok_or_else(|| format_err!("Invalid parameter format: {} (expected slot=value)", param))?;
        let slot: usize = slot
            .trim()
            .parse()
            .with_context(|| format!("Invalid slot in '{}'", param))?;
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value in '{}'", param))?;

        if slot == 0 {
            bail!("Slot 0 carries the elapsed time and cannot be set");
        }
        match values.get_mut(slot) {
            Some(v) => *v = value,
            None => bail!("Slot {} is outside the {} declared inputs", slot, inputs),
        }
    }

    Ok(values)
}
