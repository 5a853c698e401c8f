// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Stateful facade over a [`Toolkit`].
//!
//! `Engine` tracks which engine subsystems are open and refuses calls made
//! out of order with the engine's own status codes, converts values between
//! the toolkit's single precision and `f64`, and turns every nonzero status
//! into an [`EngineError`].

use std::path::Path;

use thiserror::Error;

use crate::error_codes;
use crate::toolkit::{QualityType, Toolkit};

const NO_NETWORK_DATA: i32 = 102;
const HYDRAULICS_NOT_INITIALIZED: i32 = 103;
const NO_QUALITY_RESULTS: i32 = 105;

/// A nonzero engine status code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{}", error_codes::describe(*.code))]
pub struct EngineError {
    pub code: i32,
}

impl EngineError {
    pub fn message(&self) -> String {
        error_codes::describe(self.code)
    }

    pub fn is_fatal(&self) -> bool {
        error_codes::is_fatal(self.code)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

fn check(code: i32) -> EngineResult<()> {
    match code {
        0 => Ok(()),
        code => Err(EngineError { code }),
    }
}

/// Result of a hydraulic solve: the engine clock and an optional warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydraulicSolution {
    pub time: i64,
    pub warning: Option<EngineError>,
}

pub struct Engine<T: Toolkit> {
    toolkit: T,
    open: bool,
    hydraulics_open: bool,
    quality_open: bool,
    clock: i64,
}

impl<T: Toolkit> Engine<T> {
    pub fn new(toolkit: T) -> Engine<T> {
        Engine {
            toolkit,
            open: false,
            hydraulics_open: false,
            quality_open: false,
            clock: 0,
        }
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_hydraulics_open(&self) -> bool {
        self.hydraulics_open
    }

    pub fn is_quality_open(&self) -> bool {
        self.quality_open
    }

    /// Engine time reported by the most recent hydraulic solve.
    pub fn clock(&self) -> i64 {
        self.clock
    }

    /// Opens a model without report or binary output files.
    pub fn open(&mut self, inp_file: &Path) -> EngineResult<()> {
        check(self.toolkit.open(&inp_file.to_string_lossy(), "", ""))?;
        self.open = true;
        Ok(())
    }

    /// Closes quality and hydraulics if needed, then the project. Inner
    /// close failures do not stop the cascade; a closed project has no open
    /// subsystems.
    pub fn close(&mut self) -> EngineResult<()> {
        let _ = self.close_quality();
        let _ = self.close_hydraulics();

        if !self.open {
            return Ok(());
        }
        check(self.toolkit.close())?;
        self.open = false;
        self.hydraulics_open = false;
        self.quality_open = false;
        Ok(())
    }

    pub fn open_hydraulics(&mut self) -> EngineResult<()> {
        self.require_open()?;
        check(self.toolkit.open_h())?;
        self.hydraulics_open = true;
        Ok(())
    }

    pub fn init_hydraulics(&mut self, flag: i32) -> EngineResult<()> {
        self.require_hydraulics()?;
        check(self.toolkit.init_h(flag))?;
        self.clock = 0;
        Ok(())
    }

    /// Solves at the current engine time. Codes up to the fatal threshold
    /// come back as a warning next to a valid time.
    pub fn solve_hydraulics(&mut self) -> EngineResult<HydraulicSolution> {
        self.require_hydraulics()?;
        let (code, time) = self.toolkit.run_h();
        self.clock = time;

        match code {
            0 => Ok(HydraulicSolution { time, warning: None }),
            code if error_codes::is_fatal(code) => Err(EngineError { code }),
            code => Ok(HydraulicSolution {
                time,
                warning: Some(EngineError { code }),
            }),
        }
    }

    /// Advances the engine clock; returns the step taken, 0 at the end of
    /// the simulation.
    pub fn next_hydraulic_step(&mut self) -> EngineResult<i64> {
        self.require_hydraulics()?;
        let (code, step) = self.toolkit.next_h();
        check(code)?;
        Ok(step)
    }

    pub fn close_hydraulics(&mut self) -> EngineResult<()> {
        if !self.hydraulics_open {
            return Ok(());
        }
        check(self.toolkit.close_h())?;
        self.hydraulics_open = false;
        Ok(())
    }

    pub fn quality_type(&self) -> EngineResult<QualityType> {
        self.require_open()?;
        let (code, qual_type, _trace_node) = self.toolkit.get_qual_type();
        check(code)?;
        Ok(QualityType::from_code(qual_type))
    }

    /// Opens and initialises the water quality solver.
    pub fn open_quality(&mut self) -> EngineResult<()> {
        self.require_open()?;
        check(self.toolkit.open_q())?;
        self.quality_open = true;
        check(self.toolkit.init_q(0))
    }

    pub fn solve_quality(&mut self) -> EngineResult<i64> {
        if !self.quality_open {
            return Err(EngineError { code: NO_QUALITY_RESULTS });
        }
        let (code, time) = self.toolkit.run_q();
        check(code)?;
        Ok(time)
    }

    pub fn close_quality(&mut self) -> EngineResult<()> {
        if !self.quality_open {
            return Ok(());
        }
        check(self.toolkit.close_q())?;
        self.quality_open = false;
        Ok(())
    }

    pub fn node_index(&self, name: &str) -> EngineResult<i32> {
        self.require_open()?;
        let (code, index) = self.toolkit.get_node_index(name);
        check(code)?;
        Ok(index)
    }

    pub fn link_index(&self, name: &str) -> EngineResult<i32> {
        self.require_open()?;
        let (code, index) = self.toolkit.get_link_index(name);
        check(code)?;
        Ok(index)
    }

    pub fn node_value(&self, index: i32, property: i32) -> EngineResult<f64> {
        self.require_open()?;
        let (code, value) = self.toolkit.get_node_value(index, property);
        check(code)?;
        Ok(f64::from(value))
    }

    pub fn set_node_value(&mut self, index: i32, property: i32, value: f64) -> EngineResult<()> {
        self.require_open()?;
        check(self.toolkit.set_node_value(index, property, value as f32))
    }

    pub fn link_value(&self, index: i32, property: i32) -> EngineResult<f64> {
        self.require_open()?;
        let (code, value) = self.toolkit.get_link_value(index, property);
        check(code)?;
        Ok(f64::from(value))
    }

    pub fn set_link_value(&mut self, index: i32, property: i32, value: f64) -> EngineResult<()> {
        self.require_open()?;
        check(self.toolkit.set_link_value(index, property, value as f32))
    }

    pub fn pattern_value(&self, index: i32, period: i32) -> EngineResult<f64> {
        self.require_open()?;
        let (code, value) = self.toolkit.get_pattern_value(index, period);
        check(code)?;
        Ok(f64::from(value))
    }

    pub fn set_pattern_value(&mut self, index: i32, period: i32, value: f64) -> EngineResult<()> {
        self.require_open()?;
        check(self.toolkit.set_pattern_value(index, period, value as f32))
    }

    fn require_open(&self) -> EngineResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(EngineError { code: NO_NETWORK_DATA })
        }
    }

    fn require_hydraulics(&self) -> EngineResult<()> {
        if self.hydraulics_open {
            Ok(())
        } else {
            Err(EngineError {
                code: HYDRAULICS_NOT_INITIALIZED,
            })
        }
    }
}
