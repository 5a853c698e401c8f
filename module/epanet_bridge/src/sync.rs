// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Calculate-phase time synchronisation.
//!
//! The driver asks for an elapsed time in slot 0 of its input array. The
//! engine moves on its own (irregular) hydraulic steps, so a calculate call
//! applies the driver's inputs, solves and advances until the engine clock
//! reaches the requested time, then commits tank levels with one further
//! advance before reading the outputs.

use std::ops::RangeInclusive;

use tracing::{debug, error, info};

use crate::engine::Engine;
use crate::errors::BridgeError;
use crate::mapping::{BoundInput, BoundOutput, InputBinding, InputTarget, Mappings, OutputSource};
use crate::toolkit::Toolkit;

/// Pattern period written by PATTERN/MULTIPLIER inputs.
// TODO: derive the period from the requested time and the pattern step
pub const PATTERN_PERIOD: i32 = 1;

pub const LINK_SETTING_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Status of an advance that ran past the end of the simulation.
const END_OF_SIMULATION_WARNING: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Requested elapsed time, seconds.
    pub requested: f64,
    /// Engine clock of the last hydraulic solve.
    pub reached: i64,
    /// The engine reported the end of its simulation period.
    pub complete: bool,
}

fn input_value(inargs: &[f64], slot: usize) -> Result<f64, BridgeError> {
    inargs.get(slot).copied().ok_or(BridgeError::SlotOutOfRange {
        direction: "Input",
        slot,
        len: inargs.len(),
    })
}

fn apply_input<T: Toolkit>(engine: &mut Engine<T>, input: &BoundInput, value: f64) -> Result<(), BridgeError> {
    let binding = input.binding;
    let kind = binding.kind();
    let target = binding.target().ok_or(BridgeError::UnsupportedInput {
        kind,
        property: binding.property(),
    })?;
    let context = || format!("Failed to set {} {} {}", kind, input.name, binding.property());

    if binding == InputBinding::LinkSetting && !LINK_SETTING_RANGE.contains(&value) {
        error!(
            "LINK {} SETTING {} is outside the expected range [0, 1]",
            input.name, value
        );
    }

    let read_back = match target {
        InputTarget::Node(property) => {
            engine
                .set_node_value(input.element, property, value)
                .map_err(|e| BridgeError::engine(context(), e))?;
            engine.node_value(input.element, property)
        }
        InputTarget::Link(property) => {
            engine
                .set_link_value(input.element, property, value)
                .map_err(|e| BridgeError::engine(context(), e))?;
            engine.link_value(input.element, property)
        }
        InputTarget::Pattern => {
            engine
                .set_pattern_value(input.element, PATTERN_PERIOD, value)
                .map_err(|e| BridgeError::engine(context(), e))?;
            engine.pattern_value(input.element, PATTERN_PERIOD)
        }
    };

    match read_back {
        Ok(actual) => debug!(
            "Set {} {} {} = {} (engine reports {})",
            kind,
            input.name,
            binding.property(),
            value,
            actual
        ),
        Err(e) => debug!(
            "Set {} {} {} = {} (read-back failed: {})",
            kind,
            input.name,
            binding.property(),
            value,
            e
        ),
    }

    Ok(())
}

/// Writes every non-SYSTEM input into the model, in list order.
pub fn apply_inputs<T: Toolkit>(
    engine: &mut Engine<T>,
    inputs: &[BoundInput],
    inargs: &[f64],
) -> Result<(), BridgeError> {
    for input in inputs.iter().filter(|i| i.binding != InputBinding::ElapsedTime) {
        let value = input_value(inargs, input.slot)?;
        apply_input(engine, input, value)?;
    }
    Ok(())
}

/// Solves and advances until the engine clock reaches `target` seconds or
/// the simulation ends.
pub fn advance_to<T: Toolkit>(engine: &mut Engine<T>, target: i64) -> Result<(i64, bool), BridgeError> {
    loop {
        let solution = match engine.solve_hydraulics() {
            Ok(solution) => solution,
            Err(e) => {
                return Err(BridgeError::engine(
                    format!("EPANET hydraulic solver failed at time {}", engine.clock()),
                    e,
                ))
            }
        };
        let time = solution.time;

        if let Some(warning) = solution.warning {
            info!("EPANET hydraulic warning at time {}: {}", time, warning);
        }
        debug!("Hydraulics solved at t={} (target {})", time, target);

        if time >= target {
            return Ok((time, false));
        }

        let step = engine
            .next_hydraulic_step()
            .map_err(|e| BridgeError::engine("Failed to advance EPANET timestep", e))?;

        if step == 0 {
            info!("EPANET simulation complete at t={}", time);
            return Ok((time, true));
        }
    }
}

/// The advance after the last solve moves storage levels forward; its
/// failures never fail the call.
pub fn commit_storage<T: Toolkit>(engine: &mut Engine<T>) {
    match engine.next_hydraulic_step() {
        Ok(step) => debug!("Storage levels committed (next step {}s)", step),
        Err(e) if e.code == END_OF_SIMULATION_WARNING => {
            info!("Storage commit reached the end of the simulation period")
        }
        Err(e) => error!("Failed to commit storage levels: {}", e),
    }
}

/// Reads every output into `outargs`, in list order. Values written before
/// a failure stay in place.
pub fn extract_outputs<T: Toolkit>(
    engine: &Engine<T>,
    outputs: &[BoundOutput],
    outargs: &mut [f64],
) -> Result<(), BridgeError> {
    let len = outargs.len();

    for output in outputs {
        let binding = output.binding;
        let kind = binding.kind();
        let source = binding.source().ok_or(BridgeError::UnsupportedOutput {
            kind,
            property: binding.property(),
        })?;

        let value = match source {
            OutputSource::Node(property) => engine.node_value(output.element, property),
            OutputSource::Link(property) => engine.link_value(output.element, property),
        }
        .map_err(|e| {
            BridgeError::engine(
                format!("Failed to get {} {} {}", kind, output.name, binding.property()),
                e,
            )
        })?;

        let slot = outargs.get_mut(output.slot).ok_or(BridgeError::SlotOutOfRange {
            direction: "Output",
            slot: output.slot,
            len,
        })?;
        *slot = value;
    }
    Ok(())
}

/// One calculate call: inputs, time synchronisation, storage commit,
/// quality step and outputs.
pub fn calculate<T: Toolkit>(
    engine: &mut Engine<T>,
    mappings: &Mappings,
    inargs: &[f64],
    outargs: &mut [f64],
) -> Result<StepReport, BridgeError> {
    let requested = input_value(inargs, 0)?;

    apply_inputs(engine, &mappings.inputs, inargs)?;

    let (reached, complete) = advance_to(engine, requested as i64)?;

    commit_storage(engine);

    if engine.is_quality_open() {
        engine.solve_quality().map_err(|e| {
            BridgeError::engine(
                format!("EPANET water quality solver failed at time {}", reached),
                e,
            )
        })?;
    }

    extract_outputs(engine, &mappings.outputs, outargs)?;

    let report = StepReport {
        requested,
        reached,
        complete,
    };
    debug!("Calculate complete: {:?}", report);
    Ok(report)
}
