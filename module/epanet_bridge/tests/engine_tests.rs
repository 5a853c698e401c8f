// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

mod common;

use std::path::Path;

use epanet_bridge::engine::{Engine, EngineError};
use epanet_bridge::error_codes;
use epanet_bridge::toolkit::{link, node, QualityType, INIT_NO_SAVE};
use float_cmp::approx_eq;
use rstest::*;

use common::FakeNetwork;

fn opened(network: FakeNetwork) -> Engine<FakeNetwork> {
    let mut engine = Engine::new(network);
    engine.open(Path::new("net1.inp")).unwrap();
    engine
}

#[fixture]
fn engine() -> Engine<FakeNetwork> {
    opened(FakeNetwork::net1())
}

#[fixture]
fn running() -> Engine<FakeNetwork> {
    let mut engine = opened(FakeNetwork::net1());
    engine.open_hydraulics().unwrap();
    engine.init_hydraulics(INIT_NO_SAVE).unwrap();
    engine
}

#[rstest]
fn model_path_reaches_the_toolkit(engine: Engine<FakeNetwork>) {
    assert!(engine.is_open());
    assert_eq!(engine.toolkit().opened_file.as_deref(), Some("net1.inp"));
}

#[rstest]
fn calls_before_open_fail_with_no_network_data() {
    let mut engine = Engine::new(FakeNetwork::net1());

    assert_eq!(engine.node_index("J1"), Err(EngineError { code: 102 }));
    assert_eq!(engine.node_value(1, node::PRESSURE), Err(EngineError { code: 102 }));
    assert_eq!(engine.set_link_value(1, link::SETTING, 0.5), Err(EngineError { code: 102 }));
    assert_eq!(engine.open_hydraulics(), Err(EngineError { code: 102 }));
    assert_eq!(engine.quality_type(), Err(EngineError { code: 102 }));
    assert!(engine.toolkit().calls.is_empty());
}

#[rstest]
fn hydraulic_calls_before_open_hydraulics_fail(mut engine: Engine<FakeNetwork>) {
    assert_eq!(engine.init_hydraulics(INIT_NO_SAVE), Err(EngineError { code: 103 }));
    assert_eq!(engine.solve_hydraulics(), Err(EngineError { code: 103 }));
    assert_eq!(engine.next_hydraulic_step(), Err(EngineError { code: 103 }));
}

#[rstest]
fn quality_solve_without_open_quality_fails(mut running: Engine<FakeNetwork>) {
    assert_eq!(running.solve_quality(), Err(EngineError { code: 105 }));
    assert_eq!(running.toolkit().count("run_q"), 0);
}

#[rstest]
fn open_quality_initializes_the_solver() {
    let mut engine = opened(FakeNetwork::net1().with_quality());

    assert_eq!(engine.quality_type(), Ok(QualityType::Chemical));
    engine.open_quality().unwrap();

    assert!(engine.is_quality_open());
    assert_eq!(engine.toolkit().calls[1..], ["open_q", "init_q"]);
}

#[rstest]
fn solve_sets_the_clock_and_step_advances_it(mut running: Engine<FakeNetwork>) {
    let solution = running.solve_hydraulics().unwrap();
    assert_eq!(solution.time, 0);
    assert_eq!(solution.warning, None);

    assert_eq!(running.next_hydraulic_step(), Ok(3600));
    let solution = running.solve_hydraulics().unwrap();

    assert_eq!(solution.time, 3600);
    assert_eq!(running.clock(), 3600);
}

#[rstest]
fn reinitializing_hydraulics_resets_the_clock(mut running: Engine<FakeNetwork>) {
    running.next_hydraulic_step().unwrap();
    running.solve_hydraulics().unwrap();

    running.init_hydraulics(INIT_NO_SAVE).unwrap();

    assert_eq!(running.clock(), 0);
}

#[rstest]
#[case(6)]
#[case(100)]
fn low_codes_are_warnings(#[case] code: i32) {
    let mut engine = opened(FakeNetwork::net1().failing("run_h", code));
    engine.open_hydraulics().unwrap();

    let solution = engine.solve_hydraulics().unwrap();

    assert_eq!(solution.warning, Some(EngineError { code }));
    assert!(!EngineError { code }.is_fatal());
}

#[rstest]
fn high_codes_are_fatal() {
    let mut engine = opened(FakeNetwork::net1().failing("run_h", 110));
    engine.open_hydraulics().unwrap();

    let err = engine.solve_hydraulics().unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.to_string(), "Cannot solve hydraulic equations - system may be unstable");
}

#[rstest]
fn close_cascades_and_repeats_safely() {
    let mut engine = opened(FakeNetwork::net1().with_quality());
    engine.open_hydraulics().unwrap();
    engine.open_quality().unwrap();

    engine.close().unwrap();
    engine.close().unwrap();
    engine.close_hydraulics().unwrap();
    engine.close_quality().unwrap();

    assert!(!engine.is_open());
    assert!(!engine.is_hydraulics_open());
    assert!(!engine.is_quality_open());
    let network = engine.toolkit();
    assert_eq!(network.count("close_q"), 1);
    assert_eq!(network.count("close_h"), 1);
    assert_eq!(network.count("close"), 1);
}

#[rstest]
fn failing_inner_close_does_not_stop_the_cascade() {
    let mut engine = opened(FakeNetwork::net1().failing("close_h", 6));
    engine.open_hydraulics().unwrap();

    engine.close().unwrap();
    engine.close().unwrap();

    assert!(!engine.is_open());
    assert!(!engine.is_hydraulics_open());
    assert_eq!(engine.toolkit().count("close_h"), 1);
    assert_eq!(engine.toolkit().count("close"), 1);
}

#[rstest]
fn failed_project_close_keeps_the_project_open() {
    let mut engine = opened(FakeNetwork::net1().failing("close", 101));
    engine.open_hydraulics().unwrap();

    let err = engine.close().unwrap_err();

    assert_eq!(err.code, 101);
    assert!(engine.is_open());
    assert!(!engine.is_hydraulics_open());
}

#[rstest]
#[case(0.0)]
#[case(0.3)]
#[case(0.75)]
#[case(1.0)]
fn values_survive_single_precision(mut engine: Engine<FakeNetwork>, #[case] value: f64) {
    engine.set_link_value(3, link::SETTING, value).unwrap();

    let read = engine.link_value(3, link::SETTING).unwrap();

    assert!(approx_eq!(f64, read, value, epsilon = 1e-6));
}

#[rstest]
fn toolkit_errors_carry_their_code(mut engine: Engine<FakeNetwork>) {
    assert_eq!(engine.node_index("NOPE"), Err(EngineError { code: 240 }));
    assert_eq!(engine.link_index("NOPE"), Err(EngineError { code: 241 }));
    assert_eq!(engine.set_node_value(1, node::PRESSURE, 1.0), Err(EngineError { code: 246 }));
    assert_eq!(engine.set_pattern_value(1, 99, 1.0), Err(EngineError { code: 242 }));
}

#[rstest]
#[case(0, "Success")]
#[case(102, "No network data available")]
#[case(240, "Undefined node - node ID not found in network")]
#[case(266, "Invalid time period")]
#[case(999, "Unknown error code: 999")]
#[case(-3, "Unknown error code: -3")]
fn codes_have_descriptions(#[case] code: i32, #[case] text: &str) {
    assert_eq!(error_codes::describe(code), text);
}

#[rstest]
fn fatal_threshold_splits_codes() {
    assert!(!error_codes::is_fatal(1));
    assert!(!error_codes::is_fatal(error_codes::FATAL_THRESHOLD));
    assert!(error_codes::is_fatal(error_codes::FATAL_THRESHOLD + 1));
}
