// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Couples a time-stepped driver to the EPANET hydraulic solver through the
//! external-function protocol.
//!
//! With the `epanet` feature the crate links the EPANET toolkit and exports
//! `EpanetBridge(method, *status, *inargs, *outargs)`.

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error_codes;
pub mod errors;
pub mod hash;
pub mod logging;
pub mod mapping;
pub mod sync;
pub mod toolkit;

#[cfg(feature = "epanet")]
pub mod epanet;

pub use bridge::{Bridge, BridgeOptions, BRIDGE_VERSION};

#[cfg(feature = "epanet")]
xf_rs::xf_export!(
    EpanetBridge,
    Bridge<epanet::EpanetToolkit>,
    Bridge::new(epanet::EpanetToolkit, BridgeOptions::default())
);
