// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use xf_base::errors::XfError;

use crate::engine::EngineError;
use crate::mapping::ObjectKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file '{}' not found in working directory", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read configuration file '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Invalid JSON in configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Missing required field '{0}' in configuration")]
    MissingField(String),
    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
    #[error("Argument count mismatch: JSON specifies {declared} {direction}s but array contains {actual} entries")]
    CountMismatch {
        direction: &'static str,
        declared: i64,
        actual: usize,
    },
    #[error("Invalid {direction}[{position}]: {reason}")]
    InvalidEntry {
        direction: &'static str,
        position: usize,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Configuration does not name an EPANET model file (inp_file)")]
    NoModelFile,
    #[error("Element '{name}' not found in EPANET model (error code {code})")]
    ElementNotFound { name: String, code: i32 },
    #[error("{context}: {source}")]
    Engine { context: String, source: EngineError },
    #[error("Unsupported {kind} input property: {property}")]
    UnsupportedInput {
        kind: ObjectKind,
        property: &'static str,
    },
    #[error("Unsupported {kind} output property: {property}")]
    UnsupportedOutput {
        kind: ObjectKind,
        property: &'static str,
    },
    #[error("{direction} slot {slot} is outside the {len} values supplied")]
    SlotOutOfRange {
        direction: &'static str,
        slot: usize,
        len: usize,
    },
    #[error("XF_CALCULATE called before XF_INITIALIZE")]
    NotInitialized,
}

impl BridgeError {
    pub fn engine(context: impl Into<String>, source: EngineError) -> BridgeError {
        BridgeError::Engine {
            context: context.into(),
            source,
        }
    }
}

impl From<BridgeError> for XfError {
    fn from(err: BridgeError) -> XfError {
        XfError::ModuleError(err.to_string())
    }
}
