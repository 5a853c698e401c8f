// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! The bridge configuration file and its validation.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use xf_base::types::LogLevel;

use crate::errors::ConfigError;
use crate::mapping::{BoundInput, BoundOutput, InputBinding, Mappings, ObjectKind, OutputBinding};

pub const CONFIG_FILE_NAME: &str = "EpanetBridge.json";
pub const DEFAULT_LOGGING_LEVEL: &str = "INFO";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub version: String,
    pub logging_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inp_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inp_file_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hydraulic_timestep: Option<i64>,
    #[serde(rename = "_comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub input_count: i64,
    pub output_count: i64,
    pub inputs: Vec<MappingEntry>,
    pub outputs: Vec<MappingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingEntry {
    pub index: i64,
    pub name: String,
    pub object_type: String,
    pub property: String,
    #[serde(skip_serializing_if = "is_unresolved")]
    pub epanet_index: i32,
}

fn is_unresolved(index: &i32) -> bool {
    *index == 0
}

impl MappingEntry {
    pub fn new(index: usize, name: &str, object_type: ObjectKind, property: &str) -> MappingEntry {
        MappingEntry {
            index: index as i64,
            name: name.to_string(),
            object_type: object_type.as_str().to_string(),
            property: property.to_string(),
            epanet_index: 0,
        }
    }
}

#[derive(Deserialize)]
struct RawConfiguration {
    version: Option<String>,
    logging_level: Option<String>,
    inp_file: Option<String>,
    inp_file_hash: Option<String>,
    hydraulic_timestep: Option<i64>,
    #[serde(rename = "_comment")]
    comment: Option<String>,
    input_count: Option<i64>,
    output_count: Option<i64>,
    inputs: Option<Vec<RawEntry>>,
    outputs: Option<Vec<RawEntry>>,
}

#[derive(Deserialize)]
struct RawEntry {
    index: Option<i64>,
    name: Option<String>,
    object_type: Option<String>,
    property: Option<String>,
    #[serde(default)]
    epanet_index: i32,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingField(field.to_string()))
}

fn convert_entries(raw: Vec<RawEntry>, list: &str) -> Result<Vec<MappingEntry>, ConfigError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, entry)| -> Result<MappingEntry, ConfigError> {
            let field = |name: &str| format!("{}[{}].{}", list, i, name);
            Ok(MappingEntry {
                index: required(entry.index, &field("index"))?,
                name: required(entry.name, &field("name"))?,
                object_type: required(entry.object_type, &field("object_type"))?,
                property: required(entry.property, &field("property"))?,
                epanet_index: entry.epanet_index,
            })
        })
        .collect()
}

/// Parses configuration text. Only the presence of required fields is
/// checked here; see [`validate_config`].
pub fn parse_config(text: &str) -> Result<Configuration, ConfigError> {
    let raw: RawConfiguration = serde_json::from_str(text)?;

    let version = required(raw.version, "version")?;
    let input_count = required(raw.input_count, "input_count")?;
    let output_count = required(raw.output_count, "output_count")?;
    let inputs = required(raw.inputs, "inputs")?;
    let outputs = required(raw.outputs, "outputs")?;

    Ok(Configuration {
        version,
        logging_level: raw
            .logging_level
            .unwrap_or_else(|| DEFAULT_LOGGING_LEVEL.to_string()),
        inp_file: raw.inp_file,
        inp_file_hash: raw.inp_file_hash,
        hydraulic_timestep: raw.hydraulic_timestep,
        comment: raw.comment,
        input_count,
        output_count,
        inputs: convert_entries(inputs, "inputs")?,
        outputs: convert_entries(outputs, "outputs")?,
    })
}

pub fn load_config(path: &Path) -> Result<Configuration, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_config(&text)
}

impl Configuration {
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging_level.parse().map_err(|level| {
            ConfigError::InvalidValue(format!(
                "logging_level '{}' must be OFF, NONE, ERROR, INFO, or DEBUG",
                level
            ))
        })
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_count(direction: &'static str, declared: i64, actual: usize) -> Result<(), ConfigError> {
    if declared < 0 || declared as usize != actual {
        return Err(ConfigError::CountMismatch {
            direction,
            declared,
            actual,
        });
    }
    Ok(())
}

/// Checks slot, name and object type of one entry.
fn check_entry(
    entry: &MappingEntry,
    direction: &'static str,
    position: usize,
) -> Result<(usize, ObjectKind), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEntry {
        direction,
        position,
        reason,
    };

    if entry.index < 0 {
        return Err(invalid("index must be non-negative".to_string()));
    }
    if entry.name.is_empty() {
        return Err(invalid("name is empty".to_string()));
    }
    let kind = ObjectKind::parse(&entry.object_type).ok_or_else(|| {
        invalid(format!(
            "object_type '{}' must be SYSTEM, NODE, LINK, or PATTERN",
            entry.object_type
        ))
    })?;

    Ok((entry.index as usize, kind))
}

fn invalid_property(entry: &MappingEntry, direction: &'static str, position: usize) -> ConfigError {
    ConfigError::InvalidEntry {
        direction,
        position,
        reason: format!(
            "property '{}' is not valid for object_type '{}'",
            entry.property, entry.object_type
        ),
    }
}

/// Validates a configuration and binds each entry to its typed property.
pub fn validate_config(config: &Configuration) -> Result<Mappings, ConfigError> {
    if config.version.is_empty() {
        return Err(ConfigError::InvalidValue("version is empty".to_string()));
    }
    config.log_level()?;

    check_count("input", config.input_count, config.inputs.len())?;
    check_count("output", config.output_count, config.outputs.len())?;

    let mut mappings = Mappings::default();

    for (position, entry) in config.inputs.iter().enumerate() {
        let (slot, kind) = check_entry(entry, "input", position)?;
        let binding = InputBinding::parse(kind, &entry.property)
            .ok_or_else(|| invalid_property(entry, "input", position))?;

        mappings.inputs.push(BoundInput {
            slot,
            name: entry.name.clone(),
            binding,
            element: entry.epanet_index,
        });
    }

    for (position, entry) in config.outputs.iter().enumerate() {
        let (slot, kind) = check_entry(entry, "output", position)?;
        let binding = OutputBinding::parse(kind, &entry.property)
            .ok_or_else(|| invalid_property(entry, "output", position))?;

        mappings.outputs.push(BoundOutput {
            slot,
            name: entry.name.clone(),
            binding,
            element: entry.epanet_index,
        });
    }

    Ok(mappings)
}
