// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::path::Path;

use anyhow::{bail, format_err, Context, Result};
use epanet_bridge::config::{validate_config, Configuration, MappingEntry};
use epanet_bridge::hash::file_sha256;
use epanet_bridge::mapping::{ObjectKind, OutputBinding};

use crate::inp::InpSummary;

pub const CONFIG_VERSION: &str = "1.0";

/// Input properties the generator offers; the bridge drives these per step.
const INPUT_PROPERTIES: &[(ObjectKind, &str)] = &[
    (ObjectKind::Node, "DEMAND"),
    (ObjectKind::Link, "STATUS"),
    (ObjectKind::Link, "SETTING"),
    (ObjectKind::Pattern, "MULTIPLIER"),
];

fn split_spec(spec: &str) -> Result<(&str, &str)> {
    match spec.split(':').collect::<Vec<_>>().as_slice() {
        [id, property] if !id.is_empty() && !property.is_empty() => Ok((*id, *property)),
        _ => bail!("Invalid specification '{}'. Expected format: ELEMENT_ID:PROPERTY", spec),
    }
}

pub struct MappingGenerator<'a> {
    model: &'a InpSummary,
    inputs: Vec<MappingEntry>,
    outputs: Vec<MappingEntry>,
}

impl<'a> MappingGenerator<'a> {
    pub fn new(model: &'a InpSummary) -> MappingGenerator<'a> {
        MappingGenerator {
            model,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn inputs(&self) -> &[MappingEntry] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[MappingEntry] {
        &self.outputs
    }

    fn kind_of(&self, id: &str) -> Result<ObjectKind> {
        self.model
            .kind_of(id)
            .ok_or_else(|| format_err!("Element '{}' not found in EPANET model", id))
    }

    /// Adds `ID:PROPERTY` as the next input; slot 0 stays reserved for the
    /// elapsed time.
    pub fn add_input(&mut self, spec: &str) -> Result<()> {
        let (id, property) = split_spec(spec)?;
        let kind = self.kind_of(id)?;

        if !INPUT_PROPERTIES.contains(&(kind, property)) {
            bail!("Property '{}' is not valid for {} inputs", property, kind);
        }

        let slot = self.inputs.len() + 1;
        self.inputs.push(MappingEntry::new(slot, id, kind, property));
        Ok(())
    }

    pub fn add_output(&mut self, spec: &str) -> Result<()> {
        let (id, property) = split_spec(spec)?;
        let kind = self.kind_of(id)?;

        let readable = OutputBinding::parse(kind, property)
            .and_then(|b| b.source())
            .is_some();
        if !readable {
            bail!("Property '{}' is not valid for {} outputs", property, kind);
        }

        self.push_output(id, kind, property);
        Ok(())
    }

    fn push_output(&mut self, id: &str, kind: ObjectKind, property: &str) {
        let slot = self.outputs.len();
        self.outputs.push(MappingEntry::new(slot, id, kind, property));
    }

    /// Tank levels, junction pressures and link flows; with `quality` also
    /// the quality of every node and link.
    pub fn default_outputs(&mut self, quality: bool) {
        let model = self.model;

        for tank in &model.tanks {
            self.push_output(tank, ObjectKind::Node, "TANKLEVEL");
        }
        for junction in &model.junctions {
            self.push_output(junction, ObjectKind::Node, "PRESSURE");
        }
        for link in model.links() {
            self.push_output(link, ObjectKind::Link, "FLOW");
        }

        if quality {
            for node in model.nodes() {
                self.push_output(node, ObjectKind::Node, "QUALITY");
            }
            for link in model.links() {
                self.push_output(link, ObjectKind::Link, "QUALITY");
            }
        }
    }

    /// Assembles and validates the configuration for `model_file`.
    pub fn build(&self, model_file: &Path, logging_level: &str) -> Result<Configuration> {
        let hash = file_sha256(model_file)
            .with_context(|| format!("Failed to hash '{}'", model_file.display()))?;
        let file_name = model_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| format_err!("'{}' does not name a file", model_file.display()))?;
        let step = self.model.hydraulic_timestep;

        let mut inputs = vec![MappingEntry::new(0, "ElapsedTime", ObjectKind::System, "ELAPSEDTIME")];
        inputs.extend(self.inputs.iter().cloned());

        let config = Configuration {
            version: CONFIG_VERSION.to_string(),
            logging_level: logging_level.to_ascii_uppercase(),
            inp_file: Some(file_name),
            inp_file_hash: Some(hash),
            hydraulic_timestep: Some(step),
            comment: Some(format!(
                "IMPORTANT: Set the driver's basic time step to match hydraulic_timestep ({} seconds)",
                step
            )),
            input_count: inputs.len() as i64,
            output_count: self.outputs.len() as i64,
            inputs,
            outputs: self.outputs.clone(),
        };

        validate_config(&config).context("Generated configuration does not validate")?;
        Ok(config)
    }
}
