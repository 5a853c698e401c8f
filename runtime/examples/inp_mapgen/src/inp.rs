// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Element IDs and a few options scanned from an EPANET `.inp` file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use epanet_bridge::mapping::ObjectKind;

pub const DEFAULT_HYDRAULIC_TIMESTEP: i64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct InpSummary {
    pub junctions: Vec<String>,
    pub reservoirs: Vec<String>,
    pub tanks: Vec<String>,
    pub pipes: Vec<String>,
    pub pumps: Vec<String>,
    pub valves: Vec<String>,
    pub patterns: Vec<String>,
    /// Seconds.
    pub hydraulic_timestep: i64,
    pub quality_enabled: bool,
}

impl Default for InpSummary {
    fn default() -> Self {
        InpSummary {
            junctions: Vec::new(),
            reservoirs: Vec::new(),
            tanks: Vec::new(),
            pipes: Vec::new(),
            pumps: Vec::new(),
            valves: Vec::new(),
            patterns: Vec::new(),
            hydraulic_timestep: DEFAULT_HYDRAULIC_TIMESTEP,
            quality_enabled: false,
        }
    }
}

/// Parses an EPANET clock value: `H:MM`, `H:MM:SS` or decimal hours.
pub fn parse_clock(text: &str) -> Option<i64> {
    let parts: Vec<&str> = text.split(':').collect();
    let num = |s: &str| s.trim().parse::<i64>().ok();

    match parts.as_slice() {
        [hours] => hours.parse::<f64>().ok().map(|h| (h * 3600.0).round() as i64),
        [h, m] => Some(num(*h)? * 3600 + num(*m)? * 60),
        [h, m, s] => Some(num(*h)? * 3600 + num(*m)? * 60 + num(*s)?),
        _ => None,
    }
}

impl InpSummary {
    pub fn parse(text: &str) -> InpSummary {
        let mut summary = InpSummary::default();
        let mut section = String::new();

        for raw in text.lines() {
            let line = raw.split(';').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                section = line.to_ascii_uppercase();
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let id = fields[0].to_string();

            match section.as_str() {
                "[JUNCTIONS]" => summary.junctions.push(id),
                "[RESERVOIRS]" => summary.reservoirs.push(id),
                "[TANKS]" => summary.tanks.push(id),
                "[PIPES]" => summary.pipes.push(id),
                "[PUMPS]" => summary.pumps.push(id),
                "[VALVES]" => summary.valves.push(id),
                // multipliers may continue over several lines
                "[PATTERNS]" => {
                    if !summary.patterns.contains(&id) {
                        summary.patterns.push(id)
                    }
                }
                "[TIMES]" => {
                    let is_step = fields.len() >= 3
                        && fields[0].eq_ignore_ascii_case("HYDRAULIC")
                        && fields[1].eq_ignore_ascii_case("TIMESTEP");
                    if is_step {
                        summary.hydraulic_timestep = parse_clock(fields[2]).unwrap_or(DEFAULT_HYDRAULIC_TIMESTEP);
                    }
                }
                "[OPTIONS]" => {
                    if fields.len() >= 2 && fields[0].eq_ignore_ascii_case("QUALITY") {
                        summary.quality_enabled = !fields[1].eq_ignore_ascii_case("NONE");
                    }
                }
                _ => {}
            }
        }

        summary
    }

    pub fn read(path: &Path) -> Result<InpSummary> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
        Ok(InpSummary::parse(&text))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.junctions.iter().chain(&self.reservoirs).chain(&self.tanks)
    }

    pub fn links(&self) -> impl Iterator<Item = &String> {
        self.pipes.iter().chain(&self.pumps).chain(&self.valves)
    }

    pub fn kind_of(&self, id: &str) -> Option<ObjectKind> {
        if self.nodes().any(|n| n == id) {
            Some(ObjectKind::Node)
        } else if self.links().any(|l| l == id) {
            Some(ObjectKind::Link)
        } else if self.patterns.iter().any(|p| p == id) {
            Some(ObjectKind::Pattern)
        } else {
            None
        }
    }
}
