// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

/// Diurnal demand shapes applied to the driver's input values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Flat,
    /// Morning and evening peaks, low at night.
    Residential,
    /// Daytime peak.
    Commercial,
    /// Constant with shift changes.
    Industrial,
}

impl Profile {
    pub fn multiplier(self, hour: u32) -> f64 {
        let hour = hour % 24;
        match self {
            Profile::Flat => 1.0,
            Profile::Residential => match hour {
                0..=5 => 0.5,
                6..=8 => 1.3,
                17..=19 => 1.5,
                _ => 1.0,
            },
            Profile::Commercial => match hour {
                6..=8 => 0.8,
                9..=16 => 1.4,
                _ => 0.3,
            },
            Profile::Industrial => match hour {
                7..=18 => 1.2,
                _ => 0.8,
            },
        }
    }

    /// Scales `base` for the hour of day containing `seconds`.
    pub fn apply(self, base: f64, seconds: f64) -> f64 {
        let hour = (seconds.max(0.0) / 3600.0).floor() as u64 % 24;
        base * self.multiplier(hour as u32)
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(Profile::Flat),
            "residential" => Ok(Profile::Residential),
            "commercial" => Ok(Profile::Commercial),
            "industrial" => Ok(Profile::Industrial),
            _ => Err(format!(
                "unknown profile '{}' (flat, residential, commercial, industrial)",
                s
            )),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Profile::Flat => "flat",
            Profile::Residential => "residential",
            Profile::Commercial => "commercial",
            Profile::Industrial => "industrial",
        };
        f.write_str(name)
    }
}
