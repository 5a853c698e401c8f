// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

mod generator;
mod inp;

use generator::MappingGenerator;
use inp::InpSummary;

use anyhow::{Context, Result};
use structopt::StructOpt;

use std::fs;
use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(name = "inp_mapgen", about = "Generates an EpanetBridge configuration from an EPANET .inp file")]
struct Opt {
    /// EPANET model file
    #[structopt(parse(from_os_str))]
    inp_file: PathBuf,
    /// Input mapping as ELEMENT_ID:PROPERTY (repeatable)
    #[structopt(long = "input", number_of_values = 1)]
    inputs: Vec<String>,
    /// Output mapping as ELEMENT_ID:PROPERTY (repeatable); defaults to all
    /// tank levels, junction pressures and link flows
    #[structopt(long = "output", number_of_values = 1)]
    outputs: Vec<String>,
    /// Add quality outputs for every node and link to the default outputs
    #[structopt(long)]
    quality: bool,
    #[structopt(
        long,
        default_value = "INFO",
        possible_values = &["OFF", "ERROR", "INFO", "DEBUG"],
        case_insensitive = true
    )]
    logging_level: String,
    #[structopt(long, parse(from_os_str), default_value = "EpanetBridge.json")]
    output_file: PathBuf,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    println!("Parsing EPANET model: {}", opt.inp_file.display());
    let model = InpSummary::read(&opt.inp_file)?;

    println!("  Found {} junctions", model.junctions.len());
    println!("  Found {} reservoirs", model.reservoirs.len());
    println!("  Found {} tanks", model.tanks.len());
    println!("  Found {} pipes", model.pipes.len());
    println!("  Found {} pumps", model.pumps.len());
    println!("  Found {} valves", model.valves.len());
    println!("  Found {} patterns", model.patterns.len());
    println!("  Hydraulic timestep: {} seconds", model.hydraulic_timestep);
    println!(
        "  Water quality simulation: {}",
        if model.quality_enabled { "ENABLED" } else { "DISABLED" }
    );

    if model.hydraulic_timestep < 1 {
        eprintln!(
            "WARNING: Hydraulic timestep ({}s) is less than 1 second",
            model.hydraulic_timestep
        );
    } else if model.hydraulic_timestep > 3600 {
        eprintln!(
            "WARNING: Hydraulic timestep ({}s) is greater than 1 hour",
            model.hydraulic_timestep
        );
    }

    let mut mapgen = MappingGenerator::new(&model);

    for spec in &opt.inputs {
        mapgen.add_input(spec)?;
    }
    if opt.outputs.is_empty() {
        println!("Generating default outputs (all tanks, junctions, links)");
        mapgen.default_outputs(opt.quality);
    } else {
        for spec in &opt.outputs {
            mapgen.add_output(spec)?;
        }
    }

    if opt.quality && !model.quality_enabled {
        eprintln!("WARNING: --quality given but the model has no water quality analysis;");
        eprintln!("         quality outputs will read zero. Add 'Quality CHEMICAL' (or AGE/TRACE) to [OPTIONS].");
    }

    println!("Inputs: {} (including ElapsedTime)", mapgen.inputs().len() + 1);
    println!("Outputs: {}", mapgen.outputs().len());
    let config = mapgen.build(&opt.inp_file, &opt.logging_level)?;

    fs::write(&opt.output_file, config.to_json()?)
        .with_context(|| format!("Failed to write '{}'", opt.output_file.display()))?;
    println!("Wrote configuration to {}", opt.output_file.display());
    println!(
        "IMPORTANT: Set the driver's basic time step to {} seconds",
        model.hydraulic_timestep
    );

    Ok(())
}
