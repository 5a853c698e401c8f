// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use epanet_bridge::config::{load_config, CONFIG_FILE_NAME};
use xf_driver::driver::{parse_slot_values, Driver};
use xf_driver::profile::Profile;

use anyhow::{Context, Result};
use structopt::StructOpt;

use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, StructOpt)]
#[structopt(name = "xf_driver", about = "Drives the EpanetBridge entry point like a time-stepped host")]
struct Opt {
    #[structopt(long, default_value = "24")]
    steps: u32,
    #[structopt(long, default_value = "3600")]
    dt: f64,
    #[structopt(long, default_value = "flat")]
    profile: Profile,
    #[structopt(long, parse(from_os_str), default_value = "")]
    csv: PathBuf,
    /// Input values as `slot=value`; slot 0 is the elapsed time.
    parameters: Vec<String>,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let driver = Driver::new(epanet_bridge::EpanetBridge);

    println!("EpanetBridge version {}", driver.version()?);
    let (n_in, n_out) = driver.argument_counts()?;
    println!("Inputs: {}, outputs: {}", n_in, n_out);

    let base = parse_slot_values(&opt.parameters, n_in)?;
    let header = output_header(Path::new(CONFIG_FILE_NAME))?;

    let mut csv_wtr: Option<csv::Writer<File>> = None;
    if opt.csv.to_str() != Some("") {
        csv_wtr = Some(csv::Writer::from_path(&opt.csv)?);
    }
    write_line(&mut csv_wtr, header)?;

    driver.initialize()?;
    let run = run_steps(&driver, &opt, &base, n_out, &mut csv_wtr);
    driver.cleanup()?;
    run?;

    if let Some(ref mut wtr) = csv_wtr {
        wtr.flush()?;
    }
    Ok(())
}

fn run_steps(
    driver: &Driver,
    opt: &Opt,
    base: &[f64],
    n_out: usize,
    csv_wtr: &mut Option<csv::Writer<File>>,
) -> Result<()> {
    let mut inargs = base.to_vec();

    for k in 0..opt.steps {
        let t = f64::from(k) * opt.dt;
        for (slot, value) in inargs.iter_mut().enumerate().skip(1) {
            *value = opt.profile.apply(base[slot], t);
        }
        if let Some(elapsed) = inargs.first_mut() {
            *elapsed = t;
        }

        let outputs = driver
            .calculate(&mut inargs, n_out)
            .with_context(|| format!("Step {} (t = {} s)", k, t))?;

        let mut line = vec![format!("{:.1}", t)];
        line.extend(outputs.iter().map(|v| format!("{:.8}", v)));
        write_line(csv_wtr, line)?;
    }

    Ok(())
}

fn output_header(config_path: &Path) -> Result<Vec<String>> {
    let config = load_config(config_path)?;

    let mut outputs: Vec<_> = config.outputs.iter().collect();
    outputs.sort_by_key(|o| o.index);

    let mut header = vec!["t".to_string()];
    header.extend(outputs.iter().map(|o| format!("{}.{}", o.name, o.property)));
    Ok(header)
}

fn write_line(csv_wtr: &mut Option<csv::Writer<File>>, line: Vec<String>) -> Result<()> {
    if let Some(ref mut wtr) = csv_wtr {
        match wtr.write_record(line) {
            Ok(()) => Ok(()),
            Err(_e) => Err(anyhow::format_err!("Could not write to csv-file")),
        }
    } else {
        println!("{}", line.join(", "));
        Ok(())
    }
}
