// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};
use xf_base::errors::XfError;
use xf_rs::interface::XfIf;

use crate::config::{load_config, validate_config, Configuration, CONFIG_FILE_NAME};
use crate::engine::Engine;
use crate::errors::BridgeError;
use crate::hash::{check_file_hash, HashCheck};
use crate::logging::{DiagnosticLog, LOG_FILE_NAME};
use crate::mapping::Mappings;
use crate::sync;
use crate::toolkit::{QualityType, Toolkit, INIT_NO_SAVE};

pub const BRIDGE_VERSION: f64 = 1.1;

#[derive(Debug, Clone)]
pub struct BridgeOptions {
    pub config_path: PathBuf,
    pub log_path: PathBuf,
}

impl Default for BridgeOptions {
    /// Both files in the working directory.
    fn default() -> Self {
        BridgeOptions {
            config_path: PathBuf::from(CONFIG_FILE_NAME),
            log_path: PathBuf::from(LOG_FILE_NAME),
        }
    }
}

struct Session {
    config: Configuration,
    mappings: Mappings,
}

/// The EPANET bridge module: one configuration, one open model and its
/// resolved mappings per session.
pub struct Bridge<T: Toolkit> {
    options: BridgeOptions,
    engine: Engine<T>,
    log: DiagnosticLog,
    session: Option<Session>,
    initializations: usize,
}

impl<T: Toolkit> Bridge<T> {
    pub fn new(toolkit: T, options: BridgeOptions) -> Bridge<T> {
        Bridge {
            options,
            engine: Engine::new(toolkit),
            log: DiagnosticLog::new(),
            session: None,
            initializations: 0,
        }
    }

    pub fn engine(&self) -> &Engine<T> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<T> {
        &mut self.engine
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.session.as_ref().map(|s| &s.config)
    }

    pub fn mappings(&self) -> Option<&Mappings> {
        self.session.as_ref().map(|s| &s.mappings)
    }

    /// Relative model paths are taken from the configuration file's directory.
    fn model_path(&self, inp_file: &str) -> PathBuf {
        let path = Path::new(inp_file);
        match self.options.config_path.parent() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn load(&self) -> Result<(Configuration, Mappings), BridgeError> {
        let config = load_config(&self.options.config_path)?;
        let mappings = validate_config(&config)?;
        Ok((config, mappings))
    }

    fn check_model_hash(&self, model: &Path, expected: &str) {
        match check_file_hash(model, expected) {
            Ok(HashCheck::Match) => info!("Model file hash verified"),
            Ok(HashCheck::Mismatch { actual }) => error!(
                "Model file hash mismatch: configuration has {}, '{}' has {}. Regenerate the configuration if the model changed",
                expected,
                model.display(),
                actual
            ),
            Ok(HashCheck::Unverifiable) => debug!(
                "Model file hash '{}' is not a SHA-256 digest, skipping verification",
                expected
            ),
            Err(e) => error!("Could not read '{}' for hash verification: {}", model.display(), e),
        }
    }

    fn start_session(&mut self) -> Result<Session, BridgeError> {
        let (config, mut mappings) = self.load()?;

        self.log.set_level(config.log_level()?);
        if let Err(e) = self.log.open(&self.options.log_path) {
            eprintln!("Cannot open log file '{}': {}", self.options.log_path.display(), e);
        }

        self.initializations += 1;
        if self.initializations == 1 {
            info!("=== XF_INITIALIZE: starting initialization ===");
        } else {
            info!("=== XF_INITIALIZE: starting initialization #{} ===", self.initializations);
        }
        info!("Configuration version: {}", config.version);
        info!("Inputs: {}, outputs: {}", mappings.inputs.len(), mappings.outputs.len());

        let inp_file = config.inp_file.as_deref().ok_or(BridgeError::NoModelFile)?;
        let model = self.model_path(inp_file);
        info!("EPANET model: {}", model.display());

        if let Some(expected) = config.inp_file_hash.as_deref() {
            self.check_model_hash(&model, expected);
        }
        if let Some(step) = config.hydraulic_timestep {
            info!("Hydraulic timestep: {} s (the driver's time step should match)", step);
        }

        self.engine
            .open(&model)
            .map_err(|e| BridgeError::engine(format!("Failed to open EPANET model '{}'", model.display()), e))?;

        if let Err(err) = self.open_solvers(&mut mappings) {
            if let Err(e) = self.engine.close() {
                error!("Failed to close EPANET project after failed initialization: {}", e);
            }
            return Err(err);
        }

        info!("Initialization complete");
        Ok(Session { config, mappings })
    }

    fn open_solvers(&mut self, mappings: &mut Mappings) -> Result<(), BridgeError> {
        mappings.resolve_indices(&self.engine)?;

        self.engine
            .open_hydraulics()
            .map_err(|e| BridgeError::engine("Failed to open EPANET hydraulics", e))?;
        self.engine
            .init_hydraulics(INIT_NO_SAVE)
            .map_err(|e| BridgeError::engine("Failed to initialize EPANET hydraulics", e))?;

        let quality = match self.engine.quality_type() {
            Ok(quality) => quality,
            Err(e) => {
                error!("Failed to query EPANET water quality type, running without quality: {}", e);
                QualityType::None
            }
        };

        if quality == QualityType::None {
            debug!("Model has no water quality analysis");
        } else {
            self.engine
                .open_quality()
                .map_err(|e| BridgeError::engine("Failed to open EPANET water quality", e))?;
            info!("Water quality analysis enabled ({:?})", quality);
        }

        Ok(())
    }

    /// Best-effort release of all engine resources and session data.
    fn teardown(&mut self) {
        if let Err(e) = self.engine.close_quality() {
            error!("Failed to close EPANET water quality: {}", e);
        }
        if let Err(e) = self.engine.close_hydraulics() {
            error!("Failed to close EPANET hydraulics: {}", e);
        }
        if let Err(e) = self.engine.close() {
            error!("Failed to close EPANET project: {}", e);
        }
        self.session = None;
    }
}

impl<T: Toolkit> XfIf for Bridge<T> {
    fn version(&self) -> f64 {
        BRIDGE_VERSION
    }

    fn initialize(&mut self) -> Result<(), XfError> {
        let dispatch = self.log.dispatch().clone();
        tracing::dispatcher::with_default(&dispatch, || {
            if self.session.is_some() {
                info!("XF_INITIALIZE on a live session, closing it first");
                self.teardown();
            }

            match self.start_session() {
                Ok(session) => {
                    self.session = Some(session);
                    Ok(())
                }
                Err(err) => {
                    error!("Initialization failed: {}", err);
                    Err(err.into())
                }
            }
        })
    }

    fn calculate(&mut self, inargs: &[f64], outargs: &mut [f64]) -> Result<(), XfError> {
        let dispatch = self.log.dispatch().clone();
        tracing::dispatcher::with_default(&dispatch, || {
            let session = self.session.as_ref().ok_or(BridgeError::NotInitialized)?;

            match sync::calculate(&mut self.engine, &session.mappings, inargs, outargs) {
                Ok(_) => Ok(()),
                Err(err) => {
                    error!("{}", err);
                    Err(err.into())
                }
            }
        })
    }

    fn argument_counts(&mut self) -> Result<(usize, usize), XfError> {
        if let Some(counts) = self.live_argument_counts() {
            return Ok(counts);
        }

        let dispatch = self.log.dispatch().clone();
        tracing::dispatcher::with_default(&dispatch, || match self.load() {
            Ok((_, mappings)) => Ok((mappings.inputs.len(), mappings.outputs.len())),
            Err(err) => {
                error!("XF_REP_ARGUMENTS failed: {}", err);
                Err(err.into())
            }
        })
    }

    fn cleanup(&mut self) {
        let dispatch = self.log.dispatch().clone();
        tracing::dispatcher::with_default(&dispatch, || {
            info!("=== XF_CLEANUP ===");
            self.teardown();
            info!("Cleanup complete");
        });
        self.log.close();
    }

    fn live_argument_counts(&self) -> Option<(usize, usize)> {
        self.mappings().map(|m| (m.inputs.len(), m.outputs.len()))
    }
}
