// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Leveled diagnostic log file.
//!
//! Each bridge owns its own `tracing` dispatcher; bridge calls run with it
//! as the thread's default so that `error!`/`info!`/`debug!` events land in
//! the bridge's log file as
//! `[YYYY-MM-DDTHH:MM:SS.mmm] [LEVEL] message`.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{reload, Registry};
use xf_base::types::LogLevel;

pub const LOG_FILE_NAME: &str = "epanet_bridge_debug.log";

struct LineFormat;

fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR | Level::WARN => "ERROR",
        Level::INFO => "INFO",
        _ => "DEBUG",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        write!(
            writer,
            "[{}] [{}] ",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
            level_label(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Shared handle to the log file; writes are dropped while it is closed.
#[derive(Clone, Default)]
struct LogSink {
    file: Arc<Mutex<Option<File>>>,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        match file.as_mut() {
            Some(f) => {
                f.write_all(buf)?;
                f.flush()?;
                Ok(buf.len())
            }
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        match file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
    }
}

pub struct DiagnosticLog {
    dispatch: Dispatch,
    filter: reload::Handle<LevelFilter, Registry>,
    sink: LogSink,
}

impl DiagnosticLog {
    /// A closed log at level OFF.
    pub fn new() -> DiagnosticLog {
        let sink = LogSink::default();
        let (filter_layer, filter) = reload::Layer::new(LevelFilter::OFF);

        let subscriber = tracing_subscriber::registry().with(filter_layer).with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(LineFormat)
                .with_writer(sink.clone()),
        );

        DiagnosticLog {
            dispatch: Dispatch::new(subscriber),
            filter,
            sink,
        }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Opens `path` for appending; an already open file is kept.
    pub fn open(&self, path: &Path) -> io::Result<()> {
        let mut file = self.sink.file.lock().unwrap_or_else(PoisonError::into_inner);
        if file.is_none() {
            *file = Some(OpenOptions::new().create(true).append(true).open(path)?);
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.sink
            .file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn close(&self) {
        let mut file = self.sink.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut f) = file.take() {
            let _ = f.flush();
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        // the handle only fails once the subscriber is gone, and it lives in self
        let _ = self.filter.reload(level_filter(level));
    }

    /// Runs `f` with this log as the thread's default subscriber.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        DiagnosticLog::new()
    }
}
