//! Progress log sinks

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::LogError;
use crate::logging::record::StepRecord;

/// Default progress log location
pub const DEFAULT_LOG_PATH: &str = "progress-log.jsonl";

/// Append-only structured sink for run progress
///
/// A sink is written by one run at a time; concurrent runs need distinct sinks.
pub trait ProgressLogger {
    /// Prepare the destination; fails fast on I/O problems
    fn init_logging(&mut self) -> Result<(), LogError>;

    /// Write the problem description as a record
    fn log_problem<P: Serialize + ?Sized>(&mut self, problem: &P) -> Result<(), LogError>;

    /// Write one progress record
    fn log_step<S: Serialize>(&mut self, record: &StepRecord<'_, S>) -> Result<(), LogError>;
}

impl<L: ProgressLogger> ProgressLogger for &mut L {
    fn init_logging(&mut self) -> Result<(), LogError> {
        (**self).init_logging()
    }

    fn log_problem<P: Serialize + ?Sized>(&mut self, problem: &P) -> Result<(), LogError> {
        (**self).log_problem(problem)
    }

    fn log_step<S: Serialize>(&mut self, record: &StepRecord<'_, S>) -> Result<(), LogError> {
        (**self).log_step(record)
    }
}

/// Logger that discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl ProgressLogger for NullLogger {
    fn init_logging(&mut self) -> Result<(), LogError> {
        Ok(())
    }

    fn log_problem<P: Serialize + ?Sized>(&mut self, _problem: &P) -> Result<(), LogError> {
        Ok(())
    }

    fn log_step<S: Serialize>(&mut self, _record: &StepRecord<'_, S>) -> Result<(), LogError> {
        Ok(())
    }
}

/// JSON-lines file logger
///
/// `init_logging` removes a previous file at the same path unless overwriting
/// is disabled, in which case an existing file is an error. Each record is
/// flushed as soon as it is written.
#[derive(Debug)]
pub struct JsonlLogger {
    path: PathBuf,
    overwrite: bool,
    writer: Option<BufWriter<File>>,
}

impl JsonlLogger {
    /// Create a logger for `path`; nothing is touched until `init_logging`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overwrite: true,
            writer: None,
        }
    }

    /// Whether an existing file may be replaced
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LogError> {
        let writer = self.writer.as_mut().ok_or(LogError::NotInitialized)?;
        serde_json::to_writer(&mut *writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for JsonlLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_PATH)
    }
}

impl ProgressLogger for JsonlLogger {
    fn init_logging(&mut self) -> Result<(), LogError> {
        if self.path.exists() {
            if !self.overwrite {
                return Err(LogError::AlreadyExists(self.path.clone()));
            }
            debug!(path = %self.path.display(), "removing old progress log");
            fs::remove_file(&self.path)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        info!(path = %self.path.display(), "progress log initialized");
        Ok(())
    }

    fn log_problem<P: Serialize + ?Sized>(&mut self, problem: &P) -> Result<(), LogError> {
        self.write_line(problem)
    }

    fn log_step<S: Serialize>(&mut self, record: &StepRecord<'_, S>) -> Result<(), LogError> {
        self.write_line(record)
    }
}

/// In-memory logger that keeps every record as a JSON value
#[derive(Clone, Debug, Default)]
pub struct MemoryLogger {
    initialized: bool,
    records: Vec<serde_json::Value>,
}

impl MemoryLogger {
    /// Create an empty logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `init_logging` was called
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// All records in write order
    pub fn records(&self) -> &[serde_json::Value] {
        &self.records
    }

    /// Consume the logger, returning its records
    pub fn into_records(self) -> Vec<serde_json::Value> {
        self.records
    }
}

impl ProgressLogger for MemoryLogger {
    fn init_logging(&mut self) -> Result<(), LogError> {
        self.initialized = true;
        self.records.clear();
        Ok(())
    }

    fn log_problem<P: Serialize + ?Sized>(&mut self, problem: &P) -> Result<(), LogError> {
        self.records.push(serde_json::to_value(problem)?);
        Ok(())
    }

    fn log_step<S: Serialize>(&mut self, record: &StepRecord<'_, S>) -> Result<(), LogError> {
        self.records.push(serde_json::to_value(record)?);
        Ok(())
    }
}
