//! Write-only diagnostics channel for training progress.
//!
//! The trainer formats human-readable lines through a [`TrainingLogger`] and
//! hands them to a [`DiagnosticsSink`]. Nothing is ever read back, and a sink
//! that fails to write is ignored: diagnostics can be reduced to a no-op
//! ([`NullSink`], [`Verbosity::Silent`]) without changing any result.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::regularizers::Regularization;

/// File name the smoke harness logs to by default.
pub const DEFAULT_LOG_FILE: &str = "lib_ml_basics_log.txt";

/// Destination for diagnostic lines.
///
/// Takes `&self` so one sink can be shared between trainers; implementations
/// that need mutable state synchronize internally.
pub trait DiagnosticsSink: Send + Sync {
    fn write_line(&self, line: &str) -> std::io::Result<()>;
}

/// Prints every line to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl DiagnosticsSink for StdoutSink {
    fn write_line(&self, line: &str) -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{line}")
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn write_line(&self, _line: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Appends lines to a file, flushing after each one so the log survives an
/// aborted run.
#[derive(Debug)]
pub struct FileSink {
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    /// Creates (or truncates) `path` and writes a first `logger initialized`
    /// line.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let sink = Self {
            writer: Mutex::new(BufWriter::new(file)),
        };
        sink.write_line("logger initialized")?;
        Ok(sink)
    }
}

impl DiagnosticsSink for FileSink {
    fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "log file lock poisoned"))?;
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

/// Collects lines in memory. Handy in tests and for callers that want to
/// inspect a run afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticsSink for MemorySink {
    fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "memory sink lock poisoned"))?;
        lines.push(line.to_owned());
        Ok(())
    }
}

/// How much the trainer reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Verbosity {
    /// Nothing at all.
    Silent,
    /// Failures and non-convergence only.
    Warning,
    /// Start, periodic progress and outcome.
    #[default]
    Info,
    /// Every iteration.
    Debug,
}

/// Formats training events and forwards them to a sink.
pub struct TrainingLogger {
    verbosity: Verbosity,
    sink: Arc<dyn DiagnosticsSink>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self { verbosity, sink }
    }

    /// Whether lines at `level` reach the sink.
    pub fn enabled(&self, level: Verbosity) -> bool {
        level <= self.verbosity && self.verbosity != Verbosity::Silent
    }

    fn emit(&self, level: Verbosity, line: &str) {
        if self.enabled(level) {
            // A broken sink must not fail training.
            let _ = self.sink.write_line(line);
        }
    }

    pub fn start_training(
        &self,
        n_features: usize,
        n_observations: usize,
        echelon: f64,
        regularization: Regularization,
        max_iterations: usize,
        tolerance: f64,
    ) {
        let reg = match regularization {
            Regularization::None => "none".to_string(),
            Regularization::L2(lambda) => format!("l2(lambda = {lambda})"),
        };
        self.emit(
            Verbosity::Info,
            &format!(
                "starting gradient descent: {n_features} features, {n_observations} observations, \
                 echelon = {echelon}, regularization = {reg}, max_iterations = {max_iterations}, \
                 tolerance = {tolerance:e}"
            ),
        );
    }

    /// Progress line. Printed at `Info` when `periodic` is set, otherwise
    /// only at `Debug`.
    pub fn log_iteration(&self, iteration: usize, max_delta: f64, loss: f64, periodic: bool) {
        let level = if periodic {
            Verbosity::Info
        } else {
            Verbosity::Debug
        };
        self.emit(
            level,
            &format!("iteration {iteration}: max |delta theta| = {max_delta:e}, loss = {loss:.6}"),
        );
    }

    pub fn converged(&self, iterations: usize, theta: &[f64]) {
        self.emit(
            Verbosity::Info,
            &format!("converged after {iterations} iterations: theta = {theta:?}"),
        );
    }

    pub fn max_iterations_exceeded(&self, iterations: usize, max_delta: f64) {
        self.emit(
            Verbosity::Warning,
            &format!(
                "maximum number of iterations ({iterations}) exceeded; last max |delta theta| = {max_delta:e}"
            ),
        );
    }

    pub fn gradient_failed(&self, iteration: usize, reason: &str) {
        self.emit(
            Verbosity::Warning,
            &format!("failed to get derivative values on iteration {iteration}: {reason}"),
        );
    }
}

impl std::fmt::Debug for TrainingLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingLogger")
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}
