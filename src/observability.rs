//! Outcome reporting for file processing.
//!
//! [`crate::handler::handle_file_event`] reports every outcome to an optional
//! [`ProcessingObserver`]. Failures at or above a severity threshold are additionally sent to
//! [`ProcessingObserver::on_alert`], the side channel for alerting or dead-lettering.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ProcessingError;
use crate::processing::PreprocessStatus;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProcessingSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (processing failed).
    Error,
    /// Critical error (typically I/O or storage failures).
    Critical,
}

/// The object a processing attempt was about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingContext {
    /// Source bucket.
    pub bucket: String,
    /// Source object name.
    pub name: String,
}

/// Stats reported on successful processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    /// Rows in the written output.
    pub rows: usize,
    /// Size of the written output.
    pub bytes_written: usize,
    /// Whether the source object was deleted.
    pub deleted_source: bool,
}

/// Observer interface for processing outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ProcessingObserver: Send + Sync {
    /// Called when the output was written.
    fn on_success(&self, _ctx: &ProcessingContext, _stats: ProcessingStats) {}

    /// Called when the file was rejected with a failure or warning status.
    fn on_rejected(&self, _ctx: &ProcessingContext, _status: PreprocessStatus, _message: &str) {}

    /// Called when the file did not match the path prefix filter.
    fn on_skipped(&self, _ctx: &ProcessingContext) {}

    /// Called when processing failed with an error.
    fn on_failure(&self, _ctx: &ProcessingContext, _severity: ProcessingSeverity, _error: &ProcessingError) {}

    /// Called when a processing failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ProcessingContext, severity: ProcessingSeverity, error: &ProcessingError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ProcessingObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ProcessingObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ProcessingObserver for CompositeObserver {
    fn on_success(&self, ctx: &ProcessingContext, stats: ProcessingStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_rejected(&self, ctx: &ProcessingContext, status: PreprocessStatus, message: &str) {
        for o in &self.observers {
            o.on_rejected(ctx, status, message);
        }
    }

    fn on_skipped(&self, ctx: &ProcessingContext) {
        for o in &self.observers {
            o.on_skipped(ctx);
        }
    }

    fn on_failure(&self, ctx: &ProcessingContext, severity: ProcessingSeverity, error: &ProcessingError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ProcessingContext, severity: ProcessingSeverity, error: &ProcessingError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Reports processing events through the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ProcessingObserver for LogObserver {
    fn on_success(&self, ctx: &ProcessingContext, stats: ProcessingStats) {
        log::info!(
            "Processing file {} successful (bucket={} rows={} bytes={} deleted_source={})",
            ctx.name,
            ctx.bucket,
            stats.rows,
            stats.bytes_written,
            stats.deleted_source
        );
    }

    fn on_rejected(&self, ctx: &ProcessingContext, status: PreprocessStatus, message: &str) {
        match status {
            PreprocessStatus::Failure => log::warn!("File {} rejected: {message}", ctx.name),
            _ => log::info!("File {} not processed ({status:?}): {message}", ctx.name),
        }
    }

    fn on_skipped(&self, ctx: &ProcessingContext) {
        log::info!("File {} not in filepath_prefix filter. Skip preprocessing", ctx.name);
    }

    fn on_failure(&self, ctx: &ProcessingContext, severity: ProcessingSeverity, error: &ProcessingError) {
        log::error!(
            "Processing file {} failed! severity={:?} bucket={} err={}",
            ctx.name,
            severity,
            ctx.bucket,
            error
        );
    }

    fn on_alert(&self, ctx: &ProcessingContext, severity: ProcessingSeverity, error: &ProcessingError) {
        log::error!(
            "[ALERT] processing file {} failed! severity={:?} bucket={} err={}",
            ctx.name,
            severity,
            ctx.bucket,
            error
        );
    }
}

/// Appends failures and alerts to a local log file, one line per event.
///
/// Useful as a dead-letter record of objects that need a retry.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort: a failure to open or write the file is logged as a warning and
    /// never interrupts processing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{line}"));
        if let Err(e) = written {
            log::warn!("Failed to append to dead-letter file {}: {e}", self.path.display());
        }
    }
}

impl ProcessingObserver for FileObserver {
    fn on_rejected(&self, ctx: &ProcessingContext, status: PreprocessStatus, message: &str) {
        self.append_line(&format!(
            "{} rejected status={:?} bucket={} name={} message={}",
            unix_ts(),
            status,
            ctx.bucket,
            ctx.name,
            message
        ));
    }

    fn on_failure(&self, ctx: &ProcessingContext, severity: ProcessingSeverity, error: &ProcessingError) {
        self.append_line(&format!(
            "{} fail severity={:?} bucket={} name={} err={}",
            unix_ts(),
            severity,
            ctx.bucket,
            ctx.name,
            error
        ));
    }

    fn on_alert(&self, ctx: &ProcessingContext, severity: ProcessingSeverity, error: &ProcessingError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} bucket={} name={} err={}",
            unix_ts(),
            severity,
            ctx.bucket,
            ctx.name,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_observer_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dead-letter.log");
        let obs = FileObserver::new(&path);
        let ctx = ProcessingContext {
            bucket: "uploads".to_string(),
            name: "a.json".to_string(),
        };

        let err = ProcessingError::Storage {
            message: "boom".to_string(),
        };
        obs.on_failure(&ctx, ProcessingSeverity::Critical, &err);
        obs.on_alert(&ctx, ProcessingSeverity::Critical, &err);
        obs.on_success(
            &ctx,
            ProcessingStats {
                rows: 1,
                bytes_written: 2,
                deleted_source: true,
            },
        );

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("fail severity=Critical bucket=uploads name=a.json"));
        assert!(lines[1].contains("ALERT"));
    }

    #[test]
    fn severities_are_ordered() {
        assert!(ProcessingSeverity::Critical > ProcessingSeverity::Error);
        assert!(ProcessingSeverity::Warning > ProcessingSeverity::Info);
    }

    #[test]
    fn unwritable_file_observer_does_not_interrupt_reporting() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let obs = FileObserver::new(dir.path());
        let ctx = ProcessingContext {
            bucket: "uploads".to_string(),
            name: "a.json".to_string(),
        };
        let err = ProcessingError::schema("bad");

        obs.on_failure(&ctx, ProcessingSeverity::Error, &err);
        obs.on_alert(&ctx, ProcessingSeverity::Error, &err);

        assert!(dir.path().is_dir());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
