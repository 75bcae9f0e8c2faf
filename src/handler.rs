//! File event handling: the read-transform-write-delete sequence around [`preprocess`].
//!
//! ```rust
//! use event_transforms::config::{FileProcessingConfig, PreprocessConfig};
//! use event_transforms::handler::{handle_file_event, FileEvent, HandlerOptions, HandlerOutcome};
//! use event_transforms::storage::MemoryStore;
//!
//! # fn main() -> Result<(), event_transforms::ProcessingError> {
//! let store = MemoryStore::new();
//! store.insert("uploads", "people.json", r#"[{"name":"Ada"}]"#, "application/json");
//!
//! let config = FileProcessingConfig::new("inbox", PreprocessConfig::default());
//! let event = FileEvent::new("uploads", "people.json");
//!
//! let outcome = handle_file_event(&event, &config, &store, &HandlerOptions::default())?;
//! assert!(matches!(outcome, HandlerOutcome::Processed { .. }));
//! assert!(store.contains("inbox", "people.json"));
//! assert!(!store.contains("uploads", "people.json"));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::FileProcessingConfig;
use crate::error::{ProcessingError, ProcessingResult};
use crate::ingestion::{read_table, FileFormat};
use crate::observability::{ProcessingContext, ProcessingObserver, ProcessingSeverity, ProcessingStats};
use crate::processing::{preprocess, PreprocessOutcome, PreprocessStatus};
use crate::storage::ObjectStore;

/// Trigger payload for an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    pub bucket: String,
    pub name: String,
}

impl FileEvent {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }
}

/// What [`handle_file_event`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The object name did not match the configured prefix filter; nothing was read.
    Skipped,
    /// The output was written to `bucket`/`name`.
    Processed {
        bucket: String,
        name: String,
        rows: usize,
        bytes_written: usize,
        deleted_source: bool,
    },
    /// Preprocessing returned a failure or warning; nothing was written or deleted.
    Rejected { status: PreprocessStatus, message: String },
}

/// Options controlling outcome reporting.
#[derive(Clone)]
pub struct HandlerOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ProcessingObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ProcessingSeverity,
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: ProcessingSeverity::Error,
        }
    }
}

/// Process one uploaded object.
///
/// - If `config.filepath_prefix_filter` is set and the name does not start with it, returns
///   [`HandlerOutcome::Skipped`] without touching the store.
/// - Loads the object, runs [`preprocess`], and on success writes the output to `config.inbox`
///   under the same name, then deletes the source when `config.delete` is set.
///
/// Errors are returned to the caller, not swallowed. When an observer is configured, this
/// function also reports:
///
/// - `on_success`, `on_rejected` or `on_skipped` for the respective outcomes
/// - `on_failure` on error, with a computed severity
/// - `on_alert` on error when the computed severity is >= `options.alert_at_or_above`
pub fn handle_file_event(
    event: &FileEvent,
    config: &FileProcessingConfig,
    store: &dyn ObjectStore,
    options: &HandlerOptions,
) -> ProcessingResult<HandlerOutcome> {
    let ctx = ProcessingContext {
        bucket: event.bucket.clone(),
        name: event.name.clone(),
    };

    log::info!("Run started for {}/{}", event.bucket, event.name);
    let result = run(event, config, store);

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(HandlerOutcome::Skipped) => obs.on_skipped(&ctx),
            Ok(HandlerOutcome::Processed {
                rows,
                bytes_written,
                deleted_source,
                ..
            }) => obs.on_success(
                &ctx,
                ProcessingStats {
                    rows: *rows,
                    bytes_written: *bytes_written,
                    deleted_source: *deleted_source,
                },
            ),
            Ok(HandlerOutcome::Rejected { status, message }) => obs.on_rejected(&ctx, *status, message),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn run(event: &FileEvent, config: &FileProcessingConfig, store: &dyn ObjectStore) -> ProcessingResult<HandlerOutcome> {
    if let Some(prefix) = config.filepath_prefix_filter.as_deref() {
        if !event.name.starts_with(prefix) {
            return Ok(HandlerOutcome::Skipped);
        }
    }

    let format = FileFormat::from_name(&event.name)?;
    let dataset = read_table(store, &event.bucket, &event.name, format, &config.preprocess)?;

    let (output, rows) = match preprocess(dataset, format, &config.preprocess)? {
        PreprocessOutcome::Success { output, rows, .. } => (output, rows),
        rejected => {
            return Ok(HandlerOutcome::Rejected {
                status: rejected.status(),
                message: rejected.message().to_string(),
            });
        }
    };

    let content_type = config.media_type.as_deref().unwrap_or(format.media_type());
    store.write_bytes(&config.inbox, &event.name, &output, content_type)?;

    if config.delete {
        store.delete(&event.bucket, &event.name)?;
    }

    Ok(HandlerOutcome::Processed {
        bucket: config.inbox.clone(),
        name: event.name.clone(),
        rows,
        bytes_written: output.len(),
        deleted_source: config.delete,
    })
}

fn severity_for_error(e: &ProcessingError) -> ProcessingSeverity {
    match e {
        ProcessingError::Io(_) | ProcessingError::Storage { .. } => ProcessingSeverity::Critical,
        _ => ProcessingSeverity::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_critical() {
        let io = ProcessingError::Io(std::io::Error::other("disk"));
        assert_eq!(severity_for_error(&io), ProcessingSeverity::Critical);
        let schema = ProcessingError::schema("bad");
        assert_eq!(severity_for_error(&schema), ProcessingSeverity::Error);
    }

    #[test]
    fn file_event_deserializes_from_trigger_payload() {
        let ev: FileEvent =
            serde_json::from_str(r#"{"bucket":"uploads","name":"a.xlsx","size":"12"}"#).unwrap();
        assert_eq!(ev, FileEvent::new("uploads", "a.xlsx"));
    }
}
