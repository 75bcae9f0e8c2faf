//! `event-transforms` is a small library for the configuration-driven transforms that run when a
//! file lands in a bucket or an event message is about to be published.
//!
//! It has two independent components:
//!
//! - the **table preprocessor** ([`processing::preprocess`]): validates an uploaded table against
//!   the expected columns, renames, strips, normalizes, combines and hashes columns, drops every
//!   column not explicitly marked as non-PII and serializes the result back into the input format
//! - the **message gatherer** ([`processing::gather_message`]): builds an outgoing message from an
//!   incoming record, copying, converting and deriving fields
//!
//! Around the preprocessor, [`handler::handle_file_event`] runs the full
//! read-transform-write-delete sequence against an [`storage::ObjectStore`].
//!
//! ## What you can load
//!
//! **File formats (detected by extension):**
//!
//! - **JSON**: `.json`, either an array of records, a column-oriented object, or records nested
//!   below a configured key path (`json_elements`)
//! - **Excel** (requires the Cargo feature `excel`, on by default): `.xlsx`, read with every cell
//!   as a string
//!
//! Any other extension is rejected with [`ProcessingError::UnsupportedFormat`].
//!
//! ## Quick example: preprocess a table
//!
//! ```rust
//! use event_transforms::config::PreprocessConfig;
//! use event_transforms::ingestion::{load_dataset, FileFormat};
//! use event_transforms::processing::{preprocess, PreprocessOutcome};
//!
//! # fn main() -> Result<(), event_transforms::ProcessingError> {
//! let input = br#"{"data": [{"Email": "ada@example.org", "City": "London", "Phone": "1"}]}"#;
//!
//! let config = PreprocessConfig {
//!     column_mapping: [
//!         ("Email".to_string(), "email".to_string()),
//!         ("City".to_string(), "city".to_string()),
//!     ]
//!     .into(),
//!     columns_hash: vec!["email".to_string()],
//!     columns_nonpii: Some(vec!["email".to_string(), "city".to_string()]),
//!     json_elements: Some(vec!["data".to_string()]),
//!     ..Default::default()
//! };
//!
//! let ds = load_dataset(input, FileFormat::Json, &config)?;
//! let PreprocessOutcome::Success { output, .. } = preprocess(ds, FileFormat::Json, &config)? else {
//!     panic!("expected success");
//! };
//! let text = String::from_utf8(output).unwrap();
//! assert!(text.starts_with(r#"{"data":[{"email":""#));
//! assert!(!text.contains("Phone"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: serde configuration structs and loaders
//! - [`types`]: records, values and the in-memory dataset
//! - [`ingestion`]: loading JSON and Excel into a dataset
//! - [`processing`]: the preprocessor, its column steps, and the message gatherer
//! - [`output`]: serializing datasets back into file bytes
//! - [`handler`]: the file event handler
//! - [`storage`], [`secrets`]: collaborator traits with local implementations
//! - [`observability`]: outcome observers
//! - [`error`]: the error type used across the crate

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod ingestion;
pub mod observability;
pub mod output;
pub mod processing;
pub mod secrets;
pub mod storage;
pub mod types;

pub use error::{ProcessingError, ProcessingResult};
