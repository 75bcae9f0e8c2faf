//! In-memory transformations.
//!
//! Two independent, configuration-driven components live here:
//!
//! - [`preprocess()`]: validate, transform and serialize a whole [`crate::types::DataSet`]
//!   (column renaming, stripping, NFKD normalization, combining, hashing, PII projection)
//! - [`gather_message()`]: reshape a single [`crate::types::Record`] into an outgoing message
//!
//! The individual column steps are available under [`columns`].
//!
//! ## Example: gather a message
//!
//! ```rust
//! use event_transforms::config::{Conversion, FieldRule, FieldSource, MessageMapping};
//! use event_transforms::processing::gather_message;
//! use event_transforms::types::{Record, Value};
//!
//! let mut message = Record::new();
//! message.insert("state".to_string(), Value::from("open"));
//! message.insert("ref".to_string(), Value::from("123"));
//!
//! let mut mapping = MessageMapping::new();
//! mapping.insert(
//!     "status".to_string(),
//!     FieldSource::Rule(FieldRule {
//!         source_attribute: Some("state".to_string()),
//!         conversion: Some(Conversion::Uppercase),
//!         ..Default::default()
//!     }),
//! );
//! mapping.insert("reference".to_string(), FieldSource::Attribute("ref".to_string()));
//! mapping.insert("missing".to_string(), FieldSource::Attribute("nope".to_string()));
//!
//! let out = gather_message(message, Some(&mapping));
//! assert_eq!(out["status"], Value::from("OPEN"));
//! assert_eq!(out["reference"], Value::from("123"));
//! assert_eq!(out["missing"], Value::Null);
//! ```

pub mod columns;
pub mod gather;
pub mod preprocess;

pub use gather::gather_message;
pub use preprocess::{preprocess, PreprocessOutcome, PreprocessStatus, EMPTY_FILE_MESSAGE, SUCCESS_MESSAGE};
