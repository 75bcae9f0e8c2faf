//! Loading entrypoints and implementations.
//!
//! Most callers detect the format with [`FileFormat::from_name`] and then use [`read_table`]
//! (from [`unified`]), which reads an object from an [`crate::storage::ObjectStore`] and loads it
//! into an in-memory [`crate::types::DataSet`].
//!
//! Format-specific functions are also available under:
//! - [`json`]
//! - `excel` (feature `excel`)

#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod unified;

pub use unified::{load_dataset, read_table, FileFormat, JSON_MEDIA_TYPE, XLSX_MEDIA_TYPE};
