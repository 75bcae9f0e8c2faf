//! Unified loading entrypoint.
//!
//! The format is inferred from the object name: `.xlsx` files are read as spreadsheets (every cell
//! as a string), `.json` files as JSON tables (optionally below a configured key path). Anything
//! else is [`ProcessingError::UnsupportedFormat`].

use std::path::Path;

use crate::config::PreprocessConfig;
use crate::error::{ProcessingError, ProcessingResult};
use crate::storage::ObjectStore;
use crate::types::DataSet;

use super::json;

/// Content type written for spreadsheet output.
pub const XLSX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// Content type written for JSON output.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Supported file formats. Output is always written in the input's format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Office Open XML workbook (feature-gated behind `excel`).
    Excel,
    /// JSON document.
    Json,
}

impl FileFormat {
    /// Parse a file format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Excel),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Infer the format of an object name such as `uploads/2024/customers.xlsx`.
    pub fn from_name(name: &str) -> ProcessingResult<Self> {
        Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ProcessingError::UnsupportedFormat {
                path: name.to_string(),
            })
    }

    /// Default content type for objects written in this format.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Excel => XLSX_MEDIA_TYPE,
            Self::Json => JSON_MEDIA_TYPE,
        }
    }
}

/// Parse file bytes of a known format into a [`DataSet`].
pub fn load_dataset(
    bytes: &[u8],
    format: FileFormat,
    config: &PreprocessConfig,
) -> ProcessingResult<DataSet> {
    match format {
        FileFormat::Json => json::ingest_json_from_slice(bytes, config.json_path()),
        FileFormat::Excel => ingest_excel_dispatch(bytes),
    }
}

/// Read an object from `store` and load it as a table of the given format.
///
/// Callers detect `format` with [`FileFormat::from_name`] before any I/O.
pub fn read_table(
    store: &dyn ObjectStore,
    bucket: &str,
    name: &str,
    format: FileFormat,
    config: &PreprocessConfig,
) -> ProcessingResult<DataSet> {
    let bytes = store.read_bytes(bucket, name)?;
    let ds = load_dataset(&bytes, format, config)?;
    log::info!("Read file {name} from {bucket}");
    Ok(ds)
}

fn ingest_excel_dispatch(bytes: &[u8]) -> ProcessingResult<DataSet> {
    #[cfg(feature = "excel")]
    {
        super::excel::ingest_excel_from_bytes(bytes, None)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = bytes;
        Err(ProcessingError::schema(
            "excel ingestion not enabled (enable cargo feature 'excel')",
        ))
    }
}
