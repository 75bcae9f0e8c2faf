use thiserror::Error;

/// Convenience result type for loading, transforming and writing files.
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Error type returned by ingestion, preprocessing, serialization and storage functions.
///
/// Validation problems the caller should report to a user (missing columns, empty files) are not
/// errors; see [`crate::processing::PreprocessOutcome`].
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[cfg(feature = "excel")]
    /// Excel serialization error (feature-gated behind `excel`).
    #[error("excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// JSON parse or serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read into the expected shape.
    #[error("config error: {message}")]
    ConfigParse { message: String },

    /// The file extension is not one of the supported formats.
    #[error("file is not json or xlsx: {path}")]
    UnsupportedFormat { path: String },

    /// The input does not have the shape the configuration expects.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A configured column transformation could not be applied to a cell.
    #[error("failed to transform value at row {row} column '{column}': {message}")]
    Transform {
        row: usize,
        column: String,
        message: String,
    },

    /// An object store backend failed.
    #[error("storage error: {message}")]
    Storage { message: String },

    /// A secret could not be resolved.
    #[error("secret error: {message}")]
    Secret { message: String },
}

impl ProcessingError {
    pub(crate) fn transform(row: usize, column: &str, message: impl Into<String>) -> Self {
        Self::Transform {
            row,
            column: column.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }
}
