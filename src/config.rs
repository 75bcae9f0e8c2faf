//! Declarative configuration for the table preprocessor, the file event handler and the message
//! gatherer.
//!
//! Every rule category is optional. A missing category is a no-op, so a config only has to name
//! the steps it wants. Configs are plain serde structs and load from `.json` or `.toml` files:
//!
//! ```toml
//! inbox = "processed-files"
//! filepath_prefix_filter = "uploads/"
//! columns_hash = ["name"]
//!
//! [column_mapping]
//! "Customer Name" = "name"
//! "Postal Code" = "postal_code"
//!
//! [remove_char_from_column]
//! postal_code = 2
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, ProcessingResult};

/// Default `format_from`/`format_to` for datetime conversions.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Rules applied by [`crate::processing::preprocess`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Expected input column -> canonical column. Every key must be present in the input.
    pub column_mapping: IndexMap<String, String>,
    /// Canonical column -> number of trailing characters to remove (the value is trimmed after).
    pub remove_char_from_column: IndexMap<String, usize>,
    /// Columns whose strings are NFKD-normalized.
    pub columns_normalize: Vec<String>,
    /// Target column -> ordered source columns joined with `_`.
    pub column_combine: IndexMap<String, Vec<String>>,
    /// Columns replaced by their SHA-256 hex digest.
    pub columns_hash: Vec<String>,
    /// Columns kept in the output, in output order. `None` keeps every column.
    pub columns_nonpii: Option<Vec<String>>,
    /// Keys leading to the record array inside a JSON document; the last key wraps the output.
    pub json_elements: Option<Vec<String>>,
}

impl PreprocessConfig {
    /// The configured JSON path, treating an empty list as "no path".
    pub fn json_path(&self) -> Option<&[String]> {
        self.json_elements.as_deref().filter(|p| !p.is_empty())
    }
}

/// Settings for [`crate::handler::handle_file_event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileProcessingConfig {
    /// Bucket the processed file is written to, under the same object name.
    pub inbox: String,
    /// Delete the source object after the output was written.
    #[serde(default = "default_delete")]
    pub delete: bool,
    /// Only object names starting with this prefix are processed.
    #[serde(default)]
    pub filepath_prefix_filter: Option<String>,
    /// Content type for the written object; defaults to one derived from the file format.
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(flatten)]
    pub preprocess: PreprocessConfig,
}

fn default_delete() -> bool {
    true
}

impl FileProcessingConfig {
    pub fn new(inbox: impl Into<String>, preprocess: PreprocessConfig) -> Self {
        Self {
            inbox: inbox.into(),
            delete: true,
            filepath_prefix_filter: None,
            media_type: None,
            preprocess,
        }
    }
}

/// Output field name -> where its value comes from. Used by [`crate::processing::gather_message`].
pub type MessageMapping = IndexMap<String, FieldSource>;

/// Source of one gathered output field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSource {
    /// Copy the named input field as-is.
    Attribute(String),
    /// Extract and convert according to a rule.
    Rule(FieldRule),
}

/// Extraction rule for one gathered output field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRule {
    pub source_attribute: Option<String>,
    pub conversion: Option<Conversion>,
    /// `strftime`-style input format for [`Conversion::Datetime`].
    pub format_from: Option<String>,
    /// `strftime`-style output format for [`Conversion::Datetime`].
    pub format_to: Option<String>,
    /// Literal prepended to the converted value.
    pub prefix_value: Option<String>,
    pub longitude_attribute: Option<String>,
    pub latitude_attribute: Option<String>,
}

impl FieldRule {
    pub fn format_from(&self) -> &str {
        self.format_from.as_deref().unwrap_or(DEFAULT_DATETIME_FORMAT)
    }

    pub fn format_to(&self) -> &str {
        self.format_to.as_deref().unwrap_or(DEFAULT_DATETIME_FORMAT)
    }
}

/// Conversion applied to a gathered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    Lowercase,
    Uppercase,
    Capitalize,
    /// Reformat a datetime string, or an integer of epoch milliseconds.
    Datetime,
    /// Build a GeoJSON point from `longitude_attribute`/`latitude_attribute`.
    GeojsonPoint,
}

/// Top-level config file for the command line tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub file_processing: Option<FileProcessingConfig>,
    pub columns_publish: Option<MessageMapping>,
}

/// Load a config from a `.json` or `.toml` file, chosen by extension.
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> ProcessingResult<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "json" => config_from_json_str(&text),
        Some(ext) if ext == "toml" => config_from_toml_str(&text),
        _ => Err(ProcessingError::ConfigParse {
            message: format!("unsupported config file extension ({})", path.display()),
        }),
    }
}

pub fn config_from_json_str<T: DeserializeOwned>(text: &str) -> ProcessingResult<T> {
    serde_json::from_str(text).map_err(|e| ProcessingError::ConfigParse {
        message: e.to_string(),
    })
}

pub fn config_from_toml_str<T: DeserializeOwned>(text: &str) -> ProcessingResult<T> {
    toml::from_str(text).map_err(|e| ProcessingError::ConfigParse {
        message: e.to_string(),
    })
}
