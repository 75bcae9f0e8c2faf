//! The table preprocessing pipeline.

use serde::Serialize;

use crate::config::PreprocessConfig;
use crate::error::ProcessingResult;
use crate::ingestion::FileFormat;
use crate::output::serialize_dataset;
use crate::types::DataSet;

use super::columns;

/// Message returned with [`PreprocessStatus::Warning`] for a table without rows.
pub const EMPTY_FILE_MESSAGE: &str = "The uploaded file does not contain content";
/// Message returned with [`PreprocessStatus::Success`].
pub const SUCCESS_MESSAGE: &str = "file successfully processed";

/// Status of a preprocessing run, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessStatus {
    Success,
    Failure,
    /// Nothing to do; downstream should not treat this as an error.
    Warning,
}

/// Result of [`preprocess`].
#[derive(Debug, Clone, PartialEq)]
pub enum PreprocessOutcome {
    /// The table was transformed; `output` holds the serialized file.
    Success {
        message: String,
        output: Vec<u8>,
        rows: usize,
    },
    /// The table is missing configured columns.
    Failure { message: String },
    /// The table has no rows.
    Warning { message: String },
}

impl PreprocessOutcome {
    pub fn status(&self) -> PreprocessStatus {
        match self {
            Self::Success { .. } => PreprocessStatus::Success,
            Self::Failure { .. } => PreprocessStatus::Failure,
            Self::Warning { .. } => PreprocessStatus::Warning,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message } | Self::Warning { message } => message,
        }
    }

    /// Serialized output, present only on success.
    pub fn output(&self) -> Option<&[u8]> {
        match self {
            Self::Success { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Validate, transform and serialize `dataset` according to `config`.
///
/// Steps run in a fixed order; a step without configuration is skipped:
///
/// 1. every `column_mapping` key must be a column, else [`PreprocessOutcome::Failure`]
/// 2. a table without rows is a [`PreprocessOutcome::Warning`]
/// 3. rename via `column_mapping`
/// 4. `remove_char_from_column`
/// 5. `columns_normalize` (NFKD)
/// 6. `column_combine`
/// 7. `columns_hash` (SHA-256 hex)
/// 8. empty strings become null
/// 9. projection to `columns_nonpii`
/// 10. serialization in `format`
///
/// Cells that violate a step's precondition (for example a null in a hashed column) are
/// returned as errors rather than outcomes.
///
/// ```rust
/// use event_transforms::config::PreprocessConfig;
/// use event_transforms::ingestion::FileFormat;
/// use event_transforms::processing::{preprocess, PreprocessStatus};
/// use event_transforms::types::{DataSet, Value};
///
/// let ds = DataSet::new(
///     vec!["Name".to_string(), "Email".to_string()],
///     vec![vec![Value::from("Ada"), Value::from("ada@example.org")]],
/// );
/// let config = PreprocessConfig {
///     column_mapping: [("Name".to_string(), "name".to_string())].into(),
///     columns_nonpii: Some(vec!["name".to_string()]),
///     json_elements: Some(vec!["people".to_string()]),
///     ..Default::default()
/// };
///
/// let outcome = preprocess(ds, FileFormat::Json, &config).unwrap();
/// assert_eq!(outcome.status(), PreprocessStatus::Success);
/// assert_eq!(outcome.output().unwrap(), br#"{"people":[{"name":"Ada"}]}"#);
/// ```
pub fn preprocess(
    mut dataset: DataSet,
    format: FileFormat,
    config: &PreprocessConfig,
) -> ProcessingResult<PreprocessOutcome> {
    let missing = columns::missing_columns(&dataset, config.column_mapping.keys());
    if !missing.is_empty() {
        let message = format!(
            "The uploaded file does not contain the correct columns. The following columns are missing: \"{}\".",
            missing.join("\", \"")
        );
        log::info!("{message}");
        return Ok(PreprocessOutcome::Failure { message });
    }

    if dataset.row_count() == 0 {
        log::info!("{EMPTY_FILE_MESSAGE}");
        return Ok(PreprocessOutcome::Warning {
            message: EMPTY_FILE_MESSAGE.to_string(),
        });
    }

    columns::rename_columns(&mut dataset, &config.column_mapping);

    for (column, count) in &config.remove_char_from_column {
        columns::strip_trailing_chars(&mut dataset, column, *count)?;
    }

    for column in &config.columns_normalize {
        columns::normalize_nfkd(&mut dataset, column)?;
    }

    for (target, sources) in &config.column_combine {
        columns::combine_columns(&mut dataset, target, sources)?;
    }

    for column in &config.columns_hash {
        columns::hash_sha256(&mut dataset, column)?;
    }

    columns::empty_strings_to_null(&mut dataset);

    if let Some(keep) = &config.columns_nonpii {
        dataset = columns::project_columns(&dataset, keep)?;
    }

    let output = serialize_dataset(&dataset, format, config)?;
    log::debug!(
        "preprocessed {} rows into {} bytes ({format:?})",
        dataset.row_count(),
        output.len()
    );

    Ok(PreprocessOutcome::Success {
        message: SUCCESS_MESSAGE.to_string(),
        output,
        rows: dataset.row_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn config_with_mapping(pairs: &[(&str, &str)]) -> PreprocessConfig {
        PreprocessConfig {
            column_mapping: pairs.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_columns_are_listed_in_configured_order() {
        let ds = DataSet::new(vec!["B".to_string()], vec![]);
        let config = config_with_mapping(&[("C", "c"), ("B", "b"), ("A", "a")]);

        let outcome = preprocess(ds, FileFormat::Json, &config).unwrap();
        assert_eq!(outcome.status(), PreprocessStatus::Failure);
        assert_eq!(
            outcome.message(),
            "The uploaded file does not contain the correct columns. The following columns are missing: \"C\", \"A\"."
        );
        assert!(outcome.output().is_none());
    }

    #[test]
    fn validation_runs_before_the_empty_check() {
        let ds = DataSet::new(vec![], vec![]);
        let config = config_with_mapping(&[("A", "a")]);
        let outcome = preprocess(ds, FileFormat::Json, &config).unwrap();
        assert_eq!(outcome.status(), PreprocessStatus::Failure);
    }

    #[test]
    fn empty_table_is_a_warning() {
        let ds = DataSet::new(vec!["A".to_string()], vec![]);
        let config = config_with_mapping(&[("A", "a")]);
        let outcome = preprocess(ds, FileFormat::Json, &config).unwrap();
        assert_eq!(outcome.status(), PreprocessStatus::Warning);
        assert_eq!(outcome.message(), EMPTY_FILE_MESSAGE);
    }

    #[test]
    fn combine_sees_stripped_and_normalized_values() {
        let ds = DataSet::new(
            vec!["Zip".to_string(), "Nr".to_string()],
            vec![vec![Value::from("3511AB-x"), Value::from("①")]],
        );
        let mut config = config_with_mapping(&[("Zip", "zip"), ("Nr", "nr")]);
        config.remove_char_from_column.insert("zip".to_string(), 2);
        config.columns_normalize = vec!["nr".to_string()];
        config
            .column_combine
            .insert("key".to_string(), vec!["zip".to_string(), "nr".to_string()]);
        config.columns_nonpii = Some(vec!["key".to_string()]);
        config.json_elements = Some(vec!["rows".to_string()]);

        let outcome = preprocess(ds, FileFormat::Json, &config).unwrap();
        assert_eq!(outcome.output().unwrap(), br#"{"rows":[{"key":"3511AB_1"}]}"#);
    }

    #[test]
    fn hashing_a_null_is_an_error() {
        let ds = DataSet::new(vec!["id".to_string()], vec![vec![Value::Null]]);
        let mut config = PreprocessConfig::default();
        config.columns_hash = vec!["id".to_string()];
        assert!(preprocess(ds, FileFormat::Json, &config).is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PreprocessStatus::Warning).unwrap(),
            "\"warning\""
        );
    }
}
