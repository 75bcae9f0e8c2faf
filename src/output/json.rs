//! JSON output encodings.

use crate::error::ProcessingResult;
use crate::types::{DataSet, Record, Value};

/// `{"<key>": [{"col": value, ...}, ...]}` as UTF-8 bytes.
pub fn to_wrapped_records_json(dataset: &DataSet, key: &str) -> ProcessingResult<Vec<u8>> {
    let mut wrapper = Record::new();
    let records = dataset.to_records().into_iter().map(Value::Object).collect();
    wrapper.insert(key.to_string(), Value::List(records));
    Ok(serde_json::to_vec(&wrapper)?)
}

/// Column-oriented table JSON: `{"col": {"<row label>": value}}`.
///
/// Rows keep the labels they were read with; unlabeled rows are keyed by position.
pub fn to_column_oriented_value(dataset: &DataSet) -> Value {
    let columns = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Record = dataset
                .column_values(idx)
                .enumerate()
                .map(|(row, v)| (dataset.row_label(row), v.clone()))
                .collect();
            (name.clone(), Value::Object(cells))
        })
        .collect();
    Value::Object(columns)
}

/// The column-oriented table JSON, wrapped once more as a JSON string literal.
///
/// Consumers of these files decode twice: first the string, then the table inside it.
pub fn to_double_encoded_json(dataset: &DataSet) -> ProcessingResult<Vec<u8>> {
    let inner = serde_json::to_string(&to_column_oriented_value(dataset))?;
    Ok(serde_json::to_vec(&inner)?)
}
