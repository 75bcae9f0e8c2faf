//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A column-oriented object: `{"a": {"0": 1, "1": 2}}` or `{"a": [1, 2]}`
//! - Any document where the array of objects sits under a path of object keys, e.g.
//!   `{"payload": {"items": [...]}}` with the path `["payload", "items"]`

use indexmap::IndexMap;

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, Record, Value};

/// Ingest JSON bytes into a [`DataSet`], optionally descending through `path` first.
pub fn ingest_json_from_slice(input: &[u8], path: Option<&[String]>) -> ProcessingResult<DataSet> {
    let doc: serde_json::Value = serde_json::from_slice(input)?;
    ingest_json_value(doc, path)
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str, path: Option<&[String]>) -> ProcessingResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ProcessingError::schema("json input is empty"));
    }
    let doc: serde_json::Value = serde_json::from_str(trimmed)?;
    ingest_json_value(doc, path)
}

fn ingest_json_value(doc: serde_json::Value, path: Option<&[String]>) -> ProcessingResult<DataSet> {
    match path {
        Some(path) => {
            let data = descend(doc, path)?;
            records_from_array(data)
        }
        None => match doc {
            serde_json::Value::Array(_) => records_from_array(doc),
            serde_json::Value::Object(columns) => ingest_column_oriented(columns),
            _ => Err(ProcessingError::schema(
                "json must be an array of objects or a column-oriented object",
            )),
        },
    }
}

fn descend(mut data: serde_json::Value, path: &[String]) -> ProcessingResult<serde_json::Value> {
    for (depth, key) in path.iter().enumerate() {
        data = match data {
            serde_json::Value::Object(mut map) => map.remove(key).ok_or_else(|| {
                ProcessingError::schema(format!("json element '{key}' not found (depth {depth})"))
            })?,
            _ => {
                return Err(ProcessingError::schema(format!(
                    "json element '{key}' cannot be looked up in a non-object (depth {depth})"
                )));
            }
        };
    }
    Ok(data)
}

fn records_from_array(data: serde_json::Value) -> ProcessingResult<DataSet> {
    let serde_json::Value::Array(items) = data else {
        return Err(ProcessingError::schema("expected a json array of records"));
    };

    let mut records: Vec<Record> = Vec::with_capacity(items.len());
    for (idx0, item) in items.into_iter().enumerate() {
        match Value::from(item) {
            Value::Object(record) => records.push(record),
            _ => {
                return Err(ProcessingError::schema(format!(
                    "row {} is not a json object",
                    idx0 + 1
                )));
            }
        }
    }
    Ok(DataSet::from_records(records))
}

/// `{"col": {"<row>": value}}` or `{"col": [values]}`, the two column-oriented table layouts.
///
/// Row labels are kept in first-seen order across all columns; a cell missing from a column is
/// null. List columns are labeled by position.
fn ingest_column_oriented(
    columns: serde_json::Map<String, serde_json::Value>,
) -> ProcessingResult<DataSet> {
    let mut labels: IndexMap<String, usize> = IndexMap::new();
    let mut by_column: Vec<(String, Vec<(usize, Value)>)> = Vec::with_capacity(columns.len());

    for (name, cells) in columns {
        let cells: Vec<(String, serde_json::Value)> = match cells {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            serde_json::Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => {
                return Err(ProcessingError::schema(format!(
                    "column '{name}' must map row labels to values"
                )));
            }
        };
        let cells = cells
            .into_iter()
            .map(|(label, v)| {
                let next = labels.len();
                let row = *labels.entry(label).or_insert(next);
                (row, Value::from(v))
            })
            .collect();
        by_column.push((name, cells));
    }

    let mut rows: Vec<Vec<Value>> = vec![vec![Value::Null; by_column.len()]; labels.len()];
    let mut names = Vec::with_capacity(by_column.len());
    for (col, (name, cells)) in by_column.into_iter().enumerate() {
        for (row, value) in cells {
            rows[row][col] = value;
        }
        names.push(name);
    }

    Ok(DataSet::new(names, rows).with_row_labels(labels.into_keys().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_oriented_object_with_row_labels() {
        let ds = ingest_json_from_str(r#"{"a":{"0":"x","1":"y"},"b":{"1":2}}"#, None).unwrap();
        assert_eq!(ds.columns, vec!["a", "b"]);
        assert_eq!(
            ds.rows,
            vec![
                vec![Value::from("x"), Value::Null],
                vec![Value::from("y"), Value::Int64(2)],
            ]
        );
    }

    #[test]
    fn column_oriented_object_with_lists() {
        let ds = ingest_json_from_str(r#"{"a":[1,2,3]}"#, None).unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.rows[2][0], Value::Int64(3));
    }

    #[test]
    fn scalar_columns_are_rejected() {
        let err = ingest_json_from_str(r#"{"a":1}"#, None).unwrap_err();
        assert!(err.to_string().contains("column 'a'"));
    }

    #[test]
    fn path_must_lead_through_objects() {
        let path = vec!["data".to_string(), "items".to_string()];
        let err = ingest_json_from_str(r#"{"data":[1,2]}"#, Some(path.as_slice())).unwrap_err();
        assert!(err.to_string().contains("non-object"));

        let err = ingest_json_from_str(r#"{"other":{}}"#, Some(path.as_slice())).unwrap_err();
        assert!(err.to_string().contains("json element 'data' not found"));
    }

    #[test]
    fn sparse_row_labels_are_kept() {
        let ds = ingest_json_from_str(r#"{"a":{"5":"x","9":"y"},"b":{"9":1,"12":2}}"#, None).unwrap();
        assert_eq!(
            ds.row_labels,
            Some(vec!["5".to_string(), "9".to_string(), "12".to_string()])
        );
        assert_eq!(ds.rows[0], vec![Value::from("x"), Value::Null]);
        assert_eq!(ds.rows[2], vec![Value::Null, Value::Int64(2)]);
    }

    #[test]
    fn large_column_tables_load_every_row() {
        let n = 20_000;
        let a: serde_json::Map<String, serde_json::Value> =
            (0..n).map(|i| (i.to_string(), serde_json::json!(format!("v{i}")))).collect();
        let b: serde_json::Map<String, serde_json::Value> =
            (0..n).rev().map(|i| (i.to_string(), serde_json::json!(i))).collect();
        let doc = serde_json::json!({"a": a, "b": b});

        let ds = ingest_json_from_slice(&serde_json::to_vec(&doc).unwrap(), None).unwrap();
        assert_eq!(ds.row_count(), n);
        assert_eq!(ds.rows[n - 1], vec![Value::from(format!("v{}", n - 1)), Value::Int64((n - 1) as i64)]);
        assert_eq!(ds.row_label(123), "123");
    }
}
