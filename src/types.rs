//! Core data model types.
//!
//! Tables are loaded into an in-memory [`DataSet`] (ordered column names plus row-major cells),
//! and event messages are handled as a [`Record`] (an insertion-ordered map of field name to
//! [`Value`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single record: field name to value, in insertion order.
pub type Record = IndexMap<String, Value>;

/// A single dynamically typed value in a [`DataSet`] cell or a [`Record`] field.
///
/// Serializes to and from plain JSON (`null`, booleans, numbers, strings, arrays, objects).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested object.
    Object(Record),
}

impl Value {
    /// Convenience constructor for [`Value::Utf8`].
    pub fn string(s: impl Into<String>) -> Self {
        Self::Utf8(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string slice for [`Value::Utf8`], `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Interpret the value as a float the way a lenient numeric cast would: numbers as-is,
    /// booleans as `0`/`1`, strings parsed after trimming.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(i) => Some(*i as f64),
            Self::Float64(f) => Some(*f),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Utf8(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Human-readable text form used when values are concatenated into strings.
    ///
    /// Whole floats keep a trailing `.0` and booleans render as `True`/`False`, matching the text
    /// the upstream producers of these files emit.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int64(i) => i.to_string(),
            Self::Float64(f) => float_to_text(*f),
            Self::Utf8(s) => s.clone(),
            Self::List(_) | Self::Object(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

fn float_to_text(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int64(i),
                None => n.as_f64().map(Self::Float64).unwrap_or(Self::Null),
            },
            serde_json::Value::String(s) => Self::Utf8(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Utf8(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as [`DataSet::columns`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
    /// Row labels read from a column-oriented table; `None` means rows are labeled by position.
    pub row_labels: Option<Vec<String>>,
}

impl DataSet {
    /// Create a dataset from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            row_labels: None,
        }
    }

    /// Attach one label per row.
    pub fn with_row_labels(mut self, labels: Vec<String>) -> Self {
        self.row_labels = Some(labels);
        self
    }

    /// The label of row `idx`, falling back to its position.
    pub fn row_label(&self, idx: usize) -> String {
        self.row_labels
            .as_ref()
            .and_then(|labels| labels.get(idx).cloned())
            .unwrap_or_else(|| idx.to_string())
    }

    /// Build a dataset from records.
    ///
    /// Columns are the union of all record keys in first-seen order; a record without a given
    /// key gets [`Value::Null`] in that column.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.shift_remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    /// Convert rows back into records keyed by column name.
    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over the values of one column by index.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null))
    }

    /// Replace a column's values, appending the column if it does not exist yet.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` does not match the row count.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        assert!(
            values.len() == self.rows.len(),
            "column length {} does not match row count {}",
            values.len(),
            self.rows.len()
        );
        match self.index_of(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
    }
}
