//! Column-level transformations on a [`DataSet`].
//!
//! Each function changes the dataset in place and is one step of [`super::preprocess`]. Cells
//! that violate a step's precondition are reported as [`ProcessingError::Transform`] with a
//! 1-based row number.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, Value};

/// Expected columns that are absent from the dataset, in `expected` order.
pub fn missing_columns<'a>(dataset: &DataSet, expected: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    expected
        .into_iter()
        .filter(|name| dataset.index_of(name).is_none())
        .cloned()
        .collect()
}

/// Rename columns `from -> to`. Names without a mapping are left alone.
pub fn rename_columns(dataset: &mut DataSet, mapping: &IndexMap<String, String>) {
    for column in dataset.columns.iter_mut() {
        if let Some(to) = mapping.get(column.as_str()) {
            *column = to.clone();
        }
    }
}

/// Remove the last `count` characters of every string in `column`, then trim whitespace.
///
/// Nulls are kept. Non-string cells and strings shorter than `count` are errors.
pub fn strip_trailing_chars(dataset: &mut DataSet, column: &str, count: usize) -> ProcessingResult<()> {
    map_cells(dataset, column, |row, value| match value {
        Value::Null => Ok(Value::Null),
        Value::Utf8(s) => {
            let len = s.chars().count();
            if len < count {
                return Err(ProcessingError::transform(
                    row,
                    column,
                    format!("cannot remove {count} characters from a value of length {len}"),
                ));
            }
            let kept: String = s.chars().take(len - count).collect();
            Ok(Value::Utf8(kept.trim().to_string()))
        }
        other => Err(ProcessingError::transform(
            row,
            column,
            format!("expected string, got {}", other.to_text()),
        )),
    })
}

/// Apply Unicode NFKD normalization to every string in `column`. Nulls are kept.
pub fn normalize_nfkd(dataset: &mut DataSet, column: &str) -> ProcessingResult<()> {
    map_cells(dataset, column, |row, value| match value {
        Value::Null => Ok(Value::Null),
        Value::Utf8(s) => Ok(Value::Utf8(s.nfkd().collect())),
        other => Err(ProcessingError::transform(
            row,
            column,
            format!("cannot normalize non-string value {}", other.to_text()),
        )),
    })
}

/// Set `target` to the `_`-joined text of the non-null `sources` values, per row.
///
/// `target` is created when it does not exist yet.
pub fn combine_columns(dataset: &mut DataSet, target: &str, sources: &[String]) -> ProcessingResult<()> {
    let idxs = sources
        .iter()
        .map(|name| {
            dataset.index_of(name).ok_or_else(|| {
                ProcessingError::schema(format!("combine source column '{name}' for '{target}' does not exist"))
            })
        })
        .collect::<ProcessingResult<Vec<usize>>>()?;

    let combined = dataset
        .rows
        .iter()
        .map(|row| {
            let parts: Vec<String> = idxs
                .iter()
                .filter_map(|&i| row.get(i))
                .filter(|v| !v.is_null())
                .map(Value::to_text)
                .collect();
            Value::Utf8(parts.join("_"))
        })
        .collect();

    dataset.set_column(target, combined);
    Ok(())
}

/// Replace every value in `column` with the hex SHA-256 digest of its UTF-8 bytes.
///
/// Null and non-string cells are errors.
pub fn hash_sha256(dataset: &mut DataSet, column: &str) -> ProcessingResult<()> {
    map_cells(dataset, column, |row, value| match value {
        Value::Utf8(s) => Ok(Value::Utf8(sha256_hex(s))),
        Value::Null => Err(ProcessingError::transform(row, column, "cannot hash a null value")),
        other => Err(ProcessingError::transform(
            row,
            column,
            format!("cannot hash non-string value {}", other.to_text()),
        )),
    })
}

/// Hex-encoded SHA-256 digest of `s`.
pub fn sha256_hex(s: &str) -> String {
    hex::encode(Sha256::digest(s.as_bytes()))
}

/// Turn every empty-string cell into [`Value::Null`], in all columns.
pub fn empty_strings_to_null(dataset: &mut DataSet) {
    for cell in dataset.rows.iter_mut().flatten() {
        if matches!(cell, Value::Utf8(s) if s.is_empty()) {
            *cell = Value::Null;
        }
    }
}

/// Keep exactly `keep`, in that order, along with the row labels. A listed column that does not
/// exist is an error.
pub fn project_columns(dataset: &DataSet, keep: &[String]) -> ProcessingResult<DataSet> {
    let idxs = keep
        .iter()
        .map(|name| {
            dataset
                .index_of(name)
                .ok_or_else(|| ProcessingError::schema(format!("output column '{name}' does not exist")))
        })
        .collect::<ProcessingResult<Vec<usize>>>()?;

    let rows = dataset
        .rows
        .iter()
        .map(|row| idxs.iter().map(|&i| row.get(i).cloned().unwrap_or(Value::Null)).collect())
        .collect();

    Ok(DataSet {
        columns: keep.to_vec(),
        rows,
        row_labels: dataset.row_labels.clone(),
    })
}

fn map_cells<F>(dataset: &mut DataSet, column: &str, mut f: F) -> ProcessingResult<()>
where
    F: FnMut(usize, &Value) -> ProcessingResult<Value>,
{
    let idx = dataset
        .index_of(column)
        .ok_or_else(|| ProcessingError::schema(format!("column '{column}' does not exist")))?;

    for (row_idx0, row) in dataset.rows.iter_mut().enumerate() {
        if let Some(cell) = row.get_mut(idx) {
            *cell = f(row_idx0 + 1, cell)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> DataSet {
        DataSet::new(
            vec!["name".to_string(), "zip".to_string(), "nr".to_string()],
            vec![
                vec![Value::from("Ada"), Value::from("3511 AB  NL"), Value::Int64(12)],
                vec![Value::from(""), Value::Null, Value::Null],
                vec![Value::from("Grace"), Value::from("1012 XY  NL"), Value::from("4a")],
            ],
        )
    }

    #[test]
    fn missing_columns_preserve_expected_order() {
        let ds = sample_dataset();
        let expected = vec!["zz".to_string(), "name".to_string(), "aa".to_string()];
        assert_eq!(missing_columns(&ds, &expected), vec!["zz", "aa"]);
    }

    #[test]
    fn rename_only_touches_mapped_columns() {
        let mut ds = sample_dataset();
        let mapping: IndexMap<String, String> = [("zip".to_string(), "postal_code".to_string())].into();
        rename_columns(&mut ds, &mapping);
        assert_eq!(ds.columns, vec!["name", "postal_code", "nr"]);
    }

    #[test]
    fn strip_removes_suffix_then_trims_and_keeps_nulls() {
        let mut ds = sample_dataset();
        strip_trailing_chars(&mut ds, "zip", 2).unwrap();
        assert_eq!(ds.rows[0][1], Value::from("3511 AB"));
        assert_eq!(ds.rows[1][1], Value::Null);
        assert_eq!(ds.rows[2][1], Value::from("1012 XY"));
    }

    #[test]
    fn strip_counts_characters_not_bytes() {
        let mut ds = DataSet::new(vec!["c".to_string()], vec![vec![Value::from("Zürich-1")]]);
        strip_trailing_chars(&mut ds, "c", 2).unwrap();
        assert_eq!(ds.rows[0][0], Value::from("Zürich"));
    }

    #[test]
    fn strip_errors_on_short_or_non_string_values() {
        let mut ds = sample_dataset();
        let err = strip_trailing_chars(&mut ds, "name", 4).unwrap_err();
        assert!(err.to_string().contains("row 1 column 'name'"));

        let mut ds = sample_dataset();
        let err = strip_trailing_chars(&mut ds, "nr", 1).unwrap_err();
        assert!(matches!(err, ProcessingError::Transform { row: 1, .. }));
    }

    #[test]
    fn normalize_decomposes_compatibility_characters() {
        let mut ds = DataSet::new(
            vec!["c".to_string()],
            vec![vec![Value::from("ﬁ café")], vec![Value::Null]],
        );
        normalize_nfkd(&mut ds, "c").unwrap();
        assert_eq!(ds.rows[0][0], Value::from("fi cafe\u{301}"));
        assert_eq!(ds.rows[1][0], Value::Null);
    }

    #[test]
    fn combine_skips_nulls_and_keeps_source_order() {
        let mut ds = sample_dataset();
        combine_columns(&mut ds, "key", &["nr".to_string(), "name".to_string()]).unwrap();
        let key = ds.index_of("key").unwrap();
        assert_eq!(ds.rows[0][key], Value::from("12_Ada"));
        assert_eq!(ds.rows[1][key], Value::from(""));
        assert_eq!(ds.rows[2][key], Value::from("4a_Grace"));
    }

    #[test]
    fn combine_errors_on_unknown_source() {
        let mut ds = sample_dataset();
        let err = combine_columns(&mut ds, "key", &["missing".to_string()]).unwrap_err();
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn hash_replaces_values_with_sha256_hex() {
        let mut ds = DataSet::new(vec!["c".to_string()], vec![vec![Value::from("abc")]]);
        hash_sha256(&mut ds, "c").unwrap();
        assert_eq!(
            ds.rows[0][0],
            Value::from("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn hash_refuses_nulls() {
        let mut ds = sample_dataset();
        let err = hash_sha256(&mut ds, "zip").unwrap_err();
        assert!(matches!(err, ProcessingError::Transform { row: 2, .. }));
    }

    #[test]
    fn empty_strings_become_null_everywhere() {
        let mut ds = sample_dataset();
        empty_strings_to_null(&mut ds);
        assert_eq!(ds.rows[1], vec![Value::Null, Value::Null, Value::Null]);
        assert_eq!(ds.rows[0][0], Value::from("Ada"));
    }

    #[test]
    fn projection_keeps_exactly_the_listed_columns() {
        let ds = sample_dataset();
        let out = project_columns(&ds, &["nr".to_string(), "name".to_string()]).unwrap();
        assert_eq!(out.columns, vec!["nr", "name"]);
        assert_eq!(out.rows[0], vec![Value::Int64(12), Value::from("Ada")]);

        assert!(project_columns(&ds, &["ghost".to_string()]).is_err());
    }
}
