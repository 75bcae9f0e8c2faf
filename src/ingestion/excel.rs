#![cfg(feature = "excel")]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, Value};

/// Ingest an Excel workbook (`.xlsx`, `.xls`, `.ods`, etc.) held in memory into a [`DataSet`].
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Reads every cell as a string; empty cells become [`Value::Null`]
/// - Skips rows where every cell is empty
pub fn ingest_excel_from_bytes(bytes: &[u8], sheet_name: Option<&str>) -> ProcessingResult<DataSet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ProcessingError::schema("workbook has no sheets"))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    ingest_sheet_range(&range).map_err(|e| wrap_schema_err_with_sheet(&sheet, e))
}

fn ingest_sheet_range(range: &calamine::Range<Data>) -> ProcessingResult<DataSet> {
    let (header_row_idx, columns) = build_header(range)?;

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for row in range.rows().skip(header_row_idx + 1) {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let out_row = (0..columns.len())
            .map(|col_idx| convert_cell(row.get(col_idx).unwrap_or(&Data::Empty)))
            .collect();
        rows.push(out_row);
    }

    Ok(DataSet::new(columns, rows))
}

fn wrap_schema_err_with_sheet(sheet: &str, err: ProcessingError) -> ProcessingError {
    match err {
        ProcessingError::SchemaMismatch { message } => ProcessingError::SchemaMismatch {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn build_header(range: &calamine::Range<Data>) -> ProcessingResult<(usize, Vec<String>)> {
    let (header_row_idx, header_row) = range
        .rows()
        .enumerate()
        .find(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
        .ok_or_else(|| ProcessingError::schema("sheet has no non-empty rows (no header row found)"))?;

    // Blank header cells get positional names so every column stays addressable.
    let columns = header_row
        .iter()
        .enumerate()
        .map(|(idx, c)| match c {
            Data::Empty => format!("Unnamed: {idx}"),
            other => cell_to_string(other),
        })
        .collect();

    Ok((header_row_idx, columns))
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        other => Value::Utf8(cell_to_string(other)),
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => "".to_string(),
    }
}
