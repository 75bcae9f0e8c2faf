#![cfg(feature = "excel")]

use rust_xlsxwriter::Workbook;

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, Value};

/// Sheet name used for every processed workbook.
pub const OUTPUT_SHEET_NAME: &str = "data";

/// Write `dataset` as a single-sheet xlsx workbook: header row first, no index column.
///
/// Null cells are left blank; nested values are written as their JSON text.
pub fn to_xlsx_bytes(dataset: &DataSet, sheet_name: &str) -> ProcessingResult<Vec<u8>> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(sheet_name)?;

    for (col_idx, name) in dataset.columns.iter().enumerate() {
        let col = column_number(col_idx)?;
        ws.write_string(0, col, name)?;
    }

    for (row_idx0, row) in dataset.rows.iter().enumerate() {
        let r = u32::try_from(row_idx0 + 1).map_err(|_| {
            ProcessingError::schema(format!("row {} exceeds the xlsx row limit", row_idx0 + 1))
        })?;
        for (col_idx, value) in row.iter().enumerate() {
            let col = column_number(col_idx)?;
            match value {
                Value::Null => {}
                Value::Bool(b) => {
                    ws.write_boolean(r, col, *b)?;
                }
                Value::Int64(i) => {
                    ws.write_number(r, col, *i as f64)?;
                }
                Value::Float64(f) => {
                    ws.write_number(r, col, *f)?;
                }
                Value::Utf8(s) => {
                    ws.write_string(r, col, s)?;
                }
                nested @ (Value::List(_) | Value::Object(_)) => {
                    ws.write_string(r, col, nested.to_text())?;
                }
            }
        }
    }

    Ok(wb.save_to_buffer()?)
}

fn column_number(idx: usize) -> ProcessingResult<u16> {
    u16::try_from(idx)
        .map_err(|_| ProcessingError::schema(format!("column {idx} exceeds the xlsx column limit")))
}
