//! Serialization of processed tables back into file bytes.
//!
//! Output always uses the input's [`FileFormat`]:
//!
//! - Excel: one sheet named `data` with a header row (see [`excel`], feature `excel`)
//! - JSON with a configured element path: `{"<last element>": [records]}`
//! - JSON without: the column-oriented table, encoded once more as a JSON string

#[cfg(feature = "excel")]
pub mod excel;
pub mod json;

use crate::config::PreprocessConfig;
use crate::error::ProcessingResult;
use crate::ingestion::FileFormat;
use crate::types::DataSet;

/// Serialize `dataset` in `format`, honoring the config's JSON element path.
pub fn serialize_dataset(
    dataset: &DataSet,
    format: FileFormat,
    config: &PreprocessConfig,
) -> ProcessingResult<Vec<u8>> {
    match format {
        FileFormat::Excel => serialize_excel_dispatch(dataset),
        FileFormat::Json => match config.json_path().and_then(|p| p.last()) {
            Some(key) => json::to_wrapped_records_json(dataset, key),
            None => json::to_double_encoded_json(dataset),
        },
    }
}

fn serialize_excel_dispatch(dataset: &DataSet) -> ProcessingResult<Vec<u8>> {
    #[cfg(feature = "excel")]
    {
        excel::to_xlsx_bytes(dataset, excel::OUTPUT_SHEET_NAME)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = dataset;
        Err(crate::error::ProcessingError::schema(
            "excel output not enabled (enable cargo feature 'excel')",
        ))
    }
}
