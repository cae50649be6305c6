use crate::error::Result;
use crate::types::{CsvRow, RawRecord};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Load already-fetched grievance records. `.csv` files are read as CSV,
/// anything else as a JSON array.
pub fn load_records(path: &Path) -> Result<(Vec<RawRecord>, LoadReport)> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_csv(path)
    } else {
        let text = std::fs::read_to_string(path)?;
        parse_json(&text)
    }
}

/// Each array element is decoded on its own so one bad row does not sink the file.
pub fn parse_json(text: &str) -> Result<(Vec<RawRecord>, LoadReport)> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let total_rows = values.len();
    let mut parse_errors = 0usize;
    let mut records = Vec::with_capacity(total_rows);

    for (i, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(value) {
            Ok(r) => records.push(r),
            Err(e) => {
                warn!(row = i, error = %e, "skipping malformed record");
                parse_errors += 1;
            }
        }
    }

    let report = LoadReport { total_rows, loaded_rows: records.len(), parse_errors };
    Ok((records, report))
}

fn load_csv(path: &Path) -> Result<(Vec<RawRecord>, LoadReport)> {
    let rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    read_csv(rdr)
}

fn read_csv<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<(Vec<RawRecord>, LoadReport)> {
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records = Vec::new();

    for result in rdr.deserialize::<CsvRow>() {
        total_rows += 1;
        match result {
            Ok(row) => records.push(RawRecord::from(row)),
            Err(e) => {
                warn!(row = total_rows, error = %e, "skipping malformed CSV row");
                parse_errors += 1;
            }
        }
    }

    let report = LoadReport { total_rows, loaded_rows: records.len(), parse_errors };
    Ok((records, report))
}
