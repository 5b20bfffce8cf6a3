//! Spreadsheet ingestion.
//!
//! Only the first worksheet is read. Its first row supplies the column names,
//! taken verbatim (a header typed as `"month "` keeps its trailing space and
//! will not satisfy the `month` column downstream). Every following row with
//! at least one non-empty cell becomes a [`Row`]; empty cells are left out.

use calamine::{Data, Range, Reader, Xlsx, XlsxError};
use common::model::row::{CellValue, Row};
use std::collections::HashSet;
use std::io::Cursor;
use thiserror::Error;

const BLANK_HEADER: &str = "__EMPTY";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("the file is not a readable .xlsx workbook: {0}")]
    Workbook(#[from] XlsxError),
    #[error("the workbook has no sheets")]
    NoSheet,
}

/// Decodes an `.xlsx` file into rows, preserving sheet order.
pub fn parse(bytes: &[u8]) -> Result<Vec<Row>, IngestError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoSheet)??;
    Ok(rows_from_range(&range))
}

/// Turns a worksheet range into rows, using its first row as the header.
pub fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let mut lines = range.rows();
    let Some(header_cells) = lines.next() else {
        return Vec::new();
    };
    let headers = header_names(header_cells);

    lines
        .filter_map(|cells| {
            let row: Row = cells
                .iter()
                .zip(&headers)
                .filter(|(cell, _)| !matches!(cell, Data::Empty))
                .map(|(cell, name)| (name.clone(), cell_value(cell)))
                .collect();
            (!row.is_empty()).then_some(row)
        })
        .collect()
}

/// Column names for the header cells. Blank headers become `__EMPTY`,
/// `__EMPTY_1`, ...; repeated headers get `_1`, `_2`, ... suffixes.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut used = HashSet::new();
    cells
        .iter()
        .map(|cell| {
            let text = cell_value(cell).to_string();
            let base = if text.is_empty() {
                BLANK_HEADER.to_string()
            } else {
                text
            };
            let mut name = base.clone();
            let mut counter = 0;
            while used.contains(&name) {
                counter += 1;
                name = format!("{}_{}", base, counter);
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            CellValue::String(s.clone())
        }
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        // Dates stay as their serial number, like the raw cell value.
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::Bool(b) => CellValue::String(b.to_string()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}
