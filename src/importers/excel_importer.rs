//! Spreadsheet reader for publisher exports and master files.
//!
//! Uses `open_workbook_auto` so both legacy `.xls` and `.xlsx` files work;
//! every cell is stringified, since adapters own all parsing.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::importers::ImportError;

/// Read the first worksheet of a workbook as rows of strings.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, ImportError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::WorkbookOpen {
        path: path.display().to_string(),
        msg: e.to_string(),
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::NoWorksheet(path.display().to_string()))?
        .map_err(|e| ImportError::WorkbookOpen {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?;

    let (height, width) = range.get_size();
    debug!(
        "Workbook {} first sheet: {} rows x {} cols",
        path.display(),
        height,
        width
    );

    let mut rows = Vec::with_capacity(height);
    for row in range.rows() {
        rows.push(row.iter().map(stringify_cell).collect());
    }
    Ok(rows)
}

/// Render a cell the way the exports are meant to be read: dates in ISO
/// form, integral floats without a trailing `.0`, everything else verbatim.
fn stringify_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => {
            if *b {
                "True".to_string()
            } else {
                "False".to_string()
            }
        }
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => {
            debug!("Error cell in workbook: {e:?}");
            String::new()
        }
    }
}
