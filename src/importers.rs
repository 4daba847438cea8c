//! Readers for the two accepted source formats (spreadsheet-binary and
//! delimited text) plus the file-discovery contract.
//!
//! Everything is read as text: adapters own the parsing of dates and
//! numbers, so the importers never guess cell types.

pub mod csv_importer;
pub mod excel_importer;
pub mod file_provider;

use std::path::Path;

use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::record::RawTable;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to open workbook {path}: {msg}")]
    WorkbookOpen { path: String, msg: String },

    #[error("workbook {0} has no worksheets")]
    NoWorksheet(String),

    #[error("file {path} has no rows left after skipping {skipped} header rows")]
    NoHeaderRow { path: String, skipped: usize },

    #[error("no readable files among {0} candidates (expected .xls, .xlsx or .csv)")]
    NoUsableFiles(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-publisher file shaping: rows to skip at the top and bottom, and an
/// explicit column-name list for headerless exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableShape {
    pub header_rows: usize,
    pub footer_rows: usize,
    pub column_names: Option<Vec<String>>,
}

impl TableShape {
    /// A plain table: first row is the header, nothing skipped.
    pub fn headered() -> Self {
        TableShape {
            header_rows: 0,
            footer_rows: 0,
            column_names: None,
        }
    }
}

/// Read one source file into a `RawTable`, dispatching on the extension.
///
/// Returns `Ok(None)` for unsupported extensions so multi-file loads can
/// skip them silently.
pub fn read_table(path: &Path, shape: &TableShape) -> Result<Option<RawTable>, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_uppercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "XLS" | "XLSX" => excel_importer::read_rows(path)?,
        "CSV" => csv_importer::read_rows(path)?,
        _ => {
            debug!("Skipping unsupported file: {}", path.display());
            return Ok(None);
        }
    };

    shape_table(rows, shape, path).map(Some)
}

/// Load a batch of publisher export files into one concatenated table.
///
/// Unsupported files are skipped; later files are aligned to the first
/// file's columns by name.
pub fn load_raw_batch(
    paths: &[std::path::PathBuf],
    shape: &TableShape,
) -> Result<RawTable, ImportError> {
    let progress = ProgressBar::new(paths.len() as u64);
    let mut combined: Option<RawTable> = None;

    for path in paths {
        if let Some(table) = read_table(path, shape)? {
            debug!("Loaded {} rows from {}", table.len(), path.display());
            match combined.as_mut() {
                Some(base) => base.extend_aligned(table),
                None => combined = Some(table),
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let table = combined.ok_or(ImportError::NoUsableFiles(paths.len()))?;
    info!("Loaded {} rows from {} files", table.len(), paths.len());
    Ok(table)
}

/// Apply header/footer skipping and optional explicit column names to the
/// raw row list of a single file.
fn shape_table(
    mut rows: Vec<Vec<String>>,
    shape: &TableShape,
    path: &Path,
) -> Result<RawTable, ImportError> {
    if shape.header_rows >= rows.len() && shape.column_names.is_none() {
        return Err(ImportError::NoHeaderRow {
            path: path.display().to_string(),
            skipped: shape.header_rows,
        });
    }
    rows.drain(..shape.header_rows.min(rows.len()));

    let columns = match &shape.column_names {
        // Headerless export: every remaining row is data.
        Some(names) => names.clone(),
        None => rows.remove(0),
    };

    let keep = rows.len().saturating_sub(shape.footer_rows);
    rows.truncate(keep);

    Ok(RawTable::new(columns, rows))
}
