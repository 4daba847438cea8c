use std::path::PathBuf;

use crate::importers::ImportError;

/// Errors surfaced at the pipeline boundary.
///
/// Structural failures (bad configuration, unrecognized date grammar) are
/// errors; data gaps (unknown firm, unmatched title) are not. Those are
/// modeled as sentinel values and flags on the records themselves.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unknown publisher '{0}': add it to the publisher master and retry")]
    UnknownPublisher(String),

    #[error("unknown customer '{0}': add it to the customer stock code master and retry")]
    UnknownCustomer(String),

    #[error("{publisher} export is missing required column '{column}'")]
    MissingColumn {
        publisher: &'static str,
        column: String,
    },

    #[error("unrecognized {field} '{value}' in {publisher} export: expected {expected}")]
    DateFormat {
        publisher: &'static str,
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("malformed {publisher} row: {msg}")]
    MalformedRow {
        publisher: &'static str,
        msg: String,
    },

    #[error("no source files found in {}", .0.display())]
    EmptySource(PathBuf),

    #[error("master file error: {0}")]
    Master(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
