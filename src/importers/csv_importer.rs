//! Delimited-text reader with per-file encoding detection.
//!
//! Publisher CSV exports arrive in unknown and inconsistent encodings
//! (UTF-8, Shift_JIS, Windows-1252 have all been seen). The encoding is
//! sniffed from the raw bytes before parsing; detection never hard-fails.
//! The detector always commits to a best guess, and invalid byte sequences
//! are replaced during decoding.

use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use tracing::debug;

use crate::importers::ImportError;

/// Read a delimited-text file as rows of strings.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, ImportError> {
    let bytes = fs::read(path)?;
    let text = decode_bytes(&bytes, path);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

/// Detect the encoding of `bytes` and decode them, replacing invalid
/// sequences rather than failing.
fn decode_bytes(bytes: &[u8], path: &Path) -> String {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(
            "Replaced invalid {} byte sequences while decoding {}",
            encoding.name(),
            path.display()
        );
    } else {
        debug!("Decoded {} as {}", path.display(), encoding.name());
    }
    text.into_owned()
}
