//! File-discovery contract for source and master directories.
//!
//! "Latest file" means the lexicographically-last filename when sorted
//! descending. Callers must name files so that lexicographic order matches
//! intended recency (the convention here is a leading ISO date, e.g.
//! `2024-03-07 Factset Precleaned.csv`). Timestamps are never inferred
//! from file contents or metadata.

use std::fs;
use std::path::{Path, PathBuf};

use crate::importers::ImportError;

/// All regular files in a directory, sorted ascending by filename.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// The lexicographically-last file in a directory, or `None` when empty.
pub fn latest_file(dir: &Path) -> Result<Option<PathBuf>, ImportError> {
    Ok(list_files(dir)?.pop())
}
