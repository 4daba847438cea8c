// Tests for the delimited-text import path: encodings, table shaping and
// multi-file batch loading.

use std::fs;
use std::path::Path;

use readership_pipeline::importers::{load_raw_batch, read_table, ImportError, TableShape};

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_read_csv_as_strings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "export.csv",
        "Read Date,Firm Name\n2024/03/07,Alpha Asset Management\n",
    );

    let table = read_table(&path, &TableShape::headered()).unwrap().unwrap();
    assert_eq!(table.columns(), ["Read Date", "Firm Name"]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.cell(0, 1), "Alpha Asset Management");
}

#[test]
fn test_read_shift_jis_csv() {
    let dir = tempfile::tempdir().unwrap();
    let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode("Firm Name\n非公開\n");
    let path = dir.path().join("export.csv");
    fs::write(&path, encoded).unwrap();

    let table = read_table(&path, &TableShape::headered()).unwrap().unwrap();
    assert_eq!(table.cell(0, 0), "非公開");
}

#[test]
fn test_header_and_footer_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "export.csv",
        "Report for March\nA,B\n1,2\n3,4\nTotals,6\n",
    );
    let shape = TableShape {
        header_rows: 1,
        footer_rows: 1,
        column_names: None,
    };

    let table = read_table(&path, &shape).unwrap().unwrap();
    assert_eq!(table.columns(), ["A", "B"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(1, 0), "3");
}

#[test]
fn test_headerless_export_gets_explicit_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "export.csv", "2024/03/07,x\n2024/03/08,y\n");
    let shape = TableShape {
        header_rows: 0,
        footer_rows: 0,
        column_names: Some(vec!["Read Date".into(), "0".into()]),
    };

    let table = read_table(&path, &shape).unwrap().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, 0), "2024/03/07");
}

#[test]
fn test_unsupported_extension_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "notes.txt", "not a table");
    assert!(read_table(&path, &TableShape::headered())
        .unwrap()
        .is_none());
}

#[test]
fn test_batch_aligns_columns_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_file(dir.path(), "a.csv", "A,B\n1,2\n");
    let second = write_file(dir.path(), "b.csv", "B,A\nx,y\n");

    let table = load_raw_batch(&[first, second], &TableShape::headered()).unwrap();
    assert_eq!(table.columns(), ["A", "B"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(1, 0), "y");
    assert_eq!(table.cell(1, 1), "x");
}

#[test]
fn test_batch_with_only_unsupported_files_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "notes.txt", "not a table");

    let result = load_raw_batch(&[path], &TableShape::headered());
    assert!(matches!(result, Err(ImportError::NoUsableFiles(1))));
}
