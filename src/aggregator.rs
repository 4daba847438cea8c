//! Per-customer aggregation: stock-code filtering, known/missing
//! partitioning, ledger union merge, readership-report assembly.

use chrono::NaiveDate;

use crate::record::CanonicalRecord;

/// Keep only records whose report title carries the customer's stock code.
///
/// The match is case-sensitive substring: stock codes are digits and the
/// titles embed them verbatim, e.g. `(1234) Q3 Results`.
pub fn filter_by_stock_code(records: Vec<CanonicalRecord>, stock_code: &str) -> Vec<CanonicalRecord> {
    records
        .into_iter()
        .filter(|r| r.report_title.contains(stock_code))
        .collect()
}

/// Split a resolved batch into (known clients, missing clients).
pub fn partition_known(
    records: Vec<CanonicalRecord>,
) -> (Vec<CanonicalRecord>, Vec<CanonicalRecord>) {
    records.into_iter().partition(|r| r.in_client_master)
}

/// Set-union merge of ledger rows: every row from `existing` plus every row
/// of `incoming` not already present, first occurrence kept, order
/// preserved. Rows already in the ledger are never duplicated or pruned.
pub fn union_rows(existing: Vec<Vec<String>>, incoming: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut seen: std::collections::HashSet<Vec<String>> = std::collections::HashSet::new();
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    for row in existing.into_iter().chain(incoming) {
        if seen.insert(row.clone()) {
            merged.push(row);
        }
    }
    merged
}

/// Assemble the readership summary from concatenated clean-file rows.
///
/// Input rows follow the clean-file column order; the Report Title column
/// is dropped, rows are sorted ascending by Read Date, and every row is
/// stamped with the processing date. Read dates are ISO-formatted, so the
/// string sort is chronological.
pub fn build_readership(mut rows: Vec<Vec<String>>, updated_on: NaiveDate) -> Vec<Vec<String>> {
    const REPORT_TITLE_COL: usize = 5;

    rows.sort_by(|a, b| a.first().cmp(&b.first()));
    for row in &mut rows {
        if REPORT_TITLE_COL < row.len() {
            row.remove(REPORT_TITLE_COL);
        }
        row.push(updated_on.format("%Y-%m-%d").to_string());
    }
    rows
}
