//! Quick download-log exports.
//!
//! The export is headerless (column names are injected by the importer from
//! `Publisher::explicit_column_names`) and carries no user, location or
//! transaction-key columns; those fields stay at the sentinel. With no
//! genuine transaction key, deduplication is disabled for this publisher;
//! identical rows are distinct download events.

use crate::adapters::dates;
use crate::pipeline_error::PipelineError;
use crate::record::{is_undisclosed_firm, CanonicalRecord, RawTable};

const PLATFORM: &str = "Quick";

pub fn adapt(table: &RawTable) -> Result<Vec<CanonicalRecord>, PipelineError> {
    let read_date = table.require_column("Read Date", PLATFORM)?;
    let firm_name = table.require_column("Firm Name", PLATFORM)?;
    let post_date = table.require_column("Post Date", PLATFORM)?;
    let title = table.require_column("Report Title", PLATFORM)?;

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let firm = table.cell(row, firm_name);
        if is_undisclosed_firm(firm) {
            continue;
        }

        records.push(CanonicalRecord {
            read_date: dates::year_slash_date(table.cell(row, read_date), PLATFORM, "Read Date")?,
            post_date: dates::year_slash_date(table.cell(row, post_date), PLATFORM, "Post Date")?,
            firm_name: firm.to_string(),
            report_title: table.cell(row, title).to_string(),
            platform: PLATFORM.to_string(),
            ..CanonicalRecord::unresolved()
        });
    }

    Ok(records)
}
