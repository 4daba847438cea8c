//! CapitalIq activity-log exports. No user, email or location columns.

use crate::adapters::dates;
use crate::pipeline_error::PipelineError;
use crate::record::{is_undisclosed_firm, CanonicalRecord, RawTable};

const PLATFORM: &str = "CapitalIq";

pub fn adapt(table: &RawTable) -> Result<Vec<CanonicalRecord>, PipelineError> {
    let read_date = table.require_column("Activity Date", PLATFORM)?;
    let firm_name = table.require_column("Client Name", PLATFORM)?;
    let transaction_id = table.require_column("Activity Id", PLATFORM)?;
    let post_date = table.require_column("Document Posted Date", PLATFORM)?;
    let title = table.require_column("Headline", PLATFORM)?;

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let firm = table.cell(row, firm_name);
        if is_undisclosed_firm(firm) {
            continue;
        }

        records.push(CanonicalRecord {
            read_date: dates::month_day_year(table.cell(row, read_date), PLATFORM, "Read Date")?,
            post_date: dates::month_day_year(table.cell(row, post_date), PLATFORM, "Post Date")?,
            firm_name: firm.to_string(),
            report_title: table.cell(row, title).to_string(),
            platform: PLATFORM.to_string(),
            transaction_id: table.cell(row, transaction_id).to_string(),
            ..CanonicalRecord::unresolved()
        });
    }

    Ok(records)
}
