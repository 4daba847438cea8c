//! Factset readership-event exports. The only publisher whose export
//! already carries a Platform column; it is passed through as-is.

use crate::adapters::dates;
use crate::pipeline_error::PipelineError;
use crate::record::{is_undisclosed_firm, CanonicalRecord, RawTable};

const PLATFORM: &str = "Factset";

pub fn adapt(table: &RawTable) -> Result<Vec<CanonicalRecord>, PipelineError> {
    let read_date = table.require_column("Date/time read", PLATFORM)?;
    let platform = table.require_column("Platform", PLATFORM)?;
    let firm_name = table.require_column("Parent Firm name", PLATFORM)?;
    let user_name = table.require_column("Reader name", PLATFORM)?;
    let email = table.require_column("E-mail", PLATFORM)?;
    let city = table.require_column("City", PLATFORM)?;
    let country = table.require_column("Country", PLATFORM)?;
    let transaction_id = table.require_column("Readership Event ID", PLATFORM)?;
    let post_date = table.require_column("Date/time published", PLATFORM)?;
    let title = table.require_column("Report title", PLATFORM)?;

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let firm = table.cell(row, firm_name);
        if is_undisclosed_firm(firm) {
            continue;
        }

        records.push(CanonicalRecord {
            read_date: dates::day_month_name_year(table.cell(row, read_date), PLATFORM, "Read Date")?,
            post_date: dates::day_month_name_year(table.cell(row, post_date), PLATFORM, "Post Date")?,
            firm_name: firm.to_string(),
            user_name: table.cell(row, user_name).to_string(),
            email: table.cell(row, email).to_string(),
            city: table.cell(row, city).to_string(),
            country: table.cell(row, country).to_string(),
            report_title: table.cell(row, title).to_string(),
            platform: table.cell(row, platform).to_string(),
            transaction_id: table.cell(row, transaction_id).to_string(),
            ..CanonicalRecord::unresolved()
        });
    }

    Ok(records)
}
