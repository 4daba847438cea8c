//! Smartkarma report-analytics exports.
//!
//! The export is aggregated: one row per report with a platform view count.
//! Each row fans out into N identical records, one per anonymous view
//! event, with the publish date standing in for the read date. All identity
//! fields are sentinel and there is no transaction key, so deduplication is
//! disabled for this publisher.

use crate::adapters::dates;
use crate::pipeline_error::PipelineError;
use crate::record::{CanonicalRecord, RawTable};

const PLATFORM: &str = "Smartkarma";

pub fn adapt(table: &RawTable) -> Result<Vec<CanonicalRecord>, PipelineError> {
    let published = table.require_column("Published", PLATFORM)?;
    let title = table.require_column("Title", PLATFORM)?;
    let views = table.require_column("Platform Views*", PLATFORM)?;

    let mut records = Vec::new();
    for row in 0..table.len() {
        let count = parse_view_count(table.cell(row, views))?;
        let date = dates::month_name_day_year(table.cell(row, published), PLATFORM, "Published")?;

        for _ in 0..count {
            records.push(CanonicalRecord {
                read_date: date,
                post_date: date,
                report_title: table.cell(row, title).to_string(),
                platform: PLATFORM.to_string(),
                ..CanonicalRecord::unresolved()
            });
        }
    }

    Ok(records)
}

fn parse_view_count(value: &str) -> Result<usize, PipelineError> {
    let trimmed = value.trim();
    trimmed
        .parse::<usize>()
        .or_else(|_| trimmed.parse::<f64>().map(|f| f as usize))
        .map_err(|_| PipelineError::MalformedRow {
            publisher: PLATFORM,
            msg: format!("view count '{value}' is not a number"),
        })
}
