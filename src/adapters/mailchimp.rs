//! Mailchimp email-event exports.
//!
//! Rows are raw delivery events: only `OPEN` events held open for more than
//! three seconds count as readership. The email subject stands in for the
//! report title, and firms are recovered later from recipient domains.

use crate::adapters::dates;
use crate::pipeline_error::PipelineError;
use crate::record::{is_blocked_email, CanonicalRecord, RawTable, SENTINEL};

const PLATFORM: &str = "Mailchimp";

/// Opens at or below this duration are treated as accidental, not reads.
const MIN_OPEN_DURATION_MS: f64 = 3000.0;

pub fn adapt(table: &RawTable) -> Result<Vec<CanonicalRecord>, PipelineError> {
    let recipient = table.require_column("Recipient", PLATFORM)?;
    let subject = table.require_column("Subject", PLATFORM)?;
    let event_type = table.require_column("Event Type", PLATFORM)?;
    let event_id = table.require_column("Event ID", PLATFORM)?;
    let read_date = table.require_column("Event Created Date (Your time zone)", PLATFORM)?;
    let city = table.require_column("City", PLATFORM)?;
    let country = table.require_column("Country", PLATFORM)?;
    let duration = table.require_column("Open duration (ms)", PLATFORM)?;

    // Post date placeholder; the real post date comes from the title master.
    let post_date = dates::mailchimp_date("31/12/2000", PLATFORM, "Post Date")?;

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        if table.cell(row, event_type) != "OPEN" {
            continue;
        }
        let open_ms = parse_duration_ms(table.cell(row, duration))?;
        if open_ms <= MIN_OPEN_DURATION_MS {
            continue;
        }
        let address = table.cell(row, recipient);
        if is_blocked_email(address) {
            continue;
        }

        records.push(CanonicalRecord {
            read_date: dates::mailchimp_date(table.cell(row, read_date), PLATFORM, "Read Date")?,
            post_date,
            email: address.to_string(),
            city: or_sentinel(table.cell(row, city)),
            country: or_sentinel(table.cell(row, country)),
            report_title: table.cell(row, subject).to_string(),
            platform: PLATFORM.to_string(),
            transaction_id: table.cell(row, event_id).to_string(),
            ..CanonicalRecord::unresolved()
        });
    }

    Ok(records)
}

fn or_sentinel(value: &str) -> String {
    if value.is_empty() {
        SENTINEL.to_string()
    } else {
        value.to_string()
    }
}

fn parse_duration_ms(value: &str) -> Result<f64, PipelineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        // Delivery events carry no duration; they are filtered out anyway,
        // but OPEN rows without one read as zero.
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| PipelineError::MalformedRow {
            publisher: PLATFORM,
            msg: format!("open duration '{value}' is not a number"),
        })
}
