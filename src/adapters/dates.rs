//! Publisher-specific date grammars.
//!
//! Each publisher's grammar is fixed; a value that does not match parses to
//! a `DateFormat` error, never to a silently null date. A misparse here
//! would corrupt every downstream date-based filter.

use chrono::NaiveDate;

use crate::pipeline_error::PipelineError;

fn first_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or("")
}

fn date_error(
    publisher: &'static str,
    field: &'static str,
    value: &str,
    expected: &'static str,
) -> PipelineError {
    PipelineError::DateFormat {
        publisher,
        field,
        value: value.to_string(),
        expected,
    }
}

/// `YYYY/MM/DD HH:MM` or `DD/MM/YYYY HH:MM`, distinguished by the position
/// of the first slash. Used by Bluematrix.
pub fn slash_date_any_order(
    value: &str,
    publisher: &'static str,
    field: &'static str,
) -> Result<NaiveDate, PipelineError> {
    let date = first_token(value);
    let format = if date.as_bytes().get(2) == Some(&b'/') {
        "%d/%m/%Y"
    } else {
        "%Y/%m/%d"
    };
    NaiveDate::parse_from_str(date, format)
        .map_err(|_| date_error(publisher, field, value, "YYYY/MM/DD or DD/MM/YYYY"))
}

/// `DD-MonthName-YYYY HH:MM AM/PM`. Used by Factset.
pub fn day_month_name_year(
    value: &str,
    publisher: &'static str,
    field: &'static str,
) -> Result<NaiveDate, PipelineError> {
    let date = first_token(value);
    NaiveDate::parse_from_str(date, "%d-%B-%Y")
        .or_else(|_| NaiveDate::parse_from_str(date, "%d-%b-%Y"))
        .map_err(|_| date_error(publisher, field, value, "DD-MonthName-YYYY"))
}

/// `MM/DD/YYYY` with an optional trailing time. Used by Refinitiv and
/// CapitalIq.
pub fn month_day_year(
    value: &str,
    publisher: &'static str,
    field: &'static str,
) -> Result<NaiveDate, PipelineError> {
    let date = first_token(value);
    NaiveDate::parse_from_str(date, "%m/%d/%Y")
        .map_err(|_| date_error(publisher, field, value, "MM/DD/YYYY"))
}

/// `YYYY/MM/DD`, date only. Used by Quick.
pub fn year_slash_date(
    value: &str,
    publisher: &'static str,
    field: &'static str,
) -> Result<NaiveDate, PipelineError> {
    NaiveDate::parse_from_str(value.trim(), "%Y/%m/%d")
        .map_err(|_| date_error(publisher, field, value, "YYYY/MM/DD"))
}

/// `MonthName DD, YYYY`. Used by Smartkarma.
pub fn month_name_day_year(
    value: &str,
    publisher: &'static str,
    field: &'static str,
) -> Result<NaiveDate, PipelineError> {
    let date = value.trim();
    NaiveDate::parse_from_str(date, "%B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(date, "%b %d, %Y"))
        .map_err(|_| date_error(publisher, field, value, "MonthName DD, YYYY"))
}

/// `YYYY-MM-DD` with an optional trailing time. Used by Hubspot.
pub fn iso_date_prefix(
    value: &str,
    publisher: &'static str,
    field: &'static str,
) -> Result<NaiveDate, PipelineError> {
    let date = first_token(value);
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| date_error(publisher, field, value, "YYYY-MM-DD"))
}

/// Mailchimp event dates come in three forms, distinguished by length:
/// `YYYY-MM-DD HH:MM:SS` (19), `DD/MM/YYYY HH:MM` (16), `DD/MM/YYYY`.
pub fn mailchimp_date(
    value: &str,
    publisher: &'static str,
    field: &'static str,
) -> Result<NaiveDate, PipelineError> {
    let expected = "YYYY-MM-DD HH:MM:SS, DD/MM/YYYY HH:MM or DD/MM/YYYY";
    let trimmed = value.trim();
    let date = first_token(trimmed);
    let format = match trimmed.len() {
        19 => "%Y-%m-%d",
        _ => "%d/%m/%Y",
    };
    NaiveDate::parse_from_str(date, format)
        .map_err(|_| date_error(publisher, field, value, expected))
}
