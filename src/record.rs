//! Core record shapes shared by every pipeline stage.
//!
//! Publisher exports arrive as string-typed tables (`RawTable`) with
//! publisher-specific schemas; every adapter converges them onto one
//! `CanonicalRecord` shape that the rest of the pipeline operates on.

use chrono::NaiveDate;

use crate::pipeline_error::PipelineError;

/// Placeholder token for undisclosed or unknown values.
pub const SENTINEL: &str = "非公開";

/// Lowercased firm-name marker for entities that must never appear in output.
pub const NON_DISCLOSED_FIRM_MARKER: &str = "non-disclosed company name";

/// Email domain whose recipients must never appear in output.
pub const NON_DISCLOSED_EMAIL_DOMAIN: &str = "@non-disclosedcompany.com";

/// Individual addresses excluded alongside the non-disclosed domain.
pub const BLOCKED_EMAILS: [&str; 2] = ["company@hotmail.com", "user@hotmail.com"];

/// Raw values that carry no information and collapse to the sentinel.
///
/// The empty string covers cells that were blank in the source file; the
/// rest are source-specific masking vocabularies.
pub const PLACEHOLDER_VALUES: [&str; 9] = [
    "***",
    "N/A - Free Content",
    "Restricted",
    "nan",
    "",
    "Unattributed",
    "Embargoed",
    "EMBARGOED",
    "Unknown",
];

/// Column order of persisted precleaned files (post-adapter, pre-resolver).
pub const PRECLEAN_COLUMNS: [&str; 10] = [
    "Read Date",
    "Post Date",
    "Firm Name",
    "User Name",
    "Email",
    "City",
    "Country",
    "Report Title",
    "Platform",
    "Transaction ID",
];

/// Column order of persisted clean files (post-resolver, per customer).
pub const CLEAN_COLUMNS: [&str; 10] = [
    "Read Date",
    "Firm Name",
    "City",
    "Country",
    "Post Date",
    "Report Title",
    "Title",
    "Platform",
    "Investor Type",
    "Investor Style",
];

/// Column order of the missing-client ledger (full record plus the flag).
pub const LEDGER_COLUMNS: [&str; 14] = [
    "Read Date",
    "Post Date",
    "Firm Name",
    "User Name",
    "Email",
    "City",
    "Country",
    "Report Title",
    "Title",
    "Platform",
    "Transaction ID",
    "Investor Type",
    "Investor Style",
    "In Client Master",
];

/// Column order of the readership summary file (Report Title is dropped,
/// `Updated On` carries the processing date).
pub const READERSHIP_COLUMNS: [&str; 10] = [
    "Read Date",
    "Firm Name",
    "City",
    "Country",
    "Post Date",
    "Title",
    "Platform",
    "Investor Type",
    "Investor Style",
    "Updated On",
];

/// One row of a publisher export after adaptation.
///
/// `title`, `investor_type`, `investor_style` and `in_client_master` are
/// owned by the resolvers; adapters leave them at their unresolved defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    pub read_date: NaiveDate,
    pub post_date: NaiveDate,
    pub firm_name: String,
    pub user_name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub report_title: String,
    pub title: String,
    pub platform: String,
    pub transaction_id: String,
    pub investor_type: String,
    pub investor_style: String,
    pub in_client_master: bool,
}

impl CanonicalRecord {
    /// Base value for struct-update syntax in adapters.
    ///
    /// Dates are placeholders and must be overwritten by the adapter; the
    /// resolver-owned fields start at the sentinel / `false`.
    pub fn unresolved() -> Self {
        CanonicalRecord {
            read_date: NaiveDate::MIN,
            post_date: NaiveDate::MIN,
            firm_name: SENTINEL.to_string(),
            user_name: SENTINEL.to_string(),
            email: SENTINEL.to_string(),
            city: SENTINEL.to_string(),
            country: SENTINEL.to_string(),
            report_title: String::new(),
            title: String::new(),
            platform: String::new(),
            transaction_id: SENTINEL.to_string(),
            investor_type: SENTINEL.to_string(),
            investor_style: SENTINEL.to_string(),
            in_client_master: false,
        }
    }
}

/// A string-typed table read from a publisher export or master file.
///
/// Values are kept as text to avoid type-inference surprises across the
/// mixed encodings and formats of the source files; adapters parse what
/// they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column index or a `MissingColumn` error naming the publisher.
    pub fn require_column(
        &self,
        name: &str,
        publisher: &'static str,
    ) -> Result<usize, PipelineError> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                publisher,
                column: name.to_string(),
            })
    }

    /// Cell value; short rows read as empty cells.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Append another table's rows, aligning its columns by name.
    ///
    /// Columns present in `other` but not in `self` are dropped; columns
    /// missing from `other` read as empty cells.
    pub fn extend_aligned(&mut self, other: RawTable) {
        if self.columns == other.columns {
            self.rows.extend(other.rows);
            return;
        }

        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|name| other.columns.iter().position(|c| c == name))
            .collect();

        for row in &other.rows {
            let aligned: Vec<String> = mapping
                .iter()
                .map(|src| {
                    src.and_then(|i| row.get(i).cloned())
                        .unwrap_or_default()
                })
                .collect();
            self.rows.push(aligned);
        }
    }
}

/// True when a firm name identifies a contractually undisclosed entity.
pub fn is_undisclosed_firm(firm_name: &str) -> bool {
    firm_name.to_lowercase().contains(NON_DISCLOSED_FIRM_MARKER)
}

/// True when an email address belongs to an excluded recipient.
pub fn is_blocked_email(email: &str) -> bool {
    email.ends_with(NON_DISCLOSED_EMAIL_DOMAIN) || BLOCKED_EMAILS.contains(&email)
}
