//! Title resolution against the per-customer title master.

use tracing::warn;

use crate::masters::TitleMaster;
use crate::record::CanonicalRecord;

pub struct TitleResolver<'a> {
    titles: &'a TitleMaster,
}

impl<'a> TitleResolver<'a> {
    pub fn new(titles: &'a TitleMaster) -> Self {
        TitleResolver { titles }
    }

    /// Canonical short title for a free-text report title.
    ///
    /// Primary key: the master title as a case-insensitive substring of the
    /// report title. Fallback: the content key, compared with all spaces
    /// removed, since publishers re-wrap titles inconsistently. Master order
    /// decides ties; an unmatched title passes through unchanged.
    pub fn resolve_title(&self, report_title: &str) -> String {
        let haystack = report_title.to_lowercase();
        for entry in self.titles.entries() {
            if haystack.contains(&entry.title.to_lowercase()) {
                return entry.title.clone();
            }
        }

        let stripped = haystack.replace(' ', "");
        for entry in self.titles.entries() {
            let key = entry.content.replace(' ', "").to_lowercase();
            if !key.is_empty() && stripped.contains(&key) {
                return entry.title.clone();
            }
        }

        report_title.to_string()
    }

    /// Resolve titles and overwrite post dates from the master.
    ///
    /// Rows whose resolved title has no post date in the master are dropped;
    /// their read events cannot be attributed to a known report.
    pub fn apply(&self, records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
        let mut resolved = Vec::with_capacity(records.len());
        for mut record in records {
            record.title = self.resolve_title(&record.report_title);
            match self.titles.post_date_for(&record.title) {
                Some(post_date) => {
                    record.post_date = post_date;
                    resolved.push(record);
                }
                None => {
                    warn!(
                        "Dropping {} row: no post date in title master for '{}'",
                        record.platform, record.title
                    );
                }
            }
        }
        resolved
    }
}
