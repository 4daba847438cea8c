//! Per-publisher adapters mapping raw export schemas onto the canonical
//! record shape.
//!
//! Publishers form a closed set: one enum variant per known platform, with
//! exhaustiveness-checked dispatch. Adding or removing a publisher is a
//! type-level change, not a runtime table edit.

pub mod bluematrix;
pub mod capitaliq;
pub mod dates;
pub mod factset;
pub mod hubspot;
pub mod mailchimp;
pub mod quick;
pub mod refinitiv;
pub mod smartkarma;

use crate::pipeline_error::PipelineError;
use crate::record::{CanonicalRecord, RawTable};

/// Deduplication policy applied after adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Keep the first record per Transaction ID, drop the rest.
    ByTransactionId,
    /// Keep every row. Used by publishers whose exports carry no genuine
    /// transaction key: duplicate rows there are distinct unlogged events,
    /// not redundant copies.
    KeepAll,
}

/// The known publishers, one variant per fixed raw schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Publisher {
    Bluematrix,
    Factset,
    Refinitiv,
    Quick,
    CapitalIq,
    Smartkarma,
    Hubspot,
    Mailchimp,
}

impl Publisher {
    pub const ALL: [Publisher; 8] = [
        Publisher::Bluematrix,
        Publisher::Factset,
        Publisher::Refinitiv,
        Publisher::Quick,
        Publisher::CapitalIq,
        Publisher::Smartkarma,
        Publisher::Hubspot,
        Publisher::Mailchimp,
    ];

    /// Platform identifier as it appears in canonical records, master files
    /// and folder names.
    pub fn name(&self) -> &'static str {
        match self {
            Publisher::Bluematrix => "Bluematrix",
            Publisher::Factset => "Factset",
            Publisher::Refinitiv => "Refinitiv",
            Publisher::Quick => "Quick",
            Publisher::CapitalIq => "CapitalIq",
            Publisher::Smartkarma => "Smartkarma",
            Publisher::Hubspot => "Hubspot",
            Publisher::Mailchimp => "Mailchimp",
        }
    }

    pub fn from_name(name: &str) -> Result<Publisher, PipelineError> {
        Publisher::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| PipelineError::UnknownPublisher(name.to_string()))
    }

    /// Explicit column names for headerless exports, `None` otherwise.
    ///
    /// The Quick export carries no header row; throwaway columns are given
    /// placeholder digit names and dropped by the adapter.
    pub fn explicit_column_names(&self) -> Option<&'static [&'static str]> {
        match self {
            Publisher::Quick => Some(&[
                "Read Date",
                "0",
                "Firm Name",
                "1",
                "2",
                "Post Date",
                "Report Title",
                "3",
                "4",
            ]),
            _ => None,
        }
    }

    pub fn dedup_policy(&self) -> DedupPolicy {
        match self {
            // No reliable unique transaction key in these exports.
            Publisher::Quick | Publisher::Smartkarma | Publisher::Hubspot => DedupPolicy::KeepAll,
            Publisher::Bluematrix
            | Publisher::Factset
            | Publisher::Refinitiv
            | Publisher::CapitalIq
            | Publisher::Mailchimp => DedupPolicy::ByTransactionId,
        }
    }

    /// Publishers whose firm names are recovered from email domains before
    /// entity resolution.
    pub fn uses_domain_resolution(&self) -> bool {
        matches!(self, Publisher::Hubspot | Publisher::Mailchimp)
    }

    /// Map a raw export batch into canonical records.
    pub fn adapt(&self, table: &RawTable) -> Result<Vec<CanonicalRecord>, PipelineError> {
        match self {
            Publisher::Bluematrix => bluematrix::adapt(table),
            Publisher::Factset => factset::adapt(table),
            Publisher::Refinitiv => refinitiv::adapt(table),
            Publisher::Quick => quick::adapt(table),
            Publisher::CapitalIq => capitaliq::adapt(table),
            Publisher::Smartkarma => smartkarma::adapt(table),
            Publisher::Hubspot => hubspot::adapt(table),
            Publisher::Mailchimp => mailchimp::adapt(table),
        }
    }
}

impl std::fmt::Display for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
