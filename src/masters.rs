//! Lookup tables loaded from the master files.
//!
//! All of these are immutable value objects constructed once per run and
//! passed by reference into the pipeline stages. Entry order is preserved
//! exactly as loaded; lookups are first-match-wins, so the master file's
//! row order is part of its meaning.

use chrono::NaiveDate;
use tracing::warn;

use crate::adapters::Publisher;
use crate::importers::TableShape;
use crate::pipeline_error::PipelineError;
use crate::record::{RawTable, SENTINEL};

/// One firm the business has a relationship with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMasterEntry {
    pub firm_name: String,
    pub domain: String,
    pub investor_type: String,
    pub investor_style: String,
    pub city: String,
    pub country: String,
}

/// The client master: firm identity, classification and location.
#[derive(Debug, Clone, Default)]
pub struct ClientMaster {
    entries: Vec<ClientMasterEntry>,
}

impl ClientMaster {
    pub fn new(entries: Vec<ClientMasterEntry>) -> Self {
        ClientMaster { entries }
    }

    pub fn from_table(table: &RawTable) -> Result<Self, PipelineError> {
        let firm = table.require_column("Client", "client master")?;
        let domain = table.require_column("Domain", "client master")?;
        let investor_type = table.require_column("Investor Type", "client master")?;
        let investor_style = table.require_column("Investor Style", "client master")?;
        let city = table.require_column("City", "client master")?;
        let country = table.require_column("Country", "client master")?;

        let entries = (0..table.len())
            .map(|row| ClientMasterEntry {
                firm_name: table.cell(row, firm).to_string(),
                domain: table.cell(row, domain).to_string(),
                investor_type: table.cell(row, investor_type).to_string(),
                investor_style: table.cell(row, investor_style).to_string(),
                city: table.cell(row, city).to_string(),
                country: table.cell(row, country).to_string(),
            })
            .collect();
        Ok(ClientMaster { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive exact firm-name match, first match wins.
    pub fn find(&self, firm_name: &str) -> Option<&ClientMasterEntry> {
        let needle = firm_name.to_uppercase();
        self.entries
            .iter()
            .find(|e| e.firm_name.to_uppercase() == needle)
    }

    /// Firm name for an email domain's first label (`fund` in
    /// `fund.example.com`), first match wins.
    pub fn firm_for_domain(&self, domain_label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.domain.eq_ignore_ascii_case(domain_label))
            .map(|e| e.firm_name.as_str())
    }
}

/// One known report: canonical short title, content key, publication date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMasterEntry {
    pub title: String,
    pub content: String,
    pub post_date: NaiveDate,
}

/// The per-customer report title master.
#[derive(Debug, Clone, Default)]
pub struct TitleMaster {
    entries: Vec<TitleMasterEntry>,
}

impl TitleMaster {
    pub fn new(entries: Vec<TitleMasterEntry>) -> Self {
        TitleMaster { entries }
    }

    pub fn from_table(table: &RawTable) -> Result<Self, PipelineError> {
        let title = table.require_column("Title", "title master")?;
        let content = table.require_column("Content", "title master")?;
        let post_date = table.require_column("Post Date", "title master")?;

        let mut entries = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            entries.push(TitleMasterEntry {
                title: table.cell(row, title).to_string(),
                content: table.cell(row, content).to_string(),
                post_date: parse_master_date(table.cell(row, post_date))?,
            });
        }
        Ok(TitleMaster { entries })
    }

    pub fn entries(&self) -> &[TitleMasterEntry] {
        &self.entries
    }

    /// Post date for an exactly resolved title, first match wins.
    pub fn post_date_for(&self, title: &str) -> Option<NaiveDate> {
        self.entries
            .iter()
            .find(|e| e.title == title)
            .map(|e| e.post_date)
    }
}

/// Publisher-supplied country spellings the standard ISO table gets wrong
/// (or renders too formally), keyed on the post-ISO name.
#[derive(Debug, Clone, Default)]
pub struct CountryOverrides {
    pairs: Vec<(String, String)>,
}

impl CountryOverrides {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        CountryOverrides { pairs }
    }

    pub fn from_table(table: &RawTable) -> Result<Self, PipelineError> {
        Ok(CountryOverrides {
            pairs: load_pairs(table, "Country Code", "Country", "country mapping master")?,
        })
    }

    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(from, _)| from == name)
            .map(|(_, to)| to.as_str())
            .unwrap_or(name)
    }
}

/// City spellings that are really sub-districts of a bigger city.
#[derive(Debug, Clone, Default)]
pub struct CityAliases {
    pairs: Vec<(String, String)>,
}

impl CityAliases {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        CityAliases { pairs }
    }

    pub fn from_table(table: &RawTable) -> Result<Self, PipelineError> {
        Ok(CityAliases {
            pairs: load_pairs(table, "Wrong City", "Correct City", "city mapping master")?,
        })
    }

    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(from, _)| from == name)
            .map(|(_, to)| to.as_str())
            .unwrap_or(name)
    }
}

/// Per-publisher file shaping from the publisher master: header and footer
/// row counts around the table body.
#[derive(Debug, Clone, Default)]
pub struct PublisherFormats {
    formats: Vec<(Publisher, usize, usize)>,
}

impl PublisherFormats {
    pub fn from_table(table: &RawTable) -> Result<Self, PipelineError> {
        let publisher = table.require_column("Publisher", "publisher master")?;
        let header = table.require_column("Header", "publisher master")?;
        let footer = table.require_column("Footer", "publisher master")?;

        let mut formats = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let name = table.cell(row, publisher);
            // Retired or not-yet-supported rows in the shared master must
            // not block the publishers that are supported.
            let Ok(known) = Publisher::from_name(name) else {
                warn!("Skipping unsupported publisher '{}' in publisher master", name);
                continue;
            };
            formats.push((
                known,
                parse_count(table.cell(row, header))?,
                parse_count(table.cell(row, footer))?,
            ));
        }
        Ok(PublisherFormats { formats })
    }

    /// The file shape for a publisher, including any explicit column names
    /// the publisher's headerless exports need.
    pub fn shape_for(&self, publisher: Publisher) -> Result<TableShape, PipelineError> {
        let (_, header_rows, footer_rows) = self
            .formats
            .iter()
            .find(|(p, _, _)| *p == publisher)
            .ok_or_else(|| PipelineError::UnknownPublisher(publisher.name().to_string()))?;

        Ok(TableShape {
            header_rows: *header_rows,
            footer_rows: *footer_rows,
            column_names: publisher
                .explicit_column_names()
                .map(|names| names.iter().map(|n| n.to_string()).collect()),
        })
    }
}

/// The customer → stock code table.
#[derive(Debug, Clone, Default)]
pub struct CustomerTable {
    pairs: Vec<(String, String)>,
}

impl CustomerTable {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        CustomerTable { pairs }
    }

    pub fn from_table(table: &RawTable) -> Result<Self, PipelineError> {
        Ok(CustomerTable {
            pairs: load_pairs(table, "Customer", "Stock Code", "customer stock code master")?,
        })
    }

    pub fn customers(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(customer, _)| customer.as_str())
    }

    pub fn stock_code(&self, customer: &str) -> Result<&str, PipelineError> {
        self.pairs
            .iter()
            .find(|(name, _)| name == customer)
            .map(|(_, code)| code.as_str())
            .ok_or_else(|| PipelineError::UnknownCustomer(customer.to_string()))
    }
}

fn load_pairs(
    table: &RawTable,
    from: &str,
    to: &str,
    master: &'static str,
) -> Result<Vec<(String, String)>, PipelineError> {
    let from_col = table.require_column(from, master)?;
    let to_col = table.require_column(to, master)?;
    Ok((0..table.len())
        .map(|row| {
            (
                table.cell(row, from_col).to_string(),
                table.cell(row, to_col).to_string(),
            )
        })
        .collect())
}

/// Master files hold header/footer counts as plain integers, but a
/// spreadsheet round-trip can render them as floats.
fn parse_count(value: &str) -> Result<usize, PipelineError> {
    let trimmed = value.trim();
    trimmed
        .parse::<usize>()
        .or_else(|_| trimmed.parse::<f64>().map(|f| f as usize))
        .map_err(|_| PipelineError::Master(format!("row count '{value}' is not a number")))
}

/// Master post dates arrive either as bare dates or with a time component.
fn parse_master_date(value: &str) -> Result<NaiveDate, PipelineError> {
    let token = value.split_whitespace().next().unwrap_or("");
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map_err(|_| PipelineError::Master(format!("post date '{value}' is not YYYY-MM-DD")))
}

/// A sentinel-valued master field carries no information.
pub fn is_informative(value: &str) -> bool {
    value != SENTINEL && !value.is_empty()
}
