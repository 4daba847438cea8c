//! Persisted pipeline artifacts.
//!
//! Everything is CSV with a fixed header; the column order is the
//! persistence contract and matches the `*_COLUMNS` constants in
//! [`crate::record`]. Dates are written as `YYYY-MM-DD`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::adapters::Publisher;
use crate::aggregator;
use crate::config::Config;
use crate::importers::{csv_importer, file_provider};
use crate::pipeline_error::PipelineError;
use crate::record::{
    CanonicalRecord, CLEAN_COLUMNS, LEDGER_COLUMNS, PRECLEAN_COLUMNS, READERSHIP_COLUMNS,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const COMBINED_LEDGER_FILE: &str = "All Missing Clients.csv";

pub struct DataStore {
    config: Config,
}

impl DataStore {
    pub fn new(config: Config) -> Self {
        DataStore { config }
    }

    /// Persist a precleaned snapshot for one publisher run.
    pub fn write_precleaned(
        &self,
        publisher: Publisher,
        run_date: NaiveDate,
        records: &[CanonicalRecord],
    ) -> Result<PathBuf, PipelineError> {
        let dir = self.config.precleaned_path(publisher);
        fs::create_dir_all(&dir)?;

        let file = dir.join(format!(
            "{} {} Precleaned.csv",
            run_date.format(DATE_FORMAT),
            publisher.name()
        ));
        let rows: Vec<Vec<String>> = records.iter().map(preclean_row).collect();
        write_csv(&file, &PRECLEAN_COLUMNS, &rows)?;
        info!("Wrote {} precleaned rows to {}", rows.len(), file.display());
        Ok(file)
    }

    /// Load the latest precleaned snapshot for a publisher.
    ///
    /// Snapshot filenames start with the run date, so the lexicographically
    /// last file is the most recent run.
    pub fn read_latest_precleaned(
        &self,
        publisher: Publisher,
    ) -> Result<Vec<CanonicalRecord>, PipelineError> {
        let dir = self.config.precleaned_path(publisher);
        if !dir.exists() {
            return Err(PipelineError::EmptySource(dir));
        }
        let file = file_provider::latest_file(&dir)?
            .ok_or_else(|| PipelineError::EmptySource(dir.clone()))?;

        read_csv_body(&file)?
            .iter()
            .map(|row| parse_preclean_row(row))
            .collect()
    }

    /// Persist the per-(customer, publisher) clean file, replacing any
    /// previous run.
    pub fn write_clean(
        &self,
        customer: &str,
        publisher: Publisher,
        records: &[CanonicalRecord],
    ) -> Result<PathBuf, PipelineError> {
        let dir = self.config.clean_data_path(customer);
        fs::create_dir_all(&dir)?;

        let file = dir.join(format!("{} {} Clean Data.csv", customer, publisher.name()));
        let rows: Vec<Vec<String>> = records.iter().map(clean_row).collect();
        write_csv(&file, &CLEAN_COLUMNS, &rows)?;
        info!("Wrote {} clean rows to {}", rows.len(), file.display());
        Ok(file)
    }

    /// Merge missing-client records into the per-customer ledger.
    ///
    /// The ledger is append-only across runs: existing rows are never
    /// pruned, and re-observed rows are not duplicated. An empty delta
    /// leaves the ledger untouched.
    pub fn merge_missing_clients(
        &self,
        customer: &str,
        records: &[CanonicalRecord],
    ) -> Result<(), PipelineError> {
        if records.is_empty() {
            return Ok(());
        }
        let dir = self.config.missing_clients_path();
        fs::create_dir_all(&dir)?;

        let file = dir.join(format!("{customer} Missing Clients.csv"));
        let existing = if file.exists() {
            read_csv_body(&file)?
        } else {
            Vec::new()
        };

        let incoming: Vec<Vec<String>> = records.iter().map(ledger_row).collect();
        let merged = aggregator::union_rows(existing, incoming);
        write_csv(&file, &LEDGER_COLUMNS, &merged)?;
        info!(
            "Missing-client ledger for {} now holds {} rows",
            customer,
            merged.len()
        );
        Ok(())
    }

    /// Concatenate every per-customer ledger into one combined file,
    /// sorted by firm name.
    pub fn combine_missing_clients(&self) -> Result<PathBuf, PipelineError> {
        let dir = self.config.missing_clients_path();
        fs::create_dir_all(&dir)?;

        let mut combined: Vec<Vec<String>> = Vec::new();
        for path in file_provider::list_files(&dir)? {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name == COMBINED_LEDGER_FILE || !name.ends_with(".csv") {
                continue;
            }
            combined.extend(read_csv_body(&path)?);
        }

        // Firm Name column of the ledger layout; short rows sort first.
        let firm = |row: &Vec<String>| row.get(2).map(String::as_str).unwrap_or("").to_string();
        combined.sort_by_key(firm);

        let file = dir.join(COMBINED_LEDGER_FILE);
        write_csv(&file, &LEDGER_COLUMNS, &combined)?;
        info!(
            "Combined missing-client file holds {} rows",
            combined.len()
        );
        Ok(file)
    }

    /// Concatenate the bodies of every clean file for a customer.
    pub fn read_clean_rows(&self, customer: &str) -> Result<Vec<Vec<String>>, PipelineError> {
        let dir = self.config.clean_data_path(customer);
        if !dir.exists() {
            return Err(PipelineError::EmptySource(dir));
        }

        let mut rows = Vec::new();
        for path in file_provider::list_files(&dir)? {
            rows.extend(read_csv_body(&path)?);
        }
        if rows.is_empty() {
            return Err(PipelineError::EmptySource(dir));
        }
        Ok(rows)
    }

    /// Persist the readership summary for a customer.
    pub fn write_readership(
        &self,
        customer: &str,
        rows: &[Vec<String>],
    ) -> Result<PathBuf, PipelineError> {
        let dir = self.config.customer_path(customer);
        fs::create_dir_all(&dir)?;

        let file = dir.join(format!("{customer} Readership File.csv"));
        write_csv(&file, &READERSHIP_COLUMNS, rows)?;
        info!("Wrote {} readership rows to {}", rows.len(), file.display());
        Ok(file)
    }
}

fn write_csv(path: &Path, columns: &[&str], rows: &[Vec<String>]) -> Result<(), PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(PipelineError::Csv)?;
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Body rows of one of our own CSV artifacts, header dropped.
fn read_csv_body(path: &Path) -> Result<Vec<Vec<String>>, PipelineError> {
    let mut rows = csv_importer::read_rows(path).map_err(PipelineError::Import)?;
    if !rows.is_empty() {
        rows.remove(0);
    }
    Ok(rows)
}

fn preclean_row(record: &CanonicalRecord) -> Vec<String> {
    vec![
        record.read_date.format(DATE_FORMAT).to_string(),
        record.post_date.format(DATE_FORMAT).to_string(),
        record.firm_name.clone(),
        record.user_name.clone(),
        record.email.clone(),
        record.city.clone(),
        record.country.clone(),
        record.report_title.clone(),
        record.platform.clone(),
        record.transaction_id.clone(),
    ]
}

fn parse_preclean_row(row: &[String]) -> Result<CanonicalRecord, PipelineError> {
    let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
    Ok(CanonicalRecord {
        read_date: parse_stored_date(&cell(0), "Read Date")?,
        post_date: parse_stored_date(&cell(1), "Post Date")?,
        firm_name: cell(2),
        user_name: cell(3),
        email: cell(4),
        city: cell(5),
        country: cell(6),
        report_title: cell(7),
        platform: cell(8),
        transaction_id: cell(9),
        ..CanonicalRecord::unresolved()
    })
}

fn parse_stored_date(value: &str, field: &'static str) -> Result<NaiveDate, PipelineError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| PipelineError::DateFormat {
        publisher: "precleaned snapshot",
        field,
        value: value.to_string(),
        expected: "YYYY-MM-DD",
    })
}

fn clean_row(record: &CanonicalRecord) -> Vec<String> {
    vec![
        record.read_date.format(DATE_FORMAT).to_string(),
        record.firm_name.clone(),
        record.city.clone(),
        record.country.clone(),
        record.post_date.format(DATE_FORMAT).to_string(),
        record.report_title.clone(),
        record.title.clone(),
        record.platform.clone(),
        record.investor_type.clone(),
        record.investor_style.clone(),
    ]
}

fn ledger_row(record: &CanonicalRecord) -> Vec<String> {
    vec![
        record.read_date.format(DATE_FORMAT).to_string(),
        record.post_date.format(DATE_FORMAT).to_string(),
        record.firm_name.clone(),
        record.user_name.clone(),
        record.email.clone(),
        record.city.clone(),
        record.country.clone(),
        record.report_title.clone(),
        record.title.clone(),
        record.platform.clone(),
        record.transaction_id.clone(),
        record.investor_type.clone(),
        record.investor_style.clone(),
        record.in_client_master.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SENTINEL;
    use tempfile::tempdir;

    fn store(root: &Path) -> DataStore {
        DataStore::new(Config {
            data_root: root.to_path_buf(),
        })
    }

    fn record(firm: &str, txn: &str) -> CanonicalRecord {
        CanonicalRecord {
            read_date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            post_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            firm_name: firm.to_string(),
            report_title: "(1234) Q3 Results".to_string(),
            platform: "Factset".to_string(),
            transaction_id: txn.to_string(),
            ..CanonicalRecord::unresolved()
        }
    }

    #[test]
    fn test_precleaned_round_trip() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let records = vec![record("Alpha Asset Management", "T-1"), record(SENTINEL, "T-2")];
        store
            .write_precleaned(
                Publisher::Factset,
                NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
                &records,
            )
            .unwrap();

        let loaded = store.read_latest_precleaned(Publisher::Factset).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_latest_precleaned_prefers_newest_run_date() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store
            .write_precleaned(
                Publisher::Factset,
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                &[record("Old Run", "T-1")],
            )
            .unwrap();
        store
            .write_precleaned(
                Publisher::Factset,
                NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
                &[record("New Run", "T-1")],
            )
            .unwrap();

        let loaded = store.read_latest_precleaned(Publisher::Factset).unwrap();
        assert_eq!(loaded[0].firm_name, "New Run");
    }

    #[test]
    fn test_missing_precleaned_is_empty_source() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        assert!(matches!(
            store.read_latest_precleaned(Publisher::Quick),
            Err(PipelineError::EmptySource(_))
        ));
    }

    #[test]
    fn test_ledger_merge_is_cross_run_union() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let first = vec![record("Gamma Partners", "T-1")];
        store.merge_missing_clients("Acant", &first).unwrap();

        // Second run re-observes the same row plus a new one.
        let second = vec![record("Gamma Partners", "T-1"), record("Delta Fund", "T-2")];
        store.merge_missing_clients("Acant", &second).unwrap();

        let file = store
            .config
            .missing_clients_path()
            .join("Acant Missing Clients.csv");
        let rows = read_csv_body(&file).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], "Gamma Partners");
        assert_eq!(rows[1][2], "Delta Fund");
    }

    #[test]
    fn test_combined_ledger_sorts_by_firm_name() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store
            .merge_missing_clients("Acant", &[record("Zeta Advisors", "T-1")])
            .unwrap();
        store
            .merge_missing_clients("Borun", &[record("Delta Fund", "T-2")])
            .unwrap();

        let file = store.combine_missing_clients().unwrap();
        let rows = read_csv_body(&file).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], "Delta Fund");
        assert_eq!(rows[1][2], "Zeta Advisors");
    }

    #[test]
    fn test_combined_ledger_tolerates_short_foreign_rows() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store
            .merge_missing_clients("Acant", &[record("Zeta Advisors", "T-1")])
            .unwrap();
        // A hand-edited file with rows narrower than the ledger layout.
        fs::write(
            store.config.missing_clients_path().join("Notes.csv"),
            "Read Date,Post Date\n2024-03-01,2024-02-20\n",
        )
        .unwrap();

        let file = store.combine_missing_clients().unwrap();
        let rows = read_csv_body(&file).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], "Zeta Advisors");
    }
}
