//! Run orchestration: preclean, clean, run-all and readership modes.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::adapters::Publisher;
use crate::aggregator;
use crate::canonicalizer::Canonicalizer;
use crate::config::Config;
use crate::importers::{self, file_provider, TableShape};
use crate::masters::{
    CityAliases, ClientMaster, CountryOverrides, CustomerTable, PublisherFormats, TitleMaster,
};
use crate::pipeline_error::PipelineError;
use crate::record::RawTable;
use crate::resolvers::{EntityResolver, TitleResolver};
use crate::storage::DataStore;

pub struct PipelineService {
    config: Config,
    store: DataStore,
    formats: PublisherFormats,
    customers: CustomerTable,
    countries: CountryOverrides,
    cities: CityAliases,
    clients: ClientMaster,
}

impl PipelineService {
    /// Load every master file under the configured data root.
    pub fn from_config(config: Config) -> Result<Self, PipelineError> {
        let formats = PublisherFormats::from_table(&load_master(config.publisher_master_file())?)?;
        let customers = CustomerTable::from_table(&load_master(config.customer_master_file())?)?;
        let countries = CountryOverrides::from_table(&load_master(config.country_master_file())?)?;
        let cities = CityAliases::from_table(&load_master(config.city_master_file())?)?;

        // Client masters are dated; the latest file is current.
        let client_file = file_provider::latest_file(&config.client_master_path())?
            .ok_or_else(|| PipelineError::EmptySource(config.client_master_path()))?;
        let clients = ClientMaster::from_table(&load_master(client_file)?)?;
        if clients.is_empty() {
            warn!("Client master is empty; every firm will be reported missing");
        }

        let store = DataStore::new(config.clone());
        Ok(PipelineService {
            config,
            store,
            formats,
            customers,
            countries,
            cities,
            clients,
        })
    }

    pub fn customers(&self) -> Vec<String> {
        self.customers.customers().map(String::from).collect()
    }

    /// Adapt and canonicalize every uncleaned export for one publisher,
    /// persisting the result as a dated precleaned snapshot.
    #[instrument(skip(self))]
    pub fn preclean_publisher(
        &self,
        publisher: Publisher,
        run_date: NaiveDate,
    ) -> Result<usize, PipelineError> {
        let source = self.config.uncleaned_path(publisher);
        if !source.exists() {
            return Err(PipelineError::EmptySource(source));
        }
        let files = file_provider::list_files(&source)?;
        if files.is_empty() {
            return Err(PipelineError::EmptySource(source));
        }

        let shape = self.formats.shape_for(publisher)?;
        let table = importers::load_raw_batch(&files, &shape)?;
        let records = publisher.adapt(&table)?;
        info!(
            "Adapted {} of {} raw rows for {}",
            records.len(),
            table.len(),
            publisher
        );

        let canonicalizer = Canonicalizer::new(&self.countries, &self.cities);
        let records = canonicalizer.canonicalize(records, publisher.dedup_policy());

        self.store.write_precleaned(publisher, run_date, &records)?;
        Ok(records.len())
    }

    /// Resolve the latest precleaned snapshot of one publisher against one
    /// customer and persist the clean file.
    ///
    /// Missing-client rows stay in the clean file (flagged by sentinel
    /// investor fields); the ledger receives an additional copy.
    #[instrument(skip(self))]
    pub fn clean_customer(
        &self,
        publisher: Publisher,
        customer: &str,
    ) -> Result<usize, PipelineError> {
        let stock_code = self.customers.stock_code(customer)?.to_string();
        let titles = self.load_title_master(customer)?;

        let mut records = self.store.read_latest_precleaned(publisher)?;
        if publisher.uses_domain_resolution() {
            EntityResolver::new(&self.clients).assign_firms_from_domains(&mut records);
        }

        let mut records = aggregator::filter_by_stock_code(records, &stock_code);
        EntityResolver::new(&self.clients).resolve(&mut records);
        let records = TitleResolver::new(&titles).apply(records);

        let (known, missing) = aggregator::partition_known(records);
        if !missing.is_empty() {
            info!(
                "{} rows for {} reference firms missing from the client master",
                missing.len(),
                customer
            );
        }
        self.store.merge_missing_clients(customer, &missing)?;

        // The clean file keeps both partitions, restored to the descending
        // read-date order the canonicalizer established.
        let mut records: Vec<_> = known.into_iter().chain(missing).collect();
        records.sort_by(|a, b| b.read_date.cmp(&a.read_date));
        self.store.write_clean(customer, publisher, &records)?;
        Ok(records.len())
    }

    /// Full batch: preclean every publisher, clean every customer, then
    /// rebuild the combined missing-clients file.
    ///
    /// A publisher with no source files is skipped with a warning; other
    /// failures abort the run.
    pub fn run_all(&self, run_date: NaiveDate) -> Result<(), PipelineError> {
        for publisher in Publisher::ALL {
            info!("Processing {}", publisher);
            match self.preclean_publisher(publisher, run_date) {
                Ok(count) => info!("Precleaned {} rows for {}", count, publisher),
                Err(PipelineError::EmptySource(path)) => {
                    warn!("No files for {} in {}; skipping", publisher, path.display());
                    continue;
                }
                Err(e) => return Err(e),
            }

            for customer in self.customers() {
                let count = self.clean_customer(publisher, &customer)?;
                info!("Cleaned {} rows for {} / {}", count, customer, publisher);
            }
        }

        self.store.combine_missing_clients()?;
        Ok(())
    }

    /// Rebuild the readership summary for one customer from its persisted
    /// clean files.
    #[instrument(skip(self))]
    pub fn build_readership(
        &self,
        customer: &str,
        updated_on: NaiveDate,
    ) -> Result<usize, PipelineError> {
        // Validates the customer even though only the files are read.
        self.customers.stock_code(customer)?;

        let rows = self.store.read_clean_rows(customer)?;
        let rows = aggregator::build_readership(rows, updated_on);
        self.store.write_readership(customer, &rows)?;
        Ok(rows.len())
    }

    /// Readership summaries for every customer with clean data.
    pub fn build_all_readership(&self, updated_on: NaiveDate) -> Result<(), PipelineError> {
        for customer in self.customers() {
            match self.build_readership(&customer, updated_on) {
                Ok(count) => info!("Readership file for {} holds {} rows", customer, count),
                Err(PipelineError::EmptySource(path)) => {
                    warn!(
                        "No clean data for {} in {}; skipping",
                        customer,
                        path.display()
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn load_title_master(&self, customer: &str) -> Result<TitleMaster, PipelineError> {
        let file = self
            .config
            .title_master_path()
            .join(format!("{customer}_Report Title Master File.xlsx"));
        TitleMaster::from_table(&load_master(file)?)
    }
}

/// Read a master file as a plain headered table.
///
/// Masters are maintained as spreadsheets, but a CSV with the same stem is
/// accepted in its place.
fn load_master(path: PathBuf) -> Result<RawTable, PipelineError> {
    let path = if path.exists() {
        path
    } else {
        path.with_extension("csv")
    };

    importers::read_table(&path, &TableShape::headered())?
        .ok_or_else(|| PipelineError::Master(format!("unreadable master file {}", path.display())))
}
