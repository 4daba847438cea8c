use std::env;
use std::path::PathBuf;

use crate::adapters::Publisher;

/// Directory layout under the shared data root.
///
/// The folder names mirror the structure the business maintains in its
/// shared drive; only `DATA_ROOT` itself is configurable.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            data_root: PathBuf::from(env::var("DATA_ROOT")?),
        })
    }

    pub fn master_path(&self) -> PathBuf {
        self.data_root.join("01_Master Files")
    }

    /// Folder of dated client master files; the latest file wins.
    pub fn client_master_path(&self) -> PathBuf {
        self.master_path().join("01_Client Master Files")
    }

    pub fn missing_clients_path(&self) -> PathBuf {
        self.client_master_path().join("01_Missing Clients")
    }

    pub fn title_master_path(&self) -> PathBuf {
        self.master_path().join("02_Report Title Master Files")
    }

    pub fn publisher_master_file(&self) -> PathBuf {
        self.master_path().join("Publisher Master File.xlsx")
    }

    pub fn customer_master_file(&self) -> PathBuf {
        self.master_path().join("Customer Stock Code Master File.xlsx")
    }

    pub fn country_master_file(&self) -> PathBuf {
        self.master_path().join("Country Mapping Master File.xlsx")
    }

    pub fn city_master_file(&self) -> PathBuf {
        self.master_path().join("City Mapping Master File.xlsx")
    }

    /// Incoming export files for one publisher, as delivered.
    pub fn uncleaned_path(&self, publisher: Publisher) -> PathBuf {
        self.data_root
            .join("02_Raw Data")
            .join("01_Uncleaned")
            .join(publisher.name())
    }

    /// Precleaned snapshots for one publisher; the latest file wins.
    pub fn precleaned_path(&self, publisher: Publisher) -> PathBuf {
        self.data_root
            .join("02_Raw Data")
            .join("02_Precleaned")
            .join(publisher.name())
    }

    pub fn customer_path(&self, customer: &str) -> PathBuf {
        self.data_root.join("03_Customers").join(customer)
    }

    pub fn clean_data_path(&self, customer: &str) -> PathBuf {
        self.customer_path(customer).join("01_Clean Data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_data_root() {
        let config = Config {
            data_root: PathBuf::from("/data"),
        };
        assert_eq!(
            config.precleaned_path(Publisher::Factset),
            PathBuf::from("/data/02_Raw Data/02_Precleaned/Factset")
        );
        assert_eq!(
            config.clean_data_path("Acant"),
            PathBuf::from("/data/03_Customers/Acant/01_Clean Data")
        );
        assert_eq!(
            config.missing_clients_path(),
            PathBuf::from("/data/01_Master Files/01_Client Master Files/01_Missing Clients")
        );
    }
}
