//! Firm-identity resolution against the client master.

use crate::masters::{is_informative, ClientMaster};
use crate::record::{CanonicalRecord, SENTINEL};

pub struct EntityResolver<'a> {
    clients: &'a ClientMaster,
}

impl<'a> EntityResolver<'a> {
    pub fn new(clients: &'a ClientMaster) -> Self {
        EntityResolver { clients }
    }

    /// Recover firm names from email domains.
    ///
    /// Runs before [`resolve`](Self::resolve) for publishers whose exports
    /// identify readers only by address. The first label of the address
    /// domain (`fund` in `user@fund.example.com`) is matched against the
    /// master's domain column; a miss leaves the firm undisclosed.
    pub fn assign_firms_from_domains(&self, records: &mut [CanonicalRecord]) {
        for record in records {
            record.firm_name = domain_label(&record.email)
                .and_then(|label| self.clients.firm_for_domain(label))
                .unwrap_or(SENTINEL)
                .to_string();
        }
    }

    /// Classify each record against the client master.
    ///
    /// A match fills investor type/style and sets the known flag; the
    /// master's city and country replace the record's when informative.
    /// A miss is an expected outcome, not an error: the record keeps
    /// sentinel classification and `in_client_master == false`.
    pub fn resolve(&self, records: &mut [CanonicalRecord]) {
        for record in records {
            match self.clients.find(&record.firm_name) {
                Some(entry) => {
                    record.investor_type = entry.investor_type.clone();
                    record.investor_style = entry.investor_style.clone();
                    record.in_client_master = true;
                    if is_informative(&entry.city) {
                        record.city = entry.city.clone();
                    }
                    if is_informative(&entry.country) {
                        record.country = entry.country.clone();
                    }
                }
                None => {
                    record.investor_type = SENTINEL.to_string();
                    record.investor_style = SENTINEL.to_string();
                    record.in_client_master = false;
                }
            }
        }
    }
}

/// First label of the address domain, `None` when there is no usable domain.
fn domain_label(email: &str) -> Option<&str> {
    let (_, domain) = email.split_once('@')?;
    let label = domain.split('.').next().unwrap_or("");
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masters::ClientMasterEntry;

    fn master() -> ClientMaster {
        ClientMaster::new(vec![
            ClientMasterEntry {
                firm_name: "Alpha Asset Management".into(),
                domain: "alphaam".into(),
                investor_type: "Institutional".into(),
                investor_style: "Long Only".into(),
                city: "Tokyo".into(),
                country: "Japan".into(),
            },
            ClientMasterEntry {
                firm_name: "Beta Capital".into(),
                domain: "betacap".into(),
                investor_type: "Hedge Fund".into(),
                investor_style: "Long/Short".into(),
                city: SENTINEL.into(),
                country: SENTINEL.into(),
            },
        ])
    }

    fn record(firm: &str) -> CanonicalRecord {
        CanonicalRecord {
            firm_name: firm.to_string(),
            city: "OSAKA".to_string(),
            country: "JAPAN".to_string(),
            ..CanonicalRecord::unresolved()
        }
    }

    #[test]
    fn test_match_fills_classification_and_location() {
        let clients = master();
        let resolver = EntityResolver::new(&clients);
        let mut records = vec![record("ALPHA ASSET MANAGEMENT")];
        resolver.resolve(&mut records);

        assert_eq!(records[0].investor_type, "Institutional");
        assert_eq!(records[0].investor_style, "Long Only");
        assert!(records[0].in_client_master);
        assert_eq!(records[0].city, "Tokyo");
        assert_eq!(records[0].country, "Japan");
    }

    #[test]
    fn test_sentinel_master_location_does_not_override() {
        let clients = master();
        let resolver = EntityResolver::new(&clients);
        let mut records = vec![record("Beta Capital")];
        resolver.resolve(&mut records);

        assert!(records[0].in_client_master);
        assert_eq!(records[0].city, "OSAKA");
        assert_eq!(records[0].country, "JAPAN");
    }

    #[test]
    fn test_miss_yields_sentinels_and_false() {
        let clients = master();
        let resolver = EntityResolver::new(&clients);
        let mut records = vec![record("Gamma Partners")];
        resolver.resolve(&mut records);

        assert_eq!(records[0].investor_type, SENTINEL);
        assert_eq!(records[0].investor_style, SENTINEL);
        assert!(!records[0].in_client_master);
    }

    #[test]
    fn test_domain_assignment() {
        let clients = master();
        let resolver = EntityResolver::new(&clients);
        let mut records = vec![
            CanonicalRecord {
                email: "alice@betacap.example.com".into(),
                ..CanonicalRecord::unresolved()
            },
            CanonicalRecord {
                email: "bob@nowhere.example.com".into(),
                ..CanonicalRecord::unresolved()
            },
            CanonicalRecord::unresolved(),
        ];
        resolver.assign_firms_from_domains(&mut records);

        assert_eq!(records[0].firm_name, "Beta Capital");
        assert_eq!(records[1].firm_name, SENTINEL);
        assert_eq!(records[2].firm_name, SENTINEL);
    }
}
