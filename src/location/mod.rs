//! Static location lookup tables and the resolver that reads them.

pub mod resolver;
pub mod similarity;

use std::{collections::HashMap, fs, path::Path, sync::Arc};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineResult;

pub use resolver::{LocationResolver, Resolution};
pub use similarity::{FuzzyMatcher, SimilarityKind, SimilarityMetric};

/// Sentinel returned when a location cannot be mapped.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Separator between segments of an accounting-location path.
pub const PATH_DELIMITER: &str = " : ";

/// One accounting-location mapping. Table order is preserved for fuzzy tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingLocation {
    pub location: String,
    pub path: String,
}

/// On-disk shape of a location table file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationTablesFile {
    pub regions: Vec<(String, String)>,
    pub accounting_locations: Vec<AccountingLocation>,
}

/// Read-only lookup tables shared by every resolver in the process.
#[derive(Debug, Clone)]
pub struct LocationTables {
    regions: HashMap<String, String>,
    accounting: Vec<AccountingLocation>,
    accounting_index: HashMap<String, usize>,
}

impl LocationTables {
    pub fn new(
        regions: impl IntoIterator<Item = (String, String)>,
        accounting: Vec<AccountingLocation>,
    ) -> Self {
        let mut accounting_index = HashMap::with_capacity(accounting.len());
        for (idx, mapping) in accounting.iter().enumerate() {
            // Later duplicates never shadow the first entry.
            accounting_index.entry(mapping.location.clone()).or_insert(idx);
        }
        Self {
            regions: regions.into_iter().collect(),
            accounting,
            accounting_index,
        }
    }

    /// The tables compiled into the crate.
    pub fn builtin() -> Arc<LocationTables> {
        Arc::clone(&BUILTIN_TABLES)
    }

    /// Loads tables from a JSON file shaped like [`LocationTablesFile`].
    pub fn load(path: &Path) -> PipelineResult<LocationTables> {
        let data = fs::read_to_string(path)?;
        let file: LocationTablesFile = serde_json::from_str(&data)?;
        Ok(Self::from(file))
    }

    pub fn region(&self, location: &str) -> Option<&str> {
        self.regions.get(location).map(String::as_str)
    }

    pub fn accounting_path(&self, location: &str) -> Option<&str> {
        self.accounting_index
            .get(location)
            .map(|idx| self.accounting[*idx].path.as_str())
    }

    /// Accounting-location keys in table order.
    pub fn accounting_keys(&self) -> impl Iterator<Item = &str> {
        self.accounting.iter().map(|mapping| mapping.location.as_str())
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn accounting_count(&self) -> usize {
        self.accounting.len()
    }
}

impl From<LocationTablesFile> for LocationTables {
    fn from(file: LocationTablesFile) -> Self {
        Self::new(file.regions, file.accounting_locations)
    }
}

static BUILTIN_TABLES: Lazy<Arc<LocationTables>> = Lazy::new(|| {
    let regions = REGION_TABLE
        .iter()
        .map(|(location, region)| (location.to_string(), region.to_string()));
    let accounting = ACCOUNTING_TABLE
        .iter()
        .map(|(location, path)| AccountingLocation {
            location: location.to_string(),
            path: path.to_string(),
        })
        .collect();
    Arc::new(LocationTables::new(regions, accounting))
});

const REGION_TABLE: &[(&str, &str)] = &[
    ("United States", "US"),
    ("Finland", "Finland"),
    ("United Kingdom(Mainland)", "UK"),
    ("Ireland(Rep.)", "Ireland"),
    ("Germany", "Germany"),
    ("Jersey", "UK"),
    ("United Kingdom(Northern Ireland)", "UK"),
    ("United Kingdom(NI)", "UK"),
    ("Canada", "US"),
    ("United Arab Emirates", "Ireland"),
    ("Australia", "Australia"),
    ("Bermuda", "Ireland"),
    ("Guernsey", "UK"),
    ("Switzerland", "Germany"),
    ("Austria", "Germany"),
    ("India", "Ireland"),
    ("Bahrain", "Ireland"),
    ("Puerto Rico", "US"),
    ("New Caledonia", "Australia"),
    ("South Africa", "Ireland"),
    ("Spain", "Germany"),
    ("Guatemala", "Ireland"),
    ("Luxembourg", "Ireland"),
    ("Netherlands Antilles", "US"),
    ("New Zealand", "Australia"),
    ("Gibraltar", "Ireland"),
    ("Mauritius", "Ireland"),
    ("Netherlands", "Ireland"),
    ("Sweden", "Ireland"),
    ("Malta", "Ireland"),
    ("France", "Ireland"),
    ("Isle of Man", "UK"),
    ("Martinique", "Ireland"),
    ("Seychelles", "Ireland"),
    ("Cayman Islands", "US"),
    ("Saudi Arabia", "Ireland"),
    ("Pakistan", "Ireland"),
];

const ACCOUNTING_TABLE: &[(&str, &str)] = &[
    ("Australia", "Australia"),
    ("Austria", "Germany : Austria"),
    ("Bahrain", "Ireland : ROW : Bahrain"),
    ("Bermuda", "North America : Bermuda"),
    ("Canada", "North America : Canada"),
    ("Cayman Islands", "North America : Cayman Islands"),
    ("Cameroon", "Ireland : ROW : Cameroon"),
    ("Finland", "Finland"),
    ("France", "Ireland : ROE : France"),
    ("Germany", "Germany"),
    ("Guatemala", "Ireland : ROW : Guatemala"),
    ("Guernsey", "UK : Guernsey"),
    ("India", "Ireland : ROW : India"),
    ("Ireland(Rep.)", "Ireland : Ireland(Rep.)"),
    ("Isle of Man", "UK : Isle of Man"),
    ("Jersey", "UK : Jersey"),
    ("Luxembourg", "Ireland : ROE : Luxembourg"),
    ("Martinique", "Ireland : ROE : France : Martinique"),
    ("Malta", "Ireland : ROE : Malta"),
    ("Netherlands", "Netherlands"),
    ("Netherlands Antilles", "North America : Netherlands Antilles"),
    ("New Caledonia", "Australia : New Caledonia"),
    ("Puerto Rico", "North America : Puerto Rico"),
    ("Seychelles", "Ireland : ROW : Seychelles"),
    ("South Africa", "Ireland : ROW : South Africa"),
    ("Spain", "Germany : Spain"),
    ("Sweden", "Ireland : ROE : Sweden"),
    ("Switzerland", "Germany : Switzerland"),
    ("United Arab Emirates", "United Arab Emirates"),
    ("United Kingdom(Mainland)", "UK : United Kingdom(Mainland)"),
    ("United Kingdom(NI)", "UK : United Kingdom(NI)"),
    ("United States", "North America : United States"),
    ("Saudi Arabia", "Ireland : ROW : Saudi Arabia"),
    ("New Zealand", "Australia : New Zealand"),
    ("Kuwait", "Ireland : ROW : United Arab Emirates"),
    ("Gibraltar", "Ireland : ROW : Gibraltar"),
    ("Mauritius", "Ireland : ROW : Mauritius"),
    ("Qatar", "Ireland : ROW : Qatar"),
    ("Trinidad and Tobago", "Ireland : ROW : Trinidad and Tobago"),
    ("Anguilla", "Ireland : ROW : Anguilla"),
    ("Cyprus", "Ireland : ROE : Cyprus"),
    ("United Kingdom(Northern Ireland)", "UK : United Kingdom(NI)"),
    ("Pakistan", "Ireland : ROW : Pakistan"),
    ("Mexico", "Ireland : ROW : Mexico"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_shared() {
        let first = LocationTables::builtin();
        let second = LocationTables::builtin();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.region("Austria"), Some("Germany"));
        assert_eq!(first.accounting_path("Austria"), Some("Germany : Austria"));
    }

    #[test]
    fn accounting_keys_keep_table_order() {
        let tables = LocationTables::builtin();
        let keys: Vec<&str> = tables.accounting_keys().take(3).collect();
        assert_eq!(keys, vec!["Australia", "Austria", "Bahrain"]);
    }

    #[test]
    fn duplicate_keys_resolve_to_first_entry() {
        let tables = LocationTables::new(
            Vec::new(),
            vec![
                AccountingLocation {
                    location: "Jersey".into(),
                    path: "UK : Jersey".into(),
                },
                AccountingLocation {
                    location: "Jersey".into(),
                    path: "Elsewhere".into(),
                },
            ],
        );
        assert_eq!(tables.accounting_path("Jersey"), Some("UK : Jersey"));
    }
}
