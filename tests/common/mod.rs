#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use once_cell::sync::Lazy;
use sms_journal_core::storage::{CsvStorage, Table};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const EXPORT_HEADERS: &[&str] = &[
    "LINE ITEM",
    "SMS TYPE",
    "LOCATION",
    "AMOUNT",
    "CURRENCY",
    "SUBSIDIARY",
    "CLIENT",
];

/// Creates a unique directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn export(rows: &[&[&str]]) -> Table {
    Table::from_strs(EXPORT_HEADERS, rows)
}

/// A small export mixing usage, bundles, bundle sales and non-SMS rows.
pub fn sample_export() -> Table {
    export(&[
        &["SMS", "Usage", "Austria", "100", "EUR", "Germany", "Acme"],
        &["Voice", "Usage", "Austria", "999", "EUR", "Germany", "Acme"],
        &["SMS", "Bundle", "Jersey", "40.50", "GBP", "UK", "Beta"],
        &["SMS Bundle Sales", "Usage", "Swizerland", "25", "CHF", "Germany", "Gamma"],
        &["sms", "usage", "United States", "12.25", "USD", "US", "Delta"],
        &["SMS", "", "Atlantis", "3", "USD", "US", "Epsilon"],
    ])
}

/// Writes a table as `<dir>/<name>.csv` and returns the file path.
pub fn write_csv(dir: &Path, name: &str, table: &Table) -> PathBuf {
    CsvStorage::new(dir)
        .expect("create storage")
        .write(name, table)
        .expect("write csv")
}
