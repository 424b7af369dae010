use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use super::Table;
use crate::errors::PipelineResult;

const CSV_EXTENSION: &str = "csv";
const TMP_SUFFIX: &str = "tmp";

/// Reads tables from CSV files and writes them into an output directory.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    root: PathBuf,
}

impl CsvStorage {
    /// Creates the output directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> PipelineResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads a CSV file with a header row. Rows may be ragged.
    pub fn read(path: &Path) -> PipelineResult<Table> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        let table = Table::new(headers, rows);
        debug!(path = %path.display(), rows = table.len(), "read csv table");
        Ok(table)
    }

    /// Writes `<root>/<name>.csv`, staging to a temporary file first.
    pub fn write(&self, name: &str, table: &Table) -> PipelineResult<PathBuf> {
        let path = self.root.join(format!("{name}.{CSV_EXTENSION}"));
        let tmp = path.with_extension(format!("{CSV_EXTENSION}.{TMP_SUFFIX}"));
        {
            let mut writer = WriterBuilder::new().from_path(&tmp)?;
            writer.write_record(table.headers())?;
            for row in table.rows() {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), rows = table.len(), "wrote csv table");
        Ok(path)
    }

    /// Deletes `<prefix><n>.csv` files under the root, where `n` is a number.
    ///
    /// Returns how many files were removed.
    pub fn remove_numbered(&self, prefix: &str) -> PipelineResult<usize> {
        let suffix = format!(".{CSV_EXTENSION}");
        let mut removed = 0;
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let numbered = name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix.as_str()))
                .is_some_and(|n| !n.is_empty() && n.chars().all(|ch| ch.is_ascii_digit()));
            if numbered && path.is_file() {
                fs::remove_file(&path)?;
                debug!(path = %path.display(), "removed stale csv table");
                removed += 1;
            }
        }
        Ok(removed)
    }
}
