use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::services::split_service::DEFAULT_ROW_LIMIT;
use crate::errors::{PipelineError, PipelineResult};
use crate::location::{FuzzyMatcher, LocationResolver, LocationTables, SimilarityKind};

const TMP_SUFFIX: &str = "tmp";

/// Settings for a pipeline run. Every field has a default, so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum rows per upload file.
    pub row_limit: usize,
    /// `chrono` format for journal dates written to and read from CSV.
    pub date_format: String,
    pub similarity_threshold: f64,
    pub similarity_metric: SimilarityKind,
    /// Replaces the built-in location tables when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_tables: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
            date_format: "%Y-%m-%d".into(),
            similarity_threshold: FuzzyMatcher::DEFAULT_THRESHOLD,
            similarity_metric: SimilarityKind::default(),
            location_tables: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.row_limit < 2 {
            return Err(PipelineError::InvalidRowLimit(self.row_limit));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(PipelineError::Config(format!(
                "similarity_threshold must be between 0 and 1, got {}",
                self.similarity_threshold
            )));
        }
        if self.date_format.trim().is_empty() {
            return Err(PipelineError::Config("date_format must not be empty".into()));
        }
        Ok(())
    }

    /// Builds the resolver described by this configuration.
    pub fn resolver(&self) -> PipelineResult<LocationResolver> {
        let tables = match &self.location_tables {
            Some(path) => {
                let tables = LocationTables::load(path)?;
                info!(
                    path = %path.display(),
                    regions = tables.region_count(),
                    locations = tables.accounting_count(),
                    "loaded location tables"
                );
                Arc::new(tables)
            }
            None => LocationTables::builtin(),
        };
        let matcher = FuzzyMatcher::new(self.similarity_metric.metric(), self.similarity_threshold);
        Ok(LocationResolver::new(tables, matcher))
    }
}

/// Loads and saves a [`PipelineConfig`] JSON file.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the file when it exists, otherwise returns the defaults.
    pub fn load(&self) -> PipelineResult<PipelineConfig> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            PipelineConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &PipelineConfig) -> PipelineResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> PipelineResult<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
