use chrono::NaiveDate;
use tracing::info;

use super::services::{
    ClassificationReport, ClassificationService, JournalRequest, JournalService, JournalSet,
    SplitReport, SplitService, SummaryService,
};
use crate::config::PipelineConfig;
use crate::domain::{ClassifiedRow, Journal, SummaryTables};
use crate::errors::PipelineResult;
use crate::location::LocationResolver;
use crate::storage::Table;

/// Everything one run produces, held in memory for the caller to serialize.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub request: JournalRequest,
    pub classification: ClassificationReport,
    pub summary: SummaryTables,
    pub journals: JournalSet,
    pub ddi_splits: SplitReport,
    pub plan_splits: SplitReport,
}

/// Chains classifier, aggregator, journal generator and splitter.
///
/// A run either returns a complete [`PipelineOutput`] or an error; there is no partial result.
pub struct Pipeline {
    config: PipelineConfig,
    resolver: LocationResolver,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, resolver: LocationResolver) -> Self {
        Self { config, resolver }
    }

    /// Validates the configuration and builds the resolver it describes.
    pub fn from_config(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let resolver = config.resolver()?;
        Ok(Self::new(config, resolver))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub fn classify(&self, export: &Table) -> PipelineResult<ClassificationReport> {
        ClassificationService::classify(export, &self.resolver)
    }

    pub fn summarize(&self, rows: &[ClassifiedRow]) -> SummaryTables {
        SummaryService::summarize(rows)
    }

    pub fn journals(&self, rows: &[ClassifiedRow], request: &JournalRequest) -> JournalSet {
        JournalService::generate(rows, request, &self.resolver)
    }

    pub fn split(&self, journal: &Journal) -> PipelineResult<SplitReport> {
        SplitService::split(journal, self.config.row_limit)
    }

    pub fn run(&self, export: &Table, journal_date: NaiveDate) -> PipelineResult<PipelineOutput> {
        let request = JournalRequest::new(journal_date);
        let classification = self.classify(export)?;
        let summary = self.summarize(&classification.rows);
        let journals = self.journals(&classification.rows, &request);
        let ddi_splits = self.split(&journals.ddi)?;
        let plan_splits = self.split(&journals.plan)?;
        info!(
            retained = classification.rows.len(),
            ddi_splits = ddi_splits.batches.len(),
            plan_splits = plan_splits.batches.len(),
            "pipeline run complete"
        );
        Ok(PipelineOutput {
            request,
            classification,
            summary,
            journals,
            ddi_splits,
            plan_splits,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default(), LocationResolver::default())
    }
}
