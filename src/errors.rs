use thiserror::Error;

/// Result alias used throughout the pipeline.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type that captures every way a pipeline run can abort.
///
/// Unknown locations and unclassifiable SMS types are not represented here:
/// both resolve to default values and the run continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{table} is missing required columns: {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },
    #[error("row {row}: invalid amount `{value}`")]
    InvalidAmount { row: usize, value: String },
    #[error("row {row}: invalid date `{value}`")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: invalid entry number `{value}`")]
    InvalidEntryNo { row: usize, value: String },
    #[error("row limit must allow at least one entry pair, got {0}")]
    InvalidRowLimit(usize),
    #[error("journal has {0} rows; entries must come in debit/credit pairs")]
    UnpairedJournal(usize),
    #[error("configuration error: {0}")]
    Config(String),
}
