pub mod classification_service;
pub mod journal_service;
pub mod split_service;
pub mod summary_service;

pub use classification_service::{ClassificationReport, ClassificationService};
pub use journal_service::{JournalRequest, JournalService, JournalSet};
pub use split_service::{
    batch_file_name, batch_file_prefix, JournalBatch, SplitReport, SplitService,
};
pub use summary_service::SummaryService;
