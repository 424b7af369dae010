pub mod journal;
pub mod line_item;
pub mod summary;

pub use journal::{
    Journal, JournalEntry, JournalKind, Segments, Side, ACCRUED_SMS_ACCOUNT, PLAN_USAGE_ACCOUNT,
    SALES_SMS_ACCOUNT,
};
pub use line_item::{ClassifiedRow, LineItem, SmsKind, SmsLineItem};
pub use summary::{SalesBySubsidiary, SummaryTables, Totals, UsageByLocation};
