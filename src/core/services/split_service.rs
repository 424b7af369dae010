use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{Journal, JournalEntry, JournalKind};
use crate::errors::{PipelineError, PipelineResult};

/// Upload ceiling of the external ledger's CSV import.
pub const DEFAULT_ROW_LIMIT: usize = 4000;

const PAIR_SIZE: usize = 2;

/// A contiguous run of whole entry pairs sized for a single upload.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalBatch {
    /// 1-based position within the split.
    pub index: usize,
    pub entries: Vec<JournalEntry>,
    pub debit_total: Decimal,
    pub credit_total: Decimal,
}

impl JournalBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.entries.len() / PAIR_SIZE
    }
}

/// All batches for one journal plus the journal-wide totals.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitReport {
    pub kind: JournalKind,
    pub batches: Vec<JournalBatch>,
    pub debit_total: Decimal,
    pub credit_total: Decimal,
}

impl SplitReport {
    /// Upload file stem for a batch, e.g. `SMS DDI JOURNALS March SPLIT 1`.
    pub fn file_name(&self, month_name: &str, batch: &JournalBatch) -> String {
        batch_file_name(self.kind, month_name, batch.index)
    }

    pub fn file_prefix(&self, month_name: &str) -> String {
        batch_file_prefix(self.kind, month_name)
    }

    /// Rows of every batch in order; equal to the journal that was split.
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.batches.iter().flat_map(|batch| batch.entries.iter())
    }
}

pub fn batch_file_name(kind: JournalKind, month_name: &str, index: usize) -> String {
    format!("{}{}", batch_file_prefix(kind, month_name), index)
}

/// Shared stem of every split file for one journal and month, up to the split number.
pub fn batch_file_prefix(kind: JournalKind, month_name: &str) -> String {
    format!(
        "SMS {} JOURNALS {} SPLIT ",
        kind.label().to_uppercase(),
        month_name
    )
}

pub struct SplitService;

impl SplitService {
    /// Greedily packs entry pairs, in order, into batches of at most `max_rows` rows.
    ///
    /// Only row counts matter; account, currency and subsidiary are ignored.
    pub fn split(journal: &Journal, max_rows: usize) -> PipelineResult<SplitReport> {
        if max_rows < PAIR_SIZE {
            return Err(PipelineError::InvalidRowLimit(max_rows));
        }
        if journal.len() % PAIR_SIZE != 0 {
            return Err(PipelineError::UnpairedJournal(journal.len()));
        }

        let capacity = max_rows - max_rows % PAIR_SIZE;
        let mut report = SplitReport {
            kind: journal.kind,
            batches: Vec::with_capacity(journal.len().div_ceil(capacity)),
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        };

        for (index, chunk) in (1..).zip(journal.entries.chunks(capacity)) {
            let debit_total: Decimal = chunk.iter().map(JournalEntry::debit_amount).sum();
            let credit_total: Decimal = chunk.iter().map(JournalEntry::credit_amount).sum();
            report.debit_total += debit_total;
            report.credit_total += credit_total;
            info!(
                journal = %journal.kind,
                split = index,
                rows = chunk.len(),
                debit = %debit_total,
                credit = %credit_total,
                "prepared journal split"
            );
            report.batches.push(JournalBatch {
                index,
                entries: chunk.to_vec(),
                debit_total,
                credit_total,
            });
        }

        info!(
            journal = %journal.kind,
            splits = report.batches.len(),
            debit = %report.debit_total,
            credit = %report.credit_total,
            "journal split complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn journal(pairs: usize) -> Journal {
        let mut journal = Journal::new(JournalKind::Ddi);
        for entry_no in 1..=pairs {
            let amount = Decimal::from(entry_no as u64);
            for (debit, credit) in [(None, Some(amount)), (Some(amount), None)] {
                journal.entries.push(JournalEntry {
                    entry_no,
                    date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                    subsidiary: "Germany".into(),
                    location: "Germany".into(),
                    currency: "EUR".into(),
                    account: "acct".into(),
                    memo: "March SMS DDI".into(),
                    debit,
                    credit,
                    department: String::new(),
                    cost_centre: String::new(),
                    mgmt_pl: String::new(),
                    name: "Acme".into(),
                });
            }
        }
        journal
    }

    #[test]
    fn three_pairs_with_limit_four_split_two_and_one() {
        let report = SplitService::split(&journal(3), 4).expect("split");
        let sizes: Vec<usize> = report.batches.iter().map(JournalBatch::len).collect();
        assert_eq!(sizes, vec![4, 2]);
        assert_eq!(report.batches[0].debit_total, dec!(3));
        assert_eq!(report.batches[1].credit_total, dec!(3));
        assert_eq!(report.debit_total, dec!(6));
        assert_eq!(report.credit_total, dec!(6));
    }

    #[test]
    fn odd_limit_rounds_down_to_whole_pairs() {
        let report = SplitService::split(&journal(5), 5).expect("split");
        let sizes: Vec<usize> = report.batches.iter().map(JournalBatch::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        for batch in &report.batches {
            assert_eq!(batch.entries[0].entry_no, batch.entries[1].entry_no);
        }
    }

    #[test]
    fn batches_concatenate_back_to_the_journal() {
        let source = journal(7);
        let report = SplitService::split(&source, 6).expect("split");
        let rebuilt: Vec<JournalEntry> = report.entries().cloned().collect();
        assert_eq!(rebuilt, source.entries);
        let per_batch: Decimal = report.batches.iter().map(|b| b.debit_total).sum();
        assert_eq!(per_batch, source.debit_total());
    }

    #[test]
    fn small_journal_fits_one_batch() {
        let report = SplitService::split(&journal(2), DEFAULT_ROW_LIMIT).expect("split");
        assert_eq!(report.batches.len(), 1);
        assert_eq!(report.batches[0].pair_count(), 2);
    }

    #[test]
    fn empty_journal_has_no_batches() {
        let report = SplitService::split(&journal(0), 4).expect("split");
        assert!(report.batches.is_empty());
        assert_eq!(report.debit_total, Decimal::ZERO);
        assert_eq!(report.credit_total, Decimal::ZERO);
    }

    #[test]
    fn limits_below_one_pair_are_rejected() {
        assert!(matches!(
            SplitService::split(&journal(1), 1),
            Err(PipelineError::InvalidRowLimit(1))
        ));
    }

    #[test]
    fn dangling_entry_is_rejected() {
        let mut broken = journal(1);
        broken.entries.pop();
        assert!(matches!(
            SplitService::split(&broken, 4),
            Err(PipelineError::UnpairedJournal(1))
        ));
    }

    #[test]
    fn file_names_follow_upload_convention() {
        assert_eq!(
            batch_file_name(JournalKind::Plan, "March", 2),
            "SMS PLAN JOURNALS March SPLIT 2"
        );
    }
}
