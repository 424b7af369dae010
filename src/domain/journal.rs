//! Double-entry journal lines and the fixed account/segment vocabulary they use.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Revenue account credited by DDI entries and debited by Plan entries.
pub const SALES_SMS_ACCOUNT: &str = "40040 Sales : SMS";
/// Balance sheet accrual offset for DDI entries.
pub const ACCRUED_SMS_ACCOUNT: &str = "16050 Other Current Assets : Accrued SMS";
/// In-month plan usage revenue account credited by Plan entries.
pub const PLAN_USAGE_ACCOUNT: &str = "40041 Sales : SMS : SMS Plan Usage in Month";

/// The two journals generated per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JournalKind {
    Ddi,
    Plan,
}

impl JournalKind {
    /// Text appended to the month name in every entry's memo.
    pub fn memo_suffix(&self) -> &'static str {
        match self {
            Self::Ddi => "SMS DDI",
            Self::Plan => "SMS Plan Usage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ddi => "DDI",
            Self::Plan => "Plan",
        }
    }

    /// Name of the journal as written to disk before splitting.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Self::Ddi => "DDI Journal",
            Self::Plan => "Plan Journals",
        }
    }
}

impl fmt::Display for JournalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Department / cost centre / management P&L tags attached to a ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments {
    pub department: &'static str,
    pub cost_centre: &'static str,
    pub mgmt_pl: &'static str,
}

impl Segments {
    pub const REVENUE: Segments = Segments {
        department: "Revenue",
        cost_centre: "Revenue",
        mgmt_pl: "Recurring Revenue",
    };

    pub const BALANCE_SHEET: Segments = Segments {
        department: "Balance Sheet",
        cost_centre: "Balance Sheet",
        mgmt_pl: "Balance Sheet",
    };
}

/// Side of the ledger an entry posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Debit,
    Credit,
}

/// One ledger line. Exactly one of `debit` / `credit` is populated.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub entry_no: usize,
    pub date: NaiveDate,
    pub subsidiary: String,
    pub location: String,
    pub currency: String,
    pub account: String,
    pub memo: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    pub department: String,
    pub cost_centre: String,
    pub mgmt_pl: String,
    pub name: String,
}

impl JournalEntry {
    pub fn debit_amount(&self) -> Decimal {
        self.debit.unwrap_or(Decimal::ZERO)
    }

    pub fn credit_amount(&self) -> Decimal {
        self.credit.unwrap_or(Decimal::ZERO)
    }

    pub fn side(&self) -> Side {
        if self.debit.is_some() {
            Side::Debit
        } else {
            Side::Credit
        }
    }
}

/// Ordered journal lines, two consecutive lines per entry number.
#[derive(Debug, Clone, PartialEq)]
pub struct Journal {
    pub kind: JournalKind,
    pub entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new(kind: JournalKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.entries.len() / 2
    }

    pub fn pairs(&self) -> std::slice::Chunks<'_, JournalEntry> {
        self.entries.chunks(2)
    }

    pub fn debit_total(&self) -> Decimal {
        self.entries.iter().map(JournalEntry::debit_amount).sum()
    }

    pub fn credit_total(&self) -> Decimal {
        self.entries.iter().map(JournalEntry::credit_amount).sum()
    }

    /// True when every entry pair nets to zero.
    pub fn is_balanced(&self) -> bool {
        self.pairs().all(|pair| {
            let debit: Decimal = pair.iter().map(JournalEntry::debit_amount).sum();
            let credit: Decimal = pair.iter().map(JournalEntry::credit_amount).sum();
            debit == credit
        })
    }
}
