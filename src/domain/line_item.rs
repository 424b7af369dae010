//! Domain types for accrual export rows and their SMS classification.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalized `LINE ITEM` value for plain SMS revenue.
pub const SMS_LINE_ITEM: &str = "SMS";
/// Normalized `LINE ITEM` value for bundle sales; always classified as Bundle/Purchase.
pub const SMS_BUNDLE_SALES_LINE_ITEM: &str = "SMS BUNDLE SALES";

/// Which of the two SMS line items a row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsLineItem {
    Sms,
    BundleSales,
}

impl SmsLineItem {
    /// Matches a raw `LINE ITEM` cell after trimming and upper-casing.
    /// Returns `None` for every other line item.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        match normalized.as_str() {
            SMS_LINE_ITEM => Some(Self::Sms),
            SMS_BUNDLE_SALES_LINE_ITEM => Some(Self::BundleSales),
            _ => None,
        }
    }
}

/// Revenue type assigned to each retained row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SmsKind {
    Usage,
    #[serde(rename = "Bundle/Purchase")]
    BundlePurchase,
}

impl SmsKind {
    pub const USAGE_LABEL: &'static str = "Usage";
    pub const BUNDLE_PURCHASE_LABEL: &'static str = "Bundle/Purchase";

    /// Strict binary rule: only `usage` (any case, surrounding whitespace ignored)
    /// is Usage; blank or unrecognised values fall into Bundle/Purchase.
    pub fn from_sms_type(sms_type: &str) -> Self {
        if sms_type.trim().eq_ignore_ascii_case("usage") {
            Self::Usage
        } else {
            Self::BundlePurchase
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Usage => Self::USAGE_LABEL,
            Self::BundlePurchase => Self::BUNDLE_PURCHASE_LABEL,
        }
    }
}

impl fmt::Display for SmsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw export row. Amount is already parsed; the other cells are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub line_item: String,
    pub sms_type: Option<String>,
    pub location: String,
    pub amount: Decimal,
    pub currency: String,
    pub subsidiary: String,
    pub client: String,
}

/// A retained SMS row with its derived type and coarse region.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub item: LineItem,
    pub kind: SmsKind,
    pub region: String,
}

impl ClassifiedRow {
    pub fn is_usage(&self) -> bool {
        self.kind == SmsKind::Usage
    }

    pub fn amount(&self) -> Decimal {
        self.item.amount
    }
}
