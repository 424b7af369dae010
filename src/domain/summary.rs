//! Summary tables derived from classified SMS rows.

use rust_decimal::Decimal;
use serde::Serialize;

/// One row of the Sales by Subsidiary pivot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesBySubsidiary {
    pub subsidiary: String,
    pub usage: Decimal,
    pub bundle_purchase: Decimal,
}

impl SalesBySubsidiary {
    pub fn grand_total(&self) -> Decimal {
        self.usage + self.bundle_purchase
    }
}

/// Usage revenue summed per subsidiary, location and currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageByLocation {
    pub subsidiary: String,
    pub location: String,
    pub currency: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub usage: Decimal,
    pub bundle_purchase: Decimal,
    pub grand_total: Decimal,
}

impl Totals {
    /// Labelled rows in the order they are reported.
    pub fn rows(&self) -> [(&'static str, Decimal); 3] {
        [
            ("Total Usage", self.usage),
            ("Total Bundle/Purchase", self.bundle_purchase),
            ("Grand Total", self.grand_total),
        ]
    }
}

/// All aggregation outputs for one run. Rows are ordered ascending by group key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryTables {
    pub sales_by_subsidiary: Vec<SalesBySubsidiary>,
    pub usage_by_location: Vec<UsageByLocation>,
    pub totals: Totals,
}
