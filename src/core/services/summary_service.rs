use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{
    ClassifiedRow, SalesBySubsidiary, SmsKind, SummaryTables, Totals, UsageByLocation,
};

/// Builds the summary tables. Output rows are sorted ascending by their group key.
pub struct SummaryService;

impl SummaryService {
    pub fn summarize(rows: &[ClassifiedRow]) -> SummaryTables {
        let sales_by_subsidiary = Self::sales_by_subsidiary(rows);
        let usage_by_location = Self::usage_by_location(rows);
        let totals = Self::totals(&sales_by_subsidiary);
        info!(
            subsidiaries = sales_by_subsidiary.len(),
            usage_groups = usage_by_location.len(),
            grand_total = %totals.grand_total,
            "summarized SMS revenue"
        );
        SummaryTables {
            sales_by_subsidiary,
            usage_by_location,
            totals,
        }
    }

    /// Pivot of (Subsidiary, Type) sums; a missing combination is zero.
    pub fn sales_by_subsidiary(rows: &[ClassifiedRow]) -> Vec<SalesBySubsidiary> {
        let mut groups: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
        for row in rows {
            let sums = groups.entry(row.item.subsidiary.as_str()).or_default();
            match row.kind {
                SmsKind::Usage => sums.0 += row.amount(),
                SmsKind::BundlePurchase => sums.1 += row.amount(),
            }
        }
        groups
            .into_iter()
            .map(|(subsidiary, (usage, bundle_purchase))| SalesBySubsidiary {
                subsidiary: subsidiary.to_string(),
                usage,
                bundle_purchase,
            })
            .collect()
    }

    /// Usage rows only, summed per (Subsidiary, Location, Currency).
    pub fn usage_by_location(rows: &[ClassifiedRow]) -> Vec<UsageByLocation> {
        let mut groups: BTreeMap<(&str, &str, &str), Decimal> = BTreeMap::new();
        for row in rows.iter().filter(|row| row.is_usage()) {
            let key = (
                row.item.subsidiary.as_str(),
                row.item.location.as_str(),
                row.item.currency.as_str(),
            );
            *groups.entry(key).or_default() += row.amount();
        }
        groups
            .into_iter()
            .map(|((subsidiary, location, currency), amount)| UsageByLocation {
                subsidiary: subsidiary.to_string(),
                location: location.to_string(),
                currency: currency.to_string(),
                amount,
            })
            .collect()
    }

    pub fn totals(sales: &[SalesBySubsidiary]) -> Totals {
        sales.iter().fold(Totals::default(), |mut totals, row| {
            totals.usage += row.usage;
            totals.bundle_purchase += row.bundle_purchase;
            totals.grand_total += row.grand_total();
            totals
        })
    }
}
