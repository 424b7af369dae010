use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::{
    ClassifiedRow, Journal, JournalEntry, JournalKind, Segments, Side, ACCRUED_SMS_ACCOUNT,
    PLAN_USAGE_ACCOUNT, SALES_SMS_ACCOUNT,
};
use crate::location::{LocationResolver, UNKNOWN_LOCATION};

/// Caller-supplied parameters for one journal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalRequest {
    pub date: NaiveDate,
}

impl JournalRequest {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Full English month name of the journal date, e.g. `March`.
    pub fn month_name(&self) -> String {
        self.date.format("%B").to_string()
    }

    pub fn memo(&self, kind: JournalKind) -> String {
        format!("{} {}", self.month_name(), kind.memo_suffix())
    }

    /// The accrual reverses on the 2nd of the following month.
    pub fn reversal_date(&self) -> Option<NaiveDate> {
        self.date
            .with_day(1)?
            .checked_add_months(Months::new(1))?
            .with_day(2)
    }
}

/// Both journals produced from one set of classified rows.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalSet {
    pub ddi: Journal,
    pub plan: Journal,
    /// Rows whose accounting location could not be resolved and were posted to `Unknown`.
    pub unknown_locations: usize,
}

/// Fixed posting rule for one side of an entry pair.
struct Leg {
    account: &'static str,
    side: Side,
    segments: Segments,
}

const DDI_LEGS: [Leg; 2] = [
    Leg {
        account: SALES_SMS_ACCOUNT,
        side: Side::Credit,
        segments: Segments::REVENUE,
    },
    Leg {
        account: ACCRUED_SMS_ACCOUNT,
        side: Side::Debit,
        segments: Segments::BALANCE_SHEET,
    },
];

const PLAN_LEGS: [Leg; 2] = [
    Leg {
        account: SALES_SMS_ACCOUNT,
        side: Side::Debit,
        segments: Segments::REVENUE,
    },
    Leg {
        account: PLAN_USAGE_ACCOUNT,
        side: Side::Credit,
        segments: Segments::REVENUE,
    },
];

pub struct JournalService;

impl JournalService {
    pub fn generate(
        rows: &[ClassifiedRow],
        request: &JournalRequest,
        resolver: &LocationResolver,
    ) -> JournalSet {
        let mut locations = LocationCache::new(resolver);
        let (ddi, unknown_locations) =
            Self::build(JournalKind::Ddi, rows.iter(), request, &mut locations);
        let (plan, _) = Self::build(
            JournalKind::Plan,
            rows.iter().filter(|row| row.is_usage()),
            request,
            &mut locations,
        );
        if unknown_locations > 0 {
            warn!(
                rows = unknown_locations,
                "journal entries posted to Unknown location"
            );
        }
        info!(
            ddi_pairs = ddi.pair_count(),
            plan_pairs = plan.pair_count(),
            memo_month = %request.month_name(),
            "generated SMS journals"
        );
        JournalSet {
            ddi,
            plan,
            unknown_locations,
        }
    }

    /// One DDI pair for every row, numbered from 1.
    pub fn ddi_journal(
        rows: &[ClassifiedRow],
        request: &JournalRequest,
        resolver: &LocationResolver,
    ) -> Journal {
        let mut locations = LocationCache::new(resolver);
        Self::build(JournalKind::Ddi, rows.iter(), request, &mut locations).0
    }

    /// One Plan pair for every Usage row, numbered from 1 independently of DDI.
    pub fn plan_journal(
        rows: &[ClassifiedRow],
        request: &JournalRequest,
        resolver: &LocationResolver,
    ) -> Journal {
        let mut locations = LocationCache::new(resolver);
        Self::build(
            JournalKind::Plan,
            rows.iter().filter(|row| row.is_usage()),
            request,
            &mut locations,
        )
        .0
    }

    /// Builds one journal and counts the rows posted to the `Unknown` location.
    fn build<'r>(
        kind: JournalKind,
        rows: impl Iterator<Item = &'r ClassifiedRow>,
        request: &JournalRequest,
        locations: &mut LocationCache<'_>,
    ) -> (Journal, usize) {
        let legs = match kind {
            JournalKind::Ddi => &DDI_LEGS,
            JournalKind::Plan => &PLAN_LEGS,
        };
        let memo = request.memo(kind);
        let mut journal = Journal::new(kind);
        let mut unknown = 0;
        for (entry_no, row) in (1..).zip(rows) {
            let resolved = locations.path(&row.item.location);
            if resolved.is_none() {
                unknown += 1;
            }
            let location = resolved.unwrap_or(UNKNOWN_LOCATION);
            for leg in legs {
                journal
                    .entries
                    .push(entry(entry_no, request.date, row, location, &memo, leg));
            }
        }
        (journal, unknown)
    }
}

fn entry(
    entry_no: usize,
    date: NaiveDate,
    row: &ClassifiedRow,
    location: &str,
    memo: &str,
    leg: &Leg,
) -> JournalEntry {
    let amount: Decimal = row.amount();
    let (debit, credit) = match leg.side {
        Side::Debit => (Some(amount), None),
        Side::Credit => (None, Some(amount)),
    };
    JournalEntry {
        entry_no,
        date,
        subsidiary: row.item.subsidiary.clone(),
        location: location.to_string(),
        currency: row.item.currency.clone(),
        account: leg.account.to_string(),
        memo: memo.to_string(),
        debit,
        credit,
        department: leg.segments.department.to_string(),
        cost_centre: leg.segments.cost_centre.to_string(),
        mgmt_pl: leg.segments.mgmt_pl.to_string(),
        name: row.item.client.clone(),
    }
}

/// Memoizes accounting-location lookups for the duration of one generation call.
struct LocationCache<'a> {
    resolver: &'a LocationResolver,
    resolved: HashMap<String, Option<&'a str>>,
}

impl<'a> LocationCache<'a> {
    fn new(resolver: &'a LocationResolver) -> Self {
        Self {
            resolver,
            resolved: HashMap::new(),
        }
    }

    /// Accounting path for `location`, or `None` when it resolves to `Unknown`.
    fn path(&mut self, location: &str) -> Option<&'a str> {
        if let Some(path) = self.resolved.get(location) {
            return *path;
        }
        let resolution = self.resolver.resolve(location);
        let path = (!resolution.is_unknown()).then(|| resolution.path());
        self.resolved.insert(location.to_string(), path);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItem, SmsKind};
    use rust_decimal_macros::dec;

    fn row(location: &str, kind: SmsKind, amount: Decimal) -> ClassifiedRow {
        ClassifiedRow {
            item: LineItem {
                line_item: "SMS".into(),
                sms_type: Some(kind.label().into()),
                location: location.into(),
                amount,
                currency: "EUR".into(),
                subsidiary: "Germany".into(),
                client: "Acme".into(),
            },
            kind,
            region: "Germany".into(),
        }
    }

    fn march() -> JournalRequest {
        JournalRequest::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    }

    #[test]
    fn usage_row_produces_ddi_and_plan_pairs() {
        let rows = vec![row("Austria", SmsKind::Usage, dec!(100))];
        let set = JournalService::generate(&rows, &march(), &LocationResolver::default());

        assert_eq!(set.ddi.len(), 2);
        let revenue = &set.ddi.entries[0];
        assert_eq!(revenue.entry_no, 1);
        assert_eq!(revenue.location, "Germany : Austria");
        assert_eq!(revenue.memo, "March SMS DDI");
        assert_eq!(revenue.account, SALES_SMS_ACCOUNT);
        assert_eq!(revenue.credit, Some(dec!(100)));
        assert_eq!(revenue.debit, None);
        assert_eq!(revenue.mgmt_pl, "Recurring Revenue");
        let accrual = &set.ddi.entries[1];
        assert_eq!(accrual.account, ACCRUED_SMS_ACCOUNT);
        assert_eq!(accrual.debit, Some(dec!(100)));
        assert_eq!(accrual.department, "Balance Sheet");
        assert_eq!(accrual.name, "Acme");

        assert_eq!(set.plan.len(), 2);
        let plan_revenue = &set.plan.entries[0];
        assert_eq!(plan_revenue.entry_no, 1);
        assert_eq!(plan_revenue.memo, "March SMS Plan Usage");
        assert_eq!(plan_revenue.debit, Some(dec!(100)));
        let plan_usage = &set.plan.entries[1];
        assert_eq!(plan_usage.account, PLAN_USAGE_ACCOUNT);
        assert_eq!(plan_usage.credit, Some(dec!(100)));
        assert_eq!(plan_usage.cost_centre, "Revenue");
    }

    #[test]
    fn plan_counter_is_independent_of_ddi() {
        let rows = vec![
            row("Austria", SmsKind::BundlePurchase, dec!(1)),
            row("Spain", SmsKind::Usage, dec!(2)),
            row("Germany", SmsKind::BundlePurchase, dec!(3)),
            row("Jersey", SmsKind::Usage, dec!(4)),
        ];
        let set = JournalService::generate(&rows, &march(), &LocationResolver::default());
        let ddi_numbers: Vec<usize> = set.ddi.entries.iter().map(|e| e.entry_no).collect();
        assert_eq!(ddi_numbers, vec![1, 1, 2, 2, 3, 3, 4, 4]);
        let plan_numbers: Vec<usize> = set.plan.entries.iter().map(|e| e.entry_no).collect();
        assert_eq!(plan_numbers, vec![1, 1, 2, 2]);
        assert_eq!(set.plan.entries[2].location, "UK : Jersey");
    }

    #[test]
    fn every_pair_balances() {
        let rows = vec![
            row("Austria", SmsKind::Usage, dec!(12.34)),
            row("Atlantis", SmsKind::BundlePurchase, dec!(-5)),
        ];
        let set = JournalService::generate(&rows, &march(), &LocationResolver::default());
        assert!(set.ddi.is_balanced());
        assert!(set.plan.is_balanced());
        assert_eq!(set.ddi.debit_total(), set.ddi.credit_total());
        assert_eq!(set.ddi.entries[2].location, "Unknown");
    }

    #[test]
    fn unresolved_locations_are_counted_once_per_row() {
        let rows = vec![
            row("Atlantis", SmsKind::Usage, dec!(1)),
            row("Austria", SmsKind::Usage, dec!(2)),
            row("Atlantis", SmsKind::BundlePurchase, dec!(3)),
            row("Swizerland", SmsKind::Usage, dec!(4)),
        ];
        let set = JournalService::generate(&rows, &march(), &LocationResolver::default());
        assert_eq!(set.unknown_locations, 2);
        assert_eq!(set.ddi.entries[6].location, "Germany : Switzerland");

        let resolved = vec![row("Austria", SmsKind::Usage, dec!(2))];
        let set = JournalService::generate(&resolved, &march(), &LocationResolver::default());
        assert_eq!(set.unknown_locations, 0);
    }

    #[test]
    fn separate_builders_match_combined_generation() {
        let rows = vec![row("Austria", SmsKind::Usage, dec!(1))];
        let resolver = LocationResolver::default();
        let set = JournalService::generate(&rows, &march(), &resolver);
        assert_eq!(JournalService::ddi_journal(&rows, &march(), &resolver), set.ddi);
        assert_eq!(JournalService::plan_journal(&rows, &march(), &resolver), set.plan);
    }

    #[test]
    fn reversal_falls_on_second_of_next_month() {
        assert_eq!(
            march().reversal_date(),
            NaiveDate::from_ymd_opt(2024, 4, 2)
        );
        let december = JournalRequest::new(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(
            december.reversal_date(),
            NaiveDate::from_ymd_opt(2025, 1, 2)
        );
    }
}
