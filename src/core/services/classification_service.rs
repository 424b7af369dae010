use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::{ClassifiedRow, LineItem, SmsKind, SmsLineItem};
use crate::errors::PipelineResult;
use crate::location::{LocationResolver, UNKNOWN_LOCATION};
use crate::storage::{columns, parse_amount, Table};

/// Name used for the raw export in error messages.
pub const EXPORT_TABLE: &str = "accrual export";

/// SMS TYPE values that are recognised as deliberate, even when they land in Bundle/Purchase.
const EXPLICIT_SMS_TYPES: &[&str] = &["usage", "bundle", "purchase", "bundle/purchase"];

/// Retained rows plus counters describing what the classifier did.
#[derive(Debug, Clone, Default)]
pub struct ClassificationReport {
    pub rows: Vec<ClassifiedRow>,
    pub rows_read: usize,
    pub rows_dropped: usize,
    /// Plain SMS rows whose blank or unrecognised SMS TYPE fell into Bundle/Purchase.
    pub defaulted_types: usize,
    pub unknown_regions: usize,
}

impl ClassificationReport {
    pub fn total_amount(&self) -> Decimal {
        self.rows.iter().map(ClassifiedRow::amount).sum()
    }

    pub fn total_for(&self, kind: SmsKind) -> Decimal {
        self.rows
            .iter()
            .filter(|row| row.kind == kind)
            .map(ClassifiedRow::amount)
            .sum()
    }
}

pub struct ClassificationService;

impl ClassificationService {
    /// Keeps SMS and SMS Bundle Sales rows, assigning each a `Type` and `Region`.
    ///
    /// Rows with any other line item are dropped without parsing their amount.
    pub fn classify(
        table: &Table,
        resolver: &LocationResolver,
    ) -> PipelineResult<ClassificationReport> {
        table.require_columns(EXPORT_TABLE, columns::CLASSIFIER_INPUT)?;
        let line_item = table.require_index(EXPORT_TABLE, columns::LINE_ITEM)?;
        let sms_type = table.require_index(EXPORT_TABLE, columns::SMS_TYPE)?;
        let location = table.require_index(EXPORT_TABLE, columns::LOCATION)?;
        let amount = table.require_index(EXPORT_TABLE, columns::AMOUNT)?;
        let currency = table.require_index(EXPORT_TABLE, columns::CURRENCY)?;
        let subsidiary = table.require_index(EXPORT_TABLE, columns::SUBSIDIARY)?;
        let client = table.require_index(EXPORT_TABLE, columns::CLIENT)?;

        let mut report = ClassificationReport {
            rows_read: table.len(),
            ..ClassificationReport::default()
        };

        for row in 0..table.len() {
            let raw_line_item = table.cell(row, line_item);
            let Some(sms_line_item) = SmsLineItem::parse(raw_line_item) else {
                report.rows_dropped += 1;
                continue;
            };

            let raw_type = table.cell(row, sms_type).trim();
            let effective_type = match sms_line_item {
                SmsLineItem::BundleSales => Some(SmsKind::BUNDLE_PURCHASE_LABEL.to_string()),
                SmsLineItem::Sms if raw_type.is_empty() => None,
                SmsLineItem::Sms => Some(raw_type.to_string()),
            };
            let kind = SmsKind::from_sms_type(effective_type.as_deref().unwrap_or(""));
            if sms_line_item == SmsLineItem::Sms && !is_explicit_type(raw_type) {
                report.defaulted_types += 1;
            }

            let location_value = table.cell(row, location).to_string();
            let region = resolver.region(&location_value).to_string();
            if region == UNKNOWN_LOCATION {
                report.unknown_regions += 1;
            }

            report.rows.push(ClassifiedRow {
                item: LineItem {
                    line_item: raw_line_item.to_string(),
                    sms_type: effective_type,
                    location: location_value,
                    amount: parse_amount(table.cell(row, amount), row)?,
                    currency: table.cell(row, currency).to_string(),
                    subsidiary: table.cell(row, subsidiary).to_string(),
                    client: table.cell(row, client).to_string(),
                },
                kind,
                region,
            });
        }

        if report.defaulted_types > 0 {
            warn!(
                rows = report.defaulted_types,
                "SMS rows without a recognised SMS TYPE were classified as Bundle/Purchase"
            );
        }
        if report.unknown_regions > 0 {
            warn!(rows = report.unknown_regions, "SMS rows with an unmapped region");
        }
        info!(
            read = report.rows_read,
            retained = report.rows.len(),
            dropped = report.rows_dropped,
            "classified SMS rows"
        );
        Ok(report)
    }
}

fn is_explicit_type(raw: &str) -> bool {
    EXPLICIT_SMS_TYPES
        .iter()
        .any(|known| raw.eq_ignore_ascii_case(known))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;
    use rust_decimal_macros::dec;

    fn export(rows: &[&[&str]]) -> Table {
        Table::from_strs(
            &[
                "LINE ITEM",
                "SMS TYPE",
                "LOCATION",
                "AMOUNT",
                "CURRENCY",
                "SUBSIDIARY",
                "CLIENT",
            ],
            rows,
        )
    }

    #[test]
    fn keeps_only_sms_line_items() {
        let table = export(&[
            &["SMS", "Usage", "Austria", "100", "EUR", "Germany", "Acme"],
            &["Voice", "Usage", "Austria", "not-a-number", "EUR", "Germany", "Acme"],
            &[" sms bundle sales ", "", "Jersey", "50", "GBP", "UK", "Beta"],
            &["SMS Bundle", "Usage", "Jersey", "5", "GBP", "UK", "Beta"],
        ]);
        let report =
            ClassificationService::classify(&table, &LocationResolver::default()).expect("ok");
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows_dropped, 2);
        assert_eq!(report.rows[0].kind, SmsKind::Usage);
        assert_eq!(report.rows[0].region, "Germany");
        assert_eq!(report.rows[1].kind, SmsKind::BundlePurchase);
        assert_eq!(report.rows[1].item.sms_type.as_deref(), Some("Bundle/Purchase"));
        assert_eq!(report.rows[1].region, "UK");
    }

    #[test]
    fn bundle_sales_override_usage_type() {
        let table = export(&[&["SMS Bundle Sales", "usage", "Jersey", "10", "GBP", "UK", "A"]]);
        let report =
            ClassificationService::classify(&table, &LocationResolver::default()).expect("ok");
        assert_eq!(report.rows[0].kind, SmsKind::BundlePurchase);
        assert_eq!(report.defaulted_types, 0);
    }

    #[test]
    fn blank_and_garbage_types_default_to_bundle_and_are_counted() {
        let table = export(&[
            &["SMS", "", "Jersey", "1", "GBP", "UK", "A"],
            &["SMS", "???", "Jersey", "2", "GBP", "UK", "A"],
            &["SMS", "Purchase", "Jersey", "3", "GBP", "UK", "A"],
        ]);
        let report =
            ClassificationService::classify(&table, &LocationResolver::default()).expect("ok");
        assert!(report
            .rows
            .iter()
            .all(|row| row.kind == SmsKind::BundlePurchase));
        assert_eq!(report.defaulted_types, 2);
        assert_eq!(report.rows[0].item.sms_type, None);
    }

    #[test]
    fn unknown_region_is_not_an_error() {
        let table = export(&[&["SMS", "Usage", "Atlantis", "7", "USD", "US", "A"]]);
        let report =
            ClassificationService::classify(&table, &LocationResolver::default()).expect("ok");
        assert_eq!(report.rows[0].region, UNKNOWN_LOCATION);
        assert_eq!(report.unknown_regions, 1);
    }

    #[test]
    fn totals_split_by_kind() {
        let table = export(&[
            &["SMS", "Usage", "Austria", "100.25", "EUR", "Germany", "A"],
            &["SMS", "Bundle", "Austria", "20", "EUR", "Germany", "A"],
        ]);
        let report =
            ClassificationService::classify(&table, &LocationResolver::default()).expect("ok");
        assert_eq!(report.total_amount(), dec!(120.25));
        assert_eq!(report.total_for(SmsKind::Usage), dec!(100.25));
        assert_eq!(report.total_for(SmsKind::BundlePurchase), dec!(20));
    }

    #[test]
    fn malformed_amount_on_retained_row_aborts() {
        let table = export(&[&["SMS", "Usage", "Austria", "12,x", "EUR", "Germany", "A"]]);
        let err = ClassificationService::classify(&table, &LocationResolver::default())
            .expect_err("bad amount");
        assert!(matches!(err, PipelineError::InvalidAmount { row: 2, .. }));
    }

    #[test]
    fn missing_columns_fail_before_processing() {
        let table = Table::from_strs(&["LINE ITEM", "AMOUNT"], &[&["SMS", "1"]]);
        let err = ClassificationService::classify(&table, &LocationResolver::default())
            .expect_err("missing columns");
        assert!(err.to_string().contains("SMS TYPE"));
    }
}
