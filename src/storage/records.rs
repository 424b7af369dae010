//! Conversions between domain values and the tables handed to the exporter.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{columns, line_number, parse_amount, Table};
use crate::domain::{
    ClassifiedRow, Journal, JournalEntry, JournalKind, LineItem, SmsKind, SummaryTables,
};
use crate::errors::{PipelineError, PipelineResult};
use crate::location::UNKNOWN_LOCATION;

pub const PROCESSED_HEADERS: &[&str] = &[
    columns::LINE_ITEM,
    columns::SMS_TYPE,
    columns::LOCATION,
    columns::AMOUNT,
    columns::CURRENCY,
    columns::SUBSIDIARY,
    columns::CLIENT,
    columns::TYPE,
    columns::REGION,
];

fn amount_cell(amount: Option<Decimal>) -> String {
    amount.map(|value| value.to_string()).unwrap_or_default()
}

/// Processed SMS rows with their derived `Type` and `Region`.
pub fn processed_table(rows: &[ClassifiedRow]) -> Table {
    let mut table = Table::new(
        PROCESSED_HEADERS.iter().map(|h| h.to_string()).collect(),
        Vec::with_capacity(rows.len()),
    );
    for row in rows {
        let item = &row.item;
        table.push_row(vec![
            item.line_item.clone(),
            item.sms_type.clone().unwrap_or_default(),
            item.location.clone(),
            item.amount.to_string(),
            item.currency.clone(),
            item.subsidiary.clone(),
            item.client.clone(),
            row.kind.label().to_string(),
            row.region.clone(),
        ]);
    }
    table
}

/// Reads a processed file back into classified rows, trusting its `Type` column.
///
/// `required` is checked up front; `CLIENT`, `LINE ITEM`, `SMS TYPE` and `Region`
/// read as blank (or `Unknown` for region) when not required and absent.
pub fn processed_rows(
    table: &Table,
    table_name: &str,
    required: &[&str],
) -> PipelineResult<Vec<ClassifiedRow>> {
    let mut needed: Vec<&str> = vec![
        columns::SUBSIDIARY,
        columns::LOCATION,
        columns::AMOUNT,
        columns::CURRENCY,
        columns::TYPE,
    ];
    for name in required {
        if !needed.contains(name) {
            needed.push(*name);
        }
    }
    table.require_columns(table_name, &needed)?;

    let subsidiary = table.require_index(table_name, columns::SUBSIDIARY)?;
    let location = table.require_index(table_name, columns::LOCATION)?;
    let amount = table.require_index(table_name, columns::AMOUNT)?;
    let currency = table.require_index(table_name, columns::CURRENCY)?;
    let kind = table.require_index(table_name, columns::TYPE)?;
    let col = |name: &str| table.column_index(name);
    let client = col(columns::CLIENT);
    let line_item = col(columns::LINE_ITEM);
    let sms_type = col(columns::SMS_TYPE);
    let region = col(columns::REGION);
    let optional = |row: usize, idx: Option<usize>| {
        idx.map(|idx| table.cell(row, idx).to_string())
            .unwrap_or_default()
    };

    let mut rows = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let sms_type_value = optional(row, sms_type);
        let region_value = region
            .map(|idx| table.cell(row, idx).to_string())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
        rows.push(ClassifiedRow {
            item: LineItem {
                line_item: optional(row, line_item),
                sms_type: (!sms_type_value.is_empty()).then_some(sms_type_value),
                location: table.cell(row, location).to_string(),
                amount: parse_amount(table.cell(row, amount), row)?,
                currency: table.cell(row, currency).to_string(),
                subsidiary: table.cell(row, subsidiary).to_string(),
                client: optional(row, client),
            },
            kind: SmsKind::from_sms_type(table.cell(row, kind)),
            region: region_value,
        });
    }
    Ok(rows)
}

pub fn sales_by_subsidiary_table(summary: &SummaryTables) -> Table {
    let mut table = Table::from_strs(
        &["Subsidiary", "Usage", "Bundle/Purchase", "Grand Total"],
        &[],
    );
    for row in &summary.sales_by_subsidiary {
        table.push_row(vec![
            row.subsidiary.clone(),
            row.usage.to_string(),
            row.bundle_purchase.to_string(),
            row.grand_total().to_string(),
        ]);
    }
    table
}

pub fn usage_by_location_table(summary: &SummaryTables) -> Table {
    let mut table = Table::from_strs(&["Subsidiary", "LOCATION", "CURRENCY", "Sum of AMOUNT"], &[]);
    for row in &summary.usage_by_location {
        table.push_row(vec![
            row.subsidiary.clone(),
            row.location.clone(),
            row.currency.clone(),
            row.amount.to_string(),
        ]);
    }
    table
}

pub fn totals_table(summary: &SummaryTables) -> Table {
    let mut table = Table::from_strs(&["Category", "Amount"], &[]);
    for (label, amount) in summary.totals.rows() {
        table.push_row(vec![label.to_string(), amount.to_string()]);
    }
    table
}

/// Upload-ready journal lines. Debit and Credit cells are blank on the unused side.
pub fn journal_table(entries: &[JournalEntry], date_format: &str) -> Table {
    let mut table = Table::new(
        columns::JOURNAL_HEADERS
            .iter()
            .map(|h| h.to_string())
            .collect(),
        Vec::with_capacity(entries.len()),
    );
    for entry in entries {
        table.push_row(vec![
            entry.entry_no.to_string(),
            entry.date.format(date_format).to_string(),
            entry.subsidiary.clone(),
            entry.location.clone(),
            entry.currency.clone(),
            entry.account.clone(),
            entry.memo.clone(),
            amount_cell(entry.debit),
            amount_cell(entry.credit),
            entry.department.clone(),
            entry.cost_centre.clone(),
            entry.mgmt_pl.clone(),
            entry.name.clone(),
        ]);
    }
    table
}

fn optional_amount(raw: &str, row: usize) -> PipelineResult<Option<Decimal>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(raw, row).map(Some)
    }
}

/// Reads a previously written journal so it can be split for upload.
pub fn journal_from_table(
    table: &Table,
    kind: JournalKind,
    date_format: &str,
) -> PipelineResult<Journal> {
    table.require_columns(kind.sheet_name(), columns::JOURNAL_HEADERS)?;
    let idx = columns::JOURNAL_HEADERS
        .iter()
        .map(|name| table.require_index(kind.sheet_name(), name))
        .collect::<PipelineResult<Vec<usize>>>()?;
    let cell = |row: usize, field: usize| table.cell(row, idx[field]);

    let mut journal = Journal::new(kind);
    for row in 0..table.len() {
        let entry_no = cell(row, 0)
            .trim()
            .parse::<usize>()
            .map_err(|_| PipelineError::InvalidEntryNo {
                row: line_number(row),
                value: cell(row, 0).to_string(),
            })?;
        let date = NaiveDate::parse_from_str(cell(row, 1).trim(), date_format).map_err(|_| {
            PipelineError::InvalidDate {
                row: line_number(row),
                value: cell(row, 1).to_string(),
            }
        })?;
        journal.entries.push(JournalEntry {
            entry_no,
            date,
            subsidiary: cell(row, 2).to_string(),
            location: cell(row, 3).to_string(),
            currency: cell(row, 4).to_string(),
            account: cell(row, 5).to_string(),
            memo: cell(row, 6).to_string(),
            debit: optional_amount(cell(row, 7), row)?,
            credit: optional_amount(cell(row, 8), row)?,
            department: cell(row, 9).to_string(),
            cost_centre: cell(row, 10).to_string(),
            mgmt_pl: cell(row, 11).to_string(),
            name: cell(row, 12).to_string(),
        });
    }
    Ok(journal)
}
