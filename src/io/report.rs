//! CSV summary report
//!
//! Writes the analyst's headline statistics as `metric,value` rows. Lists of
//! entities are written as space-separated ids; weekdays by name.
//!
//! A statistic that is undefined for the loaded data (an average over an empty
//! table) is written with an empty value and logged, so one empty optional
//! table does not suppress the rest of the report. Any other error aborts.

use crate::core::analyst::{weekday_name, SalesAnalyst, DEFAULT_TOP_EARNERS};
use crate::core::traits::Record;
use crate::types::{InvoiceStatus, SalesError};
use chrono::{Month, NaiveDate};
use csv::Writer;
use rust_decimal::Decimal;
use std::io::Write;
use tracing::warn;

/// Optional sections of the report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// How many merchants `top_revenue_earners` lists
    pub top: usize,
    /// Adds `merchants_with_only_one_item_registered_in_month`
    pub month: Option<Month>,
    /// Adds `total_revenue_by_date`
    pub date: Option<NaiveDate>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP_EARNERS,
            month: None,
            date: None,
        }
    }
}

fn ids<T: Record>(records: &[&T]) -> String {
    records
        .iter()
        .map(|record| record.id().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn decimal(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Turn an undefined statistic into an empty cell, keep real failures
fn cell(metric: &str, value: Result<String, SalesError>) -> Result<String, SalesError> {
    match value {
        Err(SalesError::DivisionByZero { operation }) => {
            warn!(metric, operation, "statistic undefined for this dataset");
            Ok(String::new())
        }
        other => other,
    }
}

/// Write the summary report for `analyst` to `output`
///
/// # Errors
///
/// Returns an error if a statistic fails for a reason other than an empty
/// population, or if the output cannot be written.
pub fn write_report_csv(
    analyst: &SalesAnalyst<'_>,
    options: &ReportOptions,
    output: &mut dyn Write,
) -> Result<(), SalesError> {
    let mut rows: Vec<(String, Result<String, SalesError>)> = vec![
        (
            "average_items_per_merchant".into(),
            analyst.average_items_per_merchant().map(decimal),
        ),
        (
            "average_items_per_merchant_standard_deviation".into(),
            analyst
                .average_items_per_merchant_standard_deviation()
                .map(decimal),
        ),
        (
            "merchants_with_high_item_count".into(),
            analyst.merchants_with_high_item_count().map(|m| ids(&m)),
        ),
        (
            "average_item_price".into(),
            analyst.average_item_price().map(decimal),
        ),
        (
            "item_price_standard_deviation".into(),
            analyst.item_price_standard_deviation().map(decimal),
        ),
        (
            "average_average_price_per_merchant".into(),
            analyst.average_average_price_per_merchant().map(decimal),
        ),
        (
            "golden_items".into(),
            analyst.golden_items().map(|items| ids(&items)),
        ),
        (
            "average_invoices_per_merchant".into(),
            analyst.average_invoices_per_merchant().map(decimal),
        ),
        (
            "average_invoices_per_merchant_standard_deviation".into(),
            analyst
                .average_invoices_per_merchant_standard_deviation()
                .map(decimal),
        ),
        (
            "top_merchants_by_invoice_count".into(),
            analyst.top_merchants_by_invoice_count().map(|m| ids(&m)),
        ),
        (
            "bottom_merchants_by_invoice_count".into(),
            analyst.bottom_merchants_by_invoice_count().map(|m| ids(&m)),
        ),
        (
            "top_days_by_invoice_count".into(),
            analyst.top_days_by_invoice_count().map(|days| {
                days.into_iter()
                    .map(weekday_name)
                    .collect::<Vec<_>>()
                    .join(" ")
            }),
        ),
    ];

    for status in InvoiceStatus::ALL {
        rows.push((
            format!("invoice_status_{}", status),
            analyst.invoice_status(status).map(decimal),
        ));
    }

    if let Some(date) = options.date {
        rows.push((
            format!("total_revenue_by_date_{}", date),
            analyst.total_revenue_by_date(date).map(decimal),
        ));
    }

    rows.push((
        "top_revenue_earners".into(),
        analyst.top_revenue_earners(options.top).map(|m| ids(&m)),
    ));
    rows.push((
        "merchants_with_pending_invoices".into(),
        analyst.merchants_with_pending_invoices().map(|m| ids(&m)),
    ));
    rows.push((
        "merchants_with_only_one_item".into(),
        analyst.merchants_with_only_one_item().map(|m| ids(&m)),
    ));

    if let Some(month) = options.month {
        rows.push((
            format!(
                "merchants_with_only_one_item_registered_in_{}",
                month.name().to_lowercase()
            ),
            analyst
                .merchants_with_only_one_item_registered_in_month(month)
                .map(|m| ids(&m)),
        ));
    }

    let mut writer = Writer::from_writer(output);
    writer.write_record(["metric", "value"])?;
    for (metric, value) in rows {
        let value = cell(&metric, value)?;
        writer.write_record([metric.as_str(), value.as_str()])?;
    }
    writer.flush()?;

    Ok(())
}
