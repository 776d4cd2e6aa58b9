//! Sales analyst: business-intelligence queries over a loaded engine
//!
//! The SalesAnalyst borrows a [`SalesEngine`] and never mutates it. Every
//! derived statistic is computed on first request and cached for the lifetime
//! of the analyst instance (see [`QueryCache`]); a new analyst starts cold.
//!
//! # Thread Safety
//!
//! `SalesAnalyst` is `Send + Sync`. It can be shared across threads by
//! reference; concurrent first calls for the same query compute it once.
//!
//! # Conventions
//!
//! - Averages, deviations and percentages are rounded half away from zero to
//!   two places at the point they are returned.
//! - Money is accumulated in integer cents and converted to dollars last.
//!   Sums that leave the `i64` range fail with [`SalesError::Overflow`].
//! - "Standard deviation" is always the sample (Bessel-corrected) one.
//! - Entity lists preserve the source order of the underlying table.

use crate::core::cache::{Query, QueryCache};
use crate::core::engine::{MerchantJoin, SalesEngine};
use crate::core::stats::{
    self, counts_to_decimals, divide, mean, percentage, round2, sample_standard_deviation,
};
use crate::types::{
    cents_to_dollars, sum_cents, Cents, InvoiceItem, InvoiceStatus, Item, ItemId, Merchant,
    MerchantId, SalesError,
};
use chrono::{Datelike, Month, NaiveDate, Weekday};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Weekdays in bucket order
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Default size of [`SalesAnalyst::top_revenue_earners`]
pub const DEFAULT_TOP_EARNERS: usize = 20;

/// Query layer computing aggregate statistics over a [`SalesEngine`]
#[derive(Debug)]
pub struct SalesAnalyst<'e> {
    engine: &'e SalesEngine,
    cache: QueryCache,
}

impl<'e> SalesAnalyst<'e> {
    pub fn new(engine: &'e SalesEngine) -> Self {
        SalesAnalyst {
            engine,
            cache: QueryCache::new(),
        }
    }

    pub fn engine(&self) -> &'e SalesEngine {
        self.engine
    }

    // ------------------------------------------------------------------
    // Item counts
    // ------------------------------------------------------------------

    /// Total items ÷ total merchants
    pub fn average_items_per_merchant(&self) -> Result<Decimal, SalesError> {
        self.cache.get_or_compute(Query::AverageItemsPerMerchant, || {
            self.ratio_to_merchants(self.engine.items().len(), "average_items_per_merchant")
        })
    }

    /// For each merchant, in merchant order, the size of the chosen relation
    pub fn counts_per_merchant(&self, join: MerchantJoin) -> Result<Vec<usize>, SalesError> {
        self.cache.get_or_compute(Query::CountsPerMerchant(join), || {
            Ok(self
                .engine
                .merchants()
                .all()
                .iter()
                .map(|merchant| self.engine.count_for_merchant(join, merchant.id))
                .collect())
        })
    }

    /// `(count − average_items_per_merchant)²` per merchant, rounded
    pub fn variance_of_items(&self) -> Result<Vec<Decimal>, SalesError> {
        self.cache.get_or_compute(Query::VarianceOfItems, || {
            let average = self.average_items_per_merchant()?;
            Ok(self
                .counts_per_merchant(MerchantJoin::Items)?
                .into_iter()
                .map(|count| {
                    let deviation = Decimal::from(count) - average;
                    round2(deviation * deviation)
                })
                .collect())
        })
    }

    /// Sum of [`variance_of_items`](Self::variance_of_items)
    pub fn sum_of_item_variances(&self) -> Result<Decimal, SalesError> {
        self.cache.get_or_compute(Query::SumOfItemVariances, || {
            let total = stats::sum(self.variance_of_items()?, "sum_of_item_variances")?;
            Ok(round2(total))
        })
    }

    /// Sample standard deviation of per-merchant item counts
    pub fn average_items_per_merchant_standard_deviation(&self) -> Result<Decimal, SalesError> {
        self.cache
            .get_or_compute(Query::AverageItemsPerMerchantStandardDeviation, || {
                self.count_deviation(
                    MerchantJoin::Items,
                    "average_items_per_merchant_standard_deviation",
                )
            })
    }

    /// Merchants whose item count exceeds mean + 1 standard deviation
    pub fn merchants_with_high_item_count(&self) -> Result<Vec<&'e Merchant>, SalesError> {
        let positions = self
            .cache
            .get_or_compute(Query::MerchantsWithHighItemCount, || {
                let (mean, deviation) =
                    self.count_band(MerchantJoin::Items, "merchants_with_high_item_count")?;
                let threshold = mean + deviation;
                self.merchant_positions_where(MerchantJoin::Items, |count| count > threshold)
            })?;
        Ok(self.merchants_at(&positions))
    }

    // ------------------------------------------------------------------
    // Prices
    // ------------------------------------------------------------------

    /// Mean unit price of a merchant's items, in dollars
    ///
    /// # Errors
    ///
    /// * `NotFound` - The merchant does not exist
    /// * `DivisionByZero` - The merchant has no items
    pub fn average_item_price_for_merchant(
        &self,
        merchant_id: MerchantId,
    ) -> Result<Decimal, SalesError> {
        self.cache
            .get_or_compute(Query::AverageItemPriceForMerchant(merchant_id), || {
                let merchant = self.engine.merchants().get(merchant_id)?;
                let items = self.engine.find_merchant_items(merchant.id);
                self.average_price(&items, "average_item_price_for_merchant")
            })
    }

    /// Mean across merchants of each merchant's average item price
    ///
    /// Merchants without items have no average and are left out.
    pub fn average_average_price_per_merchant(&self) -> Result<Decimal, SalesError> {
        self.cache
            .get_or_compute(Query::AverageAveragePricePerMerchant, || {
                let averages = self
                    .engine
                    .merchants()
                    .all()
                    .iter()
                    .filter(|merchant| {
                        self.engine
                            .count_for_merchant(MerchantJoin::Items, merchant.id)
                            > 0
                    })
                    .map(|merchant| self.average_item_price_for_merchant(merchant.id))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(round2(mean(&averages, "average_average_price_per_merchant")?))
            })
    }

    /// Mean unit price across every item
    pub fn average_item_price(&self) -> Result<Decimal, SalesError> {
        self.cache.get_or_compute(Query::AverageItemPrice, || {
            let items: Vec<&Item> = self.engine.items().all().iter().collect();
            self.average_price(&items, "average_item_price")
        })
    }

    /// Unit price of every item, in item order
    pub fn item_unit_prices(&self) -> Result<Vec<Decimal>, SalesError> {
        self.cache.get_or_compute(Query::ItemUnitPrices, || {
            Ok(self
                .engine
                .items()
                .all()
                .iter()
                .map(Item::unit_price)
                .collect())
        })
    }

    /// Sample standard deviation of item unit prices
    pub fn item_price_standard_deviation(&self) -> Result<Decimal, SalesError> {
        self.cache
            .get_or_compute(Query::ItemPriceStandardDeviation, || {
                sample_standard_deviation(
                    &self.item_unit_prices()?,
                    "item_price_standard_deviation",
                )
            })
    }

    /// Items priced strictly above twice the item price standard deviation
    ///
    /// The threshold is `2 × stddev`, not `mean + 2 × stddev`.
    pub fn golden_items(&self) -> Result<Vec<&'e Item>, SalesError> {
        let positions = self.cache.get_or_compute(Query::GoldenItems, || {
            let threshold = self
                .item_price_standard_deviation()?
                .checked_mul(Decimal::TWO)
                .ok_or_else(|| SalesError::overflow("golden_items"))?;
            Ok(self
                .engine
                .items()
                .all()
                .iter()
                .enumerate()
                .filter(|(_, item)| item.unit_price() > threshold)
                .map(|(position, _)| position)
                .collect::<Vec<usize>>())
        })?;
        let items = self.engine.items().all();
        Ok(positions.iter().filter_map(|&p| items.get(p)).collect())
    }

    // ------------------------------------------------------------------
    // Invoice counts
    // ------------------------------------------------------------------

    /// Total invoices ÷ total merchants
    pub fn average_invoices_per_merchant(&self) -> Result<Decimal, SalesError> {
        self.cache
            .get_or_compute(Query::AverageInvoicesPerMerchant, || {
                self.ratio_to_merchants(
                    self.engine.invoices().len(),
                    "average_invoices_per_merchant",
                )
            })
    }

    /// Sample standard deviation of per-merchant invoice counts
    pub fn average_invoices_per_merchant_standard_deviation(
        &self,
    ) -> Result<Decimal, SalesError> {
        self.cache
            .get_or_compute(Query::AverageInvoicesPerMerchantStandardDeviation, || {
                self.count_deviation(
                    MerchantJoin::Invoices,
                    "average_invoices_per_merchant_standard_deviation",
                )
            })
    }

    /// Merchants whose invoice count exceeds mean + 2 standard deviations
    pub fn top_merchants_by_invoice_count(&self) -> Result<Vec<&'e Merchant>, SalesError> {
        let positions = self
            .cache
            .get_or_compute(Query::TopMerchantsByInvoiceCount, || {
                let (mean, deviation) =
                    self.count_band(MerchantJoin::Invoices, "top_merchants_by_invoice_count")?;
                let threshold = mean + deviation * Decimal::TWO;
                self.merchant_positions_where(MerchantJoin::Invoices, |count| count > threshold)
            })?;
        Ok(self.merchants_at(&positions))
    }

    /// Merchants whose invoice count falls below mean − 2 standard deviations
    pub fn bottom_merchants_by_invoice_count(&self) -> Result<Vec<&'e Merchant>, SalesError> {
        let positions = self
            .cache
            .get_or_compute(Query::BottomMerchantsByInvoiceCount, || {
                let (mean, deviation) = self
                    .count_band(MerchantJoin::Invoices, "bottom_merchants_by_invoice_count")?;
                let threshold = mean - deviation * Decimal::TWO;
                self.merchant_positions_where(MerchantJoin::Invoices, |count| count < threshold)
            })?;
        Ok(self.merchants_at(&positions))
    }

    // ------------------------------------------------------------------
    // Days and statuses
    // ------------------------------------------------------------------

    /// Weekday each invoice was created on, in invoice order
    pub fn day_created(&self) -> Result<Vec<Weekday>, SalesError> {
        self.cache.get_or_compute(Query::DayCreated, || {
            Ok(self
                .engine
                .invoices()
                .all()
                .iter()
                .map(|invoice| invoice.created_at.weekday())
                .collect())
        })
    }

    /// Invoice count per weekday, Monday through Sunday, zeros included
    pub fn day_count(&self) -> Result<Vec<(Weekday, usize)>, SalesError> {
        self.cache.get_or_compute(Query::DayCount, || {
            let mut counts = [0usize; 7];
            for day in self.day_created()? {
                counts[day.num_days_from_monday() as usize] += 1;
            }
            Ok(WEEKDAYS.into_iter().zip(counts).collect())
        })
    }

    /// Weekdays whose invoice count exceeds mean + 1 standard deviation
    /// across the seven day buckets
    pub fn top_days_by_invoice_count(&self) -> Result<Vec<Weekday>, SalesError> {
        self.cache.get_or_compute(Query::TopDaysByInvoiceCount, || {
            let day_count = self.day_count()?;
            let counts: Vec<usize> = day_count.iter().map(|(_, count)| *count).collect();
            let samples = counts_to_decimals(&counts);
            let threshold = mean(&samples, "top_days_by_invoice_count")?
                + sample_standard_deviation(&samples, "top_days_by_invoice_count")?;
            Ok(day_count
                .into_iter()
                .filter(|(_, count)| Decimal::from(*count) > threshold)
                .map(|(day, _)| day)
                .collect())
        })
    }

    /// Percentage of all invoices having `status`
    pub fn invoice_status(&self, status: InvoiceStatus) -> Result<Decimal, SalesError> {
        self.cache.get_or_compute(Query::InvoiceStatus(status), || {
            let matching = self.engine.invoices().find_all_by_status(status).len();
            percentage(matching, self.engine.invoices().len(), "invoice_status")
        })
    }

    // ------------------------------------------------------------------
    // Revenue
    // ------------------------------------------------------------------

    /// Revenue of every invoice created on `date`, summed
    ///
    /// A date without invoices has zero revenue.
    pub fn total_revenue_by_date(&self, date: NaiveDate) -> Result<Decimal, SalesError> {
        self.cache.get_or_compute(Query::TotalRevenueByDate(date), || {
            let cents = sum_cents(
                self.engine
                    .invoices()
                    .find_all_by_date(date)
                    .iter()
                    .map(|invoice| self.engine.invoice_total_cents(invoice.id)),
                "total_revenue_by_date",
            )?;
            Ok(cents_to_dollars(cents))
        })
    }

    /// Revenue of all of a merchant's invoices
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the merchant does not exist.
    pub fn total_revenue_by_merchant(&self, merchant_id: MerchantId) -> Result<Decimal, SalesError> {
        self.cache
            .get_or_compute(Query::TotalRevenueByMerchant(merchant_id), || {
                let merchant = self.engine.merchants().get(merchant_id)?;
                self.merchant_revenue_cents(merchant.id).map(cents_to_dollars)
            })
    }

    /// Same as [`total_revenue_by_merchant`](Self::total_revenue_by_merchant)
    pub fn revenue_by_merchant(&self, merchant_id: MerchantId) -> Result<Decimal, SalesError> {
        self.total_revenue_by_merchant(merchant_id)
    }

    /// Every merchant with its revenue, in merchant order
    pub fn merchant_revenues(&self) -> Result<Vec<(&'e Merchant, Decimal)>, SalesError> {
        let revenues = self.cache.get_or_compute(Query::MerchantRevenues, || {
            self.engine
                .merchants()
                .all()
                .iter()
                .map(|merchant| self.merchant_revenue_cents(merchant.id))
                .collect::<Result<Vec<Cents>, SalesError>>()
        })?;
        Ok(self
            .engine
            .merchants()
            .all()
            .iter()
            .zip(revenues)
            .map(|(merchant, cents)| (merchant, cents_to_dollars(cents)))
            .collect())
    }

    /// Merchants by revenue, highest first; ties keep merchant order
    pub fn merchants_ranked_by_revenue(&self) -> Result<Vec<&'e Merchant>, SalesError> {
        Ok(self.merchants_at(&self.ranked_positions()?))
    }

    /// The `n` highest-earning merchants
    pub fn top_revenue_earners(&self, n: usize) -> Result<Vec<&'e Merchant>, SalesError> {
        let positions = self.cache.get_or_compute(Query::TopRevenueEarners(n), || {
            let mut ranked = self.ranked_positions()?;
            ranked.truncate(n);
            Ok(ranked)
        })?;
        Ok(self.merchants_at(&positions))
    }

    fn ranked_positions(&self) -> Result<Vec<usize>, SalesError> {
        self.cache
            .get_or_compute(Query::MerchantsRankedByRevenue, || {
                let mut ranked: Vec<(usize, Decimal)> = self
                    .merchant_revenues()?
                    .into_iter()
                    .enumerate()
                    .map(|(position, (_, revenue))| (position, revenue))
                    .collect();
                // sort_by is stable, so equal revenues stay in merchant order
                ranked.sort_by(|a, b| b.1.cmp(&a.1));
                Ok(ranked
                    .into_iter()
                    .map(|(position, _)| position)
                    .collect::<Vec<usize>>())
            })
    }

    /// Merchants with at least one invoice whose total is zero
    ///
    /// A zero-total invoice stands in for "pending"; the status column is
    /// not consulted.
    pub fn merchants_with_pending_invoices(&self) -> Result<Vec<&'e Merchant>, SalesError> {
        let positions = self
            .cache
            .get_or_compute(Query::MerchantsWithPendingInvoices, || {
                self.positions_where(|merchant| {
                    for invoice in self.engine.find_merchant_invoices(merchant.id) {
                        if self.engine.invoice_total_cents(invoice.id)? == 0 {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                })
            })?;
        Ok(self.merchants_at(&positions))
    }

    // ------------------------------------------------------------------
    // Single-item merchants
    // ------------------------------------------------------------------

    /// Merchants selling exactly one item
    pub fn merchants_with_only_one_item(&self) -> Result<Vec<&'e Merchant>, SalesError> {
        let positions = self
            .cache
            .get_or_compute(Query::MerchantsWithOnlyOneItem, || {
                self.positions_where(|merchant| {
                    Ok(self
                        .engine
                        .count_for_merchant(MerchantJoin::Items, merchant.id)
                        == 1)
                })
            })?;
        Ok(self.merchants_at(&positions))
    }

    /// Merchants selling exactly one item that registered in `month`
    pub fn merchants_with_only_one_item_registered_in_month(
        &self,
        month: Month,
    ) -> Result<Vec<&'e Merchant>, SalesError> {
        let number = month.number_from_month();
        let positions = self
            .cache
            .get_or_compute(Query::MerchantsWithOnlyOneItemRegisteredIn(number), || {
                self.positions_where(|merchant| {
                    Ok(merchant.created_at.month() == number
                        && self
                            .engine
                            .count_for_merchant(MerchantJoin::Items, merchant.id)
                            == 1)
                })
            })?;
        Ok(self.merchants_at(&positions))
    }

    // ------------------------------------------------------------------
    // Best sellers
    // ------------------------------------------------------------------

    /// Items with the highest quantity sold on the merchant's paid invoices
    ///
    /// Every item tied for the maximum is returned, in order of first sale.
    /// Empty when the merchant has no paid invoices.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the merchant, or an item a paid line points at,
    /// does not exist.
    pub fn most_sold_item_for_merchant(
        &self,
        merchant_id: MerchantId,
    ) -> Result<Vec<&'e Item>, SalesError> {
        let positions = self
            .cache
            .get_or_compute(Query::MostSoldItemForMerchant(merchant_id), || {
                let totals =
                    self.paid_item_totals(merchant_id, |line| Ok(Cents::from(line.quantity)))?;
                let Some(max) = totals.iter().map(|(_, total)| *total).max() else {
                    return Ok(Vec::new());
                };
                totals
                    .into_iter()
                    .filter(|(_, total)| *total == max)
                    .map(|(item_id, _)| self.item_position(item_id))
                    .collect::<Result<Vec<usize>, SalesError>>()
            })?;
        let items = self.engine.items().all();
        Ok(positions.iter().filter_map(|&p| items.get(p)).collect())
    }

    /// Item earning the most revenue on the merchant's paid invoices
    ///
    /// Ties go to the item sold first. `None` when the merchant has no paid
    /// invoices.
    pub fn best_item_for_merchant(
        &self,
        merchant_id: MerchantId,
    ) -> Result<Option<&'e Item>, SalesError> {
        let position = self
            .cache
            .get_or_compute(Query::BestItemForMerchant(merchant_id), || {
                let totals = self.paid_item_totals(merchant_id, InvoiceItem::total_cents)?;
                let mut best: Option<(ItemId, Cents)> = None;
                for (item_id, total) in totals {
                    if best.map_or(true, |(_, best_total)| total > best_total) {
                        best = Some((item_id, total));
                    }
                }
                best.map(|(item_id, _)| self.item_position(item_id))
                    .transpose()
            })?;
        Ok(position.and_then(|p| self.engine.items().all().get(p)))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn ratio_to_merchants(
        &self,
        total: usize,
        operation: &'static str,
    ) -> Result<Decimal, SalesError> {
        let merchants = Decimal::from(self.engine.merchants().len());
        Ok(round2(divide(Decimal::from(total), merchants, operation)?))
    }

    fn count_deviation(
        &self,
        join: MerchantJoin,
        operation: &'static str,
    ) -> Result<Decimal, SalesError> {
        let samples = counts_to_decimals(&self.counts_per_merchant(join)?);
        sample_standard_deviation(&samples, operation)
    }

    /// Unrounded mean and standard deviation of per-merchant counts
    fn count_band(
        &self,
        join: MerchantJoin,
        operation: &'static str,
    ) -> Result<(Decimal, Decimal), SalesError> {
        let samples = counts_to_decimals(&self.counts_per_merchant(join)?);
        Ok((
            mean(&samples, operation)?,
            sample_standard_deviation(&samples, operation)?,
        ))
    }

    fn merchant_positions_where<P>(
        &self,
        join: MerchantJoin,
        predicate: P,
    ) -> Result<Vec<usize>, SalesError>
    where
        P: Fn(Decimal) -> bool,
    {
        Ok(self
            .counts_per_merchant(join)?
            .into_iter()
            .enumerate()
            .filter(|(_, count)| predicate(Decimal::from(*count)))
            .map(|(position, _)| position)
            .collect())
    }

    fn positions_where<P>(&self, predicate: P) -> Result<Vec<usize>, SalesError>
    where
        P: Fn(&Merchant) -> Result<bool, SalesError>,
    {
        let mut positions = Vec::new();
        for (position, merchant) in self.engine.merchants().all().iter().enumerate() {
            if predicate(merchant)? {
                positions.push(position);
            }
        }
        Ok(positions)
    }

    fn merchants_at(&self, positions: &[usize]) -> Vec<&'e Merchant> {
        let merchants = self.engine.merchants().all();
        positions.iter().filter_map(|&p| merchants.get(p)).collect()
    }

    fn item_position(&self, item_id: ItemId) -> Result<usize, SalesError> {
        self.engine
            .items()
            .position(item_id)
            .ok_or_else(|| SalesError::not_found("item", item_id))
    }

    fn average_price(&self, items: &[&Item], operation: &'static str) -> Result<Decimal, SalesError> {
        let cents = sum_cents(items.iter().map(|item| Ok(item.unit_price_cents)), operation)?;
        let average = divide(cents_to_dollars(cents), Decimal::from(items.len()), operation)?;
        Ok(round2(average))
    }

    fn merchant_revenue_cents(&self, merchant_id: MerchantId) -> Result<Cents, SalesError> {
        sum_cents(
            self.engine
                .find_merchant_invoices(merchant_id)
                .iter()
                .map(|invoice| self.engine.invoice_total_cents(invoice.id)),
            "merchant revenue",
        )
    }

    /// Per-item sum of `measure` over the lines of the merchant's paid
    /// invoices, in order of first appearance
    fn paid_item_totals<M>(
        &self,
        merchant_id: MerchantId,
        measure: M,
    ) -> Result<Vec<(ItemId, Cents)>, SalesError>
    where
        M: Fn(&InvoiceItem) -> Result<Cents, SalesError>,
    {
        let merchant = self.engine.merchants().get(merchant_id)?;

        let mut order: Vec<ItemId> = Vec::new();
        let mut totals: HashMap<ItemId, Cents> = HashMap::new();
        for invoice in self.engine.find_merchant_invoices(merchant.id) {
            if !self.engine.is_invoice_paid_in_full(invoice.id) {
                continue;
            }
            for line in self.engine.find_invoice_items(invoice.id) {
                let total = totals.entry(line.item_id).or_insert_with(|| {
                    order.push(line.item_id);
                    0
                });
                *total = total
                    .checked_add(measure(line)?)
                    .ok_or_else(|| SalesError::overflow("paid item totals"))?;
            }
        }

        Ok(order
            .into_iter()
            .map(|item_id| (item_id, totals[&item_id]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{customer, invoice, invoice_item, item, merchant, transaction};
    use crate::core::traits::Record;
    use crate::types::{Dataset, TransactionResult};
    use rstest::{fixture, rstest};

    fn dollars(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn ids<T: Record>(records: &[&T]) -> Vec<u32> {
        records.iter().map(|r| r.id()).collect()
    }

    /// Three merchants, seven items, six invoices across four weekdays
    #[fixture]
    fn engine() -> SalesEngine {
        use InvoiceStatus::*;
        use TransactionResult::*;

        SalesEngine::new(Dataset {
            merchants: vec![
                merchant(1, "ShopA", "2010-12-10"),
                merchant(2, "ShopB", "2011-06-25"),
                merchant(3, "CraftC", "2012-12-01"),
            ],
            items: vec![
                item(101, 1, 1000),
                item(102, 1, 1500),
                item(103, 1, 2000),
                item(201, 2, 1200),
                item(202, 2, 800),
                item(203, 2, 9000),
                item(301, 3, 30000),
            ],
            invoices: vec![
                invoice(1, 1, 1, Shipped, "2012-11-23 10:00:00 UTC"),
                invoice(2, 1, 2, Pending, "2012-11-23 18:30:00 UTC"),
                invoice(3, 1, 1, Returned, "2012-11-24"),
                invoice(4, 2, 3, Shipped, "2012-11-25"),
                invoice(5, 2, 2, Shipped, "2012-11-26"),
                invoice(6, 3, 3, Pending, "2012-11-30"),
            ],
            invoice_items: vec![
                invoice_item(1, 101, 1, 3, 1000),
                invoice_item(2, 102, 1, 3, 1500),
                invoice_item(3, 101, 3, 2, 1000),
                invoice_item(4, 103, 3, 1, 2000),
                invoice_item(5, 203, 4, 1, 9000),
                invoice_item(6, 201, 5, 5, 1200),
                invoice_item(7, 202, 5, 1, 800),
                invoice_item(8, 301, 6, 1, 30000),
            ],
            transactions: vec![
                transaction(1, 1, Success),
                transaction(2, 3, Failed),
                transaction(3, 3, Success),
                transaction(4, 4, Success),
                transaction(5, 5, Success),
                transaction(6, 6, Failed),
            ],
            customers: vec![
                customer(1, "Joey", "Ondricka"),
                customer(2, "Cecelia", "Osinski"),
                customer(3, "Mariah", "Toy"),
            ],
        })
    }

    #[test]
    fn test_analyst_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SalesAnalyst<'static>>();
    }

    #[rstest]
    fn test_item_count_statistics(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(analyst.average_items_per_merchant().unwrap(), dollars(233));
        assert_eq!(
            analyst.counts_per_merchant(MerchantJoin::Items).unwrap(),
            vec![3, 3, 1]
        );
        assert_eq!(
            analyst.variance_of_items().unwrap(),
            vec![dollars(45), dollars(45), dollars(177)]
        );
        assert_eq!(analyst.sum_of_item_variances().unwrap(), dollars(267));
        assert_eq!(
            analyst.average_items_per_merchant_standard_deviation().unwrap(),
            dollars(115)
        );
        assert!(analyst.merchants_with_high_item_count().unwrap().is_empty());
    }

    #[test]
    fn test_high_item_count_above_one_deviation() {
        let engine = SalesEngine::new(Dataset {
            merchants: (1..=4).map(|id| merchant(id, "M", "2010-01-01")).collect(),
            items: (1..=8)
                .map(|id| item(id, if id <= 5 { 4 } else { id - 5 }, 1000))
                .collect(),
            ..Dataset::default()
        });
        let analyst = SalesAnalyst::new(&engine);

        // counts [1, 1, 1, 5]: mean 2, deviation 2, threshold 4
        let high = analyst.merchants_with_high_item_count().unwrap();
        assert_eq!(ids(&high), vec![4]);
    }

    #[rstest]
    fn test_price_statistics(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(analyst.average_item_price().unwrap(), dollars(6500));
        assert_eq!(analyst.item_unit_prices().unwrap().len(), 7);
        assert_eq!(analyst.item_price_standard_deviation().unwrap(), dollars(10759));
        assert_eq!(ids(&analyst.golden_items().unwrap()), vec![301]);

        assert_eq!(analyst.average_item_price_for_merchant(1).unwrap(), dollars(1500));
        assert_eq!(analyst.average_item_price_for_merchant(2).unwrap(), dollars(3667));
        assert_eq!(
            analyst.average_average_price_per_merchant().unwrap(),
            dollars(11722)
        );
    }

    #[test]
    fn test_golden_items_excludes_price_exactly_at_threshold() {
        // prices 0, 2, 4: deviation exactly 2, threshold exactly 4
        let engine = SalesEngine::new(Dataset {
            merchants: vec![merchant(1, "M", "2010-01-01")],
            items: vec![item(1, 1, 0), item(2, 1, 200), item(3, 1, 400)],
            ..Dataset::default()
        });
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(analyst.item_price_standard_deviation().unwrap(), dollars(200));
        assert!(analyst.golden_items().unwrap().is_empty());
    }

    #[test]
    fn test_average_price_for_merchant_errors() {
        let engine = SalesEngine::new(Dataset {
            merchants: vec![merchant(1, "Empty", "2010-01-01")],
            ..Dataset::default()
        });
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(
            analyst.average_item_price_for_merchant(99).unwrap_err(),
            SalesError::not_found("merchant", 99)
        );
        assert!(matches!(
            analyst.average_item_price_for_merchant(1),
            Err(SalesError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_no_merchants_is_division_by_zero() {
        let engine = SalesEngine::default();
        let analyst = SalesAnalyst::new(&engine);

        assert!(matches!(
            analyst.average_items_per_merchant(),
            Err(SalesError::DivisionByZero { .. })
        ));
        assert!(matches!(
            analyst.average_invoices_per_merchant(),
            Err(SalesError::DivisionByZero { .. })
        ));
        assert!(analyst.invoice_status(InvoiceStatus::Pending).is_err());
    }

    #[rstest]
    fn test_invoice_count_statistics(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(analyst.average_invoices_per_merchant().unwrap(), dollars(200));
        assert_eq!(
            analyst.average_invoices_per_merchant_standard_deviation().unwrap(),
            dollars(100)
        );
        assert!(analyst.top_merchants_by_invoice_count().unwrap().is_empty());
        assert!(analyst.bottom_merchants_by_invoice_count().unwrap().is_empty());
    }

    #[rstest]
    fn test_day_statistics(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(analyst.day_created().unwrap()[..3], [Weekday::Fri, Weekday::Fri, Weekday::Sat]);

        let counts: Vec<usize> = analyst
            .day_count()
            .unwrap()
            .into_iter()
            .map(|(_, count)| count)
            .collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 3, 1, 1]);

        assert_eq!(analyst.top_days_by_invoice_count().unwrap(), vec![Weekday::Fri]);
        assert_eq!(weekday_name(Weekday::Fri), "Friday");
    }

    #[rstest]
    #[case::pending(InvoiceStatus::Pending, dollars(3333))]
    #[case::shipped(InvoiceStatus::Shipped, dollars(5000))]
    #[case::returned(InvoiceStatus::Returned, dollars(1667))]
    fn test_invoice_status(
        engine: SalesEngine,
        #[case] status: InvoiceStatus,
        #[case] expected: Decimal,
    ) {
        let analyst = SalesAnalyst::new(&engine);
        assert_eq!(analyst.invoice_status(status).unwrap(), expected);
    }

    #[rstest]
    fn test_invoice_status_percentages_cover_everything(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);
        let total: Decimal = InvoiceStatus::ALL
            .iter()
            .map(|&status| analyst.invoice_status(status).unwrap())
            .sum();
        assert!((total - Decimal::ONE_HUNDRED).abs() <= dollars(1));
    }

    #[test]
    fn test_total_revenue_by_date_sums_every_invoice_that_day() {
        let engine = SalesEngine::new(Dataset {
            merchants: vec![merchant(1, "M", "2010-01-01")],
            invoices: vec![
                invoice(1, 1, 1, InvoiceStatus::Shipped, "2009-02-07 08:00:00 UTC"),
                invoice(2, 1, 1, InvoiceStatus::Pending, "2009-02-07 21:15:00 UTC"),
                invoice(3, 1, 1, InvoiceStatus::Shipped, "2009-02-08"),
            ],
            invoice_items: vec![
                invoice_item(1, 1, 1, 1, 1000),
                invoice_item(2, 1, 2, 3, 500),
                invoice_item(3, 1, 3, 1, 99999),
            ],
            ..Dataset::default()
        });
        let analyst = SalesAnalyst::new(&engine);

        let date = NaiveDate::from_ymd_opt(2009, 2, 7).unwrap();
        assert_eq!(analyst.total_revenue_by_date(date).unwrap(), dollars(2500));

        let quiet = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert_eq!(analyst.total_revenue_by_date(quiet).unwrap(), Decimal::ZERO);
    }

    #[rstest]
    fn test_merchant_revenue(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(analyst.total_revenue_by_merchant(1).unwrap(), dollars(11500));
        assert_eq!(analyst.revenue_by_merchant(2).unwrap(), dollars(15800));
        assert_eq!(
            analyst.total_revenue_by_merchant(42).unwrap_err(),
            SalesError::not_found("merchant", 42)
        );

        let revenues: Vec<(u32, Decimal)> = analyst
            .merchant_revenues()
            .unwrap()
            .into_iter()
            .map(|(merchant, revenue)| (merchant.id, revenue))
            .collect();
        assert_eq!(
            revenues,
            vec![(1, dollars(11500)), (2, dollars(15800)), (3, dollars(30000))]
        );

        assert_eq!(ids(&analyst.merchants_ranked_by_revenue().unwrap()), vec![3, 2, 1]);
    }

    #[rstest]
    #[case::none(0, vec![])]
    #[case::top_two(2, vec![3, 2])]
    #[case::more_than_exist(20, vec![3, 2, 1])]
    fn test_top_revenue_earners(engine: SalesEngine, #[case] n: usize, #[case] expected: Vec<u32>) {
        let analyst = SalesAnalyst::new(&engine);
        assert_eq!(ids(&analyst.top_revenue_earners(n).unwrap()), expected);
    }

    #[test]
    fn test_revenue_ties_keep_merchant_order() {
        let engine = SalesEngine::new(Dataset {
            merchants: vec![
                merchant(1, "A", "2010-01-01"),
                merchant(2, "B", "2010-01-01"),
                merchant(3, "C", "2010-01-01"),
            ],
            invoices: vec![
                invoice(1, 1, 1, InvoiceStatus::Shipped, "2012-01-01"),
                invoice(2, 2, 1, InvoiceStatus::Shipped, "2012-01-01"),
                invoice(3, 3, 1, InvoiceStatus::Shipped, "2012-01-01"),
            ],
            invoice_items: vec![
                invoice_item(1, 1, 1, 1, 500),
                invoice_item(2, 1, 2, 1, 900),
                invoice_item(3, 1, 3, 1, 500),
            ],
            ..Dataset::default()
        });
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(ids(&analyst.merchants_ranked_by_revenue().unwrap()), vec![2, 1, 3]);
    }

    #[rstest]
    fn test_pending_and_single_item_merchants(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        // invoice 6 is pending by status but has a non-zero total
        assert_eq!(ids(&analyst.merchants_with_pending_invoices().unwrap()), vec![1]);
        assert_eq!(ids(&analyst.merchants_with_only_one_item().unwrap()), vec![3]);
        assert_eq!(
            ids(&analyst
                .merchants_with_only_one_item_registered_in_month(Month::December)
                .unwrap()),
            vec![3]
        );
        assert!(analyst
            .merchants_with_only_one_item_registered_in_month(Month::March)
            .unwrap()
            .is_empty());
    }

    #[rstest]
    #[case::quantity_tie(1, vec![101, 102])]
    #[case::single_winner(2, vec![201])]
    #[case::no_paid_invoices(3, vec![])]
    fn test_most_sold_item_for_merchant(
        engine: SalesEngine,
        #[case] merchant_id: MerchantId,
        #[case] expected: Vec<u32>,
    ) {
        let analyst = SalesAnalyst::new(&engine);
        assert_eq!(
            ids(&analyst.most_sold_item_for_merchant(merchant_id).unwrap()),
            expected
        );
    }

    #[rstest]
    #[case::revenue_beats_quantity(1, Some(102))]
    #[case::single_expensive_line(2, Some(203))]
    #[case::no_paid_invoices(3, None)]
    fn test_best_item_for_merchant(
        engine: SalesEngine,
        #[case] merchant_id: MerchantId,
        #[case] expected: Option<u32>,
    ) {
        let analyst = SalesAnalyst::new(&engine);
        assert_eq!(
            analyst
                .best_item_for_merchant(merchant_id)
                .unwrap()
                .map(|item| item.id),
            expected
        );
    }

    #[test]
    fn test_best_sellers_add_up_quantities_across_paid_invoices() {
        let engine = SalesEngine::new(Dataset {
            merchants: vec![merchant(1, "M", "2010-01-01")],
            items: vec![item(1, 1, 1000), item(2, 1, 1000), item(3, 1, 1100)],
            invoices: vec![
                invoice(1, 1, 1, InvoiceStatus::Shipped, "2012-01-01"),
                invoice(2, 1, 1, InvoiceStatus::Shipped, "2012-01-02"),
            ],
            invoice_items: vec![
                invoice_item(1, 1, 1, 3, 1000),
                invoice_item(2, 2, 1, 3, 1000),
                invoice_item(3, 1, 2, 3, 1000),
                invoice_item(4, 2, 2, 3, 1000),
                invoice_item(5, 3, 2, 5, 1100),
            ],
            transactions: vec![
                transaction(1, 1, TransactionResult::Success),
                transaction(2, 2, TransactionResult::Success),
            ],
            ..Dataset::default()
        });
        let analyst = SalesAnalyst::new(&engine);

        // 6 + 6 units beat the single 5-unit line only when both invoices count
        assert_eq!(ids(&analyst.most_sold_item_for_merchant(1).unwrap()), vec![1, 2]);
        // $60.00 each against $55.00
        assert_eq!(
            analyst.best_item_for_merchant(1).unwrap().map(|item| item.id),
            Some(1)
        );
    }

    #[test]
    fn test_huge_prices_overflow_as_errors() {
        let engine = SalesEngine::new(Dataset {
            merchants: vec![merchant(1, "M", "2010-01-01")],
            items: vec![item(1, 1, 0), item(2, 1, 100_000_000_000_000_000)],
            invoices: vec![invoice(1, 1, 1, InvoiceStatus::Shipped, "2012-01-01")],
            invoice_items: vec![invoice_item(1, 2, 1, 100, i64::MAX / 10)],
            transactions: vec![transaction(1, 1, TransactionResult::Success)],
            ..Dataset::default()
        });
        let analyst = SalesAnalyst::new(&engine);

        assert!(matches!(
            analyst.golden_items(),
            Err(SalesError::Overflow { .. })
        ));
        assert!(matches!(
            analyst.item_price_standard_deviation(),
            Err(SalesError::Overflow { .. })
        ));
        assert!(matches!(
            analyst.total_revenue_by_merchant(1),
            Err(SalesError::Overflow { .. })
        ));
        assert!(matches!(
            analyst.best_item_for_merchant(1),
            Err(SalesError::Overflow { .. })
        ));
        assert_eq!(
            analyst.average_item_price().unwrap(),
            dollars(50_000_000_000_000_000)
        );
    }

    #[rstest]
    fn test_derived_queries_are_cached(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        analyst.sum_of_item_variances().unwrap();
        analyst.item_unit_prices().unwrap();
        analyst.top_revenue_earners(2).unwrap();
        let cached = analyst.cache.len();

        analyst.sum_of_item_variances().unwrap();
        analyst.item_unit_prices().unwrap();
        assert_eq!(ids(&analyst.top_revenue_earners(2).unwrap()), vec![3, 2]);
        assert_eq!(analyst.cache.len(), cached);

        assert_eq!(ids(&analyst.top_revenue_earners(1).unwrap()), vec![3]);
        assert_eq!(analyst.cache.len(), cached + 1);
    }

    #[test]
    fn test_best_sellers_fail_on_dangling_item() {
        let engine = SalesEngine::new(Dataset {
            merchants: vec![merchant(1, "M", "2010-01-01")],
            invoices: vec![invoice(1, 1, 1, InvoiceStatus::Shipped, "2012-01-01")],
            invoice_items: vec![invoice_item(1, 404, 1, 1, 100)],
            transactions: vec![transaction(1, 1, TransactionResult::Success)],
            ..Dataset::default()
        });
        let analyst = SalesAnalyst::new(&engine);

        assert_eq!(
            analyst.most_sold_item_for_merchant(1).unwrap_err(),
            SalesError::not_found("item", 404)
        );
        assert_eq!(
            analyst.best_item_for_merchant(1).unwrap_err(),
            SalesError::not_found("item", 404)
        );
        assert_eq!(
            analyst.most_sold_item_for_merchant(9).unwrap_err(),
            SalesError::not_found("merchant", 9)
        );
    }

    #[rstest]
    fn test_results_are_stable_across_calls(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        let first = analyst.average_average_price_per_merchant().unwrap();
        let second = analyst.average_average_price_per_merchant().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            analyst.golden_items().unwrap(),
            analyst.golden_items().unwrap()
        );
    }

    #[rstest]
    fn test_shared_across_threads(engine: SalesEngine) {
        let analyst = SalesAnalyst::new(&engine);

        let results: Vec<Decimal> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| analyst.average_item_price().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|&price| price == dollars(6500)));
    }
}
