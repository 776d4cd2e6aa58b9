//! Compute-once cache for analyst queries
//!
//! The `QueryCache` maps a [`Query`] (operation plus arguments) to the result
//! of its first computation. It uses `DashMap` (a concurrent HashMap) for the
//! key → cell mapping and a `OnceLock` per cell for the value.
//!
//! # Concurrency
//!
//! The map's shard lock is only held while fetching or inserting a cell. The
//! computation itself runs inside `OnceLock::get_or_init`, so:
//!
//! - concurrent first calls for the same key compute the value at most once
//! - a query may call other cached queries while it computes
//! - different keys never wait on each other's computation
//!
//! A query must not depend on itself; that would block on its own cell.

use crate::core::engine::MerchantJoin;
use crate::types::{InvoiceStatus, MerchantId, SalesError};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::any::Any;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Cache key: one variant per cached operation, carrying its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    AverageItemsPerMerchant,
    CountsPerMerchant(MerchantJoin),
    VarianceOfItems,
    SumOfItemVariances,
    AverageItemsPerMerchantStandardDeviation,
    MerchantsWithHighItemCount,
    AverageItemPriceForMerchant(MerchantId),
    AverageAveragePricePerMerchant,
    AverageItemPrice,
    ItemUnitPrices,
    ItemPriceStandardDeviation,
    GoldenItems,
    AverageInvoicesPerMerchant,
    AverageInvoicesPerMerchantStandardDeviation,
    TopMerchantsByInvoiceCount,
    BottomMerchantsByInvoiceCount,
    DayCreated,
    DayCount,
    TopDaysByInvoiceCount,
    InvoiceStatus(InvoiceStatus),
    TotalRevenueByDate(NaiveDate),
    TotalRevenueByMerchant(MerchantId),
    MerchantRevenues,
    MerchantsRankedByRevenue,
    TopRevenueEarners(usize),
    MerchantsWithPendingInvoices,
    MerchantsWithOnlyOneItem,
    /// Month number, 1–12
    MerchantsWithOnlyOneItemRegisteredIn(u32),
    MostSoldItemForMerchant(MerchantId),
    BestItemForMerchant(MerchantId),
}

type Cell<T> = OnceLock<Result<T, SalesError>>;

/// Lazily populated, never invalidated result cache
#[derive(Default)]
pub struct QueryCache {
    cells: DashMap<Query, Arc<dyn Any + Send + Sync>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `query`, computing it on first use
    ///
    /// Errors are cached like values: the data is immutable, so a failing
    /// query fails the same way every time.
    pub fn get_or_compute<T, F>(&self, query: Query, compute: F) -> Result<T, SalesError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T, SalesError>,
    {
        let cell = Arc::clone(
            &*self
                .cells
                .entry(query)
                .or_insert_with(|| -> Arc<dyn Any + Send + Sync> { Arc::new(Cell::<T>::new()) }),
        );

        let Ok(cell) = cell.downcast::<Cell<T>>() else {
            debug_assert!(false, "{:?} requested with a second result type", query);
            return compute();
        };
        cell.get_or_init(|| {
            trace!(?query, "cache miss");
            compute()
        })
        .clone()
    }

    /// Number of queries computed (or being computed) so far
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.cells.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_computes_once_per_key() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute(Query::AverageItemPrice, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42u32)
                })
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_arguments_are_part_of_the_key() {
        let cache = QueryCache::new();

        let a = cache
            .get_or_compute(Query::TotalRevenueByMerchant(1), || Ok(1u32))
            .unwrap();
        let b = cache
            .get_or_compute(Query::TotalRevenueByMerchant(2), || Ok(2u32))
            .unwrap();

        assert_eq!((a, b), (1, 2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_cached() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result: Result<u32, SalesError> = cache.get_or_compute(Query::GoldenItems, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SalesError::division_by_zero("golden_items"))
            });
            assert!(result.is_err());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nested_queries_do_not_block() {
        let cache = QueryCache::new();

        let outer = cache
            .get_or_compute(Query::AverageAveragePricePerMerchant, || {
                let inner = cache.get_or_compute(Query::AverageItemPriceForMerchant(1), || {
                    Ok(10u32)
                })?;
                Ok(inner * 2)
            })
            .unwrap();

        assert_eq!(outer, 20);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_first_calls_compute_once() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let value = cache
                        .get_or_compute(Query::DayCount, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(10));
                            Ok(vec![1usize, 2, 3])
                        })
                        .unwrap();
                    assert_eq!(value, vec![1, 2, 3]);
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "requested with a second result type")]
    fn test_type_mismatch_is_a_bug() {
        let cache = QueryCache::new();
        cache.get_or_compute(Query::DayCreated, || Ok(1u32)).unwrap();

        let _ = cache.get_or_compute(Query::DayCreated, || Ok("fresh".to_string()));
    }
}
