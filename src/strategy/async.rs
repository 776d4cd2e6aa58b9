//! Asynchronous loading strategy
//!
//! This module provides a multi-threaded implementation of the LoadStrategy
//! trait. All configured tables are read concurrently on a dedicated tokio
//! runtime, each through a csv-async reader over a tokio file.
//!
//! # Architecture
//!
//! ```text
//! AsyncLoadStrategy
//!     ├── LoadConfig (worker_threads)
//!     ├── tokio multi-threaded runtime
//!     └── try_join! over one read_table_async per table
//!         └── AsyncReader (batch CSV reading)
//! ```
//!
//! The first table to fail cancels the others and its error is returned.
//!
//! `load` blocks on its own runtime, so it must not be called from inside
//! another tokio runtime.

use crate::io::async_reader::read_table_async;
use crate::io::csv_format::{
    CustomerRow, InvoiceItemRow, InvoiceRow, ItemRow, MerchantRow, TableRow, TransactionRow,
};
use crate::strategy::{check_required, source_for, LoadStrategy};
use crate::types::{DataSources, Dataset, SalesError};
use tracing::{info, warn};

/// Configuration for the async loading runtime
#[derive(Clone, Debug, PartialEq)]
pub struct LoadConfig {
    /// Number of tokio worker threads
    pub worker_threads: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
        }
    }
}

impl LoadConfig {
    /// Create a new LoadConfig, replacing a zero thread count with the default
    pub fn new(worker_threads: usize) -> Self {
        let default = Self::default();

        let worker_threads = if worker_threads == 0 {
            warn!(
                worker_threads,
                default = default.worker_threads,
                "invalid worker thread count, using default"
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self { worker_threads }
    }
}

/// Asynchronous loading strategy
///
/// # Thread Safety
///
/// AsyncLoadStrategy is Send + Sync; each `load` call builds and drops its
/// own runtime.
#[derive(Debug, Clone)]
pub struct AsyncLoadStrategy {
    config: LoadConfig,
}

impl AsyncLoadStrategy {
    /// Create a new AsyncLoadStrategy with the specified configuration
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }
}

async fn load_table<T: TableRow>(sources: &DataSources) -> Result<Vec<T::Record>, SalesError> {
    match source_for(sources, T::ROLE)? {
        Some(path) => read_table_async::<T>(path).await,
        None => {
            info!(table = %T::ROLE, "no source configured, table left empty");
            Ok(Vec::new())
        }
    }
}

impl LoadStrategy for AsyncLoadStrategy {
    fn load(&self, sources: &DataSources) -> Result<Dataset, SalesError> {
        check_required(sources)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .build()?;

        let dataset = runtime.block_on(async {
            let (items, merchants, invoices, invoice_items, transactions, customers) = tokio::try_join!(
                load_table::<ItemRow>(sources),
                load_table::<MerchantRow>(sources),
                load_table::<InvoiceRow>(sources),
                load_table::<InvoiceItemRow>(sources),
                load_table::<TransactionRow>(sources),
                load_table::<CustomerRow>(sources),
            )?;

            Ok::<_, SalesError>(Dataset {
                items,
                merchants,
                invoices,
                invoice_items,
                transactions,
                customers,
            })
        })?;

        info!(
            strategy = "async",
            worker_threads = self.config.worker_threads,
            "dataset loaded"
        );
        Ok(dataset)
    }
}
