//! Synchronous loading strategy
//!
//! Reads the configured tables one after another on the calling thread,
//! delegating each file to [`read_table`] (the iterator-based `SyncReader`).
//!
//! # Thread Safety
//!
//! While this strategy is single-threaded, it implements Send + Sync to be
//! compatible with the LoadStrategy trait.

use crate::io::csv_format::{
    CustomerRow, InvoiceItemRow, InvoiceRow, ItemRow, MerchantRow, TableRow, TransactionRow,
};
use crate::io::sync_reader::read_table;
use crate::strategy::{check_required, source_for, LoadStrategy};
use crate::types::{DataSources, Dataset, SalesError};
use tracing::info;

/// Synchronous loading strategy
///
/// # Examples
///
/// ```no_run
/// use sales_engine::strategy::{LoadStrategy, SyncLoadStrategy};
/// use sales_engine::types::DataSources;
/// use std::path::Path;
///
/// let dataset = SyncLoadStrategy
///     .load(&DataSources::from_dir(Path::new("data")))
///     .expect("Loading failed");
/// println!("{} merchants", dataset.merchants.len());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncLoadStrategy;

fn load_table<T: TableRow>(sources: &DataSources) -> Result<Vec<T::Record>, SalesError> {
    match source_for(sources, T::ROLE)? {
        Some(path) => read_table::<T>(path),
        None => {
            info!(table = %T::ROLE, "no source configured, table left empty");
            Ok(Vec::new())
        }
    }
}

impl LoadStrategy for SyncLoadStrategy {
    fn load(&self, sources: &DataSources) -> Result<Dataset, SalesError> {
        check_required(sources)?;

        let dataset = Dataset {
            items: load_table::<ItemRow>(sources)?,
            merchants: load_table::<MerchantRow>(sources)?,
            invoices: load_table::<InvoiceRow>(sources)?,
            invoice_items: load_table::<InvoiceItemRow>(sources)?,
            transactions: load_table::<TransactionRow>(sources)?,
            customers: load_table::<CustomerRow>(sources)?,
        };

        info!(strategy = "sync", "dataset loaded");
        Ok(dataset)
    }
}
