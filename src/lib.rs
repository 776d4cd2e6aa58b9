//! Sales Engine Library
//! # Overview
//!
//! This library loads an e-commerce dataset (merchants, items, invoices,
//! invoice line items, transactions, customers) from CSV, indexes it in
//! memory, and answers business-intelligence queries over it.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Entity records, identifiers, dataset roles and the error type
//! - [`cli`] - CLI argument parsing and log setup
//! - [`core`] - Business logic components:
//!   - [`core::repository`] - Indexed, read-only collection per entity kind
//!   - [`core::engine`] - Composition root and cross-entity joins
//!   - [`core::analyst`] - Cached statistics over an engine
//! - [`io`] - CSV readers (sync and async) and the report writer
//! - [`strategy`] - Pluggable dataset loading strategies
//!
//! # Example
//!
//! ```no_run
//! use sales_engine::core::{SalesAnalyst, SalesEngine};
//! use sales_engine::types::DataSources;
//! use std::path::Path;
//!
//! let engine = SalesEngine::from_csv(&DataSources::from_dir(Path::new("data")))?;
//! let analyst = SalesAnalyst::new(&engine);
//!
//! println!("{}", analyst.average_items_per_merchant()?);
//! for merchant in analyst.top_revenue_earners(5)? {
//!     println!("{}", merchant.name);
//! }
//! # Ok::<(), sales_engine::SalesError>(())
//! ```
//!
//! # Money
//!
//! Prices are stored as integer cents and surfaced as two-place
//! [`rust_decimal::Decimal`] dollars. Averages, deviations and percentages are
//! rounded half away from zero to two places when returned.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{MerchantJoin, Repository, SalesAnalyst, SalesEngine};
pub use io::{write_report_csv, ReportOptions};
pub use types::{
    Customer, DataSources, Dataset, DatasetRole, Invoice, InvoiceItem, InvoiceStatus, Item,
    Merchant, SalesError, Transaction, TransactionResult,
};
