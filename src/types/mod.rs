//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `item`, `merchant`, `invoice`, `invoice_item`, `transaction`, `customer`: entity records
//! - `money`: cent/dollar conversion
//! - `dataset`: dataset roles, input designators and loaded tables
//! - `error`: Error types for the sales engine

pub mod customer;
pub mod dataset;
pub mod error;
pub mod invoice;
pub mod invoice_item;
pub mod item;
pub mod merchant;
pub mod money;
pub mod transaction;

pub use customer::{Customer, CustomerId};
pub use dataset::{DataSources, Dataset, DatasetRole};
pub use error::SalesError;
pub use invoice::{Invoice, InvoiceId, InvoiceStatus};
pub use invoice_item::{InvoiceItem, InvoiceItemId};
pub use item::{Item, ItemId};
pub use merchant::{Merchant, MerchantId};
pub use money::{cents_to_dollars, sum_cents, Cents};
pub use transaction::{Transaction, TransactionId, TransactionResult};
