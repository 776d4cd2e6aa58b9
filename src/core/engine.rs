//! Sales engine: the composition root
//!
//! This module provides the SalesEngine that owns one repository per dataset
//! role and answers the cross-entity joins the analyst and the entity records
//! rely on.
//!
//! Entities never hold a pointer back to their repository. A relation such as
//! "the merchant of this item" is resolved by passing the engine by shared
//! reference (`item.merchant(&engine)`), so repositories and records can be
//! dropped independently and no reference cycle exists.
//!
//! All indexes are built once in [`SalesEngine::new`]; the engine is
//! read-only afterwards.

use crate::core::repository::Repository;
use crate::strategy::{LoadStrategy, SyncLoadStrategy};
use crate::types::{
    cents_to_dollars, Cents, Customer, DataSources, Dataset, Invoice, InvoiceId, InvoiceItem,
    Item, Merchant, MerchantId, SalesError, Transaction,
};
use rust_decimal::Decimal;
use tracing::info;

/// Which merchant relation a per-merchant count traverses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MerchantJoin {
    /// Items listed by the merchant
    Items,
    /// Invoices issued by the merchant
    Invoices,
}

/// Composition root over the six repositories
#[derive(Debug, Clone, Default)]
pub struct SalesEngine {
    items: Repository<Item>,
    merchants: Repository<Merchant>,
    invoices: Repository<Invoice>,
    invoice_items: Repository<InvoiceItem>,
    transactions: Repository<Transaction>,
    customers: Repository<Customer>,
}

impl SalesEngine {
    /// Build every repository and its indexes from already-typed records
    pub fn new(dataset: Dataset) -> Self {
        let engine = SalesEngine {
            items: Repository::new(dataset.items),
            merchants: Repository::new(dataset.merchants),
            invoices: Repository::new(dataset.invoices),
            invoice_items: Repository::new(dataset.invoice_items),
            transactions: Repository::new(dataset.transactions),
            customers: Repository::new(dataset.customers),
        };

        info!(
            items = engine.items.len(),
            merchants = engine.merchants.len(),
            invoices = engine.invoices.len(),
            invoice_items = engine.invoice_items.len(),
            transactions = engine.transactions.len(),
            customers = engine.customers.len(),
            "sales engine ready"
        );

        engine
    }

    /// Load every configured table with the synchronous strategy
    ///
    /// # Errors
    ///
    /// Fails if a required role has no source, a source cannot be read, or
    /// any record has a malformed field. Nothing is partially loaded.
    pub fn from_csv(sources: &DataSources) -> Result<Self, SalesError> {
        Self::load(&SyncLoadStrategy, sources)
    }

    /// Load every configured table with the given strategy
    pub fn load(strategy: &dyn LoadStrategy, sources: &DataSources) -> Result<Self, SalesError> {
        Ok(Self::new(strategy.load(sources)?))
    }

    pub fn items(&self) -> &Repository<Item> {
        &self.items
    }

    pub fn merchants(&self) -> &Repository<Merchant> {
        &self.merchants
    }

    pub fn invoices(&self) -> &Repository<Invoice> {
        &self.invoices
    }

    pub fn invoice_items(&self) -> &Repository<InvoiceItem> {
        &self.invoice_items
    }

    pub fn transactions(&self) -> &Repository<Transaction> {
        &self.transactions
    }

    pub fn customers(&self) -> &Repository<Customer> {
        &self.customers
    }

    /// Items listed by a merchant; empty for an unknown merchant id
    pub fn find_merchant_items(&self, merchant_id: MerchantId) -> Vec<&Item> {
        self.items.find_all_by_merchant_id(merchant_id)
    }

    /// Invoices issued by a merchant; empty for an unknown merchant id
    pub fn find_merchant_invoices(&self, merchant_id: MerchantId) -> Vec<&Invoice> {
        self.invoices.find_all_by_merchant_id(merchant_id)
    }

    /// The merchant an item points at
    pub fn find_item_merchant(&self, merchant_id: MerchantId) -> Option<&Merchant> {
        self.merchants.find_by_id(merchant_id)
    }

    /// Size of a merchant relation, straight from the index
    pub fn count_for_merchant(&self, join: MerchantJoin, merchant_id: MerchantId) -> usize {
        match join {
            MerchantJoin::Items => self.items.count_by_merchant_id(merchant_id),
            MerchantJoin::Invoices => self.invoices.count_by_merchant_id(merchant_id),
        }
    }

    pub fn find_invoice_items(&self, invoice_id: InvoiceId) -> Vec<&InvoiceItem> {
        self.invoice_items.find_all_by_invoice_id(invoice_id)
    }

    pub fn find_invoice_transactions(&self, invoice_id: InvoiceId) -> Vec<&Transaction> {
        self.transactions.find_all_by_invoice_id(invoice_id)
    }

    /// Revenue of an invoice id in cents; zero when it has no line items
    pub fn invoice_total_cents(&self, invoice_id: InvoiceId) -> Result<Cents, SalesError> {
        self.invoice_items.invoice_total_cents(invoice_id)
    }

    /// Revenue of an existing invoice in dollars
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no invoice has this id.
    pub fn total_invoice_amount(&self, invoice_id: InvoiceId) -> Result<Decimal, SalesError> {
        let invoice = self.invoices.get(invoice_id)?;
        self.invoice_total_cents(invoice.id).map(cents_to_dollars)
    }

    /// An invoice is paid in full when it has at least one transaction and
    /// every one of them succeeded
    pub fn is_invoice_paid_in_full(&self, invoice_id: InvoiceId) -> bool {
        let transactions = self.find_invoice_transactions(invoice_id);
        !transactions.is_empty() && transactions.iter().all(|t| t.is_success())
    }
}
