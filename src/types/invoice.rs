//! Invoice records and their status
//!
//! An invoice groups the line items a customer bought from one merchant.
//! Its revenue is the sum of those line items; whether it was paid is
//! decided by the transactions charged against it.

use super::customer::{Customer, CustomerId};
use super::error::SalesError;
use super::invoice_item::InvoiceItem;
use super::item::Item;
use super::merchant::{Merchant, MerchantId};
use super::money::cents_to_dollars;
use super::transaction::Transaction;
use crate::core::traits::Record;
use crate::core::SalesEngine;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Invoice identifier
pub type InvoiceId = u32;

/// Fulfilment status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceStatus {
    Pending,
    Shipped,
    Returned,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [
        InvoiceStatus::Pending,
        InvoiceStatus::Shipped,
        InvoiceStatus::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Shipped => "shipped",
            InvoiceStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub merchant_id: MerchantId,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn merchant<'e>(&self, engine: &'e SalesEngine) -> Option<&'e Merchant> {
        engine.merchants().find_by_id(self.merchant_id)
    }

    pub fn customer<'e>(&self, engine: &'e SalesEngine) -> Option<&'e Customer> {
        engine.customers().find_by_id(self.customer_id)
    }

    pub fn invoice_items<'e>(&self, engine: &'e SalesEngine) -> Vec<&'e InvoiceItem> {
        engine.find_invoice_items(self.id)
    }

    pub fn transactions<'e>(&self, engine: &'e SalesEngine) -> Vec<&'e Transaction> {
        engine.find_invoice_transactions(self.id)
    }

    /// Items on this invoice, one per line item
    ///
    /// Fails if a line item references an item that does not exist.
    pub fn items<'e>(&self, engine: &'e SalesEngine) -> Result<Vec<&'e Item>, SalesError> {
        self.invoice_items(engine)
            .into_iter()
            .map(|line| engine.items().get(line.item_id))
            .collect()
    }

    /// Whether every transaction on this invoice settled
    pub fn is_paid_in_full(&self, engine: &SalesEngine) -> bool {
        engine.is_invoice_paid_in_full(self.id)
    }

    /// Revenue of this invoice in dollars
    pub fn total(&self, engine: &SalesEngine) -> Result<Decimal, SalesError> {
        engine.invoice_total_cents(self.id).map(cents_to_dollars)
    }
}

impl Record for Invoice {
    const KIND: &'static str = "invoice";

    fn id(&self) -> u32 {
        self.id
    }

    fn merchant_id(&self) -> Option<MerchantId> {
        Some(self.merchant_id)
    }
}
