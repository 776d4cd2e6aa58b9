//! Invoice line items

use super::invoice::{Invoice, InvoiceId};
use super::item::{Item, ItemId};
use super::money::{cents_to_dollars, Cents};
use crate::core::traits::Record;
use crate::core::SalesEngine;
use crate::types::SalesError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Invoice item identifier
pub type InvoiceItemId = u32;

/// One line of an invoice: a quantity of a single item at a fixed price
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub item_id: ItemId,
    pub invoice_id: InvoiceId,
    pub quantity: u32,

    /// Price per unit in cents, as charged on this invoice
    pub unit_price_cents: Cents,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceItem {
    pub fn unit_price(&self) -> Decimal {
        cents_to_dollars(self.unit_price_cents)
    }

    /// quantity × unit price, in cents
    pub fn total_cents(&self) -> Result<Cents, SalesError> {
        Cents::from(self.quantity)
            .checked_mul(self.unit_price_cents)
            .ok_or_else(|| SalesError::overflow("invoice item total"))
    }

    pub fn total(&self) -> Result<Decimal, SalesError> {
        self.total_cents().map(cents_to_dollars)
    }

    pub fn item<'e>(&self, engine: &'e SalesEngine) -> Option<&'e Item> {
        engine.items().find_by_id(self.item_id)
    }

    pub fn invoice<'e>(&self, engine: &'e SalesEngine) -> Option<&'e Invoice> {
        engine.invoices().find_by_id(self.invoice_id)
    }
}

impl Record for InvoiceItem {
    const KIND: &'static str = "invoice item";

    fn id(&self) -> u32 {
        self.id
    }

    fn invoice_id(&self) -> Option<InvoiceId> {
        Some(self.invoice_id)
    }
}
