//! Merchant records
//!
//! Merchants own items and invoices, but neither is stored inline: both are
//! resolved through the engine's merchant indexes.

use super::customer::Customer;
use super::invoice::Invoice;
use super::item::Item;
use crate::core::traits::Record;
use crate::core::SalesEngine;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Merchant identifier
pub type MerchantId = u32;

/// A seller registered in the marketplace
#[derive(Debug, Clone, PartialEq)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Merchant {
    pub fn items<'e>(&self, engine: &'e SalesEngine) -> Vec<&'e Item> {
        engine.find_merchant_items(self.id)
    }

    pub fn invoices<'e>(&self, engine: &'e SalesEngine) -> Vec<&'e Invoice> {
        engine.find_merchant_invoices(self.id)
    }

    /// Distinct customers that hold an invoice with this merchant
    ///
    /// Ordered by their first invoice. Invoices pointing at an unknown
    /// customer are skipped.
    pub fn customers<'e>(&self, engine: &'e SalesEngine) -> Vec<&'e Customer> {
        let mut seen = HashSet::new();
        self.invoices(engine)
            .into_iter()
            .filter(|invoice| seen.insert(invoice.customer_id))
            .filter_map(|invoice| engine.customers().find_by_id(invoice.customer_id))
            .collect()
    }
}

impl Record for Merchant {
    const KIND: &'static str = "merchant";

    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}
