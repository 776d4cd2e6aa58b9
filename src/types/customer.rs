//! Customer records

use super::invoice::Invoice;
use super::merchant::Merchant;
use crate::core::traits::Record;
use crate::core::SalesEngine;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Customer identifier
pub type CustomerId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn invoices<'e>(&self, engine: &'e SalesEngine) -> Vec<&'e Invoice> {
        engine.invoices().find_all_by_customer_id(self.id)
    }

    /// Distinct merchants this customer has invoices with, in invoice order
    pub fn merchants<'e>(&self, engine: &'e SalesEngine) -> Vec<&'e Merchant> {
        let mut seen = HashSet::new();
        self.invoices(engine)
            .into_iter()
            .filter(|invoice| seen.insert(invoice.merchant_id))
            .filter_map(|invoice| engine.merchants().find_by_id(invoice.merchant_id))
            .collect()
    }
}

impl Record for Customer {
    const KIND: &'static str = "customer";

    fn id(&self) -> u32 {
        self.id
    }
}
