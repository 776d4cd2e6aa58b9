//! Item records
//!
//! An item is something a merchant sells. Prices are held in integer cents
//! and exposed as dollar decimals.

use super::merchant::{Merchant, MerchantId};
use super::money::{cents_to_dollars, Cents};
use crate::core::traits::Record;
use crate::core::SalesEngine;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Item identifier
pub type ItemId = u32;

/// A product listed by a merchant
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,

    /// Owning merchant; not validated against the merchants table
    pub merchant_id: MerchantId,

    /// Unit price in cents
    pub unit_price_cents: Cents,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Unit price in dollars
    pub fn unit_price(&self) -> Decimal {
        cents_to_dollars(self.unit_price_cents)
    }

    /// Unit price as a float, for display only
    pub fn unit_price_to_dollars(&self) -> f64 {
        self.unit_price().to_f64().unwrap_or_default()
    }

    /// The merchant selling this item, if it exists
    pub fn merchant<'e>(&self, engine: &'e SalesEngine) -> Option<&'e Merchant> {
        engine.find_item_merchant(self.merchant_id)
    }
}

impl Record for Item {
    const KIND: &'static str = "item";

    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn merchant_id(&self) -> Option<MerchantId> {
        Some(self.merchant_id)
    }
}
