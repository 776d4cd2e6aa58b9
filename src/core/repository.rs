//! Generic in-memory repository
//!
//! A [`Repository`] owns every record of one entity kind in source order and
//! builds its indexes exactly once, at construction:
//!
//! - id → position (O(1) `find_by_id`)
//! - merchant id → positions, for kinds that belong to a merchant
//! - invoice id → positions, for kinds that belong to an invoice
//!
//! Group indexes keep positions in ascending order, so every finder returns
//! records in the order they appeared in the source table.
//!
//! # Duplicate Handling
//!
//! If a duplicate id is encountered, only the first occurrence is indexed by
//! id. Later records with the same id stay in `all()` and in the group
//! indexes but are unreachable through `find_by_id`.

use crate::core::traits::Record;
use crate::types::{
    sum_cents, Cents, Customer, Invoice, InvoiceId, InvoiceItem, InvoiceStatus, Item, ItemId,
    MerchantId, SalesError, Transaction, TransactionResult,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Read-only, indexed collection of one entity kind
#[derive(Debug, Clone)]
pub struct Repository<T> {
    records: Vec<T>,
    by_id: HashMap<u32, usize>,
    by_merchant: HashMap<MerchantId, Vec<usize>>,
    by_invoice: HashMap<InvoiceId, Vec<usize>>,
}

impl<T: Record> Repository<T> {
    /// Take ownership of `records` and build all indexes in one pass
    pub fn new(records: Vec<T>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_merchant: HashMap<MerchantId, Vec<usize>> = HashMap::new();
        let mut by_invoice: HashMap<InvoiceId, Vec<usize>> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            let id = record.id();
            if by_id.contains_key(&id) {
                warn!(kind = T::KIND, id, position, "duplicate id, keeping first record");
            } else {
                by_id.insert(id, position);
            }

            if let Some(merchant_id) = record.merchant_id() {
                by_merchant.entry(merchant_id).or_default().push(position);
            }
            if let Some(invoice_id) = record.invoice_id() {
                by_invoice.entry(invoice_id).or_default().push(position);
            }
        }

        debug!(
            kind = T::KIND,
            records = records.len(),
            merchants = by_merchant.len(),
            invoices = by_invoice.len(),
            "repository indexed"
        );

        Repository {
            records,
            by_id,
            by_merchant,
            by_invoice,
        }
    }

    /// Every record, in source order
    pub fn all(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the record with this id inside `all()`
    pub fn position(&self, id: u32) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Look up a record by id
    ///
    /// # Returns
    ///
    /// * `Some(&T)` - The first record carrying this id
    /// * `None` - If no record has this id
    pub fn find_by_id(&self, id: u32) -> Option<&T> {
        self.position(id).map(|position| &self.records[position])
    }

    /// Look up a record by id, treating absence as an error
    ///
    /// Used by joins that must not mistake a dangling reference for an
    /// empty result.
    pub fn get(&self, id: u32) -> Result<&T, SalesError> {
        self.find_by_id(id)
            .ok_or_else(|| SalesError::not_found(T::KIND, id))
    }

    /// First record whose name equals `name`, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        let needle = name.to_lowercase();
        self.records
            .iter()
            .find(|record| record.name().is_some_and(|n| n.to_lowercase() == needle))
    }

    /// Every record whose name contains `fragment`, ignoring case
    pub fn find_all_by_name(&self, fragment: &str) -> Vec<&T> {
        let needle = fragment.to_lowercase();
        self.find_all(|record| {
            record
                .name()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
    }

    /// Every record belonging to the merchant
    pub fn find_all_by_merchant_id(&self, merchant_id: MerchantId) -> Vec<&T> {
        self.select(self.by_merchant.get(&merchant_id))
    }

    /// Number of records belonging to the merchant, without materializing them
    pub fn count_by_merchant_id(&self, merchant_id: MerchantId) -> usize {
        self.by_merchant.get(&merchant_id).map_or(0, Vec::len)
    }

    /// Every record belonging to the invoice
    pub fn find_all_by_invoice_id(&self, invoice_id: InvoiceId) -> Vec<&T> {
        self.select(self.by_invoice.get(&invoice_id))
    }

    /// Every record matching `predicate`, in source order
    ///
    /// Linear scan; for ad-hoc finders that no statistic runs per merchant.
    pub fn find_all<P>(&self, mut predicate: P) -> Vec<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.records.iter().filter(|record| predicate(*record)).collect()
    }

    fn select(&self, positions: Option<&Vec<usize>>) -> Vec<&T> {
        positions
            .map(|positions| positions.iter().map(|&p| &self.records[p]).collect())
            .unwrap_or_default()
    }
}

impl<T: Record> Default for Repository<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Repository<Item> {
    /// Items whose description contains `fragment`, ignoring case
    pub fn find_all_with_description(&self, fragment: &str) -> Vec<&Item> {
        let needle = fragment.to_lowercase();
        self.find_all(|item| item.description.to_lowercase().contains(&needle))
    }

    /// Items priced at exactly `price` dollars
    pub fn find_all_by_price(&self, price: Decimal) -> Vec<&Item> {
        self.find_all(|item| item.unit_price() == price)
    }

    /// Items priced within `low..=high` dollars
    pub fn find_all_by_price_in_range(&self, low: Decimal, high: Decimal) -> Vec<&Item> {
        self.find_all(|item| (low..=high).contains(&item.unit_price()))
    }
}

impl Repository<Invoice> {
    pub fn find_all_by_customer_id(&self, customer_id: u32) -> Vec<&Invoice> {
        self.find_all(|invoice| invoice.customer_id == customer_id)
    }

    pub fn find_all_by_status(&self, status: InvoiceStatus) -> Vec<&Invoice> {
        self.find_all(|invoice| invoice.status == status)
    }

    /// Invoices created on the given calendar date (UTC)
    pub fn find_all_by_date(&self, date: NaiveDate) -> Vec<&Invoice> {
        self.find_all(|invoice| invoice.created_at.date_naive() == date)
    }
}

impl Repository<InvoiceItem> {
    pub fn find_all_by_item_id(&self, item_id: ItemId) -> Vec<&InvoiceItem> {
        self.find_all(|line| line.item_id == item_id)
    }

    /// Sum of line totals for an invoice, in cents
    pub fn invoice_total_cents(&self, invoice_id: InvoiceId) -> Result<Cents, SalesError> {
        let positions = self.by_invoice.get(&invoice_id).map_or(&[][..], Vec::as_slice);
        sum_cents(
            positions.iter().map(|&p| self.records[p].total_cents()),
            "invoice total",
        )
    }
}

impl Repository<Transaction> {
    pub fn find_all_by_credit_card_number(&self, number: &str) -> Vec<&Transaction> {
        self.find_all(|transaction| transaction.credit_card_number == number)
    }

    pub fn find_all_by_result(&self, result: TransactionResult) -> Vec<&Transaction> {
        self.find_all(|transaction| transaction.result == result)
    }
}

impl Repository<Customer> {
    pub fn find_all_by_first_name(&self, fragment: &str) -> Vec<&Customer> {
        let needle = fragment.to_lowercase();
        self.find_all(|customer| customer.first_name.to_lowercase().contains(&needle))
    }

    pub fn find_all_by_last_name(&self, fragment: &str) -> Vec<&Customer> {
        let needle = fragment.to_lowercase();
        self.find_all(|customer| customer.last_name.to_lowercase().contains(&needle))
    }
}
