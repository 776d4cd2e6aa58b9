//! CSV format handling for the six dataset tables
//!
//! This module centralizes all CSV format concerns, providing:
//! - one row structure per table for deserialization
//! - conversion from raw rows to domain records, field by field
//! - timestamp parsing shared by every table
//!
//! Rows are deserialized with every column as text so that a malformed value
//! surfaces as [`SalesError::InvalidField`] naming the table, the record index
//! and the column, instead of an opaque serde message. All functions are pure
//! (no I/O) for easy testing.
//!
//! # Table Layouts
//!
//! | Table | Columns |
//! |---|---|
//! | items | id, name, description, unit_price, merchant_id, created_at, updated_at |
//! | merchants | id, name, created_at, updated_at |
//! | invoices | id, customer_id, merchant_id, status, created_at, updated_at |
//! | invoice_items | id, item_id, invoice_id, quantity, unit_price, created_at, updated_at |
//! | transactions | id, invoice_id, credit_card_number, credit_card_expiration_date, result, created_at, updated_at |
//! | customers | id, first_name, last_name, created_at, updated_at |
//!
//! Prices are integer cents. A missing or empty `updated_at` falls back to
//! `created_at`.

use crate::types::{
    Cents, Customer, DatasetRole, Invoice, InvoiceItem, InvoiceStatus, Item, Merchant,
    SalesError, Transaction, TransactionResult,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;

/// A raw CSV row that converts into one domain record
pub trait TableRow: DeserializeOwned + Send + 'static {
    /// Table this row shape belongs to
    const ROLE: DatasetRole;

    /// Domain record produced by [`TableRow::into_record`]
    type Record: Send + 'static;

    /// Convert the row at zero-based position `record` into its domain record
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` for the first column that fails to parse.
    fn into_record(self, record: usize) -> Result<Self::Record, SalesError>;
}

/// Parse a raw timestamp into UTC
///
/// Accepted forms:
/// - `2012-03-27 14:54:09 UTC`
/// - `2012-03-27 14:54:09`
/// - RFC 3339 (`2012-03-27T14:54:09Z`, `2012-03-27T14:54:09+02:00`)
/// - `2012-03-27` (midnight UTC)
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let naive = raw.strip_suffix(" UTC").unwrap_or(raw);

    if let Ok(datetime) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.and_utc());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

/// Field-level parsing for one record, carrying the context errors need
struct Fields {
    table: DatasetRole,
    record: usize,
}

impl Fields {
    fn new(table: DatasetRole, record: usize) -> Self {
        Self { table, record }
    }

    fn invalid(&self, field: &'static str, value: &str) -> SalesError {
        SalesError::invalid_field(self.table, self.record, field, value)
    }

    fn number<N: FromStr>(&self, field: &'static str, value: &str) -> Result<N, SalesError> {
        value
            .trim()
            .parse::<N>()
            .map_err(|_| self.invalid(field, value))
    }

    fn cents(&self, field: &'static str, value: &str) -> Result<Cents, SalesError> {
        self.number(field, value)
    }

    fn timestamp(&self, field: &'static str, value: &str) -> Result<DateTime<Utc>, SalesError> {
        parse_datetime(value).ok_or_else(|| self.invalid(field, value))
    }

    fn updated_at(
        &self,
        value: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, SalesError> {
        match value.map(str::trim) {
            Some(raw) if !raw.is_empty() => self.timestamp("updated_at", raw),
            _ => Ok(created_at),
        }
    }

    fn status(&self, value: &str) -> Result<InvoiceStatus, SalesError> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(InvoiceStatus::Pending),
            "shipped" => Ok(InvoiceStatus::Shipped),
            "returned" => Ok(InvoiceStatus::Returned),
            _ => Err(self.invalid("status", value)),
        }
    }

    fn result(&self, value: &str) -> Result<TransactionResult, SalesError> {
        match value.trim().to_lowercase().as_str() {
            "success" => Ok(TransactionResult::Success),
            "failed" => Ok(TransactionResult::Failed),
            _ => Err(self.invalid("result", value)),
        }
    }
}

/// Row of `items.csv`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ItemRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: String,
    pub merchant_id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl TableRow for ItemRow {
    const ROLE: DatasetRole = DatasetRole::Items;
    type Record = Item;

    fn into_record(self, record: usize) -> Result<Item, SalesError> {
        let fields = Fields::new(Self::ROLE, record);
        let created_at = fields.timestamp("created_at", &self.created_at)?;

        Ok(Item {
            id: fields.number("id", &self.id)?,
            name: self.name,
            description: self.description,
            merchant_id: fields.number("merchant_id", &self.merchant_id)?,
            unit_price_cents: fields.cents("unit_price", &self.unit_price)?,
            created_at,
            updated_at: fields.updated_at(self.updated_at.as_deref(), created_at)?,
        })
    }
}

/// Row of `merchants.csv`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MerchantRow {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl TableRow for MerchantRow {
    const ROLE: DatasetRole = DatasetRole::Merchants;
    type Record = Merchant;

    fn into_record(self, record: usize) -> Result<Merchant, SalesError> {
        let fields = Fields::new(Self::ROLE, record);
        let created_at = fields.timestamp("created_at", &self.created_at)?;

        Ok(Merchant {
            id: fields.number("id", &self.id)?,
            name: self.name,
            created_at,
            updated_at: fields.updated_at(self.updated_at.as_deref(), created_at)?,
        })
    }
}

/// Row of `invoices.csv`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InvoiceRow {
    pub id: String,
    pub customer_id: String,
    pub merchant_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl TableRow for InvoiceRow {
    const ROLE: DatasetRole = DatasetRole::Invoices;
    type Record = Invoice;

    fn into_record(self, record: usize) -> Result<Invoice, SalesError> {
        let fields = Fields::new(Self::ROLE, record);
        let created_at = fields.timestamp("created_at", &self.created_at)?;

        Ok(Invoice {
            id: fields.number("id", &self.id)?,
            customer_id: fields.number("customer_id", &self.customer_id)?,
            merchant_id: fields.number("merchant_id", &self.merchant_id)?,
            status: fields.status(&self.status)?,
            created_at,
            updated_at: fields.updated_at(self.updated_at.as_deref(), created_at)?,
        })
    }
}

/// Row of `invoice_items.csv`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InvoiceItemRow {
    pub id: String,
    pub item_id: String,
    pub invoice_id: String,
    pub quantity: String,
    pub unit_price: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl TableRow for InvoiceItemRow {
    const ROLE: DatasetRole = DatasetRole::InvoiceItems;
    type Record = InvoiceItem;

    fn into_record(self, record: usize) -> Result<InvoiceItem, SalesError> {
        let fields = Fields::new(Self::ROLE, record);
        let created_at = fields.timestamp("created_at", &self.created_at)?;

        Ok(InvoiceItem {
            id: fields.number("id", &self.id)?,
            item_id: fields.number("item_id", &self.item_id)?,
            invoice_id: fields.number("invoice_id", &self.invoice_id)?,
            quantity: fields.number("quantity", &self.quantity)?,
            unit_price_cents: fields.cents("unit_price", &self.unit_price)?,
            created_at,
            updated_at: fields.updated_at(self.updated_at.as_deref(), created_at)?,
        })
    }
}

/// Row of `transactions.csv`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: String,
    pub invoice_id: String,
    pub credit_card_number: String,
    #[serde(default)]
    pub credit_card_expiration_date: String,
    pub result: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl TableRow for TransactionRow {
    const ROLE: DatasetRole = DatasetRole::Transactions;
    type Record = Transaction;

    fn into_record(self, record: usize) -> Result<Transaction, SalesError> {
        let fields = Fields::new(Self::ROLE, record);
        let created_at = fields.timestamp("created_at", &self.created_at)?;

        Ok(Transaction {
            id: fields.number("id", &self.id)?,
            invoice_id: fields.number("invoice_id", &self.invoice_id)?,
            credit_card_number: self.credit_card_number,
            credit_card_expiration_date: self.credit_card_expiration_date,
            result: fields.result(&self.result)?,
            created_at,
            updated_at: fields.updated_at(self.updated_at.as_deref(), created_at)?,
        })
    }
}

/// Row of `customers.csv`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CustomerRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl TableRow for CustomerRow {
    const ROLE: DatasetRole = DatasetRole::Customers;
    type Record = Customer;

    fn into_record(self, record: usize) -> Result<Customer, SalesError> {
        let fields = Fields::new(Self::ROLE, record);
        let created_at = fields.timestamp("created_at", &self.created_at)?;

        Ok(Customer {
            id: fields.number("id", &self.id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at,
            updated_at: fields.updated_at(self.updated_at.as_deref(), created_at)?,
        })
    }
}
