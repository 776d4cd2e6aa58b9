//! Record builders shared by unit tests

use crate::io::csv_format::parse_datetime;
use crate::types::{
    Customer, Invoice, InvoiceItem, InvoiceStatus, Item, Merchant, Transaction, TransactionResult,
};
use chrono::{DateTime, Utc};

pub fn ts(raw: &str) -> DateTime<Utc> {
    parse_datetime(raw).unwrap()
}

pub fn merchant(id: u32, name: &str, created_at: &str) -> Merchant {
    Merchant {
        id,
        name: name.to_string(),
        created_at: ts(created_at),
        updated_at: ts(created_at),
    }
}

pub fn item(id: u32, merchant_id: u32, unit_price_cents: i64) -> Item {
    Item {
        id,
        name: format!("Item {}", id),
        description: String::new(),
        merchant_id,
        unit_price_cents,
        created_at: ts("2016-01-11 09:34:06 UTC"),
        updated_at: ts("2016-01-11 09:34:06 UTC"),
    }
}

pub fn invoice(
    id: u32,
    merchant_id: u32,
    customer_id: u32,
    status: InvoiceStatus,
    created_at: &str,
) -> Invoice {
    Invoice {
        id,
        customer_id,
        merchant_id,
        status,
        created_at: ts(created_at),
        updated_at: ts(created_at),
    }
}

pub fn invoice_item(
    id: u32,
    item_id: u32,
    invoice_id: u32,
    quantity: u32,
    unit_price_cents: i64,
) -> InvoiceItem {
    InvoiceItem {
        id,
        item_id,
        invoice_id,
        quantity,
        unit_price_cents,
        created_at: ts("2012-03-27 14:54:09 UTC"),
        updated_at: ts("2012-03-27 14:54:09 UTC"),
    }
}

pub fn transaction(id: u32, invoice_id: u32, result: TransactionResult) -> Transaction {
    Transaction {
        id,
        invoice_id,
        credit_card_number: "4068631943231473".to_string(),
        credit_card_expiration_date: "0217".to_string(),
        result,
        created_at: ts("2012-02-26 20:56:56 UTC"),
        updated_at: ts("2012-02-26 20:56:56 UTC"),
    }
}

pub fn customer(id: u32, first_name: &str, last_name: &str) -> Customer {
    Customer {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        created_at: ts("2012-03-27 14:54:09 UTC"),
        updated_at: ts("2012-03-27 14:54:09 UTC"),
    }
}
