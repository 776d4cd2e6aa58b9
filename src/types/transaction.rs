//! Payment transactions charged against invoices

use super::invoice::{Invoice, InvoiceId};
use crate::core::traits::Record;
use crate::core::SalesEngine;
use chrono::{DateTime, Utc};
use std::fmt;

/// Transaction identifier
pub type TransactionId = u32;

/// Outcome of a card charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionResult {
    Success,
    Failed,
}

impl TransactionResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionResult::Success => "success",
            TransactionResult::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attempt to pay an invoice
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub invoice_id: InvoiceId,
    pub credit_card_number: String,

    /// Expiration as it appears on the card (e.g. `0213`); kept verbatim
    pub credit_card_expiration_date: String,

    pub result: TransactionResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_success(&self) -> bool {
        self.result == TransactionResult::Success
    }

    pub fn invoice<'e>(&self, engine: &'e SalesEngine) -> Option<&'e Invoice> {
        engine.invoices().find_by_id(self.invoice_id)
    }
}

impl Record for Transaction {
    const KIND: &'static str = "transaction";

    fn id(&self) -> u32 {
        self.id
    }

    fn invoice_id(&self) -> Option<InvoiceId> {
        Some(self.invoice_id)
    }
}
