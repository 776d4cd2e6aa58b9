//! Core traits shared by every entity kind
//!
//! [`Record`] is what lets a single generic [`Repository`](crate::core::Repository)
//! serve all six tables: it exposes the keys the repository indexes on.

use crate::types::{InvoiceId, MerchantId};

/// An entity that can be stored in a repository
///
/// The optional keys default to `None`; a repository only indexes the keys
/// its entity kind actually carries.
pub trait Record {
    /// Human-readable entity kind, used in not-found errors and logs
    const KIND: &'static str;

    /// Unique id within the entity's own table
    fn id(&self) -> u32;

    /// Name used by `find_by_name` / `find_all_by_name`
    fn name(&self) -> Option<&str> {
        None
    }

    /// Merchant this entity belongs to
    fn merchant_id(&self) -> Option<MerchantId> {
        None
    }

    /// Invoice this entity belongs to
    fn invoice_id(&self) -> Option<InvoiceId> {
        None
    }
}
