//! Dataset roles, input designators and the loaded dataset
//!
//! A dataset is six related tables. Each table plays a [`DatasetRole`];
//! [`DataSources`] maps roles to the files that hold them, and [`Dataset`]
//! carries the typed records once every table has been read.

use super::{Customer, Invoice, InvoiceItem, Item, Merchant, Transaction};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Role a table plays in the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetRole {
    Items,
    Merchants,
    Invoices,
    InvoiceItems,
    Transactions,
    Customers,
}

impl DatasetRole {
    /// Every role, in load order
    pub const ALL: [DatasetRole; 6] = [
        DatasetRole::Items,
        DatasetRole::Merchants,
        DatasetRole::Invoices,
        DatasetRole::InvoiceItems,
        DatasetRole::Transactions,
        DatasetRole::Customers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetRole::Items => "items",
            DatasetRole::Merchants => "merchants",
            DatasetRole::Invoices => "invoices",
            DatasetRole::InvoiceItems => "invoice_items",
            DatasetRole::Transactions => "transactions",
            DatasetRole::Customers => "customers",
        }
    }

    /// File name used when sources are resolved from a directory
    pub fn default_file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }

    /// Whether construction fails when this role has no source
    ///
    /// Items, merchants and invoices are required. The remaining roles load
    /// as empty tables when they are not configured.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            DatasetRole::Items | DatasetRole::Merchants | DatasetRole::Invoices
        )
    }
}

impl fmt::Display for DatasetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from dataset role to the file holding that table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSources {
    paths: BTreeMap<DatasetRole, PathBuf>,
}

impl DataSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every role to its default file name inside `dir`
    ///
    /// Optional roles whose default file does not exist are left out, so a
    /// directory holding only the required tables still loads.
    pub fn from_dir(dir: &Path) -> Self {
        let mut sources = Self::new();
        for role in DatasetRole::ALL {
            let path = dir.join(role.default_file_name());
            if role.is_required() || path.exists() {
                sources.paths.insert(role, path);
            }
        }
        sources
    }

    /// Set (or replace) the source for a role
    pub fn with(mut self, role: DatasetRole, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(role, path.into());
        self
    }

    pub fn insert(&mut self, role: DatasetRole, path: impl Into<PathBuf>) {
        self.paths.insert(role, path.into());
    }

    pub fn get(&self, role: DatasetRole) -> Option<&Path> {
        self.paths.get(&role).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DatasetRole, &Path)> {
        self.paths.iter().map(|(role, path)| (*role, path.as_path()))
    }
}

/// Typed records for every table, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub items: Vec<Item>,
    pub merchants: Vec<Merchant>,
    pub invoices: Vec<Invoice>,
    pub invoice_items: Vec<InvoiceItem>,
    pub transactions: Vec<Transaction>,
    pub customers: Vec<Customer>,
}
