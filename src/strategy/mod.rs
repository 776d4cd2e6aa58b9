//! Dataset loading strategy module
//!
//! This module defines the Strategy pattern for turning a set of data sources
//! into a typed [`Dataset`]. Both strategies read the same tables with the
//! same row conversion and fail the same way; they differ only in how the
//! files are read:
//!
//! - [`SyncLoadStrategy`] reads one table after another with `csv`
//! - [`AsyncLoadStrategy`] reads all tables concurrently on a tokio runtime
//!   with `csv-async`

use crate::cli::StrategyType;
use crate::types::{DataSources, Dataset, DatasetRole, SalesError};
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncLoadStrategy, LoadConfig};
pub use sync::SyncLoadStrategy;

/// Loading strategy trait for building a dataset from its sources
pub trait LoadStrategy: Send + Sync {
    /// Read and convert every configured table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required role (items, merchants, invoices) has no source
    /// - A configured source cannot be opened or read
    /// - Any row is structurally invalid or has a malformed field
    ///
    /// Nothing is returned on error; there is no partial load.
    fn load(&self, sources: &DataSources) -> Result<Dataset, SalesError>;
}

/// Fail unless every required role has a source
pub(crate) fn check_required(sources: &DataSources) -> Result<(), SalesError> {
    match DatasetRole::ALL
        .into_iter()
        .find(|role| role.is_required() && sources.get(*role).is_none())
    {
        Some(role) => Err(SalesError::MissingSource { role }),
        None => Ok(()),
    }
}

/// Source for `role`, or `None` for an optional role left unconfigured
pub(crate) fn source_for(
    sources: &DataSources,
    role: DatasetRole,
) -> Result<Option<&Path>, SalesError> {
    match sources.get(role) {
        Some(path) => Ok(Some(path)),
        None if role.is_required() => Err(SalesError::MissingSource { role }),
        None => Ok(None),
    }
}

/// Create a loading strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of loading strategy to create (Sync or Async)
/// * `config` - Optional runtime configuration (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the LoadStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<LoadConfig>,
) -> Box<dyn LoadStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncLoadStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncLoadStrategy::new(config))
        }
    }
}
