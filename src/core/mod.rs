//! Core business logic module
//!
//! This module contains the in-memory model and the statistics built on it:
//! - `traits` - The `Record` abstraction every entity implements
//! - `repository` - Generic indexed repository, one per entity kind
//! - `engine` - Composition root owning all repositories and their joins
//! - `stats` - Decimal mean / deviation / percentage helpers
//! - `cache` - Compute-once query cache
//! - `analyst` - Business-intelligence queries over an engine

pub mod analyst;
pub mod cache;
pub mod engine;
pub mod repository;
pub mod stats;
pub mod traits;

#[cfg(test)]
pub(crate) mod fixtures;

pub use analyst::{weekday_name, SalesAnalyst};
pub use cache::{Query, QueryCache};
pub use engine::{MerchantJoin, SalesEngine};
pub use repository::Repository;
pub use traits::Record;
