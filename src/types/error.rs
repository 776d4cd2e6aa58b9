//! Error types for the sales engine
//!
//! This module defines all error types that can occur while loading the
//! dataset or computing statistics over it.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, malformed timestamps or prices
//! - **Lookup Errors**: An id that a join depends on is absent from its repository
//! - **Arithmetic Errors**: Averaging over an empty population, amounts too
//!   large to represent

use crate::types::DatasetRole;
use thiserror::Error;

/// Main error type for the sales engine
///
/// Loading errors abort engine construction entirely; there is no partial
/// load. Once an engine exists, only [`SalesError::NotFound`],
/// [`SalesError::DivisionByZero`] and [`SalesError::Overflow`] can come out
/// of a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SalesError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading a data source
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// The CSV layer could not read a row
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A mandatory field of a record could not be parsed
    ///
    /// `record` is the zero-based position of the row within its table,
    /// header excluded.
    #[error("Invalid {field} '{value}' in {table} record {record}")]
    InvalidField {
        /// Table the record belongs to
        table: DatasetRole,
        /// Zero-based record index
        record: usize,
        /// Name of the offending column
        field: &'static str,
        /// Raw value as it appeared in the source
        value: String,
    },

    /// A required dataset role has no configured source
    #[error("No data source configured for required role '{role}'")]
    MissingSource {
        /// The role without a source
        role: DatasetRole,
    },

    /// An entity referenced by id does not exist in its repository
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity that was looked up
        entity: &'static str,
        /// The id that was not found
        id: u32,
    },

    /// An average or deviation was requested over an empty population
    #[error("Division by zero in {operation}")]
    DivisionByZero {
        /// Statistic that attempted the division
        operation: &'static str,
    },

    /// An amount or intermediate statistic left the representable range
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Computation that overflowed
        operation: &'static str,
    },
}

impl From<std::io::Error> for SalesError {
    fn from(error: std::io::Error) -> Self {
        SalesError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for SalesError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        SalesError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<csv_async::Error> for SalesError {
    fn from(error: csv_async::Error) -> Self {
        SalesError::ParseError {
            line: None,
            message: error.to_string(),
        }
    }
}

impl SalesError {
    /// Create a NotFound error
    pub fn not_found(entity: &'static str, id: u32) -> Self {
        SalesError::NotFound { entity, id }
    }

    /// Create a DivisionByZero error
    pub fn division_by_zero(operation: &'static str) -> Self {
        SalesError::DivisionByZero { operation }
    }

    /// Create an Overflow error
    pub fn overflow(operation: &'static str) -> Self {
        SalesError::Overflow { operation }
    }

    /// Create an InvalidField error
    pub fn invalid_field(
        table: DatasetRole,
        record: usize,
        field: &'static str,
        value: &str,
    ) -> Self {
        SalesError::InvalidField {
            table,
            record,
            field,
            value: value.to_string(),
        }
    }

    /// Create a FileNotFound error
    pub fn file_not_found(path: &std::path::Path) -> Self {
        SalesError::FileNotFound {
            path: path.display().to_string(),
        }
    }
}
