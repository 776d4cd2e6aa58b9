//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over the records of one table. Delegates
//! row layout and field parsing to the csv_format module.
//!
//! # Design
//!
//! `SyncReader<T>` wraps a `csv::Reader` and deserializes one [`TableRow`]
//! at a time, converting it to its domain record. It is generic over the row
//! shape, so the same reader serves all six tables:
//!
//! ```no_run
//! use sales_engine::io::csv_format::ItemRow;
//! use sales_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::<ItemRow>::open(Path::new("data/items.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(item) => println!("{} costs {}", item.name, item.unit_price()),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Opening a missing file fails in `open()` with `FileNotFound`
//! - Structural CSV errors are yielded as `ParseError` with the line number
//! - Field errors are yielded as `InvalidField` with the record index
//!
//! [`read_table`] collects the iterator and stops at the first error, which
//! is what dataset loading wants: no partial tables.

use crate::io::csv_format::TableRow;
use crate::types::SalesError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{self, Read};
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

/// Synchronous CSV reader over one table
#[derive(Debug)]
pub struct SyncReader<T, R = File> {
    reader: csv::Reader<R>,
    record: usize,
    row: PhantomData<fn() -> T>,
}

impl<T: TableRow> SyncReader<T, File> {
    /// Open a table file for streaming iteration
    ///
    /// # Errors
    ///
    /// * `FileNotFound` - Nothing exists at `path`
    /// * `IoError` - The file exists but cannot be opened
    pub fn open(path: &Path) -> Result<Self, SalesError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SalesError::file_not_found(path),
            _ => SalesError::from(e),
        })?;

        Ok(Self::from_reader(file))
    }
}

impl<T: TableRow, R: Read> SyncReader<T, R> {
    /// Wrap any reader producing CSV text with a header row
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (optional trailing columns)
    /// - Use an 8KB buffer for efficient I/O
    pub fn from_reader(reader: R) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(reader);

        Self {
            reader,
            record: 0,
            row: PhantomData,
        }
    }
}

impl<T: TableRow, R: Read> Iterator for SyncReader<T, R> {
    type Item = Result<T::Record, SalesError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.reader.deserialize::<T>().next()?;
        let record = self.record;
        self.record += 1;

        Some(
            row.map_err(SalesError::from)
                .and_then(|row| row.into_record(record)),
        )
    }
}

/// Read a whole table, failing on the first bad row
pub fn read_table<T: TableRow>(path: &Path) -> Result<Vec<T::Record>, SalesError> {
    let records = SyncReader::<T>::open(path)?.collect::<Result<Vec<_>, _>>()?;
    debug!(table = %T::ROLE, records = records.len(), path = %path.display(), "table read");
    Ok(records)
}
