//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over the records of one table, for use on
//! a tokio runtime. Supports batch reading so large tables are converted in
//! bounded chunks.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio (through a compat layer) for non-blocking file access
//! - the csv_format module for row layout and field parsing
//!
//! # Architecture
//!
//! ```text
//! tokio File → compat → AsyncReader<T> → batches of T::Record
//!                            ↓
//!                     csv_format module
//!                     (TableRow::into_record)
//! ```
//!
//! Unlike a best-effort reader, the first malformed row ends reading with an
//! error; dataset loading never keeps a partial table.

use crate::io::csv_format::TableRow;
use crate::types::SalesError;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::io;
use std::marker::PhantomData;
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::debug;

/// Rows converted per batch by [`AsyncReader::read_all`]
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Asynchronous CSV reader over one table
pub struct AsyncReader<T, R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    record: usize,
    row: PhantomData<fn() -> T>,
}

impl<T: TableRow, R: AsyncRead + Unpin + Send + 'static> AsyncReader<T, R> {
    /// Create a new AsyncReader over CSV text with a header row
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            record: 0,
            row: PhantomData,
        }
    }

    /// Read up to `batch_size` records
    ///
    /// Returns an empty vector once the end of the table is reached.
    ///
    /// # Errors
    ///
    /// Returns the first `ParseError` or `InvalidField` encountered; records
    /// converted earlier in the same batch are discarded.
    pub async fn read_batch(&mut self, batch_size: usize) -> Result<Vec<T::Record>, SalesError> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<T>();

        while batch.len() < batch_size {
            let Some(row) = rows.next().await else {
                break;
            };
            let record = self.record;
            self.record += 1;
            batch.push(row?.into_record(record)?);
        }

        Ok(batch)
    }

    /// Read every remaining record
    pub async fn read_all(&mut self) -> Result<Vec<T::Record>, SalesError> {
        let mut records = Vec::new();
        loop {
            let batch = self.read_batch(DEFAULT_BATCH_SIZE).await?;
            if batch.is_empty() {
                return Ok(records);
            }
            records.extend(batch);
        }
    }
}

/// Read a whole table file without blocking the runtime
pub async fn read_table_async<T: TableRow>(path: &Path) -> Result<Vec<T::Record>, SalesError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SalesError::file_not_found(path),
            _ => SalesError::from(e),
        })?;

    // csv-async speaks futures-io; tokio files need the compat wrapper
    let mut reader = AsyncReader::<T, _>::new(file.compat());
    let records = reader.read_all().await?;

    debug!(table = %T::ROLE, records = records.len(), path = %path.display(), "table read");
    Ok(records)
}
