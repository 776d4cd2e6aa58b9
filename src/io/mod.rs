//! I/O module
//!
//! Handles CSV parsing and report output.
//!
//! # Components
//!
//! - `csv_format` - Row layouts per table and row → record conversion
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface
//! - `report` - `metric,value` summary report writer

pub mod async_reader;
pub mod csv_format;
pub mod report;
pub mod sync_reader;

pub use async_reader::{read_table_async, AsyncReader};
pub use csv_format::{parse_datetime, TableRow};
pub use report::{write_report_csv, ReportOptions};
pub use sync_reader::{read_table, SyncReader};
