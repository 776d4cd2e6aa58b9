use crate::io::report::ReportOptions;
use crate::strategy::LoadConfig;
use crate::types::{DataSources, DatasetRole};
use chrono::{Month, NaiveDate};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Load sales data and report business-intelligence statistics
#[derive(Parser, Debug)]
#[command(name = "sales-engine")]
#[command(about = "Load sales CSV data and report merchant statistics", long_about = None)]
pub struct CliArgs {
    /// Directory holding the default table files (items.csv, merchants.csv, ...)
    #[arg(value_name = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Items table, overriding DATA_DIR/items.csv
    #[arg(long, value_name = "FILE")]
    pub items: Option<PathBuf>,

    /// Merchants table, overriding DATA_DIR/merchants.csv
    #[arg(long, value_name = "FILE")]
    pub merchants: Option<PathBuf>,

    /// Invoices table, overriding DATA_DIR/invoices.csv
    #[arg(long, value_name = "FILE")]
    pub invoices: Option<PathBuf>,

    /// Invoice items table, overriding DATA_DIR/invoice_items.csv
    #[arg(long = "invoice-items", value_name = "FILE")]
    pub invoice_items: Option<PathBuf>,

    /// Transactions table, overriding DATA_DIR/transactions.csv
    #[arg(long, value_name = "FILE")]
    pub transactions: Option<PathBuf>,

    /// Customers table, overriding DATA_DIR/customers.csv
    #[arg(long, value_name = "FILE")]
    pub customers: Option<PathBuf>,

    /// Loading strategy to use for reading the tables
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Loading strategy: 'sync' reads tables in turn, 'async' reads them concurrently"
    )]
    pub strategy: StrategyType,

    /// Number of runtime worker threads (async mode only)
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "Number of tokio worker threads for async loading (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,

    /// Number of merchants listed as top revenue earners
    #[arg(long, value_name = "N", default_value_t = crate::core::analyst::DEFAULT_TOP_EARNERS)]
    pub top: usize,

    /// Report single-item merchants registered in this month
    #[arg(long, value_name = "MONTH", value_parser = parse_month)]
    pub month: Option<Month>,

    /// Report total revenue for this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,
}

/// Available loading strategies
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Accept a month name, a three-letter abbreviation, or a number 1–12
fn parse_month(raw: &str) -> Result<Month, String> {
    if let Ok(number) = raw.parse::<u8>() {
        return Month::try_from(number).map_err(|_| format!("no month numbered {}", number));
    }
    raw.parse::<Month>()
        .map_err(|_| format!("'{}' is not a month", raw))
}

impl CliArgs {
    /// Resolve the data directory and per-table overrides into sources
    pub fn to_data_sources(&self) -> DataSources {
        let overrides = [
            (DatasetRole::Items, &self.items),
            (DatasetRole::Merchants, &self.merchants),
            (DatasetRole::Invoices, &self.invoices),
            (DatasetRole::InvoiceItems, &self.invoice_items),
            (DatasetRole::Transactions, &self.transactions),
            (DatasetRole::Customers, &self.customers),
        ];

        let mut sources = DataSources::from_dir(&self.data_dir);
        for (role, path) in overrides {
            if let Some(path) = path {
                sources.insert(role, path.clone());
            }
        }
        sources
    }

    /// Create a LoadConfig from CLI arguments, falling back to defaults
    pub fn to_load_config(&self) -> LoadConfig {
        match self.worker_threads {
            Some(worker_threads) => LoadConfig::new(worker_threads),
            None => LoadConfig::default(),
        }
    }

    pub fn to_report_options(&self) -> ReportOptions {
        ReportOptions {
            top: self.top,
            month: self.month,
            date: self.date,
        }
    }
}
