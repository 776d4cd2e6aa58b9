//! Sales Engine CLI
//!
//! Command-line interface for loading sales data from CSV files and printing
//! merchant statistics.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- data > report.csv
//! cargo run -- --strategy sync data > report.csv
//! cargo run -- --strategy async --worker-threads 4 data > report.csv
//! cargo run -- data --top 5 --month march --date 2012-11-23
//! cargo run -- data --items fixtures/items_small.csv
//! ```
//!
//! The program loads every table found in the data directory (items,
//! merchants and invoices are required), builds the sales engine, and writes
//! a `metric,value` report to stdout. Logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing table, unreadable file, malformed record, etc.)

use sales_engine::cli;
use sales_engine::core::{SalesAnalyst, SalesEngine};
use sales_engine::io::write_report_csv;
use sales_engine::strategy;
use sales_engine::SalesError;
use std::process;
use tracing::error;

fn run(args: &cli::CliArgs) -> Result<(), SalesError> {
    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_load_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let engine = SalesEngine::load(strategy.as_ref(), &args.to_data_sources())?;
    let analyst = SalesAnalyst::new(&engine);

    let mut output = std::io::stdout().lock();
    write_report_csv(&analyst, &args.to_report_options(), &mut output)
}

fn main() {
    let args = cli::parse_args();
    cli::init_tracing(&args.log_level);

    if let Err(e) = run(&args) {
        error!(error = %e, "sales engine failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
