pub mod aggregator;
pub mod config;
pub mod error;
pub mod ingest;
pub mod reader;

use log::info;

pub use crate::aggregator::{Aggregator, ProductIndex, Report};
pub use crate::config::Config;
pub use crate::error::{Error, RowError};

/// Joins the order log to the product catalog and totals orders per
/// department.
///
/// The product file is read completely before the first order row. The
/// report is written to `config.output`, if set, only after both files have
/// been read, so a failed run leaves no output behind.
pub fn summarize(config: &Config) -> Result<Report, Error> {
    let options = config.read_options();

    let mut index = ProductIndex::new();
    ingest::ingest(&config.products, &options, |record| {
        index.record_product(record)
    })?;
    info!(
        "Indexed {} products in {} departments",
        index.len(),
        index.departments().len()
    );

    let mut aggregator = Aggregator::new(index);
    ingest::ingest(&config.orders, &options, |record| {
        aggregator.record_order(record)
    })?;

    let report = aggregator.into_report();
    info!(
        "{} orders across {} departments",
        report.total_orders(),
        report.len()
    );

    if let Some(output) = &config.output {
        report.save(output)?;
        info!("Report written to {}", output.display());
    }

    Ok(report)
}
