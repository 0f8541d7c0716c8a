use std::path::PathBuf;

use thiserror::Error;

use crate::aggregator::ProductId;

/// A row that cannot be used. Skipped by the ingestion loop and charged
/// against the file's tolerance budget.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("missing field {index} ({name}): row has {len} fields")]
    MissingField {
        name: &'static str,
        index: usize,
        len: usize,
    },

    #[error("field {index} ({name}) is not an integer: `{value}`")]
    InvalidInteger {
        name: &'static str,
        index: usize,
        value: String,
    },

    #[error("product {0} is not in the product index")]
    UnknownProduct(ProductId),

    #[error("invalid encoding: {0}")]
    Encoding(String),
}

/// Errors that end the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open `{}`: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed reading `{}`: {source}", path.display())]
    Read { path: PathBuf, source: csv::Error },

    #[error("`{}` line {line}: more than {tolerance} malformed rows", path.display())]
    ToleranceExceeded {
        path: PathBuf,
        line: u64,
        tolerance: usize,
    },

    #[error("cannot write report to `{}`: {source}", path.display())]
    Write { path: PathBuf, source: csv::Error },
}
