use std::path::PathBuf;

use crate::ingest::{ReadOptions, DEFAULT_TOLERANCE};
use crate::reader::HeaderMode;

/// Inputs and knobs for one [`summarize`](crate::summarize) run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub products: PathBuf,
    pub orders: PathBuf,
    /// Where the report goes; `None` keeps it in memory only.
    pub output: Option<PathBuf>,
    /// Malformed rows tolerated in each input file.
    pub tolerance: usize,
    pub header: HeaderMode,
}

impl Config {
    pub fn new(products: impl Into<PathBuf>, orders: impl Into<PathBuf>) -> Self {
        Self {
            products: products.into(),
            orders: orders.into(),
            output: None,
            tolerance: DEFAULT_TOLERANCE,
            header: HeaderMode::Auto,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_tolerance(mut self, tolerance: usize) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_header(mut self, header: HeaderMode) -> Self {
        self.header = header;
        self
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            header: self.header,
            tolerance: self.tolerance,
        }
    }
}
