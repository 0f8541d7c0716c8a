use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::aggregator::{DepartmentCounters, DepartmentId};
use crate::error::Error;

pub const REPORT_HEADER: [&str; 4] = [
    "department_id",
    "number_of_orders",
    "number_of_first_orders",
    "percentage",
];

#[derive(Clone, Debug, PartialEq)]
pub struct DepartmentStats {
    pub department_id: DepartmentId,
    pub order_count: u64,
    pub first_time_count: u64,
    /// `first_time_count / order_count`
    pub ratio: f64,
}

impl DepartmentStats {
    /// `None` for a department without orders.
    pub fn new(department_id: DepartmentId, counters: DepartmentCounters) -> Option<Self> {
        if counters.order_count == 0 {
            return None;
        }

        Some(Self {
            department_id,
            order_count: counters.order_count,
            first_time_count: counters.first_time_count,
            ratio: counters.first_time_count as f64 / counters.order_count as f64,
        })
    }

    /// Ratio with exactly two decimals.
    pub fn percentage(&self) -> String {
        format!("{:.2}", self.ratio)
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct OutputRow {
    pub department_id: DepartmentId,
    pub number_of_orders: u64,
    pub number_of_first_orders: u64,
    pub percentage: String,
}

impl From<&DepartmentStats> for OutputRow {
    fn from(stats: &DepartmentStats) -> Self {
        OutputRow {
            department_id: stats.department_id,
            number_of_orders: stats.order_count,
            number_of_first_orders: stats.first_time_count,
            percentage: stats.percentage(),
        }
    }
}

/// Departments with at least one order, ascending by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    departments: Vec<DepartmentStats>,
}

impl Report {
    pub fn from_counters<I>(counters: I) -> Self
    where
        I: IntoIterator<Item = (DepartmentId, DepartmentCounters)>,
    {
        let mut departments: Vec<DepartmentStats> = counters
            .into_iter()
            .filter_map(|(department, counters)| DepartmentStats::new(department, counters))
            .collect();
        departments.sort_by_key(|stats| stats.department_id);
        departments.dedup_by_key(|stats| stats.department_id);

        Self { departments }
    }

    pub fn departments(&self) -> &[DepartmentStats] {
        &self.departments
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    pub fn total_orders(&self) -> u64 {
        self.departments.iter().map(|stats| stats.order_count).sum()
    }

    pub fn rows(&self) -> impl Iterator<Item = OutputRow> + '_ {
        self.departments.iter().map(OutputRow::from)
    }

    /// Writes the header followed by one line per department.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        // Header written by hand so an empty report still has one
        let mut wrt = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wrt.write_record(REPORT_HEADER)?;
        for row in self.rows() {
            wrt.serialize(row)?;
        }
        wrt.flush()?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let write_error = |source: csv::Error| Error::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(|e| write_error(e.into()))?;
        self.write_csv(file).map_err(write_error)
    }
}
