pub mod aggregator;
pub mod index;
pub mod report;

mod fields;


pub use aggregator::{Aggregator, DepartmentCounters, FIRST_ORDER};
pub use index::ProductIndex;
pub use report::{DepartmentStats, OutputRow, Report, REPORT_HEADER};

pub type ProductId = i64;
pub type DepartmentId = i64;
