use std::collections::BTreeMap;

use csv::StringRecord;

use crate::aggregator::fields::integer_field;
use crate::aggregator::{DepartmentId, ProductId, ProductIndex, Report};
use crate::error::RowError;

const PRODUCT_ID_FIELD: usize = 1;
const REORDERED_FIELD: usize = 3;

/// Reorder flag marking an order line as the customer's first purchase of
/// the product. Any other value means the product was reordered.
pub const FIRST_ORDER: i64 = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepartmentCounters {
    pub order_count: u64,
    pub first_time_count: u64,
}

/// Per-department order counts, joined through a completed [`ProductIndex`].
#[derive(Debug)]
pub struct Aggregator {
    index: ProductIndex,
    counters: BTreeMap<DepartmentId, DepartmentCounters>,
}

impl Aggregator {
    pub fn new(index: ProductIndex) -> Self {
        let counters = index
            .departments()
            .into_iter()
            .map(|department| (department, DepartmentCounters::default()))
            .collect();

        Self { index, counters }
    }

    pub fn counters(&self) -> &BTreeMap<DepartmentId, DepartmentCounters> {
        &self.counters
    }

    pub fn record_order(&mut self, record: &StringRecord) -> Result<(), RowError> {
        let product = integer_field(record, PRODUCT_ID_FIELD, "product_id")?;
        let reordered = integer_field(record, REORDERED_FIELD, "reordered")?;

        self.record(product, reordered)
    }

    pub fn record(&mut self, product: ProductId, reordered: i64) -> Result<(), RowError> {
        let department = self
            .index
            .department_of(product)
            .ok_or(RowError::UnknownProduct(product))?;

        // Seeded from the index in `new`
        let counters = self.counters.entry(department).or_default();
        counters.order_count += 1;
        if reordered == FIRST_ORDER {
            counters.first_time_count += 1;
        }

        Ok(())
    }

    pub fn into_report(self) -> Report {
        Report::from_counters(self.counters)
    }
}
