use std::collections::{BTreeSet, HashMap};

use csv::StringRecord;
use log::debug;

use crate::aggregator::fields::integer_field;
use crate::aggregator::{DepartmentId, ProductId};
use crate::error::RowError;

const PRODUCT_ID_FIELD: usize = 0;
const DEPARTMENT_ID_FIELD: usize = 3;

/// Product to department lookup built from the product catalog.
#[derive(Clone, Debug, Default)]
pub struct ProductIndex {
    departments: HashMap<ProductId, DepartmentId>,
}

impl ProductIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `product` to `department`, returning the department it replaced.
    pub fn insert(&mut self, product: ProductId, department: DepartmentId) -> Option<DepartmentId> {
        let previous = self.departments.insert(product, department);
        if let Some(previous) = previous {
            debug!(
                "Product {} moved from department {} to {}",
                product, previous, department
            );
        }
        previous
    }

    pub fn record_product(&mut self, record: &StringRecord) -> Result<(), RowError> {
        let product = integer_field(record, PRODUCT_ID_FIELD, "product_id")?;
        let department = integer_field(record, DEPARTMENT_ID_FIELD, "department_id")?;

        self.insert(product, department);
        Ok(())
    }

    pub fn department_of(&self, product: ProductId) -> Option<DepartmentId> {
        self.departments.get(&product).copied()
    }

    /// Distinct departments, ascending.
    pub fn departments(&self) -> BTreeSet<DepartmentId> {
        self.departments.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }
}
