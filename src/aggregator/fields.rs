use csv::StringRecord;

use crate::error::RowError;

pub(crate) fn integer_field(
    record: &StringRecord,
    index: usize,
    name: &'static str,
) -> Result<i64, RowError> {
    let value = record.get(index).ok_or(RowError::MissingField {
        name,
        index,
        len: record.len(),
    })?;

    value.parse().map_err(|_| RowError::InvalidInteger {
        name,
        index,
        value: value.to_string(),
    })
}
