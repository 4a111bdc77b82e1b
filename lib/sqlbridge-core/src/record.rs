///
/// Records: one row of a result set, as an ordered set of typed columns.
///

use std::sync::Arc;

use crate::error::{Result, SqlError};
use crate::types::Type;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: Type,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug)]
pub struct Record {
    columns: Arc<[Column]>,
    values: Vec<Value>,
}

impl Record {
    /// Rows of one result set share the column list.
    pub fn new(columns: Arc<[Column]>, values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(SqlError::runtime(format!(
                "record has {} values for {} columns",
                values.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, values })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| column_out_of_range(index, self.columns.len()))
    }

    /// Fresh copy of one column's value.
    pub fn get(&self, index: usize) -> Result<Value> {
        self.values
            .get(index)
            .ok_or_else(|| column_out_of_range(index, self.values.len()))?
            .try_clone()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn try_clone(&self) -> Result<Record> {
        Ok(Record {
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(Value::try_clone)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

fn column_out_of_range(index: usize, count: usize) -> SqlError {
    SqlError::runtime(format!("column {index} out of range for {count} columns"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RUNTIME_ERROR;

    fn sample() -> Record {
        let columns: Arc<[Column]> =
            vec![Column::new("id", Type::Int), Column::new("name", Type::String)].into();
        Record::new(columns, vec![Value::Int(1), Value::string("one")]).unwrap()
    }

    #[test]
    fn test_get_column_copies_value() {
        let record = sample();
        assert_eq!(record.column_count(), 2);
        assert_eq!(record.get(0).unwrap().int_value().unwrap(), 1);
        assert_eq!(record.column(1).unwrap().name, "name");
        assert_eq!(record.column(1).unwrap().ty, Type::String);
    }

    #[test]
    fn test_out_of_range_is_generic_fault() {
        let record = sample();
        assert_eq!(record.get(2).unwrap_err().status(), RUNTIME_ERROR);
        assert_eq!(record.column(5).unwrap_err().status(), RUNTIME_ERROR);
    }

    #[test]
    fn test_arity_checked() {
        let columns: Arc<[Column]> = vec![Column::new("id", Type::Int)].into();
        assert!(Record::new(columns, vec![]).is_err());
    }
}
