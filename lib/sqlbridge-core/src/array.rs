//!
//! Arrays
//!
//! Fixed-length homogeneous arrays. Arrays of plain element types keep one
//! contiguous native body that can be exposed by pointer and replaced in
//! bulk; every other element type is stored as boxed values.
//!

use crate::error::{Result, SqlError};
use crate::status::SQL_INVALID_OPERAND;
use crate::types::Type;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum PlainBody {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Real(Vec<f64>),
    DateTime(Vec<u64>),
}

impl PlainBody {
    fn zeroed(elem_type: Type, len: usize) -> Option<Self> {
        match elem_type {
            Type::Bool => Some(PlainBody::Bool(vec![false; len])),
            Type::Int => Some(PlainBody::Int(vec![0; len])),
            Type::Real => Some(PlainBody::Real(vec![0.0; len])),
            Type::DateTime => Some(PlainBody::DateTime(vec![0; len])),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        match self {
            PlainBody::Bool(v) => v.len(),
            PlainBody::Int(v) => v.len(),
            PlainBody::Real(v) => v.len(),
            PlainBody::DateTime(v) => v.len(),
        }
    }

    fn get(&self, index: usize) -> Option<Value> {
        match self {
            PlainBody::Bool(v) => v.get(index).map(|b| Value::Bool(*b)),
            PlainBody::Int(v) => v.get(index).map(|i| Value::Int(*i)),
            PlainBody::Real(v) => v.get(index).map(|r| Value::Real(*r)),
            PlainBody::DateTime(v) => v.get(index).map(|t| Value::DateTime(*t)),
        }
    }

    fn as_ptr(&self) -> *const u8 {
        match self {
            PlainBody::Bool(v) => v.as_ptr().cast(),
            PlainBody::Int(v) => v.as_ptr().cast(),
            PlainBody::Real(v) => v.as_ptr().cast(),
            PlainBody::DateTime(v) => v.as_ptr().cast(),
        }
    }

    fn decode(elem_type: Type, bytes: &[u8]) -> Option<Self> {
        fn words(bytes: &[u8]) -> impl Iterator<Item = [u8; 8]> + '_ {
            bytes.chunks_exact(8).map(|c| {
                let mut word = [0u8; 8];
                word.copy_from_slice(c);
                word
            })
        }
        match elem_type {
            Type::Bool => Some(PlainBody::Bool(bytes.iter().map(|b| *b != 0).collect())),
            Type::Int => Some(PlainBody::Int(words(bytes).map(i64::from_ne_bytes).collect())),
            Type::Real => Some(PlainBody::Real(words(bytes).map(f64::from_ne_bytes).collect())),
            Type::DateTime => Some(PlainBody::DateTime(
                words(bytes).map(u64::from_ne_bytes).collect(),
            )),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum Body {
    Plain(PlainBody),
    Boxed(Vec<Value>),
}

#[derive(Debug)]
pub struct Array {
    elem_type: Type,
    body: Body,
}

impl Array {
    /// Array of `len` elements. Plain bodies start zeroed, boxed ones hold
    /// Null until assigned.
    pub fn new(elem_type: Type, len: usize) -> Result<Self> {
        if elem_type == Type::Null {
            return Err(SqlError::invalid_operation("array element type cannot be null"));
        }
        let body = match PlainBody::zeroed(elem_type, len) {
            Some(plain) => Body::Plain(plain),
            None => Body::Boxed((0..len).map(|_| Value::Null).collect()),
        };
        Ok(Self { elem_type, body })
    }

    pub fn from_values(elem_type: Type, values: Vec<Value>) -> Result<Self> {
        let mut array = Array::new(elem_type, values.len())?;
        for (i, value) in values.into_iter().enumerate() {
            array.set_at(i, value)?;
        }
        Ok(array)
    }

    pub fn elem_type(&self) -> Type {
        self.elem_type
    }

    pub fn len(&self) -> usize {
        match &self.body {
            Body::Plain(plain) => plain.len(),
            Body::Boxed(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.body, Body::Plain(_))
    }

    /// Copy of the element at `index`.
    pub fn get_at(&self, index: usize) -> Result<Value> {
        let out_of_range = || SqlError::OutOfRange {
            index,
            len: self.len(),
        };
        match &self.body {
            Body::Plain(plain) => plain.get(index).ok_or_else(out_of_range),
            Body::Boxed(values) => values.get(index).ok_or_else(out_of_range)?.try_clone(),
        }
    }

    pub fn set_at(&mut self, index: usize, value: Value) -> Result<()> {
        let found = value.value_type();
        if found != self.elem_type {
            return Err(SqlError::InvalidTypeCast {
                expected: self.elem_type,
                found,
            });
        }
        let len = self.len();
        if index >= len {
            return Err(SqlError::OutOfRange { index, len });
        }
        match (&mut self.body, value) {
            (Body::Plain(PlainBody::Bool(v)), Value::Bool(b)) => v[index] = b,
            (Body::Plain(PlainBody::Int(v)), Value::Int(i)) => v[index] = i,
            (Body::Plain(PlainBody::Real(v)), Value::Real(r)) => v[index] = r,
            (Body::Plain(PlainBody::DateTime(v)), Value::DateTime(t)) => v[index] = t,
            (Body::Boxed(values), value) => values[index] = value,
            (Body::Plain(_), _) => {
                return Err(SqlError::runtime("plain array body does not match element type"));
            }
        }
        Ok(())
    }

    /// Replace a plain body with `count` elements in native layout.
    pub fn set_body(&mut self, bytes: &[u8], count: usize) -> Result<()> {
        let Body::Plain(_) = self.body else {
            return Err(SqlError::invalid_operation(
                "set_body requires an array of plain elements",
            ));
        };
        let len = self.len();
        let width = self.elem_type.plain_width().unwrap_or(1);
        if count != len || bytes.len() != count * width {
            return Err(SqlError::fault(
                SQL_INVALID_OPERAND,
                format!("array body of {count} elements does not match array length {len}"),
            ));
        }
        if let Some(plain) = PlainBody::decode(self.elem_type, bytes) {
            self.body = Body::Plain(plain);
        }
        Ok(())
    }

    pub fn body_ptr(&self) -> Option<*const u8> {
        match &self.body {
            Body::Plain(plain) => Some(plain.as_ptr()),
            Body::Boxed(_) => None,
        }
    }

    pub fn plain_body(&self) -> Option<&PlainBody> {
        match &self.body {
            Body::Plain(plain) => Some(plain),
            Body::Boxed(_) => None,
        }
    }

    pub fn try_clone(&self) -> Result<Array> {
        let body = match &self.body {
            Body::Plain(plain) => Body::Plain(plain.clone()),
            Body::Boxed(values) => Body::Boxed(
                values
                    .iter()
                    .map(Value::try_clone)
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(Array {
            elem_type: self.elem_type,
            body,
        })
    }

    pub fn render(&self) -> Result<String> {
        let mut parts = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            parts.push(self.get_at(i)?.render()?);
        }
        Ok(format!("[{}]", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{INDEX_OUT_OF_BOUNDS, INVALID_OPERATION, INVALID_TYPE_CAST};

    #[test]
    fn test_plain_array_elements_have_elem_type() {
        let array = Array::new(Type::Int, 4).unwrap();
        assert!(array.is_plain());
        for i in 0..4 {
            let v = array.get_at(i).unwrap();
            assert_eq!(v.value_type(), Type::Int);
        }
        let err = array.get_at(4).unwrap_err();
        assert_eq!(err.status(), INDEX_OUT_OF_BOUNDS);
    }

    #[test]
    fn test_set_at_checks_type_before_index() {
        let mut array = Array::new(Type::Int, 2).unwrap();
        let err = array.set_at(0, Value::string("x")).unwrap_err();
        assert_eq!(err.status(), INVALID_TYPE_CAST);
        let err = array.set_at(9, Value::string("x")).unwrap_err();
        assert_eq!(err.status(), INVALID_TYPE_CAST);
        let err = array.set_at(9, Value::Int(1)).unwrap_err();
        assert_eq!(err.status(), INDEX_OUT_OF_BOUNDS);

        array.set_at(1, Value::Int(42)).unwrap();
        assert_eq!(array.get_at(1).unwrap().int_value().unwrap(), 42);
    }

    #[test]
    fn test_boxed_array() {
        let mut array = Array::new(Type::String, 2).unwrap();
        assert!(!array.is_plain());
        assert!(array.body_ptr().is_none());
        array.set_at(0, Value::string("a")).unwrap();
        assert_eq!(array.get_at(0).unwrap(), Value::string("a"));
        assert!(array.get_at(1).unwrap().is_null());
        let err = array.set_body(&[], 2).unwrap_err();
        assert_eq!(err.status(), INVALID_OPERATION);
    }

    #[test]
    fn test_set_body_bulk_replaces() {
        let mut array = Array::new(Type::Int, 3).unwrap();
        let bytes: Vec<u8> = [7i64, -8, 9].iter().flat_map(|i| i.to_ne_bytes()).collect();
        array.set_body(&bytes, 3).unwrap();
        assert_eq!(array.plain_body(), Some(&PlainBody::Int(vec![7, -8, 9])));
        assert!(array.set_body(&bytes[..8], 1).is_err());
    }

    #[test]
    fn test_null_elem_type_rejected() {
        assert!(Array::new(Type::Null, 1).is_err());
    }

    #[test]
    fn test_render() {
        let array =
            Array::from_values(Type::Real, vec![Value::Real(1.5), Value::Real(2.0)]).unwrap();
        assert_eq!(array.render().unwrap(), "[1.5, 2]");
    }
}
