//!
//! Value Model
//!
//! `Value` is the closed sum of everything the engine can hand across the
//! boundary. Scalar extractors accept a small set of compatible variants
//! and report a type mismatch for everything else; reading any scalar out
//! of Null is the engine's SQL_NULL_VALUE fault.
//!
//! Streaming variants (Sequence, Blob) carry cursor state, so copying a
//! value is fallible: `try_clone` succeeds only when the stream can hand
//! out an independent cursor.
//!

use crate::array::Array;
use crate::blob::Blob;
use crate::error::{Result, SqlError};
use crate::numeric::Numeric;
use crate::record::Record;
use crate::sequence::Sequence;
use crate::status::SQL_NULL_VALUE;
use crate::types::Type;

#[derive(Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    /// Ticks since the epoch at the engine's datetime precision.
    DateTime(u64),
    Numeric(Numeric),
    /// Byte string, not required to be valid UTF-8.
    String(Vec<u8>),
    Binary(Vec<u8>),
    Array(Array),
    Sequence(Sequence),
    Struct(Record),
    Blob(Blob),
}

impl Value {
    pub fn string(bytes: impl AsRef<[u8]>) -> Self {
        Value::String(bytes.as_ref().to_vec())
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Binary(bytes.into())
    }

    pub fn numeric(scaled: i64, precision: u8) -> Result<Self> {
        Ok(Value::Numeric(Numeric::new(scaled, precision)?))
    }

    pub fn value_type(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Real(_) => Type::Real,
            Value::DateTime(_) => Type::DateTime,
            Value::Numeric(_) => Type::Numeric,
            Value::String(_) => Type::String,
            Value::Binary(_) => Type::Binary,
            Value::Array(_) => Type::Array,
            Value::Sequence(_) => Type::Sequence,
            Value::Struct(_) => Type::Struct,
            Value::Blob(_) => Type::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean true or a non-zero integer.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            _ => false,
        }
    }

    /// Byte length for strings and binaries, element count for arrays,
    /// column count for structs, native width for scalars.
    pub fn size(&self) -> Result<usize> {
        match self {
            Value::Null | Value::Bool(_) => Ok(0),
            Value::Int(_) | Value::Real(_) | Value::DateTime(_) | Value::Numeric(_) => Ok(8),
            Value::String(bytes) | Value::Binary(bytes) => Ok(bytes.len()),
            Value::Array(array) => Ok(array.len()),
            Value::Struct(record) => Ok(record.column_count()),
            Value::Blob(blob) => blob
                .len()
                .ok_or_else(|| SqlError::invalid_operation("streaming blob has no known size")),
            Value::Sequence(_) => Err(SqlError::invalid_operation(
                "sequence size requires counting its elements",
            )),
        }
    }

    fn mismatch(&self, requested: &'static str) -> SqlError {
        if self.is_null() {
            return SqlError::fault(SQL_NULL_VALUE, format!("cannot read {requested} from null"));
        }
        SqlError::TypeMismatch {
            requested,
            found: self.value_type(),
        }
    }

    pub fn int_value(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(*b as i64),
            Value::Real(r) => Ok(*r as i64),
            Value::DateTime(t) => i64::try_from(*t).map_err(|_| self.mismatch("int")),
            Value::Numeric(n) => Ok(n.int_part()),
            _ => Err(self.mismatch("int")),
        }
    }

    pub fn real_value(&self) -> Result<f64> {
        match self {
            Value::Real(r) => Ok(*r),
            Value::Int(i) => Ok(*i as f64),
            Value::Numeric(n) => Ok(n.to_f64()),
            _ => Err(self.mismatch("real")),
        }
    }

    pub fn datetime_value(&self) -> Result<u64> {
        match self {
            Value::DateTime(t) => Ok(*t),
            Value::Int(i) => u64::try_from(*i).map_err(|_| self.mismatch("datetime")),
            _ => Err(self.mismatch("datetime")),
        }
    }

    pub fn numeric_value(&self) -> Result<Numeric> {
        match self {
            Value::Numeric(n) => Ok(*n),
            other => Err(SqlError::invalid_operation(format!(
                "numeric_value on {} value",
                other.value_type()
            ))),
        }
    }

    /// Textual form of a scalar, numeric, binary (hex) or array value.
    pub fn render(&self) -> Result<String> {
        match self {
            Value::Null => Ok("null".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Real(r) => Ok(r.to_string()),
            Value::DateTime(t) => Ok(t.to_string()),
            Value::Numeric(n) => Ok(n.to_string()),
            Value::String(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            Value::Binary(bytes) => Ok(bytes.iter().map(|b| format!("{b:02x}")).collect()),
            Value::Array(array) => array.render(),
            Value::Sequence(_) | Value::Struct(_) | Value::Blob(_) => {
                let found = self.value_type();
                Err(SqlError::invalid_operation(format!("{found} value has no string form")))
            }
        }
    }

    /// String value holding the rendered form.
    pub fn string_value(&self) -> Result<Value> {
        match self {
            Value::String(bytes) => Ok(Value::String(bytes.clone())),
            other => Ok(Value::String(other.render()?.into_bytes())),
        }
    }

    pub fn binary_value(&self) -> Result<Value> {
        match self {
            Value::String(bytes) | Value::Binary(bytes) => Ok(Value::Binary(bytes.clone())),
            Value::Blob(blob) => blob
                .contents()
                .map(Value::binary)
                .ok_or_else(|| self.mismatch("binary")),
            _ => Err(self.mismatch("binary")),
        }
    }

    /// Address of directly addressable storage: string and binary bytes or
    /// a plain array body.
    pub fn pointer(&self) -> Result<*const u8> {
        match self {
            Value::String(bytes) | Value::Binary(bytes) => Ok(bytes.as_ptr()),
            Value::Array(array) => array.body_ptr().ok_or_else(|| self.mismatch("address")),
            _ => Err(SqlError::TypeMismatch {
                requested: "address",
                found: self.value_type(),
            }),
        }
    }

    pub fn as_array(&self) -> Result<&Array> {
        match self {
            Value::Array(array) => Ok(array),
            other => Err(wrong_kind(Type::Array, other)),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Array> {
        match self {
            Value::Array(array) => Ok(array),
            other => Err(wrong_kind(Type::Array, other)),
        }
    }

    pub fn as_sequence_mut(&mut self) -> Result<&mut Sequence> {
        match self {
            Value::Sequence(seq) => Ok(seq),
            other => Err(wrong_kind(Type::Sequence, other)),
        }
    }

    pub fn as_blob_mut(&mut self) -> Result<&mut Blob> {
        match self {
            Value::Blob(blob) => Ok(blob),
            other => Err(wrong_kind(Type::Blob, other)),
        }
    }

    pub fn as_record(&self) -> Result<&Record> {
        match self {
            Value::Struct(record) => Ok(record),
            other => Err(wrong_kind(Type::Struct, other)),
        }
    }

    pub fn try_clone(&self) -> Result<Value> {
        Ok(match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(i) => Value::Int(*i),
            Value::Real(r) => Value::Real(*r),
            Value::DateTime(t) => Value::DateTime(*t),
            Value::Numeric(n) => Value::Numeric(*n),
            Value::String(bytes) => Value::String(bytes.clone()),
            Value::Binary(bytes) => Value::Binary(bytes.clone()),
            Value::Array(array) => Value::Array(array.try_clone()?),
            Value::Sequence(seq) => Value::Sequence(seq.try_clone()?),
            Value::Struct(record) => Value::Struct(record.try_clone()?),
            Value::Blob(blob) => Value::Blob(blob.try_clone()?),
        })
    }
}

fn wrong_kind(expected: Type, found: &Value) -> SqlError {
    SqlError::invalid_operation(format!(
        "expected {expected} value, found {}",
        found.value_type()
    ))
}

/// Structural equality. Streams never compare equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Numeric(a), Value::Numeric(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.elem_type() == b.elem_type()
                    && a.len() == b.len()
                    && (0..a.len()).all(|i| match (a.get_at(i), b.get_at(i)) {
                        (Ok(x), Ok(y)) => x == y,
                        _ => false,
                    })
            }
            (Value::Struct(a), Value::Struct(b)) => {
                a.columns() == b.columns() && a.values() == b.values()
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into_bytes())
    }
}

impl From<Numeric> for Value {
    fn from(n: Numeric) -> Self {
        Value::Numeric(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
