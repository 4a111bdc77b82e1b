//!
//! Type Tags
//!
//! Discriminant shared by every value crossing the boundary. The integer
//! representation is the engine's own numbering and is part of the C ABI.
//!
//! Plain element types (Bool, Int, Real, DateTime) have a fixed native
//! width, which lets arrays of them keep one contiguous body that callers
//! can bulk-replace.
//!

use std::fmt;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Null = 0,
    Bool = 1,
    Int = 8,
    Real = 11,
    DateTime = 12,
    Numeric = 13,
    String = 15,
    Binary = 16,
    Array = 18,
    Struct = 19,
    Blob = 20,
    Sequence = 23,
}

impl Type {
    pub const ALL: [Type; 12] = [
        Type::Null,
        Type::Bool,
        Type::Int,
        Type::Real,
        Type::DateTime,
        Type::Numeric,
        Type::String,
        Type::Binary,
        Type::Array,
        Type::Struct,
        Type::Blob,
        Type::Sequence,
    ];

    pub fn from_raw(raw: i32) -> Option<Type> {
        Type::ALL.into_iter().find(|t| *t as i32 == raw)
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Width in bytes of one element when this type is stored in a plain
    /// array body, or `None` when arrays of it hold boxed values.
    pub fn plain_width(self) -> Option<usize> {
        match self {
            Type::Bool => Some(1),
            Type::Int | Type::Real | Type::DateTime => Some(8),
            _ => None,
        }
    }

    pub fn is_plain(self) -> bool {
        self.plain_width().is_some()
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Real => "real",
            Type::DateTime => "datetime",
            Type::Numeric => "numeric",
            Type::String => "string",
            Type::Binary => "binary",
            Type::Array => "array",
            Type::Struct => "struct",
            Type::Blob => "blob",
            Type::Sequence => "sequence",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_tags_round_trip() {
        for ty in Type::ALL {
            assert_eq!(Type::from_raw(ty.as_raw()), Some(ty));
        }
        assert_eq!(Type::Int.as_raw(), 8);
        assert_eq!(Type::Sequence.as_raw(), 23);
        assert_eq!(Type::from_raw(2), None);
        assert_eq!(Type::from_raw(-1), None);
    }

    #[test]
    fn test_plain_types() {
        assert_eq!(Type::Int.plain_width(), Some(8));
        assert_eq!(Type::Bool.plain_width(), Some(1));
        assert!(!Type::String.is_plain());
        assert!(!Type::Numeric.is_plain());
    }
}
