///
/// Conversions between boundary values and SQLite storage.
///
/// SQLite stores five storage classes; the declared column type decides
/// which boundary type a stored value comes back as. Columns without a
/// recognizable declaration, and cells that do not convert to the declared
/// type, use the storage class of the stored value.
///

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::types::{Value as SqliteValue, ValueRef as SqliteValueRef};
use sqlbridge_core::status::INVALID_TYPE_CAST;
use sqlbridge_core::{Blob, Numeric, Result, SqlError, Type, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    pub ty: Type,
    /// Digits after the decimal point for NUMERIC/DECIMAL columns.
    pub scale: u8,
}

impl DeclaredType {
    fn plain(ty: Type) -> Self {
        Self { ty, scale: 0 }
    }
}

/// Map a declared column type such as `INTEGER` or `NUMERIC(10,2)`.
pub fn parse_decl_type(decl: &str) -> Option<DeclaredType> {
    let upper = decl.trim().to_ascii_uppercase();
    if upper.starts_with("NUMERIC") || upper.starts_with("DECIMAL") {
        return Some(DeclaredType {
            ty: Type::Numeric,
            scale: numeric_scale(&upper),
        });
    }
    let ty = if upper.contains("BOOL") {
        Type::Bool
    } else if upper.contains("INT") {
        Type::Int
    } else if upper.contains("TIMESTAMP") || upper.contains("DATE") {
        Type::DateTime
    } else if ["CHAR", "TEXT", "CLOB", "STRING"].iter().any(|k| upper.contains(k)) {
        Type::String
    } else if upper.contains("BINARY") {
        Type::Binary
    } else if upper.contains("BLOB") {
        Type::Blob
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        Type::Real
    } else {
        return None;
    };
    Some(DeclaredType::plain(ty))
}

fn numeric_scale(upper: &str) -> u8 {
    let Some(args) = upper
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(args, _)| args)
    else {
        return 0;
    };
    args.split(',')
        .nth(1)
        .and_then(|s| s.trim().parse::<u8>().ok())
        .unwrap_or(0)
}

/// Boundary value for a stored value. The declared type wins when the
/// stored value converts to it; otherwise the storage class decides, so a
/// malformed cell never fails the whole query.
pub fn from_sqlite(
    raw: SqliteValueRef<'_>,
    declared: Option<DeclaredType>,
    segment_size: usize,
) -> Value {
    let converted = declared.and_then(|d| convert_declared(raw, d, segment_size));
    converted.unwrap_or_else(|| match raw {
        SqliteValueRef::Null => Value::Null,
        SqliteValueRef::Integer(i) => Value::Int(i),
        SqliteValueRef::Real(r) => Value::Real(r),
        SqliteValueRef::Text(t) => Value::String(t.to_vec()),
        SqliteValueRef::Blob(b) => Value::Binary(b.to_vec()),
    })
}

fn convert_declared(
    raw: SqliteValueRef<'_>,
    declared: DeclaredType,
    segment_size: usize,
) -> Option<Value> {
    let scale = declared.scale;
    match (declared.ty, raw) {
        (Type::Bool, SqliteValueRef::Integer(i)) => Some(Value::Bool(i != 0)),
        (Type::Bool, SqliteValueRef::Text(t)) => parse_bool(t).map(Value::Bool),
        (Type::DateTime, SqliteValueRef::Integer(i)) => {
            u64::try_from(i).ok().map(Value::DateTime)
        }
        (Type::DateTime, SqliteValueRef::Text(t)) => parse_datetime(t).map(Value::DateTime),
        (Type::Numeric, SqliteValueRef::Integer(i)) => Numeric::new(i, 0)
            .and_then(|n| n.rescale(scale))
            .ok()
            .map(Value::Numeric),
        (Type::Numeric, SqliteValueRef::Real(r)) => {
            Numeric::from_f64(r, scale).ok().map(Value::Numeric)
        }
        (Type::Numeric, SqliteValueRef::Text(t)) => std::str::from_utf8(t)
            .ok()
            .and_then(|t| Numeric::parse(t, scale).ok())
            .map(Value::Numeric),
        (Type::Real, SqliteValueRef::Integer(i)) => Some(Value::Real(i as f64)),
        (Type::Blob, SqliteValueRef::Blob(b)) => {
            Some(Value::Blob(Blob::from_bytes(b, segment_size)))
        }
        _ => None,
    }
}

fn parse_bool(text: &[u8]) -> Option<bool> {
    let text = std::str::from_utf8(text).ok()?.trim();
    match text.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Seconds since the Unix epoch for ISO-8601 text, the form SQLite's
/// `CURRENT_TIMESTAMP` and date functions produce. Integer datetimes are
/// stored at the same resolution.
fn parse_datetime(text: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(text).ok()?.trim();
    let seconds = if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        dt.timestamp()
    } else if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        naive.and_utc().timestamp()
    } else {
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
            .timestamp()
    };
    u64::try_from(seconds).ok()
}

/// Parameter binding. Composite and streaming values have no SQLite form.
pub fn to_sqlite(value: &Value) -> Result<SqliteValue> {
    let cannot_bind = |found: Type| {
        SqlError::fault(
            INVALID_TYPE_CAST,
            format!("{found} value cannot be bound as a parameter"),
        )
    };
    Ok(match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(*b as i64),
        Value::Int(i) => SqliteValue::Integer(*i),
        Value::Real(r) => SqliteValue::Real(*r),
        Value::DateTime(t) => SqliteValue::Integer(i64::try_from(*t).map_err(|_| {
            SqlError::fault(INVALID_TYPE_CAST, format!("datetime {t} does not fit storage"))
        })?),
        Value::Numeric(n) => SqliteValue::Text(n.to_string()),
        Value::String(bytes) => SqliteValue::Text(String::from_utf8(bytes.clone()).map_err(
            |_| SqlError::fault(INVALID_TYPE_CAST, "string parameter is not valid UTF-8"),
        )?),
        Value::Binary(bytes) => SqliteValue::Blob(bytes.clone()),
        Value::Blob(blob) => SqliteValue::Blob(
            blob.contents()
                .ok_or_else(|| cannot_bind(Type::Blob))?
                .to_vec(),
        ),
        Value::Array(_) | Value::Sequence(_) | Value::Struct(_) => {
            return Err(cannot_bind(value.value_type()));
        }
    })
}
