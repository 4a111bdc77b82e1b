//!
//! Fixed-point Numeric and DateTime helpers
//!
//! A numeric is a scaled 64-bit integer plus a decimal precision:
//! `(12345, 2)` denotes `123.45`. Precision is bounded by
//! `MAX_PRECISION`, the widest power of ten that still fits the
//! unsigned 64-bit scale factor.
//!

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{Result, SqlError};
use crate::status::{SQL_INVALID_OPERAND, SQL_SYSTEM_ERROR};

pub const MAX_PRECISION: u8 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Numeric {
    scaled: i64,
    precision: u8,
}

fn scale_factor(precision: u8) -> i128 {
    10i128.pow(precision as u32)
}

impl Numeric {
    pub fn new(scaled: i64, precision: u8) -> Result<Self> {
        if precision > MAX_PRECISION {
            return Err(SqlError::fault(
                SQL_INVALID_OPERAND,
                format!("numeric precision {precision} exceeds {MAX_PRECISION}"),
            ));
        }
        Ok(Self { scaled, precision })
    }

    /// Raw scaled integer, the value as stored by the engine.
    pub fn scaled(&self) -> i64 {
        self.scaled
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn int_part(&self) -> i64 {
        (self.scaled as i128 / scale_factor(self.precision)) as i64
    }

    pub fn fract_part(&self) -> u64 {
        (self.scaled as i128 % scale_factor(self.precision)).unsigned_abs() as u64
    }

    pub fn to_f64(&self) -> f64 {
        self.scaled as f64 / scale_factor(self.precision) as f64
    }

    /// Same value at another precision. Extra digits are truncated toward
    /// zero when narrowing; widening fails if the scaled value overflows.
    pub fn rescale(&self, precision: u8) -> Result<Self> {
        let target = Numeric::new(0, precision)?;
        let scaled = if precision >= self.precision {
            (self.scaled as i128) * scale_factor(precision - self.precision)
        } else {
            (self.scaled as i128) / scale_factor(self.precision - precision)
        };
        let scaled = i64::try_from(scaled).map_err(|_| overflow(precision))?;
        Ok(Self { scaled, ..target })
    }

    /// Parse decimal text such as `-12.5` at the given precision. Digits
    /// beyond the precision are rounded half away from zero.
    pub fn parse(text: &str, precision: u8) -> Result<Self> {
        Numeric::new(0, precision)?;
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        let well_formed = !(whole.is_empty() && fraction.is_empty())
            && whole.bytes().all(|b| b.is_ascii_digit())
            && fraction.bytes().all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(SqlError::fault(
                SQL_INVALID_OPERAND,
                format!("'{text}' is not a decimal number"),
            ));
        }

        let mut scaled: i128 = 0;
        for b in whole.bytes() {
            scaled = scaled
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as i128))
                .ok_or_else(|| overflow(precision))?;
        }
        let mut fraction = fraction.bytes();
        for _ in 0..precision {
            let digit = fraction.next().map_or(0, |b| (b - b'0') as i128);
            scaled = scaled
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| overflow(precision))?;
        }
        if fraction.next().is_some_and(|b| b >= b'5') {
            scaled += 1;
        }
        if negative {
            scaled = -scaled;
        }
        let scaled = i64::try_from(scaled).map_err(|_| overflow(precision))?;
        Ok(Self { scaled, precision })
    }

    /// Nearest numeric to a floating point value at the given precision.
    pub fn from_f64(value: f64, precision: u8) -> Result<Self> {
        Numeric::new(0, precision)?;
        let scaled = (value * scale_factor(precision) as f64).round();
        if !scaled.is_finite() || scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
            return Err(overflow(precision));
        }
        Ok(Self {
            scaled: scaled as i64,
            precision,
        })
    }
}

fn overflow(precision: u8) -> SqlError {
    SqlError::fault(
        SQL_INVALID_OPERAND,
        format!("numeric value does not fit at precision {precision}"),
    )
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.precision == 0 {
            return write!(f, "{}", self.scaled);
        }
        let sign = if self.scaled < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0width$}",
            self.int_part().unsigned_abs(),
            self.fract_part(),
            width = self.precision as usize
        )
    }
}

/// Ticks since the Unix epoch at `ticks_per_second` resolution.
pub fn ticks_from_system_time(time: SystemTime, ticks_per_second: u64) -> Result<u64> {
    let since = time
        .duration_since(UNIX_EPOCH)
        .map_err(|e| SqlError::fault(SQL_INVALID_OPERAND, e.to_string()))?;
    let ticks = since.as_nanos() * ticks_per_second as u128 / 1_000_000_000;
    u64::try_from(ticks).map_err(|_| SqlError::fault(SQL_INVALID_OPERAND, "datetime overflow"))
}

pub fn system_time_from_ticks(ticks: u64, ticks_per_second: u64) -> Result<SystemTime> {
    if ticks_per_second == 0 {
        return Err(SqlError::fault(SQL_SYSTEM_ERROR, "datetime precision is zero"));
    }
    let nanos = ticks as u128 * 1_000_000_000 / ticks_per_second as u128;
    let nanos = u64::try_from(nanos)
        .map_err(|_| SqlError::fault(SQL_INVALID_OPERAND, "datetime overflow"))?;
    Ok(UNIX_EPOCH + Duration::from_nanos(nanos))
}
