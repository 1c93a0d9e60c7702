//! Wire-value type coercion.
//!
//! Every typed getter on a row cursor funnels through these conversions.
//! The policy is total over the reasonable input domain: nil always maps
//! to the target's null substitute (`false`, `0`, `0.0`, or `None`) and
//! numeric narrowing truncates rather than erroring. Only conversions the
//! driver cannot express (containers to numbers, booleans to dates, text
//! that does not parse) fail, and the failure carries the offending value
//! so the cursor can report which column refused.
//!
//! Integer narrowing wraps to the target width (a 64-bit value read as
//! `int` keeps its low 32 bits); float-to-integer conversion truncates
//! toward zero.

use crate::models::WireValue;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A conversion the coercion table declares unconvertible.
#[derive(Debug, Clone)]
pub struct CoerceError {
    /// Target type name
    pub target: &'static str,
    /// Rendered offending value
    pub value: String,
}

impl CoerceError {
    fn new(target: &'static str, value: &WireValue) -> Self {
        Self {
            target,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert {} to {}", self.value, self.target)
    }
}

impl std::error::Error for CoerceError {}

type CoerceResult<T> = std::result::Result<T, CoerceError>;

/// Coerce to boolean: nil is `false`, numbers compare against zero, and
/// raw text is `false` only for the literal `"false"` (case-insensitive).
pub fn to_bool(v: &WireValue) -> CoerceResult<bool> {
    match v {
        WireValue::Nil => Ok(false),
        WireValue::Bool(b) => Ok(*b),
        WireValue::Int(n) => Ok(*n != 0),
        WireValue::BigInt(n) => Ok(*n != 0),
        WireValue::Float(n) => Ok(*n != 0.0),
        WireValue::Double(n) => Ok(*n != 0.0),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            Ok(!s.eq_ignore_ascii_case("false"))
        }
        other => Err(CoerceError::new("boolean", other)),
    }
}

pub fn to_i8(v: &WireValue) -> CoerceResult<i8> {
    match v {
        WireValue::Nil => Ok(0),
        WireValue::Bool(b) => Ok(i8::from(*b)),
        WireValue::Int(n) => Ok(*n as i8),
        WireValue::BigInt(n) => Ok(*n as i8),
        WireValue::Float(n) => Ok(*n as i8),
        WireValue::Double(n) => Ok(*n as i8),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            s.parse::<i8>().map_err(|_| CoerceError::new("byte", v))
        }
        other => Err(CoerceError::new("byte", other)),
    }
}

pub fn to_i16(v: &WireValue) -> CoerceResult<i16> {
    match v {
        WireValue::Nil => Ok(0),
        WireValue::Bool(b) => Ok(i16::from(*b)),
        WireValue::Int(n) => Ok(*n as i16),
        WireValue::BigInt(n) => Ok(*n as i16),
        WireValue::Float(n) => Ok(*n as i16),
        WireValue::Double(n) => Ok(*n as i16),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            s.parse::<i16>().map_err(|_| CoerceError::new("short", v))
        }
        other => Err(CoerceError::new("short", other)),
    }
}

pub fn to_i32(v: &WireValue) -> CoerceResult<i32> {
    match v {
        WireValue::Nil => Ok(0),
        WireValue::Bool(b) => Ok(i32::from(*b)),
        WireValue::Int(n) => Ok(*n),
        WireValue::BigInt(n) => Ok(*n as i32),
        WireValue::Float(n) => Ok(*n as i32),
        WireValue::Double(n) => Ok(*n as i32),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            s.parse::<i32>().map_err(|_| CoerceError::new("int", v))
        }
        other => Err(CoerceError::new("int", other)),
    }
}

pub fn to_i64(v: &WireValue) -> CoerceResult<i64> {
    match v {
        WireValue::Nil => Ok(0),
        WireValue::Bool(b) => Ok(i64::from(*b)),
        WireValue::Int(n) => Ok(i64::from(*n)),
        WireValue::BigInt(n) => Ok(*n),
        WireValue::Float(n) => Ok(*n as i64),
        WireValue::Double(n) => Ok(*n as i64),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            s.parse::<i64>().map_err(|_| CoerceError::new("long", v))
        }
        other => Err(CoerceError::new("long", other)),
    }
}

pub fn to_f32(v: &WireValue) -> CoerceResult<f32> {
    match v {
        WireValue::Nil => Ok(0.0),
        WireValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        WireValue::Int(n) => Ok(*n as f32),
        WireValue::BigInt(n) => Ok(*n as f32),
        WireValue::Float(n) => Ok(*n),
        WireValue::Double(n) => Ok(*n as f32),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            s.parse::<f32>().map_err(|_| CoerceError::new("float", v))
        }
        other => Err(CoerceError::new("float", other)),
    }
}

pub fn to_f64(v: &WireValue) -> CoerceResult<f64> {
    match v {
        WireValue::Nil => Ok(0.0),
        WireValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        WireValue::Int(n) => Ok(f64::from(*n)),
        WireValue::BigInt(n) => Ok(*n as f64),
        WireValue::Float(n) => Ok(f64::from(*n)),
        WireValue::Double(n) => Ok(*n),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            s.parse::<f64>().map_err(|_| CoerceError::new("double", v))
        }
        other => Err(CoerceError::new("double", other)),
    }
}

/// Coerce to string: nil is `None`, numbers render as decimal text, raw
/// values pass through verbatim, and containers render structurally.
/// Booleans are unconvertible.
pub fn to_string(v: &WireValue) -> CoerceResult<Option<String>> {
    match v {
        WireValue::Nil => Ok(None),
        WireValue::Int(n) => Ok(Some(n.to_string())),
        WireValue::BigInt(n) => Ok(Some(n.to_string())),
        WireValue::Float(n) => Ok(Some(n.to_string())),
        WireValue::Double(n) => Ok(Some(n.to_string())),
        WireValue::Text(s) => Ok(Some(s.clone())),
        WireValue::Bytes(b) => Ok(Some(String::from_utf8_lossy(b).into_owned())),
        WireValue::Array(_) | WireValue::Map(_) => Ok(Some(v.to_string())),
        other => Err(CoerceError::new("string", other)),
    }
}

/// Coerce to a calendar date: nil is `None`, raw text must parse as a
/// `YYYY-MM-DD` literal. Nothing else converts.
pub fn to_date(v: &WireValue) -> CoerceResult<Option<NaiveDate>> {
    match v {
        WireValue::Nil => Ok(None),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map(Some)
                .map_err(|_| CoerceError::new("date", v))
        }
        other => Err(CoerceError::new("date", other)),
    }
}

/// Coerce to a timestamp: nil is `None`, raw text must parse as a
/// `YYYY-MM-DD HH:MM:SS[.fff]` literal. Nothing else converts.
///
/// The declared-column-type gate (only columns declared `timestamp` may
/// be read this way) lives in the row cursor, which is the layer that
/// knows the schema.
pub fn to_timestamp(v: &WireValue) -> CoerceResult<Option<NaiveDateTime>> {
    match v {
        WireValue::Nil => Ok(None),
        WireValue::Text(_) | WireValue::Bytes(_) => {
            let s = v.as_raw_str().unwrap_or(std::borrow::Cow::Borrowed(""));
            NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
                .map(Some)
                .map_err(|_| CoerceError::new("timestamp", v))
        }
        other => Err(CoerceError::new("timestamp", other)),
    }
}
