//! Decoded values from the binary result-row stream.
//!
//! The engine returns result bodies as a MessagePack stream of row arrays.
//! Every scalar or container decoded from that stream becomes a [`WireValue`]
//! prior to type coercion. Numeric variants keep the width the wire declared
//! (`Int` vs `BigInt`, `Float` vs `Double`) so that narrowing conversions can
//! truncate exactly the way the declared width demands.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded value from the result-row stream.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Explicit nil (SQL NULL)
    Nil,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    BigInt(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// UTF-8 string
    Text(String),
    /// Raw binary
    Bytes(Vec<u8>),
    /// Array of values
    Array(Vec<WireValue>),
    /// Map of key/value pairs, in wire order
    Map(Vec<(WireValue, WireValue)>),
}

impl WireValue {
    /// Short type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "int",
            Self::BigInt(_) => "bigint",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Text(_) => "string",
            Self::Bytes(_) => "binary",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    /// `true` for the nil value
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Raw text content for `Text` and (lossily decoded) `Bytes`
    pub(crate) fn as_raw_str(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(std::borrow::Cow::Borrowed(s)),
            Self::Bytes(b) => Some(String::from_utf8_lossy(b)),
            _ => None,
        }
    }
}

/// Structural text rendering used when coercing containers to strings.
/// Scalars render bare, strings render quoted inside containers.
impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::BigInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Self::Bytes(b) => {
                let s = String::from_utf8_lossy(b);
                write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Width-faithful encoding: `Int` always serializes through the 32-bit
/// path and `BigInt` through the 64-bit path. The MessagePack writer may
/// still pick a more compact marker for small magnitudes, which decodes
/// back as `Int` — the numeric value is what round-trips, not the marker.
impl Serialize for WireValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Nil => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::BigInt(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_bytes(b),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

struct WireValueVisitor;

impl<'de> Visitor<'de> for WireValueVisitor {
    type Value = WireValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a MessagePack value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Nil)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Nil)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<WireValue, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Bool(v))
    }

    fn visit_i8<E: de::Error>(self, v: i8) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Int(i32::from(v)))
    }

    fn visit_i16<E: de::Error>(self, v: i16) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Int(i32::from(v)))
    }

    fn visit_i32<E: de::Error>(self, v: i32) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Int(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<WireValue, E> {
        Ok(WireValue::BigInt(v))
    }

    fn visit_u8<E: de::Error>(self, v: u8) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Int(i32::from(v)))
    }

    fn visit_u16<E: de::Error>(self, v: u16) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Int(i32::from(v)))
    }

    fn visit_u32<E: de::Error>(self, v: u32) -> std::result::Result<WireValue, E> {
        // A u32 marker can carry values past i32 range; those are
        // 64-bit values from the driver's point of view.
        match i32::try_from(v) {
            Ok(n) => Ok(WireValue::Int(n)),
            Err(_) => Ok(WireValue::BigInt(i64::from(v))),
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<WireValue, E> {
        i64::try_from(v)
            .map(WireValue::BigInt)
            .map_err(|_| E::custom(format!("integer {} exceeds supported 64-bit range", v)))
    }

    fn visit_f32<E: de::Error>(self, v: f32) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Float(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Text(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<WireValue, E> {
        Ok(WireValue::Bytes(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> std::result::Result<WireValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<WireValue>()? {
            items.push(item);
        }
        Ok(WireValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<WireValue, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<WireValue, WireValue>()? {
            entries.push(entry);
        }
        Ok(WireValue::Map(entries))
    }
}

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(WireValueVisitor)
    }
}
