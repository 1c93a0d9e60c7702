//! Result-schema models.
//!
//! A job's column schema is not embedded in the binary result body; it
//! arrives as a JSON descriptor on the status response once the job has
//! succeeded, as an ordered array of `[name, type]` pairs.

use crate::error::{QuarryLinkError, Result};
use serde::{Deserialize, Serialize};

/// Driver-side unified data type for metadata consumers.
///
/// Engine type names are free-form text; this enum is the closed set the
/// driver maps them onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuarryDataType {
    /// Boolean type
    Boolean,
    /// 32-bit signed integer (also tinyint/smallint)
    Int,
    /// 64-bit signed integer
    BigInt,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// UTF-8 string; also the fallback for structural types
    Text,
    /// Calendar date
    Date,
    /// Timestamp without timezone
    Timestamp,
}

impl QuarryDataType {
    /// Map an engine type name onto the unified type system.
    ///
    /// Structural types (`array<...>`, `map<...>`, `struct<...>`) read as
    /// text, matching how their values coerce.
    pub fn from_type_name(type_name: &str) -> Result<Self> {
        let lower = type_name.to_ascii_lowercase();
        let mapped = match lower.as_str() {
            "string" | "varchar" => Self::Text,
            "boolean" => Self::Boolean,
            "tinyint" | "smallint" | "int" => Self::Int,
            "long" | "bigint" => Self::BigInt,
            "float" => Self::Float,
            "double" => Self::Double,
            "date" => Self::Date,
            "timestamp" => Self::Timestamp,
            _ if lower.starts_with("array<")
                || lower.starts_with("map<")
                || lower.starts_with("struct<") =>
            {
                Self::Text
            }
            _ => {
                return Err(QuarryLinkError::ProtocolError(format!(
                    "unrecognized column type: {}",
                    type_name
                )))
            }
        };
        Ok(mapped)
    }
}

/// One column of a result schema: name plus the engine's declared type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,

    /// Declared type name, verbatim from the descriptor
    pub type_name: String,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Unified data type for this column
    pub fn data_type(&self) -> Result<QuarryDataType> {
        QuarryDataType::from_type_name(&self.type_name)
    }

    /// `true` when the column was declared `timestamp` (case-insensitive).
    /// Timestamp getters are only valid on such columns.
    pub fn is_timestamp(&self) -> bool {
        self.type_name.eq_ignore_ascii_case("timestamp")
    }
}

/// Ordered column schema of one job's result, resolved once after success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSchema {
    columns: Vec<ColumnSchema>,
}

impl ResultSchema {
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    /// Parse the JSON schema descriptor from a status response.
    ///
    /// The descriptor is an array of `[name, type]` pairs; entries may
    /// carry trailing elements in future protocol revisions, which are
    /// ignored.
    pub fn parse_descriptor(descriptor: &str) -> Result<Self> {
        let raw: Vec<Vec<String>> = serde_json::from_str(descriptor)?;
        let mut columns = Vec::with_capacity(raw.len());
        for entry in raw {
            if entry.len() < 2 {
                return Err(QuarryLinkError::ProtocolError(format!(
                    "malformed schema descriptor entry: {:?}",
                    entry
                )));
            }
            let mut it = entry.into_iter();
            let name = it.next().unwrap_or_default();
            let type_name = it.next().unwrap_or_default();
            columns.push(ColumnSchema::new(name, type_name));
        }
        Ok(Self { columns })
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column by 0-based position
    pub fn column(&self, index: usize) -> Option<&ColumnSchema> {
        self.columns.get(index)
    }

    /// 0-based position of the first column with the given name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Column names, in order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let schema =
            ResultSchema::parse_descriptor(r#"[["name","string"],["score","int"]]"#).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.column(0).unwrap().name, "name");
        assert_eq!(schema.column(0).unwrap().type_name, "string");
        assert_eq!(schema.column(1).unwrap().name, "score");
        assert_eq!(schema.position("score"), Some(1));
        assert_eq!(schema.position("missing"), None);
    }

    #[test]
    fn test_parse_descriptor_rejects_short_entries() {
        let err = ResultSchema::parse_descriptor(r#"[["only_name"]]"#).unwrap_err();
        assert!(matches!(err, QuarryLinkError::ProtocolError(_)));
    }

    #[test]
    fn test_parse_descriptor_rejects_non_json() {
        assert!(ResultSchema::parse_descriptor("not json").is_err());
    }

    #[test]
    fn test_type_name_mapping() {
        assert_eq!(
            QuarryDataType::from_type_name("string").unwrap(),
            QuarryDataType::Text
        );
        assert_eq!(
            QuarryDataType::from_type_name("BIGINT").unwrap(),
            QuarryDataType::BigInt
        );
        assert_eq!(
            QuarryDataType::from_type_name("array<int>").unwrap(),
            QuarryDataType::Text
        );
        assert!(QuarryDataType::from_type_name("geometry").is_err());
    }

    #[test]
    fn test_timestamp_detection_is_case_insensitive() {
        assert!(ColumnSchema::new("t", "TIMESTAMP").is_timestamp());
        assert!(ColumnSchema::new("t", "timestamp").is_timestamp());
        assert!(!ColumnSchema::new("t", "string").is_timestamp());
    }
}
