//! The public forward-only row cursor.
//!
//! [`RowCursor`] composes the row stream, the resolved schema and the
//! coercion table into the typed surface callers iterate: advance to the
//! next row, read columns by 1-based index, check the one-shot null flag.

use crate::convert::{self, CoerceError};
use crate::error::{QuarryLinkError, Result};
use crate::models::{ResultSchema, WireValue};
use crate::stream::{ResultRowStream, Row};
use chrono::{NaiveDate, NaiveDateTime};

/// Read-only, forward-only cursor over a job's decoded result rows.
///
/// Column indexes are 1-based, following the data-access convention the
/// driver serves. The `was_null` flag reports whether the most recently
/// read value was nil and must be checked immediately after the getter —
/// the next column access overwrites it.
///
/// Row iteration is single-consumer: every accessor takes `&mut self`.
pub struct RowCursor {
    stream: ResultRowStream,
    schema: ResultSchema,
    row: Option<Row>,
    was_null: bool,
}

impl std::fmt::Debug for RowCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowCursor")
            .field("schema", &self.schema)
            .field("was_null", &self.was_null)
            .finish_non_exhaustive()
    }
}

impl RowCursor {
    pub(crate) fn new(stream: ResultRowStream, schema: ResultSchema) -> Self {
        Self {
            stream,
            schema,
            row: None,
            was_null: false,
        }
    }

    /// The resolved column schema.
    pub fn schema(&self) -> &ResultSchema {
        &self.schema
    }

    /// Move to the next row. Returns `false` once the result is
    /// exhausted; the previous row is released either way.
    pub async fn advance(&mut self) -> Result<bool> {
        self.row = self.stream.next_row().await?;
        self.was_null = false;
        Ok(self.row.is_some())
    }

    /// `true` iff another row is available, without consuming it.
    pub async fn has_next(&mut self) -> Result<bool> {
        self.stream.has_next().await
    }

    /// Rows yielded so far, including the current one.
    pub fn row_count(&self) -> usize {
        self.stream.rows_yielded()
    }

    /// Resolve a column name to its 1-based index.
    pub fn find_column(&self, name: &str) -> Result<usize> {
        self.schema
            .position(name)
            .map(|i| i + 1)
            .ok_or_else(|| QuarryLinkError::InvalidColumn(format!("unknown column: {}", name)))
    }

    /// Raw wire value of a column in the current row (the `getObject`
    /// access every typed getter funnels through). Sets the `was_null`
    /// flag as a side effect.
    pub fn get_value(&mut self, index: usize) -> Result<&WireValue> {
        let row = self.row.as_ref().ok_or_else(|| {
            QuarryLinkError::InvalidColumn(
                "no current row; call advance() before reading columns".to_string(),
            )
        })?;
        if index == 0 || index > row.len() {
            return Err(QuarryLinkError::InvalidColumn(format!(
                "column index {} out of range 1..={}",
                index,
                row.len()
            )));
        }
        let value = &row[index - 1];
        self.was_null = value.is_nil();
        Ok(value)
    }

    /// Whether the value most recently read by a getter was nil.
    /// One-shot: meaningful only until the next column access.
    pub fn was_null(&self) -> bool {
        self.was_null
    }

    pub fn get_bool(&mut self, index: usize) -> Result<bool> {
        let value = self.get_value(index)?;
        convert::to_bool(value).map_err(|e| Self::mismatch(index, e))
    }

    pub fn get_byte(&mut self, index: usize) -> Result<i8> {
        let value = self.get_value(index)?;
        convert::to_i8(value).map_err(|e| Self::mismatch(index, e))
    }

    pub fn get_short(&mut self, index: usize) -> Result<i16> {
        let value = self.get_value(index)?;
        convert::to_i16(value).map_err(|e| Self::mismatch(index, e))
    }

    pub fn get_int(&mut self, index: usize) -> Result<i32> {
        let value = self.get_value(index)?;
        convert::to_i32(value).map_err(|e| Self::mismatch(index, e))
    }

    pub fn get_long(&mut self, index: usize) -> Result<i64> {
        let value = self.get_value(index)?;
        convert::to_i64(value).map_err(|e| Self::mismatch(index, e))
    }

    pub fn get_float(&mut self, index: usize) -> Result<f32> {
        let value = self.get_value(index)?;
        convert::to_f32(value).map_err(|e| Self::mismatch(index, e))
    }

    pub fn get_double(&mut self, index: usize) -> Result<f64> {
        let value = self.get_value(index)?;
        convert::to_f64(value).map_err(|e| Self::mismatch(index, e))
    }

    /// String view of a column; `None` for nil.
    pub fn get_string(&mut self, index: usize) -> Result<Option<String>> {
        let value = self.get_value(index)?;
        convert::to_string(value).map_err(|e| Self::mismatch(index, e))
    }

    /// Date view of a column; `None` for nil.
    pub fn get_date(&mut self, index: usize) -> Result<Option<NaiveDate>> {
        let value = self.get_value(index)?;
        convert::to_date(value).map_err(|e| Self::mismatch(index, e))
    }

    /// Timestamp view of a column; `None` for nil.
    ///
    /// Unlike the other getters this consults the declared schema: only a
    /// column declared `timestamp` may be read as one, even if the raw
    /// text would parse.
    pub fn get_timestamp(&mut self, index: usize) -> Result<Option<NaiveDateTime>> {
        let value = self.get_value(index)?.clone();
        if value.is_nil() {
            return Ok(None);
        }

        let declared = self.schema.column(index - 1).ok_or_else(|| {
            QuarryLinkError::InvalidColumn(format!(
                "column index {} out of range 1..={}",
                index,
                self.schema.len()
            ))
        })?;
        if !declared.is_timestamp() {
            return Err(QuarryLinkError::TypeMismatch {
                column: index,
                target: "timestamp",
                value: format!("declared as {}", declared.type_name),
            });
        }

        convert::to_timestamp(&value).map_err(|e| Self::mismatch(index, e))
    }

    fn mismatch(index: usize, e: CoerceError) -> QuarryLinkError {
        QuarryLinkError::TypeMismatch {
            column: index,
            target: e.target,
            value: e.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnSchema;
    use crate::transport::NullTransport;
    use bytes::Bytes;
    use std::sync::Arc;

    fn encode_rows(rows: &[Row]) -> Bytes {
        let mut body = Vec::new();
        for row in rows {
            body.extend(rmp_serde::to_vec(&WireValue::Array(row.clone())).unwrap());
        }
        Bytes::from(body)
    }

    fn cursor_over(columns: Vec<ColumnSchema>, rows: &[Row]) -> RowCursor {
        let stream = ResultRowStream::from_body(
            Arc::new(NullTransport),
            "12345".to_string(),
            50,
            0,
            encode_rows(rows),
        );
        RowCursor::new(stream, ResultSchema::new(columns))
    }

    fn sample_cursor() -> RowCursor {
        cursor_over(
            vec![
                ColumnSchema::new("name", "string"),
                ColumnSchema::new("score", "int"),
                ColumnSchema::new("seen_at", "timestamp"),
            ],
            &[
                vec![
                    WireValue::Text("alice".to_string()),
                    WireValue::Int(10),
                    WireValue::Text("2024-03-09 12:00:00".to_string()),
                ],
                vec![
                    WireValue::Nil,
                    WireValue::BigInt(20),
                    WireValue::Nil,
                ],
            ],
        )
    }

    #[tokio::test]
    async fn test_access_before_advance_is_invalid() {
        let mut cursor = sample_cursor();
        let err = cursor.get_string(1).unwrap_err();
        assert!(matches!(err, QuarryLinkError::InvalidColumn(_)));
    }

    #[tokio::test]
    async fn test_typed_getters() {
        let mut cursor = sample_cursor();
        assert!(cursor.advance().await.unwrap());
        assert_eq!(cursor.get_string(1).unwrap(), Some("alice".to_string()));
        assert_eq!(cursor.get_int(2).unwrap(), 10);
        assert_eq!(cursor.get_long(2).unwrap(), 10);
        assert!(cursor.get_timestamp(3).unwrap().is_some());

        assert!(cursor.advance().await.unwrap());
        assert_eq!(cursor.get_string(1).unwrap(), None);
        assert_eq!(cursor.get_long(2).unwrap(), 20);

        assert!(!cursor.advance().await.unwrap());
    }

    #[tokio::test]
    async fn test_was_null_is_one_shot() {
        let mut cursor = sample_cursor();
        cursor.advance().await.unwrap();
        cursor.advance().await.unwrap();

        let _ = cursor.get_string(1).unwrap();
        assert!(cursor.was_null());
        // reading a non-nil column overwrites the flag
        let _ = cursor.get_long(2).unwrap();
        assert!(!cursor.was_null());
    }

    #[tokio::test]
    async fn test_column_bounds() {
        let mut cursor = sample_cursor();
        cursor.advance().await.unwrap();
        assert!(matches!(
            cursor.get_string(0).unwrap_err(),
            QuarryLinkError::InvalidColumn(_)
        ));
        assert!(matches!(
            cursor.get_string(4).unwrap_err(),
            QuarryLinkError::InvalidColumn(_)
        ));
    }

    #[tokio::test]
    async fn test_find_column() {
        let cursor = sample_cursor();
        assert_eq!(cursor.find_column("score").unwrap(), 2);
        assert!(matches!(
            cursor.find_column("missing").unwrap_err(),
            QuarryLinkError::InvalidColumn(_)
        ));
    }

    #[tokio::test]
    async fn test_timestamp_requires_declared_timestamp_column() {
        let mut cursor = cursor_over(
            vec![ColumnSchema::new("t", "string")],
            &[vec![WireValue::Text("2024-03-09 12:00:00".to_string())]],
        );
        cursor.advance().await.unwrap();

        // lexically valid timestamp text, but the column is declared string
        let err = cursor.get_timestamp(1).unwrap_err();
        match err {
            QuarryLinkError::TypeMismatch { column, target, .. } => {
                assert_eq!(column, 1);
                assert_eq!(target, "timestamp");
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timestamp_nil_bypasses_the_gate() {
        let mut cursor = cursor_over(
            vec![ColumnSchema::new("t", "string")],
            &[vec![WireValue::Nil]],
        );
        cursor.advance().await.unwrap();
        assert_eq!(cursor.get_timestamp(1).unwrap(), None);
    }

    #[tokio::test]
    async fn test_coercion_failures_carry_the_column() {
        let mut cursor = cursor_over(
            vec![ColumnSchema::new("v", "string")],
            &[vec![WireValue::Text("abc".to_string())]],
        );
        cursor.advance().await.unwrap();
        match cursor.get_int(1).unwrap_err() {
            QuarryLinkError::TypeMismatch { column, target, .. } => {
                assert_eq!(column, 1);
                assert_eq!(target, "int");
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }
}
