//! Lazy, paginated result-row streaming.
//!
//! A job's result body is a MessagePack stream of row arrays with no
//! schema and no framing beyond the values themselves. [`ResultRowStream`]
//! turns that body into a finite, forward-only, non-restartable sequence
//! of rows, decoding at most one page (`fetch_size` rows) ahead of the
//! consumer so that large results never materialize in memory.

use crate::error::{QuarryLinkError, Result};
use crate::models::WireValue;
use crate::transport::EngineTransport;
use bytes::Bytes;
use log::debug;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;

/// One decoded result row, in schema order.
pub type Row = Vec<WireValue>;

/// Forward-only stream of decoded rows for one succeeded job.
///
/// The body is fetched lazily on first use; rows decode in pages of
/// `fetch_size`. An optional `max_rows` bound (0 = unlimited) caps the
/// number of rows yielded regardless of how much data the engine
/// returned; once reached, the stream is exhausted and performs no
/// further decode or network work.
pub struct ResultRowStream {
    transport: Arc<dyn EngineTransport>,
    job_id: String,
    fetch_size: usize,
    max_rows: usize,
    rows_yielded: usize,
    body: Option<Bytes>,
    pos: usize,
    page: VecDeque<Row>,
    finished: bool,
}

impl ResultRowStream {
    pub fn new(
        transport: Arc<dyn EngineTransport>,
        job_id: String,
        fetch_size: usize,
        max_rows: usize,
    ) -> Self {
        Self {
            transport,
            job_id,
            fetch_size: fetch_size.max(1),
            max_rows,
            rows_yielded: 0,
            body: None,
            pos: 0,
            page: VecDeque::new(),
            finished: false,
        }
    }

    /// Construct a stream over an already-materialized body. Used by the
    /// local `SELECT 1` shim, which never talks to the engine.
    pub(crate) fn from_body(
        transport: Arc<dyn EngineTransport>,
        job_id: String,
        fetch_size: usize,
        max_rows: usize,
        body: Bytes,
    ) -> Self {
        let mut stream = Self::new(transport, job_id, fetch_size, max_rows);
        stream.body = Some(body);
        stream
    }

    /// `true` iff another row is available, fetching and decoding ahead
    /// as needed without consuming the row.
    pub async fn has_next(&mut self) -> Result<bool> {
        if self.limit_reached() {
            return Ok(false);
        }
        self.ensure_page().await?;
        Ok(!self.page.is_empty())
    }

    /// Decode and yield the next row, or `None` once the stream is
    /// exhausted.
    pub async fn next_row(&mut self) -> Result<Option<Row>> {
        if self.limit_reached() {
            return Ok(None);
        }
        self.ensure_page().await?;
        match self.page.pop_front() {
            Some(row) => {
                self.rows_yielded += 1;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    /// Rows yielded so far
    pub fn rows_yielded(&self) -> usize {
        self.rows_yielded
    }

    fn limit_reached(&self) -> bool {
        self.max_rows > 0 && self.rows_yielded >= self.max_rows
    }

    /// Refill the decode page when empty: fetch the body on first use,
    /// then decode up to `fetch_size` rows from the open cursor.
    async fn ensure_page(&mut self) -> Result<()> {
        if !self.page.is_empty() || self.finished {
            return Ok(());
        }

        if self.body.is_none() {
            let body = self.transport.fetch_result(&self.job_id).await?;
            debug!(
                "[RESULT_STREAM] job_id={} fetched result body ({} bytes)",
                self.job_id,
                body.len()
            );
            self.body = Some(body);
            self.pos = 0;
        }

        while self.page.len() < self.fetch_size {
            match self.decode_row()? {
                Some(row) => self.page.push_back(row),
                None => {
                    self.finished = true;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Decode one row array from the current body position, or `None` at
    /// end of body.
    fn decode_row(&mut self) -> Result<Option<Row>> {
        let body = match &self.body {
            Some(body) => body,
            None => return Ok(None),
        };
        if self.pos >= body.len() {
            return Ok(None);
        }

        let mut cursor = Cursor::new(&body[self.pos..]);
        let value: WireValue = rmp_serde::from_read(&mut cursor).map_err(|e| {
            QuarryLinkError::ProtocolError(format!(
                "malformed result body at byte {}: {}",
                self.pos, e
            ))
        })?;
        self.pos += cursor.position() as usize;

        match value {
            WireValue::Array(row) => Ok(Some(row)),
            other => Err(QuarryLinkError::ProtocolError(format!(
                "expected a row array, found {}",
                other.type_name()
            ))),
        }
    }
}
