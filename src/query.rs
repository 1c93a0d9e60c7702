//! Query execution orchestration.
//!
//! [`QueryExecutor`] owns the full lifecycle of one query: submit it as a
//! job, poll the job to completion, resolve the result schema, and hand
//! back a [`RowCursor`] over the streamed result body.

use crate::cursor::RowCursor;
use crate::error::{QuarryLinkError, Result};
use crate::models::{ColumnSchema, EngineType, JobHandle, ResultSchema, WireValue};
use crate::poller::JobStatusPoller;
use crate::stream::ResultRowStream;
use crate::timeouts::QuarryLinkTimeouts;
use crate::transport::EngineTransport;
use bytes::Bytes;
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Connectivity probes send this exact query; it never reaches the
/// engine (compared case-insensitively).
const SELECT_ONE: &str = "SELECT 1";

/// Executes queries against one engine connection.
///
/// Submission and schema resolution are serialized per executor by an
/// internal mutex: one query may be in flight at a time, matching the
/// one-operation-per-statement model of the data-access surface built on
/// top. Cursors returned by [`execute`] are independent of the executor
/// afterwards.
///
/// [`execute`]: QueryExecutor::execute
pub struct QueryExecutor {
    transport: Arc<dyn EngineTransport>,
    engine: EngineType,
    timeouts: QuarryLinkTimeouts,
    max_rows: usize,
    fetch_size: usize,
    op_lock: tokio::sync::Mutex<()>,
}

impl QueryExecutor {
    pub fn new(
        transport: Arc<dyn EngineTransport>,
        engine: EngineType,
        timeouts: QuarryLinkTimeouts,
        max_rows: usize,
        fetch_size: usize,
    ) -> Self {
        Self {
            transport,
            engine,
            timeouts,
            max_rows,
            fetch_size,
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Execute a query and return a cursor over its result.
    ///
    /// Blocks (asynchronously) for the whole submit → poll → schema
    /// resolution sequence; for long jobs this is dominated by the status
    /// polling wait. `timeout` bounds only the local wait — on expiry the
    /// remote job keeps running and is NOT killed implicitly.
    ///
    /// The exact query `SELECT 1` (any letter case) is answered locally
    /// as a connectivity shim, without submitting a job.
    pub async fn execute(
        &self,
        database: &str,
        sql: &str,
        timeout: Option<Duration>,
    ) -> Result<RowCursor> {
        if sql.eq_ignore_ascii_case(SELECT_ONE) {
            return self.select_one_cursor();
        }

        let sql_preview = if sql.len() > 80 {
            format!("{}...", &sql[..80])
        } else {
            sql.to_string()
        };
        debug!(
            "[QUERY] Starting {} query on database={}: \"{}\"",
            self.engine,
            database,
            sql_preview.replace('\n', " ")
        );
        let started = Instant::now();

        // One submit/poll/schema sequence in flight per executor.
        let _guard = self.op_lock.lock().await;

        let job_id = self
            .transport
            .submit_job(database, sql, self.engine)
            .await?;
        let handle = JobHandle::new(
            job_id,
            database.to_string(),
            sql.to_string(),
            self.engine,
            timeout,
        );

        let poller = JobStatusPoller::new(Arc::clone(&self.transport), self.timeouts.poll_interval);
        let completion = poller.await_completion(&handle, handle.timeout()).await?;

        debug!(
            "[QUERY] job_id={} ready after {:?}, opening cursor (max_rows={} fetch_size={})",
            completion.job_id,
            started.elapsed(),
            self.max_rows,
            self.fetch_size
        );

        let stream = ResultRowStream::new(
            Arc::clone(&self.transport),
            completion.job_id,
            self.fetch_size,
            self.max_rows,
        );
        Ok(RowCursor::new(stream, completion.schema))
    }

    /// Synthesize the `SELECT 1` result locally. The schema depends on
    /// the engine dialect; no network is involved and the transport is
    /// never touched.
    fn select_one_cursor(&self) -> Result<RowCursor> {
        let (column, value) = match self.engine {
            EngineType::Hive => (ColumnSchema::new("_c0", "int"), WireValue::Int(1)),
            EngineType::Presto => (ColumnSchema::new("_col0", "bigint"), WireValue::BigInt(1)),
        };
        let schema = ResultSchema::new(vec![column]);

        let body = rmp_serde::to_vec(&WireValue::Array(vec![value]))
            .map_err(|e| QuarryLinkError::InternalError(e.to_string()))?;

        debug!("[QUERY] Answering SELECT 1 locally for {}", self.engine);
        let stream = ResultRowStream::from_body(
            Arc::clone(&self.transport),
            "local".to_string(),
            self.fetch_size,
            self.max_rows,
            Bytes::from(body),
        );
        Ok(RowCursor::new(stream, schema))
    }
}
