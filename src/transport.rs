//! Engine transport: the narrow seam between the driver and the REST API.
//!
//! [`EngineTransport`] exposes exactly the calls the query lifecycle
//! needs — submit, status, result fetch, kill, catalog listing, status
//! probe. The HTTP implementation lives here; tests substitute their own
//! implementations to script engine behavior.

use crate::auth::AuthProvider;
use crate::error::{QuarryLinkError, Result};
use crate::models::{
    DatabaseListResponse, DatabaseSummary, EngineType, JobStatusResponse, ServerStatus,
    TableListResponse, TableSummary,
};
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, warn};
use serde::Deserialize;
use std::time::Instant;

/// Capability interface over the engine's job and catalog API.
#[async_trait]
pub trait EngineTransport: Send + Sync {
    /// Submit a query for execution; returns the engine-assigned job id.
    async fn submit_job(&self, database: &str, query: &str, engine: EngineType) -> Result<String>;

    /// Fetch the current status of a job.
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse>;

    /// Fetch the complete binary result body of a succeeded job.
    async fn fetch_result(&self, job_id: &str) -> Result<Bytes>;

    /// Request remote cancellation of a job. Explicit only — the driver
    /// never calls this on its own.
    async fn kill_job(&self, job_id: &str) -> Result<()>;

    /// List databases visible to the authenticated account.
    async fn list_databases(&self) -> Result<Vec<DatabaseSummary>>;

    /// List tables in a database.
    async fn list_tables(&self, database: &str) -> Result<Vec<TableSummary>>;

    /// Probe engine health.
    async fn server_status(&self) -> Result<ServerStatus>;
}

#[derive(Debug, Deserialize)]
struct SubmitJobResponse {
    job_id: String,
}

/// HTTP implementation of [`EngineTransport`] over the engine's v3 API.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
    auth: AuthProvider,
}

impl HttpTransport {
    pub fn new(base_url: String, http_client: reqwest::Client, auth: AuthProvider) -> Self {
        Self {
            base_url,
            http_client,
            auth,
        }
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        self.auth.apply_to_request(self.http_client.get(url))
    }

    fn post(&self, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        self.auth.apply_to_request(self.http_client.post(url))
    }

    /// Turn a non-success response into a `ServerError`, extracting the
    /// engine's error message when the body is a JSON error envelope.
    async fn fail(response: reqwest::Response) -> QuarryLinkError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        let message = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or(body),
            Err(_) => body,
        };
        QuarryLinkError::ServerError {
            status_code: status.as_u16(),
            message,
        }
    }
}

/// Transport with no engine behind it: every call fails.
///
/// Useful as a placeholder where a transport is structurally required but
/// must never be reached, such as locally synthesized result sets.
#[derive(Debug, Clone, Default)]
pub struct NullTransport;

#[async_trait]
impl EngineTransport for NullTransport {
    async fn submit_job(
        &self,
        _database: &str,
        _query: &str,
        _engine: EngineType,
    ) -> Result<String> {
        Err(Self::unavailable())
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatusResponse> {
        Err(Self::unavailable())
    }

    async fn fetch_result(&self, _job_id: &str) -> Result<Bytes> {
        Err(Self::unavailable())
    }

    async fn kill_job(&self, _job_id: &str) -> Result<()> {
        Err(Self::unavailable())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseSummary>> {
        Err(Self::unavailable())
    }

    async fn list_tables(&self, _database: &str) -> Result<Vec<TableSummary>> {
        Err(Self::unavailable())
    }

    async fn server_status(&self) -> Result<ServerStatus> {
        Err(Self::unavailable())
    }
}

impl NullTransport {
    fn unavailable() -> QuarryLinkError {
        QuarryLinkError::ConfigurationError("transport is not connected".to_string())
    }
}

#[async_trait]
impl EngineTransport for HttpTransport {
    async fn submit_job(&self, database: &str, query: &str, engine: EngineType) -> Result<String> {
        let path = format!("/v3/job/issue/{}/{}", engine.as_str(), database);
        debug!(
            "[JOB_SUBMIT] Submitting {} query to database={} (len={})",
            engine,
            database,
            query.len()
        );

        let start = Instant::now();
        let response = self
            .post(&path)?
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "[JOB_SUBMIT] Submission rejected: status={} duration_ms={}",
                status,
                start.elapsed().as_millis()
            );
            return Err(Self::fail(response).await);
        }

        let submitted: SubmitJobResponse = response.json().await?;
        debug!(
            "[JOB_SUBMIT] Accepted as job_id={} duration_ms={}",
            submitted.job_id,
            start.elapsed().as_millis()
        );
        Ok(submitted.job_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        let response = self.get(&format!("/v3/job/show/{}", job_id))?.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let status: JobStatusResponse = response.json().await?;
        debug!("[JOB_STATUS] job_id={} status={}", job_id, status.status);
        Ok(status)
    }

    async fn fetch_result(&self, job_id: &str) -> Result<Bytes> {
        let start = Instant::now();
        let response = self
            .get(&format!("/v3/job/result/{}?format=msgpack", job_id))?
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let body = response.bytes().await?;
        debug!(
            "[RESULT_FETCH] job_id={} bytes={} duration_ms={}",
            job_id,
            body.len(),
            start.elapsed().as_millis()
        );
        Ok(body)
    }

    async fn kill_job(&self, job_id: &str) -> Result<()> {
        debug!("[JOB_KILL] Requesting kill of job_id={}", job_id);
        let response = self.post(&format!("/v3/job/kill/{}", job_id))?.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseSummary>> {
        let response = self.get("/v3/database/list")?.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let listed: DatabaseListResponse = response.json().await?;
        debug!("[CATALOG] Listed {} databases", listed.databases.len());
        Ok(listed.databases)
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<TableSummary>> {
        let response = self
            .get(&format!("/v3/table/list/{}", database))?
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let listed: TableListResponse = response.json().await?;
        debug!(
            "[CATALOG] Listed {} tables in database={}",
            listed.tables.len(),
            database
        );
        Ok(listed.tables)
    }

    async fn server_status(&self) -> Result<ServerStatus> {
        let response = self.get("/v3/system/server_status")?.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }
}
