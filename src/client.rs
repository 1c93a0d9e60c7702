//! Main Quarry client with builder pattern.
//!
//! Provides the primary interface for connecting to a Quarry engine,
//! executing queries, and browsing the catalog.

use crate::auth::AuthProvider;
use crate::config::ConnectionConfig;
use crate::cursor::RowCursor;
use crate::error::{QuarryLinkError, Result};
use crate::models::{
    DatabaseSummary, EngineType, JobStatusResponse, ResultSchema, ServerStatus, TableSummary,
};
use crate::query::QueryExecutor;
use crate::timeouts::QuarryLinkTimeouts;
use crate::transport::{EngineTransport, HttpTransport};
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Main Quarry client.
///
/// Use [`QuarryLinkClientBuilder`] to construct instances with custom
/// configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use quarry_link::QuarryLinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = QuarryLinkClient::builder()
///     .base_url("https://api.quarry.example.com")
///     .database("analytics")
///     .api_key("1/0123456789abcdef")
///     .build()?;
///
/// let mut cursor = client.execute_query("SELECT name, score FROM t").await?;
/// while cursor.advance().await? {
///     println!("{:?} {}", cursor.get_string(1)?, cursor.get_long(2)?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QuarryLinkClient {
    database: String,
    engine: EngineType,
    max_rows: usize,
    fetch_size: usize,
    transport: Arc<dyn EngineTransport>,
    executor: Arc<QueryExecutor>,
    status_cache: Arc<Mutex<StatusCache>>,
    timeouts: QuarryLinkTimeouts,
}

impl QuarryLinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> QuarryLinkClientBuilder {
        QuarryLinkClientBuilder::new()
    }

    /// Build a client from a parsed connection configuration
    pub fn from_config(config: ConnectionConfig) -> Result<Self> {
        Self::builder()
            .base_url(config.base_url())
            .database(config.database.clone())
            .engine(config.engine)
            .auth(config.auth.clone())
            .build()
    }

    /// Execute a query against the connection's default database.
    ///
    /// Waits for the remote job to finish and returns a ready-to-iterate
    /// cursor. See [`QueryExecutor::execute`] for the lifecycle details,
    /// including the local `SELECT 1` shim.
    pub async fn execute_query(&self, sql: &str) -> Result<RowCursor> {
        self.executor.execute(&self.database, sql, None).await
    }

    /// Execute a query against an explicit database with an optional
    /// wait deadline.
    ///
    /// The deadline bounds local waiting only: on expiry the call fails
    /// with a timeout error and the remote job keeps running (use
    /// [`kill_job`] to cancel it).
    ///
    /// [`kill_job`]: QuarryLinkClient::kill_job
    pub async fn execute_query_in(
        &self,
        database: &str,
        sql: &str,
        timeout: Option<Duration>,
    ) -> Result<RowCursor> {
        self.executor.execute(database, sql, timeout).await
    }

    /// Current status of a previously submitted job.
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        self.transport.job_status(job_id).await
    }

    /// Request remote cancellation of a job. This is the only way the
    /// driver ever cancels engine-side work; abandoning a wait does not.
    pub async fn kill_job(&self, job_id: &str) -> Result<()> {
        self.transport.kill_job(job_id).await
    }

    /// List databases visible to the authenticated account.
    pub async fn list_databases(&self) -> Result<Vec<DatabaseSummary>> {
        self.transport.list_databases().await
    }

    /// List tables in a database.
    pub async fn list_tables(&self, database: &str) -> Result<Vec<TableSummary>> {
        self.transport.list_tables(database).await
    }

    /// Column schema of one table, from its catalog descriptor.
    pub async fn describe_table(&self, database: &str, table: &str) -> Result<ResultSchema> {
        let tables = self.transport.list_tables(database).await?;
        let summary = tables.into_iter().find(|t| t.name == table).ok_or_else(|| {
            QuarryLinkError::InvalidColumn(format!("unknown table: {}.{}", database, table))
        })?;
        match summary.schema.as_deref() {
            Some(descriptor) => ResultSchema::parse_descriptor(descriptor),
            None => Ok(ResultSchema::default()),
        }
    }

    /// Check engine health. Responses are cached briefly
    /// (see [`QuarryLinkTimeouts::status_cache_ttl`]).
    pub async fn server_status(&self) -> Result<ServerStatus> {
        {
            let cache = self.status_cache.lock().await;
            if let (Some(last_check), Some(response)) =
                (cache.last_check, cache.last_response.clone())
            {
                if last_check.elapsed() < self.timeouts.status_cache_ttl {
                    debug!(
                        "[SERVER_STATUS] Returning cached response (age: {:?})",
                        last_check.elapsed()
                    );
                    return Ok(response);
                }
            }
        }

        let response = self.transport.server_status().await?;

        let mut cache = self.status_cache.lock().await;
        cache.last_check = Some(Instant::now());
        cache.last_response = Some(response.clone());
        Ok(response)
    }

    /// Create an additional, independent query executor (one statement).
    ///
    /// Executors share the connection's transport — the underlying HTTP
    /// client supports concurrent use — but serialize their own
    /// submissions independently, so separate statements never contend
    /// on each other's lock.
    pub fn new_executor(&self) -> QueryExecutor {
        QueryExecutor::new(
            Arc::clone(&self.transport),
            self.engine,
            self.timeouts.clone(),
            self.max_rows,
            self.fetch_size,
        )
    }

    /// Default database for this connection
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Get the configured timeouts
    pub fn timeouts(&self) -> &QuarryLinkTimeouts {
        &self.timeouts
    }
}

#[derive(Debug, Default)]
struct StatusCache {
    last_check: Option<Instant>,
    last_response: Option<ServerStatus>,
}

/// Builder for configuring [`QuarryLinkClient`] instances.
pub struct QuarryLinkClientBuilder {
    base_url: Option<String>,
    database: String,
    engine: EngineType,
    auth: AuthProvider,
    timeouts: QuarryLinkTimeouts,
    max_rows: usize,
    fetch_size: usize,
    transport: Option<Arc<dyn EngineTransport>>,
}

impl QuarryLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            database: "default".to_string(),
            engine: EngineType::default(),
            auth: AuthProvider::none(),
            timeouts: QuarryLinkTimeouts::default(),
            max_rows: 5000,
            fetch_size: 50,
            transport: None,
        }
    }

    /// Set the base URL of the engine API (e.g. `https://api.quarry.example.com`)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the default database for submitted queries
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the engine dialect queries run under
    pub fn engine(mut self, engine: EngineType) -> Self {
        self.engine = engine;
        self
    }

    /// Set API-key authentication
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.auth = AuthProvider::api_key(key.into());
        self
    }

    /// Set authentication provider directly
    pub fn auth(mut self, auth: AuthProvider) -> Self {
        self.auth = auth;
        self
    }

    /// Set comprehensive timeout configuration for all operations
    pub fn timeouts(mut self, timeouts: QuarryLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Cap the number of rows any cursor yields (0 = unlimited).
    /// Default: 5000
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set the number of rows decoded per page when streaming results.
    /// Default: 50
    pub fn fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// Substitute a custom transport. Intended for tests and embedded
    /// engines; when set, `base_url` and auth are unused.
    pub fn transport(mut self, transport: Arc<dyn EngineTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<QuarryLinkClient> {
        let transport: Arc<dyn EngineTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let base_url = self.base_url.ok_or_else(|| {
                    QuarryLinkError::ConfigurationError("base_url is required".into())
                })?;

                // Keep-alive pooling: statements share this client, and
                // poll sequences reuse connections heavily.
                let http_client = reqwest::Client::builder()
                    .timeout(self.timeouts.receive_timeout)
                    .connect_timeout(self.timeouts.connection_timeout)
                    .pool_max_idle_per_host(10)
                    .pool_idle_timeout(Duration::from_secs(90))
                    .build()
                    .map_err(|e| QuarryLinkError::ConfigurationError(e.to_string()))?;

                Arc::new(HttpTransport::new(base_url, http_client, self.auth))
            }
        };

        let executor = QueryExecutor::new(
            Arc::clone(&transport),
            self.engine,
            self.timeouts.clone(),
            self.max_rows,
            self.fetch_size,
        );

        Ok(QuarryLinkClient {
            database: self.database,
            engine: self.engine,
            max_rows: self.max_rows,
            fetch_size: self.fetch_size,
            transport,
            executor: Arc::new(executor),
            status_cache: Arc::new(Mutex::new(StatusCache::default())),
            timeouts: self.timeouts,
        })
    }
}
