//! # quarry-link: Quarry Client Library
//!
//! A Rust client library for the Quarry analytical query engine. Quarry
//! executes SQL out-of-process as asynchronous jobs; this driver submits a
//! query, polls the job to a terminal state, then streams the binary
//! result body through a forward-only, typed row cursor.
//!
//! ## Features
//!
//! - **Query Execution**: Submit SQL as jobs on either engine dialect
//!   (`hive`, `presto`) and wait for completion with a configurable poll
//!   cadence and optional deadline
//! - **Row Streaming**: Lazily decode the MessagePack result body in
//!   pages, bounded by a max-rows cap
//! - **Typed Access**: Per-column getters with the driver's total
//!   coercion table (nil maps to `false`/`0`/`None`, narrowing truncates)
//! - **Catalog Introspection**: List databases and tables, describe
//!   table schemas
//! - **Authentication**: API key and HTTP Basic Auth
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quarry_link::QuarryLinkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QuarryLinkClient::builder()
//!         .base_url("https://api.quarry.example.com")
//!         .database("analytics")
//!         .api_key("1/0123456789abcdef")
//!         .build()?;
//!
//!     let mut cursor = client
//!         .execute_query("SELECT name, score FROM leaderboard")
//!         .await?;
//!
//!     while cursor.advance().await? {
//!         let name = cursor.get_string(1)?;
//!         let score = cursor.get_long(2)?;
//!         println!("{:?}: {}", name, score);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Connection URLs
//!
//! ```rust,no_run
//! use quarry_link::{ConnectionConfig, QuarryLinkClient};
//!
//! # fn example() -> quarry_link::Result<()> {
//! let config = ConnectionConfig::from_url(
//!     "quarry://api.quarry.example.com:443/analytics;type=presto;usessl=true",
//! )?;
//! let client = QuarryLinkClient::from_config(config)?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod convert;
pub mod cursor;
pub mod error;
pub mod models;
pub mod poller;
pub mod query;
pub mod stream;
pub mod timeouts;
pub mod transport;

// Re-export main types for convenience
pub use auth::AuthProvider;
pub use client::{QuarryLinkClient, QuarryLinkClientBuilder};
pub use config::ConnectionConfig;
pub use cursor::RowCursor;
pub use error::{QuarryLinkError, Result};
pub use models::{
    ColumnSchema, DatabaseSummary, EngineType, JobHandle, JobStatus, JobStatusResponse,
    QuarryDataType, ResultSchema, ServerStatus, TableSummary, WireValue,
};
pub use poller::{JobCompletion, JobStatusPoller};
pub use query::QueryExecutor;
pub use stream::{ResultRowStream, Row};
pub use timeouts::QuarryLinkTimeouts;
pub use transport::{EngineTransport, HttpTransport, NullTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
