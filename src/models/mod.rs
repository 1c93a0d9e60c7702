//! Data models for the quarry-link client library.
//!
//! Job identity and status, result schemas, decoded wire values, and
//! catalog summaries.

pub mod catalog;
pub mod job;
pub mod schema;
pub mod wire_value;

pub use catalog::{
    DatabaseListResponse, DatabaseSummary, ServerStatus, TableListResponse, TableSummary,
};
pub use job::{EngineType, JobDebug, JobHandle, JobStatus, JobStatusResponse};
pub use schema::{ColumnSchema, QuarryDataType, ResultSchema};
pub use wire_value::WireValue;
