//! Catalog and system-status models.

use serde::{Deserialize, Serialize};

/// Summary of one database visible to the authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSummary {
    /// Database name
    pub name: String,

    /// Total row count across tables, when the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Creation time as reported by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Summary of one table within a database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    /// Table name
    pub name: String,

    /// Row count, when the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Column-schema descriptor in the same `[[name, type], …]` JSON form
    /// as a job result schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// Engine status probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Status line, `"ok"` when healthy
    pub status: String,
}

impl ServerStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Response envelope for the database-list call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseListResponse {
    pub databases: Vec<DatabaseSummary>,
}

/// Response envelope for the table-list call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableListResponse {
    pub tables: Vec<TableSummary>,
}
