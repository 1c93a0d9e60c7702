//! Job identity and status models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Engine dialect a query runs under.
///
/// Quarry executes every query as a job on one of two SQL engines. The
/// dialect is part of the submission request and also decides the schema
/// of the local `SELECT 1` shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    /// Batch engine (default)
    Hive,
    /// Interactive engine
    Presto,
}

impl EngineType {
    /// Wire name used in submission URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hive => "hive",
            Self::Presto => "presto",
        }
    }

    /// Parse a wire name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hive" => Some(Self::Hive),
            "presto" => Some(Self::Presto),
            _ => None,
        }
    }
}

impl Default for EngineType {
    fn default() -> Self {
        Self::Hive
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and immutable submission parameters of one submitted job.
///
/// The job id is assigned by the engine in the submission response and is
/// set exactly once, at construction. Handles are never mutated afterwards.
#[derive(Debug, Clone)]
pub struct JobHandle {
    job_id: String,
    database: String,
    query: String,
    engine: EngineType,
    timeout: Option<Duration>,
}

impl JobHandle {
    pub fn new(
        job_id: String,
        database: String,
        query: String,
        engine: EngineType,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            job_id,
            database,
            query,
            engine,
            timeout,
        }
    }

    /// Opaque engine-assigned job id
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Database the query was submitted against
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Original query text
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Engine dialect the job runs under
    pub fn engine(&self) -> EngineType {
        self.engine
    }

    /// Per-query wait deadline, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Lifecycle state reported by the job-status call.
///
/// `Success`, `Error` and `Killed` are terminal: no further transitions
/// occur and polling stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted but not yet running (the engine also reports a short
    /// provisioning phase under this state)
    #[serde(alias = "booting")]
    Queued,
    /// Executing
    Running,
    /// Completed; the result body and schema are available
    Success,
    /// Failed remotely; the debug payload carries diagnostics
    Error,
    /// Cancelled remotely before completion
    Killed,
}

impl JobStatus {
    /// `true` once no further status transitions can occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Killed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
            Self::Killed => "killed",
        };
        f.write_str(s)
    }
}

/// Diagnostic payload attached to a failed job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobDebug {
    /// Engine command output, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmdout: Option<String>,

    /// Engine stderr, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl JobDebug {
    /// Best human-readable diagnostic line, preferring stderr
    pub fn message(&self) -> String {
        self.stderr
            .as_deref()
            .or(self.cmdout.as_deref())
            .unwrap_or("no diagnostics reported")
            .to_string()
    }
}

/// One response from the job-status call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    /// Job id (echoed by the engine)
    pub job_id: String,

    /// Current lifecycle state
    pub status: JobStatus,

    /// Result-schema descriptor, present only once the job succeeded.
    /// JSON text of the form `[["name","string"],["score","int"]]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_schema: Option<String>,

    /// Diagnostics, present on error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<JobDebug>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_type_parse() {
        assert_eq!(EngineType::parse("hive"), Some(EngineType::Hive));
        assert_eq!(EngineType::parse("PRESTO"), Some(EngineType::Presto));
        assert_eq!(EngineType::parse("spark"), None);
    }

    #[test]
    fn test_status_terminal_states() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Success.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(JobStatus::Killed.is_terminal());
    }

    #[test]
    fn test_status_response_deserialization() {
        let json = r#"{
            "job_id": "12345",
            "status": "success",
            "result_schema": "[[\"name\",\"string\"],[\"score\",\"int\"]]"
        }"#;
        let resp: JobStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.job_id, "12345");
        assert_eq!(resp.status, JobStatus::Success);
        assert!(resp.result_schema.is_some());
        assert!(resp.debug.is_none());
    }

    #[test]
    fn test_booting_maps_to_queued() {
        let json = r#"{"job_id": "1", "status": "booting"}"#;
        let resp: JobStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, JobStatus::Queued);
    }
}
