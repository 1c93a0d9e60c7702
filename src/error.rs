//! Error types for Quarry client operations.

use thiserror::Error;

/// Result type for quarry-link operations
pub type Result<T> = std::result::Result<T, QuarryLinkError>;

/// Errors that can occur when talking to a Quarry engine or consuming
/// a result set.
#[derive(Debug, Error)]
pub enum QuarryLinkError {
    /// Invalid client or connection configuration
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// Authentication failed or credentials are missing
    #[error("authentication error: {0}")]
    AuthenticationError(String),

    /// Network-level failure talking to the engine
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The engine rejected a request with a non-success HTTP status
    #[error("server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// A request or response payload could not be (de)serialized
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The remote job reached the ERROR state
    #[error("job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    /// The remote job was killed before completion
    #[error("job {job_id} was killed")]
    JobKilled { job_id: String },

    /// A caller-supplied deadline expired while waiting for the job.
    /// The remote job is left in whatever state it was in.
    #[error("timed out: {0}")]
    TimeoutError(String),

    /// The result body did not decode as the expected framed row stream
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// A value could not be coerced to the requested column type
    #[error("cannot convert column {column} value {value} to {target}")]
    TypeMismatch {
        column: usize,
        target: &'static str,
        value: String,
    },

    /// Out-of-range column index, unknown column name, or access before
    /// the first row
    #[error("invalid column: {0}")]
    InvalidColumn(String),

    /// Internal invariant violation (should not happen)
    #[error("internal error: {0}")]
    InternalError(String),
}

impl QuarryLinkError {
    /// `true` for errors produced by a terminal job state (ERROR or KILLED).
    /// These are never retried: the job will not change state again.
    pub fn is_terminal_job_error(&self) -> bool {
        matches!(self, Self::JobFailed { .. } | Self::JobKilled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuarryLinkError::JobFailed {
            job_id: "12345".to_string(),
            message: "out of memory".to_string(),
        };
        assert_eq!(err.to_string(), "job 12345 failed: out of memory");

        let err = QuarryLinkError::TypeMismatch {
            column: 2,
            target: "timestamp",
            value: "\"abc\"".to_string(),
        };
        assert!(err.to_string().contains("column 2"));
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_terminal_job_errors() {
        let failed = QuarryLinkError::JobFailed {
            job_id: "1".to_string(),
            message: String::new(),
        };
        let killed = QuarryLinkError::JobKilled {
            job_id: "1".to_string(),
        };
        let timeout = QuarryLinkError::TimeoutError("deadline".to_string());

        assert!(failed.is_terminal_job_error());
        assert!(killed.is_terminal_job_error());
        assert!(!timeout.is_terminal_job_error());
    }
}
