//! Timeout configuration for Quarry client operations.
//!
//! Centralizes every duration the driver uses: HTTP connect/receive/send
//! timeouts and the job status poll cadence.

use std::time::Duration;

/// Timeout configuration for Quarry client operations.
///
/// All values have sensible defaults. Job polling deliberately has no
/// backoff and no attempt cap: a job runs as long as it runs, and the
/// only bounds on waiting are the per-call deadline and the caller
/// dropping the wait.
///
/// # Examples
///
/// ```rust
/// use quarry_link::QuarryLinkTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = QuarryLinkTimeouts::default();
///
/// // Custom poll cadence for latency-sensitive tests
/// let timeouts = QuarryLinkTimeouts::builder()
///     .poll_interval(Duration::from_millis(100))
///     .build();
///
/// // Aggressive timeouts for local development
/// let timeouts = QuarryLinkTimeouts::fast();
/// ```
#[derive(Debug, Clone)]
pub struct QuarryLinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for receiving a response after a request is sent.
    /// Result-body fetches can be large, so this is the generous one.
    /// Default: 60 seconds
    pub receive_timeout: Duration,

    /// Timeout for sending data to the engine.
    /// Default: 10 seconds
    pub send_timeout: Duration,

    /// Interval between job-status polls while a job is queued or running.
    /// Fixed cadence, no backoff. Default: 2 seconds
    pub poll_interval: Duration,

    /// How long a cached server-status response stays fresh.
    /// Default: 10 seconds
    pub status_cache_ttl: Duration,
}

impl Default for QuarryLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(60),
            send_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(2),
            status_cache_ttl: Duration::from_secs(10),
        }
    }
}

impl QuarryLinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> QuarryLinkTimeoutsBuilder {
        QuarryLinkTimeoutsBuilder::new()
    }

    /// Create timeouts optimized for fast local development.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            receive_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(200),
            status_cache_ttl: Duration::from_secs(2),
        }
    }

    /// Create timeouts optimized for high-latency or unreliable networks.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            receive_timeout: Duration::from_secs(300),
            send_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
            status_cache_ttl: Duration::from_secs(30),
        }
    }

    /// Check if a duration represents "no timeout" (zero or very large).
    pub fn is_no_timeout(duration: Duration) -> bool {
        duration.is_zero() || duration > Duration::from_secs(86400 * 365)
    }
}

/// Builder for creating custom [`QuarryLinkTimeouts`] configurations.
#[derive(Debug, Clone)]
pub struct QuarryLinkTimeoutsBuilder {
    timeouts: QuarryLinkTimeouts,
}

impl QuarryLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: QuarryLinkTimeouts::default(),
        }
    }

    /// Set the connection timeout (TCP + TLS handshake).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the connection timeout in seconds.
    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    /// Set the receive timeout (waiting for a response body).
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.receive_timeout = timeout;
        self
    }

    /// Set the receive timeout in seconds.
    pub fn receive_timeout_secs(self, secs: u64) -> Self {
        self.receive_timeout(Duration::from_secs(secs))
    }

    /// Set the send timeout (writing data to the socket).
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.send_timeout = timeout;
        self
    }

    /// Set the send timeout in seconds.
    pub fn send_timeout_secs(self, secs: u64) -> Self {
        self.send_timeout(Duration::from_secs(secs))
    }

    /// Set the job-status poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.timeouts.poll_interval = interval;
        self
    }

    /// Set the job-status poll interval in seconds.
    pub fn poll_interval_secs(self, secs: u64) -> Self {
        self.poll_interval(Duration::from_secs(secs))
    }

    /// Set the server-status cache TTL.
    pub fn status_cache_ttl(mut self, ttl: Duration) -> Self {
        self.timeouts.status_cache_ttl = ttl;
        self
    }

    /// Build the timeout configuration.
    pub fn build(self) -> QuarryLinkTimeouts {
        self.timeouts
    }
}
