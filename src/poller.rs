//! Job status polling.
//!
//! A submitted job runs remotely for anywhere between milliseconds and
//! hours. [`JobStatusPoller`] drives the status state machine to a
//! terminal state: poll, sleep a fixed interval, poll again. This wait is
//! the dominant source of wall-clock latency in the driver and the reason
//! `execute` blocks its caller until the job finishes.

use crate::error::{QuarryLinkError, Result};
use crate::models::{JobHandle, JobStatus, ResultSchema};
use crate::transport::EngineTransport;
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a successfully completed job: identity plus the result
/// schema resolved from the final status response.
#[derive(Debug, Clone)]
pub struct JobCompletion {
    /// Engine-assigned job id
    pub job_id: String,

    /// Column schema of the result, parsed from the status response's
    /// schema descriptor. Empty when the engine reported none.
    pub schema: ResultSchema,
}

/// Polls a submitted job until it reaches a terminal state.
///
/// The cadence is a fixed interval with no backoff and no attempt cap
/// (see [`QuarryLinkTimeouts::poll_interval`]); waiting is bounded only
/// by the caller's deadline, or by dropping the returned future, which
/// abandons the local wait without touching the remote job.
///
/// [`QuarryLinkTimeouts::poll_interval`]: crate::QuarryLinkTimeouts
pub struct JobStatusPoller {
    transport: Arc<dyn EngineTransport>,
    poll_interval: Duration,
}

impl JobStatusPoller {
    pub fn new(transport: Arc<dyn EngineTransport>, poll_interval: Duration) -> Self {
        Self {
            transport,
            poll_interval,
        }
    }

    /// Wait for the job to reach a terminal state.
    ///
    /// - `Success` resolves the result schema and returns.
    /// - `Error` fails with [`QuarryLinkError::JobFailed`] carrying the
    ///   engine's diagnostics; `Killed` fails with
    ///   [`QuarryLinkError::JobKilled`]. Neither is retried.
    /// - A non-terminal status sleeps one poll interval and polls again.
    /// - When `deadline` is exceeded the wait fails with
    ///   [`QuarryLinkError::TimeoutError`] before any further network
    ///   call. The remote job keeps running.
    ///
    /// Transport errors propagate unchanged; retrying them is the
    /// transport's concern, not the poller's.
    pub async fn await_completion(
        &self,
        handle: &JobHandle,
        deadline: Option<Duration>,
    ) -> Result<JobCompletion> {
        let job_id = handle.job_id();
        let started = Instant::now();

        loop {
            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    return Err(QuarryLinkError::TimeoutError(format!(
                        "job {} still not finished after {:?}",
                        job_id, limit
                    )));
                }
            }

            let response = self.transport.job_status(job_id).await?;
            match response.status {
                JobStatus::Success => {
                    let schema = match response.result_schema.as_deref() {
                        Some(descriptor) => ResultSchema::parse_descriptor(descriptor)?,
                        None => ResultSchema::default(),
                    };
                    debug!(
                        "[JOB_POLL] job_id={} finished after {:?} with {} columns",
                        job_id,
                        started.elapsed(),
                        schema.len()
                    );
                    return Ok(JobCompletion {
                        job_id: job_id.to_string(),
                        schema,
                    });
                }
                JobStatus::Error => {
                    let message = response
                        .debug
                        .map(|d| d.message())
                        .unwrap_or_else(|| "no diagnostics reported".to_string());
                    return Err(QuarryLinkError::JobFailed {
                        job_id: job_id.to_string(),
                        message,
                    });
                }
                JobStatus::Killed => {
                    return Err(QuarryLinkError::JobKilled {
                        job_id: job_id.to_string(),
                    });
                }
                JobStatus::Queued | JobStatus::Running => {
                    debug!(
                        "[JOB_POLL] job_id={} status={}, sleeping {:?}",
                        job_id, response.status, self.poll_interval
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}
