//! # Job Status Streamer
//!
//! Turns registry state into a live sequence of [`JobSnapshot`]s for one
//! subscriber. A snapshot is emitted on subscribe and then once per polling
//! interval. The task also waits on the registry's push channel, so the
//! terminal snapshot goes out as soon as the job finishes rather than on the
//! next tick. The stream closes after the terminal snapshot, when the lifetime
//! cap expires, when the client goes away, or when the job is evicted.
//!
//! Each subscription owns its own task and channel; nothing is shared between
//! subscribers of the same job.

use super::registry::JobRegistry;
use super::state::{JobId, JobSnapshot};
use crate::config::StreamingConfig;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

const STREAM_BUFFER: usize = 16;

#[derive(Debug, Clone)]
pub struct JobStatusStreamer {
    registry: Arc<JobRegistry>,
    poll_interval: Duration,
    max_lifetime: Duration,
}

impl JobStatusStreamer {
    pub fn new(registry: Arc<JobRegistry>, poll_interval: Duration, max_lifetime: Duration) -> Self {
        Self {
            registry,
            poll_interval,
            max_lifetime,
        }
    }

    pub fn from_config(registry: Arc<JobRegistry>, config: &StreamingConfig) -> Self {
        Self::new(registry, config.poll_interval(), config.max_stream_lifetime())
    }

    /// Start an independent snapshot stream for `job_id`
    ///
    /// Unknown jobs fail immediately with `NotFound`.
    pub fn subscribe(&self, job_id: JobId) -> Result<ReceiverStream<JobSnapshot>> {
        let mut updates = self.registry.subscribe(job_id)?;
        let registry = Arc::clone(&self.registry);
        let poll_interval = self.poll_interval;
        // A lifetime past the clock's range means no cap
        let deadline = Instant::now().checked_add(self.max_lifetime);

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        info!(job_id = %job_id, "Starting job status stream");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                let Ok(snapshot) = registry.get_job(job_id) else {
                    debug!(job_id = %job_id, "Job evicted; closing status stream");
                    break;
                };
                let terminal = snapshot.status.is_terminal();

                if tx.send(snapshot).await.is_err() {
                    debug!(job_id = %job_id, "Status stream subscriber disconnected");
                    break;
                }
                if terminal {
                    debug!(job_id = %job_id, "Job finished; closing status stream");
                    break;
                }

                tokio::select! {
                    _ = interval.tick() => {}
                    // A dropped sender (eviction) also ends the wait
                    _ = updates.wait_for(|s| s.status.is_terminal()) => {}
                    _ = lifetime_expired(deadline) => {
                        info!(job_id = %job_id, "Status stream reached its lifetime cap");
                        break;
                    }
                    _ = tx.closed() => {
                        debug!(job_id = %job_id, "Status stream subscriber disconnected");
                        break;
                    }
                }
            }
        });

        Ok(ReceiverStream::new(rx))
    }
}

async fn lifetime_expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
