//! # Job Registry
//!
//! Process-wide map from [`JobId`] to job state. The registry is an explicit
//! object injected into the coordinator, the chunk processor and the streamer.
//!
//! Each entry guards its [`JobRecord`] with its own mutex, so the
//! increment-and-compare on chunk completion is a single critical section per
//! job while unrelated jobs never contend (the map itself is sharded by
//! `DashMap`). Every mutation is also pushed to a `watch` channel so
//! subscribers observe terminal transitions without waiting for a poll.

use super::state::{JobId, JobRecord, JobSnapshot, JobStatus};
use crate::constants::events;
use crate::error::{CollectionsError, Result};
use crate::logging::log_job_operation;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct JobEntry {
    record: Mutex<JobRecord>,
    updates: watch::Sender<JobSnapshot>,
    cancellation: CancellationToken,
}

impl JobEntry {
    fn new(record: JobRecord) -> Self {
        let (updates, _) = watch::channel(record.snapshot());
        Self {
            record: Mutex::new(record),
            updates,
            cancellation: CancellationToken::new(),
        }
    }
}

/// Registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total_jobs: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: DashMap<JobId, Arc<JobEntry>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job; a job with no chunks is created already completed
    pub fn create_job(&self, chunks_total: usize) -> JobId {
        let job_id = JobId::new();
        let record = JobRecord::new(job_id, chunks_total);
        let status = record.status;
        self.jobs.insert(job_id, Arc::new(JobEntry::new(record)));

        log_job_operation(
            events::JOB_CREATED,
            &job_id.to_string(),
            &status.to_string(),
            0,
            chunks_total,
            None,
        );
        job_id
    }

    fn entry(&self, job_id: JobId) -> Result<Arc<JobEntry>> {
        self.jobs
            .get(&job_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CollectionsError::not_found("job", job_id))
    }

    /// Record one finished chunk
    ///
    /// Exactly one caller observes the `InProgress -> Completed` transition.
    /// Reports against a terminal job are ignored, which keeps the counters
    /// frozen once a job has failed or been cancelled.
    pub fn report_chunk_complete(&self, job_id: JobId) -> Result<JobSnapshot> {
        let entry = self.entry(job_id)?;

        let (snapshot, transitioned) = {
            let mut record = entry.record.lock();
            let mut transitioned = false;

            if record.status.is_active() {
                record.chunks_processed += 1;
                if record.chunks_processed >= record.chunks_total {
                    record.status = JobStatus::Completed;
                    record.finished_at = Some(Utc::now());
                    transitioned = true;
                }
                entry.updates.send_replace(record.snapshot());
            } else {
                debug!(
                    job_id = %job_id,
                    status = %record.status,
                    "Ignoring chunk completion for finished job"
                );
            }

            (record.snapshot(), transitioned)
        };

        if transitioned {
            log_job_operation(
                events::JOB_COMPLETED,
                &job_id.to_string(),
                &snapshot.status.to_string(),
                snapshot.chunks_processed,
                snapshot.chunks_total,
                None,
            );
        }
        Ok(snapshot)
    }

    /// Mark the job failed, keeping the first error reported
    pub fn report_chunk_failed(&self, job_id: JobId, error: &str) -> Result<JobSnapshot> {
        let entry = self.entry(job_id)?;

        let (snapshot, transitioned) = {
            let mut record = entry.record.lock();
            let transitioned = record.status.is_active();
            if transitioned {
                record.status = JobStatus::Failed;
                record.error = Some(error.to_string());
                record.finished_at = Some(Utc::now());
                entry.updates.send_replace(record.snapshot());
            }
            (record.snapshot(), transitioned)
        };

        if transitioned {
            warn!(job_id = %job_id, error = %error, "Job failed");
            log_job_operation(
                events::JOB_FAILED,
                &job_id.to_string(),
                &snapshot.status.to_string(),
                snapshot.chunks_processed,
                snapshot.chunks_total,
                Some(error),
            );
        }
        Ok(snapshot)
    }

    /// Abandon an in-progress job; queued chunks observe the cancellation token
    pub fn cancel_job(&self, job_id: JobId) -> Result<JobSnapshot> {
        let entry = self.entry(job_id)?;

        let (snapshot, transitioned) = {
            let mut record = entry.record.lock();
            let transitioned = record.status.is_active();
            if transitioned {
                record.status = JobStatus::Cancelled;
                record.finished_at = Some(Utc::now());
                entry.updates.send_replace(record.snapshot());
            }
            (record.snapshot(), transitioned)
        };

        if transitioned {
            entry.cancellation.cancel();
            log_job_operation(
                events::JOB_CANCELLED,
                &job_id.to_string(),
                &snapshot.status.to_string(),
                snapshot.chunks_processed,
                snapshot.chunks_total,
                None,
            );
        }
        Ok(snapshot)
    }

    pub fn get_job(&self, job_id: JobId) -> Result<JobSnapshot> {
        let entry = self.entry(job_id)?;
        let snapshot = entry.record.lock().snapshot();
        Ok(snapshot)
    }

    /// Push channel carrying every snapshot change of the job
    pub fn subscribe(&self, job_id: JobId) -> Result<watch::Receiver<JobSnapshot>> {
        Ok(self.entry(job_id)?.updates.subscribe())
    }

    pub fn cancellation_token(&self, job_id: JobId) -> Result<CancellationToken> {
        Ok(self.entry(job_id)?.cancellation.clone())
    }

    pub fn contains(&self, job_id: JobId) -> bool {
        self.jobs.contains_key(&job_id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats::default();
        for entry in self.jobs.iter() {
            stats.total_jobs += 1;
            match entry.value().record.lock().status {
                JobStatus::InProgress => stats.in_progress += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    /// Remove terminal jobs that finished at least `retention` ago
    ///
    /// In-progress jobs are never evicted.
    pub fn evict_finished(&self, retention: Duration) -> usize {
        // A retention too large for chrono never expires anything
        let cutoff = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|retention| Utc::now().checked_sub_signed(retention));

        let before = self.jobs.len();
        self.jobs.retain(|job_id, entry| {
            let record = entry.record.lock();
            let expired = match (record.finished_at, cutoff) {
                (Some(finished_at), Some(cutoff)) => finished_at <= cutoff,
                _ => false,
            };
            if expired {
                debug!(job_id = %job_id, status = %record.status, "Evicting finished job");
            }
            !expired
        });

        let evicted = before.saturating_sub(self.jobs.len());
        if evicted > 0 {
            info!(
                operation = events::JOB_EVICTED,
                evicted = evicted,
                remaining = self.jobs.len(),
                "Evicted finished jobs"
            );
        }
        evicted
    }

    /// Periodically evict finished jobs until `shutdown` fires
    pub fn spawn_retention_sweeper(
        self: Arc<Self>,
        retention: Duration,
        sweep_interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Job retention sweeper stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        self.evict_finished(retention);
                    }
                }
            }
        })
    }
}
