//! # System Constants
//!
//! Operational defaults and event names shared by the job subsystem, the
//! membership cache and the web layer.

// Re-export status type for convenience
pub use crate::jobs::state::JobStatus;

/// Job lifecycle events, used as the `operation` field of structured logs
pub mod events {
    pub const JOB_CREATED: &str = "job.created";
    pub const JOB_COMPLETED: &str = "job.completed";
    pub const JOB_FAILED: &str = "job.failed";
    pub const JOB_CANCELLED: &str = "job.cancelled";
    pub const JOB_EVICTED: &str = "job.evicted";

    pub const CHUNK_SUBMITTED: &str = "chunk.submitted";
    pub const CHUNK_PROCESSED: &str = "chunk.processed";
    pub const CHUNK_FAILED: &str = "chunk.failed";
    pub const CHUNK_SKIPPED: &str = "chunk.skipped";

    pub const CACHE_REFRESHED: &str = "cache.refreshed";
    pub const CACHE_REFRESH_FAILED: &str = "cache.refresh_failed";
    pub const CACHE_FLUSHED: &str = "cache.flushed";
}

/// System-wide defaults
pub mod system {
    /// Ids per chunk for bulk moves
    pub const DEFAULT_CHUNK_SIZE: usize = 100;

    /// Concurrent chunk executions across all jobs
    pub const DEFAULT_MAX_CONCURRENT_CHUNKS: usize = 5;

    pub const DEFAULT_STATUS_POLL_INTERVAL_MS: u64 = 2_000;

    pub const DEFAULT_MAX_STREAM_LIFETIME_SECS: u64 = 3_600;

    /// Upper bound for any configured interval or lifetime (one week)
    pub const MAX_CONFIGURED_DURATION_SECS: u64 = 7 * 24 * 3_600;

    /// Finished jobs stay visible this long before eviction
    pub const DEFAULT_JOB_RETENTION_SECS: u64 = 900;

    pub const DEFAULT_RETENTION_SWEEP_INTERVAL_SECS: u64 = 60;

    pub const DEFAULT_PAGE_LIMIT: usize = 10;

    /// Name of the collection whose members are flagged `liked`
    pub const LIKED_COLLECTION_NAME: &str = "Liked Companies";

    pub const COLLECTIONS_CORE_VERSION: &str = "0.1.0";
}

/// Job status groupings
pub mod status_groups {
    use super::JobStatus;

    pub const JOB_FINAL_STATES: &[JobStatus] = &[
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Cancelled,
    ];

    pub const JOB_ACTIVE_STATES: &[JobStatus] = &[JobStatus::InProgress];
}
