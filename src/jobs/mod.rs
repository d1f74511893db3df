//! # Bulk Move Jobs
//!
//! Chunked background migration of companies into a collection:
//!
//! - [`planner`] splits the id list into ordered chunks
//! - [`registry`] tracks per-job progress and terminal status
//! - [`pool`] bounds how many chunks execute at once across all jobs
//! - [`processor`] applies one chunk to the store and refreshes the cache
//! - [`streamer`] turns job progress into a stream of snapshots
//! - [`coordinator`] ties these together behind `move_multiple` / `move_all`

pub mod coordinator;
pub mod planner;
pub mod pool;
pub mod processor;
pub mod registry;
pub mod state;
pub mod streamer;

pub use coordinator::BulkMoveCoordinator;
pub use planner::{plan_chunks, ChunkPlan};
pub use pool::{ChunkWorkerPool, PoolStats, TaskOutcome};
pub use processor::{ChunkOutcome, ChunkProcessor};
pub use registry::{JobRegistry, RegistryStats};
pub use state::{JobId, JobRecord, JobSnapshot, JobStatus};
pub use streamer::JobStatusStreamer;
