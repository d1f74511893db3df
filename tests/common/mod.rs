#![allow(dead_code)]

pub mod builders;
pub mod stores;
pub mod strategies;

pub use builders::*;
pub use stores::*;

use collections_core::jobs::{JobId, JobRegistry, JobSnapshot};
use std::time::Duration;

/// Wait (bounded) until the job reaches a terminal status
pub async fn wait_for_terminal(registry: &JobRegistry, job_id: JobId) -> JobSnapshot {
    let mut updates = registry.subscribe(job_id).expect("job should exist");
    let snapshot = tokio::time::timeout(
        Duration::from_secs(10),
        updates.wait_for(|s| s.status.is_terminal()),
    )
    .await
    .expect("job did not finish in time")
    .expect("job was evicted while waiting")
    .clone();
    snapshot
}
