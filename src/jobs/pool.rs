//! # Bounded Worker Pool
//!
//! Global admission gate for chunk execution. A single semaphore caps the
//! number of chunks executing at once across every job; submission never
//! blocks the caller and never rejects work, it only defers it until a permit
//! is free. Tokio's semaphore grants permits in FIFO order, so a waiting task
//! is admitted after at most the tasks queued ahead of it.
//!
//! A task still waiting for a permit gives up when its job's cancellation
//! token (or the pool's shutdown token) fires. Permits are owned by the running
//! task and released on drop, including on panic.

use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// How a submitted task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Executed,
    /// Cancelled before a permit was acquired; the task body never ran
    Cancelled,
}

/// Point-in-time pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub max_concurrency: usize,
    pub available_permits: usize,
    pub queued: usize,
    pub in_flight: usize,
}

/// Decrements a gauge when dropped
struct GaugeGuard(Arc<AtomicUsize>);

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct ChunkWorkerPool {
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
    queued: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

impl ChunkWorkerPool {
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        info!(max_concurrency = max_concurrency, "🏊 POOL: Chunk worker pool created");

        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
            queued: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Queue `task` for execution under a pool permit and return immediately
    pub fn submit<F>(&self, cancellation: CancellationToken, task: F) -> JoinHandle<TaskOutcome>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        let in_flight = Arc::clone(&self.in_flight);
        let shutdown = self.shutdown.clone();

        self.queued.fetch_add(1, Ordering::SeqCst);
        let queued = GaugeGuard(Arc::clone(&self.queued));

        tokio::spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = cancellation.cancelled() => None,
                _ = shutdown.cancelled() => None,
                permit = semaphore.acquire_owned() => permit.ok(),
            };
            drop(queued);

            let Some(_permit) = permit else {
                debug!("Pool task cancelled before admission");
                return TaskOutcome::Cancelled;
            };

            in_flight.fetch_add(1, Ordering::SeqCst);
            let _running = GaugeGuard(in_flight);
            task.await;
            TaskOutcome::Executed
        })
    }

    /// Stop admitting queued tasks; running tasks finish normally
    pub fn shutdown(&self) {
        info!(
            queued = self.queued.load(Ordering::SeqCst),
            in_flight = self.in_flight.load(Ordering::SeqCst),
            "🛑 POOL: Shutting down chunk worker pool"
        );
        self.shutdown.cancel();
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            max_concurrency: self.max_concurrency,
            available_permits: self.semaphore.available_permits(),
            queued: self.queued.load(Ordering::SeqCst),
            in_flight: self.in_flight.load(Ordering::SeqCst),
        }
    }
}
