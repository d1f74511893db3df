#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Collections Core
//!
//! Company collection service with chunked background migration of
//! companies between collections.
//!
//! ## Overview
//!
//! Moving thousands of companies into a collection is too slow for a single
//! request. A bulk move is split into fixed-size chunks that run in the
//! background under a global concurrency ceiling, while clients follow the
//! job's progress over a server-sent event stream. A per-collection membership
//! cache keeps collection pages cheap and is refreshed after every chunk.
//!
//! ## Module Organization
//!
//! - [`jobs`] - Chunk planning, job registry, worker pool, chunk processing, status streaming
//! - [`cache`] - Per-collection membership cache
//! - [`store`] - Membership and catalog store traits with in-memory and PostgreSQL back-ends
//! - [`services`] - Collection pages, company listing and single-company moves
//! - [`web`] - axum HTTP API
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collections_core::config::CollectionsConfig;
//! use collections_core::models::MoveMultipleRequest;
//! use collections_core::store::InMemoryStore;
//! use collections_core::web::AppState;
//! use std::sync::Arc;
//!
//! # async fn example() -> collections_core::Result<()> {
//! let store = Arc::new(InMemoryStore::new());
//! store.seed_companies(1_000);
//! let source = store.create_collection("My List");
//! let target = store.create_collection("Liked Companies");
//!
//! let state = AppState::new(CollectionsConfig::default(), store);
//! let accepted = state
//!     .coordinator
//!     .move_multiple(MoveMultipleRequest {
//!         company_ids: (1..=1_000).collect(),
//!         source_collection: source.id,
//!         target_collection: target.id,
//!     })
//!     .await?;
//!
//! println!("job {} runs {} chunks", accepted.job_id, accepted.chunks);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod web;

pub use cache::{CacheStats, MembershipCache};
pub use config::CollectionsConfig;
pub use constants::{events as system_events, status_groups, system};
pub use error::{CollectionsError, Result};
pub use jobs::{
    BulkMoveCoordinator, ChunkWorkerPool, JobId, JobRegistry, JobSnapshot, JobStatus,
    JobStatusStreamer,
};
pub use store::{CatalogStore, InMemoryStore, MembershipStore, PgStore};
