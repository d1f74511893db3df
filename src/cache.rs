//! # Membership Cache
//!
//! Read-through cache of each collection's member summaries. An entry is an
//! immutable `Arc<[CompanySummary]>` that a refresh replaces wholesale, so a
//! reader holds either the old list or the new one, never a mix.
//!
//! Refreshes of the same collection are serialized by a per-collection async
//! lock around the store read and the swap. Without it a slow refresh that read
//! the store early could land after a newer one and hide the newer chunk's
//! companies. Refreshes of different collections run in parallel.

use crate::constants::events;
use crate::error::{CollectionsError, Result};
use crate::logging::log_cache_operation;
use crate::models::{CollectionId, CompanySummary};
use crate::store::MembershipStore;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{instrument, warn};

pub type CachedMembers = Arc<[CompanySummary]>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
}

pub struct MembershipCache {
    store: Arc<dyn MembershipStore>,
    entries: DashMap<CollectionId, CachedMembers>,
    refresh_locks: DashMap<CollectionId, Arc<tokio::sync::Mutex<()>>>,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    refresh_failures: AtomicU64,
}

impl std::fmt::Debug for MembershipCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipCache")
            .field("store", &"Arc<dyn MembershipStore>")
            .field("entries", &self.entries.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl MembershipCache {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self::with_enabled(store, true)
    }

    /// A disabled cache never stores entries; every read goes to the store
    pub fn with_enabled(store: Arc<dyn MembershipStore>, enabled: bool) -> Self {
        Self {
            store,
            entries: DashMap::new(),
            refresh_locks: DashMap::new(),
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            refresh_failures: AtomicU64::new(0),
        }
    }

    /// Cached members, or `None` on a miss
    pub fn get(&self, collection_id: CollectionId) -> Option<CachedMembers> {
        let cached = self
            .entries
            .get(&collection_id)
            .map(|entry| Arc::clone(entry.value()));

        match cached {
            Some(members) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(members)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Read path for collection pages: serve a hit, populate synchronously on a miss
    pub async fn get_or_load(&self, collection_id: CollectionId) -> Result<CachedMembers> {
        if let Some(members) = self.get(collection_id) {
            return Ok(members);
        }
        self.refresh(collection_id).await
    }

    /// Recompute the entry from the store and swap it in
    #[instrument(skip(self), fields(collection_id = %collection_id))]
    pub async fn refresh(&self, collection_id: CollectionId) -> Result<CachedMembers> {
        let lock = self
            .refresh_locks
            .entry(collection_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let _serialized = lock.lock().await;

        let members: CachedMembers = match self.store.all_entities_in(collection_id).await {
            Ok(members) => members.into(),
            Err(err) => {
                self.refresh_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "Membership cache refresh failed");
                log_cache_operation(
                    events::CACHE_REFRESH_FAILED,
                    Some(&collection_id.to_string()),
                    None,
                );
                return Err(CollectionsError::CacheFailure(err.to_string()));
            }
        };

        if self.enabled {
            self.entries.insert(collection_id, Arc::clone(&members));
        }
        self.refreshes.fetch_add(1, Ordering::Relaxed);

        log_cache_operation(
            events::CACHE_REFRESHED,
            Some(&collection_id.to_string()),
            Some(members.len()),
        );
        Ok(members)
    }

    /// Drop every entry; later reads miss and repopulate
    pub fn flush_all(&self) -> usize {
        let flushed = self.entries.len();
        self.entries.clear();
        log_cache_operation(events::CACHE_FLUSHED, None, Some(flushed));
        flushed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
        }
    }
}
