//! End-to-end bulk move scenarios over the wired application state.

mod common;

use collections_core::error::CollectionsError;
use collections_core::jobs::{JobId, JobSnapshot, JobStatus};
use collections_core::models::{MoveAllRequest, MoveMultipleRequest};
use collections_core::store::MembershipStore;
use common::*;
use std::collections::HashSet;
use std::time::Duration;
use tokio_stream::StreamExt;

fn assert_monotonic(snapshots: &[JobSnapshot]) {
    assert!(
        snapshots
            .windows(2)
            .all(|w| w[0].chunks_processed <= w[1].chunks_processed),
        "progress went backwards: {snapshots:?}"
    );
}

#[tokio::test]
async fn test_move_250_with_30_already_present() {
    let env = TestEnvBuilder::new().with_chunk_size(100).build();
    env.add_members(env.target, 1..=30).await;

    let accepted = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (1..=250).collect(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();
    assert_eq!(accepted.chunks, 3);

    let snapshots: Vec<_> = env
        .state
        .streamer
        .subscribe(accepted.job_id)
        .unwrap()
        .collect()
        .await;

    let last = snapshots.last().unwrap();
    assert_eq!(last.status, JobStatus::Completed);
    assert_eq!(last.chunks_processed, 3);
    assert_eq!(last.chunks_total, 3);
    assert_monotonic(&snapshots);
    assert_eq!(env.member_count(env.target).await, 250);
}

#[tokio::test]
async fn test_unknown_job_stream_is_not_found() {
    let env = TestEnvBuilder::new().build();
    let result = env.state.streamer.subscribe(JobId::new());
    assert!(matches!(result, Err(CollectionsError::NotFound { .. })));
}

#[tokio::test]
async fn test_empty_move_is_completed_with_zero_chunks() {
    let env = TestEnvBuilder::new().build();
    let accepted = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: Vec::new(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();

    let snapshots: Vec<_> = env
        .state
        .streamer
        .subscribe(accepted.job_id)
        .unwrap()
        .collect()
        .await;

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].status, JobStatus::Completed);
    assert_eq!(snapshots[0].chunks_total, 0);
    assert_eq!(snapshots[0].chunks_processed, 0);
}

#[tokio::test]
async fn test_store_failure_streams_failed_snapshot() {
    let (env, _store) = TestEnvBuilder::new()
        .with_chunk_size(100)
        .with_max_concurrent_chunks(1)
        .build_with(|inner| FailingStore::new(inner, [150]));

    let accepted = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (1..=300).collect(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();

    let snapshots: Vec<_> = env
        .state
        .streamer
        .subscribe(accepted.job_id)
        .unwrap()
        .collect()
        .await;

    let last = snapshots.last().unwrap();
    assert_eq!(last.status, JobStatus::Failed);
    assert!(last.error.as_deref().unwrap().contains("150"));
    assert!(last.chunks_processed < last.chunks_total);

    // The failed chunk wrote nothing
    let members: HashSet<_> = env.store.member_ids(env.target).await.unwrap().into_iter().collect();
    assert!((101..=200).all(|id| !members.contains(&id)));
}

#[tokio::test]
async fn test_cancelled_job_stops_queued_chunks() {
    let (env, store) = TestEnvBuilder::new()
        .with_chunk_size(10)
        .with_max_concurrent_chunks(1)
        .build_with(|inner| TrackingStore::new(inner, Duration::from_millis(50)));

    let accepted = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (1..=100).collect(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();
    assert_eq!(accepted.chunks, 10);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let snapshot = env.state.coordinator.cancel(accepted.job_id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Cancelled);

    // Give any in-flight chunk time to finish
    tokio::time::sleep(Duration::from_millis(200)).await;

    let writes = store.total_writes();
    assert!(writes < 10, "queued chunks ran after cancellation: {writes}");
    let final_snapshot = env.state.registry.get_job(accepted.job_id).unwrap();
    assert_eq!(final_snapshot.status, JobStatus::Cancelled);
    assert!(final_snapshot.chunks_processed < 10);
    assert_eq!(env.state.pool.stats().queued, 0);
}

#[tokio::test]
async fn test_pool_ceiling_shared_across_jobs() {
    let (env, store) = TestEnvBuilder::new()
        .with_chunk_size(5)
        .with_max_concurrent_chunks(3)
        .build_with(|inner| TrackingStore::new(inner, Duration::from_millis(10)));

    let first = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (1..=100).collect(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();
    let second = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (101..=200).collect(),
            source_collection: env.source,
            target_collection: env.liked,
        })
        .await
        .unwrap();

    let a = wait_for_terminal(&env.state.registry, first.job_id).await;
    let b = wait_for_terminal(&env.state.registry, second.job_id).await;

    assert_eq!(a.status, JobStatus::Completed);
    assert_eq!(b.status, JobStatus::Completed);
    assert!(store.peak_concurrent_writes() <= 3);
    assert_eq!(store.total_writes(), 40);
}

#[tokio::test]
async fn test_concurrent_chunk_completion_counts_every_chunk() {
    let env = TestEnvBuilder::new()
        .with_chunk_size(1)
        .with_max_concurrent_chunks(8)
        .build();

    let accepted = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (1..=64).collect(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();

    let snapshot = wait_for_terminal(&env.state.registry, accepted.job_id).await;
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.chunks_processed, 64);
    assert_eq!(snapshot.chunks_total, 64);
}

#[tokio::test]
async fn test_cache_holds_moved_companies_after_completion() {
    let env = TestEnvBuilder::new().with_chunk_size(40).build();

    // Warm the cache before the move so a stale entry would show
    let before = env
        .state
        .collections
        .get_collection_page(env.target, 0, 10)
        .await
        .unwrap();
    assert_eq!(before.total, 0);

    let accepted = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (1..=120).collect(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();
    wait_for_terminal(&env.state.registry, accepted.job_id).await;

    let cached = env.state.cache.get(env.target).unwrap();
    let cached_ids: HashSet<_> = cached.iter().map(|c| c.id).collect();
    assert!((1..=120).all(|id| cached_ids.contains(&id)));

    let page = env
        .state
        .collections
        .get_collection_page(env.target, 100, 50)
        .await
        .unwrap();
    assert_eq!(page.total, 120);
    assert_eq!(page.companies.len(), 20);
}

#[tokio::test]
async fn test_move_all_copies_source_membership() {
    let env = TestEnvBuilder::new().with_chunk_size(50).build();
    env.add_members(env.source, 200..=349).await;
    env.add_members(env.target, [200, 201]).await;

    let accepted = env
        .state
        .coordinator
        .move_all(MoveAllRequest {
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();
    assert_eq!(accepted.total_companies, 150);
    assert_eq!(accepted.chunks, 3);

    let snapshot = wait_for_terminal(&env.state.registry, accepted.job_id).await;
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(env.member_count(env.target).await, 150);
}

#[tokio::test]
async fn test_finished_jobs_are_evicted_after_retention() {
    let env = TestEnvBuilder::new().build();
    let accepted = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (1..=10).collect(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();
    wait_for_terminal(&env.state.registry, accepted.job_id).await;

    assert_eq!(env.state.registry.evict_finished(Duration::from_secs(3600)), 0);
    assert_eq!(env.state.registry.evict_finished(Duration::ZERO), 1);
    assert!(matches!(
        env.state.streamer.subscribe(accepted.job_id),
        Err(CollectionsError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_cache_failures_do_not_block_completion() {
    let (env, _store) = TestEnvBuilder::new()
        .with_chunk_size(25)
        .build_with(FlakySummaryStore::always_failing);

    let accepted = env
        .state
        .coordinator
        .move_multiple(MoveMultipleRequest {
            company_ids: (1..=100).collect(),
            source_collection: env.source,
            target_collection: env.target,
        })
        .await
        .unwrap();

    let snapshot = wait_for_terminal(&env.state.registry, accepted.job_id).await;
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.chunks_processed, 4);
    assert!(env.state.cache.get(env.target).is_none());
    assert_eq!(env.member_count(env.target).await, 100);

    // With both the cache and the store read failing, the page surfaces the store error
    let page = env
        .state
        .collections
        .get_collection_page(env.target, 0, 10)
        .await;
    assert!(matches!(page, Err(CollectionsError::StoreFailure(_))));
}

#[tokio::test]
async fn test_collection_page_served_from_store_when_cache_load_fails() {
    let (env, _store) = TestEnvBuilder::new().build_with(|inner| FlakySummaryStore::new(inner, 1));
    env.add_members(env.target, 1..=15).await;

    let page = env
        .state
        .collections
        .get_collection_page(env.target, 10, 10)
        .await
        .unwrap();

    assert_eq!(page.total, 15);
    assert_eq!(page.companies.len(), 5);
    assert_eq!(page.companies[0].id, 11);
    assert!(env.state.cache.get(env.target).is_none());
}
