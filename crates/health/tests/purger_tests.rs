use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use std::sync::Arc;
use steplog_core::common::TimeRange;
use steplog_core::health::entity::{Sample, SampleKind};
use steplog_core::health::error::HealthError;
use steplog_health::purger::DuplicateSamplePurger;
use steplog_store::memory::MemoryHealthStore;

const SOURCE: &str = "HealthKitTest";

fn tz() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, h, m, 0).unwrap()
}

fn window() -> TimeRange {
    TimeRange::around(at(10, 12, 0), Duration::days(4), Duration::days(3)).unwrap()
}

fn step(start: DateTime<Utc>, source: &str) -> Sample {
    Sample::new(SampleKind::StepCount, start, start + Duration::seconds(5), 500.0, source)
}

fn purger(store: &Arc<MemoryHealthStore>) -> DuplicateSamplePurger<FixedOffset> {
    DuplicateSamplePurger::with_timezone(store.clone(), SampleKind::StepCount, tz())
}

#[tokio::test]
async fn test_purges_same_day_run_and_keeps_next_day() {
    let samples = vec![
        step(at(10, 0, 1), SOURCE),
        step(at(10, 0, 2), SOURCE),
        step(at(10, 23, 59), SOURCE),
        step(at(11, 0, 0), SOURCE),
    ];
    let store = Arc::new(MemoryHealthStore::with_samples(samples.clone()));

    let report = purger(&store).purge_duplicates(&window(), SOURCE).await.unwrap();

    assert_eq!(report.examined, 4);
    assert_eq!(report.candidates, vec![samples[1].clone(), samples[2].clone()]);
    assert_eq!(report.deleted, 2);
    assert_eq!(store.delete_requests(), 1);
    assert_eq!(store.snapshot().await, vec![samples[0].clone(), samples[3].clone()]);
}

#[tokio::test]
async fn test_second_run_deletes_nothing() {
    let store = Arc::new(MemoryHealthStore::with_samples(vec![
        step(at(9, 8, 0), SOURCE),
        step(at(9, 9, 0), SOURCE),
        step(at(9, 9, 0), SOURCE),
        step(at(10, 9, 0), SOURCE),
    ]));
    let purger = purger(&store);

    let first = purger.purge_duplicates(&window(), SOURCE).await.unwrap();
    assert_eq!(first.deleted, 2);

    let second = purger.purge_duplicates(&window(), SOURCE).await.unwrap();
    assert_eq!(second.examined, 2);
    assert!(second.candidates.is_empty());
    assert_eq!(second.deleted, 0);
    // 第二次没有候选，不应再发出删除请求
    assert_eq!(store.delete_requests(), 1);
}

#[tokio::test]
async fn test_empty_store_is_a_successful_noop() {
    let store = Arc::new(MemoryHealthStore::new());
    let report = purger(&store).purge_duplicates(&window(), SOURCE).await.unwrap();
    assert_eq!(report.examined, 0);
    assert_eq!(report.deleted, 0);
    assert_eq!(store.delete_requests(), 0);
}

#[tokio::test]
async fn test_other_sources_are_never_candidates() {
    let theirs = vec![step(at(10, 8, 0), "Watch"), step(at(10, 9, 0), "Watch")];
    let mine = step(at(10, 10, 0), SOURCE);
    let mut samples = theirs.clone();
    samples.push(mine);
    let store = Arc::new(MemoryHealthStore::with_samples(samples));

    let report = purger(&store).purge_duplicates(&window(), SOURCE).await.unwrap();
    assert_eq!(report.examined, 1);
    assert!(report.candidates.is_empty());
    assert_eq!(store.snapshot().await.len(), 3);
}

#[tokio::test]
async fn test_samples_outside_window_are_untouched() {
    let outside = step(at(1, 8, 0), SOURCE);
    let outside_dup = step(at(1, 9, 0), SOURCE);
    let store = Arc::new(MemoryHealthStore::with_samples(vec![outside, outside_dup]));
    let report = purger(&store).purge_duplicates(&window(), SOURCE).await.unwrap();
    assert_eq!(report.examined, 0);
    assert_eq!(store.snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_retrieval_failure_issues_no_delete() {
    let store = Arc::new(MemoryHealthStore::with_samples(vec![
        step(at(10, 8, 0), SOURCE),
        step(at(10, 9, 0), SOURCE),
    ]));
    store.fail_query(true);

    let err = purger(&store).purge_duplicates(&window(), SOURCE).await.unwrap_err();
    assert!(matches!(err, HealthError::Retrieval(_)));
    assert_eq!(store.delete_requests(), 0);
    assert_eq!(store.snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_deletion_failure_is_reported() {
    let store = Arc::new(MemoryHealthStore::with_samples(vec![
        step(at(10, 8, 0), SOURCE),
        step(at(10, 9, 0), SOURCE),
    ]));
    store.fail_delete(true);

    let err = purger(&store).purge_duplicates(&window(), SOURCE).await.unwrap_err();
    assert!(matches!(err, HealthError::Deletion(_)));
    assert_eq!(store.delete_requests(), 1);
    assert_eq!(store.snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_plan_never_deletes() {
    let store = Arc::new(MemoryHealthStore::with_samples(vec![
        step(at(10, 8, 0), SOURCE),
        step(at(10, 9, 0), SOURCE),
    ]));
    let report = purger(&store).plan(&window(), SOURCE).await.unwrap();
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.deleted, 0);
    assert_eq!(store.delete_requests(), 0);
    assert_eq!(store.snapshot().await.len(), 2);
}
