use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use steplog_core::common::TimeRange;
use steplog_core::health::entity::{Sample, SampleKind};
use steplog_core::store::error::StoreError;
use steplog_core::store::port::HealthStore;
use tokio::sync::RwLock;

/// # Summary
/// 基于内存的 `HealthStore` 实现。
///
/// 按写入顺序保存样本，可对查询、删除、写入分别注入故障，
/// 并记录收到的删除请求次数，便于验证“失败时不发出删除”。
pub struct MemoryHealthStore {
    samples: Arc<RwLock<Vec<Sample>>>,
    fail_query: AtomicBool,
    fail_delete: AtomicBool,
    fail_save: AtomicBool,
    delete_requests: AtomicUsize,
}

impl MemoryHealthStore {
    pub fn new() -> Self {
        Self {
            samples: Arc::new(RwLock::new(Vec::new())),
            fail_query: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_save: AtomicBool::new(false),
            delete_requests: AtomicUsize::new(0),
        }
    }

    /// 以给定样本初始化
    pub fn with_samples(samples: Vec<Sample>) -> Self {
        Self {
            samples: Arc::new(RwLock::new(samples)),
            ..Self::new()
        }
    }

    pub fn fail_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// 已收到的删除请求次数 (包括失败的请求)
    pub fn delete_requests(&self) -> usize {
        self.delete_requests.load(Ordering::SeqCst)
    }

    /// 当前全部样本的快照
    pub async fn snapshot(&self) -> Vec<Sample> {
        self.samples.read().await.clone()
    }
}

impl Default for MemoryHealthStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthStore for MemoryHealthStore {
    async fn query(&self, kind: SampleKind, range: &TimeRange) -> Result<Vec<Sample>, StoreError> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("query rejected".into()));
        }
        let guard = self.samples.read().await;
        Ok(guard
            .iter()
            .filter(|s| s.kind == kind && range.contains(s.start_time))
            .cloned()
            .collect())
    }

    async fn delete(&self, samples: &[Sample]) -> Result<usize, StoreError> {
        self.delete_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("delete rejected".into()));
        }
        let ids: HashSet<_> = samples.iter().map(|s| s.id).collect();
        let mut guard = self.samples.write().await;
        let before = guard.len();
        guard.retain(|s| !ids.contains(&s.id));
        Ok(before - guard.len())
    }

    async fn save(&self, sample: &Sample) -> Result<(), StoreError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("save rejected".into()));
        }
        let mut guard = self.samples.write().await;
        match guard.iter_mut().find(|s| s.id == sample.id) {
            Some(existing) => *existing = sample.clone(),
            None => guard.push(sample.clone()),
        }
        Ok(())
    }
}
