use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use steplog_core::common::TimeRange;
use steplog_core::health::entity::{Sample, SampleKind, StepCountRecord};
use steplog_core::health::error::HealthError;
use steplog_core::store::port::HealthStore;
use tracing::{debug, warn};

/// # Summary
/// 计算样本所在时间桶的起点。
///
/// # Logic
/// 桶起点为 `anchor + k * interval`，`k` 向下取整，允许为负。
fn bucket_start(at: DateTime<Utc>, anchor: DateTime<Utc>, interval_ms: i64) -> DateTime<Utc> {
    let offset = (at - anchor).num_milliseconds();
    let k = offset.div_euclid(interval_ms);
    anchor + Duration::milliseconds(k * interval_ms)
}

/// # Summary
/// 按来源分组、按时间桶累加样本值。
///
/// # Arguments
/// * `samples`: 待统计样本。
/// * `interval`: 时间桶长度，必须为正。
/// * `anchor`: 时间桶对齐的锚点。
///
/// # Returns
/// 只包含非空桶的统计行，按桶起点、来源名排序。
pub fn aggregate(
    samples: &[Sample],
    interval: Duration,
    anchor: DateTime<Utc>,
) -> Result<Vec<StepCountRecord>, HealthError> {
    let interval_ms = interval.num_milliseconds();
    if interval_ms <= 0 {
        return Err(HealthError::Configuration(format!(
            "statistics interval must be positive, got {}",
            interval
        )));
    }

    let mut sums: BTreeMap<(DateTime<Utc>, &str), f64> = BTreeMap::new();
    for s in samples {
        let key = (
            bucket_start(s.start_time, anchor, interval_ms),
            s.source_name.as_str(),
        );
        *sums.entry(key).or_insert(0.0) += s.quantity;
    }

    Ok(sums
        .into_iter()
        .map(|((bucket_start, source), quantity)| StepCountRecord {
            bucket_start,
            source: source.to_string(),
            quantity,
        })
        .collect())
}

/// # Summary
/// 统计服务，负责刷新展示列表。
/// 每次刷新都重新查询并直接返回统计行，不保留共享列表。
pub struct StatisticsService {
    store: Arc<dyn HealthStore>,
    kind: SampleKind,
}

impl StatisticsService {
    pub fn new(store: Arc<dyn HealthStore>, kind: SampleKind) -> Self {
        Self { store, kind }
    }

    /// # Summary
    /// 查询区间内的样本并按时间桶、来源累计。
    ///
    /// # Logic
    /// 1. 查询区间内全部样本。
    /// 2. 调用 `aggregate` 生成统计行，时间桶长度由其校验。
    ///
    /// # Arguments
    /// * `range`: 查询区间。
    /// * `interval`: 时间桶长度。
    /// * `anchor`: 时间桶锚点，通常取区间终点。
    ///
    /// # Returns
    /// 统计行；取回失败返回 `HealthError::Retrieval`，
    /// 时间桶长度非正返回 `HealthError::Configuration`。
    pub async fn refresh(
        &self,
        range: &TimeRange,
        interval: Duration,
        anchor: DateTime<Utc>,
    ) -> Result<Vec<StepCountRecord>, HealthError> {
        let samples = self.store.query(self.kind, range).await.map_err(|e| {
            warn!("Failed to calculate statistics: {}", e);
            HealthError::Retrieval(e.to_string())
        })?;

        let rows = aggregate(&samples, interval, anchor)?;
        debug!(
            "Aggregated {} samples into {} rows",
            samples.len(),
            rows.len()
        );
        Ok(rows)
    }
}
