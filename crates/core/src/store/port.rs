use super::error::StoreError;
use crate::common::TimeRange;
use crate::health::entity::{Sample, SampleKind};
use async_trait::async_trait;

/// # Summary
/// 健康数据存储接口，服务层唯一依赖的外部协作者。
/// 只暴露查询、批量删除、写入三种能力。
///
/// # Invariants
/// - 实现者必须是异步且线程安全的 (`Send + Sync`)。
/// - `delete` 作为一次请求整体报告成功或失败。
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// # Summary
    /// 查询指定类型在时间区间内的全部样本。
    ///
    /// # Logic
    /// 1. 按 `kind` 过滤。
    /// 2. 按严格起始时间语义过滤 `range`。
    /// 3. 不限制返回数量，不保证顺序。
    ///
    /// # Arguments
    /// * `kind`: 样本类型。
    /// * `range`: 查询区间。
    ///
    /// # Returns
    /// 成功返回样本列表，失败返回 `StoreError`。
    async fn query(&self, kind: SampleKind, range: &TimeRange) -> Result<Vec<Sample>, StoreError>;

    /// # Summary
    /// 批量删除样本。
    ///
    /// # Logic
    /// 按样本 `id` 定位并删除，作为单个请求提交。
    ///
    /// # Arguments
    /// * `samples`: 待删除的样本。
    ///
    /// # Returns
    /// 成功返回实际删除的条数，失败返回 `StoreError`。
    async fn delete(&self, samples: &[Sample]) -> Result<usize, StoreError>;

    /// # Summary
    /// 写入单条样本。
    ///
    /// # Arguments
    /// * `sample`: 待写入的样本。
    ///
    /// # Returns
    /// 操作结果。
    async fn save(&self, sample: &Sample) -> Result<(), StoreError>;
}
