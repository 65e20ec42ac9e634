use chrono::Duration;
use rand::Rng;
use std::sync::Arc;
use steplog_core::common::time::TimeProvider;
use steplog_core::health::entity::{Sample, SampleKind};
use steplog_core::health::error::HealthError;
use steplog_core::store::port::HealthStore;
use tracing::{info, warn};

/// 合成样本的测量时长
const SAMPLE_SPAN_SECS: i64 = 5;
/// 合成样本值的上限 (不含)
const MAX_SYNTHETIC_QUANTITY: u32 = 2000;
/// 单次制造重复样本的副本上限
pub const MAX_DUPLICATE_COPIES: usize = 1000;

/// # Summary
/// 合成样本生成器，向存储写入随机步数样本。
///
/// # Invariants
/// - 样本区间为 `[now - 5s, now]`，来源固定为构造时给定的名称。
pub struct SampleGenerator {
    store: Arc<dyn HealthStore>,
    clock: Arc<dyn TimeProvider>,
    kind: SampleKind,
    source_name: String,
}

impl SampleGenerator {
    pub fn new(
        store: Arc<dyn HealthStore>,
        clock: Arc<dyn TimeProvider>,
        kind: SampleKind,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            kind,
            source_name: source_name.into(),
        }
    }

    fn build(&self, quantity: f64) -> Sample {
        let end = self.clock.now();
        let start = end
            .checked_sub_signed(Duration::seconds(SAMPLE_SPAN_SECS))
            .unwrap_or(end);
        Sample::new(self.kind, start, end, quantity, self.source_name.clone())
    }

    async fn persist(&self, sample: &Sample) -> Result<(), HealthError> {
        self.store.save(sample).await.map_err(|e| {
            warn!("Insert failed, quantity={}: {}", sample.quantity, e);
            HealthError::Save(e.to_string())
        })?;
        info!(
            "Inserted {} sample, quantity={}, id={}",
            sample.kind, sample.quantity, sample.id
        );
        Ok(())
    }

    /// # Summary
    /// 写入一条随机值样本。
    ///
    /// # Returns
    /// 成功返回已写入的样本，失败返回 `HealthError::Save`。
    pub async fn add_sample(&self) -> Result<Sample, HealthError> {
        let quantity = f64::from(rand::rng().random_range(0..MAX_SYNTHETIC_QUANTITY));
        let sample = self.build(quantity);
        self.persist(&sample).await?;
        Ok(sample)
    }

    /// # Summary
    /// 写入若干条值与时间完全相同、仅标识不同的样本，用于制造重复数据。
    ///
    /// # Logic
    /// 1. 校验副本数量不超过 `MAX_DUPLICATE_COPIES`。
    /// 2. 生成一次随机值与时间区间。
    /// 3. 为每个副本分配新标识并逐条写入，遇到首个失败即返回。
    ///
    /// # Arguments
    /// * `copies`: 副本数量。
    ///
    /// # Returns
    /// 已写入的全部样本；副本数量超限返回 `HealthError::Configuration`。
    pub async fn create_duplicates(&self, copies: usize) -> Result<Vec<Sample>, HealthError> {
        if copies > MAX_DUPLICATE_COPIES {
            return Err(HealthError::Configuration(format!(
                "copies must not exceed {}, got {}",
                MAX_DUPLICATE_COPIES, copies
            )));
        }

        let quantity = f64::from(rand::rng().random_range(0..MAX_SYNTHETIC_QUANTITY));
        let template = self.build(quantity);

        let mut written = Vec::new();
        for _ in 0..copies {
            let sample = Sample::new(
                template.kind,
                template.start_time,
                template.end_time,
                template.quantity,
                template.source_name.clone(),
            );
            self.persist(&sample).await?;
            written.push(sample);
        }
        Ok(written)
    }
}
