use super::error::HealthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// # Summary
/// 样本唯一标识，批量删除时以此定位记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleId(pub Uuid);

impl SampleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SampleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// # Summary
/// 数量型样本的类型标识。
///
/// # Invariants
/// - 每种类型对应唯一的计量单位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    // 步数
    StepCount,
    // 步行 + 跑步距离
    DistanceWalkingRunning,
    // 爬楼层数
    FlightsClimbed,
}

impl SampleKind {
    /// 计量单位
    pub fn unit(&self) -> &'static str {
        match self {
            SampleKind::StepCount | SampleKind::FlightsClimbed => "count",
            SampleKind::DistanceWalkingRunning => "m",
        }
    }
}

impl FromStr for SampleKind {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stepcount" | "step_count" => Ok(SampleKind::StepCount),
            "distancewalkingrunning" | "distance_walking_running" => {
                Ok(SampleKind::DistanceWalkingRunning)
            }
            "flightsclimbed" | "flights_climbed" => Ok(SampleKind::FlightsClimbed),
            _ => Err(HealthError::Configuration(format!(
                "Unknown sample kind: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleKind::StepCount => write!(f, "stepCount"),
            SampleKind::DistanceWalkingRunning => write!(f, "distanceWalkingRunning"),
            SampleKind::FlightsClimbed => write!(f, "flightsClimbed"),
        }
    }
}

/// # Summary
/// 单条健康数据样本，记录某段时间内的测量值及其来源。
///
/// # Invariants
/// - `start_time <= end_time`。
/// - 一经取回即不可变，所有权属于外部存储。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    // 唯一标识
    pub id: SampleId,
    // 样本类型
    pub kind: SampleKind,
    // 测量开始时间
    pub start_time: DateTime<Utc>,
    // 测量结束时间
    pub end_time: DateTime<Utc>,
    // 测量值，单位见 `SampleKind::unit`
    pub quantity: f64,
    // 数据来源名称 (例如写入该样本的应用名)
    pub source_name: String,
}

impl Sample {
    /// # Summary
    /// 创建带有新标识的样本。
    ///
    /// # Arguments
    /// * `kind`: 样本类型。
    /// * `start_time`: 开始时间。
    /// * `end_time`: 结束时间，早于开始时间时取开始时间。
    /// * `quantity`: 测量值。
    /// * `source_name`: 来源名称。
    pub fn new(
        kind: SampleKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        quantity: f64,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            id: SampleId::new(),
            kind,
            start_time,
            end_time: end_time.max(start_time),
            quantity,
            source_name: source_name.into(),
        }
    }
}

/// # Summary
/// 统计结果中的一行：某个时间桶内某个来源的累计值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCountRecord {
    // 时间桶起点
    pub bucket_start: DateTime<Utc>,
    // 来源名称
    pub source: String,
    // 桶内累计值
    pub quantity: f64,
}

/// # Summary
/// 一次重复样本清理的结果。
///
/// # Invariants
/// - `deleted <= candidates.len()`。
/// - 预演 (dry run) 时 `deleted == 0`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurgeReport {
    // 过滤来源后参与评估的样本数
    pub examined: usize,
    // 按扫描顺序排列的待删除样本
    pub candidates: Vec<Sample>,
    // 实际删除的样本数
    pub deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_sample_kind_parse() {
        assert_eq!("stepCount".parse::<SampleKind>().unwrap(), SampleKind::StepCount);
        assert_eq!("step_count".parse::<SampleKind>().unwrap(), SampleKind::StepCount);
        assert_eq!(
            "flights_climbed".parse::<SampleKind>().unwrap(),
            SampleKind::FlightsClimbed
        );
        assert_eq!(SampleKind::StepCount.to_string(), "stepCount");
    }

    #[test]
    fn test_unknown_sample_kind_is_configuration_error() {
        let err = "heartRate".parse::<SampleKind>().unwrap_err();
        assert!(matches!(err, HealthError::Configuration(_)));
    }

    #[test]
    fn test_sample_clamps_end_time() {
        let now = Utc::now();
        let sample = Sample::new(SampleKind::StepCount, now, now - Duration::seconds(5), 10.0, "app");
        assert_eq!(sample.end_time, sample.start_time);
        assert_ne!(sample.id, Sample::new(SampleKind::StepCount, now, now, 1.0, "app").id);
    }
}
