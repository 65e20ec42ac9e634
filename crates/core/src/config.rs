use crate::common::TimeRange;
use crate::health::entity::SampleKind;
use crate::health::error::HealthError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub health: HealthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// 样本类型标识，启动时解析，无法识别则直接失败
    pub sample_kind: String,
    /// 本应用写入样本时使用的来源名，也是清理时的默认过滤来源
    pub source_name: String,
    pub lookback_days: i64,
    pub lookahead_days: i64,
    pub interval_minutes: i64,
    pub duplicate_copies: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志文件目录，为空时只输出到终端
    pub dir: Option<String>,
}

impl HealthConfig {
    /// 解析样本类型
    pub fn kind(&self) -> Result<SampleKind, HealthError> {
        self.sample_kind.parse()
    }

    pub fn lookback(&self) -> Result<Duration, HealthError> {
        Duration::try_days(self.lookback_days).ok_or_else(|| {
            HealthError::Configuration(format!(
                "lookback_days out of range: {}",
                self.lookback_days
            ))
        })
    }

    pub fn lookahead(&self) -> Result<Duration, HealthError> {
        Duration::try_days(self.lookahead_days).ok_or_else(|| {
            HealthError::Configuration(format!(
                "lookahead_days out of range: {}",
                self.lookahead_days
            ))
        })
    }

    /// 统计时间桶长度，必须为正
    pub fn interval(&self) -> Result<Duration, HealthError> {
        if self.interval_minutes <= 0 {
            return Err(HealthError::Configuration(format!(
                "interval_minutes must be positive, got {}",
                self.interval_minutes
            )));
        }
        Duration::try_minutes(self.interval_minutes).ok_or_else(|| {
            HealthError::Configuration(format!(
                "interval_minutes out of range: {}",
                self.interval_minutes
            ))
        })
    }

    /// # Summary
    /// 以 `now` 为中心计算刷新与清理共用的查询窗口。
    ///
    /// # Returns
    /// 窗口超出可表示的时间范围时返回 `HealthError::Configuration`。
    pub fn window(&self, now: DateTime<Utc>) -> Result<TimeRange, HealthError> {
        TimeRange::around(now, self.lookback()?, self.lookahead()?).ok_or_else(|| {
            HealthError::Configuration(format!(
                "query window out of range: -{}d / +{}d",
                self.lookback_days, self.lookahead_days
            ))
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                data_dir: "data".to_string(),
            },
            health: HealthConfig {
                sample_kind: "stepCount".to_string(),
                source_name: "HealthKitTest".to_string(),
                lookback_days: 4,
                lookahead_days: 3,
                interval_minutes: 60,
                duplicate_copies: 3,
            },
            logging: LoggingConfig::default(),
        }
    }
}
