use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// # Summary
/// 时钟端口。样本生成与查询窗口都从这里取“当前时间”，
/// 以便测试中固定时间。
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
pub struct SystemClock;

impl TimeProvider for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 手动时钟，只在显式调用 `set` / `advance` 时走动。
///
/// # Invariants
/// - 锁中毒时沿用最后一次写入的时间。
pub struct ManualClock {
    at: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at: Mutex::new(at) }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.at.lock().unwrap_or_else(|p| p.into_inner()) = at;
    }

    /// 向前拨动时钟；结果超出可表示范围时保持不变并返回 false
    pub fn advance(&self, by: Duration) -> bool {
        let mut at = self.at.lock().unwrap_or_else(|p| p.into_inner());
        match at.checked_add_signed(by) {
            Some(next) => {
                *at = next;
                true
            }
            None => false,
        }
    }
}

impl TimeProvider for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.at.lock().unwrap_or_else(|p| p.into_inner())
    }
}
