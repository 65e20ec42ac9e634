pub mod time;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// # Summary
/// 查询时间区间，左闭右开 `[start, end)`，采用严格起始时间语义：
/// 样本的 `start_time` 落在区间内即视为命中。
///
/// # Invariants
/// - `start <= end`，由构造函数保证。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// # Summary
    /// 创建时间区间。
    ///
    /// # Arguments
    /// * `start`: 区间起点（包含）。
    /// * `end`: 区间终点（不包含）。
    ///
    /// # Returns
    /// `end < start` 时返回 None。
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self { start, end })
    }

    /// # Summary
    /// 以 `now` 为中心构造查询窗口 `[now - lookback, now + lookahead)`。
    ///
    /// # Returns
    /// 任一端超出 `DateTime` 可表示范围时返回 None。
    pub fn around(now: DateTime<Utc>, lookback: Duration, lookahead: Duration) -> Option<Self> {
        let start = now.checked_sub_signed(lookback.abs())?;
        let end = now.checked_add_signed(lookahead.abs())?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 严格起始时间判定
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// # Summary
/// 日历日 `(year, month, day)`，作为重复样本检测的键。
///
/// # Invariants
/// - 只比较年、月、日，忽略时分秒。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDay {
    /// # Summary
    /// 将 UTC 时间戳换算到指定时区后取日历日。
    ///
    /// # Arguments
    /// * `at`: 时间戳。
    /// * `tz`: 用于换算的时区（通常为 `chrono::Local`）。
    pub fn of<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> Self {
        let local = at.with_timezone(tz);
        Self {
            year: local.year(),
            month: local.month(),
            day: local.day(),
        }
    }
}

impl std::fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}
