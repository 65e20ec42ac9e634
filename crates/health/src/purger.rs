use chrono::{Local, TimeZone};
use std::sync::Arc;
use steplog_core::common::{CalendarDay, TimeRange};
use steplog_core::health::entity::{PurgeReport, Sample, SampleKind};
use steplog_core::health::error::HealthError;
use steplog_core::store::port::HealthStore;
use tracing::{debug, info, warn};

/// # Summary
/// 对一组样本执行同日重复检测，不访问存储。
///
/// # Logic
/// 1. 只保留来源名等于 `source` 的样本。
/// 2. 按 `start_time` 升序稳定排序，起始时间相同的样本保持原有顺序。
/// 3. 从左到右扫描一次：若某样本与紧邻的前一样本处于同一日历日，则标记为重复。
///
/// # Arguments
/// * `samples`: 存储返回的样本。
/// * `source`: 来源过滤条件。
/// * `tz`: 计算日历日所用的时区。
///
/// # Returns
/// `examined` 为过滤后的样本数，`candidates` 为按扫描顺序排列的重复样本，`deleted` 为 0。
pub fn evaluate<Tz: TimeZone>(samples: Vec<Sample>, source: &str, tz: &Tz) -> PurgeReport {
    let mut records: Vec<Sample> = samples
        .into_iter()
        .filter(|s| s.source_name == source)
        .collect();
    records.sort_by_key(|s| s.start_time);

    let mut candidates = Vec::new();
    let mut last_day: Option<CalendarDay> = None;
    for rec in &records {
        debug!(
            "source={}, date={}, quantity={}",
            rec.source_name, rec.start_time, rec.quantity
        );
        let day = CalendarDay::of(rec.start_time, tz);
        if last_day == Some(day) {
            candidates.push(rec.clone());
        }
        last_day = Some(day);
    }

    PurgeReport {
        examined: records.len(),
        candidates,
        deleted: 0,
    }
}

/// 只返回重复样本的便捷形式
pub fn find_same_day_duplicates<Tz: TimeZone>(
    samples: Vec<Sample>,
    source: &str,
    tz: &Tz,
) -> Vec<Sample> {
    evaluate(samples, source, tz).candidates
}

/// # Summary
/// 同日重复样本清理器。
/// 取回时间区间内的样本，找出与前一条样本 (按起始时间) 同日的后续样本，
/// 并作为一个批次请求存储删除。
///
/// # Invariants
/// - 每次调用重新构建工作集，调用之间不共享状态。
/// - 取回失败时绝不发出删除请求。
/// - 删除请求最多发出一次，不重试。
pub struct DuplicateSamplePurger<Tz: TimeZone = Local> {
    store: Arc<dyn HealthStore>,
    kind: SampleKind,
    timezone: Tz,
}

impl DuplicateSamplePurger<Local> {
    /// 使用本地时区创建清理器
    pub fn new(store: Arc<dyn HealthStore>, kind: SampleKind) -> Self {
        Self::with_timezone(store, kind, Local)
    }
}

impl<Tz: TimeZone> DuplicateSamplePurger<Tz> {
    pub fn with_timezone(store: Arc<dyn HealthStore>, kind: SampleKind, timezone: Tz) -> Self {
        Self {
            store,
            kind,
            timezone,
        }
    }

    /// # Summary
    /// 预演：取回并评估，但不删除。
    ///
    /// # Returns
    /// 成功返回 `deleted == 0` 的报告；取回失败返回 `HealthError::Retrieval`。
    pub async fn plan(&self, range: &TimeRange, source: &str) -> Result<PurgeReport, HealthError> {
        let samples = self.store.query(self.kind, range).await.map_err(|e| {
            warn!("Failed to fetch {} samples: {}", self.kind, e);
            HealthError::Retrieval(e.to_string())
        })?;

        let report = evaluate(samples, source, &self.timezone);
        for c in &report.candidates {
            debug!(
                "duplicate: id={}, date={}, quantity={}",
                c.id, c.start_time, c.quantity
            );
        }
        Ok(report)
    }

    /// # Summary
    /// 执行一次完整的清理流程。
    ///
    /// # Logic
    /// 1. 通过 `plan` 取回并评估样本。
    /// 2. 没有重复样本时直接返回成功。
    /// 3. 否则将全部重复样本作为单个批次提交删除。
    ///
    /// # Arguments
    /// * `range`: 查询区间。
    /// * `source`: 来源过滤条件。
    ///
    /// # Returns
    /// 成功返回清理报告；取回失败返回 `Retrieval`，删除失败返回 `Deletion`。
    pub async fn purge_duplicates(
        &self,
        range: &TimeRange,
        source: &str,
    ) -> Result<PurgeReport, HealthError> {
        let mut report = self.plan(range, source).await?;

        if report.candidates.is_empty() {
            info!(
                "No duplicates among {} samples from {}",
                report.examined, source
            );
            return Ok(report);
        }

        report.deleted = self.store.delete(&report.candidates).await.map_err(|e| {
            warn!(
                "Failed to purge {} duplicate samples: {}",
                report.candidates.len(),
                e
            );
            HealthError::Deletion(e.to_string())
        })?;

        info!(
            "Purged {} of {} duplicate samples from {} ({} examined)",
            report.deleted,
            report.candidates.len(),
            source,
            report.examined
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, day, h, m, 0).unwrap()
    }

    fn sample(start: DateTime<Utc>, source: &str) -> Sample {
        Sample::new(SampleKind::StepCount, start, start, 100.0, source)
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_marks_same_day_successors_only() {
        let samples = vec![
            sample(at(1, 0, 1), "app"),
            sample(at(1, 0, 2), "app"),
            sample(at(1, 23, 59), "app"),
            sample(at(2, 0, 0), "app"),
        ];
        let expected = vec![samples[1].clone(), samples[2].clone()];
        let report = evaluate(samples, "app", &utc());
        assert_eq!(report.examined, 4);
        assert_eq!(report.candidates, expected);
        assert_eq!(report.deleted, 0);
    }

    #[test]
    fn test_sorts_before_scanning() {
        let late = sample(at(3, 18, 0), "app");
        let early = sample(at(3, 6, 0), "app");
        let other_day = sample(at(4, 6, 0), "app");
        let dups = find_same_day_duplicates(
            vec![late.clone(), other_day, early],
            "app",
            &utc(),
        );
        assert_eq!(dups, vec![late]);
    }

    #[test]
    fn test_ties_keep_retrieval_order() {
        let t = at(5, 12, 0);
        let a = sample(t, "app");
        let b = sample(t, "app");
        let c = sample(t, "app");
        let dups = find_same_day_duplicates(vec![a, b.clone(), c.clone()], "app", &utc());
        assert_eq!(dups, vec![b, c]);
    }

    #[test]
    fn test_other_sources_are_ignored() {
        let samples = vec![
            sample(at(1, 8, 0), "app"),
            sample(at(1, 9, 0), "watch"),
            sample(at(1, 10, 0), "watch"),
            sample(at(2, 8, 0), "app"),
        ];
        let report = evaluate(samples, "app", &utc());
        assert_eq!(report.examined, 2);
        assert!(report.candidates.is_empty());
    }

    #[test]
    fn test_empty_and_single() {
        assert!(find_same_day_duplicates(vec![], "app", &utc()).is_empty());
        assert!(find_same_day_duplicates(vec![sample(at(1, 8, 0), "app")], "app", &utc()).is_empty());
    }

    #[test]
    fn test_calendar_day_uses_given_timezone() {
        // UTC 下分属两天，在 UTC-5 下同属 6 月 1 日
        let samples = vec![sample(at(1, 20, 0), "app"), sample(at(2, 3, 0), "app")];
        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        assert!(find_same_day_duplicates(samples.clone(), "app", &utc()).is_empty());
        assert_eq!(find_same_day_duplicates(samples, "app", &new_york).len(), 1);
    }
}
