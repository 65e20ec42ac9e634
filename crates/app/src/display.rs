use chrono::{DateTime, Local, Utc};
use steplog_core::health::entity::{PurgeReport, Sample, StepCountRecord};

const DATE_FORMAT: &str = "%m/%d %-I:%M:%S %p";

pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DATE_FORMAT).to_string()
}

/// 取整并按千位插入逗号，例如 `12345.6` -> `12,346`
pub fn format_quantity(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

pub fn render_statistics(rows: &[StepCountRecord]) -> String {
    let mut out = format!("{:<20} {:<24} {:>12}\n", "DATE", "SOURCE", "STEPS");
    for row in rows {
        out.push_str(&format!(
            "{:<20} {:<24} {:>12}\n",
            format_date(row.bucket_start),
            row.source,
            format_quantity(row.quantity)
        ));
    }
    out
}

fn render_sample(sample: &Sample) -> String {
    format!(
        "{}  {}  {}",
        format_date(sample.start_time),
        sample.source_name,
        format_quantity(sample.quantity)
    )
}

pub fn render_report(report: &PurgeReport, dry_run: bool) -> String {
    let mut out = format!(
        "examined={} duplicates={} deleted={}{}\n",
        report.examined,
        report.candidates.len(),
        report.deleted,
        if dry_run { " (dry run)" } else { "" }
    );
    for c in &report.candidates {
        out.push_str("  ");
        out.push_str(&render_sample(c));
        out.push('\n');
    }
    out
}
