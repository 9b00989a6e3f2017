//! Display strings derived from assessment data.
//!
//! Every function here is total: absent, non-finite or unparsable input maps
//! to a fixed placeholder instead of an error.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use shared::domain::{AssessmentResult, BenchmarkStatus};

pub const PLACEHOLDER: &str = "—";
pub const NOT_AVAILABLE: &str = "N/A";
pub const INSUFFICIENT_DATA: &str = "Insufficient data";
pub const UNKNOWN_DATE: &str = "Unknown date";
pub const UNNAMED_BUSINESS: &str = "Unnamed business";

const PERCENT_BENCHMARK_KEY: &str = "margin_vs_industry";
const DATE_FORMAT: &str = "%b %-d, %Y";
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkTone {
    Good,
    Neutral,
    Risk,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Overall score with one decimal, e.g. `72.5`.
pub fn score_pill(score: f64) -> String {
    match finite(score) {
        Some(score) => format!("{score:.1}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Overall score rounded to an integer, halves rounding up.
pub fn score_badge(score: f64) -> String {
    match finite(score) {
        Some(score) => {
            // x - floor(x) is exact; x + 0.5 can round up across the tie.
            let floor = score.floor();
            let rounded = if score - floor >= 0.5 { floor + 1.0 } else { floor };
            // avoid "-0"
            format!("{:.0}", if rounded == 0.0 { 0.0 } else { rounded })
        }
        None => PLACEHOLDER.to_string(),
    }
}

pub fn summary_pill(summary: &AssessmentResult) -> String {
    format!(
        "{}/100 · {} risk",
        score_pill(summary.overall_score),
        summary.risk_level
    )
}

pub fn list_score(score: f64) -> String {
    format!("{}/100", score_badge(score))
}

pub fn metric_value(value: Option<f64>, unit: Option<&str>) -> String {
    let Some(value) = value.and_then(finite) else {
        return NOT_AVAILABLE.to_string();
    };
    match unit.map(str::trim).filter(|unit| !unit.is_empty()) {
        Some(unit) => format!("{value:.2} {unit}"),
        None => format!("{value:.2}"),
    }
}

pub fn benchmark_value(key: &str, business_value: Option<f64>) -> String {
    let Some(value) = business_value.and_then(finite) else {
        return INSUFFICIENT_DATA.to_string();
    };
    if key == PERCENT_BENCHMARK_KEY {
        format!("{value:.2} %")
    } else {
        format!("{value:.2}")
    }
}

pub fn benchmark_status_label(status: &BenchmarkStatus) -> &'static str {
    match status {
        BenchmarkStatus::Good => "Above typical",
        BenchmarkStatus::Ok => "In typical range",
        BenchmarkStatus::Risk => "Below typical",
        BenchmarkStatus::Other(_) => PLACEHOLDER,
    }
}

pub fn benchmark_tone(status: &BenchmarkStatus) -> BenchmarkTone {
    match status {
        BenchmarkStatus::Good => BenchmarkTone::Good,
        BenchmarkStatus::Risk => BenchmarkTone::Risk,
        BenchmarkStatus::Ok | BenchmarkStatus::Other(_) => BenchmarkTone::Neutral,
    }
}

/// Calendar date of `created_at` in the local time zone, e.g. `Jan 5, 2024`.
pub fn assessment_date(created_at: &str) -> String {
    assessment_date_in(created_at, &Local)
}

/// Same as [`assessment_date`] for an explicit zone. Timestamps without an
/// offset are read as wall-clock time in `tz`.
pub fn assessment_date_in<Tz>(created_at: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    parse_instant(created_at.trim(), tz)
        .map(|instant| instant.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

fn parse_instant<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(tz));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    // Wall-clock times skipped by a DST jump have no local mapping.
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| Some(tz.from_utc_datetime(&naive)))
}

pub fn business_name(name: Option<&str>) -> &str {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNNAMED_BUSINESS)
}
