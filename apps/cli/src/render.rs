//! Plain-text views of the orchestrator snapshot.

use std::fmt::Write as _;

use client_core::{
    format::{self, BenchmarkTone},
    Snapshot, View,
};
use shared::domain::{Assessment, AssessmentId, AssessmentResult};

pub fn status(snapshot: &Snapshot, api_base_url: &str) -> String {
    match snapshot.view {
        View::Dashboard => format!(
            "Signed in to {api_base_url} · {} assessment(s)",
            snapshot.assessments.len()
        ),
        View::Auth => format!("Signed out ({api_base_url})"),
    }
}

pub fn assessment_list(items: &[Assessment], selected: Option<AssessmentId>) -> String {
    if items.is_empty() {
        return "No assessments yet. Upload a file with `fh upload --file <path>`.".to_string();
    }

    let mut out = String::new();
    for item in items {
        let marker = if Some(item.id) == selected { '*' } else { ' ' };
        let score = item
            .summary
            .as_ref()
            .map(|summary| format::list_score(summary.overall_score))
            .unwrap_or_else(|| format::PLACEHOLDER.to_string());
        let _ = writeln!(
            out,
            "{marker} #{:<5} {:<13} {:<8} {}",
            item.id.0,
            format::assessment_date(&item.created_at),
            score,
            format::business_name(item.business_name.as_deref()),
        );
    }
    out
}

pub fn assessment_detail(item: &Assessment) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (#{})",
        format::business_name(item.business_name.as_deref()),
        item.id.0
    );
    let _ = writeln!(out, "Created: {}", format::assessment_date(&item.created_at));
    if let Some(industry) = item.industry.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Industry: {industry}");
    }
    if let Some(locale) = item.locale.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Locale: {locale}");
    }

    match &item.summary {
        Some(summary) => write_summary(&mut out, summary),
        None => {
            let _ = writeln!(out, "\nNo analysis available yet.");
        }
    }
    out
}

fn write_summary(out: &mut String, summary: &AssessmentResult) {
    let _ = writeln!(out, "Score: {}", format::summary_pill(summary));

    if !summary.narrative.trim().is_empty() {
        let _ = writeln!(out, "\n{}", summary.narrative.trim());
    }

    if !summary.metrics.is_empty() {
        let _ = writeln!(out, "\nMetrics");
        for metric in &summary.metrics {
            let _ = write!(
                out,
                "  {}: {}",
                metric.label,
                format::metric_value(metric.value, metric.unit.as_deref())
            );
            match metric.interpretation.as_deref() {
                Some(note) if !note.is_empty() => {
                    let _ = writeln!(out, " ({note})");
                }
                _ => out.push('\n'),
            }
        }
    }

    if !summary.benchmarks.is_empty() {
        let _ = writeln!(out, "\nBenchmarks");
        for benchmark in &summary.benchmarks {
            let tone = match format::benchmark_tone(&benchmark.status) {
                BenchmarkTone::Good => '+',
                BenchmarkTone::Risk => '!',
                BenchmarkTone::Neutral => ' ',
            };
            let _ = writeln!(
                out,
                "{tone} {}: {} vs {} typical [{}]",
                benchmark.label,
                format::benchmark_value(&benchmark.key, benchmark.business_value),
                format::benchmark_value(&benchmark.key, benchmark.benchmark_value),
                format::benchmark_status_label(&benchmark.status),
            );
            if let Some(note) = benchmark.note.as_deref().filter(|s| !s.is_empty()) {
                let _ = writeln!(out, "    {note}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::ActionStatus;
    use shared::domain::{BenchmarkMetric, BenchmarkStatus, Metric};

    fn assessment(id: i64, name: Option<&str>, summary: Option<AssessmentResult>) -> Assessment {
        Assessment {
            id: AssessmentId(id),
            business_name: name.map(str::to_string),
            industry: Some("Retail".to_string()),
            locale: None,
            created_at: "2024-01-05T10:00:00".to_string(),
            summary,
        }
    }

    fn summary() -> AssessmentResult {
        AssessmentResult {
            overall_score: 72.5,
            risk_level: "moderate".to_string(),
            metrics: vec![Metric {
                key: "current_ratio".to_string(),
                label: "Current ratio".to_string(),
                value: Some(1.457),
                unit: Some("x".to_string()),
                interpretation: None,
            }],
            narrative: "Cash flow is steady.".to_string(),
            benchmarks: vec![BenchmarkMetric {
                key: "margin_vs_industry".to_string(),
                label: "Net margin".to_string(),
                business_value: Some(12.3),
                benchmark_value: None,
                status: BenchmarkStatus::Good,
                note: None,
            }],
        }
    }

    #[test]
    fn list_marks_selection_and_fills_placeholders() {
        let items = vec![
            assessment(2, Some("Acme"), Some(summary())),
            assessment(1, None, None),
        ];
        let rendered = assessment_list(&items, Some(AssessmentId(1)));
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  #2"));
        assert!(lines[0].contains("73/100"));
        assert!(lines[0].contains("Jan 5, 2024"));
        assert!(lines[1].starts_with("* #1"));
        assert!(lines[1].contains("Unnamed business"));
        assert!(lines[1].contains('—'));
    }

    #[test]
    fn empty_list_explains_next_step() {
        assert!(assessment_list(&[], None).contains("fh upload"));
    }

    #[test]
    fn detail_renders_summary_sections() {
        let rendered = assessment_detail(&assessment(2, Some("Acme"), Some(summary())));

        assert!(rendered.starts_with("Acme (#2)\n"));
        assert!(rendered.contains("Industry: Retail"));
        assert!(!rendered.contains("Locale:"));
        assert!(rendered.contains("Score: 72.5/100 · moderate risk"));
        assert!(rendered.contains("Cash flow is steady."));
        assert!(rendered.contains("  Current ratio: 1.46 x\n"));
        assert!(rendered.contains("+ Net margin: 12.30 % vs Insufficient data typical [Above typical]"));
    }

    #[test]
    fn detail_without_summary_says_so() {
        let rendered = assessment_detail(&assessment(3, Some("  "), None));
        assert!(rendered.starts_with("Unnamed business (#3)"));
        assert!(rendered.contains("No analysis available yet."));
    }

    #[test]
    fn status_reflects_view() {
        let snapshot = Snapshot {
            view: View::Dashboard,
            has_session: true,
            assessments: vec![assessment(1, None, None)],
            selected: None,
            status: ActionStatus::default(),
        };
        assert_eq!(
            status(&snapshot, "http://127.0.0.1:8000/api"),
            "Signed in to http://127.0.0.1:8000/api · 1 assessment(s)"
        );

        let signed_out = Snapshot {
            view: View::Auth,
            has_session: false,
            ..snapshot
        };
        assert_eq!(
            status(&signed_out, "http://127.0.0.1:8000/api"),
            "Signed out (http://127.0.0.1:8000/api)"
        );
    }
}
