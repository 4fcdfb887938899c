use std::time::Duration;

use crate::engine::LoadTestReport;
use crate::stats::{LatencyStats, SizeStats};

const NO_DATA: &str = "no data";

/// Renders the summary table. Absent statistics print as `no data`.
#[must_use]
pub fn summary_lines(report: &LoadTestReport, ttfb_only: bool) -> Vec<String> {
    let stats = &report.statistics;
    let mut lines = Vec::new();
    lines.push("Load test summary".to_owned());
    if report.cancelled {
        lines.push("  (cancelled: only completed rounds are included)".to_owned());
    }
    lines.push(format!("  Total duration:    {}", format_duration(stats.total_duration)));
    lines.push(format!("  Total requests:    {}", stats.total_requests));
    lines.push(format!("  Successful:        {}", stats.total_success));
    lines.push(format!("  Failed:            {}", stats.total_failures));
    lines.push(format!("  Achieved RPS:      {:.2}", stats.achieved_rps));

    let latency_label = if ttfb_only {
        "Latency (time to first byte):"
    } else {
        "Latency (full response):"
    };
    lines.push(format!("  {}", latency_label));
    lines.extend(latency_lines(stats.latency.as_ref()));

    if !ttfb_only {
        lines.push("  Response size (bytes):".to_owned());
        lines.extend(size_lines(stats.response_size.as_ref()));
    }
    lines
}

pub fn print_summary(report: &LoadTestReport, ttfb_only: bool) {
    for line in summary_lines(report, ttfb_only) {
        println!("{}", line);
    }
}

fn latency_lines(latency: Option<&LatencyStats>) -> Vec<String> {
    let Some(latency) = latency else {
        return vec![format!("    {}", NO_DATA)];
    };
    [
        ("Average", latency.mean),
        ("Max", latency.max),
        ("Min", latency.min),
        ("Median", latency.median),
        ("P90", latency.p90),
        ("P95", latency.p95),
        ("P99", latency.p99),
    ]
    .into_iter()
    .map(|(label, value)| format!("    {:<8} {}", format!("{}:", label), format_duration(value)))
    .collect()
}

fn size_lines(sizes: Option<&SizeStats>) -> Vec<String> {
    let Some(sizes) = sizes else {
        return vec![format!("    {}", NO_DATA)];
    };
    vec![
        format!("    Average: {:.2}", sizes.mean),
        format!("    Max:     {}", sizes.max),
        format!("    Min:     {}", sizes.min),
        format!("    Median:  {:.1}", sizes.median),
    ]
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2?}", duration)
}
