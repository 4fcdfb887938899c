use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use plotters::prelude::*;
use tracing::info;

use crate::engine::{LoadTestReport, RunConfig};
use crate::error::AppResult;
use crate::stats::{
    LatencyPoint, expected_requests_per_second, latency_timeline, responses_per_second,
};

const CHART_SIZE: (u32, u32) = (1600, 600);

/// `load_test_YYYYmmdd_HHMMSS` for the current local time.
#[must_use]
pub fn chart_base_name() -> String {
    chrono::Local::now()
        .format("load_test_%Y%m%d_%H%M%S")
        .to_string()
}

/// Writes the RPS and latency charts into `dir`, creating it when missing.
/// Returns the paths written; a run without outcomes writes nothing.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or a chart fails
/// to render.
pub async fn write_charts(
    report: &LoadTestReport,
    config: &RunConfig,
    dir: &Path,
) -> AppResult<Vec<PathBuf>> {
    if report.outcomes.is_empty() {
        info!("No outcomes recorded; skipping charts");
        return Ok(Vec::new());
    }
    tokio::fs::create_dir_all(dir).await?;

    let base_name = chart_base_name();
    let rps_path = dir.join(format!("{}_rps.png", base_name));
    let latency_path = dir.join(format!("{}_latency.png", base_name));

    let actual = responses_per_second(&report.outcomes, report.run_start);
    let expected = expected_requests_per_second(
        config.requests_per_second,
        config.num_times,
        config.wait_time,
    );
    info!("Plotting requests per second...");
    plot_requests_per_second(&actual, &expected, &rps_path)?;

    let points = latency_timeline(&report.outcomes, report.run_start);
    let average = report.statistics.latency.map(|latency| latency.mean);
    info!("Plotting latency over time...");
    plot_latency_timeline(&points, average, &latency_path)?;

    Ok(vec![rps_path, latency_path])
}

fn dense_counts(buckets: &BTreeMap<u64, u64>, len: u64) -> Vec<(u64, u64)> {
    (0..len)
        .map(|second| (second, buckets.get(&second).copied().unwrap_or(0)))
        .collect()
}

/// Actual completions per second against the configured burst pattern.
///
/// # Errors
///
/// Returns an error when the chart cannot be drawn or saved.
pub fn plot_requests_per_second(
    actual: &BTreeMap<u64, u64>,
    expected: &BTreeMap<u64, u64>,
    path: &Path,
) -> AppResult<()> {
    let last_second = actual
        .keys()
        .chain(expected.keys())
        .max()
        .copied()
        .unwrap_or(0);
    let len = last_second.saturating_add(1);
    let y_max = actual
        .values()
        .chain(expected.values())
        .max()
        .copied()
        .unwrap_or(1);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Requests per Second", ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0u64..len, 0u64..y_max.saturating_add(1))?;

    chart
        .configure_mesh()
        .x_desc("Elapsed Time (seconds)")
        .y_desc("Requests per Second")
        .draw()?;

    chart
        .draw_series(LineSeries::new(dense_counts(actual, len), BLUE))?
        .label("Actual")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x.saturating_add(20), y)], BLUE));

    let expected_color = RGBColor(255, 140, 0);
    chart
        .draw_series(LineSeries::new(dense_counts(expected, len), expected_color))?
        .label("Expected")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x.saturating_add(20), y)], expected_color)
        });

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

#[expect(clippy::float_arithmetic, reason = "chart axes are fractional milliseconds")]
fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Per-request latency by completion time, with the run average.
///
/// # Errors
///
/// Returns an error when the chart cannot be drawn or saved.
pub fn plot_latency_timeline(
    points: &[LatencyPoint],
    average: Option<Duration>,
    path: &Path,
) -> AppResult<()> {
    let x_max = points
        .last()
        .map_or(0.0, |point| point.completed_at.as_secs_f64())
        .max(1.0);
    let y_max = points
        .iter()
        .map(|point| as_millis_f64(point.latency))
        .fold(1.0_f64, f64::max);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Latency over Time", ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Completion Time (seconds)")
        .y_desc("Latency (ms)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|point| {
                (
                    point.completed_at.as_secs_f64(),
                    as_millis_f64(point.latency),
                )
            }),
            BLUE,
        ))?
        .label("Latency")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x.saturating_add(20), y)], BLUE));

    if let Some(average) = average {
        let average_ms = as_millis_f64(average);
        chart
            .draw_series(LineSeries::new(
                vec![(0.0, average_ms), (x_max, average_ms)],
                RED,
            ))?
            .label("Average")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x.saturating_add(20), y)], RED));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}
