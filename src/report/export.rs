use std::path::Path;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::engine::{LoadTestReport, RequestOutcome};

async fn create_file(path: &Path) -> Result<tokio::fs::File, std::io::Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::File::create(path).await
}

fn offset_us(report: &LoadTestReport, instant: tokio::time::Instant) -> u128 {
    instant.saturating_duration_since(report.run_start).as_micros()
}

/// One row per outcome, in run order.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub async fn export_csv(path: &Path, report: &LoadTestReport) -> Result<(), std::io::Error> {
    let file = create_file(path).await?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(
            b"sequence_index,round_index,start_us,end_us,latency_us,success,status,response_size,error\n",
        )
        .await?;
    for outcome in &report.outcomes {
        let line = format!(
            "{},{},{},{},{},{},{},{},{}\n",
            outcome.sequence_index,
            outcome.round_index,
            offset_us(report, outcome.start_time),
            offset_us(report, outcome.end_time),
            outcome.latency.as_micros(),
            u8::from(outcome.success),
            outcome.status.map(|status| status.to_string()).unwrap_or_default(),
            outcome
                .response_size
                .map(|size| size.to_string())
                .unwrap_or_default(),
            outcome.error.as_ref().map_or("", |err| err.kind()),
        );
        writer.write_all(line.as_bytes()).await?;
    }
    writer.flush().await?;
    Ok(())
}

fn record_json(report: &LoadTestReport, outcome: &RequestOutcome) -> serde_json::Value {
    serde_json::json!({
        "sequence_index": outcome.sequence_index,
        "round_index": outcome.round_index,
        "start_us": offset_us(report, outcome.start_time),
        "end_us": offset_us(report, outcome.end_time),
        "latency_us": outcome.latency.as_micros(),
        "success": outcome.success,
        "status": outcome.status,
        "response_size": outcome.response_size,
        "error_kind": outcome.error.as_ref().map(|err| err.kind()),
        "error": outcome.error.as_ref().map(ToString::to_string),
    })
}

/// Summary statistics plus every outcome.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub async fn export_json(path: &Path, report: &LoadTestReport) -> Result<(), std::io::Error> {
    let stats = &report.statistics;
    let latency_json = stats.latency.map(|latency| {
        serde_json::json!({
            "mean_us": latency.mean.as_micros(),
            "median_us": latency.median.as_micros(),
            "min_us": latency.min.as_micros(),
            "max_us": latency.max.as_micros(),
            "p90_us": latency.p90.as_micros(),
            "p95_us": latency.p95.as_micros(),
            "p99_us": latency.p99.as_micros(),
        })
    });
    let size_json = stats.response_size.map(|sizes| {
        serde_json::json!({
            "mean": sizes.mean,
            "median": sizes.median,
            "min": sizes.min,
            "max": sizes.max,
        })
    });
    let summary_json = serde_json::json!({
        "duration_us": stats.total_duration.as_micros(),
        "total_requests": stats.total_requests,
        "total_success": stats.total_success,
        "total_failures": stats.total_failures,
        "achieved_rps": stats.achieved_rps,
        "cancelled": report.cancelled,
        "latency": latency_json,
        "response_size": size_json,
    });
    let records_json: Vec<serde_json::Value> = report
        .outcomes
        .iter()
        .map(|outcome| record_json(report, outcome))
        .collect();

    let payload = serde_json::json!({
        "summary": summary_json,
        "records": records_json
    });

    let file = create_file(path).await?;
    let mut writer = BufWriter::new(file);
    let json = serde_json::to_vec_pretty(&payload).map_err(std::io::Error::other)?;
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}
