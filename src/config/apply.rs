use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, TesterArgs, parse_header};
use crate::error::ConfigError;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Values given explicitly
/// on the command line win.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header).map_err(|err| ConfigError::InvalidHeader { source: err })?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "json")
        && let Some(json) = config.json.as_ref()
    {
        args.json = Some(json.to_string());
    }

    if !is_cli(matches, "requests_per_second")
        && let Some(value) = config.requests_per_second
    {
        args.requests_per_second = ensure_positive_usize(value, "requests_per_second")?;
    }

    if !is_cli(matches, "num_times")
        && let Some(value) = config.num_times
    {
        args.num_times = ensure_positive_usize(value, "num_times")?;
    }

    if !is_cli(matches, "wait_time")
        && let Some(wait) = config.wait_time.as_ref()
    {
        args.wait_time = wait
            .to_duration(true)
            .map_err(|err| ConfigError::InvalidField {
                field: "wait_time",
                source: err,
            })?;
    }

    if !is_cli(matches, "full_response")
        && let Some(ttfb_only) = config.ttfb_only
    {
        args.full_response = !ttfb_only;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout =
            timeout
                .to_duration(false)
                .map_err(|err| ConfigError::InvalidField {
                    field: "timeout",
                    source: err,
                })?;
    }

    if !is_cli(matches, "success")
        && let Some(policy) = config.success
    {
        args.success = policy;
    }

    if !is_cli(matches, "latency_scope")
        && let Some(scope) = config.latency_scope
    {
        args.latency_scope = scope;
    }

    if !is_cli(matches, "keep_alive")
        && let Some(keep_alive) = config.keep_alive
    {
        args.keep_alive = keep_alive;
    }

    if !is_cli(matches, "charts_path")
        && let Some(path) = config.charts_path.clone()
    {
        args.charts_path = path;
    }

    if !is_cli(matches, "no_charts")
        && let Some(no_charts) = config.no_charts
    {
        args.no_charts = no_charts;
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_cli(matches, "export_csv")
        && let Some(path) = config.export_csv.clone()
    {
        args.export_csv = Some(path);
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_usize(value: usize, field: &'static str) -> Result<PositiveUsize, ConfigError> {
    PositiveUsize::try_from(value)
        .map_err(|err| ConfigError::FieldMustBePositive { field, source: err })
}
