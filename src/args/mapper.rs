use crate::engine::{RequestSpec, RunConfig};
use crate::error::{AppError, AppResult, ValidationError};

use super::TesterArgs;

/// Turns parsed CLI/config values into the engine's run snapshot.
///
/// # Errors
///
/// Returns an error when the URL is missing or malformed, the JSON body does
/// not parse, or the resulting configuration is invalid.
pub fn build_run_config(args: &TesterArgs) -> AppResult<RunConfig> {
    let url = args
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;

    let body = args
        .json
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .map_err(|err| AppError::validation(ValidationError::InvalidJsonBody { source: err }))?;

    let request = RequestSpec::new(url, args.method)?
        .with_headers(args.headers.clone())
        .with_body(body);

    let mut config = RunConfig::new(request);
    config.requests_per_second = args.requests_per_second.get();
    config.num_times = args.num_times.get();
    config.wait_time = args.wait_time;
    config.ttfb_only = !args.full_response;
    config.request_timeout = args.request_timeout;
    config.success_policy = args.success;
    config.latency_scope = args.latency_scope;
    config.validate()?;
    Ok(config)
}
