use clap::Parser;
use std::time::Duration;

use crate::engine::SuccessPolicy;
use crate::stats::LatencyScope;

use super::defaults::default_charts_path;
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_header, parse_positive_usize, parse_success_policy,
    parse_wait_time_arg,
};
use super::types::{HttpMethod, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Exact-rate HTTP load generator: fires fixed-size request bursts at fixed intervals and reports latency/throughput statistics."
)]
pub struct TesterArgs {
    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Target URL for the load test
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// JSON request body
    #[arg(long = "json", short = 'd')]
    pub json: Option<String>,

    /// Requests fired concurrently in every round
    #[arg(
        long = "requests-per-second",
        short = 'r',
        default_value = "10",
        value_parser = parse_positive_usize
    )]
    pub requests_per_second: PositiveUsize,

    /// Number of rounds
    #[arg(
        long = "num-times",
        short = 'n',
        default_value = "5",
        value_parser = parse_positive_usize
    )]
    pub num_times: PositiveUsize,

    /// Target spacing between round starts (seconds, or with ms/s/m/h unit; 0 allowed)
    #[arg(
        long = "wait-time",
        short = 'w',
        default_value = "1",
        value_parser = parse_wait_time_arg
    )]
    pub wait_time: Duration,

    /// Measure until the full body is read instead of time to first byte
    #[arg(long = "full-response")]
    pub full_response: bool,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "10s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Which responses count as successful: any, 2xx, or a status code
    #[arg(long = "success", default_value = "any", value_parser = parse_success_policy)]
    pub success: SuccessPolicy,

    /// Outcomes included in latency statistics
    #[arg(long = "latency-scope", default_value = "all", ignore_case = true)]
    pub latency_scope: LatencyScope,

    /// Reuse connections between requests (every request opens a new one by default)
    #[arg(long = "keep-alive")]
    pub keep_alive: bool,

    /// Directory to save charts to
    #[arg(long, short = 'c', default_value_t = default_charts_path())]
    pub charts_path: String,

    /// Disable chart generation
    #[arg(long)]
    pub no_charts: bool,

    /// Export summary and per-request records to JSON
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Export per-request records to CSV
    #[arg(long = "export-csv")]
    pub export_csv: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./stresslab.toml or ./stresslab.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by STRESSLAB_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
