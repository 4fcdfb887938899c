use std::time::Duration;

use serde::Deserialize;

use crate::args::HttpMethod;
use crate::args::parsers::parse_duration_text;
use crate::engine::SuccessPolicy;
use crate::error::ValidationError;
use crate::stats::LatencyScope;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub headers: Option<Vec<String>>,
    /// Request body; a TOML table or JSON object is sent as JSON.
    pub json: Option<serde_json::Value>,
    #[serde(alias = "rps")]
    pub requests_per_second: Option<usize>,
    #[serde(alias = "rounds")]
    pub num_times: Option<usize>,
    pub wait_time: Option<DurationValue>,
    pub ttfb_only: Option<bool>,
    pub timeout: Option<DurationValue>,
    pub success: Option<SuccessPolicy>,
    pub latency_scope: Option<LatencyScope>,
    pub keep_alive: Option<bool>,
    pub charts_path: Option<String>,
    pub no_charts: Option<bool>,
    pub export_json: Option<String>,
    pub export_csv: Option<String>,
}

/// Seconds as a number (`1.5`) or text with a unit (`"250ms"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(f64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, allow_zero: bool) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                let duration = Duration::try_from_secs_f64(*secs).map_err(|_err| {
                    ValidationError::DurationOutOfRange {
                        value: secs.to_string(),
                    }
                })?;
                if duration.is_zero() && !allow_zero {
                    return Err(ValidationError::DurationZero);
                }
                Ok(duration)
            }
            DurationValue::Text(text) => parse_duration_text(text, allow_zero),
        }
    }
}
