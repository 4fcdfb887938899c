use std::time::Duration;

use super::types::PositiveUsize;
use crate::engine::SuccessPolicy;
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_owned(), value.trim().to_owned())),
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_success_policy(s: &str) -> AppResult<SuccessPolicy> {
    s.parse::<SuccessPolicy>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

/// Positive duration such as `10s`, `250ms`, `1.5` (seconds), `2m`.
pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_text(s, false).map_err(AppError::from)
}

/// Like [`parse_duration_arg`] but `0` is allowed: back-to-back rounds.
pub(crate) fn parse_wait_time_arg(s: &str) -> AppResult<Duration> {
    parse_duration_text(s, true).map_err(AppError::from)
}

pub(crate) fn parse_duration_text(s: &str, allow_zero: bool) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let number_len = value
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(value.len());
    if number_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(number_len);
    let number: f64 =
        num_part
            .parse()
            .map_err(|err| ValidationError::InvalidDurationNumber {
                value: value.to_owned(),
                source: err,
            })?;
    let base = Duration::try_from_secs_f64(number).map_err(|_err| {
        ValidationError::DurationOutOfRange {
            value: value.to_owned(),
        }
    })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => base.checked_div(1000),
        "s" => Some(base),
        "m" => base.checked_mul(60),
        "h" => base.checked_mul(3600),
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    }
    .ok_or_else(|| ValidationError::DurationOutOfRange {
        value: value.to_owned(),
    })?;

    if duration.is_zero() && !allow_zero {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
