use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::{RequestError, ValidationError};

const MIN_STATUS: u16 = 100;
const MAX_STATUS: u16 = 599;

/// Decides whether a received response counts as a success.
///
/// Transport failures are always failures. The default treats every
/// response that arrived as a completed attempt, whatever its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuccessPolicy {
    #[default]
    AnyResponse,
    Status2xx,
    Exact(u16),
}

impl SuccessPolicy {
    #[must_use]
    pub const fn accepts(self, status: u16) -> bool {
        match self {
            Self::AnyResponse => true,
            Self::Status2xx => status >= 200 && status < 300,
            Self::Exact(expected) => status == expected,
        }
    }

    /// # Errors
    ///
    /// Returns `UnexpectedStatus` when the policy rejects `status`.
    pub fn check(self, status: u16) -> Result<(), RequestError> {
        if self.accepts(status) {
            Ok(())
        } else {
            Err(RequestError::UnexpectedStatus { status })
        }
    }
}

impl std::str::FromStr for SuccessPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "any" => Ok(Self::AnyResponse),
            "2xx" => Ok(Self::Status2xx),
            other => other
                .parse::<u16>()
                .ok()
                .filter(|status| (MIN_STATUS..=MAX_STATUS).contains(status))
                .map(Self::Exact)
                .ok_or_else(|| ValidationError::InvalidSuccessPolicy {
                    value: s.to_owned(),
                }),
        }
    }
}

impl fmt::Display for SuccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyResponse => f.write_str("any"),
            Self::Status2xx => f.write_str("2xx"),
            Self::Exact(status) => write!(f, "{}", status),
        }
    }
}

impl<'de> Deserialize<'de> for SuccessPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Status(u16),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Status(status) => status.to_string(),
            Raw::Text(text) => text,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
