use thiserror::Error;

/// Rejected run configuration. Raised before any round is dispatched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunConfigError {
    #[error("requests_per_second must be >= 1.")]
    ZeroRequestsPerSecond,
    #[error("num_times must be >= 1.")]
    ZeroRounds,
    #[error("Request timeout must be > 0.")]
    ZeroRequestTimeout,
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Unsupported URL scheme '{scheme}'. Use http or https.")]
    UnsupportedScheme { scheme: String },
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}
