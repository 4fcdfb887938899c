use async_trait::async_trait;

use crate::error::RequestError;

use super::types::RequestSpec;

/// How much of the response a request waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Stop the clock once the status line and headers arrive.
    Ttfb,
    /// Stop the clock once the whole body has been read.
    Full,
}

impl ResponseMode {
    #[must_use]
    pub const fn from_ttfb_only(ttfb_only: bool) -> Self {
        if ttfb_only { Self::Ttfb } else { Self::Full }
    }
}

/// Result of one successful exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedResponse {
    pub status: u16,
    /// Body length in bytes, only in [`ResponseMode::Full`].
    pub response_size: Option<u64>,
}

/// Performs a single request/response exchange.
///
/// Implementations are invoked concurrently from many tasks and must not
/// share mutable state between invocations.
#[async_trait]
pub trait RequestIssuer: Send + Sync {
    /// # Errors
    ///
    /// Returns the transport-level reason the exchange did not complete.
    async fn issue(
        &self,
        request: &RequestSpec,
        mode: ResponseMode,
    ) -> Result<IssuedResponse, RequestError>;
}
