use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::args::DEFAULT_USER_AGENT;
use crate::engine::{IssuedResponse, RequestIssuer, RequestSpec, ResponseMode, RunConfig};
use crate::error::{HttpError, RequestError};

use super::execution::drain_response_body;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub request_timeout: Duration,
    /// Reuse pooled connections. Off means a fresh connection per request.
    pub keep_alive: bool,
}

impl ClientOptions {
    #[must_use]
    pub const fn from_run_config(config: &RunConfig, keep_alive: bool) -> Self {
        Self {
            request_timeout: config.request_timeout,
            keep_alive,
        }
    }
}

/// Issues requests over a shared reqwest [`Client`].
#[derive(Debug, Clone)]
pub struct HttpIssuer {
    client: Client,
}

impl HttpIssuer {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(options: ClientOptions) -> Result<Self, HttpError> {
        let mut client_builder = Client::builder()
            .timeout(options.request_timeout)
            .user_agent(DEFAULT_USER_AGENT);

        if !options.keep_alive {
            client_builder = client_builder
                .pool_max_idle_per_host(0)
                .pool_idle_timeout(Some(Duration::from_secs(0)));
        }

        let client = client_builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RequestIssuer for HttpIssuer {
    async fn issue(
        &self,
        request: &RequestSpec,
        mode: ResponseMode,
    ) -> Result<IssuedResponse, RequestError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone());
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        // `send` resolves once the status line and headers are in.
        let response = builder.send().await?;
        let status = response.status().as_u16();

        match mode {
            ResponseMode::Ttfb => Ok(IssuedResponse {
                status,
                response_size: None,
            }),
            ResponseMode::Full => {
                let size = drain_response_body(response)
                    .await
                    .map_err(|err| RequestError::Body(err.to_string()))?;
                Ok(IssuedResponse {
                    status,
                    response_size: Some(size),
                })
            }
        }
    }
}
