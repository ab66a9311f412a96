//! Guarded HTTP client shared by every outbound call.
//!
//! Requests are bounded by a single timeout and redirects are refused, so a
//! 3xx answer surfaces as a failed call instead of being followed.

use axum::body::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode, redirect::Policy};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("tenki/", env!("CARGO_PKG_VERSION"));
const SLOW_CALL: Duration = Duration::from_secs(2);

/// Why a guarded call did not produce a body
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status (redirects included)
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Clone)]
pub struct GuardedClient {
    client: Client,
}

impl GuardedClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a request and read the full body, failing on any non-2xx status.
    #[tracing::instrument(name = "outbound", level = "debug", skip_all, fields(service = service))]
    pub async fn fetch(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> Result<Bytes, FetchError> {
        let start = Instant::now();
        let response = request.send().await.inspect_err(|e| {
            warn!("{} request failed after {:.3}s: {}", service, start.elapsed().as_secs_f64(), e);
        })?;

        let status = response.status();
        debug!("{} responded {} ({})", service, status, response.url());
        if !status.is_success() {
            warn!("{} returned status {}", service, status);
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let elapsed = start.elapsed();
        info!(
            "{} call completed in {:.3}s ({} bytes)",
            service,
            elapsed.as_secs_f64(),
            body.len()
        );
        if elapsed > SLOW_CALL {
            warn!("Slow {} response: {:.3}s", service, elapsed.as_secs_f64());
        }
        Ok(body)
    }
}

/// Join a configured base URL and an endpoint path.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
