//! # Retry executor
//! One HTTP call with exponential backoff on 429 / 5xx.
//!
//! Exhausted retries and non-retriable statuses return the last response
//! unchanged; the caller inspects the status. Transport errors are not
//! retried and propagate as-is.

use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

use crate::clock::millis_u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first call.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(800),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// Rate limits and server errors are worth another try.
    pub fn is_retriable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Delay before retry number `retry` (0-based): base, base*m, base*m², ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `build().send()` until it returns a non-retriable status or retries run out.
    pub async fn execute<F>(&self, mut build: F) -> Result<Response, reqwest::Error>
    where
        F: FnMut() -> RequestBuilder,
    {
        let mut retry = 0;
        loop {
            let resp = build().send().await?;
            let status = resp.status();
            if !Self::is_retriable(status) || retry >= self.max_retries {
                return Ok(resp);
            }

            let delay = self.delay_for(retry);
            warn!(
                status = status.as_u16(),
                retry = retry + 1,
                max_retries = self.max_retries,
                delay_ms = millis_u64(delay),
                "transient upstream status, backing off"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}
