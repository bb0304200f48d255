// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A high-performance HTTP client with rate limiting and timeouts.

use std::{collections::HashMap, sync::Arc, time::Duration};

use bytes::Bytes;
use helm_core::HELM_USER_AGENT;
use http::status::StatusCode;

use crate::ratelimiter::{RateLimiter, quota::Quota};

// Re-export for callers building requests
pub use reqwest::Method;

/// Errors returned by the HTTP client.
#[derive(Clone, Debug, thiserror::Error)]
pub enum HttpClientError {
    /// A generic transport or protocol error.
    #[error("HTTP error occurred: {0}")]
    Error(String),
    /// The request exceeded its deadline.
    #[error("HTTP request timed out: {0}")]
    TimeoutError(String),
}

impl From<reqwest::Error> for HttpClientError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::TimeoutError(source.to_string())
        } else {
            Self::Error(source.to_string())
        }
    }
}

/// Represents an HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns the server-hinted retry delay from a `Retry-After` header,
    /// if present and parsable as whole seconds.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get("retry-after")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

/// Returns whether the given status code is safe to retry.
///
/// 5xx responses and 429 (rate limited) are retryable; the venue either did
/// not process the request or explicitly asked for a retry.
#[must_use]
pub fn should_retry_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// A HTTP client fronted by a keyed rate limiter.
///
/// Every request awaits all given rate limiter keys before sending (a
/// per-second key and a per-minute key express a dual-window venue limit).
/// Clients shared across data and execution must account for the combined
/// traffic through shared keys.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    rate_limiter: Arc<RateLimiter<String>>,
    default_headers: HashMap<String, String>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(HttpClient)).finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a new [`HttpClient`] instance.
    ///
    /// # Panics
    ///
    /// Panics if the underlying client builder fails (invalid TLS backend).
    #[must_use]
    pub fn new(
        default_headers: HashMap<String, String>,
        keyed_quotas: Vec<(String, Quota)>,
        default_quota: Option<Quota>,
        timeout_secs: Option<u64>,
    ) -> Self {
        let mut builder = reqwest::Client::builder().user_agent(HELM_USER_AGENT);
        if let Some(timeout_secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder.build().expect("Failed to build HTTP client");

        Self {
            client,
            rate_limiter: Arc::new(RateLimiter::new_with_quota(default_quota, keyed_quotas)),
            default_headers,
        }
    }

    /// Returns the client's rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> Arc<RateLimiter<String>> {
        self.rate_limiter.clone()
    }

    /// Sends an HTTP request, awaiting the given rate limiter keys first.
    ///
    /// A `timeout` overrides the client default for this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or the deadline expires.
    pub async fn request(
        &self,
        method: Method,
        url: String,
        headers: Option<HashMap<String, String>>,
        body: Option<Bytes>,
        timeout: Option<Duration>,
        keys: Option<Vec<String>>,
    ) -> Result<HttpResponse, HttpClientError> {
        self.rate_limiter.await_keys_ready(keys).await;

        let mut request = self.client.request(method, &url);

        for (key, value) in &self.default_headers {
            request = request.header(key, value);
        }
        if let Some(headers) = headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| HttpClientError::Error(e.to_string()))?;
        let headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_lowercase(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, true)]
    #[case(StatusCode::BAD_GATEWAY, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::BAD_REQUEST, false)]
    #[case(StatusCode::UNAUTHORIZED, false)]
    #[case(StatusCode::OK, false)]
    fn test_should_retry_status(#[case] status: StatusCode, #[case] expected: bool) {
        assert_eq!(should_retry_status(status), expected);
    }

    #[rstest]
    fn test_retry_after_parsing() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), "2".to_string());
        let response = HttpResponse {
            status: StatusCode::TOO_MANY_REQUESTS,
            headers,
            body: Bytes::new(),
        };
        assert_eq!(response.retry_after(), Some(Duration::from_secs(2)));

        let response = HttpResponse {
            status: StatusCode::OK,
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        assert_eq!(response.retry_after(), None);
    }
}
