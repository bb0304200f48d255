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

//! A cancel broadcaster racing requests across a pool of HTTP clients.

use std::{collections::HashMap, time::Duration};

use bytes::Bytes;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::http::{HttpClient, HttpClientError, HttpResponse, Method};

/// Fans a request out to a pool of HTTP clients, resolving on the first
/// success.
///
/// Only for operations the venue treats as idempotent (cancel is idempotent
/// on the venue order ID): the remaining in-flight duplicates are dropped
/// once one succeeds, and a duplicate landing later is harmless.
pub struct CancelBroadcaster {
    pool: Vec<HttpClient>,
}

impl std::fmt::Debug for CancelBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CancelBroadcaster))
            .field("pool_size", &self.pool.len())
            .finish()
    }
}

impl CancelBroadcaster {
    /// Creates a new [`CancelBroadcaster`] with a pool of `pool_size` clients.
    ///
    /// # Panics
    ///
    /// Panics if `pool_size` is zero.
    #[must_use]
    pub fn new(
        pool_size: usize,
        default_headers: HashMap<String, String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        assert!(pool_size > 0, "`pool_size` must be positive");

        let pool = (0..pool_size)
            .map(|_| HttpClient::new(default_headers.clone(), Vec::new(), None, timeout_secs))
            .collect();
        Self { pool }
    }

    /// Returns the pool size.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Broadcasts the request across the pool, returning the first successful
    /// response and aborting the remainder.
    ///
    /// A response with a non-success status counts as a failure for the race.
    ///
    /// # Errors
    ///
    /// Returns the last observed error if every client in the pool fails.
    pub async fn broadcast(
        &self,
        method: Method,
        url: String,
        headers: Option<HashMap<String, String>>,
        body: Option<Bytes>,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, HttpClientError> {
        let mut in_flight: FuturesUnordered<_> = self
            .pool
            .iter()
            .map(|client| {
                client.request(
                    method.clone(),
                    url.clone(),
                    headers.clone(),
                    body.clone(),
                    timeout,
                    None,
                )
            })
            .collect();

        let mut last_error =
            HttpClientError::Error("Cancel broadcast pool produced no responses".to_string());

        while let Some(result) = in_flight.next().await {
            match result {
                Ok(response) if response.status.is_success() => {
                    // First success wins; dropping the stream aborts the rest
                    return Ok(response);
                }
                Ok(response) => {
                    last_error = HttpClientError::Error(format!(
                        "Cancel request failed with status {}",
                        response.status,
                    ));
                }
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
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
    fn test_pool_construction() {
        let broadcaster = CancelBroadcaster::new(3, HashMap::new(), Some(5));
        assert_eq!(broadcaster.pool_size(), 3);
    }

    #[rstest]
    #[should_panic(expected = "`pool_size` must be positive")]
    fn test_zero_pool_size_panics() {
        let _ = CancelBroadcaster::new(0, HashMap::new(), None);
    }

    #[tokio::test]
    async fn test_broadcast_all_failures_surfaces_error() {
        let broadcaster = CancelBroadcaster::new(2, HashMap::new(), Some(1));
        // Unroutable address: every client in the pool fails
        let result = broadcaster
            .broadcast(
                Method::POST,
                "http://127.0.0.1:1/cancel".to_string(),
                None,
                None,
                Some(Duration::from_millis(250)),
            )
            .await;
        assert!(result.is_err());
    }
}
