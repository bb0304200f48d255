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

//! A bounded retry manager with per-attempt timeouts and jittered backoff.

use std::{future::Future, marker::PhantomData, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::backoff::ExponentialBackoff;

/// Configuration for bounded retries.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// The maximum number of retries (total attempts = retries + 1).
    pub max_retries: u32,
    /// The initial retry delay (milliseconds).
    pub initial_delay_ms: u64,
    /// The maximum retry delay (milliseconds).
    pub max_delay_ms: u64,
    /// The exponential growth factor for the delay schedule.
    pub backoff_factor: f64,
    /// The maximum uniform jitter added to each delay (milliseconds).
    pub jitter_ms: u64,
    /// The per-attempt timeout (milliseconds), zero for no timeout.
    pub operation_timeout_ms: u64,
    /// If the first retry fires immediately before backoff engages.
    pub immediate_first: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
            backoff_factor: 2.0,
            jitter_ms: 100,
            operation_timeout_ms: 60_000,
            immediate_first: false,
        }
    }
}

/// Manages bounded retries with exponential backoff for fallible async
/// operations.
///
/// Retries apply only when the caller's `should_retry` predicate declares the
/// error safe to retry (the prior attempt did not land, or the operation is
/// idempotent). A server-hinted delay extracted from the error takes
/// precedence over the backoff schedule. On exhaustion the terminal error is
/// surfaced with the attempt history logged.
pub struct RetryManager<E> {
    config: RetryConfig,
    delay_hint: Option<fn(&E) -> Option<Duration>>,
    _phantom: PhantomData<E>,
}

impl<E: std::fmt::Display> RetryManager<E> {
    /// Creates a new [`RetryManager`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the backoff parameters in `config` are invalid.
    pub fn new(config: RetryConfig) -> anyhow::Result<Self> {
        // Validate backoff parameters eagerly
        let _ = ExponentialBackoff::new(
            Duration::from_millis(config.initial_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.backoff_factor,
            config.jitter_ms,
            config.immediate_first,
        )?;

        Ok(Self {
            config,
            delay_hint: None,
            _phantom: PhantomData,
        })
    }

    /// Sets a function extracting a server-hinted retry delay from an error
    /// (e.g. an HTTP `Retry-After` header).
    #[must_use]
    pub fn with_delay_hint(mut self, delay_hint: fn(&E) -> Option<Duration>) -> Self {
        self.delay_hint = Some(delay_hint);
        self
    }

    /// Executes `op_factory`-produced operations with bounded retries.
    ///
    /// # Errors
    ///
    /// Returns the terminal error when retries are exhausted, the error is
    /// declared non-retryable, or an attempt times out (`create_error` builds
    /// the timeout error).
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        operation_name: &str,
        op_factory: F,
        should_retry: impl Fn(&E) -> bool,
        create_error: impl Fn(String) -> E,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_retry_with_cancel(
            operation_name,
            op_factory,
            should_retry,
            create_error,
            &CancellationToken::new(),
        )
        .await
    }

    /// Executes `op_factory`-produced operations with bounded retries,
    /// aborting promptly when `cancellation_token` is cancelled (including
    /// mid-backoff).
    ///
    /// # Errors
    ///
    /// Returns the terminal error when retries are exhausted, the error is
    /// declared non-retryable, the operation is cancelled, or an attempt
    /// times out.
    pub async fn execute_with_retry_with_cancel<T, F, Fut>(
        &self,
        operation_name: &str,
        op_factory: F,
        should_retry: impl Fn(&E) -> bool,
        create_error: impl Fn(String) -> E,
        cancellation_token: &CancellationToken,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut backoff = ExponentialBackoff::new(
            Duration::from_millis(self.config.initial_delay_ms),
            Duration::from_millis(self.config.max_delay_ms),
            self.config.backoff_factor,
            self.config.jitter_ms,
            self.config.immediate_first,
        )
        .expect("Backoff parameters validated at construction");

        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let result = self
                .run_attempt(operation_name, op_factory(), &create_error, cancellation_token)
                .await;

            match result {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let retries_used = attempt - 1;
                    if !should_retry(&e) {
                        log::debug!("'{operation_name}' failed (non-retryable): {e}");
                        return Err(e);
                    }
                    if retries_used >= self.config.max_retries {
                        log::warn!(
                            "'{operation_name}' failed after {attempt} attempt(s): {e}",
                        );
                        return Err(e);
                    }

                    // A server-hinted delay takes precedence over the schedule
                    let delay = self
                        .delay_hint
                        .and_then(|hint| hint(&e))
                        .unwrap_or_else(|| backoff.next_duration());

                    log::warn!(
                        "'{operation_name}' attempt {attempt} failed, retrying in {}ms: {e}",
                        delay.as_millis(),
                    );

                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = cancellation_token.cancelled() => {
                            return Err(create_error(format!(
                                "'{operation_name}' canceled during retry backoff"
                            )));
                        }
                    }
                }
            }
        }
    }

    async fn run_attempt<T, Fut>(
        &self,
        operation_name: &str,
        operation: Fut,
        create_error: &impl Fn(String) -> E,
        cancellation_token: &CancellationToken,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let timeout = Duration::from_millis(self.config.operation_timeout_ms);

        tokio::select! {
            () = cancellation_token.cancelled() => {
                Err(create_error(format!("'{operation_name}' canceled")))
            }
            result = async {
                if timeout.is_zero() {
                    operation.await
                } else {
                    match tokio::time::timeout(timeout, operation).await {
                        Ok(result) => result,
                        Err(_) => Err(create_error(format!(
                            "'{operation_name}' timed out after {}ms",
                            timeout.as_millis(),
                        ))),
                    }
                }
            } => result,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use rstest::rstest;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("transient: {0}")]
        Transient(String),
        #[error("fatal: {0}")]
        Fatal(String),
        #[error("rate limited")]
        RateLimited { retry_after: Duration },
    }

    fn should_retry(error: &TestError) -> bool {
        !matches!(error, TestError::Fatal(_))
    }

    fn create_error(msg: String) -> TestError {
        TestError::Transient(msg)
    }

    fn manager() -> RetryManager<TestError> {
        RetryManager::new(RetryConfig {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_factor: 2.0,
            jitter_ms: 0,
            operation_timeout_ms: 1_000,
            immediate_first: false,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let manager = manager();
        let result: Result<u32, TestError> = manager
            .execute_with_retry("op", || async { Ok(42) }, should_retry, create_error)
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let manager = manager();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<u32, TestError> = manager
            .execute_with_retry(
                "op",
                move || {
                    let attempts = attempts_clone.clone();
                    async move {
                        if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err(TestError::Transient("try again".to_string()))
                        } else {
                            Ok(7)
                        }
                    }
                },
                should_retry,
                create_error,
            )
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_terminal_error() {
        let manager = manager();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<u32, TestError> = manager
            .execute_with_retry(
                "op",
                move || {
                    let attempts = attempts_clone.clone();
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        Err(TestError::Transient("always failing".to_string()))
                    }
                },
                should_retry,
                create_error,
            )
            .await;

        assert!(result.is_err());
        // max_retries=3 means 4 total attempts
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let manager = manager();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<u32, TestError> = manager
            .execute_with_retry(
                "op",
                move || {
                    let attempts = attempts_clone.clone();
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        Err(TestError::Fatal("validation".to_string()))
                    }
                },
                should_retry,
                create_error,
            )
            .await;

        assert!(matches!(result, Err(TestError::Fatal(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_hinted_delay_takes_precedence() {
        let manager = manager().with_delay_hint(|error| match error {
            TestError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        });
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let start = std::time::Instant::now();
        let result: Result<u32, TestError> = manager
            .execute_with_retry(
                "op",
                move || {
                    let attempts = attempts_clone.clone();
                    async move {
                        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err(TestError::RateLimited {
                                retry_after: Duration::from_millis(50),
                            })
                        } else {
                            Ok(1)
                        }
                    }
                },
                should_retry,
                create_error,
            )
            .await;

        assert_eq!(result.unwrap(), 1);
        // Waited at least the hinted delay rather than the 1ms schedule
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_cancellation_mid_backoff() {
        let manager = RetryManager::new(RetryConfig {
            max_retries: 5,
            initial_delay_ms: 10_000,
            max_delay_ms: 10_000,
            backoff_factor: 2.0,
            jitter_ms: 0,
            operation_timeout_ms: 1_000,
            immediate_first: false,
        })
        .unwrap();

        let token = CancellationToken::new();
        let token_clone = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token_clone.cancel();
        });

        let start = std::time::Instant::now();
        let result: Result<u32, TestError> = manager
            .execute_with_retry_with_cancel(
                "op",
                || async { Err(TestError::Transient("failing".to_string())) },
                should_retry,
                create_error,
                &token,
            )
            .await;

        assert!(result.is_err());
        // Aborted promptly rather than sleeping the full 10s backoff
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_per_attempt_timeout() {
        let manager = RetryManager::new(RetryConfig {
            max_retries: 0,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_factor: 2.0,
            jitter_ms: 0,
            operation_timeout_ms: 20,
            immediate_first: false,
        })
        .unwrap();

        let result: Result<u32, TestError> = manager
            .execute_with_retry(
                "op",
                || async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(1)
                },
                should_retry,
                create_error,
            )
            .await;

        assert!(matches!(result, Err(TestError::Transient(msg)) if msg.contains("timed out")));
    }
}
