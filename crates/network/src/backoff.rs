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

//! An exponential backoff mechanism with jitter.

use std::time::Duration;

use rand::Rng;

/// Provides exponential backoff delays with uniform jitter.
///
/// The base delay grows by `factor` on each call up to `delay_max`; the
/// returned duration adds uniform jitter in `[0, jitter_ms]`. With
/// `immediate_first` the first call returns zero (an immediate reconnect
/// attempt) before backoff engages.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    delay_initial: Duration,
    delay_max: Duration,
    delay_current: Duration,
    factor: f64,
    jitter_ms: u64,
    immediate_first: bool,
    attempt_count: u32,
}

impl ExponentialBackoff {
    /// Creates a new [`ExponentialBackoff`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `delay_initial` is zero, `delay_max` is less than
    /// `delay_initial`, or `factor` is not greater than 1.0.
    pub fn new(
        delay_initial: Duration,
        delay_max: Duration,
        factor: f64,
        jitter_ms: u64,
        immediate_first: bool,
    ) -> anyhow::Result<Self> {
        if delay_initial.is_zero() {
            anyhow::bail!("`delay_initial` must be positive");
        }
        if delay_max < delay_initial {
            anyhow::bail!("`delay_max` must be >= `delay_initial`");
        }
        if factor <= 1.0 {
            anyhow::bail!("`factor` must be > 1.0, was {factor}");
        }

        Ok(Self {
            delay_initial,
            delay_max,
            delay_current: delay_initial,
            factor,
            jitter_ms,
            immediate_first,
            attempt_count: 0,
        })
    }

    /// Returns the current base delay (before jitter).
    #[must_use]
    pub const fn current_delay(&self) -> Duration {
        self.delay_current
    }

    /// Returns the count of delays produced since the last reset.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Returns the next backoff duration and advances the schedule.
    pub fn next_duration(&mut self) -> Duration {
        self.attempt_count += 1;

        if self.immediate_first && self.attempt_count == 1 {
            return Duration::ZERO;
        }

        let jitter = rand::rng().random_range(0..=self.jitter_ms);
        let delay = self.delay_current + Duration::from_millis(jitter);

        let next_ms = (self.delay_current.as_millis() as f64 * self.factor) as u64;
        self.delay_current = Duration::from_millis(next_ms).min(self.delay_max);

        delay
    }

    /// Resets the backoff to its initial state.
    pub fn reset(&mut self) {
        self.delay_current = self.delay_initial;
        self.attempt_count = 0;
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn backoff() -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(100),
            Duration::from_millis(1_000),
            2.0,
            0,
            false,
        )
        .unwrap()
    }

    #[rstest]
    fn test_invalid_params_rejected() {
        assert!(
            ExponentialBackoff::new(Duration::ZERO, Duration::from_millis(1), 2.0, 0, false)
                .is_err()
        );
        assert!(
            ExponentialBackoff::new(
                Duration::from_millis(100),
                Duration::from_millis(10),
                2.0,
                0,
                false,
            )
            .is_err()
        );
        assert!(
            ExponentialBackoff::new(
                Duration::from_millis(100),
                Duration::from_millis(1_000),
                1.0,
                0,
                false,
            )
            .is_err()
        );
    }

    #[rstest]
    fn test_exponential_growth_to_max() {
        let mut backoff = backoff();
        assert_eq!(backoff.next_duration(), Duration::from_millis(100));
        assert_eq!(backoff.next_duration(), Duration::from_millis(200));
        assert_eq!(backoff.next_duration(), Duration::from_millis(400));
        assert_eq!(backoff.next_duration(), Duration::from_millis(800));
        // Caps at delay_max
        assert_eq!(backoff.next_duration(), Duration::from_millis(1_000));
        assert_eq!(backoff.next_duration(), Duration::from_millis(1_000));
    }

    #[rstest]
    fn test_immediate_first() {
        let mut backoff = ExponentialBackoff::new(
            Duration::from_millis(100),
            Duration::from_millis(1_000),
            2.0,
            0,
            true,
        )
        .unwrap();
        assert_eq!(backoff.next_duration(), Duration::ZERO);
        assert_eq!(backoff.next_duration(), Duration::from_millis(100));
    }

    #[rstest]
    fn test_reset() {
        let mut backoff = backoff();
        let _ = backoff.next_duration();
        let _ = backoff.next_duration();
        backoff.reset();
        assert_eq!(backoff.attempt_count(), 0);
        assert_eq!(backoff.next_duration(), Duration::from_millis(100));
    }

    #[rstest]
    fn test_jitter_bounds() {
        let mut backoff = ExponentialBackoff::new(
            Duration::from_millis(100),
            Duration::from_millis(1_000),
            2.0,
            50,
            false,
        )
        .unwrap();
        for _ in 0..100 {
            let base = backoff.current_delay();
            let delay = backoff.next_duration();
            assert!(delay >= base);
            assert!(delay <= base + Duration::from_millis(50));
        }
    }
}
