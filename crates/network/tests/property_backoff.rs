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

//! Property-based tests for the exponential backoff mechanism.

use std::time::Duration;

use helm_network::backoff::ExponentialBackoff;
use proptest::prelude::*;

/// Generates valid backoff parameters.
fn backoff_params_strategy() -> impl Strategy<Value = (Duration, Duration, f64, u64, bool)> {
    (
        1u64..=5_000u64,   // initial_ms
        10u64..=60_000u64, // max_ms
        1.1f64..=10.0f64,  // factor
        0u64..=1_000u64,   // jitter_ms
        any::<bool>(),     // immediate_first
    )
        .prop_filter("max >= initial", |(initial_ms, max_ms, _, _, _)| {
            max_ms >= initial_ms
        })
        .prop_map(|(initial_ms, max_ms, factor, jitter_ms, immediate_first)| {
            (
                Duration::from_millis(initial_ms),
                Duration::from_millis(max_ms),
                factor,
                jitter_ms,
                immediate_first,
            )
        })
}

proptest! {
    /// Property: delays grow monotonically up to the maximum, and jitter is
    /// always within bounds.
    #[test]
    fn backoff_grows_to_max_with_bounded_jitter(
        (initial, max, factor, jitter_ms, immediate_first) in backoff_params_strategy(),
        iterations in 1usize..=20,
    ) {
        let mut backoff = ExponentialBackoff::new(initial, max, factor, jitter_ms, immediate_first)
            .expect("Valid backoff parameters");

        let mut last_base = Duration::ZERO;
        for i in 0..iterations {
            let base_before = backoff.current_delay();
            let delay = backoff.next_duration();
            let base_after = backoff.current_delay();

            if immediate_first && i == 0 {
                prop_assert_eq!(delay, Duration::ZERO);
                continue;
            }

            // Jitter bounds: base <= delay <= base + jitter
            prop_assert!(delay >= base_before);
            prop_assert!(delay <= base_before + Duration::from_millis(jitter_ms));

            // Base delay never exceeds maximum and never shrinks
            prop_assert!(base_after <= max);
            prop_assert!(base_after >= last_base.min(max));

            last_base = base_after;
        }
    }

    /// Property: reset always restores the initial state.
    #[test]
    fn backoff_reset_restores_initial(
        (initial, max, factor, jitter_ms, immediate_first) in backoff_params_strategy(),
        iterations in 1usize..=10,
    ) {
        let mut backoff = ExponentialBackoff::new(initial, max, factor, jitter_ms, immediate_first)
            .expect("Valid backoff parameters");

        for _ in 0..iterations {
            let _ = backoff.next_duration();
        }

        backoff.reset();
        prop_assert_eq!(backoff.current_delay(), initial);
        prop_assert_eq!(backoff.attempt_count(), 0);
    }

    /// Property: the total elapsed delay before terminal failure is bounded
    /// by the sum of the capped schedule plus jitter.
    #[test]
    fn backoff_total_delay_bounded(
        (initial, max, factor, jitter_ms, _) in backoff_params_strategy(),
        max_retries in 1u32..=10,
    ) {
        let mut backoff = ExponentialBackoff::new(initial, max, factor, jitter_ms, false)
            .expect("Valid backoff parameters");

        let mut total = Duration::ZERO;
        let mut bound = Duration::ZERO;
        let mut expected = initial;

        for _ in 0..max_retries {
            total += backoff.next_duration();
            bound += expected.min(max) + Duration::from_millis(jitter_ms);
            let next_ms = (expected.as_millis() as f64 * factor) as u64;
            expected = Duration::from_millis(next_ms).min(max);
        }

        prop_assert!(total <= bound);
    }
}
