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

//! Property-based tests for the keyed rate limiter.

use std::num::NonZeroU32;

use helm_network::ratelimiter::{RateLimiter, quota::Quota};
use proptest::prelude::*;

proptest! {
    /// Property: a fresh limiter always permits exactly the burst capacity
    /// without waiting.
    #[test]
    fn burst_capacity_honored(rate in 1u32..=100) {
        let rate_nonzero = NonZeroU32::new(rate).unwrap();
        let quota = Quota::per_minute(rate_nonzero);
        let limiter: RateLimiter<String> = RateLimiter::new_with_quota(Some(quota), vec![]);
        let key = "key".to_string();

        for _ in 0..rate {
            prop_assert!(limiter.check_key(&key).is_ok());
        }
        prop_assert!(limiter.check_key(&key).is_err());
    }

    /// Property: distinct keys are rate limited independently.
    #[test]
    fn keys_independent(rate in 1u32..=20, key_count in 2usize..=10) {
        let rate_nonzero = NonZeroU32::new(rate).unwrap();
        let quota = Quota::per_minute(rate_nonzero);
        let limiter: RateLimiter<String> = RateLimiter::new_with_quota(Some(quota), vec![]);

        for i in 0..key_count {
            let key = format!("key-{i}");
            for _ in 0..rate {
                prop_assert!(limiter.check_key(&key).is_ok());
            }
            prop_assert!(limiter.check_key(&key).is_err());
        }
    }

    /// Property: quota interval calculations never overflow and divide the
    /// period exactly across the rate.
    #[test]
    fn quota_intervals_exact(rate in 1u32..=10_000) {
        let rate_nonzero = NonZeroU32::new(rate).unwrap();

        let second = Quota::per_second(rate_nonzero);
        let minute = Quota::per_minute(rate_nonzero);
        let hour = Quota::per_hour(rate_nonzero);

        prop_assert_eq!(second.replenish_interval_ns(), 1_000_000_000 / u64::from(rate));
        prop_assert_eq!(minute.replenish_interval_ns(), 60_000_000_000 / u64::from(rate));
        prop_assert_eq!(hour.replenish_interval_ns(), 3_600_000_000_000 / u64::from(rate));
    }

    /// Property: per-key quotas override the default quota.
    #[test]
    fn keyed_quota_overrides_default(default_rate in 1u32..=5, key_rate in 6u32..=50) {
        let default_quota = Quota::per_minute(NonZeroU32::new(default_rate).unwrap());
        let key_quota = Quota::per_minute(NonZeroU32::new(key_rate).unwrap());

        let limiter = RateLimiter::new_with_quota(
            Some(default_quota),
            vec![("keyed".to_string(), key_quota)],
        );

        for _ in 0..key_rate {
            prop_assert!(limiter.check_key(&"keyed".to_string()).is_ok());
        }
        prop_assert!(limiter.check_key(&"keyed".to_string()).is_err());

        for _ in 0..default_rate {
            prop_assert!(limiter.check_key(&"other".to_string()).is_ok());
        }
        prop_assert!(limiter.check_key(&"other".to_string()).is_err());
    }
}
