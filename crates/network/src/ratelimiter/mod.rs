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

//! A keyed rate limiter based on the generic cell rate algorithm (GCRA).
//!
//! Dual-window venue limits (a per-second burst cap plus a per-minute rolling
//! cap) are expressed as two keys checked together before a call proceeds.

pub mod quota;

use std::{hash::Hash, time::Duration, time::Instant};

use dashmap::DashMap;
use quota::Quota;

/// A keyed rate limiter with a default quota and optional per-key quotas.
///
/// A call blocks (cooperatively) until every consulted key permits it.
pub struct RateLimiter<K>
where
    K: Hash + Eq + Clone,
{
    default_quota: Option<Quota>,
    keyed_quotas: DashMap<K, Quota>,
    // GCRA theoretical-arrival-time per key (nanoseconds since `start`)
    states: DashMap<K, u64>,
    start: Instant,
}

impl<K> RateLimiter<K>
where
    K: Hash + Eq + Clone,
{
    /// Creates a new [`RateLimiter`] with the given default quota.
    #[must_use]
    pub fn new(default_quota: Option<Quota>) -> Self {
        Self::new_with_quota(default_quota, Vec::new())
    }

    /// Creates a new [`RateLimiter`] with a default quota and per-key quotas.
    #[must_use]
    pub fn new_with_quota(default_quota: Option<Quota>, keyed_quotas: Vec<(K, Quota)>) -> Self {
        let quotas = DashMap::new();
        for (key, quota) in keyed_quotas {
            quotas.insert(key, quota);
        }
        Self {
            default_quota,
            keyed_quotas: quotas,
            states: DashMap::new(),
            start: Instant::now(),
        }
    }

    /// Adds (or replaces) the quota for the given key.
    pub fn add_quota_for_key(&self, key: K, quota: Quota) {
        self.keyed_quotas.insert(key, quota);
    }

    fn quota_for_key(&self, key: &K) -> Option<Quota> {
        self.keyed_quotas
            .get(key)
            .map(|quota| *quota)
            .or(self.default_quota)
    }

    fn now_ns(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    /// Checks whether a cell for the given key conforms.
    ///
    /// # Errors
    ///
    /// Returns the duration until the key is next ready when rate limited.
    pub fn check_key(&self, key: &K) -> Result<(), Duration> {
        let Some(quota) = self.quota_for_key(key) else {
            return Ok(()); // No quota configured for this key
        };

        let t = quota.replenish_interval_ns();
        let tau = t * u64::from(quota.max_burst().get() - 1);
        let now = self.now_ns();

        let mut entry = self.states.entry(key.clone()).or_insert(0);
        let tat = (*entry).max(now);

        // Conforms when the theoretical arrival time is within burst tolerance
        if tat - now <= tau {
            *entry = tat + t;
            Ok(())
        } else {
            let ready_ns = tat - tau;
            Err(Duration::from_nanos(ready_ns - now))
        }
    }

    /// Waits (cooperatively) until the given key permits a cell.
    pub async fn until_key_ready(&self, key: &K) {
        loop {
            match self.check_key(key) {
                Ok(()) => return,
                Err(wait) => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Waits (cooperatively) until every given key permits a cell.
    pub async fn await_keys_ready(&self, keys: Option<Vec<K>>) {
        if let Some(keys) = keys {
            for key in &keys {
                self.until_key_ready(key).await;
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_burst_capacity_then_limited() {
        let limiter: RateLimiter<String> =
            RateLimiter::new(Some(Quota::per_minute(NonZeroU32::new(5).unwrap())));
        let key = "venue:minute".to_string();

        for _ in 0..5 {
            assert!(limiter.check_key(&key).is_ok());
        }
        // Burst exhausted; replenishment is 12s per cell
        let wait = limiter.check_key(&key).unwrap_err();
        assert!(wait > Duration::from_secs(11));
    }

    #[rstest]
    fn test_keys_limited_independently(
    ) {
        let limiter: RateLimiter<String> =
            RateLimiter::new(Some(Quota::per_minute(NonZeroU32::new(1).unwrap())));

        assert!(limiter.check_key(&"a".to_string()).is_ok());
        assert!(limiter.check_key(&"b".to_string()).is_ok());
        assert!(limiter.check_key(&"a".to_string()).is_err());
    }

    #[rstest]
    fn test_keyed_quota_overrides_default() {
        let limiter = RateLimiter::new_with_quota(
            Some(Quota::per_minute(NonZeroU32::new(1).unwrap())),
            vec![(
                "generous".to_string(),
                Quota::per_second(NonZeroU32::new(100).unwrap()),
            )],
        );

        for _ in 0..50 {
            assert!(limiter.check_key(&"generous".to_string()).is_ok());
        }
        assert!(limiter.check_key(&"default".to_string()).is_ok());
        assert!(limiter.check_key(&"default".to_string()).is_err());
    }

    #[rstest]
    fn test_no_quota_always_permits() {
        let limiter: RateLimiter<String> = RateLimiter::new(None);
        for _ in 0..1_000 {
            assert!(limiter.check_key(&"any".to_string()).is_ok());
        }
    }

    #[tokio::test]
    async fn test_until_key_ready_waits() {
        let limiter: RateLimiter<String> = RateLimiter::new(Some(
            Quota::with_period(Duration::from_millis(20)).unwrap(),
        ));
        let key = "key".to_string();

        let start = Instant::now();
        limiter.until_key_ready(&key).await;
        limiter.until_key_ready(&key).await;
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
