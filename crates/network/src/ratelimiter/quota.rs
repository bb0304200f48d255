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

//! A rate-limiting quota expressed as cells over a replenishment period.

use std::{num::NonZeroU32, time::Duration};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// A rate-limiting quota: a maximum burst size and a cell replenishment
/// interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quota {
    max_burst: NonZeroU32,
    replenish_interval_ns: u64,
}

impl Quota {
    /// Constructs a quota for `max_burst` cells per second.
    #[must_use]
    pub const fn per_second(max_burst: NonZeroU32) -> Self {
        Self {
            max_burst,
            replenish_interval_ns: NANOS_PER_SECOND / max_burst.get() as u64,
        }
    }

    /// Constructs a quota for `max_burst` cells per minute.
    #[must_use]
    pub const fn per_minute(max_burst: NonZeroU32) -> Self {
        Self {
            max_burst,
            replenish_interval_ns: 60 * NANOS_PER_SECOND / max_burst.get() as u64,
        }
    }

    /// Constructs a quota for `max_burst` cells per hour.
    #[must_use]
    pub const fn per_hour(max_burst: NonZeroU32) -> Self {
        Self {
            max_burst,
            replenish_interval_ns: 3_600 * NANOS_PER_SECOND / max_burst.get() as u64,
        }
    }

    /// Constructs a quota replenishing one cell per `period`, or `None` if
    /// the period is zero.
    #[must_use]
    pub fn with_period(period: Duration) -> Option<Self> {
        if period.is_zero() {
            return None;
        }
        Some(Self {
            max_burst: NonZeroU32::MIN,
            replenish_interval_ns: period.as_nanos() as u64,
        })
    }

    /// Replaces the quota's maximum burst size.
    #[must_use]
    pub const fn allow_burst(mut self, max_burst: NonZeroU32) -> Self {
        self.max_burst = max_burst;
        self
    }

    /// Returns the maximum burst size.
    #[must_use]
    pub const fn max_burst(&self) -> NonZeroU32 {
        self.max_burst
    }

    /// Returns the cell replenishment interval in nanoseconds.
    #[must_use]
    pub const fn replenish_interval_ns(&self) -> u64 {
        self.replenish_interval_ns
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
    fn test_per_second() {
        let quota = Quota::per_second(NonZeroU32::new(10).unwrap());
        assert_eq!(quota.max_burst().get(), 10);
        assert_eq!(quota.replenish_interval_ns(), 100_000_000);
    }

    #[rstest]
    fn test_per_minute() {
        let quota = Quota::per_minute(NonZeroU32::new(60).unwrap());
        assert_eq!(quota.replenish_interval_ns(), 1_000_000_000);
    }

    #[rstest]
    fn test_with_period() {
        assert!(Quota::with_period(Duration::ZERO).is_none());
        let quota = Quota::with_period(Duration::from_millis(250)).unwrap();
        assert_eq!(quota.replenish_interval_ns(), 250_000_000);
        assert_eq!(quota.max_burst().get(), 1);
    }
}
