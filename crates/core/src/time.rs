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

//! The core `AtomicTime` for real-time and static clocks.
//!
//! In **real-time mode** reads are monotonic: each call returns a timestamp at
//! least one nanosecond greater than the previously returned value, even if
//! the system clock is stepped backwards. In **static mode** the stored value
//! only changes via `set_time` or `increment_time`.

use std::{
    ops::Deref,
    sync::{
        OnceLock,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::nanos::UnixNanos;

pub const NANOSECONDS_IN_SECOND: u64 = 1_000_000_000;
pub const NANOSECONDS_IN_MILLISECOND: u64 = 1_000_000;
pub const NANOSECONDS_IN_MICROSECOND: u64 = 1_000;

/// Global atomic time in **real-time mode** for use across the system.
pub static ATOMIC_CLOCK_REALTIME: OnceLock<AtomicTime> = OnceLock::new();

/// Global atomic time in **static mode** for use across the system.
pub static ATOMIC_CLOCK_STATIC: OnceLock<AtomicTime> = OnceLock::new();

/// Returns a static reference to the global atomic clock in **real-time mode**.
pub fn get_atomic_clock_realtime() -> &'static AtomicTime {
    ATOMIC_CLOCK_REALTIME.get_or_init(AtomicTime::default)
}

/// Returns a static reference to the global atomic clock in **static mode**.
pub fn get_atomic_clock_static() -> &'static AtomicTime {
    ATOMIC_CLOCK_STATIC.get_or_init(|| AtomicTime::new(false, UnixNanos::default()))
}

/// Returns the duration since the UNIX epoch from the system wall clock.
///
/// # Panics
///
/// Panics if the system clock reads earlier than the UNIX epoch.
#[must_use]
pub fn duration_since_unix_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Error calling `SystemTime::now.duration_since`")
}

/// Returns the nanoseconds since the UNIX epoch from the system wall clock.
#[must_use]
pub fn nanos_since_unix_epoch() -> u64 {
    duration_since_unix_epoch().as_nanos() as u64
}

/// Atomic time which can act as a real-time or static clock based on its mode.
#[derive(Debug)]
pub struct AtomicTime {
    /// Whether the clock is operating in real-time mode (`true`) or static mode (`false`).
    realtime: AtomicBool,
    /// The last recorded time in UNIX nanoseconds.
    timestamp_ns: AtomicU64,
}

impl Deref for AtomicTime {
    type Target = AtomicU64;

    fn deref(&self) -> &Self::Target {
        &self.timestamp_ns
    }
}

impl Default for AtomicTime {
    /// Creates a new default [`AtomicTime`] instance in real-time mode.
    fn default() -> Self {
        Self::new(true, UnixNanos::default())
    }
}

impl AtomicTime {
    /// Creates a new [`AtomicTime`] instance.
    #[must_use]
    pub fn new(realtime: bool, time: UnixNanos) -> Self {
        Self {
            realtime: AtomicBool::new(realtime),
            timestamp_ns: AtomicU64::new(time.as_u64()),
        }
    }

    /// Returns the current time in UNIX nanoseconds.
    #[must_use]
    pub fn get_time_ns(&self) -> UnixNanos {
        if self.realtime.load(Ordering::Relaxed) {
            self.time_since_epoch()
        } else {
            UnixNanos::from(self.timestamp_ns.load(Ordering::Acquire))
        }
    }

    /// Returns the current time in UNIX microseconds.
    #[must_use]
    pub fn get_time_us(&self) -> u64 {
        self.get_time_ns().as_u64() / NANOSECONDS_IN_MICROSECOND
    }

    /// Returns the current time in UNIX milliseconds.
    #[must_use]
    pub fn get_time_ms(&self) -> u64 {
        self.get_time_ns().as_u64() / NANOSECONDS_IN_MILLISECOND
    }

    /// Returns the current time in UNIX seconds.
    #[must_use]
    pub fn get_time(&self) -> f64 {
        self.get_time_ns().as_f64() / NANOSECONDS_IN_SECOND as f64
    }

    /// Manually sets a new time for the clock (only meaningful in static mode).
    pub fn set_time(&self, time: UnixNanos) {
        self.timestamp_ns.store(time.as_u64(), Ordering::Release);
    }

    /// Increments the static-mode time by `delta` nanoseconds and returns the updated value.
    ///
    /// # Errors
    ///
    /// Returns an error if incrementing would overflow.
    pub fn increment_time(&self, delta: u64) -> anyhow::Result<UnixNanos> {
        let previous = self.timestamp_ns.fetch_add(delta, Ordering::AcqRel);
        let new = previous
            .checked_add(delta)
            .ok_or_else(|| anyhow::anyhow!("Increment overflowed `u64` timestamp"))?;
        Ok(UnixNanos::from(new))
    }

    /// Returns a monotonic wall-clock timestamp.
    ///
    /// Each returned value is strictly greater than the last, shifting the
    /// reported time forward by one nanosecond when the system clock has not
    /// advanced (or has stepped backwards) between calls.
    #[must_use]
    pub fn time_since_epoch(&self) -> UnixNanos {
        let now = nanos_since_unix_epoch();
        let mut last = self.timestamp_ns.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.timestamp_ns.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return UnixNanos::from(next),
                Err(actual) => last = actual,
            }
        }
    }

    /// Switches the clock to real-time mode.
    pub fn make_realtime(&self) {
        self.realtime.store(true, Ordering::Relaxed);
    }

    /// Switches the clock to static mode.
    pub fn make_static(&self) {
        self.realtime.store(false, Ordering::Relaxed);
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
    fn test_static_mode_set_and_get() {
        let clock = AtomicTime::new(false, UnixNanos::default());
        clock.set_time(UnixNanos::from(500_000_000));
        assert_eq!(clock.get_time_ns().as_u64(), 500_000_000);
        assert_eq!(clock.get_time_ms(), 500);
    }

    #[rstest]
    fn test_static_mode_increment() {
        let clock = AtomicTime::new(false, UnixNanos::from(100));
        let updated = clock.increment_time(50).unwrap();
        assert_eq!(updated.as_u64(), 150);
        assert_eq!(clock.get_time_ns().as_u64(), 150);
    }

    #[rstest]
    fn test_realtime_monotonicity() {
        let clock = AtomicTime::default();
        let mut last = clock.get_time_ns();
        for _ in 0..1_000 {
            let next = clock.get_time_ns();
            assert!(next > last);
            last = next;
        }
    }

    #[rstest]
    fn test_mode_switching() {
        let clock = AtomicTime::new(false, UnixNanos::from(42));
        assert_eq!(clock.get_time_ns().as_u64(), 42);
        clock.make_realtime();
        assert!(clock.get_time_ns().as_u64() > 42);
    }
}
