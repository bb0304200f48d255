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

//! A `UnixNanos` type for working with timestamps in nanoseconds since the UNIX epoch.

use std::{
    cmp::Ordering,
    fmt::Display,
    ops::{Add, AddAssign, Deref, Sub, SubAssign},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a timestamp in nanoseconds since the UNIX epoch.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnixNanos(u64);

impl UnixNanos {
    /// Returns the underlying value as `u64`.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the underlying value as `i64`.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0 as i64
    }

    /// Returns the underlying value as `f64`.
    #[must_use]
    pub const fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Returns whether the timestamp is zero (the epoch).
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Converts the underlying value to a datetime (UTC).
    #[must_use]
    pub const fn to_datetime_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0 as i64)
    }

    /// Returns the timestamp saturating-added to `other`.
    #[must_use]
    pub const fn saturating_add(&self, other: u64) -> Self {
        Self(self.0.saturating_add(other))
    }

    /// Returns the timestamp saturating-subtracted by `other`.
    #[must_use]
    pub const fn saturating_sub(&self, other: u64) -> Self {
        Self(self.0.saturating_sub(other))
    }
}

impl Deref for UnixNanos {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<u64> for UnixNanos {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<u64> for UnixNanos {
    fn partial_cmp(&self, other: &u64) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

impl From<u64> for UnixNanos {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UnixNanos> for u64 {
    fn from(value: UnixNanos) -> Self {
        value.0
    }
}

impl From<DateTime<Utc>> for UnixNanos {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_nanos_opt().unwrap_or(0).max(0) as u64)
    }
}

impl FromStr for UnixNanos {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl Add for UnixNanos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(
            self.0
                .checked_add(rhs.0)
                .expect("Overflow occurred when adding `UnixNanos`"),
        )
    }
}

impl Add<u64> for UnixNanos {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(
            self.0
                .checked_add(rhs)
                .expect("Overflow occurred when adding `UnixNanos`"),
        )
    }
}

impl Sub for UnixNanos {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(
            self.0
                .checked_sub(rhs.0)
                .expect("Underflow occurred when subtracting `UnixNanos`"),
        )
    }
}

impl Sub<u64> for UnixNanos {
    type Output = Self;

    fn sub(self, rhs: u64) -> Self::Output {
        Self(
            self.0
                .checked_sub(rhs)
                .expect("Underflow occurred when subtracting `UnixNanos`"),
        )
    }
}

impl AddAssign<u64> for UnixNanos {
    fn add_assign(&mut self, other: u64) {
        self.0 += other;
    }
}

impl SubAssign<u64> for UnixNanos {
    fn sub_assign(&mut self, other: u64) {
        self.0 -= other;
    }
}

impl Display for UnixNanos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
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
    fn test_new_and_accessors() {
        let nanos = UnixNanos::from(123_456_789);
        assert_eq!(nanos.as_u64(), 123_456_789);
        assert_eq!(nanos.as_i64(), 123_456_789);
        assert!(!nanos.is_zero());
        assert!(UnixNanos::default().is_zero());
    }

    #[rstest]
    fn test_arithmetic() {
        let nanos = UnixNanos::from(100);
        assert_eq!(nanos + UnixNanos::from(50), UnixNanos::from(150));
        assert_eq!(nanos - 40u64, UnixNanos::from(60));
        assert_eq!(nanos.saturating_sub(200), UnixNanos::default());
    }

    #[rstest]
    #[should_panic(expected = "Underflow occurred when subtracting `UnixNanos`")]
    fn test_subtraction_underflow_panics() {
        let _ = UnixNanos::from(1) - UnixNanos::from(2);
    }

    #[rstest]
    fn test_to_datetime_utc() {
        let nanos = UnixNanos::from(1_000_000_000);
        assert_eq!(nanos.to_datetime_utc().timestamp(), 1);
    }

    #[rstest]
    fn test_serde_round_trip() {
        let nanos = UnixNanos::from(42);
        let json = serde_json::to_string(&nanos).unwrap();
        let deserialized: UnixNanos = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, nanos);
    }
}
