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

//! Common datetime conversion functions.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::nanos::UnixNanos;

/// Converts seconds to nanoseconds (ns).
#[inline]
#[must_use]
pub fn secs_to_nanos(secs: f64) -> u64 {
    (secs * 1_000_000_000.0) as u64
}

/// Converts seconds to milliseconds (ms).
#[inline]
#[must_use]
pub fn secs_to_millis(secs: f64) -> u64 {
    (secs * 1_000.0) as u64
}

/// Converts milliseconds (ms) to nanoseconds (ns).
#[inline]
#[must_use]
pub fn millis_to_nanos(millis: f64) -> u64 {
    (millis * 1_000_000.0) as u64
}

/// Converts nanoseconds (ns) to seconds.
#[inline]
#[must_use]
pub fn nanos_to_secs(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000_000.0
}

/// Converts nanoseconds (ns) to milliseconds (ms).
#[inline]
#[must_use]
pub const fn nanos_to_millis(nanos: u64) -> u64 {
    nanos / 1_000_000
}

/// Converts UNIX nanoseconds to an ISO 8601 (RFC 3339) format string with nanosecond precision.
#[inline]
#[must_use]
pub fn unix_nanos_to_iso8601(unix_nanos: UnixNanos) -> String {
    let datetime = DateTime::<Utc>::from(unix_nanos.to_datetime_utc());
    datetime.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Converts UNIX nanoseconds to an ISO 8601 (RFC 3339) format string with millisecond precision.
#[inline]
#[must_use]
pub fn unix_nanos_to_iso8601_millis(unix_nanos: UnixNanos) -> String {
    let datetime = DateTime::<Utc>::from(unix_nanos.to_datetime_utc());
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 0)]
    #[case(1.0, 1_000_000_000)]
    #[case(1.1, 1_100_000_000)]
    fn test_secs_to_nanos(#[case] value: f64, #[case] expected: u64) {
        assert_eq!(secs_to_nanos(value), expected);
    }

    #[rstest]
    fn test_millis_to_nanos() {
        assert_eq!(millis_to_nanos(1.0), 1_000_000);
        assert_eq!(nanos_to_millis(1_000_000), 1);
    }

    #[rstest]
    fn test_unix_nanos_to_iso8601() {
        let nanos = UnixNanos::from(1_000_000_000);
        assert_eq!(unix_nanos_to_iso8601(nanos), "1970-01-01T00:00:01.000000000Z");
        assert_eq!(unix_nanos_to_iso8601_millis(nanos), "1970-01-01T00:00:01.000Z");
    }
}
