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

//! Fixed-precision conversion functions.
//!
//! All value types share a common raw integer backing scaled by
//! [`FIXED_SCALAR`], so raw values of any declared precision compare and add
//! directly.

/// The maximum precision for fixed-precision value types.
pub const FIXED_PRECISION: u8 = 9;

/// The scalar representing one whole unit in raw fixed-precision values.
pub const FIXED_SCALAR: f64 = 1_000_000_000.0;

/// Checks the given `precision` does not exceed [`FIXED_PRECISION`].
///
/// # Errors
///
/// Returns an error if `precision` exceeds [`FIXED_PRECISION`].
pub fn check_fixed_precision(precision: u8) -> anyhow::Result<()> {
    if precision > FIXED_PRECISION {
        anyhow::bail!("`precision` exceeded maximum `FIXED_PRECISION` (9), was {precision}")
    }
    Ok(())
}

/// Converts an `f64` to a raw fixed-precision `i64`, rounding at `precision`.
#[must_use]
pub fn f64_to_fixed_i64(value: f64, precision: u8) -> i64 {
    debug_assert!(precision <= FIXED_PRECISION);
    let pow1 = 10_i64.pow(u32::from(precision));
    let pow2 = 10_i64.pow(u32::from(FIXED_PRECISION - precision));
    let rounded = (value * pow1 as f64).round() as i64;
    rounded * pow2
}

/// Converts an `f64` to a raw fixed-precision `u64`, rounding at `precision`.
#[must_use]
pub fn f64_to_fixed_u64(value: f64, precision: u8) -> u64 {
    debug_assert!(precision <= FIXED_PRECISION);
    let pow1 = 10_u64.pow(u32::from(precision));
    let pow2 = 10_u64.pow(u32::from(FIXED_PRECISION - precision));
    let rounded = (value * pow1 as f64).round() as u64;
    rounded * pow2
}

/// Converts a raw fixed-precision `i64` to an `f64`.
#[must_use]
pub fn fixed_i64_to_f64(value: i64) -> f64 {
    value as f64 / FIXED_SCALAR
}

/// Converts a raw fixed-precision `u64` to an `f64`.
#[must_use]
pub fn fixed_u64_to_f64(value: u64) -> f64 {
    value as f64 / FIXED_SCALAR
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 0, 0)]
    #[case(1.0, 0, 1_000_000_000)]
    #[case(1.1, 1, 1_100_000_000)]
    #[case(0.000_000_001, 9, 1)]
    #[case(-1.5, 1, -1_500_000_000)]
    fn test_f64_to_fixed_i64(#[case] value: f64, #[case] precision: u8, #[case] expected: i64) {
        assert_eq!(f64_to_fixed_i64(value, precision), expected);
    }

    #[rstest]
    fn test_rounding_at_precision() {
        // Rounds at declared precision before scaling
        assert_eq!(f64_to_fixed_i64(1.15, 1), 1_200_000_000);
        assert_eq!(f64_to_fixed_u64(1.14, 1), 1_100_000_000);
    }

    #[rstest]
    fn test_round_trip() {
        let raw = f64_to_fixed_i64(1.0001, 4);
        assert_eq!(fixed_i64_to_f64(raw), 1.0001);
    }

    #[rstest]
    fn test_check_fixed_precision() {
        assert!(check_fixed_precision(9).is_ok());
        assert!(check_fixed_precision(10).is_err());
    }
}
