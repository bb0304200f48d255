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

//! Represents a price in a market with a specified precision.

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use helm_core::correctness::{FAILED, check_in_range_inclusive_f64};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::fixed::{FIXED_PRECISION, FIXED_SCALAR, check_fixed_precision, f64_to_fixed_i64};

/// The maximum valid price value which can be represented.
pub const PRICE_MAX: f64 = 9_223_372_036.0;

/// The minimum valid price value which can be represented.
pub const PRICE_MIN: f64 = -9_223_372_036.0;

/// Represents a price in a market.
///
/// The number of decimal places may vary. For certain asset classes, prices
/// may have negative values. For example, prices for options instruments can
/// be negative under certain conditions. All raw values share the common
/// [`FIXED_SCALAR`] backing, so prices of different precisions compare
/// directly.
#[repr(C)]
#[derive(Clone, Copy, Default, Eq)]
pub struct Price {
    /// The raw price value scaled by [`FIXED_SCALAR`].
    pub raw: i64,
    /// The number of decimal places for the price.
    pub precision: u8,
}

impl Price {
    /// Creates a new [`Price`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is invalid outside the representable range
    /// [`PRICE_MIN`, `PRICE_MAX`], or if `precision` exceeds the maximum.
    pub fn new_checked(value: f64, precision: u8) -> anyhow::Result<Self> {
        check_in_range_inclusive_f64(value, PRICE_MIN, PRICE_MAX, stringify!(value))?;
        check_fixed_precision(precision)?;

        Ok(Self {
            raw: f64_to_fixed_i64(value, precision),
            precision,
        })
    }

    /// Creates a new [`Price`] instance.
    ///
    /// # Panics
    ///
    /// Panics if a correctness check fails.
    pub fn new(value: f64, precision: u8) -> Self {
        Self::new_checked(value, precision).expect(FAILED)
    }

    /// Creates a new [`Price`] instance from the given raw fixed-precision value.
    ///
    /// # Panics
    ///
    /// Panics if `precision` exceeds the maximum.
    pub fn from_raw(raw: i64, precision: u8) -> Self {
        check_fixed_precision(precision).expect(FAILED);
        Self { raw, precision }
    }

    /// Creates a new [`Price`] instance with a value of zero at the given precision.
    #[must_use]
    pub fn zero(precision: u8) -> Self {
        Self::new(0.0, precision)
    }

    /// Returns whether the price value is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Returns whether the price value is positive (> 0).
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.raw > 0
    }

    /// Returns the price value as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.raw as f64 / FIXED_SCALAR
    }

    /// Returns the price value as a `Decimal`.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.raw), u32::from(FIXED_PRECISION))
            .round_dp(u32::from(self.precision))
            .normalize()
    }

    /// Returns a formatted string representation (fixed decimals at precision).
    #[must_use]
    pub fn to_formatted_string(&self) -> String {
        format!("{:.*}", self.precision as usize, self.as_f64())
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(value)
            .map_err(|e| format!("Error parsing `Price` from '{value}': {e}"))?;
        let precision = decimal.scale() as u8;
        check_fixed_precision(precision).map_err(|e| e.to_string())?;
        let value = decimal
            .to_f64()
            .ok_or_else(|| format!("Error parsing `Price` from '{value}'"))?;
        Self::new_checked(value, precision).map_err(|e| e.to_string())
    }
}

impl From<&str> for Price {
    /// Creates a [`Price`] from a string slice.
    ///
    /// # Panics
    ///
    /// Panics if the `value` string is not a valid decimal.
    fn from(value: &str) -> Self {
        Self::from_str(value).expect(FAILED)
    }
}

impl Hash for Price {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Neg for Price {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            raw: -self.raw,
            precision: self.precision,
        }
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            raw: self
                .raw
                .checked_add(rhs.raw)
                .expect("Overflow occurred when adding `Price`"),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            raw: self
                .raw
                .checked_sub(rhs.raw)
                .expect("Underflow occurred when subtracting `Price`"),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Price {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Debug for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({:.*})",
            stringify!(Price),
            self.precision as usize,
            self.as_f64()
        )
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.*}", self.precision as usize, self.as_f64())
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value_str = String::deserialize(deserializer)?;
        Self::from_str(&value_str).map_err(serde::de::Error::custom)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_new() {
        let price = Price::new(1.00001, 5);
        assert_eq!(price.precision, 5);
        assert_eq!(price.raw, 1_000_010_000);
        assert_eq!(price.as_f64(), 1.00001);
    }

    #[rstest]
    fn test_from_str() {
        let price = Price::from("1.0001");
        assert_eq!(price.precision, 4);
        assert_eq!(price.as_decimal(), dec!(1.0001));
    }

    #[rstest]
    #[should_panic(expected = "Condition failed")]
    fn test_precision_exceeds_max_panics() {
        let _ = Price::new(1.0, 10);
    }

    #[rstest]
    fn test_new_checked_invalid_value() {
        assert!(Price::new_checked(f64::NAN, 2).is_err());
        assert!(Price::new_checked(PRICE_MAX * 2.0, 2).is_err());
    }

    #[rstest]
    fn test_comparisons_across_precisions() {
        assert!(Price::new(1.5, 1) > Price::new(1.4999, 4));
        assert_eq!(Price::new(1.5, 1), Price::new(1.5000, 4));
    }

    #[rstest]
    fn test_arithmetic() {
        let a = Price::new(1.0001, 4);
        let b = Price::new(0.0002, 4);
        assert_eq!((a + b).as_f64(), 1.0003);
        assert_eq!((a - b).as_f64(), 0.9999);
        assert_eq!((-a).as_f64(), -1.0001);
    }

    #[rstest]
    fn test_display() {
        let price = Price::new(1.5, 4);
        assert_eq!(price.to_string(), "1.5000");
        assert_eq!(format!("{price:?}"), "Price(1.5000)");
    }

    #[rstest]
    fn test_serde_round_trip() {
        let price = Price::new(1.0001, 4);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"1.0001\"");
        let deserialized: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, price);
    }
}
