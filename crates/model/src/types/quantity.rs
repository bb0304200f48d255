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

//! Represents a quantity with a non-negative value and a specified precision.

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use helm_core::correctness::{FAILED, check_in_range_inclusive_f64};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::fixed::{FIXED_PRECISION, FIXED_SCALAR, check_fixed_precision, f64_to_fixed_u64};

/// The maximum valid quantity value which can be represented.
pub const QUANTITY_MAX: f64 = 18_446_744_073.0;

/// Represents a quantity with a non-negative value.
///
/// Capable of storing either a whole number (no decimal places) of 'contracts'
/// or 'shares' (instruments denominated in whole units) or a decimal value
/// containing decimal places for instruments denominated in fractional units.
#[repr(C)]
#[derive(Clone, Copy, Default, Eq)]
pub struct Quantity {
    /// The raw quantity value scaled by [`FIXED_SCALAR`].
    pub raw: u64,
    /// The number of decimal places for the quantity.
    pub precision: u8,
}

impl Quantity {
    /// Creates a new [`Quantity`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is negative, non-finite or exceeds
    /// [`QUANTITY_MAX`], or if `precision` exceeds the maximum.
    pub fn new_checked(value: f64, precision: u8) -> anyhow::Result<Self> {
        check_in_range_inclusive_f64(value, 0.0, QUANTITY_MAX, stringify!(value))?;
        check_fixed_precision(precision)?;

        Ok(Self {
            raw: f64_to_fixed_u64(value, precision),
            precision,
        })
    }

    /// Creates a new [`Quantity`] instance.
    ///
    /// # Panics
    ///
    /// Panics if a correctness check fails.
    pub fn new(value: f64, precision: u8) -> Self {
        Self::new_checked(value, precision).expect(FAILED)
    }

    /// Creates a new [`Quantity`] instance from the given raw fixed-precision value.
    ///
    /// # Panics
    ///
    /// Panics if `precision` exceeds the maximum.
    pub fn from_raw(raw: u64, precision: u8) -> Self {
        check_fixed_precision(precision).expect(FAILED);
        Self { raw, precision }
    }

    /// Creates a new [`Quantity`] instance with a value of zero at the given precision.
    #[must_use]
    pub fn zero(precision: u8) -> Self {
        Self::new(0.0, precision)
    }

    /// Returns whether the quantity value is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Returns whether the quantity value is positive (> 0).
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.raw > 0
    }

    /// Returns the quantity value as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.raw as f64 / FIXED_SCALAR
    }

    /// Returns the quantity value as a `Decimal`.
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

    /// Returns the quantity saturating-subtracted by `other`, floored at zero.
    #[must_use]
    pub fn saturating_sub(&self, other: Self) -> Self {
        Self {
            raw: self.raw.saturating_sub(other.raw),
            precision: self.precision,
        }
    }
}

impl FromStr for Quantity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(value)
            .map_err(|e| format!("Error parsing `Quantity` from '{value}': {e}"))?;
        let precision = decimal.scale() as u8;
        check_fixed_precision(precision).map_err(|e| e.to_string())?;
        let value = decimal
            .to_f64()
            .ok_or_else(|| format!("Error parsing `Quantity` from '{value}'"))?;
        Self::new_checked(value, precision).map_err(|e| e.to_string())
    }
}

impl From<&str> for Quantity {
    /// Creates a [`Quantity`] from a string slice.
    ///
    /// # Panics
    ///
    /// Panics if the `value` string is not a valid decimal.
    fn from(value: &str) -> Self {
        Self::from_str(value).expect(FAILED)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self::new(value as f64, 0)
    }
}

impl From<i32> for Quantity {
    fn from(value: i32) -> Self {
        debug_assert!(value >= 0);
        Self::new(f64::from(value), 0)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            raw: self
                .raw
                .checked_add(rhs.raw)
                .expect("Overflow occurred when adding `Quantity`"),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            raw: self
                .raw
                .checked_sub(rhs.raw)
                .expect("Underflow occurred when subtracting `Quantity`"),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Debug for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({:.*})",
            stringify!(Quantity),
            self.precision as usize,
            self.as_f64()
        )
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.*}", self.precision as usize, self.as_f64())
    }
}

impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
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
        let qty = Quantity::new(100.5, 1);
        assert_eq!(qty.raw, 100_500_000_000);
        assert_eq!(qty.as_f64(), 100.5);
        assert_eq!(qty.as_decimal(), dec!(100.5));
    }

    #[rstest]
    fn test_from_integer() {
        let qty = Quantity::from(100_u64);
        assert_eq!(qty.precision, 0);
        assert_eq!(qty.to_string(), "100");
    }

    #[rstest]
    fn test_negative_value_rejected() {
        assert!(Quantity::new_checked(-1.0, 0).is_err());
    }

    #[rstest]
    fn test_saturating_sub() {
        let a = Quantity::from(1_u64);
        let b = Quantity::from(2_u64);
        assert!(a.saturating_sub(b).is_zero());
    }

    #[rstest]
    fn test_arithmetic_and_ordering() {
        let a = Quantity::new(1.5, 1);
        let b = Quantity::new(0.5, 1);
        assert_eq!((a + b).as_f64(), 2.0);
        assert_eq!((a - b).as_f64(), 1.0);
        assert!(a > b);
    }
}
