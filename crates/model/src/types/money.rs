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

//! Represents an amount of money in a specified currency denomination.

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use helm_core::correctness::{FAILED, check_in_range_inclusive_f64};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{
    Currency,
    fixed::{FIXED_PRECISION, FIXED_SCALAR, f64_to_fixed_i64},
};

/// The maximum valid money amount which can be represented.
pub const MONEY_MAX: f64 = 9_223_372_036.0;

/// The minimum valid money amount which can be represented.
pub const MONEY_MIN: f64 = -9_223_372_036.0;

/// Represents an amount of money in a specified currency denomination.
#[repr(C)]
#[derive(Clone, Copy, Eq)]
pub struct Money {
    /// The raw monetary amount scaled by [`FIXED_SCALAR`].
    pub raw: i64,
    /// The currency denomination associated with the monetary amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new [`Money`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is invalid outside the representable range
    /// [`MONEY_MIN`, `MONEY_MAX`].
    pub fn new_checked(amount: f64, currency: Currency) -> anyhow::Result<Self> {
        check_in_range_inclusive_f64(amount, MONEY_MIN, MONEY_MAX, stringify!(amount))?;

        Ok(Self {
            raw: f64_to_fixed_i64(amount, currency.precision),
            currency,
        })
    }

    /// Creates a new [`Money`] instance.
    ///
    /// # Panics
    ///
    /// Panics if a correctness check fails.
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self::new_checked(amount, currency).expect(FAILED)
    }

    /// Creates a new [`Money`] instance from the given raw fixed-precision value.
    #[must_use]
    pub const fn from_raw(raw: i64, currency: Currency) -> Self {
        Self { raw, currency }
    }

    /// Returns whether the monetary amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Returns the monetary amount as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.raw as f64 / FIXED_SCALAR
    }

    /// Returns the monetary amount as a `Decimal`.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.raw), u32::from(FIXED_PRECISION))
            .round_dp(u32::from(self.currency.precision))
            .normalize()
    }

    /// Returns a formatted string representation including the currency code.
    #[must_use]
    pub fn to_formatted_string(&self) -> String {
        format!(
            "{:.*} {}",
            self.currency.precision as usize,
            self.as_f64(),
            self.currency.code,
        )
    }
}

impl FromStr for Money {
    type Err = String;

    /// Parses a money string in the format `"{amount} {currency_code}"`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (amount_str, code) = value
            .rsplit_once(' ')
            .ok_or_else(|| format!("Error parsing `Money` from '{value}': invalid format"))?;
        let amount = Decimal::from_str(amount_str)
            .map_err(|e| format!("Error parsing `Money` from '{value}': {e}"))?
            .to_f64()
            .ok_or_else(|| format!("Error parsing `Money` from '{value}'"))?;
        let currency = Currency::from_str(code).map_err(|e| e.to_string())?;
        Self::new_checked(amount, currency).map_err(|e| e.to_string())
    }
}

impl From<&str> for Money {
    /// Creates a [`Money`] from a string slice.
    ///
    /// # Panics
    ///
    /// Panics if the `value` string is not in `"{amount} {code}"` format.
    fn from(value: &str) -> Self {
        Self::from_str(value).expect(FAILED)
    }
}

impl Hash for Money {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
        self.currency.hash(state);
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.currency == other.currency
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        debug_assert_eq!(self.currency, other.currency);
        self.raw.partial_cmp(&other.raw)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            raw: -self.raw,
            currency: self.currency,
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.currency, rhs.currency);
        Self {
            raw: self
                .raw
                .checked_add(rhs.raw)
                .expect("Overflow occurred when adding `Money`"),
            currency: self.currency,
        }
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.currency, rhs.currency);
        Self {
            raw: self
                .raw
                .checked_sub(rhs.raw)
                .expect("Underflow occurred when subtracting `Money`"),
            currency: self.currency,
        }
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul<f64> for Money {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.as_f64() * rhs, self.currency)
    }
}

impl Debug for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({:.*}, {})",
            stringify!(Money),
            self.currency.precision as usize,
            self.as_f64(),
            self.currency.code,
        )
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.*} {}",
            self.currency.precision as usize,
            self.as_f64(),
            self.currency.code,
        )
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
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

    use super::*;

    #[rstest]
    fn test_new() {
        let money = Money::new(100.50, Currency::USD());
        assert_eq!(money.as_f64(), 100.50);
        assert_eq!(money.to_string(), "100.50 USD");
    }

    #[rstest]
    fn test_from_str() {
        let money = Money::from("10.00 USD");
        assert_eq!(money, Money::new(10.0, Currency::USD()));
    }

    #[rstest]
    fn test_from_str_invalid_format() {
        assert!(Money::from_str("10.00").is_err());
    }

    #[rstest]
    fn test_arithmetic() {
        let a = Money::new(10.0, Currency::USD());
        let b = Money::new(2.5, Currency::USD());
        assert_eq!((a + b).as_f64(), 12.5);
        assert_eq!((a - b).as_f64(), 7.5);
        assert_eq!((-a).as_f64(), -10.0);
        assert_eq!((a * 0.5).as_f64(), 5.0);
    }

    #[rstest]
    fn test_rounds_to_currency_precision() {
        // JPY has zero decimal precision
        let money = Money::new(100.4, Currency::JPY());
        assert_eq!(money.as_f64(), 100.0);
    }
}
