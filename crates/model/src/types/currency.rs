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

//! Represents a medium of exchange in a specified denomination with a fixed
//! decimal precision.

use std::{
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    str::FromStr,
};

use helm_core::correctness::{FAILED, check_valid_string};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ustr::Ustr;

use crate::{currencies::CURRENCY_MAP, enums::CurrencyType, types::fixed::check_fixed_precision};

/// Represents a medium of exchange in a specified denomination with a fixed
/// decimal precision.
///
/// Handles up to nine decimals of precision.
#[repr(C)]
#[derive(Clone, Copy, Eq)]
pub struct Currency {
    /// The currency code as an uppercase string (e.g. `USD`, `BTC`).
    pub code: Ustr,
    /// The currency decimal precision.
    pub precision: u8,
    /// The ISO 4217 currency code (zero for non-ISO currencies).
    pub iso4217: u16,
    /// The full name of the currency.
    pub name: Ustr,
    /// The currency type, such as `FIAT` or `CRYPTO`.
    pub currency_type: CurrencyType,
}

impl Currency {
    /// Creates a new [`Currency`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `code` or `name` are invalid strings, or if
    /// `precision` exceeds the maximum.
    pub fn new_checked<T: AsRef<str>>(
        code: T,
        precision: u8,
        iso4217: u16,
        name: T,
        currency_type: CurrencyType,
    ) -> anyhow::Result<Self> {
        let code = code.as_ref();
        let name = name.as_ref();
        check_valid_string(code, stringify!(code))?;
        check_valid_string(name, stringify!(name))?;
        check_fixed_precision(precision)?;

        Ok(Self {
            code: Ustr::from(code),
            precision,
            iso4217,
            name: Ustr::from(name),
            currency_type,
        })
    }

    /// Creates a new [`Currency`] instance.
    ///
    /// # Panics
    ///
    /// Panics if a correctness check fails.
    pub fn new<T: AsRef<str>>(
        code: T,
        precision: u8,
        iso4217: u16,
        name: T,
        currency_type: CurrencyType,
    ) -> Self {
        Self::new_checked(code, precision, iso4217, name, currency_type).expect(FAILED)
    }

    /// Registers the given `currency` in the internal currency map, allowing
    /// it to be resolved by code.
    ///
    /// Existing entries are only replaced when `overwrite` is true.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal map lock is poisoned.
    pub fn register(currency: Self, overwrite: bool) -> anyhow::Result<()> {
        let mut map = CURRENCY_MAP
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire lock on `CURRENCY_MAP`: {e}"))?;

        if !overwrite && map.contains_key(currency.code.as_str()) {
            return Ok(());
        }

        map.insert(currency.code.to_string(), currency);
        Ok(())
    }

    /// Returns whether a currency with the given `code` is registered.
    #[must_use]
    pub fn is_registered(code: &str) -> bool {
        CURRENCY_MAP
            .lock()
            .map(|map| map.contains_key(code))
            .unwrap_or(false)
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let map_guard = CURRENCY_MAP
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire lock on `CURRENCY_MAP`: {e}"))?;
        map_guard
            .get(s)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown currency code: '{s}'"))
    }
}

impl From<&str> for Currency {
    /// Creates a [`Currency`] from a string slice.
    ///
    /// # Panics
    ///
    /// Panics if the `value` is not a registered currency code.
    fn from(value: &str) -> Self {
        Self::from_str(value).expect(FAILED)
    }
}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Debug for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(code={}, precision={}, currency_type={})",
            stringify!(Currency),
            self.code,
            self.precision,
            self.currency_type,
        )
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl Serialize for Currency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code.as_str())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code: String = Deserialize::deserialize(deserializer)?;
        Self::from_str(&code).map_err(serde::de::Error::custom)
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
    fn test_registered_currencies() {
        let usd = Currency::from("USD");
        assert_eq!(usd.precision, 2);
        assert_eq!(usd.iso4217, 840);
        assert_eq!(usd.currency_type, CurrencyType::Fiat);

        let btc = Currency::from("BTC");
        assert_eq!(btc.precision, 8);
        assert_eq!(btc.currency_type, CurrencyType::Crypto);
    }

    #[rstest]
    fn test_unknown_code_errors() {
        assert!(Currency::from_str("ZZZ").is_err());
    }

    #[rstest]
    fn test_register_custom_currency() {
        let currency = Currency::new("WIF", 6, 0, "dogwifhat", CurrencyType::Crypto);
        Currency::register(currency, false).unwrap();
        assert_eq!(Currency::from("WIF"), currency);
    }

    #[rstest]
    fn test_equality_by_code() {
        assert_eq!(Currency::from("USD"), Currency::from("USD"));
        assert_ne!(Currency::from("USD"), Currency::from("AUD"));
    }
}
