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

//! Defines commonly used currency constants and the internal currency map.

use std::{
    collections::HashMap,
    sync::{LazyLock, Mutex},
};

use ustr::Ustr;

use crate::{enums::CurrencyType, types::Currency};

const fn currency(
    code: &'static str,
    precision: u8,
    iso4217: u16,
    currency_type: CurrencyType,
) -> (&'static str, u8, u16, CurrencyType) {
    (code, precision, iso4217, currency_type)
}

const CURRENCIES: &[(&str, u8, u16, CurrencyType)] = &[
    // Fiat
    currency("AUD", 2, 36, CurrencyType::Fiat),
    currency("CAD", 2, 124, CurrencyType::Fiat),
    currency("CHF", 2, 756, CurrencyType::Fiat),
    currency("CNY", 2, 156, CurrencyType::Fiat),
    currency("EUR", 2, 978, CurrencyType::Fiat),
    currency("GBP", 2, 826, CurrencyType::Fiat),
    currency("HKD", 2, 344, CurrencyType::Fiat),
    currency("JPY", 0, 392, CurrencyType::Fiat),
    currency("NZD", 2, 554, CurrencyType::Fiat),
    currency("SGD", 2, 702, CurrencyType::Fiat),
    currency("USD", 2, 840, CurrencyType::Fiat),
    // Crypto
    currency("ADA", 6, 0, CurrencyType::Crypto),
    currency("BNB", 8, 0, CurrencyType::Crypto),
    currency("BTC", 8, 0, CurrencyType::Crypto),
    currency("DOGE", 8, 0, CurrencyType::Crypto),
    currency("ETH", 8, 0, CurrencyType::Crypto),
    currency("SOL", 8, 0, CurrencyType::Crypto),
    currency("USDC", 8, 0, CurrencyType::Crypto),
    currency("USDT", 8, 0, CurrencyType::Crypto),
    currency("XBT", 8, 0, CurrencyType::Crypto),
    currency("XRP", 6, 0, CurrencyType::Crypto),
];

/// The internal map of registered currencies, keyed by code.
pub static CURRENCY_MAP: LazyLock<Mutex<HashMap<String, Currency>>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (code, precision, iso4217, currency_type) in CURRENCIES {
        let currency = Currency {
            code: Ustr::from(code),
            precision: *precision,
            iso4217: *iso4217,
            name: Ustr::from(code),
            currency_type: *currency_type,
        };
        map.insert((*code).to_string(), currency);
    }
    Mutex::new(map)
});

#[allow(non_snake_case)]
impl Currency {
    /// Returns the United States dollar.
    pub fn USD() -> Self {
        Self::from("USD")
    }

    /// Returns the Australian dollar.
    pub fn AUD() -> Self {
        Self::from("AUD")
    }

    /// Returns the Euro.
    pub fn EUR() -> Self {
        Self::from("EUR")
    }

    /// Returns the British pound sterling.
    pub fn GBP() -> Self {
        Self::from("GBP")
    }

    /// Returns the Japanese yen.
    pub fn JPY() -> Self {
        Self::from("JPY")
    }

    /// Returns Bitcoin.
    pub fn BTC() -> Self {
        Self::from("BTC")
    }

    /// Returns Ether.
    pub fn ETH() -> Self {
        Self::from("ETH")
    }

    /// Returns Tether (USDT).
    pub fn USDT() -> Self {
        Self::from("USDT")
    }

    /// Returns USD Coin.
    pub fn USDC() -> Self {
        Self::from("USDC")
    }
}
