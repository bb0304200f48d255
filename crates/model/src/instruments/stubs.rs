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

//! Instrument stubs to facilitate testing.

use rstest::fixture;
use rust_decimal::Decimal;

use crate::{
    identifiers::{InstrumentId, Symbol},
    instruments::{CryptoPerpetual, CurrencyPair},
    types::{Currency, Price, Quantity},
};
use helm_core::UnixNanos;

/// AUD/USD.SIM Forex currency pair.
#[fixture]
pub fn audusd_sim() -> CurrencyPair {
    CurrencyPair::new(
        InstrumentId::from("AUD/USD.SIM"),
        Symbol::new("AUD/USD"),
        Currency::AUD(),
        Currency::USD(),
        5,
        0,
        Price::from("0.00001"),
        Quantity::from(1_u64),
        Some(Quantity::from(1_000_u64)),
        Some(Quantity::from(1_000_000_000_u64)),
        Some(Quantity::from(100_u64)),
        None,
        None,
        Some(Price::from("10.000")),
        Some(Price::from("0.00001")),
        Decimal::new(3, 2),  // 0.03
        Decimal::new(1, 2),  // 0.01
        Decimal::new(2, 5),  // 0.00002
        Decimal::new(2, 5),  // 0.00002
        UnixNanos::default(),
        UnixNanos::default(),
    )
}

/// ETHUSDT.BINANCE cryptocurrency spot pair.
#[fixture]
pub fn ethusdt_binance() -> CurrencyPair {
    CurrencyPair::new(
        InstrumentId::from("ETHUSDT.BINANCE"),
        Symbol::new("ETHUSDT"),
        Currency::ETH(),
        Currency::USDT(),
        2,
        5,
        Price::from("0.01"),
        Quantity::from("0.00001"),
        None,
        Some(Quantity::from(9_000_u64)),
        Some(Quantity::from("0.00001")),
        None,
        None,
        Some(Price::from("1000000.00")),
        Some(Price::from("0.01")),
        Decimal::new(1, 2),
        Decimal::new(35, 4),
        Decimal::new(1, 4),  // 0.0001
        Decimal::new(1, 4),  // 0.0001
        UnixNanos::default(),
        UnixNanos::default(),
    )
}

/// XBTUSD.BITMEX inverse perpetual swap.
#[fixture]
pub fn xbtusd_bitmex() -> CryptoPerpetual {
    CryptoPerpetual::new(
        InstrumentId::from("XBTUSD.BITMEX"),
        Symbol::new("XBTUSD"),
        Currency::BTC(),
        Currency::USD(),
        Currency::BTC(),
        true,
        1,
        0,
        Price::from("0.5"),
        Quantity::from(1_u64),
        None,
        None,
        None,
        Some(Quantity::from(1_u64)),
        None,
        None,
        Some(Price::from("10000000.0")),
        Some(Price::from("0.5")),
        Decimal::new(1, 2),
        Decimal::new(35, 4),
        Decimal::new(-25, 5), // -0.00025 (maker rebate)
        Decimal::new(75, 5),  // 0.00075
        UnixNanos::default(),
        UnixNanos::default(),
    )
}
