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

//! Instrument definitions for the trading domain model.

pub mod crypto_perpetual;
pub mod currency_pair;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Re-exports
pub use crate::instruments::{crypto_perpetual::CryptoPerpetual, currency_pair::CurrencyPair};
use crate::{
    enums::OrderSide,
    identifiers::{InstrumentId, Symbol, Venue},
    types::{Currency, Money, Price, Quantity},
};
use helm_core::UnixNanos;

/// Represents a tradable instrument specification.
///
/// An instrument is replaced atomically in the cache when the venue changes
/// its specification; all live prices and sizes must share the instrument's
/// current precisions, which [`Instrument::make_price`] and
/// [`Instrument::make_qty`] enforce.
pub trait Instrument: 'static + Send {
    fn id(&self) -> InstrumentId;
    fn symbol(&self) -> Symbol {
        self.id().symbol
    }
    fn venue(&self) -> Venue {
        self.id().venue
    }
    fn base_currency(&self) -> Option<Currency>;
    fn quote_currency(&self) -> Currency;
    fn settlement_currency(&self) -> Currency;
    fn is_inverse(&self) -> bool;
    fn price_precision(&self) -> u8;
    fn size_precision(&self) -> u8;
    fn price_increment(&self) -> Price;
    fn size_increment(&self) -> Quantity;
    fn multiplier(&self) -> Quantity;
    fn lot_size(&self) -> Option<Quantity>;
    fn max_quantity(&self) -> Option<Quantity>;
    fn min_quantity(&self) -> Option<Quantity>;
    fn max_notional(&self) -> Option<Money>;
    fn min_notional(&self) -> Option<Money>;
    fn max_price(&self) -> Option<Price>;
    fn min_price(&self) -> Option<Price>;
    fn maker_fee(&self) -> Decimal;
    fn taker_fee(&self) -> Decimal;
    fn margin_init(&self) -> Decimal;
    fn margin_maint(&self) -> Decimal;
    /// The instrument expiration, if it has one (UNIX nanoseconds).
    fn expiration_ns(&self) -> Option<UnixNanos>;
    fn ts_event(&self) -> UnixNanos;
    fn ts_init(&self) -> UnixNanos;

    /// Creates a new [`Price`] from the given `value` with the instrument's
    /// current price precision.
    fn make_price(&self, value: f64) -> Price {
        Price::new(value, self.price_precision())
    }

    /// Creates a new [`Quantity`] from the given `value` with the instrument's
    /// current size precision.
    fn make_qty(&self, value: f64) -> Quantity {
        Quantity::new(value, self.size_precision())
    }

    /// Calculates the notional value of the given quantity at the given price.
    ///
    /// The `use_quote_for_inverse` flag applies to inverse instruments only,
    /// and expresses the notional in quote currency rather than base.
    fn calculate_notional_value(
        &self,
        quantity: Quantity,
        price: Price,
        use_quote_for_inverse: Option<bool>,
    ) -> Money {
        let use_quote_for_inverse = use_quote_for_inverse.unwrap_or(false);
        if self.is_inverse() {
            if use_quote_for_inverse {
                Money::new(quantity.as_f64() * self.multiplier().as_f64(), self.quote_currency())
            } else {
                let amount =
                    quantity.as_f64() * self.multiplier().as_f64() * (1.0 / price.as_f64());
                Money::new(
                    amount,
                    self.base_currency()
                        .expect("Inverse instruments must have a base currency"),
                )
            }
        } else {
            let amount = quantity.as_f64() * self.multiplier().as_f64() * price.as_f64();
            Money::new(amount, self.quote_currency())
        }
    }

    /// Calculates the base asset quantity for the given quote-denominated
    /// quantity at the given last price.
    fn get_base_quantity(&self, quantity: Quantity, last_px: Price) -> Quantity {
        let value = quantity.as_f64() * (1.0 / last_px.as_f64());
        Quantity::new(value, self.size_precision())
    }
}

/// Wraps an `Instrument` allowing polymorphism.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstrumentAny {
    CryptoPerpetual(CryptoPerpetual),
    CurrencyPair(CurrencyPair),
}

macro_rules! delegate_to_instrument {
    ($self:ident, $method:ident) => {
        match $self {
            InstrumentAny::CryptoPerpetual(inst) => inst.$method(),
            InstrumentAny::CurrencyPair(inst) => inst.$method(),
        }
    };
}

impl InstrumentAny {
    #[must_use]
    pub fn id(&self) -> InstrumentId {
        delegate_to_instrument!(self, id)
    }

    #[must_use]
    pub fn base_currency(&self) -> Option<Currency> {
        delegate_to_instrument!(self, base_currency)
    }

    #[must_use]
    pub fn quote_currency(&self) -> Currency {
        delegate_to_instrument!(self, quote_currency)
    }

    #[must_use]
    pub fn settlement_currency(&self) -> Currency {
        delegate_to_instrument!(self, settlement_currency)
    }

    #[must_use]
    pub fn is_inverse(&self) -> bool {
        delegate_to_instrument!(self, is_inverse)
    }

    #[must_use]
    pub fn price_precision(&self) -> u8 {
        delegate_to_instrument!(self, price_precision)
    }

    #[must_use]
    pub fn size_precision(&self) -> u8 {
        delegate_to_instrument!(self, size_precision)
    }

    #[must_use]
    pub fn price_increment(&self) -> Price {
        delegate_to_instrument!(self, price_increment)
    }

    #[must_use]
    pub fn size_increment(&self) -> Quantity {
        delegate_to_instrument!(self, size_increment)
    }

    #[must_use]
    pub fn multiplier(&self) -> Quantity {
        delegate_to_instrument!(self, multiplier)
    }

    #[must_use]
    pub fn lot_size(&self) -> Option<Quantity> {
        delegate_to_instrument!(self, lot_size)
    }

    #[must_use]
    pub fn min_quantity(&self) -> Option<Quantity> {
        delegate_to_instrument!(self, min_quantity)
    }

    #[must_use]
    pub fn max_quantity(&self) -> Option<Quantity> {
        delegate_to_instrument!(self, max_quantity)
    }

    #[must_use]
    pub fn min_notional(&self) -> Option<Money> {
        delegate_to_instrument!(self, min_notional)
    }

    #[must_use]
    pub fn maker_fee(&self) -> Decimal {
        delegate_to_instrument!(self, maker_fee)
    }

    #[must_use]
    pub fn taker_fee(&self) -> Decimal {
        delegate_to_instrument!(self, taker_fee)
    }

    #[must_use]
    pub fn margin_init(&self) -> Decimal {
        delegate_to_instrument!(self, margin_init)
    }

    #[must_use]
    pub fn margin_maint(&self) -> Decimal {
        delegate_to_instrument!(self, margin_maint)
    }

    #[must_use]
    pub fn expiration_ns(&self) -> Option<UnixNanos> {
        delegate_to_instrument!(self, expiration_ns)
    }

    #[must_use]
    pub fn make_price(&self, value: f64) -> Price {
        match self {
            Self::CryptoPerpetual(inst) => inst.make_price(value),
            Self::CurrencyPair(inst) => inst.make_price(value),
        }
    }

    #[must_use]
    pub fn make_qty(&self, value: f64) -> Quantity {
        match self {
            Self::CryptoPerpetual(inst) => inst.make_qty(value),
            Self::CurrencyPair(inst) => inst.make_qty(value),
        }
    }

    #[must_use]
    pub fn calculate_notional_value(
        &self,
        quantity: Quantity,
        price: Price,
        use_quote_for_inverse: Option<bool>,
    ) -> Money {
        match self {
            Self::CryptoPerpetual(inst) => {
                inst.calculate_notional_value(quantity, price, use_quote_for_inverse)
            }
            Self::CurrencyPair(inst) => {
                inst.calculate_notional_value(quantity, price, use_quote_for_inverse)
            }
        }
    }

    #[must_use]
    pub fn get_base_quantity(&self, quantity: Quantity, last_px: Price) -> Quantity {
        match self {
            Self::CryptoPerpetual(inst) => inst.get_base_quantity(quantity, last_px),
            Self::CurrencyPair(inst) => inst.get_base_quantity(quantity, last_px),
        }
    }

    /// Checks whether the given order side is valid for this instrument.
    #[must_use]
    pub const fn is_valid_order_side(&self, order_side: OrderSide) -> bool {
        !matches!(order_side, OrderSide::NoOrderSide)
    }
}
