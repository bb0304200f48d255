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

//! Represents a position in a market, aggregated from order fill events.

use std::{collections::HashMap, fmt::Display};

use helm_core::UnixNanos;
use serde::{Deserialize, Serialize};

use crate::{
    enums::{OrderSide, OrderSideSpecified, PositionSide},
    events::OrderFilled,
    identifiers::{
        AccountId, ClientOrderId, InstrumentId, PositionId, StrategyId, TradeId, TraderId,
    },
    instruments::InstrumentAny,
    types::{Currency, Money, Price, Quantity},
};

/// Represents a position in a market.
///
/// The position ID may be assigned by the trading venue, or can be system
/// generated depending on the venue's order management style (OMS). Under a
/// NETTING OMS the same position ID may close to flat and then reopen; the
/// execution engine snapshots the closed cycle before the reopening fill is
/// applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// The fill events which produced the current position state.
    pub events: Vec<OrderFilled>,
    /// The trader ID associated with the position.
    pub trader_id: TraderId,
    /// The strategy ID associated with the position.
    pub strategy_id: StrategyId,
    /// The instrument ID associated with the position.
    pub instrument_id: InstrumentId,
    /// The position ID.
    pub id: PositionId,
    /// The account ID associated with the position.
    pub account_id: AccountId,
    /// The client order ID for the order which opened the position.
    pub opening_order_id: ClientOrderId,
    /// The client order ID for the order which closed the position.
    pub closing_order_id: Option<ClientOrderId>,
    /// The entry direction from open.
    pub entry: OrderSide,
    /// The current position side.
    pub side: PositionSide,
    /// The current signed quantity (positive for LONG, negative for SHORT).
    pub signed_qty: f64,
    /// The current open quantity (absolute value of signed quantity).
    pub quantity: Quantity,
    /// The peak directional quantity reached by the position.
    pub peak_qty: Quantity,
    /// The position price precision.
    pub price_precision: u8,
    /// The position size precision.
    pub size_precision: u8,
    /// The position contract multiplier.
    pub multiplier: Quantity,
    /// If the quantity is expressed in quote currency (inverse instrument).
    pub is_inverse: bool,
    /// The base currency of the instrument, if any.
    pub base_currency: Option<Currency>,
    /// The quote currency of the instrument.
    pub quote_currency: Currency,
    /// The settlement currency of the instrument.
    pub settlement_currency: Currency,
    /// UNIX timestamp (nanoseconds) when the position was initialized.
    pub ts_init: UnixNanos,
    /// UNIX timestamp (nanoseconds) when the position was opened.
    pub ts_opened: UnixNanos,
    /// UNIX timestamp (nanoseconds) when the position was last updated.
    pub ts_last: UnixNanos,
    /// UNIX timestamp (nanoseconds) when the position was closed.
    pub ts_closed: Option<UnixNanos>,
    /// The open duration (nanoseconds).
    pub duration_ns: u64,
    /// The average open price.
    pub avg_px_open: f64,
    /// The average close price.
    pub avg_px_close: Option<f64>,
    /// The total realized return for the position.
    pub realized_return: f64,
    /// The realized PnL for the position, including commissions in the
    /// settlement currency.
    pub realized_pnl: Option<Money>,
    /// The trade match IDs for the position's fills.
    pub trade_ids: Vec<TradeId>,
    /// The total bought quantity.
    pub buy_qty: Quantity,
    /// The total sold quantity.
    pub sell_qty: Quantity,
    /// The commissions generated by the position, per currency.
    pub commissions: HashMap<Currency, Money>,
}

impl Position {
    /// Creates a new [`Position`] instance from the given instrument and
    /// opening fill.
    ///
    /// # Panics
    ///
    /// Panics if the fill order side is unspecified, or if the fill has no
    /// position ID.
    #[must_use]
    pub fn new(instrument: &InstrumentAny, fill: OrderFilled) -> Self {
        let position_id = fill
            .position_id
            .expect("Position invariant failed: fill must have a position ID");
        let _ = fill.order_side.as_specified(); // Assert side specified

        let mut position = Self {
            events: Vec::new(),
            trader_id: fill.trader_id,
            strategy_id: fill.strategy_id,
            instrument_id: fill.instrument_id,
            id: position_id,
            account_id: fill.account_id,
            opening_order_id: fill.client_order_id,
            closing_order_id: None,
            entry: fill.order_side,
            side: PositionSide::Flat,
            signed_qty: 0.0,
            quantity: Quantity::zero(instrument.size_precision()),
            peak_qty: Quantity::zero(instrument.size_precision()),
            price_precision: instrument.price_precision(),
            size_precision: instrument.size_precision(),
            multiplier: instrument.multiplier(),
            is_inverse: instrument.is_inverse(),
            base_currency: instrument.base_currency(),
            quote_currency: instrument.quote_currency(),
            settlement_currency: instrument.settlement_currency(),
            ts_init: fill.ts_init,
            ts_opened: fill.ts_event,
            ts_last: fill.ts_event,
            ts_closed: None,
            duration_ns: 0,
            avg_px_open: fill.last_px.as_f64(),
            avg_px_close: None,
            realized_return: 0.0,
            realized_pnl: None,
            trade_ids: Vec::new(),
            buy_qty: Quantity::zero(instrument.size_precision()),
            sell_qty: Quantity::zero(instrument.size_precision()),
            commissions: HashMap::new(),
        };
        position.apply(&fill);
        position
    }

    /// Applies the given fill to the position.
    ///
    /// Fills which would flip the position through zero must be split by the
    /// caller; a single fill either increases or reduces the position.
    ///
    /// # Panics
    ///
    /// Panics if the fill's trade ID was already applied.
    pub fn apply(&mut self, fill: &OrderFilled) {
        assert!(
            !self.trade_ids.contains(&fill.trade_id),
            "Position invariant failed: duplicate trade ID {}",
            fill.trade_id,
        );

        if self.is_closed() {
            // Reopening a previously closed position (NETTING close-and-reopen).
            // The engine has already snapshotted the prior cycle.
            self.reset_for_reopen(fill);
        }

        self.events.push(*fill);
        self.trade_ids.push(fill.trade_id);

        if let Some(commission) = fill.commission {
            let total = self
                .commissions
                .get(&commission.currency)
                .copied()
                .map_or(commission, |existing| existing + commission);
            self.commissions.insert(commission.currency, total);
        }

        match fill.specified_side() {
            OrderSideSpecified::Buy => self.handle_buy_order_fill(fill),
            OrderSideSpecified::Sell => self.handle_sell_order_fill(fill),
        }

        // Recompute side and quantity from the signed quantity
        self.quantity = Quantity::new(self.signed_qty.abs(), self.size_precision);
        self.side = Self::side_from_order_side(self.signed_qty);

        if self.quantity > self.peak_qty {
            self.peak_qty = self.quantity;
        }

        self.ts_last = fill.ts_event;

        if self.side == PositionSide::Flat {
            self.closing_order_id = Some(fill.client_order_id);
            self.ts_closed = Some(fill.ts_event);
            self.duration_ns = fill
                .ts_event
                .as_u64()
                .saturating_sub(self.ts_opened.as_u64());
        }
    }

    fn reset_for_reopen(&mut self, fill: &OrderFilled) {
        self.events.clear();
        self.trade_ids.clear();
        self.commissions.clear();
        self.opening_order_id = fill.client_order_id;
        self.closing_order_id = None;
        self.entry = fill.order_side;
        self.peak_qty = Quantity::zero(self.size_precision);
        self.ts_opened = fill.ts_event;
        self.ts_closed = None;
        self.duration_ns = 0;
        self.avg_px_open = fill.last_px.as_f64();
        self.avg_px_close = None;
        self.realized_return = 0.0;
        self.realized_pnl = None;
        self.buy_qty = Quantity::zero(self.size_precision);
        self.sell_qty = Quantity::zero(self.size_precision);
    }

    fn handle_buy_order_fill(&mut self, fill: &OrderFilled) {
        let last_px = fill.last_px.as_f64();
        let last_qty = fill.last_qty.as_f64();

        let mut realized_pnl = self.settlement_commission(fill).map_or(0.0, |c| -c.as_f64());

        if self.signed_qty > 0.0 {
            // Increasing long
            self.avg_px_open =
                Self::weighted_avg(self.avg_px_open, self.signed_qty.abs(), last_px, last_qty);
        } else if self.signed_qty < 0.0 {
            // Reducing short
            let closed_before = self.buy_qty.as_f64();
            self.avg_px_close = Some(
                self.avg_px_close
                    .map_or(last_px, |avg| {
                        Self::weighted_avg(avg, closed_before, last_px, last_qty)
                    }),
            );
            self.realized_return += self.calculate_return(self.avg_px_open, last_px);
            realized_pnl += self
                .calculate_pnl_raw(self.avg_px_open, last_px, last_qty)
                .as_f64();
        }

        self.realized_pnl = Some(Money::new(
            self.realized_pnl.map_or(0.0, |pnl| pnl.as_f64()) + realized_pnl,
            self.settlement_currency,
        ));

        self.signed_qty += last_qty;
        self.buy_qty += fill.last_qty;
    }

    fn handle_sell_order_fill(&mut self, fill: &OrderFilled) {
        let last_px = fill.last_px.as_f64();
        let last_qty = fill.last_qty.as_f64();

        let mut realized_pnl = self.settlement_commission(fill).map_or(0.0, |c| -c.as_f64());

        if self.signed_qty < 0.0 {
            // Increasing short
            self.avg_px_open =
                Self::weighted_avg(self.avg_px_open, self.signed_qty.abs(), last_px, last_qty);
        } else if self.signed_qty > 0.0 {
            // Reducing long
            let closed_before = self.sell_qty.as_f64();
            self.avg_px_close = Some(
                self.avg_px_close
                    .map_or(last_px, |avg| {
                        Self::weighted_avg(avg, closed_before, last_px, last_qty)
                    }),
            );
            self.realized_return += self.calculate_return(last_px, self.avg_px_open);
            realized_pnl += self
                .calculate_pnl_raw(self.avg_px_open, last_px, last_qty)
                .as_f64();
        }

        self.realized_pnl = Some(Money::new(
            self.realized_pnl.map_or(0.0, |pnl| pnl.as_f64()) + realized_pnl,
            self.settlement_currency,
        ));

        self.signed_qty -= last_qty;
        self.sell_qty += fill.last_qty;
    }

    fn settlement_commission(&self, fill: &OrderFilled) -> Option<Money> {
        fill.commission
            .filter(|commission| commission.currency == self.settlement_currency)
    }

    fn weighted_avg(avg: f64, qty: f64, last_px: f64, last_qty: f64) -> f64 {
        (avg * qty + last_px * last_qty) / (qty + last_qty)
    }

    const fn side_from_order_side(signed_qty: f64) -> PositionSide {
        if signed_qty > 0.0 {
            PositionSide::Long
        } else if signed_qty < 0.0 {
            PositionSide::Short
        } else {
            PositionSide::Flat
        }
    }

    fn calculate_points(&self, avg_px_open: f64, avg_px_close: f64) -> f64 {
        let direction = if self.signed_qty >= 0.0 { 1.0 } else { -1.0 };
        if self.is_inverse {
            direction * (1.0 / avg_px_open - 1.0 / avg_px_close)
        } else {
            direction * (avg_px_close - avg_px_open)
        }
    }

    fn calculate_return(&self, avg_px_close: f64, avg_px_open: f64) -> f64 {
        (avg_px_close - avg_px_open) / avg_px_open
    }

    fn calculate_pnl_raw(&self, avg_px_open: f64, avg_px_close: f64, quantity: f64) -> Money {
        let points = self.calculate_points(avg_px_open, avg_px_close);
        Money::new(
            points * quantity * self.multiplier.as_f64(),
            self.settlement_currency,
        )
    }

    /// Calculates the PnL for the given open/close prices over `quantity`.
    ///
    /// Excludes commissions.
    #[must_use]
    pub fn calculate_pnl(&self, avg_px_open: f64, avg_px_close: f64, quantity: Quantity) -> Money {
        self.calculate_pnl_raw(avg_px_open, avg_px_close, quantity.as_f64())
    }

    /// Returns the unrealized PnL at the given last price (excludes commissions).
    #[must_use]
    pub fn unrealized_pnl(&self, last: Price) -> Money {
        if self.side == PositionSide::Flat {
            Money::new(0.0, self.settlement_currency)
        } else {
            self.calculate_pnl_raw(self.avg_px_open, last.as_f64(), self.quantity.as_f64())
        }
    }

    /// Returns the total PnL at the given last price (realized + unrealized).
    #[must_use]
    pub fn total_pnl(&self, last: Price) -> Money {
        let realized = self
            .realized_pnl
            .map_or(0.0, |pnl| pnl.as_f64());
        Money::new(
            realized + self.unrealized_pnl(last).as_f64(),
            self.settlement_currency,
        )
    }

    /// Returns the order side which would close the position.
    ///
    /// # Panics
    ///
    /// Panics if the position is flat (nothing to close).
    #[must_use]
    pub fn closing_order_side(&self) -> OrderSide {
        match self.side {
            PositionSide::Long => OrderSide::Sell,
            PositionSide::Short => OrderSide::Buy,
            _ => panic!("Position invariant failed: no closing order side for {}", self.side),
        }
    }

    /// Returns whether the given order side would reduce this position.
    #[must_use]
    pub fn is_opposite_side(&self, side: OrderSide) -> bool {
        match self.side {
            PositionSide::Long => side == OrderSide::Sell,
            PositionSide::Short => side == OrderSide::Buy,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.side != PositionSide::Flat && self.ts_closed.is_none()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    #[must_use]
    pub fn is_long(&self) -> bool {
        self.side == PositionSide::Long
    }

    #[must_use]
    pub fn is_short(&self) -> bool {
        self.side == PositionSide::Short
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Returns the last fill event applied to the position, if any.
    #[must_use]
    pub fn last_event(&self) -> Option<&OrderFilled> {
        self.events.last()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let quantity_str = if self.side == PositionSide::Flat {
            String::new()
        } else {
            format!("{} ", self.quantity.to_formatted_string())
        };
        write!(
            f,
            "Position({} {}{}, id={})",
            self.side, quantity_str, self.instrument_id, self.id,
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        enums::{LiquiditySide, OrderType},
        identifiers::VenueOrderId,
        instruments::stubs::audusd_sim,
    };
    use helm_core::UUID4;

    fn fill(
        side: OrderSide,
        qty: u64,
        px: &str,
        trade_id: &str,
        ts_event: u64,
        commission: Option<Money>,
    ) -> OrderFilled {
        OrderFilled::new(
            TraderId::default(),
            StrategyId::default(),
            InstrumentId::from("AUD/USD.SIM"),
            ClientOrderId::default(),
            VenueOrderId::from("1"),
            AccountId::default(),
            TradeId::from(trade_id),
            side,
            OrderType::Market,
            Quantity::from(qty),
            Price::from(px),
            Currency::USD(),
            LiquiditySide::Taker,
            UUID4::new(),
            UnixNanos::from(ts_event),
            UnixNanos::from(ts_event),
            false,
            Some(PositionId::from("P-1")),
            commission,
        )
    }

    #[rstest]
    fn test_open_long_position() {
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let position = Position::new(&instrument, fill(OrderSide::Buy, 100, "0.80000", "T-1", 1, None));

        assert_eq!(position.side, PositionSide::Long);
        assert_eq!(position.signed_qty, 100.0);
        assert_eq!(position.quantity, Quantity::from(100_u64));
        assert_eq!(position.peak_qty, Quantity::from(100_u64));
        assert_eq!(position.avg_px_open, 0.8);
        assert!(position.is_open());
        assert!(position.is_long());
        assert_eq!(position.closing_order_side(), OrderSide::Sell);
    }

    #[rstest]
    fn test_long_close_to_flat_realizes_pnl() {
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let commission = Money::new(2.0, Currency::USD());
        let mut position =
            Position::new(&instrument, fill(OrderSide::Buy, 100, "0.80000", "T-1", 1, Some(commission)));
        position.apply(&fill(OrderSide::Sell, 100, "0.80010", "T-2", 2, Some(commission)));

        assert_eq!(position.side, PositionSide::Flat);
        assert_eq!(position.signed_qty, 0.0);
        assert!(position.is_closed());
        assert!(position.ts_closed.is_some());
        assert_eq!(position.avg_px_close, Some(0.8001));
        // (0.8001 - 0.8000) * 100 - 2 * commission
        let pnl = position.realized_pnl.unwrap().as_f64();
        assert!((pnl - (0.01 - 4.0)).abs() < 1e-9);
    }

    #[rstest]
    fn test_short_position_pnl() {
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let mut position =
            Position::new(&instrument, fill(OrderSide::Sell, 100, "0.80010", "T-1", 1, None));
        assert!(position.is_short());
        assert_eq!(position.signed_qty, -100.0);

        position.apply(&fill(OrderSide::Buy, 100, "0.80000", "T-2", 2, None));
        assert!(position.is_closed());
        let pnl = position.realized_pnl.unwrap().as_f64();
        assert!((pnl - 0.01).abs() < 1e-9);
    }

    #[rstest]
    fn test_partial_close_keeps_position_open() {
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let mut position =
            Position::new(&instrument, fill(OrderSide::Buy, 100, "0.80000", "T-1", 1, None));
        position.apply(&fill(OrderSide::Sell, 50, "0.80020", "T-2", 2, None));

        assert!(position.is_open());
        assert_eq!(position.quantity, Quantity::from(50_u64));
        assert_eq!(position.peak_qty, Quantity::from(100_u64));
        let pnl = position.realized_pnl.unwrap().as_f64();
        assert!((pnl - 0.01).abs() < 1e-9);
    }

    #[rstest]
    fn test_close_and_reopen_resets_cycle_fields() {
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let mut position =
            Position::new(&instrument, fill(OrderSide::Buy, 100, "0.80000", "T-1", 1, None));
        position.apply(&fill(OrderSide::Sell, 100, "0.80010", "T-2", 2, None));
        assert!(position.is_closed());

        // Reopen in the opposite direction under the same position ID
        position.apply(&fill(OrderSide::Sell, 50, "0.80020", "T-3", 3, None));

        assert!(position.is_open());
        assert_eq!(position.side, PositionSide::Short);
        assert_eq!(position.quantity, Quantity::from(50_u64));
        assert_eq!(position.peak_qty, Quantity::from(50_u64));
        assert_eq!(position.avg_px_open, 0.8002);
        assert_eq!(position.avg_px_close, None);
        assert_eq!(position.ts_opened, UnixNanos::from(3));
        assert_eq!(position.ts_closed, None);
        assert_eq!(position.realized_pnl, Some(Money::new(0.0, Currency::USD())));
        assert_eq!(position.event_count(), 1);
    }

    #[rstest]
    #[should_panic(expected = "duplicate trade ID")]
    fn test_duplicate_trade_id_panics() {
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let mut position =
            Position::new(&instrument, fill(OrderSide::Buy, 100, "0.80000", "T-1", 1, None));
        position.apply(&fill(OrderSide::Buy, 10, "0.80000", "T-1", 2, None));
    }

    #[rstest]
    fn test_flat_iff_signed_qty_zero() {
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let mut position =
            Position::new(&instrument, fill(OrderSide::Buy, 100, "0.80000", "T-1", 1, None));
        assert!(position.signed_qty != 0.0 && position.side != PositionSide::Flat);

        position.apply(&fill(OrderSide::Sell, 100, "0.80000", "T-2", 2, None));
        assert!(position.signed_qty == 0.0 && position.side == PositionSide::Flat);
    }

    #[rstest]
    fn test_unrealized_pnl() {
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let position =
            Position::new(&instrument, fill(OrderSide::Buy, 100, "0.80000", "T-1", 1, None));
        let unrealized = position.unrealized_pnl(Price::from("0.80100"));
        assert!((unrealized.as_f64() - 0.1).abs() < 1e-9);
    }
}
