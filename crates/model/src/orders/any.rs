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

use std::fmt::Display;

use helm_core::{UUID4, UnixNanos};
use serde::{Deserialize, Serialize};

use crate::{
    enums::{
        ContingencyType, LiquiditySide, OrderSide, OrderStatus, OrderType, TimeInForce,
        TriggerType,
    },
    events::{OrderEventAny, OrderInitialized},
    identifiers::{
        AccountId, ClientOrderId, InstrumentId, OrderListId, PositionId, StrategyId, TradeId,
        TraderId, VenueOrderId,
    },
    orders::{
        LimitOrder, MarketOrder, StopLimitOrder, StopMarketOrder,
        base::{Order, OrderError},
    },
    types::{Price, Quantity},
};

/// Wraps an order type allowing polymorphism.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "order_type_tag")]
pub enum OrderAny {
    Limit(LimitOrder),
    Market(MarketOrder),
    StopLimit(StopLimitOrder),
    StopMarket(StopMarketOrder),
}

macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            OrderAny::Limit(order) => order.$method($($arg),*),
            OrderAny::Market(order) => order.$method($($arg),*),
            OrderAny::StopLimit(order) => order.$method($($arg),*),
            OrderAny::StopMarket(order) => order.$method($($arg),*),
        }
    };
}

impl OrderAny {
    /// Creates the appropriate concrete order from the given seed event.
    ///
    /// # Panics
    ///
    /// Panics if the seed event is missing fields required by its order type.
    #[must_use]
    pub fn from_init(init: OrderInitialized) -> Self {
        match init.order_type {
            OrderType::Market => Self::Market(MarketOrder::from(init)),
            OrderType::Limit => Self::Limit(LimitOrder::from(init)),
            OrderType::StopMarket => Self::StopMarket(StopMarketOrder::from(init)),
            OrderType::StopLimit => Self::StopLimit(StopLimitOrder::from(init)),
        }
    }

    /// Applies the given `event` to the order.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not valid for the order's current status.
    pub fn apply(&mut self, event: OrderEventAny) -> Result<(), OrderError> {
        delegate!(self, apply, event)
    }

    #[must_use]
    pub fn status(&self) -> OrderStatus {
        delegate!(self, status)
    }

    #[must_use]
    pub fn trader_id(&self) -> TraderId {
        delegate!(self, trader_id)
    }

    #[must_use]
    pub fn strategy_id(&self) -> StrategyId {
        delegate!(self, strategy_id)
    }

    #[must_use]
    pub fn instrument_id(&self) -> InstrumentId {
        delegate!(self, instrument_id)
    }

    #[must_use]
    pub fn client_order_id(&self) -> ClientOrderId {
        delegate!(self, client_order_id)
    }

    #[must_use]
    pub fn venue_order_id(&self) -> Option<VenueOrderId> {
        delegate!(self, venue_order_id)
    }

    #[must_use]
    pub fn position_id(&self) -> Option<PositionId> {
        delegate!(self, position_id)
    }

    #[must_use]
    pub fn account_id(&self) -> Option<AccountId> {
        delegate!(self, account_id)
    }

    #[must_use]
    pub fn last_trade_id(&self) -> Option<TradeId> {
        delegate!(self, last_trade_id)
    }

    /// Returns whether the given trade ID was already applied to the order.
    #[must_use]
    pub fn has_trade_id(&self, trade_id: &TradeId) -> bool {
        match self {
            Self::Limit(order) => order.trade_ids.contains(trade_id),
            Self::Market(order) => order.trade_ids.contains(trade_id),
            Self::StopLimit(order) => order.trade_ids.contains(trade_id),
            Self::StopMarket(order) => order.trade_ids.contains(trade_id),
        }
    }

    #[must_use]
    pub fn order_side(&self) -> OrderSide {
        delegate!(self, order_side)
    }

    #[must_use]
    pub fn order_type(&self) -> OrderType {
        delegate!(self, order_type)
    }

    #[must_use]
    pub fn quantity(&self) -> Quantity {
        delegate!(self, quantity)
    }

    #[must_use]
    pub fn time_in_force(&self) -> TimeInForce {
        delegate!(self, time_in_force)
    }

    #[must_use]
    pub fn expire_time(&self) -> Option<UnixNanos> {
        delegate!(self, expire_time)
    }

    #[must_use]
    pub fn price(&self) -> Option<Price> {
        delegate!(self, price)
    }

    #[must_use]
    pub fn trigger_price(&self) -> Option<Price> {
        delegate!(self, trigger_price)
    }

    #[must_use]
    pub fn trigger_type(&self) -> Option<TriggerType> {
        delegate!(self, trigger_type)
    }

    #[must_use]
    pub fn liquidity_side(&self) -> Option<LiquiditySide> {
        delegate!(self, liquidity_side)
    }

    #[must_use]
    pub fn is_post_only(&self) -> bool {
        delegate!(self, is_post_only)
    }

    #[must_use]
    pub fn is_reduce_only(&self) -> bool {
        delegate!(self, is_reduce_only)
    }

    #[must_use]
    pub fn is_quote_quantity(&self) -> bool {
        delegate!(self, is_quote_quantity)
    }

    #[must_use]
    pub fn contingency_type(&self) -> Option<ContingencyType> {
        delegate!(self, contingency_type)
    }

    #[must_use]
    pub fn order_list_id(&self) -> Option<OrderListId> {
        delegate!(self, order_list_id)
    }

    #[must_use]
    pub fn linked_order_ids(&self) -> Option<Vec<ClientOrderId>> {
        delegate!(self, linked_order_ids).map(<[ClientOrderId]>::to_vec)
    }

    #[must_use]
    pub fn parent_order_id(&self) -> Option<ClientOrderId> {
        delegate!(self, parent_order_id)
    }

    #[must_use]
    pub fn filled_qty(&self) -> Quantity {
        delegate!(self, filled_qty)
    }

    #[must_use]
    pub fn leaves_qty(&self) -> Quantity {
        delegate!(self, leaves_qty)
    }

    #[must_use]
    pub fn avg_px(&self) -> Option<f64> {
        delegate!(self, avg_px)
    }

    #[must_use]
    pub fn init_id(&self) -> UUID4 {
        delegate!(self, init_id)
    }

    #[must_use]
    pub fn ts_init(&self) -> UnixNanos {
        delegate!(self, ts_init)
    }

    #[must_use]
    pub fn ts_last(&self) -> UnixNanos {
        delegate!(self, ts_last)
    }

    #[must_use]
    pub fn events(&self) -> Vec<&OrderEventAny> {
        delegate!(self, events)
    }

    /// Returns the last event applied to the order.
    #[must_use]
    pub fn last_event(&self) -> &OrderEventAny {
        match self {
            Self::Limit(order) => order.last_event(),
            Self::Market(order) => order.last_event(),
            Self::StopLimit(order) => order.last_event(),
            Self::StopMarket(order) => order.last_event(),
        }
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        match self {
            Self::Limit(order) => order.event_count(),
            Self::Market(order) => order.event_count(),
            Self::StopLimit(order) => order.event_count(),
            Self::StopMarket(order) => order.event_count(),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        match self {
            Self::Limit(order) => order.is_open(),
            Self::Market(order) => order.is_open(),
            Self::StopLimit(order) => order.is_open(),
            Self::StopMarket(order) => order.is_open(),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Limit(order) => order.is_closed(),
            Self::Market(order) => order.is_closed(),
            Self::StopLimit(order) => order.is_closed(),
            Self::StopMarket(order) => order.is_closed(),
        }
    }

    #[must_use]
    pub fn is_inflight(&self) -> bool {
        match self {
            Self::Limit(order) => order.is_inflight(),
            Self::Market(order) => order.is_inflight(),
            Self::StopLimit(order) => order.is_inflight(),
            Self::StopMarket(order) => order.is_inflight(),
        }
    }

    /// Sets the position ID the order's fills are associated with.
    pub fn set_position_id(&mut self, position_id: Option<PositionId>) {
        match self {
            Self::Limit(order) => order.position_id = position_id,
            Self::Market(order) => order.position_id = position_id,
            Self::StopLimit(order) => order.position_id = position_id,
            Self::StopMarket(order) => order.position_id = position_id,
        }
    }
}

impl PartialEq for OrderAny {
    fn eq(&self, other: &Self) -> bool {
        self.client_order_id() == other.client_order_id()
            && self.status() == other.status()
            && self.event_count() == other.event_count()
    }
}

impl Eq for OrderAny {}

impl Display for OrderAny {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limit(order) => write!(f, "{order}"),
            Self::Market(order) => write!(f, "{order}"),
            Self::StopLimit(order) => write!(f, "{order}"),
            Self::StopMarket(order) => write!(f, "{order}"),
        }
    }
}
