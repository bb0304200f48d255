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

//! A builder for constructing test orders with sensible defaults.

use helm_core::{UUID4, UnixNanos};

use crate::{
    enums::{ContingencyType, OrderSide, OrderType, TimeInForce, TriggerType},
    events::OrderInitialized,
    identifiers::{ClientOrderId, InstrumentId, OrderListId, StrategyId, TraderId},
    orders::{OrderAny, OrderCore},
    types::{Price, Quantity},
};

/// Provides a builder for test orders with sensible defaults.
#[derive(Debug, Clone)]
pub struct OrderTestBuilder {
    init: OrderInitialized,
}

impl OrderTestBuilder {
    /// Creates a new [`OrderTestBuilder`] for the given order type.
    #[must_use]
    pub fn new(order_type: OrderType) -> Self {
        let init = OrderInitialized {
            trader_id: TraderId::default(),
            strategy_id: StrategyId::default(),
            instrument_id: InstrumentId::default(),
            client_order_id: ClientOrderId::default(),
            order_side: OrderSide::Buy,
            order_type,
            quantity: Quantity::from(100_000_u64),
            time_in_force: TimeInForce::Gtc,
            event_id: UUID4::new(),
            ..Default::default()
        };
        Self { init }
    }

    #[must_use]
    pub fn trader_id(mut self, trader_id: TraderId) -> Self {
        self.init.trader_id = trader_id;
        self
    }

    #[must_use]
    pub fn strategy_id(mut self, strategy_id: StrategyId) -> Self {
        self.init.strategy_id = strategy_id;
        self
    }

    #[must_use]
    pub fn instrument_id(mut self, instrument_id: InstrumentId) -> Self {
        self.init.instrument_id = instrument_id;
        self
    }

    #[must_use]
    pub fn client_order_id(mut self, client_order_id: ClientOrderId) -> Self {
        self.init.client_order_id = client_order_id;
        self
    }

    #[must_use]
    pub fn side(mut self, side: OrderSide) -> Self {
        self.init.order_side = side;
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.init.quantity = quantity;
        self
    }

    #[must_use]
    pub fn price(mut self, price: Price) -> Self {
        self.init.price = Some(price);
        self
    }

    #[must_use]
    pub fn trigger_price(mut self, trigger_price: Price) -> Self {
        self.init.trigger_price = Some(trigger_price);
        self.init.trigger_type.get_or_insert(TriggerType::Default);
        self
    }

    #[must_use]
    pub fn time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.init.time_in_force = time_in_force;
        self
    }

    #[must_use]
    pub fn expire_time(mut self, expire_time: UnixNanos) -> Self {
        self.init.expire_time = Some(expire_time);
        self
    }

    #[must_use]
    pub fn post_only(mut self, post_only: bool) -> Self {
        self.init.post_only = post_only;
        self
    }

    #[must_use]
    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.init.reduce_only = reduce_only;
        self
    }

    #[must_use]
    pub fn quote_quantity(mut self, quote_quantity: bool) -> Self {
        self.init.quote_quantity = quote_quantity;
        self
    }

    #[must_use]
    pub fn contingency_type(mut self, contingency_type: ContingencyType) -> Self {
        self.init.contingency_type = Some(contingency_type);
        self
    }

    #[must_use]
    pub fn order_list_id(mut self, order_list_id: OrderListId) -> Self {
        self.init.order_list_id = Some(order_list_id);
        self
    }

    #[must_use]
    pub fn linked_order_ids(mut self, linked_order_ids: Vec<ClientOrderId>) -> Self {
        self.init.linked_order_ids = Some(linked_order_ids);
        self
    }

    /// Builds the order as an [`OrderAny`].
    #[must_use]
    pub fn build(self) -> OrderAny {
        OrderAny::from_init(self.init)
    }

    /// Builds the bare [`OrderCore`] (bypassing order-type specific state).
    #[must_use]
    pub fn build_core(self) -> OrderCore {
        OrderCore::new(self.init)
    }
}
