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

use derive_builder::Builder;
use helm_core::{UUID4, UnixNanos};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{
    enums::{ContingencyType, OrderSide, OrderType, TimeInForce, TriggerType},
    events::order::impl_order_event,
    identifiers::{ClientOrderId, InstrumentId, OrderListId, PositionId, StrategyId, TraderId},
    types::{Price, Quantity},
};

/// Represents an event where an order has been initialized.
///
/// This is a seed event which can instantiate any order through a creation
/// method. This event should contain enough information to be able to send it
/// 'over the wire' and have a valid order created with exactly the same
/// properties as if it had been instantiated locally.
#[derive(Clone, PartialEq, Eq, Debug, Builder, Serialize, Deserialize)]
#[builder(default)]
#[serde(tag = "type")]
pub struct OrderInitialized {
    /// The trader ID associated with the event.
    pub trader_id: TraderId,
    /// The strategy ID associated with the event.
    pub strategy_id: StrategyId,
    /// The instrument ID associated with the event.
    pub instrument_id: InstrumentId,
    /// The client order ID associated with the event.
    pub client_order_id: ClientOrderId,
    /// The order side.
    pub order_side: OrderSide,
    /// The order type.
    pub order_type: OrderType,
    /// The order quantity.
    pub quantity: Quantity,
    /// The order time in force.
    pub time_in_force: TimeInForce,
    /// If the order will only provide liquidity (make a market).
    pub post_only: bool,
    /// If the order carries the 'reduce-only' execution instruction.
    pub reduce_only: bool,
    /// If the order quantity is denominated in the quote currency.
    pub quote_quantity: bool,
    /// If the event was generated during reconciliation.
    pub reconciliation: bool,
    /// The unique identifier for the event.
    pub event_id: UUID4,
    /// UNIX timestamp (nanoseconds) when the event occurred.
    pub ts_event: UnixNanos,
    /// UNIX timestamp (nanoseconds) when the event was initialized.
    pub ts_init: UnixNanos,
    /// The order price (LIMIT).
    pub price: Option<Price>,
    /// The order trigger price (STOP).
    pub trigger_price: Option<Price>,
    /// The trigger type for the order.
    pub trigger_type: Option<TriggerType>,
    /// The order expiration (UNIX nanoseconds), zero for no expiration.
    pub expire_time: Option<UnixNanos>,
    /// The quantity of the LIMIT order to display on the public book (iceberg).
    pub display_qty: Option<Quantity>,
    /// The order contingency type.
    pub contingency_type: Option<ContingencyType>,
    /// The order list ID associated with the order.
    pub order_list_id: Option<OrderListId>,
    /// The orders linked client order IDs.
    pub linked_order_ids: Option<Vec<ClientOrderId>>,
    /// The parent order ID.
    pub parent_order_id: Option<ClientOrderId>,
    /// The position ID to associate fills with.
    pub position_id: Option<PositionId>,
    /// The custom user tags for the order.
    pub tags: Option<Ustr>,
}

impl OrderInitialized {
    /// Creates a new [`OrderInitializedBuilder`] for constructing the event.
    #[must_use]
    pub fn builder() -> OrderInitializedBuilder {
        OrderInitializedBuilder::default()
    }
}

impl Default for OrderInitialized {
    /// Creates a new default [`OrderInitialized`] instance for testing.
    fn default() -> Self {
        Self {
            trader_id: TraderId::default(),
            strategy_id: StrategyId::default(),
            instrument_id: InstrumentId::default(),
            client_order_id: ClientOrderId::default(),
            order_side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: Quantity::new(100_000.0, 0),
            time_in_force: TimeInForce::Gtc,
            post_only: false,
            reduce_only: false,
            quote_quantity: false,
            reconciliation: false,
            event_id: UUID4::new(),
            ts_event: UnixNanos::default(),
            ts_init: UnixNanos::default(),
            price: None,
            trigger_price: None,
            trigger_type: None,
            expire_time: None,
            display_qty: None,
            contingency_type: None,
            order_list_id: None,
            linked_order_ids: None,
            parent_order_id: None,
            position_id: None,
            tags: None,
        }
    }
}

impl Display for OrderInitialized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(instrument_id={}, client_order_id={}, side={}, type={}, quantity={}, time_in_force={})",
            stringify!(OrderInitialized),
            self.instrument_id,
            self.client_order_id,
            self.order_side,
            self.order_type,
            self.quantity.to_formatted_string(),
            self.time_in_force,
        )
    }
}

impl_order_event!(OrderInitialized);
