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

//! The common `OrderCore` state and the `Order` trait.

use helm_core::{UUID4, UnixNanos};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{
    enums::{
        ContingencyType, LiquiditySide, OrderSide, OrderStatus, OrderType, TimeInForce,
        TriggerType,
    },
    events::{OrderEventAny, OrderEventType, OrderFilled, OrderInitialized, OrderUpdated},
    identifiers::{
        AccountId, ClientOrderId, InstrumentId, OrderListId, PositionId, StrategyId, TradeId,
        TraderId, VenueOrderId,
    },
    types::{Currency, Money, Price, Quantity},
};

/// Order domain model errors.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The event is not valid for the order's current status.
    #[error("Invalid state transition")]
    InvalidStateTransition,
    /// An `OrderInitialized` event was applied to an already initialized order.
    #[error("Order already initialized")]
    AlreadyInitialized,
    /// A fill carried a trade ID which was already applied to the order.
    #[error("Duplicate trade ID {0}")]
    DuplicateTradeId(TradeId),
    /// A fill would take the total filled quantity above the order quantity.
    #[error("Invalid fill quantity: filled {filled} would exceed order quantity {quantity}")]
    InvalidFillQuantity { filled: Quantity, quantity: Quantity },
}

/// The core order state shared by every order type.
///
/// All mutation goes through [`OrderCore::apply`]; the event list
/// reconstructs current state deterministically.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderCore {
    /// The order events which produced the current state.
    pub events: Vec<OrderEventAny>,
    /// The commissions generated by the order, per currency.
    pub commissions: IndexMap<Currency, Money>,
    /// Every venue order ID assigned to the order (cancel/replace venues reassign).
    pub venue_order_ids: Vec<VenueOrderId>,
    /// The trade match IDs for the order's fills.
    pub trade_ids: Vec<TradeId>,
    /// The status prior to the current status (for pending-state reverts).
    pub previous_status: Option<OrderStatus>,
    /// The current order status.
    pub status: OrderStatus,
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub venue_order_id: Option<VenueOrderId>,
    pub position_id: Option<PositionId>,
    pub account_id: Option<AccountId>,
    pub last_trade_id: Option<TradeId>,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub time_in_force: TimeInForce,
    pub expire_time: Option<UnixNanos>,
    pub liquidity_side: Option<LiquiditySide>,
    pub is_post_only: bool,
    pub is_reduce_only: bool,
    pub is_quote_quantity: bool,
    pub contingency_type: Option<ContingencyType>,
    pub order_list_id: Option<OrderListId>,
    pub linked_order_ids: Option<Vec<ClientOrderId>>,
    pub parent_order_id: Option<ClientOrderId>,
    pub tags: Option<Ustr>,
    pub filled_qty: Quantity,
    pub leaves_qty: Quantity,
    pub avg_px: Option<f64>,
    pub init_id: UUID4,
    pub ts_init: UnixNanos,
    pub ts_submitted: Option<UnixNanos>,
    pub ts_accepted: Option<UnixNanos>,
    pub ts_closed: Option<UnixNanos>,
    pub ts_last: UnixNanos,
}

impl OrderCore {
    /// Creates a new [`OrderCore`] instance from the given seed event.
    #[must_use]
    pub fn new(init: OrderInitialized) -> Self {
        let events = vec![OrderEventAny::Initialized(init.clone())];
        Self {
            events,
            commissions: IndexMap::new(),
            venue_order_ids: Vec::new(),
            trade_ids: Vec::new(),
            previous_status: None,
            status: OrderStatus::Initialized,
            trader_id: init.trader_id,
            strategy_id: init.strategy_id,
            instrument_id: init.instrument_id,
            client_order_id: init.client_order_id,
            venue_order_id: None,
            position_id: init.position_id,
            account_id: None,
            last_trade_id: None,
            side: init.order_side,
            order_type: init.order_type,
            quantity: init.quantity,
            time_in_force: init.time_in_force,
            expire_time: init.expire_time,
            liquidity_side: None,
            is_post_only: init.post_only,
            is_reduce_only: init.reduce_only,
            is_quote_quantity: init.quote_quantity,
            contingency_type: init.contingency_type,
            order_list_id: init.order_list_id,
            linked_order_ids: init.linked_order_ids.clone(),
            parent_order_id: init.parent_order_id,
            tags: init.tags,
            filled_qty: Quantity::zero(init.quantity.precision),
            leaves_qty: init.quantity,
            avg_px: None,
            init_id: init.event_id,
            ts_init: init.ts_init,
            ts_submitted: None,
            ts_accepted: None,
            ts_closed: None,
            ts_last: init.ts_init,
        }
    }

    /// Applies the given `event` to the order.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not a valid transition from the
    /// order's current status, or if a fill is inconsistent (duplicate trade
    /// ID, quantity overflow).
    pub fn apply(&mut self, event: OrderEventAny) -> Result<(), OrderError> {
        if matches!(event, OrderEventAny::Initialized(_)) {
            return Err(OrderError::AlreadyInitialized);
        }

        let new_status = self.validate_transition(&event)?;

        match &event {
            OrderEventAny::Initialized(_) => unreachable!("Checked above"),
            OrderEventAny::Denied(e) => {
                self.ts_closed = Some(e.ts_event);
            }
            OrderEventAny::Submitted(e) => {
                self.account_id = Some(e.account_id);
                self.ts_submitted = Some(e.ts_event);
            }
            OrderEventAny::Accepted(e) => {
                self.set_venue_order_id(e.venue_order_id);
                self.account_id = Some(e.account_id);
                if self.ts_accepted.is_none() {
                    self.ts_accepted = Some(e.ts_event);
                }
            }
            OrderEventAny::Rejected(e) => {
                self.ts_closed = Some(e.ts_event);
            }
            OrderEventAny::Canceled(e) => {
                self.ts_closed = Some(e.ts_event);
            }
            OrderEventAny::Expired(e) => {
                self.ts_closed = Some(e.ts_event);
            }
            OrderEventAny::Triggered(_) => {}
            OrderEventAny::PendingUpdate(_) | OrderEventAny::PendingCancel(_) => {
                self.previous_status = Some(self.status);
            }
            OrderEventAny::ModifyRejected(_) | OrderEventAny::CancelRejected(_) => {
                self.previous_status = None;
            }
            OrderEventAny::Updated(e) => {
                self.update(e);
                self.previous_status = None;
            }
            OrderEventAny::Filled(e) => {
                self.fill(e)?;
            }
        }

        self.status = new_status;
        self.ts_last = event.ts_event();
        self.events.push(event);

        debug_assert!(self.filled_qty <= self.quantity);
        Ok(())
    }

    fn validate_transition(&self, event: &OrderEventAny) -> Result<OrderStatus, OrderError> {
        use OrderEventType as E;
        use OrderStatus as S;

        if let OrderEventAny::Filled(fill) = event {
            return self.validate_fill(fill);
        }

        let new_status = match (self.status, event.event_type()) {
            (S::Initialized, E::Denied) => S::Denied,
            (S::Initialized, E::Submitted) => S::Submitted,
            // External and reconciled orders transition without a local submit
            (S::Initialized, E::Accepted) => S::Accepted,
            (S::Initialized, E::Rejected) => S::Rejected,
            (S::Initialized, E::Canceled) => S::Canceled,
            (S::Initialized, E::Expired) => S::Expired,
            (S::Initialized, E::Triggered) => S::Triggered,
            (S::Submitted, E::Accepted) => S::Accepted,
            (S::Submitted, E::Rejected) => S::Rejected,
            (S::Submitted, E::Canceled) => S::Canceled, // IOC/FOK case
            (S::Submitted, E::Expired) => S::Expired,
            (S::Submitted, E::Triggered) => S::Triggered,
            (S::Submitted, E::PendingUpdate) => S::PendingUpdate,
            (S::Submitted, E::PendingCancel) => S::PendingCancel,
            (S::Accepted, E::Rejected) => S::Rejected, // StopLimit post-only reject case
            (S::Accepted, E::Canceled) => S::Canceled,
            (S::Accepted, E::Expired) => S::Expired,
            (S::Accepted, E::Triggered) => S::Triggered,
            (S::Accepted, E::Updated) => S::Accepted,
            (S::Accepted, E::PendingUpdate) => S::PendingUpdate,
            (S::Accepted, E::PendingCancel) => S::PendingCancel,
            (S::Triggered, E::Rejected) => S::Rejected,
            (S::Triggered, E::Canceled) => S::Canceled,
            (S::Triggered, E::Expired) => S::Expired,
            (S::Triggered, E::Updated) => S::Triggered,
            (S::Triggered, E::PendingUpdate) => S::PendingUpdate,
            (S::Triggered, E::PendingCancel) => S::PendingCancel,
            (S::PendingUpdate, E::Updated) => self.previous_status.unwrap_or(S::Accepted),
            (S::PendingUpdate, E::ModifyRejected) => self.previous_status.unwrap_or(S::Accepted),
            (S::PendingUpdate, E::Rejected) => S::Rejected,
            (S::PendingUpdate, E::Canceled) => S::Canceled,
            (S::PendingUpdate, E::Expired) => S::Expired,
            (S::PendingUpdate, E::Triggered) => S::Triggered,
            (S::PendingUpdate, E::PendingUpdate) => S::PendingUpdate,
            (S::PendingUpdate, E::PendingCancel) => S::PendingCancel,
            (S::PendingCancel, E::Canceled) => S::Canceled,
            (S::PendingCancel, E::CancelRejected) => self.previous_status.unwrap_or(S::Accepted),
            (S::PendingCancel, E::Expired) => S::Expired,
            (S::PendingCancel, E::PendingCancel) => S::PendingCancel,
            // A modify can still be acknowledged while a cancel is pending
            (S::PendingCancel, E::Updated) => S::PendingCancel,
            (S::PartiallyFilled, E::Canceled) => S::Canceled,
            (S::PartiallyFilled, E::Expired) => S::Expired,
            (S::PartiallyFilled, E::Updated) => S::PartiallyFilled,
            (S::PartiallyFilled, E::PendingUpdate) => S::PendingUpdate,
            (S::PartiallyFilled, E::PendingCancel) => S::PendingCancel,
            _ => return Err(OrderError::InvalidStateTransition),
        };

        Ok(new_status)
    }

    fn validate_fill(&self, fill: &OrderFilled) -> Result<OrderStatus, OrderError> {
        use OrderStatus as S;

        match self.status {
            S::Initialized
            | S::Submitted
            | S::Accepted
            | S::Triggered
            | S::PendingUpdate
            | S::PendingCancel
            | S::PartiallyFilled => {}
            _ => return Err(OrderError::InvalidStateTransition),
        }

        if self.trade_ids.contains(&fill.trade_id) {
            return Err(OrderError::DuplicateTradeId(fill.trade_id));
        }

        let total_filled = self.filled_qty + fill.last_qty;
        if total_filled > self.quantity {
            return Err(OrderError::InvalidFillQuantity {
                filled: total_filled,
                quantity: self.quantity,
            });
        }

        if total_filled == self.quantity {
            Ok(S::Filled)
        } else {
            Ok(S::PartiallyFilled)
        }
    }

    fn fill(&mut self, fill: &OrderFilled) -> Result<(), OrderError> {
        self.set_venue_order_id(fill.venue_order_id);
        self.account_id = Some(fill.account_id);
        if self.position_id.is_none() {
            self.position_id = fill.position_id;
        }
        self.trade_ids.push(fill.trade_id);
        self.last_trade_id = Some(fill.trade_id);
        self.liquidity_side = Some(fill.liquidity_side);

        // Update average fill price over total filled quantity
        let total = self.filled_qty.as_f64() + fill.last_qty.as_f64();
        let avg_px = self.avg_px.map_or(fill.last_px.as_f64(), |avg| {
            (avg * self.filled_qty.as_f64() + fill.last_px.as_f64() * fill.last_qty.as_f64())
                / total
        });
        self.avg_px = Some(avg_px);

        self.filled_qty += fill.last_qty;
        self.leaves_qty = self.quantity.saturating_sub(self.filled_qty);

        if let Some(commission) = fill.commission {
            let total = self
                .commissions
                .get(&commission.currency)
                .copied()
                .map_or(commission, |existing| existing + commission);
            self.commissions.insert(commission.currency, total);
        }

        if self.filled_qty == self.quantity {
            self.ts_closed = Some(fill.ts_event);
        }

        Ok(())
    }

    fn update(&mut self, event: &OrderUpdated) {
        debug_assert!(event.quantity >= self.filled_qty);

        if let Some(venue_order_id) = event.venue_order_id {
            self.set_venue_order_id(venue_order_id);
        }
        self.quantity = event.quantity;
        self.leaves_qty = self.quantity.saturating_sub(self.filled_qty);
    }

    fn set_venue_order_id(&mut self, venue_order_id: VenueOrderId) {
        if self.venue_order_id != Some(venue_order_id) {
            self.venue_order_id = Some(venue_order_id);
            self.venue_order_ids.push(venue_order_id);
        }
    }

    /// Returns the last event applied to the order.
    ///
    /// # Panics
    ///
    /// Panics if the order has no events (impossible by construction).
    #[must_use]
    pub fn last_event(&self) -> &OrderEventAny {
        self.events.last().expect("Order guaranteed to have events")
    }

    /// Returns the total count of events applied to the order.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Returns whether the order is open on the venue (working).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Accepted
                | OrderStatus::Triggered
                | OrderStatus::PendingUpdate
                | OrderStatus::PendingCancel
                | OrderStatus::PartiallyFilled
        )
    }

    /// Returns whether the order is closed (done, terminal).
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Denied
                | OrderStatus::Rejected
                | OrderStatus::Canceled
                | OrderStatus::Expired
                | OrderStatus::Filled
        )
    }

    /// Returns whether the order is in-flight (sent to the venue with no
    /// acknowledging or terminal event yet observed).
    #[must_use]
    pub const fn is_inflight(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Submitted | OrderStatus::PendingUpdate | OrderStatus::PendingCancel
        )
    }

    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.side == OrderSide::Buy
    }

    #[must_use]
    pub fn is_sell(&self) -> bool {
        self.side == OrderSide::Sell
    }
}

/// The interface implemented by every order type.
pub trait Order: 'static + Send {
    fn status(&self) -> OrderStatus;
    fn trader_id(&self) -> TraderId;
    fn strategy_id(&self) -> StrategyId;
    fn instrument_id(&self) -> InstrumentId;
    fn client_order_id(&self) -> ClientOrderId;
    fn venue_order_id(&self) -> Option<VenueOrderId>;
    fn position_id(&self) -> Option<PositionId>;
    fn account_id(&self) -> Option<AccountId>;
    fn last_trade_id(&self) -> Option<TradeId>;
    fn order_side(&self) -> OrderSide;
    fn order_type(&self) -> OrderType;
    fn quantity(&self) -> Quantity;
    fn time_in_force(&self) -> TimeInForce;
    fn expire_time(&self) -> Option<UnixNanos>;
    fn price(&self) -> Option<Price>;
    fn trigger_price(&self) -> Option<Price>;
    fn trigger_type(&self) -> Option<TriggerType>;
    fn liquidity_side(&self) -> Option<LiquiditySide>;
    fn is_post_only(&self) -> bool;
    fn is_reduce_only(&self) -> bool;
    fn is_quote_quantity(&self) -> bool;
    fn contingency_type(&self) -> Option<ContingencyType>;
    fn order_list_id(&self) -> Option<OrderListId>;
    fn linked_order_ids(&self) -> Option<&[ClientOrderId]>;
    fn parent_order_id(&self) -> Option<ClientOrderId>;
    fn filled_qty(&self) -> Quantity;
    fn leaves_qty(&self) -> Quantity;
    fn avg_px(&self) -> Option<f64>;
    fn init_id(&self) -> UUID4;
    fn ts_init(&self) -> UnixNanos;
    fn ts_last(&self) -> UnixNanos;
    fn events(&self) -> Vec<&OrderEventAny>;

    /// Applies the given `event` to the order.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not valid for the order's current status.
    fn apply(&mut self, event: OrderEventAny) -> Result<(), OrderError>;
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        events::{OrderAccepted, OrderCanceled, OrderDenied, OrderSubmitted},
        orders::builder::OrderTestBuilder,
    };

    fn submitted(order: &OrderCore) -> OrderEventAny {
        OrderEventAny::Submitted(OrderSubmitted::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            AccountId::default(),
            UUID4::new(),
            UnixNanos::from(1),
            UnixNanos::from(1),
        ))
    }

    fn accepted(order: &OrderCore) -> OrderEventAny {
        OrderEventAny::Accepted(OrderAccepted::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            VenueOrderId::from("V-1"),
            AccountId::default(),
            UUID4::new(),
            UnixNanos::from(2),
            UnixNanos::from(2),
            false,
        ))
    }

    fn filled(order: &OrderCore, trade_id: &str, last_qty: Quantity, last_px: Price) -> OrderEventAny {
        OrderEventAny::Filled(OrderFilled {
            trader_id: order.trader_id,
            strategy_id: order.strategy_id,
            instrument_id: order.instrument_id,
            client_order_id: order.client_order_id,
            venue_order_id: VenueOrderId::from("V-1"),
            trade_id: TradeId::from(trade_id),
            last_qty,
            last_px,
            ts_event: UnixNanos::from(3),
            ..Default::default()
        })
    }

    #[rstest]
    fn test_happy_path_to_filled() {
        let mut order = OrderTestBuilder::new(OrderType::Limit)
            .instrument_id(InstrumentId::from("AUD/USD.SIM"))
            .side(OrderSide::Buy)
            .quantity(Quantity::from(100_u64))
            .price(Price::from("1.00000"))
            .build_core();

        order.apply(submitted(&order)).unwrap();
        assert_eq!(order.status, OrderStatus::Submitted);
        assert!(order.is_inflight());

        order.apply(accepted(&order)).unwrap();
        assert_eq!(order.status, OrderStatus::Accepted);
        assert!(order.is_open());

        let fill = filled(&order, "T-1", Quantity::from(100_u64), Price::from("1.00010"));
        order.apply(fill).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.is_closed());
        assert_eq!(order.filled_qty, Quantity::from(100_u64));
        assert_eq!(order.leaves_qty, Quantity::from(0_u64));
        assert_eq!(order.avg_px, Some(1.0001));
        assert!(order.ts_closed.is_some());
    }

    #[rstest]
    fn test_partial_fill_then_fill() {
        let mut order = OrderTestBuilder::new(OrderType::Limit)
            .quantity(Quantity::from(100_u64))
            .price(Price::from("1.00000"))
            .build_core();

        order.apply(submitted(&order)).unwrap();
        order.apply(accepted(&order)).unwrap();

        order
            .apply(filled(&order, "T-1", Quantity::from(40_u64), Price::from("1.00000")))
            .unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.leaves_qty, Quantity::from(60_u64));

        order
            .apply(filled(&order, "T-2", Quantity::from(60_u64), Price::from("1.00010")))
            .unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.filled_qty, order.quantity);
    }

    #[rstest]
    fn test_duplicate_trade_id_rejected() {
        let mut order = OrderTestBuilder::new(OrderType::Limit)
            .quantity(Quantity::from(100_u64))
            .price(Price::from("1.00000"))
            .build_core();

        order.apply(submitted(&order)).unwrap();
        order.apply(accepted(&order)).unwrap();
        order
            .apply(filled(&order, "T-1", Quantity::from(40_u64), Price::from("1.00000")))
            .unwrap();

        let result =
            order.apply(filled(&order, "T-1", Quantity::from(40_u64), Price::from("1.00000")));
        assert!(matches!(result, Err(OrderError::DuplicateTradeId(_))));
        assert_eq!(order.filled_qty, Quantity::from(40_u64));
    }

    #[rstest]
    fn test_overfill_rejected() {
        let mut order = OrderTestBuilder::new(OrderType::Limit)
            .quantity(Quantity::from(100_u64))
            .price(Price::from("1.00000"))
            .build_core();

        order.apply(submitted(&order)).unwrap();
        order.apply(accepted(&order)).unwrap();

        let result =
            order.apply(filled(&order, "T-1", Quantity::from(101_u64), Price::from("1.00000")));
        assert!(matches!(result, Err(OrderError::InvalidFillQuantity { .. })));
    }

    #[rstest]
    fn test_terminal_status_absorbing() {
        let mut order = OrderTestBuilder::new(OrderType::Market)
            .quantity(Quantity::from(100_u64))
            .build_core();

        let denied = OrderEventAny::Denied(OrderDenied::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            "DUPLICATE_CLIENT_ORDER_ID".into(),
            UUID4::new(),
            UnixNanos::from(1),
            UnixNanos::from(1),
        ));
        order.apply(denied).unwrap();
        assert_eq!(order.status, OrderStatus::Denied);

        // No further mutation once terminal
        let result = order.apply(submitted(&order));
        assert!(matches!(result, Err(OrderError::InvalidStateTransition)));
        assert_eq!(order.status, OrderStatus::Denied);
        assert_eq!(order.event_count(), 2);
    }

    #[rstest]
    fn test_pending_cancel_then_canceled() {
        let mut order = OrderTestBuilder::new(OrderType::Limit)
            .quantity(Quantity::from(100_u64))
            .price(Price::from("1.00000"))
            .build_core();

        order.apply(submitted(&order)).unwrap();
        order.apply(accepted(&order)).unwrap();

        let pending = OrderEventAny::PendingCancel(crate::events::OrderPendingCancel::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            AccountId::default(),
            UUID4::new(),
            UnixNanos::from(4),
            UnixNanos::from(4),
            false,
            order.venue_order_id,
        ));
        order.apply(pending).unwrap();
        assert_eq!(order.status, OrderStatus::PendingCancel);

        let canceled = OrderEventAny::Canceled(OrderCanceled::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            UUID4::new(),
            UnixNanos::from(5),
            UnixNanos::from(5),
            false,
            order.venue_order_id,
            order.account_id,
        ));
        order.apply(canceled).unwrap();
        assert_eq!(order.status, OrderStatus::Canceled);
        assert!(order.is_closed());
    }

    #[rstest]
    fn test_cancel_reject_reverts_to_previous_status() {
        let mut order = OrderTestBuilder::new(OrderType::Limit)
            .quantity(Quantity::from(100_u64))
            .price(Price::from("1.00000"))
            .build_core();

        order.apply(submitted(&order)).unwrap();
        order.apply(accepted(&order)).unwrap();

        let pending = OrderEventAny::PendingCancel(crate::events::OrderPendingCancel::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            AccountId::default(),
            UUID4::new(),
            UnixNanos::from(4),
            UnixNanos::from(4),
            false,
            order.venue_order_id,
        ));
        order.apply(pending).unwrap();

        let rejected = OrderEventAny::CancelRejected(crate::events::OrderCancelRejected::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            "TOO_LATE_TO_CANCEL".into(),
            UUID4::new(),
            UnixNanos::from(5),
            UnixNanos::from(5),
            false,
            order.venue_order_id,
            order.account_id,
        ));
        order.apply(rejected).unwrap();
        assert_eq!(order.status, OrderStatus::Accepted);
    }

    #[rstest]
    fn test_update_amends_quantity_and_leaves() {
        let mut order = OrderTestBuilder::new(OrderType::Limit)
            .quantity(Quantity::from(100_u64))
            .price(Price::from("1.00000"))
            .build_core();

        order.apply(submitted(&order)).unwrap();
        order.apply(accepted(&order)).unwrap();

        let updated = OrderEventAny::Updated(OrderUpdated::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            Quantity::from(150_u64),
            UUID4::new(),
            UnixNanos::from(6),
            UnixNanos::from(6),
            false,
            order.venue_order_id,
            order.account_id,
            Some(Price::from("1.00050")),
            None,
        ));
        order.apply(updated).unwrap();
        assert_eq!(order.status, OrderStatus::Accepted);
        assert_eq!(order.quantity, Quantity::from(150_u64));
        assert_eq!(order.leaves_qty, Quantity::from(150_u64));
    }
}
