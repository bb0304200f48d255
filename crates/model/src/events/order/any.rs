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

use helm_core::{UUID4, UnixNanos};
use serde::{Deserialize, Serialize};
use strum::Display;
use ustr::Ustr;

use super::OrderEventType;
use crate::{
    events::{
        OrderAccepted, OrderCancelRejected, OrderCanceled, OrderDenied, OrderExpired, OrderFilled,
        OrderInitialized, OrderModifyRejected, OrderPendingCancel, OrderPendingUpdate,
        OrderRejected, OrderSubmitted, OrderTriggered, OrderUpdated,
    },
    identifiers::{AccountId, ClientOrderId, InstrumentId, StrategyId, TraderId, VenueOrderId},
};

/// Wraps an order event allowing polymorphism.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, PartialEq, Eq, Display, Debug, Serialize, Deserialize)]
pub enum OrderEventAny {
    Initialized(OrderInitialized),
    Denied(OrderDenied),
    Submitted(OrderSubmitted),
    Accepted(OrderAccepted),
    Rejected(OrderRejected),
    Canceled(OrderCanceled),
    Expired(OrderExpired),
    Triggered(OrderTriggered),
    PendingUpdate(OrderPendingUpdate),
    PendingCancel(OrderPendingCancel),
    ModifyRejected(OrderModifyRejected),
    CancelRejected(OrderCancelRejected),
    Updated(OrderUpdated),
    Filled(OrderFilled),
}

macro_rules! delegate_to_event {
    ($self:ident, $field:ident) => {
        match $self {
            OrderEventAny::Initialized(event) => event.$field,
            OrderEventAny::Denied(event) => event.$field,
            OrderEventAny::Submitted(event) => event.$field,
            OrderEventAny::Accepted(event) => event.$field,
            OrderEventAny::Rejected(event) => event.$field,
            OrderEventAny::Canceled(event) => event.$field,
            OrderEventAny::Expired(event) => event.$field,
            OrderEventAny::Triggered(event) => event.$field,
            OrderEventAny::PendingUpdate(event) => event.$field,
            OrderEventAny::PendingCancel(event) => event.$field,
            OrderEventAny::ModifyRejected(event) => event.$field,
            OrderEventAny::CancelRejected(event) => event.$field,
            OrderEventAny::Updated(event) => event.$field,
            OrderEventAny::Filled(event) => event.$field,
        }
    };
}

impl OrderEventAny {
    #[must_use]
    pub const fn event_type(&self) -> OrderEventType {
        match self {
            Self::Initialized(_) => OrderEventType::Initialized,
            Self::Denied(_) => OrderEventType::Denied,
            Self::Submitted(_) => OrderEventType::Submitted,
            Self::Accepted(_) => OrderEventType::Accepted,
            Self::Rejected(_) => OrderEventType::Rejected,
            Self::Canceled(_) => OrderEventType::Canceled,
            Self::Expired(_) => OrderEventType::Expired,
            Self::Triggered(_) => OrderEventType::Triggered,
            Self::PendingUpdate(_) => OrderEventType::PendingUpdate,
            Self::PendingCancel(_) => OrderEventType::PendingCancel,
            Self::ModifyRejected(_) => OrderEventType::ModifyRejected,
            Self::CancelRejected(_) => OrderEventType::CancelRejected,
            Self::Updated(_) => OrderEventType::Updated,
            Self::Filled(_) => OrderEventType::Filled,
        }
    }

    #[must_use]
    pub fn event_id(&self) -> UUID4 {
        delegate_to_event!(self, event_id)
    }

    #[must_use]
    pub fn trader_id(&self) -> TraderId {
        delegate_to_event!(self, trader_id)
    }

    #[must_use]
    pub fn strategy_id(&self) -> StrategyId {
        delegate_to_event!(self, strategy_id)
    }

    #[must_use]
    pub fn instrument_id(&self) -> InstrumentId {
        delegate_to_event!(self, instrument_id)
    }

    #[must_use]
    pub fn client_order_id(&self) -> ClientOrderId {
        delegate_to_event!(self, client_order_id)
    }

    #[must_use]
    pub fn ts_event(&self) -> UnixNanos {
        delegate_to_event!(self, ts_event)
    }

    #[must_use]
    pub fn ts_init(&self) -> UnixNanos {
        delegate_to_event!(self, ts_init)
    }

    #[must_use]
    pub fn venue_order_id(&self) -> Option<VenueOrderId> {
        match self {
            Self::Initialized(_) | Self::Denied(_) | Self::Submitted(_) => None,
            Self::Accepted(event) => Some(event.venue_order_id),
            Self::Rejected(_) => None,
            Self::Canceled(event) => event.venue_order_id,
            Self::Expired(event) => event.venue_order_id,
            Self::Triggered(event) => event.venue_order_id,
            Self::PendingUpdate(event) => event.venue_order_id,
            Self::PendingCancel(event) => event.venue_order_id,
            Self::ModifyRejected(event) => event.venue_order_id,
            Self::CancelRejected(event) => event.venue_order_id,
            Self::Updated(event) => event.venue_order_id,
            Self::Filled(event) => Some(event.venue_order_id),
        }
    }

    #[must_use]
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            Self::Initialized(_) | Self::Denied(_) => None,
            Self::Submitted(event) => Some(event.account_id),
            Self::Accepted(event) => Some(event.account_id),
            Self::Rejected(event) => Some(event.account_id),
            Self::Canceled(event) => event.account_id,
            Self::Expired(event) => event.account_id,
            Self::Triggered(event) => event.account_id,
            Self::PendingUpdate(event) => Some(event.account_id),
            Self::PendingCancel(event) => Some(event.account_id),
            Self::ModifyRejected(event) => event.account_id,
            Self::CancelRejected(event) => event.account_id,
            Self::Updated(event) => event.account_id,
            Self::Filled(event) => Some(event.account_id),
        }
    }

    /// Returns the event message (rejection or denial reason), if any.
    #[must_use]
    pub fn message(&self) -> Option<Ustr> {
        match self {
            Self::Denied(event) => Some(event.reason),
            Self::Rejected(event) => Some(event.reason),
            Self::ModifyRejected(event) => Some(event.reason),
            Self::CancelRejected(event) => Some(event.reason),
            _ => None,
        }
    }

    /// Returns whether the event was generated during reconciliation.
    #[must_use]
    pub const fn reconciliation(&self) -> bool {
        match self {
            Self::Initialized(event) => event.reconciliation,
            Self::Denied(_) | Self::Submitted(_) => false,
            Self::Accepted(event) => event.reconciliation,
            Self::Rejected(event) => event.reconciliation,
            Self::Canceled(event) => event.reconciliation,
            Self::Expired(event) => event.reconciliation,
            Self::Triggered(event) => event.reconciliation,
            Self::PendingUpdate(event) => event.reconciliation,
            Self::PendingCancel(event) => event.reconciliation,
            Self::ModifyRejected(event) => event.reconciliation,
            Self::CancelRejected(event) => event.reconciliation,
            Self::Updated(event) => event.reconciliation,
            Self::Filled(event) => event.reconciliation,
        }
    }
}

impl From<OrderEventAny> for OrderFilled {
    fn from(event: OrderEventAny) -> Self {
        match event {
            OrderEventAny::Filled(event) => event,
            _ => panic!("Invalid `OrderEventAny` not `OrderFilled`, was {event:?}"),
        }
    }
}
