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

//! Order lifecycle events.

use helm_core::{UUID4, UnixNanos};

use crate::identifiers::{ClientOrderId, InstrumentId, StrategyId, TraderId};

pub mod accepted;
pub mod any;
pub mod cancel_rejected;
pub mod canceled;
pub mod denied;
pub mod expired;
pub mod filled;
pub mod initialized;
pub mod modify_rejected;
pub mod pending_cancel;
pub mod pending_update;
pub mod rejected;
pub mod submitted;
pub mod triggered;
pub mod updated;

/// Represents a type of [`OrderEvent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrderEventType {
    Initialized,
    Denied,
    Submitted,
    Accepted,
    Rejected,
    Canceled,
    Expired,
    Triggered,
    PendingUpdate,
    PendingCancel,
    ModifyRejected,
    CancelRejected,
    Updated,
    Filled,
}

/// Common accessors shared by all order events.
pub trait OrderEvent: 'static + Send {
    /// The unique identifier for the event.
    fn id(&self) -> UUID4;
    /// The event kind as a string.
    fn kind(&self) -> &'static str;
    fn trader_id(&self) -> TraderId;
    fn strategy_id(&self) -> StrategyId;
    fn instrument_id(&self) -> InstrumentId;
    fn client_order_id(&self) -> ClientOrderId;
    fn ts_event(&self) -> UnixNanos;
    fn ts_init(&self) -> UnixNanos;
}

macro_rules! impl_order_event {
    ($ty:ty) => {
        impl crate::events::order::OrderEvent for $ty {
            fn id(&self) -> helm_core::UUID4 {
                self.event_id
            }

            fn kind(&self) -> &'static str {
                stringify!($ty)
            }

            fn trader_id(&self) -> crate::identifiers::TraderId {
                self.trader_id
            }

            fn strategy_id(&self) -> crate::identifiers::StrategyId {
                self.strategy_id
            }

            fn instrument_id(&self) -> crate::identifiers::InstrumentId {
                self.instrument_id
            }

            fn client_order_id(&self) -> crate::identifiers::ClientOrderId {
                self.client_order_id
            }

            fn ts_event(&self) -> helm_core::UnixNanos {
                self.ts_event
            }

            fn ts_init(&self) -> helm_core::UnixNanos {
                self.ts_init
            }
        }
    };
}

pub(crate) use impl_order_event;
