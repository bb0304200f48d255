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

//! Execution specific messages such as order commands.

use helm_core::{UUID4, UnixNanos};
use helm_model::identifiers::{ClientId, InstrumentId, StrategyId};
use strum::Display;

pub mod cancel;
pub mod cancel_all;
pub mod cancel_batch;
pub mod modify;
pub mod query;
pub mod reports;
pub mod submit;

// Re-exports
pub use self::{
    cancel::CancelOrder,
    cancel_all::CancelAllOrders,
    cancel_batch::BatchCancelOrders,
    modify::ModifyOrder,
    query::{QueryAccount, QueryOrder},
    reports::{
        GenerateFillReports, GenerateOrderStatusReport, GenerateOrderStatusReports,
        GeneratePositionReports,
    },
    submit::SubmitOrder,
};

/// A trading command sent from a strategy to the execution engine.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum TradingCommand {
    SubmitOrder(SubmitOrder),
    ModifyOrder(ModifyOrder),
    CancelOrder(CancelOrder),
    CancelAllOrders(CancelAllOrders),
    BatchCancelOrders(BatchCancelOrders),
    QueryOrder(QueryOrder),
    QueryAccount(QueryAccount),
}

impl TradingCommand {
    #[must_use]
    pub const fn client_id(&self) -> ClientId {
        match self {
            Self::SubmitOrder(command) => command.client_id,
            Self::ModifyOrder(command) => command.client_id,
            Self::CancelOrder(command) => command.client_id,
            Self::CancelAllOrders(command) => command.client_id,
            Self::BatchCancelOrders(command) => command.client_id,
            Self::QueryOrder(command) => command.client_id,
            Self::QueryAccount(command) => command.client_id,
        }
    }

    #[must_use]
    pub const fn instrument_id(&self) -> Option<InstrumentId> {
        match self {
            Self::SubmitOrder(command) => Some(command.instrument_id),
            Self::ModifyOrder(command) => Some(command.instrument_id),
            Self::CancelOrder(command) => Some(command.instrument_id),
            Self::CancelAllOrders(command) => Some(command.instrument_id),
            Self::BatchCancelOrders(command) => Some(command.instrument_id),
            Self::QueryOrder(command) => Some(command.instrument_id),
            Self::QueryAccount(_) => None,
        }
    }

    #[must_use]
    pub const fn strategy_id(&self) -> Option<StrategyId> {
        match self {
            Self::SubmitOrder(command) => Some(command.strategy_id),
            Self::ModifyOrder(command) => Some(command.strategy_id),
            Self::CancelOrder(command) => Some(command.strategy_id),
            Self::CancelAllOrders(command) => Some(command.strategy_id),
            Self::BatchCancelOrders(command) => Some(command.strategy_id),
            Self::QueryOrder(command) => Some(command.strategy_id),
            Self::QueryAccount(_) => None,
        }
    }

    #[must_use]
    pub const fn command_id(&self) -> UUID4 {
        match self {
            Self::SubmitOrder(command) => command.command_id,
            Self::ModifyOrder(command) => command.command_id,
            Self::CancelOrder(command) => command.command_id,
            Self::CancelAllOrders(command) => command.command_id,
            Self::BatchCancelOrders(command) => command.command_id,
            Self::QueryOrder(command) => command.command_id,
            Self::QueryAccount(command) => command.command_id,
        }
    }

    #[must_use]
    pub const fn ts_init(&self) -> UnixNanos {
        match self {
            Self::SubmitOrder(command) => command.ts_init,
            Self::ModifyOrder(command) => command.ts_init,
            Self::CancelOrder(command) => command.ts_init,
            Self::CancelAllOrders(command) => command.ts_init,
            Self::BatchCancelOrders(command) => command.ts_init,
            Self::QueryOrder(command) => command.ts_init,
            Self::QueryAccount(command) => command.ts_init,
        }
    }
}
