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

//! Message types for communication between system components.

use helm_model::{
    events::OrderEventAny,
    reports::{ExecutionMassStatus, FillReport, OrderStatusReport, PositionStatusReport},
};
use strum::Display;

pub mod execution;

// Re-exports
pub use execution::TradingCommand;

/// Execution state reports produced by execution clients.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Display)]
pub enum ExecutionReport {
    OrderStatus(Box<OrderStatusReport>),
    Fill(Box<FillReport>),
    Position(Box<PositionStatusReport>),
    Mass(Box<ExecutionMassStatus>),
}

/// Execution event variants for order events and reports, funneled from
/// worker threads onto the engine loop.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Display)]
pub enum ExecutionEvent {
    Order(OrderEventAny),
    Report(ExecutionReport),
}
