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

//! Position lifecycle events.

use helm_core::UnixNanos;

use crate::identifiers::{InstrumentId, PositionId, StrategyId};

pub mod changed;
pub mod closed;
pub mod opened;

use changed::PositionChanged;
use closed::PositionClosed;
use opened::PositionOpened;

/// Wraps a position event allowing polymorphism.
#[derive(Clone, PartialEq, Debug)]
pub enum PositionEvent {
    PositionOpened(PositionOpened),
    PositionChanged(PositionChanged),
    PositionClosed(PositionClosed),
}

impl PositionEvent {
    #[must_use]
    pub const fn instrument_id(&self) -> InstrumentId {
        match self {
            Self::PositionOpened(event) => event.instrument_id,
            Self::PositionChanged(event) => event.instrument_id,
            Self::PositionClosed(event) => event.instrument_id,
        }
    }

    #[must_use]
    pub const fn position_id(&self) -> PositionId {
        match self {
            Self::PositionOpened(event) => event.position_id,
            Self::PositionChanged(event) => event.position_id,
            Self::PositionClosed(event) => event.position_id,
        }
    }

    #[must_use]
    pub const fn strategy_id(&self) -> StrategyId {
        match self {
            Self::PositionOpened(event) => event.strategy_id,
            Self::PositionChanged(event) => event.strategy_id,
            Self::PositionClosed(event) => event.strategy_id,
        }
    }

    #[must_use]
    pub const fn ts_event(&self) -> UnixNanos {
        match self {
            Self::PositionOpened(event) => event.ts_event,
            Self::PositionChanged(event) => event.ts_event,
            Self::PositionClosed(event) => event.ts_event,
        }
    }
}
