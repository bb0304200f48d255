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

//! Commands requesting execution state reports from a client.

use helm_core::{UUID4, UnixNanos};
use helm_model::identifiers::{ClientOrderId, InstrumentId, VenueOrderId};
use serde::{Deserialize, Serialize};

/// A command to generate an order status report for a single order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct GenerateOrderStatusReport {
    pub instrument_id: Option<InstrumentId>,
    pub client_order_id: Option<ClientOrderId>,
    pub venue_order_id: Option<VenueOrderId>,
    pub command_id: UUID4,
    pub ts_init: UnixNanos,
}

impl GenerateOrderStatusReport {
    /// Creates a new [`GenerateOrderStatusReport`] command.
    #[must_use]
    pub const fn new(
        instrument_id: Option<InstrumentId>,
        client_order_id: Option<ClientOrderId>,
        venue_order_id: Option<VenueOrderId>,
        command_id: UUID4,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            instrument_id,
            client_order_id,
            venue_order_id,
            command_id,
            ts_init,
        }
    }
}

/// A command to generate order status reports, optionally scoped to an
/// instrument and restricted to venue-open orders.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct GenerateOrderStatusReports {
    pub instrument_id: Option<InstrumentId>,
    /// If only venue-open orders are requested.
    pub open_only: bool,
    /// The lookback window (minutes) for closed orders.
    pub lookback_mins: Option<u64>,
    pub command_id: UUID4,
    pub ts_init: UnixNanos,
}

impl GenerateOrderStatusReports {
    /// Creates a new [`GenerateOrderStatusReports`] command.
    #[must_use]
    pub const fn new(
        instrument_id: Option<InstrumentId>,
        open_only: bool,
        lookback_mins: Option<u64>,
        command_id: UUID4,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            instrument_id,
            open_only,
            lookback_mins,
            command_id,
            ts_init,
        }
    }
}

/// A command to generate fill reports.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct GenerateFillReports {
    pub instrument_id: Option<InstrumentId>,
    pub venue_order_id: Option<VenueOrderId>,
    /// The start of the query window (UNIX nanoseconds).
    pub start: Option<UnixNanos>,
    pub command_id: UUID4,
    pub ts_init: UnixNanos,
}

impl GenerateFillReports {
    /// Creates a new [`GenerateFillReports`] command.
    #[must_use]
    pub const fn new(
        instrument_id: Option<InstrumentId>,
        venue_order_id: Option<VenueOrderId>,
        start: Option<UnixNanos>,
        command_id: UUID4,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            instrument_id,
            venue_order_id,
            start,
            command_id,
            ts_init,
        }
    }
}

/// A command to generate position status reports.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct GeneratePositionReports {
    pub instrument_id: Option<InstrumentId>,
    /// The start of the query window (UNIX nanoseconds).
    pub start: Option<UnixNanos>,
    pub command_id: UUID4,
    pub ts_init: UnixNanos,
}

impl GeneratePositionReports {
    /// Creates a new [`GeneratePositionReports`] command.
    #[must_use]
    pub const fn new(
        instrument_id: Option<InstrumentId>,
        start: Option<UnixNanos>,
        command_id: UUID4,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            instrument_id,
            start,
            command_id,
            ts_init,
        }
    }
}
