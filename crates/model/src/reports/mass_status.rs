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
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    identifiers::{AccountId, ClientId, InstrumentId, Venue, VenueOrderId},
    reports::{FillReport, OrderStatusReport, PositionStatusReport},
};

/// Represents an execution mass status report for an execution client,
/// including all order, fill and position status reports from the venue.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionMassStatus {
    /// The client ID for the report.
    pub client_id: ClientId,
    /// The account ID for the report.
    pub account_id: AccountId,
    /// The venue for the report.
    pub venue: Venue,
    /// The unique identifier for the report.
    pub report_id: UUID4,
    /// UNIX timestamp (nanoseconds) when the report was initialized.
    pub ts_init: UnixNanos,
    order_reports: IndexMap<VenueOrderId, OrderStatusReport>,
    fill_reports: IndexMap<VenueOrderId, Vec<FillReport>>,
    position_reports: IndexMap<InstrumentId, Vec<PositionStatusReport>>,
}

impl ExecutionMassStatus {
    /// Creates a new [`ExecutionMassStatus`] instance.
    #[must_use]
    pub fn new(
        client_id: ClientId,
        account_id: AccountId,
        venue: Venue,
        ts_init: UnixNanos,
        report_id: Option<UUID4>,
    ) -> Self {
        Self {
            client_id,
            account_id,
            venue,
            report_id: report_id.unwrap_or_default(),
            ts_init,
            order_reports: IndexMap::new(),
            fill_reports: IndexMap::new(),
            position_reports: IndexMap::new(),
        }
    }

    /// Returns the order status reports keyed by venue order ID.
    #[must_use]
    pub const fn order_reports(&self) -> &IndexMap<VenueOrderId, OrderStatusReport> {
        &self.order_reports
    }

    /// Returns the fill reports keyed by venue order ID.
    #[must_use]
    pub const fn fill_reports(&self) -> &IndexMap<VenueOrderId, Vec<FillReport>> {
        &self.fill_reports
    }

    /// Returns the position status reports keyed by instrument ID.
    #[must_use]
    pub const fn position_reports(&self) -> &IndexMap<InstrumentId, Vec<PositionStatusReport>> {
        &self.position_reports
    }

    /// Adds the given order status reports to the mass status.
    pub fn add_order_reports(&mut self, reports: Vec<OrderStatusReport>) {
        for report in reports {
            self.order_reports.insert(report.venue_order_id, report);
        }
    }

    /// Adds the given fill reports to the mass status.
    pub fn add_fill_reports(&mut self, reports: Vec<FillReport>) {
        for report in reports {
            self.fill_reports
                .entry(report.venue_order_id)
                .or_default()
                .push(report);
        }
    }

    /// Adds the given position status reports to the mass status.
    pub fn add_position_reports(&mut self, reports: Vec<PositionStatusReport>) {
        for report in reports {
            self.position_reports
                .entry(report.instrument_id)
                .or_default()
                .push(report);
        }
    }
}
