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

//! The `DataClient` contract implemented by every venue data adapter.

use async_trait::async_trait;
use helm_model::identifiers::{ClientId, InstrumentId, Venue};

use crate::subscriptions::SubscriptionKind;

/// The contract implemented by every venue data client.
///
/// Connection lifecycle is idempotent: `connect` blocks until the client is
/// usable (authenticated, initial instruments loaded, stream active), and
/// `connect . disconnect . connect` leaves the client functionally equivalent
/// to a single `connect`. Subscriptions are idempotent and reference counted
/// through a [`crate::subscriptions::SubscriptionBook`]; unsubscribe is
/// best-effort where the venue forbids it (a declared capability).
///
/// Subscribed streams are demultiplexed into data events published on the
/// canonical message bus topics (e.g. `data.quotes.{venue}.{symbol}`).
#[async_trait(?Send)]
pub trait DataClient {
    /// Returns the client ID.
    fn client_id(&self) -> ClientId;

    /// Returns the client's venue.
    fn venue(&self) -> Venue;

    /// Returns whether the client is connected and usable.
    fn is_connected(&self) -> bool;

    /// Returns whether the venue supports unsubscribing from streams.
    fn supports_unsubscribe(&self) -> bool {
        true
    }

    /// Starts the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the client fails to start.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stops the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the client fails to stop.
    fn stop(&mut self) -> anyhow::Result<()>;

    /// Connects the client, blocking until it is usable.
    ///
    /// Idempotent: connecting a connected client is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    async fn connect(&mut self) -> anyhow::Result<()>;

    /// Disconnects the client.
    ///
    /// Idempotent: disconnecting a disconnected client is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the disconnection fails.
    async fn disconnect(&mut self) -> anyhow::Result<()>;

    /// Subscribes to the given data stream for the instrument.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription fails at the venue.
    async fn subscribe(
        &mut self,
        instrument_id: InstrumentId,
        kind: SubscriptionKind,
    ) -> anyhow::Result<()>;

    /// Unsubscribes from the given data stream for the instrument
    /// (best-effort).
    ///
    /// # Errors
    ///
    /// Returns an error if the unsubscription fails at the venue.
    async fn unsubscribe(
        &mut self,
        instrument_id: InstrumentId,
        kind: SubscriptionKind,
    ) -> anyhow::Result<()>;

    /// Requests the venue's current instrument definitions, publishing them
    /// as updates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn request_instruments(&mut self, venue: Option<Venue>) -> anyhow::Result<()>;
}
