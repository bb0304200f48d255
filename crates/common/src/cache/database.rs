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

//! The `CacheDatabaseAdapter` trait for optional durable cache backing.
//!
//! Keys follow the layout `{trader_key}:{entity_kind}:{id}` with
//! MessagePack-encoded canonical payloads. Writes are buffered (write-behind)
//! by the implementation; the cache never blocks on the store.

use std::collections::HashMap;

use helm_model::{
    accounts::AccountAny,
    events::OrderEventAny,
    identifiers::{AccountId, ClientId, ClientOrderId, InstrumentId, PositionId},
    instruments::InstrumentAny,
    orders::OrderAny,
    position::Position,
};

/// A map of all cached entities loaded from a backing store.
#[derive(Debug, Default)]
pub struct CacheMap {
    pub currencies: HashMap<String, helm_model::types::Currency>,
    pub instruments: HashMap<InstrumentId, InstrumentAny>,
    pub accounts: HashMap<AccountId, AccountAny>,
    pub orders: HashMap<ClientOrderId, OrderAny>,
    pub positions: HashMap<PositionId, Position>,
}

/// The interface for a durable cache backing store.
///
/// Implementations buffer writes (write-behind) on a configurable interval;
/// deletes are likewise deferred and never synchronous with the in-memory
/// mutation.
pub trait CacheDatabaseAdapter {
    /// Closes the adapter, flushing any buffered operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the close fails.
    fn close(&mut self) -> anyhow::Result<()>;

    /// Deletes all data from the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> anyhow::Result<()>;

    /// Loads all cached entities from the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the load fails.
    fn load_all(&self) -> anyhow::Result<CacheMap>;

    /// Adds the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn add_order(&mut self, order: &OrderAny, client_id: Option<ClientId>) -> anyhow::Result<()>;

    /// Updates the given order from its last event.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn update_order(&mut self, event: &OrderEventAny) -> anyhow::Result<()>;

    /// Adds the given position.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn add_position(&mut self, position: &Position) -> anyhow::Result<()>;

    /// Updates the given position.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn update_position(&mut self, position: &Position) -> anyhow::Result<()>;

    /// Adds the given position snapshot under
    /// `{trader_key}:positions:snapshots:{position_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn add_position_snapshot(
        &mut self,
        position_id: PositionId,
        payload: bytes::Bytes,
    ) -> anyhow::Result<()>;

    /// Adds the given account.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn add_account(&mut self, account: &AccountAny) -> anyhow::Result<()>;

    /// Updates the given account.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn update_account(&mut self, account: &AccountAny) -> anyhow::Result<()>;

    /// Adds the given instrument.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn add_instrument(&mut self, instrument: &InstrumentAny) -> anyhow::Result<()>;

    /// Indexes `client_order_id` to `position_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn index_order_position(
        &mut self,
        client_order_id: ClientOrderId,
        position_id: PositionId,
    ) -> anyhow::Result<()>;

    /// Deletes the given order (deferred).
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn delete_order(&mut self, client_order_id: &ClientOrderId) -> anyhow::Result<()>;

    /// Deletes the given position (deferred).
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be enqueued.
    fn delete_position(&mut self, position_id: &PositionId) -> anyhow::Result<()>;
}
