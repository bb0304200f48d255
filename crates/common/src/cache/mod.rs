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

//! A common in-memory `Cache` for execution related data.
//!
//! The cache is the authoritative local store for instruments, orders,
//! positions and accounts, with key-value indexes for O(1) lookups. It is not
//! threadsafe: the execution engine is its sole writer, and all reads are
//! serialized onto the engine loop.

pub mod config;
pub mod database;
pub mod index;

use std::collections::VecDeque;

use ahash::AHashMap;
use bytes::Bytes;
pub use config::CacheConfig;
use database::CacheDatabaseAdapter;
use helm_core::{UnixNanos, correctness::check_predicate_false, datetime::secs_to_nanos};
use helm_model::{
    accounts::AccountAny,
    data::{QuoteTick, TradeTick},
    enums::OmsType,
    identifiers::{
        AccountId, ClientId, ClientOrderId, InstrumentId, PositionId, StrategyId, Venue,
        VenueOrderId,
    },
    instruments::InstrumentAny,
    orders::OrderAny,
    position::Position,
    types::Currency,
};
use index::CacheIndex;
use ustr::Ustr;

use crate::enums::SerializationEncoding;

/// A common in-memory `Cache` for execution related data.
pub struct Cache {
    config: CacheConfig,
    index: CacheIndex,
    database: Option<Box<dyn CacheDatabaseAdapter>>,
    currencies: AHashMap<Ustr, Currency>,
    instruments: AHashMap<InstrumentId, InstrumentAny>,
    quotes: AHashMap<InstrumentId, VecDeque<QuoteTick>>,
    trades: AHashMap<InstrumentId, VecDeque<TradeTick>>,
    accounts: AHashMap<AccountId, AccountAny>,
    orders: AHashMap<ClientOrderId, OrderAny>,
    positions: AHashMap<PositionId, Position>,
    position_snapshots: AHashMap<PositionId, Vec<Bytes>>,
}

impl Default for Cache {
    /// Creates a new default [`Cache`] instance.
    fn default() -> Self {
        Self::new(Some(CacheConfig::default()), None)
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Cache))
            .field("instruments", &self.instruments.len())
            .field("orders", &self.orders.len())
            .field("positions", &self.positions.len())
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

impl Cache {
    /// Creates a new [`Cache`] instance.
    #[must_use]
    pub fn new(
        config: Option<CacheConfig>,
        database: Option<Box<dyn CacheDatabaseAdapter>>,
    ) -> Self {
        Self {
            config: config.unwrap_or_default(),
            index: CacheIndex::default(),
            database,
            currencies: AHashMap::new(),
            instruments: AHashMap::new(),
            quotes: AHashMap::new(),
            trades: AHashMap::new(),
            accounts: AHashMap::new(),
            orders: AHashMap::new(),
            positions: AHashMap::new(),
            position_snapshots: AHashMap::new(),
        }
    }

    /// Returns whether the cache has a durable backing store configured.
    #[must_use]
    pub const fn has_backing(&self) -> bool {
        self.database.is_some()
    }

    // -- COMMANDS --------------------------------------------------------------------------------

    /// Hydrates the cache from the backing store and rebuilds the index.
    ///
    /// # Errors
    ///
    /// Returns an error if loading from the backing store fails.
    pub fn load_from_database(&mut self) -> anyhow::Result<()> {
        let Some(database) = &self.database else {
            return Ok(());
        };

        let cache_map = database.load_all()?;
        for (code, currency) in cache_map.currencies {
            self.currencies.insert(Ustr::from(&code), currency);
        }
        self.instruments.extend(cache_map.instruments);
        self.accounts.extend(cache_map.accounts);
        self.orders.extend(cache_map.orders);
        self.positions.extend(cache_map.positions);

        self.build_index();
        log::info!(
            "Loaded cache from database: {} instruments, {} accounts, {} orders, {} positions",
            self.instruments.len(),
            self.accounts.len(),
            self.orders.len(),
            self.positions.len(),
        );
        Ok(())
    }

    /// Clears and rebuilds the index from current cache data.
    pub fn build_index(&mut self) {
        self.index.clear();

        let orders: Vec<OrderAny> = self.orders.values().cloned().collect();
        for order in orders {
            self.index_order(&order, order.position_id(), None);
            self.reindex_order_state(&order);
        }

        let positions: Vec<Position> = self.positions.values().cloned().collect();
        for position in &positions {
            self.index_position(position);
        }

        for account in self.accounts.values() {
            self.index
                .venue_account
                .insert(account.id().get_issuer(), account.id());
        }
    }

    /// Adds the given `currency` to the cache.
    pub fn add_currency(&mut self, currency: Currency) {
        log::debug!("Adding currency {}", currency.code);
        self.currencies.insert(currency.code, currency);
    }

    /// Adds (or atomically replaces) the given `instrument` in the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store write fails to enqueue.
    pub fn add_instrument(&mut self, instrument: InstrumentAny) -> anyhow::Result<()> {
        log::debug!("Adding instrument {}", instrument.id());
        if let Some(database) = &mut self.database {
            database.add_instrument(&instrument)?;
        }
        self.instruments.insert(instrument.id(), instrument);
        Ok(())
    }

    /// Adds the given `account` to the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if an account with the same ID already exists.
    pub fn add_account(&mut self, account: AccountAny) -> anyhow::Result<()> {
        check_predicate_false(
            self.accounts.contains_key(&account.id()),
            "account already exists in cache",
        )?;

        log::debug!("Adding account {}", account.id());
        if let Some(database) = &mut self.database {
            database.add_account(&account)?;
        }
        self.index
            .venue_account
            .insert(account.id().get_issuer(), account.id());
        self.accounts.insert(account.id(), account);
        Ok(())
    }

    /// Adds the given `quote` tick to the cache.
    pub fn add_quote(&mut self, quote: QuoteTick) {
        let quotes = self
            .quotes
            .entry(quote.instrument_id)
            .or_insert_with(|| VecDeque::with_capacity(self.config.tick_capacity));
        if quotes.len() >= self.config.tick_capacity {
            quotes.pop_back();
        }
        quotes.push_front(quote);
    }

    /// Adds the given `trade` tick to the cache.
    pub fn add_trade(&mut self, trade: TradeTick) {
        let trades = self
            .trades
            .entry(trade.instrument_id)
            .or_insert_with(|| VecDeque::with_capacity(self.config.tick_capacity));
        if trades.len() >= self.config.tick_capacity {
            trades.pop_back();
        }
        trades.push_front(trade);
    }

    /// Adds the given `order` to the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if an order with the same client order ID already
    /// exists and `replace_existing` is false.
    pub fn add_order(
        &mut self,
        order: OrderAny,
        position_id: Option<PositionId>,
        client_id: Option<ClientId>,
        replace_existing: bool,
    ) -> anyhow::Result<()> {
        let client_order_id = order.client_order_id();
        if !replace_existing {
            check_predicate_false(
                self.orders.contains_key(&client_order_id),
                &format!("order {client_order_id} already exists in cache"),
            )?;
        }

        log::debug!("Adding {order:?}");
        self.index_order(&order, position_id, client_id);

        if let Some(database) = &mut self.database {
            database.add_order(&order, client_id)?;
        }

        self.orders.insert(client_order_id, order);
        Ok(())
    }

    fn index_order(
        &mut self,
        order: &OrderAny,
        position_id: Option<PositionId>,
        client_id: Option<ClientId>,
    ) {
        let client_order_id = order.client_order_id();
        let instrument_id = order.instrument_id();
        let venue = instrument_id.venue;
        let strategy_id = order.strategy_id();

        self.index.orders.insert(client_order_id);
        self.index
            .order_strategy
            .insert(client_order_id, strategy_id);
        self.index.strategies.insert(strategy_id);
        self.index
            .venue_orders
            .entry(venue)
            .or_default()
            .insert(client_order_id);
        self.index
            .instrument_orders
            .entry(instrument_id)
            .or_default()
            .insert(client_order_id);
        self.index
            .strategy_orders
            .entry(strategy_id)
            .or_default()
            .insert(client_order_id);

        if let Some(position_id) = position_id {
            if let Err(e) =
                self.add_position_id(&position_id, &venue, &client_order_id, &strategy_id)
            {
                log::error!("Failed to index position ID: {e}");
            }
        }

        if let Some(client_id) = client_id {
            self.index.order_client.insert(client_order_id, client_id);
        }
    }

    /// Indexes the given `venue_order_id` with the given `client_order_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the venue order ID is already indexed to a
    /// different client order ID and `overwrite` is false.
    pub fn add_venue_order_id(
        &mut self,
        client_order_id: &ClientOrderId,
        venue_order_id: &VenueOrderId,
        overwrite: bool,
    ) -> anyhow::Result<()> {
        if let Some(existing) = self.index.venue_order_ids.get(venue_order_id) {
            if existing != client_order_id && !overwrite {
                anyhow::bail!(
                    "Venue order ID {venue_order_id} already indexed to {existing} (requested {client_order_id})"
                );
            }
        }
        self.index
            .venue_order_ids
            .insert(*venue_order_id, *client_order_id);
        self.index
            .client_order_ids
            .insert(*client_order_id, *venue_order_id);
        Ok(())
    }

    /// Indexes the given `position_id` with the other given IDs.
    ///
    /// # Errors
    ///
    /// Never returns an error (reserved for backing store index writes).
    pub fn add_position_id(
        &mut self,
        position_id: &PositionId,
        venue: &Venue,
        client_order_id: &ClientOrderId,
        strategy_id: &StrategyId,
    ) -> anyhow::Result<()> {
        self.index
            .order_position
            .insert(*client_order_id, *position_id);

        if let Some(database) = &mut self.database {
            database.index_order_position(*client_order_id, *position_id)?;
        }

        self.index
            .position_strategy
            .insert(*position_id, *strategy_id);
        self.index
            .position_orders
            .entry(*position_id)
            .or_default()
            .insert(*client_order_id);
        self.index
            .strategy_positions
            .entry(*strategy_id)
            .or_default()
            .insert(*position_id);
        self.index
            .venue_positions
            .entry(*venue)
            .or_default()
            .insert(*position_id);
        Ok(())
    }

    /// Adds the given `position` to the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store write fails to enqueue.
    pub fn add_position(&mut self, position: Position, _oms_type: OmsType) -> anyhow::Result<()> {
        log::debug!("Adding {position}");
        self.index_position(&position);

        if let Some(database) = &mut self.database {
            database.add_position(&position)?;
        }

        self.positions.insert(position.id, position);
        Ok(())
    }

    fn index_position(&mut self, position: &Position) {
        self.index.positions.insert(position.id);
        if position.is_open() {
            self.index.positions_open.insert(position.id);
        } else {
            self.index.positions_closed.insert(position.id);
        }
        if let Err(e) = self.add_position_id(
            &position.id,
            &position.instrument_id.venue,
            &position.opening_order_id,
            &position.strategy_id,
        ) {
            log::error!("Failed to index position ID: {e}");
        }
        self.index
            .instrument_positions
            .entry(position.instrument_id)
            .or_default()
            .insert(position.id);
    }

    /// Updates the given `order` in the cache, maintaining state indexes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store write fails to enqueue.
    pub fn update_order(&mut self, order: &OrderAny) -> anyhow::Result<()> {
        let client_order_id = order.client_order_id();

        // Venues using cancel+replace may reassign the venue order ID
        if let Some(venue_order_id) = order.venue_order_id() {
            if !self.index.venue_order_ids.contains_key(&venue_order_id) {
                self.add_venue_order_id(&client_order_id, &venue_order_id, false)?;
            }
        }

        self.reindex_order_state(order);

        if let Some(database) = &mut self.database {
            database.update_order(order.last_event())?;
        }

        self.orders.insert(client_order_id, order.clone());
        Ok(())
    }

    fn reindex_order_state(&mut self, order: &OrderAny) {
        let client_order_id = order.client_order_id();

        if order.is_inflight() {
            self.index.orders_inflight.insert(client_order_id);
        } else {
            self.index.orders_inflight.remove(&client_order_id);
        }

        if order.is_open() {
            self.index.orders_closed.remove(&client_order_id);
            self.index.orders_open.insert(client_order_id);
        } else if order.is_closed() {
            self.index.orders_open.remove(&client_order_id);
            self.index.orders_pending_cancel.remove(&client_order_id);
            self.index.orders_closed.insert(client_order_id);
        }
    }

    /// Marks the given `order` as pending cancel locally (sent, not yet acked).
    pub fn update_order_pending_cancel_local(&mut self, order: &OrderAny) {
        self.index
            .orders_pending_cancel
            .insert(order.client_order_id());
    }

    /// Updates the given `position` in the cache, maintaining state indexes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store write fails to enqueue.
    pub fn update_position(&mut self, position: &Position) -> anyhow::Result<()> {
        if position.is_open() {
            self.index.positions_open.insert(position.id);
            self.index.positions_closed.remove(&position.id);
        } else {
            self.index.positions_closed.insert(position.id);
            self.index.positions_open.remove(&position.id);
        }

        if let Some(database) = &mut self.database {
            database.update_position(position)?;
        }

        self.positions.insert(position.id, position.clone());
        Ok(())
    }

    /// Updates the given `account` in the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store write fails to enqueue.
    pub fn update_account(&mut self, account: AccountAny) -> anyhow::Result<()> {
        if let Some(database) = &mut self.database {
            database.update_account(&account)?;
        }
        self.accounts.insert(account.id(), account);
        Ok(())
    }

    /// Snapshots the given position, appending the serialized copy to the
    /// position's snapshot list.
    ///
    /// Must be called for a flat position *before* a reopening fill is
    /// applied; the execution engine enforces this for NETTING OMS.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot_position(&mut self, position: &Position) -> anyhow::Result<()> {
        let payload = match self.config.encoding {
            SerializationEncoding::MsgPack => Bytes::from(rmp_serde::to_vec(position)?),
            SerializationEncoding::Json => Bytes::from(serde_json::to_vec(position)?),
        };

        self.position_snapshots
            .entry(position.id)
            .or_default()
            .push(payload.clone());

        if let Some(database) = &mut self.database {
            database.add_position_snapshot(position.id, payload)?;
        }

        log::debug!("Snapshot {position}");
        Ok(())
    }

    /// Returns the deserialized snapshot history for the given position.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn position_snapshots(&self, position_id: &PositionId) -> anyhow::Result<Vec<Position>> {
        let Some(payloads) = self.position_snapshots.get(position_id) else {
            return Ok(Vec::new());
        };

        let mut snapshots = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let position = match self.config.encoding {
                SerializationEncoding::MsgPack => rmp_serde::from_slice(payload)?,
                SerializationEncoding::Json => serde_json::from_slice(payload)?,
            };
            snapshots.push(position);
        }
        Ok(snapshots)
    }

    /// Purges closed orders older than the buffer window from memory,
    /// enqueuing deferred deletes against the backing store.
    pub fn purge_closed_orders(&mut self, ts_now: UnixNanos, buffer_secs: u64) {
        let buffer_ns = secs_to_nanos(buffer_secs as f64);
        let to_purge: Vec<ClientOrderId> = self
            .index
            .orders_closed
            .iter()
            .filter(|client_order_id| {
                self.orders.get(*client_order_id).map_or(false, |order| {
                    order.ts_last().saturating_add(buffer_ns) <= ts_now
                })
            })
            .copied()
            .collect();

        for client_order_id in to_purge {
            self.purge_order(client_order_id);
        }
    }

    /// Purges closed positions older than the buffer window from memory,
    /// enqueuing deferred deletes against the backing store.
    pub fn purge_closed_positions(&mut self, ts_now: UnixNanos, buffer_secs: u64) {
        let buffer_ns = secs_to_nanos(buffer_secs as f64);
        let to_purge: Vec<PositionId> = self
            .index
            .positions_closed
            .iter()
            .filter(|position_id| {
                self.positions.get(*position_id).map_or(false, |position| {
                    position
                        .ts_closed
                        .map_or(false, |ts_closed| ts_closed.saturating_add(buffer_ns) <= ts_now)
                })
            })
            .copied()
            .collect();

        for position_id in to_purge {
            self.purge_position(position_id);
        }
    }

    /// Purges the given order from the cache and all indexes.
    pub fn purge_order(&mut self, client_order_id: ClientOrderId) {
        if let Some(order) = self.orders.remove(&client_order_id) {
            let instrument_id = order.instrument_id();
            if let Some(venue_orders) = self.index.venue_orders.get_mut(&instrument_id.venue) {
                venue_orders.remove(&client_order_id);
            }
            if let Some(instrument_orders) = self.index.instrument_orders.get_mut(&instrument_id) {
                instrument_orders.remove(&client_order_id);
            }
            if let Some(strategy_orders) =
                self.index.strategy_orders.get_mut(&order.strategy_id())
            {
                strategy_orders.remove(&client_order_id);
            }
            if let Some(venue_order_id) = order.venue_order_id() {
                self.index.venue_order_ids.remove(&venue_order_id);
            }
            log::info!("Purged order {client_order_id}");
        } else {
            log::warn!("Order {client_order_id} not found when purging");
        }

        self.index.orders.remove(&client_order_id);
        self.index.orders_open.remove(&client_order_id);
        self.index.orders_closed.remove(&client_order_id);
        self.index.orders_inflight.remove(&client_order_id);
        self.index.orders_pending_cancel.remove(&client_order_id);
        self.index.order_position.remove(&client_order_id);
        self.index.order_strategy.remove(&client_order_id);
        self.index.order_client.remove(&client_order_id);
        self.index.client_order_ids.remove(&client_order_id);

        if let Some(database) = &mut self.database {
            if let Err(e) = database.delete_order(&client_order_id) {
                log::error!("Failed to enqueue order delete: {e}");
            }
        }
    }

    /// Purges the given position from the cache and all indexes.
    pub fn purge_position(&mut self, position_id: PositionId) {
        if let Some(position) = self.positions.remove(&position_id) {
            if let Some(venue_positions) = self
                .index
                .venue_positions
                .get_mut(&position.instrument_id.venue)
            {
                venue_positions.remove(&position_id);
            }
            if let Some(instrument_positions) = self
                .index
                .instrument_positions
                .get_mut(&position.instrument_id)
            {
                instrument_positions.remove(&position_id);
            }
            if let Some(strategy_positions) =
                self.index.strategy_positions.get_mut(&position.strategy_id)
            {
                strategy_positions.remove(&position_id);
            }
            log::info!("Purged position {position_id}");
        } else {
            log::warn!("Position {position_id} not found when purging");
        }

        self.index.positions.remove(&position_id);
        self.index.positions_open.remove(&position_id);
        self.index.positions_closed.remove(&position_id);
        self.index.position_strategy.remove(&position_id);
        self.index.position_orders.remove(&position_id);
        self.position_snapshots.remove(&position_id);

        if let Some(database) = &mut self.database {
            if let Err(e) = database.delete_position(&position_id) {
                log::error!("Failed to enqueue position delete: {e}");
            }
        }
    }

    /// Purges account state events outside the lookback window for all
    /// accounts.
    pub fn purge_account_events(&mut self, ts_now: UnixNanos, lookback_secs: u64) {
        for account in self.accounts.values_mut() {
            let count_before = account.event_count();
            account.purge_account_events(ts_now, lookback_secs);
            let count_purged = count_before - account.event_count();
            if count_purged > 0 {
                log::info!("Purged {count_purged} event(s) from account {}", account.id());
            }
        }
    }

    /// Resets the cache to its initial empty state.
    pub fn reset(&mut self) {
        log::debug!("Resetting cache");
        self.index.clear();
        self.currencies.clear();
        self.instruments.clear();
        self.quotes.clear();
        self.trades.clear();
        self.accounts.clear();
        self.orders.clear();
        self.positions.clear();
        self.position_snapshots.clear();
    }

    /// Flushes the backing store, deleting all persisted data.
    pub fn flush_db(&mut self) {
        if let Some(database) = &mut self.database {
            if let Err(e) = database.flush() {
                log::error!("Failed to flush database: {e}");
            }
        }
    }

    /// Checks the integrity of every index against the data maps.
    ///
    /// Returns true if all checks pass.
    #[must_use]
    pub fn check_integrity(&self) -> bool {
        let mut error_count = 0;

        for client_order_id in self.orders.keys() {
            if !self.index.orders.contains(client_order_id) {
                log::error!("Integrity failure: {client_order_id} not in `index.orders`");
                error_count += 1;
            }
        }

        for client_order_id in &self.index.orders_open {
            match self.orders.get(client_order_id) {
                Some(order) if order.is_open() => {}
                Some(_) => {
                    log::error!("Integrity failure: {client_order_id} in `orders_open` not open");
                    error_count += 1;
                }
                None => {
                    log::error!("Integrity failure: {client_order_id} in `orders_open` not cached");
                    error_count += 1;
                }
            }
        }

        for client_order_id in &self.index.orders_closed {
            match self.orders.get(client_order_id) {
                Some(order) if order.is_closed() => {}
                Some(_) => {
                    log::error!(
                        "Integrity failure: {client_order_id} in `orders_closed` not closed"
                    );
                    error_count += 1;
                }
                None => {
                    log::error!(
                        "Integrity failure: {client_order_id} in `orders_closed` not cached"
                    );
                    error_count += 1;
                }
            }
        }

        for position_id in self.positions.keys() {
            if !self.index.positions.contains(position_id) {
                log::error!("Integrity failure: {position_id} not in `index.positions`");
                error_count += 1;
            }
        }

        for position_id in &self.index.positions_open {
            match self.positions.get(position_id) {
                Some(position) if position.is_open() => {}
                _ => {
                    log::error!("Integrity failure: {position_id} in `positions_open` not open");
                    error_count += 1;
                }
            }
        }

        if error_count == 0 {
            log::info!("Cache integrity check passed");
            true
        } else {
            log::error!("Cache integrity check failed with {error_count} error(s)");
            false
        }
    }

    /// Checks for residual open state, logging any open orders or positions.
    ///
    /// Returns true if residual state exists.
    #[must_use]
    pub fn check_residuals(&self) -> bool {
        let mut residuals = false;

        for order in self.orders_open(None, None, None) {
            log::warn!("Residual open order: {order}");
            residuals = true;
        }

        for position in self.positions_open(None, None) {
            log::warn!("Residual open position: {position}");
            residuals = true;
        }

        residuals
    }

    // -- IDENTIFIER QUERIES ----------------------------------------------------------------------

    /// Returns the client order ID indexed for the given `venue_order_id`.
    #[must_use]
    pub fn client_order_id(&self, venue_order_id: &VenueOrderId) -> Option<&ClientOrderId> {
        self.index.venue_order_ids.get(venue_order_id)
    }

    /// Returns the venue order ID indexed for the given `client_order_id`.
    #[must_use]
    pub fn venue_order_id(&self, client_order_id: &ClientOrderId) -> Option<&VenueOrderId> {
        self.index.client_order_ids.get(client_order_id)
    }

    /// Returns the client ID indexed for the given `client_order_id`.
    #[must_use]
    pub fn client_id(&self, client_order_id: &ClientOrderId) -> Option<&ClientId> {
        self.index.order_client.get(client_order_id)
    }

    /// Returns the position ID indexed for the given `client_order_id`.
    #[must_use]
    pub fn position_id(&self, client_order_id: &ClientOrderId) -> Option<&PositionId> {
        self.index.order_position.get(client_order_id)
    }

    // -- ORDER QUERIES ---------------------------------------------------------------------------

    /// Returns a reference to the order with the given `client_order_id`.
    #[must_use]
    pub fn order(&self, client_order_id: &ClientOrderId) -> Option<&OrderAny> {
        self.orders.get(client_order_id)
    }

    /// Returns a mutable reference to the order with the given `client_order_id`.
    #[must_use]
    pub fn mut_order(&mut self, client_order_id: &ClientOrderId) -> Option<&mut OrderAny> {
        self.orders.get_mut(client_order_id)
    }

    /// Returns whether an order with the given `client_order_id` exists.
    #[must_use]
    pub fn order_exists(&self, client_order_id: &ClientOrderId) -> bool {
        self.index.orders.contains(client_order_id)
    }

    #[must_use]
    pub fn is_order_open(&self, client_order_id: &ClientOrderId) -> bool {
        self.index.orders_open.contains(client_order_id)
    }

    #[must_use]
    pub fn is_order_closed(&self, client_order_id: &ClientOrderId) -> bool {
        self.index.orders_closed.contains(client_order_id)
    }

    #[must_use]
    pub fn is_order_inflight(&self, client_order_id: &ClientOrderId) -> bool {
        self.index.orders_inflight.contains(client_order_id)
    }

    #[must_use]
    pub fn is_order_pending_cancel_local(&self, client_order_id: &ClientOrderId) -> bool {
        self.index.orders_pending_cancel.contains(client_order_id)
    }

    fn order_query_set(
        &self,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
        strategy_id: Option<&StrategyId>,
    ) -> Option<ahash::AHashSet<ClientOrderId>> {
        let mut query: Option<ahash::AHashSet<ClientOrderId>> = None;

        if let Some(venue) = venue {
            query = Some(
                self.index
                    .venue_orders
                    .get(venue)
                    .cloned()
                    .unwrap_or_default(),
            );
        }

        if let Some(instrument_id) = instrument_id {
            let instrument_orders = self
                .index
                .instrument_orders
                .get(instrument_id)
                .cloned()
                .unwrap_or_default();
            query = Some(match query {
                Some(existing) => existing
                    .intersection(&instrument_orders)
                    .copied()
                    .collect(),
                None => instrument_orders,
            });
        }

        if let Some(strategy_id) = strategy_id {
            let strategy_orders = self
                .index
                .strategy_orders
                .get(strategy_id)
                .cloned()
                .unwrap_or_default();
            query = Some(match query {
                Some(existing) => existing.intersection(&strategy_orders).copied().collect(),
                None => strategy_orders,
            });
        }

        query
    }

    fn orders_from_ids(
        &self,
        ids: &ahash::AHashSet<ClientOrderId>,
        query: Option<&ahash::AHashSet<ClientOrderId>>,
    ) -> Vec<&OrderAny> {
        ids.iter()
            .filter(|id| query.map_or(true, |query| query.contains(*id)))
            .filter_map(|id| self.orders.get(id))
            .collect()
    }

    /// Returns all orders matching the given optional filters.
    #[must_use]
    pub fn orders(
        &self,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
        strategy_id: Option<&StrategyId>,
    ) -> Vec<&OrderAny> {
        let query = self.order_query_set(venue, instrument_id, strategy_id);
        self.orders_from_ids(&self.index.orders, query.as_ref())
    }

    /// Returns all open orders matching the given optional filters.
    #[must_use]
    pub fn orders_open(
        &self,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
        strategy_id: Option<&StrategyId>,
    ) -> Vec<&OrderAny> {
        let query = self.order_query_set(venue, instrument_id, strategy_id);
        self.orders_from_ids(&self.index.orders_open, query.as_ref())
    }

    /// Returns all closed orders matching the given optional filters.
    #[must_use]
    pub fn orders_closed(
        &self,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
        strategy_id: Option<&StrategyId>,
    ) -> Vec<&OrderAny> {
        let query = self.order_query_set(venue, instrument_id, strategy_id);
        self.orders_from_ids(&self.index.orders_closed, query.as_ref())
    }

    /// Returns all in-flight orders matching the given optional filters.
    #[must_use]
    pub fn orders_inflight(
        &self,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
        strategy_id: Option<&StrategyId>,
    ) -> Vec<&OrderAny> {
        let query = self.order_query_set(venue, instrument_id, strategy_id);
        self.orders_from_ids(&self.index.orders_inflight, query.as_ref())
    }

    /// Returns all orders for the given position.
    #[must_use]
    pub fn orders_for_position(&self, position_id: &PositionId) -> Vec<&OrderAny> {
        self.index
            .position_orders
            .get(position_id)
            .map_or_else(Vec::new, |ids| {
                ids.iter().filter_map(|id| self.orders.get(id)).collect()
            })
    }

    #[must_use]
    pub fn orders_open_count(&self) -> usize {
        self.index.orders_open.len()
    }

    #[must_use]
    pub fn orders_total_count(&self) -> usize {
        self.index.orders.len()
    }

    // -- POSITION QUERIES ------------------------------------------------------------------------

    /// Returns a reference to the position with the given `position_id`.
    #[must_use]
    pub fn position(&self, position_id: &PositionId) -> Option<&Position> {
        self.positions.get(position_id)
    }

    /// Returns the position associated with the given `client_order_id`.
    #[must_use]
    pub fn position_for_order(&self, client_order_id: &ClientOrderId) -> Option<&Position> {
        self.index
            .order_position
            .get(client_order_id)
            .and_then(|position_id| self.positions.get(position_id))
    }

    /// Returns whether a position with the given `position_id` exists.
    #[must_use]
    pub fn position_exists(&self, position_id: &PositionId) -> bool {
        self.index.positions.contains(position_id)
    }

    #[must_use]
    pub fn is_position_open(&self, position_id: &PositionId) -> bool {
        self.index.positions_open.contains(position_id)
    }

    #[must_use]
    pub fn is_position_closed(&self, position_id: &PositionId) -> bool {
        self.index.positions_closed.contains(position_id)
    }

    fn positions_from_ids(
        &self,
        ids: &ahash::AHashSet<PositionId>,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
    ) -> Vec<&Position> {
        ids.iter()
            .filter_map(|id| self.positions.get(id))
            .filter(|position| {
                venue.map_or(true, |venue| &position.instrument_id.venue == venue)
                    && instrument_id.map_or(true, |id| &position.instrument_id == id)
            })
            .collect()
    }

    /// Returns all positions matching the given optional filters.
    #[must_use]
    pub fn positions(
        &self,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
    ) -> Vec<&Position> {
        self.positions_from_ids(&self.index.positions, venue, instrument_id)
    }

    /// Returns all open positions matching the given optional filters.
    #[must_use]
    pub fn positions_open(
        &self,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
    ) -> Vec<&Position> {
        self.positions_from_ids(&self.index.positions_open, venue, instrument_id)
    }

    /// Returns all closed positions matching the given optional filters.
    #[must_use]
    pub fn positions_closed(
        &self,
        venue: Option<&Venue>,
        instrument_id: Option<&InstrumentId>,
    ) -> Vec<&Position> {
        self.positions_from_ids(&self.index.positions_closed, venue, instrument_id)
    }

    #[must_use]
    pub fn positions_open_count(&self) -> usize {
        self.index.positions_open.len()
    }

    // -- ACCOUNT QUERIES -------------------------------------------------------------------------

    /// Returns a reference to the account with the given `account_id`.
    #[must_use]
    pub fn account(&self, account_id: &AccountId) -> Option<&AccountAny> {
        self.accounts.get(account_id)
    }

    /// Returns a mutable reference to the account with the given `account_id`.
    #[must_use]
    pub fn mut_account(&mut self, account_id: &AccountId) -> Option<&mut AccountAny> {
        self.accounts.get_mut(account_id)
    }

    /// Returns the account for the given `venue`.
    #[must_use]
    pub fn account_for_venue(&self, venue: &Venue) -> Option<&AccountAny> {
        self.index
            .venue_account
            .get(venue)
            .and_then(|account_id| self.accounts.get(account_id))
    }

    /// Returns the account ID indexed for the given `venue`.
    #[must_use]
    pub fn account_id(&self, venue: &Venue) -> Option<&AccountId> {
        self.index.venue_account.get(venue)
    }

    // -- INSTRUMENT & DATA QUERIES ---------------------------------------------------------------

    /// Returns a reference to the instrument with the given `instrument_id`.
    #[must_use]
    pub fn instrument(&self, instrument_id: &InstrumentId) -> Option<&InstrumentAny> {
        self.instruments.get(instrument_id)
    }

    /// Returns all instrument IDs for the given optional venue filter.
    #[must_use]
    pub fn instrument_ids(&self, venue: Option<&Venue>) -> Vec<&InstrumentId> {
        self.instruments
            .keys()
            .filter(|id| venue.map_or(true, |venue| &id.venue == venue))
            .collect()
    }

    /// Returns a reference to the currency with the given `code`.
    #[must_use]
    pub fn currency(&self, code: &Ustr) -> Option<&Currency> {
        self.currencies.get(code)
    }

    /// Returns the latest quote tick for the given instrument.
    #[must_use]
    pub fn quote(&self, instrument_id: &InstrumentId) -> Option<&QuoteTick> {
        self.quotes.get(instrument_id).and_then(VecDeque::front)
    }

    /// Returns the latest trade tick for the given instrument.
    #[must_use]
    pub fn trade(&self, instrument_id: &InstrumentId) -> Option<&TradeTick> {
        self.trades.get(instrument_id).and_then(VecDeque::front)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests;
