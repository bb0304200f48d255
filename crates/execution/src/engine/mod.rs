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

//! Provides a generic `ExecutionEngine` for all environments.
//!
//! The execution engine's primary responsibility is to orchestrate
//! interactions between the registered execution clients and the rest of the
//! platform: routing validated trading commands to the right client, tracking
//! in-flight orders, applying venue events to the domain model via the cache,
//! and managing the position lifecycle.

pub mod config;

use std::{any::Any, cell::RefCell, fmt::Debug, rc::Rc, time::SystemTime};

use ahash::{AHashMap, AHashSet};
use config::ExecutionEngineConfig;
use helm_common::{
    cache::Cache,
    clock::Clock,
    generators::position_id::PositionIdGenerator,
    logging::{CMD, EVT, RECV},
    messages::execution::{
        BatchCancelOrders, CancelAllOrders, CancelOrder, ModifyOrder, QueryAccount, QueryOrder,
        SubmitOrder, TradingCommand,
    },
    msgbus::{self, switchboard},
};
use helm_core::{UUID4, UnixNanos, time::get_atomic_clock_realtime};
use helm_model::{
    accounts::AccountAny,
    enums::{ContingencyType, OmsType, OrderSide},
    events::{
        AccountState, OrderCancelRejected, OrderDenied, OrderEventAny, OrderFilled,
        PositionChanged, PositionClosed, PositionOpened,
    },
    identifiers::{ClientId, ClientOrderId, PositionId, StrategyId, Venue},
    instruments::InstrumentAny,
    orders::{OrderAny, OrderError},
    position::Position,
    types::{AccountBalance, Money, Price, Quantity},
};

use crate::client::ExecutionClient;

/// An in-flight command record: sent to the venue with no acknowledging or
/// terminal event yet observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InflightCommand {
    /// UNIX timestamp (nanoseconds) when the command was sent.
    pub ts_sent: UnixNanos,
    /// The kind of command sent.
    pub kind: InflightKind,
}

/// The kind of in-flight command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InflightKind {
    Submit,
    Modify,
    Cancel,
}

/// The outstanding balance lock held against a working order.
///
/// Locked on submit, released proportionally as fills arrive and in full
/// when the order reaches a terminal state without filling.
#[derive(Clone, Copy, Debug)]
struct BalanceLock {
    /// The amount locked when the order was submitted.
    original: Money,
    /// The portion of the lock not yet released.
    remaining: Money,
    /// The order quantity the lock was calculated over.
    quantity: Quantity,
    /// The quantity not yet covered by fills.
    quantity_left: Quantity,
}

/// Central execution engine responsible for orchestrating order routing and
/// execution.
pub struct ExecutionEngine {
    clock: Rc<RefCell<dyn Clock>>,
    cache: Rc<RefCell<Cache>>,
    clients: AHashMap<ClientId, Rc<dyn ExecutionClient>>,
    default_client: Option<Rc<dyn ExecutionClient>>,
    routing_map: AHashMap<Venue, ClientId>,
    oms_overrides: AHashMap<StrategyId, OmsType>,
    external_clients: AHashSet<ClientId>,
    pos_id_generator: PositionIdGenerator,
    inflight: AHashMap<ClientOrderId, InflightCommand>,
    balances_locked: RefCell<AHashMap<ClientOrderId, BalanceLock>>,
    config: ExecutionEngineConfig,
}

impl Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(ExecutionEngine))
            .field("client_count", &self.clients.len())
            .finish()
    }
}

impl ExecutionEngine {
    /// Creates a new [`ExecutionEngine`] instance.
    pub fn new(
        clock: Rc<RefCell<dyn Clock>>,
        cache: Rc<RefCell<Cache>>,
        config: Option<ExecutionEngineConfig>,
    ) -> Self {
        let trader_id = msgbus::get_message_bus().borrow().trader_id;
        Self {
            clock,
            cache,
            clients: AHashMap::new(),
            default_client: None,
            routing_map: AHashMap::new(),
            oms_overrides: AHashMap::new(),
            external_clients: config
                .as_ref()
                .and_then(|c| c.external_clients.clone())
                .unwrap_or_default()
                .into_iter()
                .map(|value| ClientId::from(value.as_str()))
                .collect(),
            pos_id_generator: PositionIdGenerator::new(trader_id, get_atomic_clock_realtime()),
            inflight: AHashMap::new(),
            balances_locked: RefCell::new(AHashMap::new()),
            config: config.unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn check_connected(&self) -> bool {
        self.clients.values().all(|c| c.is_connected())
    }

    #[must_use]
    pub fn check_disconnected(&self) -> bool {
        self.clients.values().all(|c| !c.is_connected())
    }

    #[must_use]
    pub fn check_integrity(&self) -> bool {
        self.cache.borrow().check_integrity()
    }

    #[must_use]
    pub fn check_residuals(&self) -> bool {
        self.cache.borrow().check_residuals()
    }

    /// Returns the current in-flight command records.
    #[must_use]
    pub fn inflight_commands(&self) -> Vec<(ClientOrderId, InflightCommand)> {
        self.inflight
            .iter()
            .map(|(client_order_id, command)| (*client_order_id, *command))
            .collect()
    }

    // -- REGISTRATION ----------------------------------------------------------------------------

    /// Registers a new execution client, routing its venue to it.
    ///
    /// # Errors
    ///
    /// Returns an error if a client with the same ID is already registered.
    pub fn register_client(&mut self, client: Rc<dyn ExecutionClient>) -> anyhow::Result<()> {
        if self.clients.contains_key(&client.client_id()) {
            anyhow::bail!("Client already registered with ID {}", client.client_id());
        }

        self.routing_map.insert(client.venue(), client.client_id());

        log::info!("Registered client {}", client.client_id());
        self.clients.insert(client.client_id(), client);
        Ok(())
    }

    /// Registers a default execution client for fallback routing.
    pub fn register_default_client(&mut self, client: Rc<dyn ExecutionClient>) {
        log::info!("Registered default client {}", client.client_id());
        self.default_client = Some(client);
    }

    /// Sets routing for a specific venue to a given client ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the client ID is not registered.
    pub fn register_venue_routing(
        &mut self,
        client_id: ClientId,
        venue: Venue,
    ) -> anyhow::Result<()> {
        if !self.clients.contains_key(&client_id) {
            anyhow::bail!("No client registered with ID {client_id}");
        }

        self.routing_map.insert(venue, client_id);
        log::info!("Set client {client_id} routing for {venue}");
        Ok(())
    }

    /// Sets an OMS type override for the given strategy.
    pub fn register_oms_type(&mut self, strategy_id: StrategyId, oms_type: OmsType) {
        self.oms_overrides.insert(strategy_id, oms_type);
        log::info!("Set OMS type override for {strategy_id} to {oms_type}");
    }

    /// Deregisters the client with the given ID.
    ///
    /// # Errors
    ///
    /// Returns an error if no client is registered with the given ID.
    pub fn deregister_client(&mut self, client_id: ClientId) -> anyhow::Result<()> {
        if self.clients.remove(&client_id).is_some() {
            self.routing_map.retain(|_, mapped_id| mapped_id != &client_id);
            log::info!("Deregistered client {client_id}");
            Ok(())
        } else {
            anyhow::bail!("No client registered with ID {client_id}")
        }
    }

    #[must_use]
    pub fn get_client(&self, client_id: &ClientId) -> Option<Rc<dyn ExecutionClient>> {
        self.clients.get(client_id).cloned()
    }

    #[must_use]
    pub fn registered_clients(&self) -> Vec<ClientId> {
        self.clients.keys().copied().collect()
    }

    // -- COMMANDS --------------------------------------------------------------------------------

    /// Loads persistent state into the cache and restores position ID counts.
    ///
    /// # Errors
    ///
    /// Returns an error if any cache operation fails.
    pub fn load_cache(&mut self) -> anyhow::Result<()> {
        let ts = SystemTime::now();

        self.cache.borrow_mut().load_from_database()?;
        let _ = self.cache.borrow().check_integrity();
        self.set_position_id_counts();

        log::info!(
            "Loaded cache in {}ms",
            SystemTime::now()
                .duration_since(ts)
                .map_err(|e| anyhow::anyhow!("Failed to calculate duration: {e}"))?
                .as_millis()
        );
        Ok(())
    }

    /// Flushes the cache backing store.
    pub fn flush_db(&self) {
        self.cache.borrow_mut().flush_db();
    }

    /// Processes an order event, updating the domain model and republishing.
    pub fn process(&mut self, event: &OrderEventAny) {
        self.handle_event(event);
    }

    /// Processes an authoritative account state event from the venue.
    pub fn process_account_state(&mut self, state: &AccountState) {
        if self.config.debug {
            log::debug!("{RECV}{EVT} {state}");
        }

        let mut cache = self.cache.borrow_mut();
        if cache.account(&state.account_id).is_some() {
            let account = {
                let account = cache
                    .mut_account(&state.account_id)
                    .expect("Account existence already checked");
                account.apply(state.clone());
                account.clone()
            };
            if let Err(e) = cache.update_account(account) {
                log::error!("Error updating account in cache: {e}");
            }
        } else {
            let account = AccountAny::from_state(state.clone());
            if let Err(e) = cache.add_account(account) {
                log::error!("Error adding account to cache: {e}");
                return;
            }
        }
        drop(cache);

        let topic = switchboard::get_event_accounts_topic(state.account_id);
        msgbus::publish(topic, state as &dyn Any);
    }

    /// Executes a trading command by routing it to the appropriate execution
    /// client after validation.
    pub fn execute(&mut self, command: &TradingCommand) {
        if self.config.debug {
            log::debug!("{RECV}{CMD} {command}");
        }

        if self.external_clients.contains(&command.client_id()) {
            log::debug!(
                "Skipping execution command for external client {}: {command}",
                command.client_id(),
            );
            return;
        }

        let client = if let Some(client) = self
            .clients
            .get(&command.client_id())
            .or_else(|| {
                command
                    .instrument_id()
                    .and_then(|instrument_id| self.routing_map.get(&instrument_id.venue))
                    .and_then(|client_id| self.clients.get(client_id))
            })
            .or(self.default_client.as_ref())
        {
            client.clone()
        } else {
            log::error!(
                "No execution client found for command: client_id={}, command={command}",
                command.client_id(),
            );
            return;
        };

        match command {
            TradingCommand::SubmitOrder(cmd) => self.handle_submit_order(&client, cmd),
            TradingCommand::ModifyOrder(cmd) => self.handle_modify_order(&client, cmd),
            TradingCommand::CancelOrder(cmd) => self.handle_cancel_order(&client, cmd),
            TradingCommand::CancelAllOrders(cmd) => self.handle_cancel_all_orders(&client, cmd),
            TradingCommand::BatchCancelOrders(cmd) => self.handle_batch_cancel_orders(&client, cmd),
            TradingCommand::QueryOrder(cmd) => self.handle_query_order(&client, cmd),
            TradingCommand::QueryAccount(cmd) => self.handle_query_account(&client, cmd),
        }
    }

    // -- COMMAND HANDLERS ------------------------------------------------------------------------

    fn handle_submit_order(&mut self, client: &Rc<dyn ExecutionClient>, cmd: &SubmitOrder) {
        let order = &cmd.order;

        // Validate before caching: a denied order leaves no state behind
        if let Some(reason) = self.validate_submit(client, cmd) {
            self.deny_order(order, &reason);
            return;
        }

        {
            let mut cache = self.cache.borrow_mut();
            if let Err(e) = cache.add_order(order.clone(), cmd.position_id, Some(cmd.client_id), false)
            {
                log::error!("Error adding order to cache: {e}");
                return;
            }
        }

        self.lock_balance_for_order(order);

        self.inflight.insert(
            order.client_order_id(),
            InflightCommand {
                ts_sent: self.clock.borrow().timestamp_ns(),
                kind: InflightKind::Submit,
            },
        );

        if let Err(e) = client.submit_order(cmd) {
            log::error!("Error submitting order to client: {e}");
            self.inflight.remove(&order.client_order_id());
            self.deny_order_cached(order, &format!("failed-to-submit-order-to-client: {e}"));
        }
    }

    /// Validates the submit command, returning a denial reason on failure.
    fn validate_submit(
        &self,
        client: &Rc<dyn ExecutionClient>,
        cmd: &SubmitOrder,
    ) -> Option<String> {
        let order = &cmd.order;
        let instrument_id = order.instrument_id();
        let cache = self.cache.borrow();

        if cache.order_exists(&order.client_order_id()) {
            return Some("DUPLICATE_CLIENT_ORDER_ID".to_string());
        }

        let Some(instrument) = cache.instrument(&instrument_id) else {
            return Some(format!("INSTRUMENT_NOT_FOUND: {instrument_id}"));
        };

        if cache.account_for_venue(&instrument_id.venue).is_none() {
            return Some(format!("ACCOUNT_NOT_READY: {}", instrument_id.venue));
        }

        let capabilities = client.capabilities();
        if order.is_post_only() && !capabilities.supports_post_only {
            return Some("POST_ONLY_NOT_SUPPORTED".to_string());
        }
        if order.is_reduce_only() && !capabilities.supports_reduce_only {
            return Some("REDUCE_ONLY_NOT_SUPPORTED".to_string());
        }
        if order.is_quote_quantity() && !capabilities.supports_quote_quantity {
            return Some("UNSUPPORTED_QUOTE_QUANTITY".to_string());
        }
        if !capabilities.supports_time_in_force(order.time_in_force()) {
            return Some(format!(
                "UNSUPPORTED_TIME_IN_FORCE: {}",
                order.time_in_force()
            ));
        }

        if let Some(price) = order.price() {
            if price.precision != instrument.price_precision() {
                return Some(format!(
                    "PRICE_PRECISION_MISMATCH: {} vs instrument {}",
                    price.precision,
                    instrument.price_precision(),
                ));
            }
        }
        if let Some(trigger_price) = order.trigger_price() {
            if trigger_price.precision != instrument.price_precision() {
                return Some(format!(
                    "PRICE_PRECISION_MISMATCH: trigger {} vs instrument {}",
                    trigger_price.precision,
                    instrument.price_precision(),
                ));
            }
        }
        if order.quantity().precision != instrument.size_precision() {
            return Some(format!(
                "SIZE_PRECISION_MISMATCH: {} vs instrument {}",
                order.quantity().precision,
                instrument.size_precision(),
            ));
        }
        if let Some(min_quantity) = instrument.min_quantity() {
            if order.quantity() < min_quantity {
                return Some(format!(
                    "SIZE_BELOW_MIN: {} < {min_quantity}",
                    order.quantity()
                ));
            }
        }

        None
    }

    fn handle_modify_order(&mut self, client: &Rc<dyn ExecutionClient>, cmd: &ModifyOrder) {
        self.inflight.insert(
            cmd.client_order_id,
            InflightCommand {
                ts_sent: self.clock.borrow().timestamp_ns(),
                kind: InflightKind::Modify,
            },
        );
        if let Err(e) = client.modify_order(cmd) {
            log::error!("Error modifying order: {e}");
        }
    }

    fn handle_cancel_order(&mut self, client: &Rc<dyn ExecutionClient>, cmd: &CancelOrder) {
        {
            let mut cache = self.cache.borrow_mut();
            if let Some(order) = cache.order(&cmd.client_order_id).cloned() {
                cache.update_order_pending_cancel_local(&order);
            }
        }

        self.inflight.insert(
            cmd.client_order_id,
            InflightCommand {
                ts_sent: self.clock.borrow().timestamp_ns(),
                kind: InflightKind::Cancel,
            },
        );
        if let Err(e) = client.cancel_order(cmd) {
            log::error!("Error canceling order: {e}");
        }
    }

    fn handle_cancel_all_orders(&mut self, client: &Rc<dyn ExecutionClient>, cmd: &CancelAllOrders) {
        // Side-specific cancel-all on a venue without the capability is a
        // local denial: the venue is never contacted
        if cmd.order_side != OrderSide::NoOrderSide
            && !client.capabilities().supports_side_specific_cancel_all
        {
            self.reject_side_specific_cancel_all(cmd);
            return;
        }

        if let Err(e) = client.cancel_all_orders(cmd) {
            log::error!("Error canceling all orders: {e}");
        }
    }

    fn reject_side_specific_cancel_all(&self, cmd: &CancelAllOrders) {
        log::error!(
            "Cancel all orders denied for {}: side-specific cancellation not supported by venue",
            cmd.instrument_id,
        );

        let ts_now = self.clock.borrow().timestamp_ns();
        let open_orders: Vec<OrderAny> = self
            .cache
            .borrow()
            .orders_open(None, Some(&cmd.instrument_id), Some(&cmd.strategy_id))
            .into_iter()
            .filter(|order| order.order_side() == cmd.order_side)
            .cloned()
            .collect();

        for order in open_orders {
            let event = OrderCancelRejected::new(
                order.trader_id(),
                order.strategy_id(),
                order.instrument_id(),
                order.client_order_id(),
                "SIDE_SPECIFIC_CANCEL_ALL_NOT_SUPPORTED".into(),
                UUID4::new(),
                ts_now,
                ts_now,
                false,
                order.venue_order_id(),
                order.account_id(),
            );
            self.apply_and_publish(OrderEventAny::CancelRejected(event));
        }
    }

    fn handle_batch_cancel_orders(&self, client: &Rc<dyn ExecutionClient>, cmd: &BatchCancelOrders) {
        if let Err(e) = client.batch_cancel_orders(cmd) {
            log::error!("Error batch canceling orders: {e}");
        }
    }

    fn handle_query_order(&self, client: &Rc<dyn ExecutionClient>, cmd: &QueryOrder) {
        if let Err(e) = client.query_order(cmd) {
            log::error!("Error querying order: {e}");
        }
    }

    fn handle_query_account(&self, client: &Rc<dyn ExecutionClient>, cmd: &QueryAccount) {
        if let Err(e) = client.query_account(cmd) {
            log::error!("Error querying account: {e}");
        }
    }

    // -- EVENT HANDLERS --------------------------------------------------------------------------

    fn handle_event(&mut self, event: &OrderEventAny) {
        if self.config.debug {
            log::debug!("{RECV}{EVT} {event}");
        }

        let cache = self.cache.borrow();
        let mut order = if let Some(order) = cache.order(&event.client_order_id()) {
            order.clone()
        } else {
            log::warn!(
                "Order with {} not found in the cache to apply {event}",
                event.client_order_id(),
            );

            // Try to find the order by venue order ID
            let Some(venue_order_id) = event.venue_order_id() else {
                log::error!(
                    "Cannot apply event to any order: {} not found in the cache with no venue order ID",
                    event.client_order_id(),
                );
                return;
            };

            let Some(client_order_id) = cache.client_order_id(&venue_order_id).copied() else {
                log::error!(
                    "Cannot apply event to any order: {} and {venue_order_id} not found in the cache",
                    event.client_order_id(),
                );
                return;
            };

            if let Some(order) = cache.order(&client_order_id) {
                log::info!("Order with {client_order_id} was found in the cache");
                order.clone()
            } else {
                log::error!(
                    "Cannot apply event to any order: {client_order_id} and {venue_order_id} not found in the cache",
                );
                return;
            }
        };
        drop(cache);

        // Any observed event resolves the in-flight command
        self.inflight.remove(&order.client_order_id());

        match event {
            OrderEventAny::Filled(fill) => {
                let oms_type = self.determine_oms_type(fill);
                let position_id = self.determine_position_id(fill, oms_type);

                let mut fill = *fill;
                if fill.position_id.is_none() {
                    fill.position_id = Some(position_id);
                }

                self.apply_event_to_order(&mut order, OrderEventAny::Filled(fill));
                self.handle_order_fill(&order, fill, oms_type);
            }
            _ => {
                self.apply_event_to_order(&mut order, event.clone());
            }
        }
    }

    fn determine_oms_type(&self, fill: &OrderFilled) -> OmsType {
        if let Some(oms_type) = self.oms_overrides.get(&fill.strategy_id) {
            return *oms_type;
        }

        if let Some(client_id) = self.routing_map.get(&fill.instrument_id.venue) {
            if let Some(client) = self.clients.get(client_id) {
                return client.oms_type();
            }
        }

        if let Some(client) = &self.default_client {
            return client.oms_type();
        }

        OmsType::Netting
    }

    fn determine_position_id(&mut self, fill: &OrderFilled, oms_type: OmsType) -> PositionId {
        match oms_type {
            OmsType::Hedging => self.determine_hedging_position_id(fill),
            _ => Self::determine_netting_position_id(fill),
        }
    }

    fn determine_hedging_position_id(&mut self, fill: &OrderFilled) -> PositionId {
        if let Some(position_id) = fill.position_id {
            return position_id;
        }

        if let Some(position_id) = self
            .cache
            .borrow()
            .position_id(&fill.client_order_id)
            .copied()
        {
            return position_id;
        }

        let position_id = self.pos_id_generator.generate(fill.strategy_id, false);
        log::debug!("Generated {position_id} for {}", fill.client_order_id);
        position_id
    }

    fn determine_netting_position_id(fill: &OrderFilled) -> PositionId {
        PositionId::new(format!("{}-{}", fill.instrument_id, fill.strategy_id))
    }

    fn apply_event_to_order(&self, order: &mut OrderAny, event: OrderEventAny) {
        if let Err(e) = order.apply(event.clone()) {
            match e {
                // On a cancel/fill race the fill wins and the order remains
                // terminal; late events are observed but not applied
                OrderError::InvalidStateTransition => {
                    log::warn!("InvalidStateTransition: did not apply {event}");
                }
                _ => {
                    log::error!("Error applying event: {e}, did not apply {event}");
                }
            }
            return;
        }

        if let Err(e) = self.cache.borrow_mut().update_order(order) {
            log::error!("Error updating order in cache: {e}");
        }

        let topic = switchboard::get_event_orders_topic(order.strategy_id());
        msgbus::publish(topic, &event as &dyn Any);

        // An order done without filling hands back its outstanding lock
        // (fills release their share through the account update path)
        if order.is_closed() && !matches!(event, OrderEventAny::Filled(_)) {
            self.release_remaining_lock(order);
        }
    }

    fn apply_and_publish(&self, event: OrderEventAny) {
        let cache = self.cache.borrow();
        let order = cache.order(&event.client_order_id()).cloned();
        drop(cache);

        match order {
            Some(mut order) => self.apply_event_to_order(&mut order, event),
            None => {
                let topic = switchboard::get_event_orders_topic(event.strategy_id());
                msgbus::publish(topic, &event as &dyn Any);
            }
        }
    }

    fn handle_order_fill(&mut self, order: &OrderAny, fill: OrderFilled, oms_type: OmsType) {
        let instrument = {
            let cache = self.cache.borrow();
            match cache.instrument(&fill.instrument_id) {
                Some(instrument) => instrument.clone(),
                None => {
                    log::error!(
                        "Cannot handle order fill: no instrument found for {}, {fill}",
                        fill.instrument_id,
                    );
                    return;
                }
            }
        };

        if self.cache.borrow().account(&fill.account_id).is_none() {
            log::error!(
                "Cannot handle order fill: no account found for {}, {fill}",
                fill.instrument_id.venue,
            );
            return;
        }

        let position = self.handle_position_update(&instrument, fill, oms_type);

        self.update_account_on_fill(&instrument, &fill);

        // Propagate the position ID to OTO contingent orders
        if matches!(order.contingency_type(), Some(ContingencyType::Oto)) {
            if let Some(position) = position.filter(Position::is_open) {
                self.link_contingent_orders(order, position.id);
            }
        }
    }

    fn link_contingent_orders(&self, order: &OrderAny, position_id: PositionId) {
        let Some(linked_order_ids) = order.linked_order_ids() else {
            return;
        };
        for client_order_id in linked_order_ids {
            let mut cache = self.cache.borrow_mut();
            if let Some(contingent_order) = cache.mut_order(&client_order_id) {
                if contingent_order.position_id().is_none() {
                    contingent_order.set_position_id(Some(position_id));
                    let venue = contingent_order.instrument_id().venue;
                    let strategy_id = contingent_order.strategy_id();
                    if let Err(e) = cache.add_position_id(
                        &position_id,
                        &venue,
                        &client_order_id,
                        &strategy_id,
                    ) {
                        log::error!("Failed to add position ID: {e}");
                    }
                }
            } else {
                log::error!("Contingent order {client_order_id} not found");
            }
        }
    }

    /// Handles position creation or update for a fill, returning the updated
    /// position.
    fn handle_position_update(
        &mut self,
        instrument: &InstrumentAny,
        fill: OrderFilled,
        oms_type: OmsType,
    ) -> Option<Position> {
        let position_id = fill.position_id?;
        let position_opt = self.cache.borrow().position(&position_id).cloned();

        match position_opt {
            None => self.open_position(instrument, None, fill, oms_type).ok(),
            Some(position) if position.is_closed() => self
                .open_position(instrument, Some(&position), fill, oms_type)
                .ok(),
            Some(mut position) => {
                if Self::will_flip_position(&position, &fill) {
                    self.flip_position(instrument, &mut position, fill, oms_type)
                } else {
                    self.update_position(&mut position, fill);
                    Some(position)
                }
            }
        }
    }

    fn open_position(
        &mut self,
        instrument: &InstrumentAny,
        position: Option<&Position>,
        fill: OrderFilled,
        oms_type: OmsType,
    ) -> anyhow::Result<Position> {
        let position = if let Some(position) = position {
            // NETTING reopen: snapshot the completed cycle before the
            // reopening fill is applied
            self.cache.borrow_mut().snapshot_position(position)?;
            let mut position = position.clone();
            position.apply(&fill);
            self.cache.borrow_mut().update_position(&position)?;
            position
        } else {
            let position = Position::new(instrument, fill);
            self.cache
                .borrow_mut()
                .add_position(position.clone(), oms_type)?;
            position
        };

        let ts_init = self.clock.borrow().timestamp_ns();
        let event = PositionOpened::create(&position, &fill, UUID4::new(), ts_init);
        let topic = switchboard::get_event_positions_topic(event.strategy_id);
        msgbus::publish(topic, &event as &dyn Any);

        Ok(position)
    }

    fn update_position(&self, position: &mut Position, fill: OrderFilled) {
        position.apply(&fill);

        if let Err(e) = self.cache.borrow_mut().update_position(position) {
            log::error!("Failed to update position: {e:?}");
            return;
        }

        let topic = switchboard::get_event_positions_topic(position.strategy_id);
        let ts_init = self.clock.borrow().timestamp_ns();

        if position.is_closed() {
            let event = PositionClosed::create(position, &fill, UUID4::new(), ts_init);
            msgbus::publish(topic, &event as &dyn Any);
        } else {
            let event = PositionChanged::create(position, &fill, UUID4::new(), ts_init);
            msgbus::publish(topic, &event as &dyn Any);
        }
    }

    fn will_flip_position(position: &Position, fill: &OrderFilled) -> bool {
        position.is_opposite_side(fill.order_side) && fill.last_qty.raw > position.quantity.raw
    }

    /// Splits a position-flipping fill: one part closes the current position,
    /// the remainder opens the flipped position.
    fn flip_position(
        &mut self,
        instrument: &InstrumentAny,
        position: &mut Position,
        fill: OrderFilled,
        oms_type: OmsType,
    ) -> Option<Position> {
        let difference = Quantity::from_raw(
            fill.last_qty.raw - position.quantity.raw,
            position.size_precision,
        );

        // Split commission proportionally between the two fills
        let fill_percent = position.quantity.as_f64() / fill.last_qty.as_f64();
        let (commission1, commission2) = match fill.commission {
            Some(commission) => {
                let commission1 = commission * fill_percent;
                let commission2 = commission - commission1;
                (Some(commission1), Some(commission2))
            }
            None => (None, None),
        };

        if position.is_open() {
            let fill_split1 = OrderFilled {
                last_qty: position.quantity,
                commission: commission1,
                ..fill
            };
            self.update_position(position, fill_split1);
        }

        if difference.raw == 0 {
            log::warn!(
                "Zero fill size during position flip calculation (precision mismatch between instrument and fill)"
            );
            return Some(position.clone());
        }

        let position_id_flip = if oms_type == OmsType::Hedging {
            // A flipped virtual position gets its own ID under HEDGING
            match fill.position_id {
                Some(position_id) if position_id.is_virtual() => {
                    Some(self.pos_id_generator.generate(fill.strategy_id, true))
                }
                other => other,
            }
        } else {
            fill.position_id
        };

        let fill_split2 = OrderFilled {
            last_qty: difference,
            commission: commission2,
            position_id: position_id_flip,
            event_id: UUID4::new(),
            ..fill
        };

        match self.open_position(instrument, None, fill_split2, oms_type) {
            Ok(position) => Some(position),
            Err(e) => {
                log::error!("Failed to open flipped position: {e:?}");
                None
            }
        }
    }

    // -- ACCOUNT ---------------------------------------------------------------------------------

    /// Adjusts account balances for the given fill through the account's
    /// commission and PnL model, releasing the fill's share of the order's
    /// balance lock, then publishes the updated account state.
    fn update_account_on_fill(&self, instrument: &InstrumentAny, fill: &OrderFilled) {
        let release = self.take_lock_release(fill);

        let mut cache = self.cache.borrow_mut();
        let Some(account) = cache.mut_account(&fill.account_id) else {
            log::error!("No account found for {} to update", fill.account_id);
            return;
        };

        let pnls = match account.calculate_pnls(instrument, fill, None) {
            Ok(pnls) => pnls,
            Err(e) => {
                log::error!("Failed to calculate PnLs: {e}");
                return;
            }
        };

        let mut deltas: Vec<Money> = pnls;
        if let Some(commission) = fill.commission {
            deltas.push(-commission);
        }

        let mut balances = account.balances();

        if let Some(release) = release {
            if let Some(balance) = balances.get_mut(&release.currency) {
                *balance = AccountBalance::new(
                    balance.total,
                    balance.locked - release,
                    balance.free + release,
                );
            }
        }

        for delta in deltas {
            let Some(balance) = balances.get_mut(&delta.currency) else {
                log::warn!(
                    "No {} balance on account {} to apply fill delta",
                    delta.currency,
                    fill.account_id,
                );
                continue;
            };
            *balance = AccountBalance::new(
                balance.total + delta,
                balance.locked,
                balance.free + delta,
            );
        }

        let state = AccountState::new(
            fill.account_id,
            account.account_type(),
            balances.into_values().collect(),
            vec![],
            false, // System calculated rather than venue reported
            UUID4::new(),
            fill.ts_event,
            self.clock.borrow().timestamp_ns(),
            account.base_currency(),
        );

        account.apply(state.clone());
        let account = account.clone();
        if let Err(e) = cache.update_account(account) {
            log::error!("Error updating account in cache: {e}");
        }
        drop(cache);

        let topic = switchboard::get_event_accounts_topic(state.account_id);
        msgbus::publish(topic, &state as &dyn Any);
    }

    /// Locks the balance a submitted order puts at risk, recording the lock
    /// against the client order ID for later release.
    fn lock_balance_for_order(&self, order: &OrderAny) {
        let instrument_id = order.instrument_id();
        let Some(price) = order
            .price()
            .or(order.trigger_price())
            .or_else(|| self.last_px_for_lock(order))
        else {
            // A market order with no market data yet has no notional to lock
            log::debug!(
                "No price available to lock balance for {}",
                order.client_order_id(),
            );
            return;
        };

        let locked = {
            let mut cache = self.cache.borrow_mut();
            let Some(instrument) = cache.instrument(&instrument_id).cloned() else {
                return;
            };
            let Some(account_id) = cache.account_id(&instrument_id.venue).copied() else {
                return;
            };
            let Some(account) = cache.mut_account(&account_id) else {
                return;
            };
            match account.calculate_balance_locked(
                &instrument,
                order.order_side(),
                order.quantity(),
                price,
                None,
            ) {
                Ok(locked) => locked,
                Err(e) => {
                    log::error!("Failed to calculate balance locked: {e}");
                    return;
                }
            }
        };

        let ts_now = self.clock.borrow().timestamp_ns();
        if self.apply_lock_delta(instrument_id.venue, locked, false, ts_now) {
            self.balances_locked.borrow_mut().insert(
                order.client_order_id(),
                BalanceLock {
                    original: locked,
                    remaining: locked,
                    quantity: order.quantity(),
                    quantity_left: order.quantity(),
                },
            );
        }
    }

    fn last_px_for_lock(&self, order: &OrderAny) -> Option<Price> {
        let cache = self.cache.borrow();
        if let Some(trade) = cache.trade(&order.instrument_id()) {
            return Some(trade.price);
        }
        cache
            .quote(&order.instrument_id())
            .map(|quote| match order.order_side() {
                OrderSide::Buy => quote.ask_price,
                _ => quote.bid_price,
            })
    }

    /// Takes the fill's proportional share of the order's outstanding lock.
    ///
    /// The final fill releases whatever remains, so rounding from partial
    /// releases cannot strand a residual lock.
    fn take_lock_release(&self, fill: &OrderFilled) -> Option<Money> {
        let mut locks = self.balances_locked.borrow_mut();
        let lock = locks.get_mut(&fill.client_order_id)?;

        let release = if fill.last_qty >= lock.quantity_left {
            lock.remaining
        } else {
            let fraction = fill.last_qty.as_f64() / lock.quantity.as_f64();
            let release = lock.original * fraction;
            if release > lock.remaining {
                lock.remaining
            } else {
                release
            }
        };

        lock.quantity_left = lock.quantity_left.saturating_sub(fill.last_qty);
        lock.remaining -= release;

        if lock.remaining.is_zero() {
            locks.remove(&fill.client_order_id);
        }
        Some(release)
    }

    /// Hands back the outstanding lock for an order done without filling.
    fn release_remaining_lock(&self, order: &OrderAny) {
        let Some(lock) = self
            .balances_locked
            .borrow_mut()
            .remove(&order.client_order_id())
        else {
            return;
        };
        if lock.remaining.is_zero() {
            return;
        }

        let ts_now = self.clock.borrow().timestamp_ns();
        let _ = self.apply_lock_delta(
            order.instrument_id().venue,
            lock.remaining,
            true,
            ts_now,
        );
    }

    /// Moves `amount` between the free and locked portions of the venue
    /// account's balance, publishing the updated account state.
    ///
    /// Returns whether the adjustment applied (the account holds a balance in
    /// the lock currency).
    fn apply_lock_delta(&self, venue: Venue, amount: Money, release: bool, ts_event: UnixNanos) -> bool {
        if amount.is_zero() {
            return false;
        }

        let mut cache = self.cache.borrow_mut();
        let Some(account_id) = cache.account_id(&venue).copied() else {
            log::error!("No account registered for {venue} to adjust lock");
            return false;
        };
        let Some(account) = cache.mut_account(&account_id) else {
            return false;
        };

        let mut balances = account.balances();
        let Some(balance) = balances.get_mut(&amount.currency) else {
            log::warn!(
                "No {} balance on account {account_id} to adjust lock",
                amount.currency,
            );
            return false;
        };

        *balance = if release {
            AccountBalance::new(balance.total, balance.locked - amount, balance.free + amount)
        } else {
            AccountBalance::new(balance.total, balance.locked + amount, balance.free - amount)
        };

        let state = AccountState::new(
            account_id,
            account.account_type(),
            balances.into_values().collect(),
            vec![],
            false, // System calculated rather than venue reported
            UUID4::new(),
            ts_event,
            self.clock.borrow().timestamp_ns(),
            account.base_currency(),
        );

        account.apply(state.clone());
        let account = account.clone();
        if let Err(e) = cache.update_account(account) {
            log::error!("Error updating account in cache: {e}");
        }
        drop(cache);

        let topic = switchboard::get_event_accounts_topic(state.account_id);
        msgbus::publish(topic, &state as &dyn Any);
        true
    }

    // -- INTERNAL --------------------------------------------------------------------------------

    fn set_position_id_counts(&mut self) {
        let cache = self.cache.borrow();
        let positions = cache.positions(None, None);

        let mut counts: AHashMap<StrategyId, usize> = AHashMap::new();
        for position in positions {
            *counts.entry(position.strategy_id).or_insert(0) += 1;
        }
        drop(cache);

        self.pos_id_generator.reset();
        for (strategy_id, count) in counts {
            self.pos_id_generator.set_count(count, strategy_id);
            log::info!("Set position ID count for {strategy_id} to {count}");
        }
    }

    /// Denies the given order before it reaches the cache or the venue.
    ///
    /// Per the denial contract no order state remains in the cache; the
    /// denial event alone is published for the strategy.
    fn deny_order(&self, order: &OrderAny, reason: &str) {
        log::error!(
            "Order denied: {reason}, client_order_id={}",
            order.client_order_id(),
        );

        let ts_now = self.clock.borrow().timestamp_ns();
        let denied = OrderDenied::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            reason.into(),
            UUID4::new(),
            ts_now,
            ts_now,
        );

        let topic = switchboard::get_event_orders_topic(order.strategy_id());
        msgbus::publish(topic, &OrderEventAny::Denied(denied) as &dyn Any);
    }

    /// Denies an order which was already cached (submit-to-client failure).
    fn deny_order_cached(&self, order: &OrderAny, reason: &str) {
        log::error!(
            "Order denied: {reason}, client_order_id={}",
            order.client_order_id(),
        );

        let ts_now = self.clock.borrow().timestamp_ns();
        let denied = OrderDenied::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            reason.into(),
            UUID4::new(),
            ts_now,
            ts_now,
        );

        let mut order = order.clone();
        self.apply_event_to_order(&mut order, OrderEventAny::Denied(denied));
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod stubs;
#[cfg(test)]
mod tests;
