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

//! The live execution engine orchestration layer.
//!
//! Coordinates between the core execution engine and venue clients: all
//! domain mutation happens on the single engine loop, with commands and
//! events arriving over thread-safe inbound queues. Periodic sweeps drive
//! in-flight order checking and cache purging; startup reconciliation gates
//! trading until local state converges to venue-of-record state.

use std::{cell::RefCell, fmt::Debug, rc::Rc};

use helm_common::{
    cache::Cache,
    clock::Clock,
    logging::{CMD, EVT, RECV},
    messages::{ExecutionEvent, ExecutionReport, TradingCommand, execution::QueryOrder},
};
use helm_core::{UUID4, UnixNanos, datetime::secs_to_nanos};
use helm_execution::engine::ExecutionEngine;
use helm_model::{
    events::OrderEventAny,
    identifiers::ClientOrderId,
    orders::OrderAny,
    reports::ExecutionMassStatus,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::{
    config::LiveExecEngineConfig,
    reconciliation::{ReconciliationConfig, ReconciliationManager},
};

/// Live execution engine managing execution state and reconciliation.
///
/// Orchestrates:
/// - Startup reconciliation with all venues (idempotence verified by a
///   second diff pass; residual divergence escalates).
/// - Continuous in-flight order checking and resolution.
/// - Cache purge scheduling for closed orders, closed positions, and
///   account events.
/// - Message routing between venue clients and the core execution engine.
pub struct LiveExecutionEngine {
    clock: Rc<RefCell<dyn Clock>>,
    cache: Rc<RefCell<Cache>>,
    engine: Rc<RefCell<ExecutionEngine>>,
    reconciliation: ReconciliationManager,
    config: LiveExecEngineConfig,
    cmd_tx: UnboundedSender<TradingCommand>,
    cmd_rx: Option<UnboundedReceiver<TradingCommand>>,
    evt_tx: UnboundedSender<ExecutionEvent>,
    evt_rx: Option<UnboundedReceiver<ExecutionEvent>>,
    ts_last_inflight_check: UnixNanos,
    ts_last_open_check: UnixNanos,
    ts_last_orders_purge: UnixNanos,
    ts_last_positions_purge: UnixNanos,
    ts_last_account_purge: UnixNanos,
    open_check_pending: bool,
    is_running: bool,
}

impl Debug for LiveExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(LiveExecutionEngine))
            .field("config", &self.config)
            .field("is_running", &self.is_running)
            .finish()
    }
}

impl LiveExecutionEngine {
    /// Creates a new [`LiveExecutionEngine`] instance.
    pub fn new(
        clock: Rc<RefCell<dyn Clock>>,
        cache: Rc<RefCell<Cache>>,
        engine: Rc<RefCell<ExecutionEngine>>,
        config: LiveExecEngineConfig,
    ) -> Self {
        let reconciliation_config = ReconciliationConfig {
            lookback_mins: config.reconciliation_lookback_mins,
            inflight_threshold_ms: config.inflight_check_threshold_ms,
            inflight_max_retries: config.inflight_check_retries,
            filter_unclaimed_external: config.filter_unclaimed_external_orders,
            generate_missing_orders: config.generate_missing_orders,
            filtered_client_order_ids: Default::default(),
            open_check_open_only: config.open_check_open_only,
            filter_position_reports: config.filter_position_reports,
            reconciliation_instrument_ids: config
                .reconciliation_instrument_ids
                .iter()
                .map(|value| value.as_str().into())
                .collect(),
        };

        let reconciliation =
            ReconciliationManager::new(clock.clone(), cache.clone(), reconciliation_config);

        let (cmd_tx, cmd_rx) = unbounded_channel();
        let (evt_tx, evt_rx) = unbounded_channel();

        Self {
            clock,
            cache,
            engine,
            reconciliation,
            config,
            cmd_tx,
            cmd_rx: Some(cmd_rx),
            evt_tx,
            evt_rx: Some(evt_rx),
            ts_last_inflight_check: UnixNanos::default(),
            ts_last_open_check: UnixNanos::default(),
            ts_last_orders_purge: UnixNanos::default(),
            ts_last_positions_purge: UnixNanos::default(),
            ts_last_account_purge: UnixNanos::default(),
            open_check_pending: false,
            is_running: false,
        }
    }

    /// Returns a thread-safe sender for trading commands.
    #[must_use]
    pub fn command_sender(&self) -> UnboundedSender<TradingCommand> {
        self.cmd_tx.clone()
    }

    /// Returns a thread-safe sender for execution events.
    #[must_use]
    pub fn event_sender(&self) -> UnboundedSender<ExecutionEvent> {
        self.evt_tx.clone()
    }

    /// Returns whether the engine is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.is_running
    }

    /// Returns a mutable reference to the reconciliation manager.
    pub fn reconciliation_mut(&mut self) -> &mut ReconciliationManager {
        &mut self.reconciliation
    }

    /// Returns a handle to the cache.
    #[must_use]
    pub fn cache(&self) -> Rc<RefCell<Cache>> {
        self.cache.clone()
    }

    /// Starts the engine.
    pub fn start(&mut self) {
        if self.is_running {
            return;
        }
        log::info!("Starting {}", stringify!(LiveExecutionEngine));
        self.is_running = true;
    }

    /// Stops the engine.
    pub fn stop(&mut self) {
        if !self.is_running {
            return;
        }
        log::info!("Stopping {}", stringify!(LiveExecutionEngine));
        self.is_running = false;
    }

    /// Executes the given trading command, registering submits for in-flight
    /// tracking.
    pub fn execute(&mut self, command: &TradingCommand) {
        log::debug!("{RECV}{CMD} {command}");

        if let TradingCommand::SubmitOrder(cmd) = command {
            self.reconciliation.register_inflight(cmd.client_order_id);
        }
        self.engine.borrow_mut().execute(command);
    }

    /// Processes an inbound execution event from a venue client.
    pub fn process(&mut self, event: &ExecutionEvent) {
        log::debug!("{RECV}{EVT} {event}");

        match event {
            ExecutionEvent::Order(event) => {
                let mut ts_event = event.ts_event();
                if ts_event.is_zero() {
                    ts_event = self.clock.borrow().timestamp_ns();
                }
                self.reconciliation
                    .record_local_activity(event.client_order_id(), ts_event);
                self.engine.borrow_mut().process(event);
            }
            ExecutionEvent::Report(report) => self.process_report(report),
        }
    }

    fn process_report(&mut self, report: &ExecutionReport) {
        match report {
            ExecutionReport::OrderStatus(report) => {
                let events = self.reconciliation.reconcile_report(report);
                self.apply_reconciliation_events(events);
            }
            ExecutionReport::Fill(report) => {
                if let Some(event) = self.reconciliation.reconcile_fill(report) {
                    self.apply_reconciliation_events(vec![event]);
                }
            }
            ExecutionReport::Position(report) => {
                log::debug!("Received position status report: {report:?}");
            }
            ExecutionReport::Mass(mass_status) => {
                if let Err(e) = self.reconcile_execution_mass_status(mass_status) {
                    log::error!("Reconciliation failed: {e}");
                }
            }
        }
    }

    /// Reconciles the given mass status, applying synthesized events.
    ///
    /// # Errors
    ///
    /// Returns an error if discrepancies remain which events cannot close.
    pub fn reconcile_execution_mass_status(
        &mut self,
        mass_status: &ExecutionMassStatus,
    ) -> anyhow::Result<()> {
        log::info!(
            "Reconciling mass status for {}: {} order report(s), {} fill report(s)",
            mass_status.venue,
            mass_status.order_reports().len(),
            mass_status.fill_reports().len(),
        );

        let result = self.reconciliation.reconcile_execution_mass_status(mass_status);
        if !result.discrepancies.is_empty() {
            anyhow::bail!(
                "Reconciliation discrepancies: {}",
                result.discrepancies.join("; "),
            );
        }

        self.apply_reconciliation_events(result.events);
        Ok(())
    }

    /// Runs startup reconciliation over the given mass statuses.
    ///
    /// After applying the first diff's events, the diff is run once more: a
    /// quiescent venue must then synthesize zero events, otherwise the
    /// divergence escalates as an error with the diff attached.
    ///
    /// # Errors
    ///
    /// Returns an error if state remains divergent after the second pass.
    pub fn reconcile_execution_state(
        &mut self,
        mass_statuses: &[ExecutionMassStatus],
    ) -> anyhow::Result<()> {
        for mass_status in mass_statuses {
            self.reconcile_execution_mass_status(mass_status)?;
        }

        // Idempotence check: re-run the diff once
        for mass_status in mass_statuses {
            let result = self.reconciliation.reconcile_execution_mass_status(mass_status);
            if !result.is_converged() {
                anyhow::bail!(
                    "Reconciliation failed to converge for {}: {} residual event(s), discrepancies: [{}]",
                    mass_status.venue,
                    result.events.len(),
                    result.discrepancies.join("; "),
                );
            }
        }

        log::info!("Reconciliation converged");
        Ok(())
    }

    fn apply_reconciliation_events(&mut self, events: Vec<OrderEventAny>) {
        for event in events {
            match event {
                OrderEventAny::Initialized(init) => {
                    // Adopting an external order: seed it into the cache
                    let order = OrderAny::from_init(init);
                    let client_order_id = order.client_order_id();
                    if let Err(e) =
                        self.cache.borrow_mut().add_order(order, None, None, false)
                    {
                        log::error!("Error adding external order {client_order_id}: {e}");
                    }
                }
                event => self.engine.borrow_mut().process(&event),
            }
        }
    }

    /// Takes the inbound queue receivers for an external runner to drive.
    ///
    /// # Panics
    ///
    /// Panics if the receivers were already taken.
    pub fn take_channels(
        &mut self,
    ) -> (
        UnboundedReceiver<TradingCommand>,
        UnboundedReceiver<ExecutionEvent>,
    ) {
        (
            self.cmd_rx.take().expect("Command receiver already taken"),
            self.evt_rx.take().expect("Event receiver already taken"),
        )
    }

    /// Drains all queued commands and events onto the engine loop.
    ///
    /// Returns the number of messages processed.
    pub fn drain(&mut self) -> usize {
        let mut processed = 0;

        let mut cmd_rx = self.cmd_rx.take();
        if let Some(rx) = cmd_rx.as_mut() {
            while let Ok(command) = rx.try_recv() {
                self.execute(&command);
                processed += 1;
            }
        }
        self.cmd_rx = cmd_rx;

        let mut evt_rx = self.evt_rx.take();
        if let Some(rx) = evt_rx.as_mut() {
            while let Ok(event) = rx.try_recv() {
                self.process(&event);
                processed += 1;
            }
        }
        self.evt_rx = evt_rx;

        processed
    }

    /// Runs due periodic work: in-flight sweeps, open-order check
    /// scheduling, and cache purges.
    pub fn sweep(&mut self) {
        let ts_now = self.clock.borrow().timestamp_ns();

        self.check_inflight(ts_now);
        self.schedule_open_check(ts_now);
        self.run_purges(ts_now);
    }

    fn schedule_open_check(&mut self, ts_now: UnixNanos) {
        let Some(interval_secs) = self.config.open_check_interval_secs else {
            return;
        };
        let interval_ns = secs_to_nanos(interval_secs as f64);
        if interval_ns == 0 || ts_now.as_u64() - self.ts_last_open_check.as_u64() < interval_ns {
            return;
        }
        self.ts_last_open_check = ts_now;
        self.open_check_pending = true;
    }

    /// Takes the pending open-order check request, if one is due.
    ///
    /// The node drives the venue queries: it requests order status reports
    /// (open-only per configuration) from each execution client and feeds
    /// them back as reports for reconciliation.
    pub fn take_open_check_request(&mut self) -> bool {
        std::mem::take(&mut self.open_check_pending)
    }

    /// Returns whether open-order checks request only venue-open orders.
    #[must_use]
    pub const fn open_check_open_only(&self) -> bool {
        self.config.open_check_open_only
    }

    fn check_inflight(&mut self, ts_now: UnixNanos) {
        let interval_ns = self.config.inflight_check_interval_ms * 1_000_000;
        if interval_ns == 0
            || ts_now.as_u64() - self.ts_last_inflight_check.as_u64() < interval_ns
        {
            return;
        }
        self.ts_last_inflight_check = ts_now;

        let (events, to_query) = self.reconciliation.check_inflight_orders();
        self.apply_reconciliation_events(events);

        for client_order_id in to_query {
            self.query_order_with_venue(client_order_id, ts_now);
        }
    }

    fn query_order_with_venue(&mut self, client_order_id: ClientOrderId, ts_now: UnixNanos) {
        let cache = self.cache.borrow();
        let Some(order) = cache.order(&client_order_id) else {
            log::warn!("Cannot query {client_order_id}: not found in cache");
            return;
        };
        let Some(client_id) = cache.client_id(&client_order_id).copied() else {
            log::warn!("Cannot query {client_order_id}: no client ID indexed");
            return;
        };

        let command = TradingCommand::QueryOrder(QueryOrder::new(
            order.trader_id(),
            client_id,
            order.strategy_id(),
            order.instrument_id(),
            client_order_id,
            order.venue_order_id(),
            UUID4::new(),
            ts_now,
        ));
        drop(cache);

        log::info!("Promoting in-flight {client_order_id} to venue query");
        self.engine.borrow_mut().execute(&command);
    }

    fn run_purges(&mut self, ts_now: UnixNanos) {
        if let Some(interval_mins) = self.config.purge_closed_orders_interval_mins {
            let interval_ns = secs_to_nanos((interval_mins * 60) as f64);
            if interval_ns > 0 && ts_now.as_u64() - self.ts_last_orders_purge.as_u64() >= interval_ns
            {
                self.ts_last_orders_purge = ts_now;
                let buffer_secs = self.config.purge_closed_orders_buffer_mins * 60;
                self.cache
                    .borrow_mut()
                    .purge_closed_orders(ts_now, buffer_secs);
            }
        }

        if let Some(interval_mins) = self.config.purge_closed_positions_interval_mins {
            let interval_ns = secs_to_nanos((interval_mins * 60) as f64);
            if interval_ns > 0
                && ts_now.as_u64() - self.ts_last_positions_purge.as_u64() >= interval_ns
            {
                self.ts_last_positions_purge = ts_now;
                let buffer_secs = self.config.purge_closed_positions_buffer_mins * 60;
                self.cache
                    .borrow_mut()
                    .purge_closed_positions(ts_now, buffer_secs);
            }
        }

        if let Some(interval_mins) = self.config.purge_account_events_interval_mins {
            let interval_ns = secs_to_nanos((interval_mins * 60) as f64);
            if interval_ns > 0
                && ts_now.as_u64() - self.ts_last_account_purge.as_u64() >= interval_ns
            {
                self.ts_last_account_purge = ts_now;
                let lookback_secs = self.config.purge_account_events_lookback_mins * 60;
                self.cache
                    .borrow_mut()
                    .purge_account_events(ts_now, lookback_secs);
            }
        }
    }

    /// Shuts the engine down gracefully: flushes the cache backing store and
    /// logs residual state.
    pub fn shutdown(&mut self, reason: &str) {
        log::info!("Shutting down: {reason}");
        self.stop();

        let residuals = self.engine.borrow().check_residuals();
        if residuals {
            log::warn!("Residual open state at shutdown");
        }
        self.engine.borrow().flush_db();
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use helm_common::clock::TestClock;
    use helm_model::{
        enums::{OrderStatus, TimeInForce},
        identifiers::{AccountId, ClientId, InstrumentId, Venue, VenueOrderId},
        instruments::{InstrumentAny, stubs::audusd_sim},
        reports::OrderStatusReport,
        types::{Price, Quantity},
    };
    use rstest::rstest;

    use super::*;

    fn harness() -> LiveExecutionEngine {
        let clock = Rc::new(RefCell::new(TestClock::new()));
        let cache = Rc::new(RefCell::new(Cache::default()));
        cache
            .borrow_mut()
            .add_instrument(InstrumentAny::CurrencyPair(audusd_sim()))
            .unwrap();
        let engine = Rc::new(RefCell::new(ExecutionEngine::new(
            clock.clone(),
            cache.clone(),
            None,
        )));
        LiveExecutionEngine::new(clock, cache, engine, LiveExecEngineConfig::default())
    }

    fn external_report(venue_order_id: &str) -> OrderStatusReport {
        OrderStatusReport::new(
            AccountId::from("SIM-001"),
            InstrumentId::from("AUD/USD.SIM"),
            None,
            VenueOrderId::from(venue_order_id),
            helm_model::enums::OrderSide::Buy,
            helm_model::enums::OrderType::Limit,
            TimeInForce::Gtc,
            OrderStatus::Accepted,
            Quantity::from(100_000_u64),
            Quantity::from(0_u64),
            UnixNanos::from(10),
            UnixNanos::from(10),
            UnixNanos::from(10),
            None,
        )
        .with_price(Price::from("1.00000"))
    }

    #[rstest]
    fn test_start_stop() {
        let mut engine = harness();
        assert!(!engine.is_running());
        engine.start();
        assert!(engine.is_running());
        engine.stop();
        assert!(!engine.is_running());
    }

    #[rstest]
    fn test_startup_reconciliation_adopts_external_order_and_converges() {
        let mut live = harness();

        let mut mass_status = ExecutionMassStatus::new(
            ClientId::from("SIM"),
            AccountId::from("SIM-001"),
            Venue::from("SIM"),
            UnixNanos::from(100),
            None,
        );
        mass_status.add_order_reports(vec![external_report("V-EXT")]);

        live.reconcile_execution_state(&[mass_status]).unwrap();

        // The external order was adopted into the cache in ACCEPTED status
        let cache = live.cache.borrow();
        let orders = cache.orders(None, None, None);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status(), OrderStatus::Accepted);
        assert_eq!(
            orders[0].venue_order_id(),
            Some(VenueOrderId::from("V-EXT"))
        );
        assert!(orders[0].strategy_id().is_external());
    }

    #[rstest]
    fn test_queue_senders_feed_drain() {
        let mut live = harness();

        let evt_tx = live.event_sender();
        evt_tx
            .send(ExecutionEvent::Report(ExecutionReport::OrderStatus(
                Box::new(external_report("V-1")),
            )))
            .unwrap();

        let processed = live.drain();
        assert_eq!(processed, 1);
        assert_eq!(live.cache.borrow().orders(None, None, None).len(), 1);
    }

    #[rstest]
    fn test_sweep_respects_intervals() {
        let mut live = harness();
        // No panics with default config and epoch clock
        live.sweep();
        live.sweep();
    }
}
