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

//! The live node process wrapper.
//!
//! Builds the clock, cache, message bus and engines from configuration,
//! manages client connection lifecycle (connect data before exec, disconnect
//! exec before data), gates trading behind startup reconciliation, and maps
//! run outcomes to process exit codes.

use std::{cell::RefCell, rc::Rc, time::Duration};

use helm_common::{
    cache::Cache,
    clock::{Clock, LiveClock},
    logging::init_logging,
    messages::execution::CancelAllOrders,
    messages::TradingCommand,
    msgbus::{self, MessageBus},
};
use helm_core::UUID4;
use helm_data::DataClient;
use helm_execution::{client::LiveExecutionClient, engine::ExecutionEngine};
use helm_model::{
    enums::OrderSide,
    identifiers::ClientId,
    reports::ExecutionMassStatus,
};

use crate::{config::LiveNodeConfig, execution::LiveExecutionEngine};

/// Process exit code for a clean run.
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit code for an unhandled error.
pub const EXIT_FAILURE: i32 = 1;
/// Process exit code for invalid configuration.
pub const EXIT_INVALID_CONFIG: i32 = 2;
/// Process exit code for failed reconciliation.
pub const EXIT_RECONCILIATION_FAILED: i32 = 3;
/// Process exit code when interrupted by SIGINT.
pub const EXIT_SIGINT: i32 = 130;

/// The terminal outcome of a node run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeOutcome {
    /// The node ran and stopped cleanly.
    Completed,
    /// The configuration failed validation.
    InvalidConfig(String),
    /// Startup reconciliation failed to converge.
    ReconciliationFailed(String),
    /// An unhandled error stopped the node.
    UnhandledError(String),
    /// The node was interrupted by SIGINT.
    Interrupted,
}

impl NodeOutcome {
    /// Returns the process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Completed => EXIT_SUCCESS,
            Self::UnhandledError(_) => EXIT_FAILURE,
            Self::InvalidConfig(_) => EXIT_INVALID_CONFIG,
            Self::ReconciliationFailed(_) => EXIT_RECONCILIATION_FAILED,
            Self::Interrupted => EXIT_SIGINT,
        }
    }
}

/// A live Helm system node.
pub struct LiveNode {
    config: LiveNodeConfig,
    clock: Rc<RefCell<LiveClock>>,
    cache: Rc<RefCell<Cache>>,
    engine: Rc<RefCell<ExecutionEngine>>,
    live_engine: LiveExecutionEngine,
    exec_clients: Vec<Rc<RefCell<dyn LiveExecutionClient>>>,
    data_clients: Vec<Rc<RefCell<dyn DataClient>>>,
}

impl std::fmt::Debug for LiveNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(LiveNode))
            .field("trader_id", &self.config.trader_id)
            .field("exec_clients", &self.exec_clients.len())
            .field("data_clients", &self.data_clients.len())
            .finish()
    }
}

impl LiveNode {
    /// Builds a new [`LiveNode`] from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation (the caller
    /// should exit with [`EXIT_INVALID_CONFIG`]).
    pub fn build(config: LiveNodeConfig) -> anyhow::Result<Self> {
        config.validate()?;

        init_logging(config.logging.clone())?;

        msgbus::set_message_bus(Rc::new(RefCell::new(MessageBus::new(
            config.trader_id,
            None,
        ))));

        let clock = Rc::new(RefCell::new(LiveClock::default()));
        let cache = Rc::new(RefCell::new(Cache::new(config.cache.clone(), None)));
        let engine = Rc::new(RefCell::new(ExecutionEngine::new(
            clock.clone(),
            cache.clone(),
            None,
        )));
        let live_engine = LiveExecutionEngine::new(
            clock.clone(),
            cache.clone(),
            engine.clone(),
            config.exec_engine.clone(),
        );

        log::info!("Built node for trader {}", config.trader_id);

        Ok(Self {
            config,
            clock,
            cache,
            engine,
            live_engine,
            exec_clients: Vec::new(),
            data_clients: Vec::new(),
        })
    }

    /// Returns the node's cache handle.
    #[must_use]
    pub fn cache(&self) -> Rc<RefCell<Cache>> {
        self.cache.clone()
    }

    /// Returns the node's core execution engine handle.
    #[must_use]
    pub fn engine(&self) -> Rc<RefCell<ExecutionEngine>> {
        self.engine.clone()
    }

    /// Returns a mutable reference to the live execution engine.
    pub fn live_engine_mut(&mut self) -> &mut LiveExecutionEngine {
        &mut self.live_engine
    }

    /// Adds a live execution client, registering it with the core engine.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub fn add_exec_client(
        &mut self,
        client: Rc<RefCell<dyn LiveExecutionClient>>,
        engine_client: Rc<dyn helm_execution::client::ExecutionClient>,
    ) -> anyhow::Result<()> {
        self.engine.borrow_mut().register_client(engine_client)?;
        self.exec_clients.push(client);
        Ok(())
    }

    /// Adds a live data client.
    pub fn add_data_client(&mut self, client: Rc<RefCell<dyn DataClient>>) {
        self.data_clients.push(client);
    }

    /// Connects all clients: data first, then execution.
    ///
    /// # Errors
    ///
    /// Returns an error if any client fails to connect within
    /// `timeout_connection`.
    #[allow(clippy::await_holding_refcell_ref)] // Single-threaded loop
    pub async fn connect_all(&mut self) -> anyhow::Result<()> {
        let timeout = Duration::from_secs(self.config.timeout_connection);

        for client in &self.data_clients {
            tokio::time::timeout(timeout, client.borrow_mut().connect())
                .await
                .map_err(|_| anyhow::anyhow!("Data client connect timed out"))??;
        }
        for client in &self.exec_clients {
            tokio::time::timeout(timeout, client.borrow_mut().connect())
                .await
                .map_err(|_| anyhow::anyhow!("Execution client connect timed out"))??;
        }

        log::info!("All clients connected");
        Ok(())
    }

    /// Disconnects all clients in order `exec -> data`.
    ///
    /// A client exceeding `timeout_disconnection` is forcibly abandoned.
    #[allow(clippy::await_holding_refcell_ref)] // Single-threaded loop
    pub async fn disconnect_all(&mut self) {
        let timeout = Duration::from_secs(self.config.timeout_disconnection);

        for client in &self.exec_clients {
            let result = tokio::time::timeout(timeout, client.borrow_mut().disconnect()).await;
            match result {
                Ok(Err(e)) => log::error!("Execution client disconnect failed: {e}"),
                Err(_) => log::error!("Execution client disconnect timed out (aborting)"),
                _ => {}
            }
        }
        for client in &self.data_clients {
            let result = tokio::time::timeout(timeout, client.borrow_mut().disconnect()).await;
            match result {
                Ok(Err(e)) => log::error!("Data client disconnect failed: {e}"),
                Err(_) => log::error!("Data client disconnect timed out (aborting)"),
                _ => {}
            }
        }

        log::info!("All clients disconnected");
    }

    /// Runs startup reconciliation against every execution client.
    ///
    /// # Errors
    ///
    /// Returns an error if report generation times out or state fails to
    /// converge (the caller should exit with [`EXIT_RECONCILIATION_FAILED`]).
    #[allow(clippy::await_holding_refcell_ref)] // Single-threaded loop
    pub async fn reconcile_startup(&mut self) -> anyhow::Result<()> {
        if !self.config.exec_engine.reconciliation {
            log::info!("Reconciliation disabled");
            return Ok(());
        }

        let timeout = Duration::from_secs(self.config.timeout_reconciliation);
        let lookback_mins = self.config.exec_engine.reconciliation_lookback_mins;

        let mut mass_statuses: Vec<ExecutionMassStatus> = Vec::new();
        for client in &self.exec_clients {
            let mass_status = tokio::time::timeout(
                timeout,
                client.borrow().generate_mass_status(lookback_mins),
            )
            .await
            .map_err(|_| anyhow::anyhow!("Mass status generation timed out"))??;

            if let Some(mass_status) = mass_status {
                mass_statuses.push(mass_status);
            }
        }

        self.live_engine.reconcile_execution_state(&mass_statuses)
    }

    /// Cancels all open orders across every venue (graceful shutdown path).
    pub fn cancel_all_open_orders(&mut self, _reason: &str) {
        let open_instruments: Vec<_> = {
            let cache = self.cache.borrow();
            cache
                .orders_open(None, None, None)
                .iter()
                .map(|order| (order.trader_id(), order.strategy_id(), order.instrument_id()))
                .collect()
        };

        let ts_now = self.clock.borrow().timestamp_ns();
        for (trader_id, strategy_id, instrument_id) in open_instruments {
            let command = TradingCommand::CancelAllOrders(CancelAllOrders::new(
                trader_id,
                ClientId::new(instrument_id.venue.as_str()),
                strategy_id,
                instrument_id,
                OrderSide::NoOrderSide,
                UUID4::new(),
                ts_now,
            ));
            self.live_engine.execute(&command);
        }
    }

    /// Runs the node until SIGINT or an unhandled error, returning the
    /// terminal outcome.
    pub async fn run(mut self) -> NodeOutcome {
        if let Err(e) = self.connect_all().await {
            log::error!("Connection failed: {e}");
            self.disconnect_all().await;
            return NodeOutcome::UnhandledError(e.to_string());
        }

        if let Err(e) = self.reconcile_startup().await {
            log::error!("Startup reconciliation failed: {e}");
            self.graceful_shutdown("reconciliation failed").await;
            return NodeOutcome::ReconciliationFailed(e.to_string());
        }

        self.live_engine.start();
        log::info!("Node running (ctrl-c to stop)");

        let outcome = tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => NodeOutcome::Interrupted,
                Err(e) => NodeOutcome::UnhandledError(e.to_string()),
            },
            () = self.run_loop() => NodeOutcome::Completed,
        };

        self.graceful_shutdown("node stopping").await;
        outcome
    }

    async fn run_loop(&mut self) {
        let sweep_interval =
            Duration::from_millis(self.config.exec_engine.inflight_check_interval_ms.max(100));
        let mut sweep = tokio::time::interval(sweep_interval);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // Runs until the node is interrupted (select in `run` races ctrl-c)
        loop {
            sweep.tick().await;
            self.live_engine.drain();
            self.live_engine.sweep();

            if self.live_engine.take_open_check_request() {
                self.run_open_check().await;
            }
        }
    }

    /// Polls each execution client for order status reports (open-only per
    /// configuration) and feeds them back for reconciliation.
    #[allow(clippy::await_holding_refcell_ref)] // Single-threaded loop
    async fn run_open_check(&mut self) {
        let open_only = self.live_engine.open_check_open_only();
        let lookback_mins = self.config.exec_engine.reconciliation_lookback_mins;
        let ts_now = self.clock.borrow().timestamp_ns();

        let command = helm_common::messages::execution::GenerateOrderStatusReports::new(
            None,
            open_only,
            lookback_mins,
            UUID4::new(),
            ts_now,
        );

        let clients = self.exec_clients.clone();
        for client in clients {
            let reports = match client.borrow().generate_order_status_reports(&command).await {
                Ok(reports) => reports,
                Err(e) => {
                    log::error!("Open-order check failed: {e}");
                    continue;
                }
            };

            for report in reports {
                self.live_engine.process(&helm_common::messages::ExecutionEvent::Report(
                    helm_common::messages::ExecutionReport::OrderStatus(Box::new(report)),
                ));
            }
        }
    }

    /// Shuts the node down gracefully: cancel open orders, await residual
    /// events to `timeout_shutdown`, disconnect clients exec -> data, and
    /// flush the cache backing store.
    pub async fn graceful_shutdown(&mut self, reason: &str) {
        log::info!("Graceful shutdown: {reason}");

        self.cancel_all_open_orders(reason);

        // Await residual terminal events up to the shutdown timeout
        let deadline = Duration::from_secs(self.config.timeout_shutdown);
        let _ = tokio::time::timeout(deadline, async {
            loop {
                self.live_engine.drain();
                if self.cache.borrow().orders_open_count() == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await;

        self.disconnect_all().await;
        self.live_engine.shutdown(reason);
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::LiveVenueConfig;

    #[rstest]
    fn test_exit_code_mapping() {
        assert_eq!(NodeOutcome::Completed.exit_code(), 0);
        assert_eq!(
            NodeOutcome::UnhandledError("boom".to_string()).exit_code(),
            1
        );
        assert_eq!(
            NodeOutcome::InvalidConfig("bad".to_string()).exit_code(),
            2
        );
        assert_eq!(
            NodeOutcome::ReconciliationFailed("diff".to_string()).exit_code(),
            3
        );
        assert_eq!(NodeOutcome::Interrupted.exit_code(), 130);
    }

    #[rstest]
    fn test_build_rejects_invalid_config() {
        let mut config = LiveNodeConfig::default();
        config.venues.insert(
            "X".to_string(),
            LiveVenueConfig {
                canceller_pool_size: 0,
                ..Default::default()
            },
        );
        assert!(LiveNode::build(config).is_err());
    }

    #[rstest]
    fn test_build_with_default_config() {
        let node = LiveNode::build(LiveNodeConfig::default()).unwrap();
        assert_eq!(node.exec_clients.len(), 0);
        assert_eq!(node.data_clients.len(), 0);
    }
}
