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

//! The async runner driving the single-threaded engine loop.
//!
//! All domain-model mutation happens on this loop: worker threads (HTTP,
//! stream readers) post commands and events onto thread-safe inbound queues,
//! and the runner serializes their application. Periodic sweeps (in-flight
//! checks, purges) interleave with message processing on the same loop.

use std::time::Duration;

use helm_common::messages::{ExecutionEvent, TradingCommand};
use tokio::sync::{
    mpsc::UnboundedReceiver,
    watch,
};

use crate::execution::LiveExecutionEngine;

/// Drives a [`LiveExecutionEngine`] on the current thread until stopped.
pub struct AsyncRunner {
    cmd_rx: UnboundedReceiver<TradingCommand>,
    evt_rx: UnboundedReceiver<ExecutionEvent>,
    stop_rx: watch::Receiver<bool>,
    sweep_interval: Duration,
}

impl std::fmt::Debug for AsyncRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(AsyncRunner))
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

impl AsyncRunner {
    /// Creates a new [`AsyncRunner`], taking the engine's inbound queues.
    ///
    /// The returned watch sender stops the runner when set to true.
    #[must_use]
    pub fn new(
        engine: &mut LiveExecutionEngine,
        sweep_interval: Duration,
    ) -> (Self, watch::Sender<bool>) {
        let (cmd_rx, evt_rx) = engine.take_channels();
        let (stop_tx, stop_rx) = watch::channel(false);
        (
            Self {
                cmd_rx,
                evt_rx,
                stop_rx,
                sweep_interval,
            },
            stop_tx,
        )
    }

    /// Runs the loop, serializing all engine mutation onto this task.
    ///
    /// Returns when stopped or when every queue sender has been dropped.
    pub async fn run(mut self, engine: &mut LiveExecutionEngine) {
        log::info!("Runner started");
        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.cmd_rx.recv() => match command {
                    Some(command) => engine.execute(&command),
                    None => break,
                },
                event = self.evt_rx.recv() => match event {
                    Some(event) => engine.process(&event),
                    None => break,
                },
                _ = sweep.tick() => engine.sweep(),
                result = self.stop_rx.changed() => {
                    if result.is_err() || *self.stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Runner stopped");
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use helm_common::{
        cache::Cache,
        clock::TestClock,
        messages::{ExecutionEvent, ExecutionReport},
    };
    use helm_core::UnixNanos;
    use helm_execution::engine::ExecutionEngine;
    use helm_model::{
        enums::{OrderSide, OrderStatus, OrderType, TimeInForce},
        identifiers::{AccountId, InstrumentId, VenueOrderId},
        instruments::{InstrumentAny, stubs::audusd_sim},
        reports::OrderStatusReport,
        types::{Price, Quantity},
    };
    use rstest::rstest;

    use super::*;
    use crate::config::LiveExecEngineConfig;

    fn live_engine() -> LiveExecutionEngine {
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

    #[rstest]
    fn test_runner_processes_queued_events_and_stops() {
        // Single-threaded runtime: the engine loop is the only mutator
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        runtime.block_on(async {
            let mut engine = live_engine();
            let evt_tx = engine.event_sender();
            let (runner, stop_tx) = AsyncRunner::new(&mut engine, Duration::from_millis(10));

            let report = OrderStatusReport::new(
                AccountId::from("SIM-001"),
                InstrumentId::from("AUD/USD.SIM"),
                None,
                VenueOrderId::from("V-1"),
                OrderSide::Buy,
                OrderType::Limit,
                TimeInForce::Gtc,
                OrderStatus::Accepted,
                Quantity::from(100_000_u64),
                Quantity::from(0_u64),
                UnixNanos::from(10),
                UnixNanos::from(10),
                UnixNanos::from(10),
                None,
            )
            .with_price(Price::from("1.00000"));

            evt_tx
                .send(ExecutionEvent::Report(ExecutionReport::OrderStatus(
                    Box::new(report),
                )))
                .unwrap();

            // Stop shortly after the event is processed
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let _ = stop_tx.send(true);
            });

            runner.run(&mut engine).await;

            // The external order was adopted while the runner was live
            let cache = engine.cache();
            assert_eq!(cache.borrow().orders(None, None, None).len(), 1);
        });
    }
}
