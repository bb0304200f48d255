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

//! Reconciliation managers for live execution state.
//!
//! Reconciliation converges local state to venue-of-record state: the venue's
//! reports are diffed against the cache and synthetic events are produced to
//! close the gap. Synthesized events carry `ts_event` from the venue report
//! and are returned ordered by timestamp, so downstream consumers observe
//! monotonic time. Running reconciliation twice against a quiescent venue
//! produces zero events the second time.

use std::{cell::RefCell, fmt::Debug, rc::Rc};

use ahash::{AHashMap, AHashSet};
use helm_common::{cache::Cache, clock::Clock};
use helm_core::{UUID4, UnixNanos};
use rust_decimal::prelude::ToPrimitive;

use helm_model::{
    enums::OrderStatus,
    events::{
        OrderAccepted, OrderCanceled, OrderEventAny, OrderExpired, OrderFilled, OrderInitialized,
        OrderRejected, OrderTriggered,
    },
    identifiers::{ClientOrderId, InstrumentId, StrategyId, TradeId, VenueOrderId},
    orders::OrderAny,
    reports::{ExecutionMassStatus, FillReport, OrderStatusReport},
    types::{Price, Quantity},
};

/// Configuration for reconciliation managers.
#[derive(Clone, Debug)]
pub struct ReconciliationConfig {
    /// The lookback window (minutes) for venue report generation.
    pub lookback_mins: Option<u64>,
    /// The threshold (milliseconds) before an in-flight order is queried.
    pub inflight_threshold_ms: u64,
    /// The maximum number of in-flight queries before resolving the order.
    pub inflight_max_retries: u32,
    /// If unclaimed external orders are dropped rather than generated.
    pub filter_unclaimed_external: bool,
    /// If missing orders are generated from venue reports.
    pub generate_missing_orders: bool,
    /// Client order IDs excluded from reconciliation.
    pub filtered_client_order_ids: AHashSet<ClientOrderId>,
    /// If open-order polling requests only venue-open orders.
    pub open_check_open_only: bool,
    /// If position status reports are excluded from the diff.
    pub filter_position_reports: bool,
    /// The instrument IDs to reconcile (empty means all).
    pub reconciliation_instrument_ids: AHashSet<InstrumentId>,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            lookback_mins: Some(60),
            inflight_threshold_ms: 5_000,
            inflight_max_retries: 5,
            filter_unclaimed_external: false,
            generate_missing_orders: true,
            filtered_client_order_ids: AHashSet::new(),
            open_check_open_only: true,
            filter_position_reports: false,
            reconciliation_instrument_ids: AHashSet::new(),
        }
    }
}

/// The outcome of a reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconciliationResult {
    /// The synthesized catch-up events, ordered by `ts_event`.
    pub events: Vec<OrderEventAny>,
    /// Discrepancies which could not be closed by synthesized events.
    pub discrepancies: Vec<String>,
}

impl ReconciliationResult {
    /// Returns whether local state already matched the venue reports.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.events.is_empty() && self.discrepancies.is_empty()
    }
}

/// Tracking state for an in-flight order check.
#[derive(Clone, Copy, Debug)]
struct InflightCheck {
    ts_submitted: UnixNanos,
    retry_count: u32,
    last_query_ts: Option<UnixNanos>,
}

/// Manager for reconciling execution state between the local cache and venues.
///
/// Handles startup reconciliation from mass status reports, continuous
/// in-flight order checking, external order discovery and claiming, and fill
/// deduplication by trade ID.
pub struct ReconciliationManager {
    clock: Rc<RefCell<dyn Clock>>,
    cache: Rc<RefCell<Cache>>,
    config: ReconciliationConfig,
    inflight_checks: AHashMap<ClientOrderId, InflightCheck>,
    external_order_claims: AHashMap<InstrumentId, StrategyId>,
    external_order_ids: AHashMap<VenueOrderId, ClientOrderId>,
    processed_fills: AHashMap<TradeId, ClientOrderId>,
    order_local_activity_ns: AHashMap<ClientOrderId, UnixNanos>,
}

impl Debug for ReconciliationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(ReconciliationManager))
            .field("config", &self.config)
            .field("inflight_checks", &self.inflight_checks.len())
            .field("processed_fills", &self.processed_fills.len())
            .finish()
    }
}

impl ReconciliationManager {
    /// Creates a new [`ReconciliationManager`] instance.
    pub fn new(
        clock: Rc<RefCell<dyn Clock>>,
        cache: Rc<RefCell<Cache>>,
        config: ReconciliationConfig,
    ) -> Self {
        Self {
            clock,
            cache,
            config,
            inflight_checks: AHashMap::new(),
            external_order_claims: AHashMap::new(),
            external_order_ids: AHashMap::new(),
            processed_fills: AHashMap::new(),
            order_local_activity_ns: AHashMap::new(),
        }
    }

    /// Claims external orders for the given instrument under the strategy.
    pub fn claim_external_orders(&mut self, instrument_id: InstrumentId, strategy_id: StrategyId) {
        self.external_order_claims.insert(instrument_id, strategy_id);
    }

    /// Registers an order as in-flight for continuous checking.
    pub fn register_inflight(&mut self, client_order_id: ClientOrderId) {
        let ts_submitted = self.clock.borrow().timestamp_ns();
        self.inflight_checks.insert(
            client_order_id,
            InflightCheck {
                ts_submitted,
                retry_count: 0,
                last_query_ts: None,
            },
        );
        self.order_local_activity_ns.remove(&client_order_id);
    }

    /// Records local activity for the given order, suppressing races with
    /// in-flight resolution.
    pub fn record_local_activity(&mut self, client_order_id: ClientOrderId, ts_event: UnixNanos) {
        self.order_local_activity_ns
            .insert(client_order_id, ts_event);
        self.clear_recon_tracking(&client_order_id);
    }

    /// Clears reconciliation tracking state for an order.
    pub fn clear_recon_tracking(&mut self, client_order_id: &ClientOrderId) {
        self.inflight_checks.remove(client_order_id);
    }

    /// Returns the count of orders currently tracked as in-flight.
    #[must_use]
    pub fn inflight_count(&self) -> usize {
        self.inflight_checks.len()
    }

    /// Sweeps in-flight orders, promoting overdue commands to venue queries.
    ///
    /// Returns synthesized resolution events (after retries are exhausted)
    /// and the client order IDs which should be queried with the venue.
    pub fn check_inflight_orders(&mut self) -> (Vec<OrderEventAny>, Vec<ClientOrderId>) {
        let mut events = Vec::new();
        let mut to_query = Vec::new();
        let ts_now = self.clock.borrow().timestamp_ns();
        let threshold_ns = self.config.inflight_threshold_ms * 1_000_000;

        let overdue: Vec<ClientOrderId> = self
            .inflight_checks
            .iter()
            .filter(|(client_order_id, check)| {
                !self.config.filtered_client_order_ids.contains(client_order_id)
                    && ts_now.as_u64().saturating_sub(check.ts_submitted.as_u64()) > threshold_ns
            })
            .map(|(client_order_id, _)| *client_order_id)
            .collect();

        for client_order_id in overdue {
            let Some(check) = self.inflight_checks.get_mut(&client_order_id) else {
                continue;
            };

            // De-bounce: skip when queried within the threshold window
            if let Some(last_query_ts) = check.last_query_ts {
                if ts_now.as_u64() - last_query_ts.as_u64() < threshold_ns {
                    continue;
                }
            }

            check.retry_count += 1;
            check.last_query_ts = Some(ts_now);

            if check.retry_count >= self.config.inflight_max_retries {
                // The venue never acknowledged the command: resolve the order
                if let Some(order) = self.cache.borrow().order(&client_order_id) {
                    events.push(self.create_order_rejected(order, "INFLIGHT_TIMEOUT"));
                }
                self.inflight_checks.remove(&client_order_id);
            } else {
                to_query.push(client_order_id);
            }
        }

        (events, to_query)
    }

    /// Reconciles a single order status report during runtime.
    pub fn reconcile_report(&mut self, report: &OrderStatusReport) -> Vec<OrderEventAny> {
        if !self.includes_instrument(&report.instrument_id) {
            return Vec::new();
        }

        match self.resolve_local_order(report) {
            Some(order) => self.reconcile_order_report(&order, report, 0),
            None => {
                if self.config.filter_unclaimed_external || !self.config.generate_missing_orders {
                    Vec::new()
                } else {
                    self.generate_external_order(report)
                }
            }
        }
    }

    /// Reconciles a single fill report during runtime, deduplicated by trade
    /// ID.
    pub fn reconcile_fill(&mut self, fill: &FillReport) -> Option<OrderEventAny> {
        if !self.includes_instrument(&fill.instrument_id) {
            return None;
        }
        self.reconcile_fill_report(fill)
    }

    /// Reconciles orders, fills and positions from a mass status report.
    ///
    /// Produces synthesized events ordered by `ts_event`, plus any
    /// discrepancies which events alone cannot close.
    pub fn reconcile_execution_mass_status(
        &mut self,
        mass_status: &ExecutionMassStatus,
    ) -> ReconciliationResult {
        let mut result = ReconciliationResult::default();

        for report in mass_status.order_reports().values() {
            if !self.includes_instrument(&report.instrument_id) {
                continue;
            }
            if let Some(client_order_id) = &report.client_order_id {
                if self.config.filtered_client_order_ids.contains(client_order_id) {
                    continue;
                }
            }

            match self.resolve_local_order(report) {
                Some(order) => {
                    // Quantity covered by explicit fill reports pending this
                    // pass must not be double counted by an inferred fill
                    let covered_raw: u64 = mass_status
                        .fill_reports()
                        .get(&report.venue_order_id)
                        .map(|fills| {
                            fills
                                .iter()
                                .filter(|fill| {
                                    !self.processed_fills.contains_key(&fill.trade_id)
                                        && !order.has_trade_id(&fill.trade_id)
                                })
                                .map(|fill| fill.last_qty.raw)
                                .sum()
                        })
                        .unwrap_or(0);

                    let events = self.reconcile_order_report(&order, report, covered_raw);
                    result.events.extend(events);
                }
                None => {
                    if self.config.filter_unclaimed_external
                        || !self.config.generate_missing_orders
                    {
                        log::debug!(
                            "Filtered external order report: {}",
                            report.venue_order_id
                        );
                        continue;
                    }
                    let events = self.generate_external_order(report);
                    result.events.extend(events);
                }
            }
        }

        for fills in mass_status.fill_reports().values() {
            let mut fills: Vec<&FillReport> = fills.iter().collect();
            fills.sort_by_key(|fill| fill.ts_event);
            for fill in fills {
                if !self.includes_instrument(&fill.instrument_id) {
                    continue;
                }
                if let Some(event) = self.reconcile_fill_report(fill) {
                    result.events.push(event);
                }
            }
        }

        // Local open orders unknown at the venue
        result
            .events
            .extend(self.resolve_orders_missing_at_venue(mass_status));

        if !self.config.filter_position_reports {
            result
                .discrepancies
                .extend(self.check_position_reports(mass_status, &result.events));
        }

        // Merge-order synthesized events by venue time
        result.events.sort_by_key(OrderEventAny::ts_event);

        result
    }

    fn includes_instrument(&self, instrument_id: &InstrumentId) -> bool {
        self.config.reconciliation_instrument_ids.is_empty()
            || self.config.reconciliation_instrument_ids.contains(instrument_id)
    }

    fn resolve_local_order(&self, report: &OrderStatusReport) -> Option<OrderAny> {
        let cache = self.cache.borrow();

        if let Some(client_order_id) = &report.client_order_id {
            if let Some(order) = cache.order(client_order_id) {
                return Some(order.clone());
            }
        }
        if let Some(client_order_id) = cache.client_order_id(&report.venue_order_id) {
            return cache.order(client_order_id).cloned();
        }
        if let Some(client_order_id) = self.external_order_ids.get(&report.venue_order_id) {
            return cache.order(client_order_id).cloned();
        }
        None
    }

    /// Diffs a local order against its venue report, synthesizing the missing
    /// transitions.
    fn reconcile_order_report(
        &mut self,
        order: &OrderAny,
        report: &OrderStatusReport,
        covered_fill_raw: u64,
    ) -> Vec<OrderEventAny> {
        self.clear_recon_tracking(&order.client_order_id());

        if order.status() == report.order_status && order.filled_qty() == report.filled_qty {
            return Vec::new(); // Already in sync
        }

        let mut events = Vec::new();

        // Acknowledge first where the venue shows a working or done order
        if order.status() == OrderStatus::Initialized || order.status() == OrderStatus::Submitted {
            events.push(self.create_order_accepted(order, report));
        }

        if report.order_status == OrderStatus::Triggered
            && order.status() != OrderStatus::Triggered
        {
            events.push(self.create_order_triggered(order, report));
        }

        // Fill quantity drift: synthesize an inferred fill only for the
        // remainder the venue's explicit fill reports will not cover
        let expected_raw = order.filled_qty().raw + covered_fill_raw;
        if report.filled_qty.raw > expected_raw {
            if let Some(event) = self.create_inferred_fill(order, report, expected_raw) {
                events.push(event);
            }
        } else if report.filled_qty < order.filled_qty() {
            log::error!(
                "Venue reports less filled than local for {}: {} < {} (cannot be healed by events)",
                order.client_order_id(),
                report.filled_qty,
                order.filled_qty(),
            );
        }

        match report.order_status {
            OrderStatus::Canceled => events.push(self.create_order_canceled(order, report)),
            OrderStatus::Expired => events.push(self.create_order_expired(order, report)),
            OrderStatus::Rejected => events.push(
                self.create_order_rejected(order, report.cancel_reason.as_deref().unwrap_or("UNKNOWN")),
            ),
            _ => {}
        }

        events
    }

    /// Generates adoption events for an order the venue knows and the local
    /// system does not.
    fn generate_external_order(&mut self, report: &OrderStatusReport) -> Vec<OrderEventAny> {
        let strategy_id = self
            .external_order_claims
            .get(&report.instrument_id)
            .copied()
            .unwrap_or_else(StrategyId::external);

        let client_order_id = report.client_order_id.unwrap_or_else(|| {
            ClientOrderId::new(format!("O-{}", report.venue_order_id))
        });
        self.external_order_ids
            .insert(report.venue_order_id, client_order_id);

        log::info!(
            "Generating external order {client_order_id} for {} under {strategy_id}",
            report.venue_order_id,
        );

        let ts_init = self.clock.borrow().timestamp_ns();
        let init = OrderInitialized {
            trader_id: helm_model::identifiers::TraderId::default(),
            strategy_id,
            instrument_id: report.instrument_id,
            client_order_id,
            order_side: report.order_side,
            order_type: report.order_type,
            quantity: report.quantity,
            time_in_force: report.time_in_force,
            post_only: report.post_only,
            reduce_only: report.reduce_only,
            reconciliation: true,
            event_id: UUID4::new(),
            ts_event: report.ts_accepted,
            ts_init,
            price: report.price,
            trigger_price: report.trigger_price,
            trigger_type: report.trigger_type,
            expire_time: report.expire_time,
            display_qty: report.display_qty,
            ..Default::default()
        };

        let mut events = vec![OrderEventAny::Initialized(init)];

        let accepted = OrderAccepted::new(
            helm_model::identifiers::TraderId::default(),
            strategy_id,
            report.instrument_id,
            client_order_id,
            report.venue_order_id,
            report.account_id,
            UUID4::new(),
            report.ts_accepted,
            ts_init,
            true,
        );
        events.push(OrderEventAny::Accepted(accepted));

        events
    }

    fn reconcile_fill_report(&mut self, fill: &FillReport) -> Option<OrderEventAny> {
        if self.processed_fills.contains_key(&fill.trade_id) {
            return None;
        }

        let order = {
            let cache = self.cache.borrow();
            let client_order_id = fill
                .client_order_id
                .filter(|id| cache.order(id).is_some())
                .or_else(|| cache.client_order_id(&fill.venue_order_id).copied())
                .or_else(|| self.external_order_ids.get(&fill.venue_order_id).copied())?;
            cache.order(&client_order_id).cloned()
        };

        // The order may not be cached yet when adopting an external order;
        // apply the fill against the report identifiers in that case
        let (order, client_order_id) = match order {
            Some(order) => {
                // Local fills already containing this trade are in sync
                if order.has_trade_id(&fill.trade_id) {
                    self.processed_fills
                        .insert(fill.trade_id, order.client_order_id());
                    return None;
                }
                let client_order_id = order.client_order_id();
                (Some(order), client_order_id)
            }
            None => {
                let client_order_id = self.external_order_ids.get(&fill.venue_order_id).copied()?;
                (None, client_order_id)
            }
        };

        self.processed_fills.insert(fill.trade_id, client_order_id);

        let instrument = self.cache.borrow().instrument(&fill.instrument_id).cloned();
        let Some(instrument) = instrument else {
            log::error!(
                "Cannot reconcile fill: no instrument found for {}",
                fill.instrument_id,
            );
            return None;
        };

        let (trader_id, strategy_id, order_type) = order.as_ref().map_or_else(
            || {
                (
                    helm_model::identifiers::TraderId::default(),
                    self.external_order_claims
                        .get(&fill.instrument_id)
                        .copied()
                        .unwrap_or_else(StrategyId::external),
                    helm_model::enums::OrderType::Market,
                )
            },
            |order| (order.trader_id(), order.strategy_id(), order.order_type()),
        );

        Some(OrderEventAny::Filled(OrderFilled::new(
            trader_id,
            strategy_id,
            fill.instrument_id,
            client_order_id,
            fill.venue_order_id,
            fill.account_id,
            fill.trade_id,
            fill.order_side,
            order_type,
            fill.last_qty,
            fill.last_px,
            instrument.quote_currency(),
            fill.liquidity_side,
            fill.report_id,
            fill.ts_event,
            self.clock.borrow().timestamp_ns(),
            true,
            fill.venue_position_id,
            Some(fill.commission),
        )))
    }

    /// Resolves local open orders which the venue did not report.
    ///
    /// Heuristic: an order the venue acknowledged (has a venue order ID) once
    /// existed, so it is resolved as canceled; a GTD order past expiry is
    /// resolved as expired.
    fn resolve_orders_missing_at_venue(
        &mut self,
        mass_status: &ExecutionMassStatus,
    ) -> Vec<OrderEventAny> {
        let mut events = Vec::new();
        let ts_now = self.clock.borrow().timestamp_ns();

        let open_orders: Vec<OrderAny> = self
            .cache
            .borrow()
            .orders_open(Some(&mass_status.venue), None, None)
            .into_iter()
            .filter(|order| self.includes_instrument(&order.instrument_id()))
            .cloned()
            .collect();

        for order in open_orders {
            if self
                .config
                .filtered_client_order_ids
                .contains(&order.client_order_id())
            {
                continue;
            }

            let known_at_venue = order.venue_order_id().map_or(false, |venue_order_id| {
                mass_status.order_reports().contains_key(&venue_order_id)
            });
            if known_at_venue {
                continue;
            }

            let expired = order
                .expire_time()
                .map_or(false, |expire_time| expire_time <= ts_now);

            if expired {
                events.push(self.create_order_expired_simple(&order, ts_now));
            } else {
                events.push(self.create_order_canceled_simple(&order, ts_now));
            }
        }

        events
    }

    /// Compares venue position reports against the local net positions.
    fn check_position_reports(
        &self,
        mass_status: &ExecutionMassStatus,
        pending_events: &[OrderEventAny],
    ) -> Vec<String> {
        let mut discrepancies = Vec::new();

        for (instrument_id, reports) in mass_status.position_reports() {
            if !self.includes_instrument(instrument_id) {
                continue;
            }

            // Pending synthesized fills may still close the gap this pass
            let has_pending_fills = pending_events.iter().any(|event| {
                matches!(event, OrderEventAny::Filled(fill) if &fill.instrument_id == instrument_id)
            });
            if has_pending_fills {
                continue;
            }

            let venue_signed_qty: f64 = reports
                .iter()
                .map(|report| report.signed_decimal_qty.to_f64().unwrap_or(0.0))
                .sum();

            let local_signed_qty: f64 = self
                .cache
                .borrow()
                .positions_open(None, Some(instrument_id))
                .iter()
                .map(|position| position.signed_qty)
                .sum();

            if (venue_signed_qty - local_signed_qty).abs() > f64::EPSILON {
                discrepancies.push(format!(
                    "Position quantity mismatch for {instrument_id}: venue {venue_signed_qty}, local {local_signed_qty}"
                ));
            }
        }

        discrepancies
    }

    // -- EVENT CONSTRUCTORS ----------------------------------------------------------------------

    fn create_order_accepted(&self, order: &OrderAny, report: &OrderStatusReport) -> OrderEventAny {
        OrderEventAny::Accepted(OrderAccepted::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            report.venue_order_id,
            report.account_id,
            UUID4::new(),
            report.ts_accepted,
            self.clock.borrow().timestamp_ns(),
            true,
        ))
    }

    fn create_order_triggered(&self, order: &OrderAny, report: &OrderStatusReport) -> OrderEventAny {
        OrderEventAny::Triggered(OrderTriggered::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            UUID4::new(),
            report.ts_triggered.unwrap_or(report.ts_last),
            self.clock.borrow().timestamp_ns(),
            true,
            Some(report.venue_order_id),
            Some(report.account_id),
        ))
    }

    fn create_order_canceled(&self, order: &OrderAny, report: &OrderStatusReport) -> OrderEventAny {
        OrderEventAny::Canceled(OrderCanceled::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            UUID4::new(),
            report.ts_last,
            self.clock.borrow().timestamp_ns(),
            true,
            Some(report.venue_order_id),
            Some(report.account_id),
        ))
    }

    fn create_order_canceled_simple(&self, order: &OrderAny, ts_event: UnixNanos) -> OrderEventAny {
        OrderEventAny::Canceled(OrderCanceled::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            UUID4::new(),
            ts_event,
            self.clock.borrow().timestamp_ns(),
            true,
            order.venue_order_id(),
            order.account_id(),
        ))
    }

    fn create_order_expired(&self, order: &OrderAny, report: &OrderStatusReport) -> OrderEventAny {
        OrderEventAny::Expired(OrderExpired::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            UUID4::new(),
            report.ts_last,
            self.clock.borrow().timestamp_ns(),
            true,
            Some(report.venue_order_id),
            Some(report.account_id),
        ))
    }

    fn create_order_expired_simple(&self, order: &OrderAny, ts_event: UnixNanos) -> OrderEventAny {
        OrderEventAny::Expired(OrderExpired::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            UUID4::new(),
            ts_event,
            self.clock.borrow().timestamp_ns(),
            true,
            order.venue_order_id(),
            order.account_id(),
        ))
    }

    fn create_order_rejected(&self, order: &OrderAny, reason: &str) -> OrderEventAny {
        let ts_now = self.clock.borrow().timestamp_ns();
        OrderEventAny::Rejected(OrderRejected::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            order.account_id().unwrap_or_default(),
            reason.into(),
            UUID4::new(),
            ts_now,
            ts_now,
            true,
            false,
        ))
    }

    /// Creates an inferred fill covering the venue's reported fill quantity
    /// drift, at the report's average price.
    fn create_inferred_fill(
        &mut self,
        order: &OrderAny,
        report: &OrderStatusReport,
        expected_raw: u64,
    ) -> Option<OrderEventAny> {
        let instrument = self.cache.borrow().instrument(&order.instrument_id()).cloned()?;

        let diff_raw = report.filled_qty.raw - expected_raw;
        let last_qty = Quantity::from_raw(diff_raw, instrument.size_precision());

        let last_px = report.avg_px.map_or_else(
            || order.price(),
            |avg_px| Some(Price::new(avg_px, instrument.price_precision())),
        )?;

        let trade_id = TradeId::new(format!("{}-INFERRED", report.venue_order_id));
        if self.processed_fills.contains_key(&trade_id) {
            return None;
        }
        self.processed_fills
            .insert(trade_id, order.client_order_id());

        log::info!(
            "Inferring fill for {}: qty {last_qty} @ {last_px}",
            order.client_order_id(),
        );

        Some(OrderEventAny::Filled(OrderFilled::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            report.venue_order_id,
            report.account_id,
            trade_id,
            order.order_side(),
            order.order_type(),
            last_qty,
            last_px,
            instrument.quote_currency(),
            helm_model::enums::LiquiditySide::NoLiquiditySide,
            UUID4::new(),
            report.ts_last,
            self.clock.borrow().timestamp_ns(),
            true,
            report.venue_position_id,
            None,
        )))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests;
