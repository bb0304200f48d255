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

use helm_common::clock::TestClock;
use helm_model::{
    enums::{LiquiditySide, OrderSide, OrderType, TimeInForce},
    events::{OrderAccepted, OrderSubmitted},
    identifiers::{AccountId, ClientId, Venue},
    instruments::{InstrumentAny, stubs::audusd_sim},
    orders::builder::OrderTestBuilder,
    types::{Currency, Money},
};
use rstest::rstest;

use super::*;

struct TestHarness {
    clock: Rc<RefCell<TestClock>>,
    cache: Rc<RefCell<Cache>>,
    manager: ReconciliationManager,
}

fn harness(config: ReconciliationConfig) -> TestHarness {
    let clock = Rc::new(RefCell::new(TestClock::new()));
    let cache = Rc::new(RefCell::new(Cache::default()));
    cache
        .borrow_mut()
        .add_instrument(InstrumentAny::CurrencyPair(audusd_sim()))
        .unwrap();

    let manager = ReconciliationManager::new(clock.clone(), cache.clone(), config);
    TestHarness {
        clock,
        cache,
        manager,
    }
}

fn accepted_order(client_order_id: &str, venue_order_id: &str, qty: u64) -> OrderAny {
    let mut order = OrderTestBuilder::new(OrderType::Limit)
        .instrument_id(InstrumentId::from("AUD/USD.SIM"))
        .client_order_id(ClientOrderId::from(client_order_id))
        .side(OrderSide::Buy)
        .quantity(Quantity::from(qty))
        .price(Price::from("1.00000"))
        .build();
    order
        .apply(OrderEventAny::Submitted(OrderSubmitted::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            AccountId::from("SIM-001"),
            UUID4::new(),
            UnixNanos::from(1),
            UnixNanos::from(1),
        )))
        .unwrap();
    order
        .apply(OrderEventAny::Accepted(OrderAccepted::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            VenueOrderId::from(venue_order_id),
            AccountId::from("SIM-001"),
            UUID4::new(),
            UnixNanos::from(2),
            UnixNanos::from(2),
            false,
        )))
        .unwrap();
    order
}

fn add_to_cache(cache: &Rc<RefCell<Cache>>, order: &OrderAny) {
    let mut cache = cache.borrow_mut();
    cache.add_order(order.clone(), None, None, false).unwrap();
    cache.update_order(order).unwrap();
}

fn order_report(
    order: &OrderAny,
    status: OrderStatus,
    filled_qty: u64,
    ts: u64,
) -> OrderStatusReport {
    OrderStatusReport::new(
        AccountId::from("SIM-001"),
        order.instrument_id(),
        Some(order.client_order_id()),
        order.venue_order_id().unwrap_or_default(),
        order.order_side(),
        order.order_type(),
        order.time_in_force(),
        status,
        order.quantity(),
        Quantity::from(filled_qty),
        UnixNanos::from(2),
        UnixNanos::from(ts),
        UnixNanos::from(ts),
        None,
    )
}

fn fill_report(order: &OrderAny, trade_id: &str, qty: u64, px: &str, ts: u64) -> FillReport {
    FillReport::new(
        AccountId::from("SIM-001"),
        order.instrument_id(),
        order.venue_order_id().unwrap_or_default(),
        TradeId::from(trade_id),
        order.order_side(),
        Quantity::from(qty),
        Price::from(px),
        Money::new(2.0, Currency::USD()),
        LiquiditySide::Taker,
        Some(order.client_order_id()),
        None,
        UnixNanos::from(ts),
        UnixNanos::from(ts),
        None,
    )
}

fn mass_status() -> ExecutionMassStatus {
    ExecutionMassStatus::new(
        ClientId::from("SIM"),
        AccountId::from("SIM-001"),
        Venue::from("SIM"),
        UnixNanos::from(100),
        None,
    )
}

#[rstest]
fn test_empty_mass_status_converged() {
    let mut harness = harness(ReconciliationConfig::default());
    let result = harness.manager.reconcile_execution_mass_status(&mass_status());
    assert!(result.is_converged());
}

#[rstest]
fn test_missed_fill_synthesized_then_idempotent() {
    let mut harness = harness(ReconciliationConfig::default());
    let order = accepted_order("O-1", "V-1", 100_000);
    add_to_cache(&harness.cache, &order);

    // Venue reports the order fully filled with an explicit fill report
    let mut status = mass_status();
    status.add_order_reports(vec![order_report(&order, OrderStatus::Filled, 100_000, 50)]);
    status.add_fill_reports(vec![fill_report(&order, "T-1", 100_000, "1.00050", 50)]);

    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert!(result.discrepancies.is_empty());
    assert_eq!(result.events.len(), 1);

    // Exactly the reported quantity, price and venue timestamp
    match &result.events[0] {
        OrderEventAny::Filled(fill) => {
            assert_eq!(fill.client_order_id, order.client_order_id());
            assert_eq!(fill.last_qty, Quantity::from(100_000_u64));
            assert_eq!(fill.last_px, Price::from("1.00050"));
            assert_eq!(fill.ts_event, UnixNanos::from(50));
            assert!(fill.reconciliation);
        }
        event => panic!("Expected OrderFilled, was {event}"),
    }

    // Apply the synthesized event, as the engine would
    let mut order = order;
    order.apply(result.events[0].clone()).unwrap();
    harness.cache.borrow_mut().update_order(&order).unwrap();

    // A second consecutive run synthesizes zero events
    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert!(result.is_converged());
}

#[rstest]
fn test_fill_drift_without_fill_reports_infers_fill() {
    let mut harness = harness(ReconciliationConfig::default());
    let order = accepted_order("O-1", "V-1", 100_000);
    add_to_cache(&harness.cache, &order);

    let mut status = mass_status();
    let report = order_report(&order, OrderStatus::PartiallyFilled, 40_000, 60).with_avg_px(1.0002);
    status.add_order_reports(vec![report]);

    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert_eq!(result.events.len(), 1);
    match &result.events[0] {
        OrderEventAny::Filled(fill) => {
            assert_eq!(fill.last_qty, Quantity::from(40_000_u64));
            assert_eq!(fill.last_px, Price::from("1.00020"));
        }
        event => panic!("Expected OrderFilled, was {event}"),
    }
}

#[rstest]
fn test_venue_terminal_state_synthesized() {
    let mut harness = harness(ReconciliationConfig::default());
    let order = accepted_order("O-1", "V-1", 100_000);
    add_to_cache(&harness.cache, &order);

    let mut status = mass_status();
    status.add_order_reports(vec![order_report(&order, OrderStatus::Canceled, 0, 70)]);

    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert_eq!(result.events.len(), 1);
    assert!(matches!(&result.events[0], OrderEventAny::Canceled(event)
        if event.ts_event == UnixNanos::from(70) && event.reconciliation));
}

#[rstest]
fn test_local_open_order_missing_at_venue_resolved_canceled() {
    let mut harness = harness(ReconciliationConfig::default());
    let order = accepted_order("O-1", "V-1", 100_000);
    add_to_cache(&harness.cache, &order);

    // The venue reports nothing for this order
    let result = harness.manager.reconcile_execution_mass_status(&mass_status());

    assert_eq!(result.events.len(), 1);
    assert!(matches!(&result.events[0], OrderEventAny::Canceled(event)
        if event.client_order_id == order.client_order_id()));
}

#[rstest]
fn test_external_order_generated_with_claim() {
    let mut harness = harness(ReconciliationConfig::default());
    let strategy_id = StrategyId::from("Claimer-001");
    harness
        .manager
        .claim_external_orders(InstrumentId::from("AUD/USD.SIM"), strategy_id);

    let report = OrderStatusReport::new(
        AccountId::from("SIM-001"),
        InstrumentId::from("AUD/USD.SIM"),
        None, // Unknown locally
        VenueOrderId::from("V-EXT"),
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

    let mut status = mass_status();
    status.add_order_reports(vec![report]);

    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert_eq!(result.events.len(), 2);
    assert!(matches!(&result.events[0], OrderEventAny::Initialized(init)
        if init.strategy_id == strategy_id && init.reconciliation));
    assert!(matches!(&result.events[1], OrderEventAny::Accepted(event)
        if event.venue_order_id == VenueOrderId::from("V-EXT")));
}

#[rstest]
fn test_unclaimed_external_order_tagged_external() {
    let mut harness = harness(ReconciliationConfig::default());

    let report = OrderStatusReport::new(
        AccountId::from("SIM-001"),
        InstrumentId::from("AUD/USD.SIM"),
        None,
        VenueOrderId::from("V-EXT"),
        OrderSide::Sell,
        OrderType::Market,
        TimeInForce::Ioc,
        OrderStatus::Accepted,
        Quantity::from(1_000_u64),
        Quantity::from(0_u64),
        UnixNanos::from(10),
        UnixNanos::from(10),
        UnixNanos::from(10),
        None,
    );

    let mut status = mass_status();
    status.add_order_reports(vec![report]);

    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert!(matches!(&result.events[0], OrderEventAny::Initialized(init)
        if init.strategy_id.is_external()));
}

#[rstest]
fn test_filter_unclaimed_external_drops_reports() {
    let config = ReconciliationConfig {
        filter_unclaimed_external: true,
        ..Default::default()
    };
    let mut harness = harness(config);

    let report = OrderStatusReport::new(
        AccountId::from("SIM-001"),
        InstrumentId::from("AUD/USD.SIM"),
        None,
        VenueOrderId::from("V-EXT"),
        OrderSide::Sell,
        OrderType::Market,
        TimeInForce::Ioc,
        OrderStatus::Accepted,
        Quantity::from(1_000_u64),
        Quantity::from(0_u64),
        UnixNanos::from(10),
        UnixNanos::from(10),
        UnixNanos::from(10),
        None,
    );

    let mut status = mass_status();
    status.add_order_reports(vec![report]);

    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert!(result.is_converged());
}

#[rstest]
fn test_instrument_filter_skips_other_instruments() {
    let config = ReconciliationConfig {
        reconciliation_instrument_ids: [InstrumentId::from("ETHUSDT.BINANCE")]
            .into_iter()
            .collect(),
        ..Default::default()
    };
    let mut harness = harness(config);
    let order = accepted_order("O-1", "V-1", 100_000);
    add_to_cache(&harness.cache, &order);

    let mut status = mass_status();
    status.add_order_reports(vec![order_report(&order, OrderStatus::Canceled, 0, 70)]);

    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert!(result.is_converged());
}

#[rstest]
fn test_inflight_check_promotes_to_query_then_resolves() {
    let config = ReconciliationConfig {
        inflight_threshold_ms: 100,
        inflight_max_retries: 2,
        ..Default::default()
    };
    let mut harness = harness(config);
    let order = accepted_order("O-1", "V-1", 100_000);
    add_to_cache(&harness.cache, &order);

    harness.manager.register_inflight(order.client_order_id());
    assert_eq!(harness.manager.inflight_count(), 1);

    // Within the threshold: nothing to do
    let (events, to_query) = harness.manager.check_inflight_orders();
    assert!(events.is_empty());
    assert!(to_query.is_empty());

    // First overdue sweep promotes the command to a venue query
    harness
        .clock
        .borrow_mut()
        .set_time(UnixNanos::from(200_000_000));
    let (events, to_query) = harness.manager.check_inflight_orders();
    assert!(events.is_empty());
    assert_eq!(to_query, vec![order.client_order_id()]);

    // De-bounced within the query window
    harness
        .clock
        .borrow_mut()
        .set_time(UnixNanos::from(250_000_000));
    let (events, to_query) = harness.manager.check_inflight_orders();
    assert!(events.is_empty());
    assert!(to_query.is_empty());

    // Retries exhausted: the order is resolved as rejected
    harness
        .clock
        .borrow_mut()
        .set_time(UnixNanos::from(400_000_000));
    let (events, _) = harness.manager.check_inflight_orders();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], OrderEventAny::Rejected(event)
        if event.reason.as_str() == "INFLIGHT_TIMEOUT"));
    assert_eq!(harness.manager.inflight_count(), 0);
}

#[rstest]
fn test_local_activity_clears_inflight_tracking() {
    let mut harness = harness(ReconciliationConfig::default());
    let order = accepted_order("O-1", "V-1", 100_000);

    harness.manager.register_inflight(order.client_order_id());
    harness
        .manager
        .record_local_activity(order.client_order_id(), UnixNanos::from(5));
    assert_eq!(harness.manager.inflight_count(), 0);
}

#[rstest]
fn test_position_report_mismatch_escalates() {
    let mut harness = harness(ReconciliationConfig::default());

    let mut status = mass_status();
    status.add_position_reports(vec![helm_model::reports::PositionStatusReport::new(
        AccountId::from("SIM-001"),
        InstrumentId::from("AUD/USD.SIM"),
        helm_model::enums::PositionSide::Long,
        Quantity::from(100_000_u64),
        None,
        UnixNanos::from(10),
        UnixNanos::from(10),
        None,
    )]);

    // No local position and no pending fills to close the gap
    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert_eq!(result.discrepancies.len(), 1);
    assert!(result.discrepancies[0].contains("Position quantity mismatch"));
}

#[rstest]
fn test_events_ordered_by_ts_event() {
    let mut harness = harness(ReconciliationConfig::default());
    let order1 = accepted_order("O-1", "V-1", 100_000);
    let order2 = accepted_order("O-2", "V-2", 100_000);
    add_to_cache(&harness.cache, &order1);
    add_to_cache(&harness.cache, &order2);

    let mut status = mass_status();
    status.add_order_reports(vec![
        order_report(&order1, OrderStatus::Canceled, 0, 90),
        order_report(&order2, OrderStatus::Canceled, 0, 40),
    ]);

    let result = harness.manager.reconcile_execution_mass_status(&status);
    assert_eq!(result.events.len(), 2);
    assert!(result.events[0].ts_event() <= result.events[1].ts_event());
}
