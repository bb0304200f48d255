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

use std::{cell::RefCell, rc::Rc};

use helm_common::{
    clock::TestClock,
    msgbus::{
        self,
        handler::{ShareableMessageHandler, TypedMessageHandler},
    },
};
use helm_model::{
    accounts::CashAccount,
    enums::{AccountType, LiquiditySide, OrderSide, OrderType, TimeInForce},
    events::{AccountState, OrderAccepted, OrderCanceled, OrderSubmitted},
    identifiers::{AccountId, InstrumentId, TradeId, TraderId, VenueOrderId},
    instruments::stubs::audusd_sim,
    orders::builder::OrderTestBuilder,
    types::{Currency, Money, Price},
};
use rstest::rstest;

use super::{stubs::*, *};

struct TestHarness {
    engine: ExecutionEngine,
    cache: Rc<RefCell<Cache>>,
    clock: Rc<RefCell<TestClock>>,
    recorded: Rc<RefCell<Vec<RecordedCommand>>>,
    published: Rc<RefCell<Vec<OrderEventAny>>>,
}

fn harness(capabilities: crate::client::ExecutionClientCapabilities) -> TestHarness {
    let clock = Rc::new(RefCell::new(TestClock::new()));
    let cache = Rc::new(RefCell::new(Cache::default()));

    let instrument = InstrumentAny::CurrencyPair(audusd_sim());
    cache.borrow_mut().add_instrument(instrument).unwrap();

    let balance = AccountBalance::new(
        Money::from("1000000.00 USD"),
        Money::from("0.00 USD"),
        Money::from("1000000.00 USD"),
    );
    let account = AccountAny::Cash(CashAccount::new(AccountState::new(
        AccountId::from("SIM-001"),
        AccountType::Cash,
        vec![balance],
        vec![],
        true,
        UUID4::new(),
        UnixNanos::default(),
        UnixNanos::default(),
        Some(Currency::USD()),
    )));
    cache.borrow_mut().add_account(account).unwrap();

    let client = StubExecutionClient::new(capabilities);
    let recorded = client.recorded.clone();

    let mut engine = ExecutionEngine::new(clock.clone(), cache.clone(), None);
    engine.register_client(Rc::new(client)).unwrap();

    // Capture all published order events
    let published = Rc::new(RefCell::new(Vec::new()));
    let published_clone = published.clone();
    let handler = ShareableMessageHandler(Rc::new(TypedMessageHandler::new(
        Some("test-capture"),
        move |event: &OrderEventAny| published_clone.borrow_mut().push(event.clone()),
    )));
    msgbus::subscribe("events.order.*", handler, None);

    TestHarness {
        engine,
        cache,
        clock,
        recorded,
        published,
    }
}

fn limit_order(client_order_id: &str, side: OrderSide, qty: u64, price: &str) -> OrderAny {
    OrderTestBuilder::new(OrderType::Limit)
        .instrument_id(InstrumentId::from("AUD/USD.SIM"))
        .client_order_id(ClientOrderId::from(client_order_id))
        .side(side)
        .quantity(Quantity::from(qty))
        .price(Price::from(price))
        .time_in_force(TimeInForce::Gtc)
        .build()
}

fn submit_command(order: &OrderAny) -> TradingCommand {
    TradingCommand::SubmitOrder(SubmitOrder::new(
        order.trader_id(),
        ClientId::from("SIM"),
        order.strategy_id(),
        order.instrument_id(),
        order.client_order_id(),
        order.clone(),
        None,
        UUID4::new(),
        UnixNanos::default(),
    ))
}

fn submitted_event(order: &OrderAny, ts: u64) -> OrderEventAny {
    OrderEventAny::Submitted(OrderSubmitted::new(
        order.trader_id(),
        order.strategy_id(),
        order.instrument_id(),
        order.client_order_id(),
        AccountId::from("SIM-001"),
        UUID4::new(),
        UnixNanos::from(ts),
        UnixNanos::from(ts),
    ))
}

fn accepted_event(order: &OrderAny, venue_order_id: &str, ts: u64) -> OrderEventAny {
    OrderEventAny::Accepted(OrderAccepted::new(
        order.trader_id(),
        order.strategy_id(),
        order.instrument_id(),
        order.client_order_id(),
        VenueOrderId::from(venue_order_id),
        AccountId::from("SIM-001"),
        UUID4::new(),
        UnixNanos::from(ts),
        UnixNanos::from(ts),
        false,
    ))
}

#[allow(clippy::too_many_arguments)]
fn filled_event(
    order: &OrderAny,
    trade_id: &str,
    qty: u64,
    px: &str,
    commission: Option<Money>,
    ts: u64,
) -> OrderEventAny {
    OrderEventAny::Filled(OrderFilled::new(
        order.trader_id(),
        order.strategy_id(),
        order.instrument_id(),
        order.client_order_id(),
        order.venue_order_id().unwrap_or_default(),
        AccountId::from("SIM-001"),
        TradeId::from(trade_id),
        order.order_side(),
        order.order_type(),
        Quantity::from(qty),
        Price::from(px),
        Currency::USD(),
        LiquiditySide::Taker,
        UUID4::new(),
        UnixNanos::from(ts),
        UnixNanos::from(ts),
        false,
        None,
        commission,
    ))
}

fn submit_and_accept(harness: &mut TestHarness, order: &OrderAny, venue_order_id: &str, ts: u64) {
    harness.engine.execute(&submit_command(order));
    harness.engine.process(&submitted_event(order, ts));
    harness.engine.process(&accepted_event(order, venue_order_id, ts + 1));
}

#[rstest]
fn test_happy_path_limit_order_lifecycle() {
    let mut harness = harness(Default::default());
    let order = limit_order("O-1", OrderSide::Buy, 100_000, "1.00000");

    harness.engine.execute(&submit_command(&order));

    // Command reached the client and the order is cached in-flight
    assert_eq!(harness.recorded.borrow().len(), 1);
    assert!(harness.cache.borrow().order_exists(&order.client_order_id()));
    assert_eq!(harness.engine.inflight_commands().len(), 1);

    // The order's notional is locked on submit
    {
        let cache = harness.cache.borrow();
        let account = cache.account(&AccountId::from("SIM-001")).unwrap();
        let balance = account.balance(Some(Currency::USD())).unwrap();
        assert_eq!(balance.total, Money::new(1_000_000.00, Currency::USD()));
        assert_eq!(balance.locked, Money::new(100_000.00, Currency::USD()));
        assert_eq!(balance.free, Money::new(900_000.00, Currency::USD()));
    }

    harness.engine.process(&submitted_event(&order, 1));
    harness.engine.process(&accepted_event(&order, "V-1", 2));

    // Acknowledgement resolves the in-flight command
    assert!(harness.engine.inflight_commands().is_empty());

    let order_ref = harness
        .cache
        .borrow()
        .order(&order.client_order_id())
        .cloned()
        .unwrap();
    harness.engine.process(&filled_event(
        &order_ref,
        "T-1",
        100_000,
        "1.00010",
        Some(Money::new(2.0, Currency::USD())),
        3,
    ));

    // Order is terminal filled with expected quantities
    let cache = harness.cache.borrow();
    let order = cache.order(&order.client_order_id()).unwrap();
    assert_eq!(order.status(), helm_model::enums::OrderStatus::Filled);
    assert_eq!(order.filled_qty(), Quantity::from(100_000_u64));
    assert_eq!(order.avg_px(), Some(1.0001));

    // Strategy observed Submitted -> Accepted -> Filled
    let published = harness.published.borrow();
    let kinds: Vec<_> = published.iter().map(OrderEventAny::event_type).collect();
    assert_eq!(
        kinds,
        vec![
            helm_model::events::OrderEventType::Submitted,
            helm_model::events::OrderEventType::Accepted,
            helm_model::events::OrderEventType::Filled,
        ]
    );

    // Position opened LONG 100,000 @ 1.0001
    let position_id = PositionId::new("AUD/USD.SIM-S-001");
    let position = cache.position(&position_id).unwrap();
    assert!(position.is_long());
    assert_eq!(position.quantity, Quantity::from(100_000_u64));
    assert_eq!(position.avg_px_open, 1.0001);

    // The fill released the original lock and debited notional + commission
    let account = cache.account(&AccountId::from("SIM-001")).unwrap();
    let balance = account.balance(Some(Currency::USD())).unwrap();
    assert_eq!(balance.locked, Money::new(0.00, Currency::USD()));
    assert_eq!(balance.total, Money::new(899_988.00, Currency::USD()));
    assert_eq!(balance.free, Money::new(899_988.00, Currency::USD()));
}

#[rstest]
fn test_balance_lock_released_on_cancel() {
    let mut harness = harness(Default::default());
    let order = limit_order("O-1", OrderSide::Buy, 100_000, "1.00000");
    submit_and_accept(&mut harness, &order, "V-1", 1);

    {
        let cache = harness.cache.borrow();
        let account = cache.account(&AccountId::from("SIM-001")).unwrap();
        let balance = account.balance(Some(Currency::USD())).unwrap();
        assert_eq!(balance.locked, Money::new(100_000.00, Currency::USD()));
    }

    let order = harness.cache.borrow().order(&order.client_order_id()).cloned().unwrap();
    let canceled = OrderEventAny::Canceled(OrderCanceled::new(
        order.trader_id(),
        order.strategy_id(),
        order.instrument_id(),
        order.client_order_id(),
        UUID4::new(),
        UnixNanos::from(5),
        UnixNanos::from(5),
        false,
        order.venue_order_id(),
        order.account_id(),
    ));
    harness.engine.process(&canceled);

    // The full lock is handed back; totals are untouched
    let cache = harness.cache.borrow();
    let account = cache.account(&AccountId::from("SIM-001")).unwrap();
    let balance = account.balance(Some(Currency::USD())).unwrap();
    assert_eq!(balance.locked, Money::new(0.00, Currency::USD()));
    assert_eq!(balance.total, Money::new(1_000_000.00, Currency::USD()));
    assert_eq!(balance.free, Money::new(1_000_000.00, Currency::USD()));
}

#[rstest]
fn test_balance_lock_partial_release_on_partial_fill() {
    let mut harness = harness(Default::default());
    let order = limit_order("O-1", OrderSide::Buy, 100_000, "1.00000");
    submit_and_accept(&mut harness, &order, "V-1", 1);

    let order = harness.cache.borrow().order(&order.client_order_id()).cloned().unwrap();
    harness
        .engine
        .process(&filled_event(&order, "T-1", 40_000, "1.00000", None, 3));

    // 40% filled: 40% of the lock released, the remainder still held
    let cache = harness.cache.borrow();
    let account = cache.account(&AccountId::from("SIM-001")).unwrap();
    let balance = account.balance(Some(Currency::USD())).unwrap();
    assert_eq!(balance.locked, Money::new(60_000.00, Currency::USD()));
    assert_eq!(balance.total, Money::new(960_000.00, Currency::USD()));
    assert_eq!(balance.free, Money::new(900_000.00, Currency::USD()));
}

#[rstest]
fn test_post_only_denied_when_unsupported() {
    let capabilities = crate::client::ExecutionClientCapabilities {
        supports_post_only: false,
        ..Default::default()
    };
    let mut harness = harness(capabilities);

    let order = OrderTestBuilder::new(OrderType::Limit)
        .instrument_id(InstrumentId::from("AUD/USD.SIM"))
        .client_order_id(ClientOrderId::from("O-1"))
        .side(OrderSide::Buy)
        .quantity(Quantity::from(100_000_u64))
        .price(Price::from("1.00000"))
        .post_only(true)
        .build();

    harness.engine.execute(&submit_command(&order));

    // No venue call occurred and no state remains in the cache
    assert!(harness.recorded.borrow().is_empty());
    assert!(!harness.cache.borrow().order_exists(&order.client_order_id()));

    // A single denial with the well-defined reason
    let published = harness.published.borrow();
    assert_eq!(published.len(), 1);
    match &published[0] {
        OrderEventAny::Denied(denied) => {
            assert_eq!(denied.reason.as_str(), "POST_ONLY_NOT_SUPPORTED");
        }
        event => panic!("Expected OrderDenied, was {event}"),
    }
}

#[rstest]
fn test_duplicate_client_order_id_denied() {
    let mut harness = harness(Default::default());
    let order = limit_order("O-1", OrderSide::Buy, 100_000, "1.00000");

    harness.engine.execute(&submit_command(&order));
    harness.engine.execute(&submit_command(&order));

    assert_eq!(harness.recorded.borrow().len(), 1);
    let published = harness.published.borrow();
    let denied: Vec<_> = published
        .iter()
        .filter_map(|event| match event {
            OrderEventAny::Denied(denied) => Some(denied.reason.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(denied, vec!["DUPLICATE_CLIENT_ORDER_ID"]);
}

#[rstest]
fn test_unsupported_time_in_force_denied() {
    let capabilities = crate::client::ExecutionClientCapabilities {
        supported_time_in_force: vec![TimeInForce::Gtc, TimeInForce::Ioc],
        ..Default::default()
    };
    let mut harness = harness(capabilities);

    let order = OrderTestBuilder::new(OrderType::Limit)
        .instrument_id(InstrumentId::from("AUD/USD.SIM"))
        .client_order_id(ClientOrderId::from("O-1"))
        .side(OrderSide::Buy)
        .quantity(Quantity::from(100_000_u64))
        .price(Price::from("1.00000"))
        .time_in_force(TimeInForce::AtTheOpen)
        .build();

    harness.engine.execute(&submit_command(&order));

    assert!(harness.recorded.borrow().is_empty());
    let published = harness.published.borrow();
    assert_eq!(published.len(), 1);
    assert!(matches!(&published[0], OrderEventAny::Denied(denied)
        if denied.reason.as_str().starts_with("UNSUPPORTED_TIME_IN_FORCE")));
}

#[rstest]
fn test_price_precision_mismatch_denied() {
    let mut harness = harness(Default::default());

    // Price precision 3 against an instrument with precision 5
    let order = limit_order("O-1", OrderSide::Buy, 100_000, "1.000");
    harness.engine.execute(&submit_command(&order));

    assert!(harness.recorded.borrow().is_empty());
    let published = harness.published.borrow();
    assert!(matches!(&published[0], OrderEventAny::Denied(denied)
        if denied.reason.as_str().starts_with("PRICE_PRECISION_MISMATCH")));
}

#[rstest]
fn test_size_below_min_denied() {
    let mut harness = harness(Default::default());

    // audusd_sim min quantity is 100
    let order = limit_order("O-1", OrderSide::Buy, 50, "1.00000");
    harness.engine.execute(&submit_command(&order));

    assert!(harness.recorded.borrow().is_empty());
    let published = harness.published.borrow();
    assert!(matches!(&published[0], OrderEventAny::Denied(denied)
        if denied.reason.as_str().starts_with("SIZE_BELOW_MIN")));
}

#[rstest]
fn test_netting_close_and_reopen_snapshots_cycle() {
    let mut harness = harness(Default::default());
    let commission = Money::new(2.0, Currency::USD());

    let order1 = limit_order("O-1", OrderSide::Buy, 100_000, "0.80000");
    submit_and_accept(&mut harness, &order1, "V-1", 1);
    let order1 = harness.cache.borrow().order(&order1.client_order_id()).cloned().unwrap();
    harness.engine.process(&filled_event(
        &order1,
        "T-1",
        100_000,
        "0.80000",
        Some(commission),
        10,
    ));

    let position_id = PositionId::new("AUD/USD.SIM-S-001");
    assert!(harness.cache.borrow().position(&position_id).unwrap().is_long());

    // Close to flat
    let order2 = limit_order("O-2", OrderSide::Sell, 100_000, "0.80010");
    submit_and_accept(&mut harness, &order2, "V-2", 20);
    let order2 = harness.cache.borrow().order(&order2.client_order_id()).cloned().unwrap();
    harness.engine.process(&filled_event(
        &order2,
        "T-2",
        100_000,
        "0.80010",
        Some(commission),
        30,
    ));

    {
        let cache = harness.cache.borrow();
        let position = cache.position(&position_id).unwrap();
        assert!(position.is_closed());
        // (0.80010 - 0.80000) * 100,000 - 2 * commission
        assert_eq!(position.realized_pnl, Some(Money::new(6.0, Currency::USD())));
        // Not yet snapshotted: snapshot happens on reopen
        assert!(cache.position_snapshots(&position_id).unwrap().is_empty());
    }

    // Reopen the same position ID
    let order3 = limit_order("O-3", OrderSide::Buy, 50_000, "0.80020");
    submit_and_accept(&mut harness, &order3, "V-3", 40);
    let order3 = harness.cache.borrow().order(&order3.client_order_id()).cloned().unwrap();
    harness.engine.process(&filled_event(
        &order3,
        "T-3",
        50_000,
        "0.80020",
        Some(Money::new(1.0, Currency::USD())),
        50,
    ));

    let cache = harness.cache.borrow();

    // The completed cycle was snapshotted before the reopening fill applied
    let snapshots = cache.position_snapshots(&position_id).unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].realized_pnl, Some(Money::new(6.0, Currency::USD())));
    assert!(snapshots[0].is_closed());

    // The current cycle reopened with fresh state
    let position = cache.position(&position_id).unwrap();
    assert!(position.is_long());
    assert_eq!(position.quantity, Quantity::from(50_000_u64));
    assert_eq!(position.avg_px_open, 0.8002);
    assert_eq!(position.realized_pnl, Some(Money::new(-1.0, Currency::USD())));

    // Portfolio realized PnL sums snapshots + current
    let total: f64 = snapshots
        .iter()
        .filter_map(|snapshot| snapshot.realized_pnl)
        .map(|pnl| pnl.as_f64())
        .sum::<f64>()
        + position.realized_pnl.unwrap().as_f64();
    assert_eq!(total, 5.0);
}

#[rstest]
fn test_side_specific_cancel_all_denied_when_unsupported() {
    let capabilities = crate::client::ExecutionClientCapabilities {
        supports_side_specific_cancel_all: false,
        ..Default::default()
    };
    let mut harness = harness(capabilities);

    let order = limit_order("O-1", OrderSide::Buy, 100_000, "1.00000");
    submit_and_accept(&mut harness, &order, "V-1", 1);
    assert_eq!(harness.recorded.borrow().len(), 1); // The submit only

    let command = TradingCommand::CancelAllOrders(CancelAllOrders::new(
        TraderId::default(),
        ClientId::from("SIM"),
        order.strategy_id(),
        order.instrument_id(),
        OrderSide::Buy,
        UUID4::new(),
        UnixNanos::default(),
    ));
    harness.engine.execute(&command);

    // The venue was never contacted
    assert_eq!(harness.recorded.borrow().len(), 1);

    // A cancel reject with the typed reason was published for the open order
    let published = harness.published.borrow();
    let rejects: Vec<_> = published
        .iter()
        .filter_map(|event| match event {
            OrderEventAny::CancelRejected(event) => Some(event.reason.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(rejects, vec!["SIDE_SPECIFIC_CANCEL_ALL_NOT_SUPPORTED"]);

    // The order remains open
    assert!(harness.cache.borrow().is_order_open(&order.client_order_id()));
}

#[rstest]
fn test_unrestricted_cancel_all_reaches_client() {
    let capabilities = crate::client::ExecutionClientCapabilities {
        supports_side_specific_cancel_all: false,
        ..Default::default()
    };
    let mut harness = harness(capabilities);

    let command = TradingCommand::CancelAllOrders(CancelAllOrders::new(
        TraderId::default(),
        ClientId::from("SIM"),
        helm_model::identifiers::StrategyId::default(),
        InstrumentId::from("AUD/USD.SIM"),
        OrderSide::NoOrderSide,
        UUID4::new(),
        UnixNanos::default(),
    ));
    harness.engine.execute(&command);

    assert_eq!(harness.recorded.borrow().len(), 1);
    assert!(matches!(
        harness.recorded.borrow()[0],
        RecordedCommand::CancelAll(_)
    ));
}

#[rstest]
fn test_fill_wins_over_late_cancel() {
    let mut harness = harness(Default::default());

    let order = limit_order("O-1", OrderSide::Buy, 100_000, "1.00000");
    submit_and_accept(&mut harness, &order, "V-1", 1);
    let order = harness.cache.borrow().order(&order.client_order_id()).cloned().unwrap();
    harness
        .engine
        .process(&filled_event(&order, "T-1", 100_000, "1.00000", None, 3));

    // A cancel acknowledgement racing the fill arrives late
    let late_cancel = OrderEventAny::Canceled(OrderCanceled::new(
        order.trader_id(),
        order.strategy_id(),
        order.instrument_id(),
        order.client_order_id(),
        UUID4::new(),
        UnixNanos::from(4),
        UnixNanos::from(4),
        false,
        order.venue_order_id(),
        order.account_id(),
    ));
    harness.engine.process(&late_cancel);

    // The fill wins: the order stays terminal FILLED
    let cache = harness.cache.borrow();
    let order = cache.order(&order.client_order_id()).unwrap();
    assert_eq!(order.status(), helm_model::enums::OrderStatus::Filled);

    // The late cancel was not republished as an order mutation
    let published = harness.published.borrow();
    assert!(!published
        .iter()
        .any(|event| event.event_type() == helm_model::events::OrderEventType::Canceled));
}

#[rstest]
fn test_event_for_unknown_order_resolved_by_venue_order_id() {
    let mut harness = harness(Default::default());

    let order = limit_order("O-1", OrderSide::Buy, 100_000, "1.00000");
    submit_and_accept(&mut harness, &order, "V-1", 1);

    // An event arriving with an unknown client order ID but known venue ID
    let event = OrderEventAny::Canceled(OrderCanceled::new(
        TraderId::default(),
        order.strategy_id(),
        order.instrument_id(),
        ClientOrderId::from("UNKNOWN-EXTERNAL-ID"),
        UUID4::new(),
        UnixNanos::from(5),
        UnixNanos::from(5),
        false,
        Some(VenueOrderId::from("V-1")),
        None,
    ));
    harness.engine.process(&event);

    let cache = harness.cache.borrow();
    let order = cache.order(&order.client_order_id()).unwrap();
    assert_eq!(order.status(), helm_model::enums::OrderStatus::Canceled);
}

#[rstest]
fn test_clock_advances_are_visible_to_engine_timestamps() {
    let harness = harness(Default::default());
    harness
        .clock
        .borrow_mut()
        .set_time(UnixNanos::from(1_000_000_000));
    assert_eq!(
        harness.clock.borrow().timestamp_ns(),
        UnixNanos::from(1_000_000_000)
    );
}
