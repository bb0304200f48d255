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

use helm_core::{UUID4, UnixNanos};
use helm_model::{
    accounts::{AccountAny, CashAccount},
    enums::{AccountType, OmsType, OrderSide, OrderType},
    events::{AccountState, OrderAccepted, OrderEventAny, OrderFilled, OrderSubmitted},
    identifiers::{
        AccountId, ClientOrderId, InstrumentId, PositionId, StrategyId, TradeId, Venue,
        VenueOrderId,
    },
    instruments::{InstrumentAny, stubs::audusd_sim},
    orders::builder::OrderTestBuilder,
    position::Position,
    types::{AccountBalance, Currency, Money, Price, Quantity},
};
use rstest::rstest;

use super::*;

fn test_order(client_order_id: &str) -> OrderAny {
    OrderTestBuilder::new(OrderType::Limit)
        .instrument_id(InstrumentId::from("AUD/USD.SIM"))
        .client_order_id(ClientOrderId::from(client_order_id))
        .side(OrderSide::Buy)
        .quantity(Quantity::from(100_000_u64))
        .price(Price::from("1.00000"))
        .build()
}

fn accepted_order(client_order_id: &str, venue_order_id: &str) -> OrderAny {
    let mut order = test_order(client_order_id);
    order
        .apply(OrderEventAny::Submitted(OrderSubmitted::new(
            order.trader_id(),
            order.strategy_id(),
            order.instrument_id(),
            order.client_order_id(),
            AccountId::default(),
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
            AccountId::default(),
            UUID4::new(),
            UnixNanos::from(2),
            UnixNanos::from(2),
            false,
        )))
        .unwrap();
    order
}

fn test_fill(client_order_id: &str, position_id: &str, ts_event: u64) -> OrderFilled {
    OrderFilled {
        client_order_id: ClientOrderId::from(client_order_id),
        instrument_id: InstrumentId::from("AUD/USD.SIM"),
        trade_id: TradeId::from(format!("T-{ts_event}").as_str()),
        last_qty: Quantity::from(100_000_u64),
        last_px: Price::from("0.80000"),
        position_id: Some(PositionId::from(position_id)),
        ts_event: UnixNanos::from(ts_event),
        ..Default::default()
    }
}

#[rstest]
fn test_add_order_and_query() {
    let mut cache = Cache::default();
    let order = test_order("O-1");
    cache.add_order(order.clone(), None, None, false).unwrap();

    assert!(cache.order_exists(&order.client_order_id()));
    assert_eq!(cache.orders_total_count(), 1);
    assert_eq!(
        cache.order(&order.client_order_id()).unwrap().client_order_id(),
        order.client_order_id()
    );
    assert_eq!(
        cache
            .orders(None, Some(&order.instrument_id()), None)
            .len(),
        1
    );
    assert_eq!(
        cache
            .orders(Some(&Venue::from("BINANCE")), None, None)
            .len(),
        0
    );
}

#[rstest]
fn test_duplicate_client_order_id_rejected() {
    let mut cache = Cache::default();
    cache.add_order(test_order("O-1"), None, None, false).unwrap();
    assert!(cache.add_order(test_order("O-1"), None, None, false).is_err());
}

#[rstest]
fn test_update_order_maintains_state_indexes() {
    let mut cache = Cache::default();
    let order = test_order("O-1");
    let client_order_id = order.client_order_id();
    cache.add_order(order, None, None, false).unwrap();

    let accepted = accepted_order("O-1", "V-1");
    cache.update_order(&accepted).unwrap();

    assert!(cache.is_order_open(&client_order_id));
    assert!(!cache.is_order_closed(&client_order_id));
    assert!(!cache.is_order_inflight(&client_order_id));
    assert_eq!(cache.orders_open(None, None, None).len(), 1);
    assert_eq!(
        cache.client_order_id(&VenueOrderId::from("V-1")),
        Some(&client_order_id)
    );
    assert_eq!(
        cache.venue_order_id(&client_order_id),
        Some(&VenueOrderId::from("V-1"))
    );
    assert!(cache.check_integrity());
}

#[rstest]
fn test_add_position_and_query() {
    let mut cache = Cache::default();
    let instrument = InstrumentAny::CurrencyPair(audusd_sim());
    let position = Position::new(&instrument, test_fill("O-1", "P-1", 1));
    cache.add_position(position, OmsType::Netting).unwrap();

    let position_id = PositionId::from("P-1");
    assert!(cache.position_exists(&position_id));
    assert!(cache.is_position_open(&position_id));
    assert_eq!(cache.positions_open(None, None).len(), 1);
    assert_eq!(cache.positions_open_count(), 1);
    assert_eq!(
        cache.position_for_order(&ClientOrderId::from("O-1")).unwrap().id,
        position_id
    );
}

#[rstest]
fn test_snapshot_position_round_trip() {
    let mut cache = Cache::default();
    let instrument = InstrumentAny::CurrencyPair(audusd_sim());
    let mut position = Position::new(&instrument, test_fill("O-1", "P-1", 1));

    // Close the position then snapshot the completed cycle
    let mut closing_fill = test_fill("O-2", "P-1", 2);
    closing_fill.order_side = OrderSide::Sell;
    closing_fill.last_px = Price::from("0.80010");
    position.apply(&closing_fill);
    assert!(position.is_closed());

    cache.snapshot_position(&position).unwrap();

    let snapshots = cache.position_snapshots(&position.id).unwrap();
    assert_eq!(snapshots.len(), 1);
    // All observable fields restore from the snapshot
    assert_eq!(snapshots[0], position);
}

#[rstest]
fn test_purge_closed_orders_honors_buffer() {
    let mut cache = Cache::default();
    let order = test_order("O-1");
    let client_order_id = order.client_order_id();
    cache.add_order(order, None, None, false).unwrap();

    let mut closed = accepted_order("O-1", "V-1");
    closed
        .apply(OrderEventAny::Canceled(
            helm_model::events::OrderCanceled::new(
                closed.trader_id(),
                closed.strategy_id(),
                closed.instrument_id(),
                closed.client_order_id(),
                UUID4::new(),
                UnixNanos::from(3),
                UnixNanos::from(3),
                false,
                closed.venue_order_id(),
                closed.account_id(),
            ),
        ))
        .unwrap();
    cache.update_order(&closed).unwrap();
    assert!(cache.is_order_closed(&client_order_id));

    // Within the buffer window: not purged
    cache.purge_closed_orders(UnixNanos::from(5), 60);
    assert!(cache.order_exists(&client_order_id));

    // Outside the buffer window: purged
    cache.purge_closed_orders(UnixNanos::from(secs_to_nanos(61.0)), 60);
    assert!(!cache.order_exists(&client_order_id));
    assert_eq!(cache.orders_total_count(), 0);
}

#[rstest]
fn test_account_queries() {
    let mut cache = Cache::default();
    let balance = AccountBalance::new(
        Money::from("100000.00 USD"),
        Money::from("0.00 USD"),
        Money::from("100000.00 USD"),
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
    cache.add_account(account).unwrap();

    let venue = Venue::from("SIM");
    assert_eq!(cache.account_id(&venue), Some(&AccountId::from("SIM-001")));
    assert!(cache.account_for_venue(&venue).is_some());
    assert!(cache.account(&AccountId::from("SIM-001")).is_some());
}

#[rstest]
fn test_quote_and_trade_lookups() {
    let mut cache = Cache::default();
    let instrument_id = InstrumentId::from("AUD/USD.SIM");

    let quote = helm_model::data::QuoteTick::new(
        instrument_id,
        Price::from("0.80000"),
        Price::from("0.80010"),
        Quantity::from(1_000_000_u64),
        Quantity::from(1_000_000_u64),
        UnixNanos::from(1),
        UnixNanos::from(1),
    );
    cache.add_quote(quote);
    assert_eq!(cache.quote(&instrument_id), Some(&quote));

    let newer_quote = helm_model::data::QuoteTick {
        bid_price: Price::from("0.80005"),
        ts_event: UnixNanos::from(2),
        ..quote
    };
    cache.add_quote(newer_quote);
    assert_eq!(cache.quote(&instrument_id), Some(&newer_quote));
}

#[rstest]
fn test_reset_clears_everything() {
    let mut cache = Cache::default();
    cache.add_order(test_order("O-1"), None, None, false).unwrap();
    let instrument = InstrumentAny::CurrencyPair(audusd_sim());
    cache.add_instrument(instrument.clone()).unwrap();

    cache.reset();

    assert_eq!(cache.orders_total_count(), 0);
    assert!(cache.instrument(&instrument.id()).is_none());
}

#[rstest]
fn test_check_residuals_reports_open_state() {
    let mut cache = Cache::default();
    assert!(!cache.check_residuals());

    cache
        .update_order(&accepted_order("O-1", "V-1"))
        .unwrap();
    assert!(cache.check_residuals());
}
