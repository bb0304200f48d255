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

//! Canonical message bus topics and endpoint addresses.

use std::cell::RefCell;

use ahash::AHashMap;
use helm_model::identifiers::{AccountId, InstrumentId, PositionId, StrategyId};
use ustr::Ustr;

/// The execution engine event-processing endpoint address.
pub const EXEC_ENGINE_PROCESS: &str = "ExecEngine.process";

/// The execution engine account-state endpoint address.
pub const EXEC_ENGINE_PROCESS_ACCOUNT: &str = "ExecEngine.process_account";

/// The execution engine command-execution endpoint address.
pub const EXEC_ENGINE_EXECUTE: &str = "ExecEngine.execute";

/// The execution engine reconciliation endpoint address.
pub const EXEC_ENGINE_RECONCILE: &str = "ExecEngine.reconcile";

/// The portfolio account-update endpoint address.
pub const PORTFOLIO_UPDATE_ACCOUNT: &str = "Portfolio.update_account";

thread_local! {
    static ACCOUNT_TOPICS: RefCell<AHashMap<AccountId, Ustr>> = RefCell::new(AHashMap::new());
    static ORDER_TOPICS: RefCell<AHashMap<StrategyId, Ustr>> = RefCell::new(AHashMap::new());
    static POSITION_TOPICS: RefCell<AHashMap<StrategyId, Ustr>> = RefCell::new(AHashMap::new());
    static SNAPSHOT_TOPICS: RefCell<AHashMap<PositionId, Ustr>> = RefCell::new(AHashMap::new());
    static QUOTE_TOPICS: RefCell<AHashMap<InstrumentId, Ustr>> = RefCell::new(AHashMap::new());
    static TRADE_TOPICS: RefCell<AHashMap<InstrumentId, Ustr>> = RefCell::new(AHashMap::new());
}

/// Returns the canonical account events topic for the given account.
#[must_use]
pub fn get_event_accounts_topic(account_id: AccountId) -> Ustr {
    ACCOUNT_TOPICS.with(|cache| {
        *cache
            .borrow_mut()
            .entry(account_id)
            .or_insert_with(|| Ustr::from(&format!("events.account.{account_id}")))
    })
}

/// Returns the canonical order events topic for the given strategy.
#[must_use]
pub fn get_event_orders_topic(strategy_id: StrategyId) -> Ustr {
    ORDER_TOPICS.with(|cache| {
        *cache
            .borrow_mut()
            .entry(strategy_id)
            .or_insert_with(|| Ustr::from(&format!("events.order.{strategy_id}")))
    })
}

/// Returns the canonical position events topic for the given strategy.
#[must_use]
pub fn get_event_positions_topic(strategy_id: StrategyId) -> Ustr {
    POSITION_TOPICS.with(|cache| {
        *cache
            .borrow_mut()
            .entry(strategy_id)
            .or_insert_with(|| Ustr::from(&format!("events.position.{strategy_id}")))
    })
}

/// Returns the canonical position snapshots topic for the given position.
#[must_use]
pub fn get_positions_snapshots_topic(position_id: PositionId) -> Ustr {
    SNAPSHOT_TOPICS.with(|cache| {
        *cache
            .borrow_mut()
            .entry(position_id)
            .or_insert_with(|| Ustr::from(&format!("snapshots.positions.{position_id}")))
    })
}

/// Returns the canonical quotes topic for the given instrument.
#[must_use]
pub fn get_quotes_topic(instrument_id: InstrumentId) -> Ustr {
    QUOTE_TOPICS.with(|cache| {
        *cache.borrow_mut().entry(instrument_id).or_insert_with(|| {
            Ustr::from(&format!(
                "data.quotes.{}.{}",
                instrument_id.venue, instrument_id.symbol
            ))
        })
    })
}

/// Returns the canonical trades topic for the given instrument.
#[must_use]
pub fn get_trades_topic(instrument_id: InstrumentId) -> Ustr {
    TRADE_TOPICS.with(|cache| {
        *cache.borrow_mut().entry(instrument_id).or_insert_with(|| {
            Ustr::from(&format!(
                "data.trades.{}.{}",
                instrument_id.venue, instrument_id.symbol
            ))
        })
    })
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_topic_construction_and_caching() {
        let strategy_id = StrategyId::from("EMACross-001");
        let topic = get_event_orders_topic(strategy_id);
        assert_eq!(topic.as_str(), "events.order.EMACross-001");
        // Cached value is identical on repeat access
        assert_eq!(get_event_orders_topic(strategy_id), topic);
    }

    #[rstest]
    fn test_data_topics() {
        let instrument_id = InstrumentId::from("AUD/USD.SIM");
        assert_eq!(
            get_quotes_topic(instrument_id).as_str(),
            "data.quotes.SIM.AUD/USD"
        );
        assert_eq!(
            get_trades_topic(instrument_id).as_str(),
            "data.trades.SIM.AUD/USD"
        );
    }
}
