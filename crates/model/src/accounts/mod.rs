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

//! Account types for the trading domain model.

pub mod base;
pub mod cash;
pub mod margin;

use std::collections::HashMap;

use helm_core::UnixNanos;
use serde::{Deserialize, Serialize};

// Re-exports
pub use self::{base::BaseAccount, cash::CashAccount, margin::MarginAccount};
use crate::{
    enums::{AccountType, LiquiditySide, OrderSide},
    events::{AccountState, OrderFilled},
    identifiers::AccountId,
    instruments::InstrumentAny,
    position::Position,
    types::{AccountBalance, Currency, Money, Price, Quantity},
};

/// The interface implemented by every account type.
pub trait Account: 'static + Send {
    fn id(&self) -> AccountId;
    fn account_type(&self) -> AccountType;
    fn base_currency(&self) -> Option<Currency>;
    fn balance(&self, currency: Option<Currency>) -> Option<&AccountBalance>;
    fn balance_total(&self, currency: Option<Currency>) -> Option<Money>;
    fn balance_free(&self, currency: Option<Currency>) -> Option<Money>;
    fn balance_locked(&self, currency: Option<Currency>) -> Option<Money>;
    fn balances(&self) -> HashMap<Currency, AccountBalance>;
    fn starting_balances(&self) -> HashMap<Currency, Money>;
    fn currencies(&self) -> Vec<Currency>;
    fn last_event(&self) -> Option<AccountState>;
    fn events(&self) -> Vec<AccountState>;
    fn event_count(&self) -> usize;

    /// Applies the given authoritative account state event, replacing
    /// balances wholesale.
    fn apply(&mut self, event: AccountState);

    /// Purges account state events outside the lookback window, always
    /// retaining at least the latest event.
    fn purge_account_events(&mut self, ts_now: UnixNanos, lookback_secs: u64);

    /// Calculates the balance to lock for a new order.
    ///
    /// # Errors
    ///
    /// Returns an error if the calculation fails.
    fn calculate_balance_locked(
        &mut self,
        instrument: &InstrumentAny,
        side: OrderSide,
        quantity: Quantity,
        price: Price,
        use_quote_for_inverse: Option<bool>,
    ) -> anyhow::Result<Money>;

    /// Calculates the PnL amounts generated by the given fill.
    ///
    /// # Errors
    ///
    /// Returns an error if the calculation fails.
    fn calculate_pnls(
        &self,
        instrument: &InstrumentAny,
        fill: &OrderFilled,
        position: Option<&Position>,
    ) -> anyhow::Result<Vec<Money>>;

    /// Calculates the commission for the given execution.
    ///
    /// # Errors
    ///
    /// Returns an error if the calculation fails.
    fn calculate_commission(
        &self,
        instrument: &InstrumentAny,
        last_qty: Quantity,
        last_px: Price,
        liquidity_side: LiquiditySide,
        use_quote_for_inverse: Option<bool>,
    ) -> anyhow::Result<Money>;
}

/// Wraps an account type allowing polymorphism.
///
/// A betting account follows cash semantics with event-denominated locked
/// funds, so it is represented by [`CashAccount`] with
/// [`AccountType::Betting`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccountAny {
    Cash(CashAccount),
    Margin(MarginAccount),
}

impl AccountAny {
    /// Creates an account from the given authoritative state event.
    #[must_use]
    pub fn from_state(event: AccountState) -> Self {
        match event.account_type {
            AccountType::Cash | AccountType::Betting => Self::Cash(CashAccount::new(event)),
            AccountType::Margin => Self::Margin(MarginAccount::new(event)),
        }
    }

    #[must_use]
    pub fn id(&self) -> AccountId {
        match self {
            Self::Cash(account) => account.id(),
            Self::Margin(account) => account.id(),
        }
    }

    #[must_use]
    pub fn account_type(&self) -> AccountType {
        match self {
            Self::Cash(account) => account.account_type(),
            Self::Margin(account) => account.account_type(),
        }
    }

    #[must_use]
    pub fn base_currency(&self) -> Option<Currency> {
        match self {
            Self::Cash(account) => account.base_currency(),
            Self::Margin(account) => account.base_currency(),
        }
    }

    #[must_use]
    pub fn balance(&self, currency: Option<Currency>) -> Option<&AccountBalance> {
        match self {
            Self::Cash(account) => account.balance(currency),
            Self::Margin(account) => account.balance(currency),
        }
    }

    #[must_use]
    pub fn balances(&self) -> HashMap<Currency, AccountBalance> {
        match self {
            Self::Cash(account) => account.balances(),
            Self::Margin(account) => account.balances(),
        }
    }

    #[must_use]
    pub fn last_event(&self) -> Option<AccountState> {
        match self {
            Self::Cash(account) => account.last_event(),
            Self::Margin(account) => account.last_event(),
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<AccountState> {
        match self {
            Self::Cash(account) => account.events(),
            Self::Margin(account) => account.events(),
        }
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        match self {
            Self::Cash(account) => account.event_count(),
            Self::Margin(account) => account.event_count(),
        }
    }

    pub fn apply(&mut self, event: AccountState) {
        match self {
            Self::Cash(account) => account.apply(event),
            Self::Margin(account) => account.apply(event),
        }
    }

    pub fn purge_account_events(&mut self, ts_now: UnixNanos, lookback_secs: u64) {
        match self {
            Self::Cash(account) => account.purge_account_events(ts_now, lookback_secs),
            Self::Margin(account) => account.purge_account_events(ts_now, lookback_secs),
        }
    }

    /// Calculates the balance to lock for a new order.
    ///
    /// # Errors
    ///
    /// Returns an error if the calculation fails.
    pub fn calculate_balance_locked(
        &mut self,
        instrument: &InstrumentAny,
        side: OrderSide,
        quantity: Quantity,
        price: Price,
        use_quote_for_inverse: Option<bool>,
    ) -> anyhow::Result<Money> {
        match self {
            Self::Cash(account) => account.calculate_balance_locked(
                instrument,
                side,
                quantity,
                price,
                use_quote_for_inverse,
            ),
            Self::Margin(account) => account.calculate_balance_locked(
                instrument,
                side,
                quantity,
                price,
                use_quote_for_inverse,
            ),
        }
    }

    /// Calculates the PnL amounts generated by the given fill.
    ///
    /// # Errors
    ///
    /// Returns an error if the calculation fails.
    pub fn calculate_pnls(
        &self,
        instrument: &InstrumentAny,
        fill: &OrderFilled,
        position: Option<&Position>,
    ) -> anyhow::Result<Vec<Money>> {
        match self {
            Self::Cash(account) => account.calculate_pnls(instrument, fill, position),
            Self::Margin(account) => account.calculate_pnls(instrument, fill, position),
        }
    }

    /// Calculates the commission for the given execution.
    ///
    /// # Errors
    ///
    /// Returns an error if the calculation fails.
    pub fn calculate_commission(
        &self,
        instrument: &InstrumentAny,
        last_qty: Quantity,
        last_px: Price,
        liquidity_side: LiquiditySide,
        use_quote_for_inverse: Option<bool>,
    ) -> anyhow::Result<Money> {
        match self {
            Self::Cash(account) => account.calculate_commission(
                instrument,
                last_qty,
                last_px,
                liquidity_side,
                use_quote_for_inverse,
            ),
            Self::Margin(account) => account.calculate_commission(
                instrument,
                last_qty,
                last_px,
                liquidity_side,
                use_quote_for_inverse,
            ),
        }
    }
}
