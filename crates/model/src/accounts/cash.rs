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

//! A cash account with unleveraged balances.

use std::{
    collections::HashMap,
    fmt::Display,
    ops::{Deref, DerefMut},
};

use helm_core::UnixNanos;
use serde::{Deserialize, Serialize};

use crate::{
    accounts::{Account, base::BaseAccount},
    enums::{AccountType, LiquiditySide, OrderSide},
    events::{AccountState, OrderFilled},
    identifiers::AccountId,
    instruments::InstrumentAny,
    position::Position,
    types::{AccountBalance, Currency, Money, Price, Quantity},
};

/// Provides a cash account holding one balance per currency.
///
/// Invariant per balance: `free = total - locked`. A betting account follows
/// the same semantics with event-denominated locked funds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashAccount {
    pub base: BaseAccount,
}

impl CashAccount {
    /// Creates a new [`CashAccount`] instance from the given state event.
    #[must_use]
    pub fn new(event: AccountState) -> Self {
        Self {
            base: BaseAccount::new(event),
        }
    }
}

impl Account for CashAccount {
    fn id(&self) -> AccountId {
        self.id
    }

    fn account_type(&self) -> AccountType {
        self.account_type
    }

    fn base_currency(&self) -> Option<Currency> {
        self.base_currency
    }

    fn balance(&self, currency: Option<Currency>) -> Option<&AccountBalance> {
        self.base_balance(currency)
    }

    fn balance_total(&self, currency: Option<Currency>) -> Option<Money> {
        self.base_balance(currency).map(|balance| balance.total)
    }

    fn balance_free(&self, currency: Option<Currency>) -> Option<Money> {
        self.base_balance(currency).map(|balance| balance.free)
    }

    fn balance_locked(&self, currency: Option<Currency>) -> Option<Money> {
        self.base_balance(currency).map(|balance| balance.locked)
    }

    fn balances(&self) -> HashMap<Currency, AccountBalance> {
        self.base.balances.clone()
    }

    fn starting_balances(&self) -> HashMap<Currency, Money> {
        self.base.balances_starting.clone()
    }

    fn currencies(&self) -> Vec<Currency> {
        self.base.balances.keys().copied().collect()
    }

    fn last_event(&self) -> Option<AccountState> {
        self.base_last_event()
    }

    fn events(&self) -> Vec<AccountState> {
        self.base.events.clone()
    }

    fn event_count(&self) -> usize {
        self.base.events.len()
    }

    fn apply(&mut self, event: AccountState) {
        self.base_apply(event);
    }

    fn purge_account_events(&mut self, ts_now: UnixNanos, lookback_secs: u64) {
        self.base_purge_account_events(ts_now, lookback_secs);
    }

    fn calculate_balance_locked(
        &mut self,
        instrument: &InstrumentAny,
        side: OrderSide,
        quantity: Quantity,
        price: Price,
        use_quote_for_inverse: Option<bool>,
    ) -> anyhow::Result<Money> {
        self.base_calculate_balance_locked(instrument, side, quantity, price, use_quote_for_inverse)
    }

    fn calculate_pnls(
        &self,
        instrument: &InstrumentAny,
        fill: &OrderFilled,
        position: Option<&Position>,
    ) -> anyhow::Result<Vec<Money>> {
        self.base_calculate_pnls(instrument, fill, position)
    }

    fn calculate_commission(
        &self,
        instrument: &InstrumentAny,
        last_qty: Quantity,
        last_px: Price,
        liquidity_side: LiquiditySide,
        use_quote_for_inverse: Option<bool>,
    ) -> anyhow::Result<Money> {
        self.base_calculate_commission(
            instrument,
            last_qty,
            last_px,
            liquidity_side,
            use_quote_for_inverse,
        )
    }
}

impl Deref for CashAccount {
    type Target = BaseAccount;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for CashAccount {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}

impl Display for CashAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CashAccount(id={}, type={}, base={})",
            self.id,
            self.account_type,
            self.base_currency
                .map_or_else(|| "None".to_string(), |c| c.code.to_string()),
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::instruments::stubs::audusd_sim;
    use helm_core::UUID4;

    fn cash_account() -> CashAccount {
        let balance = AccountBalance::new(
            Money::from("100000.00 USD"),
            Money::from("0.00 USD"),
            Money::from("100000.00 USD"),
        );
        CashAccount::new(AccountState::new(
            AccountId::from("SIM-001"),
            AccountType::Cash,
            vec![balance],
            vec![],
            true,
            UUID4::new(),
            UnixNanos::default(),
            UnixNanos::default(),
            Some(Currency::USD()),
        ))
    }

    #[rstest]
    fn test_balances() {
        let account = cash_account();
        assert_eq!(
            account.balance_total(None),
            Some(Money::from("100000.00 USD"))
        );
        assert_eq!(
            account.balance_free(None),
            Some(Money::from("100000.00 USD"))
        );
        assert_eq!(account.balance_locked(None), Some(Money::from("0.00 USD")));
    }

    #[rstest]
    fn test_apply_replaces_balances() {
        let mut account = cash_account();
        let balance = AccountBalance::new(
            Money::from("90000.00 USD"),
            Money::from("10000.00 USD"),
            Money::from("80000.00 USD"),
        );
        account.apply(AccountState::new(
            AccountId::from("SIM-001"),
            AccountType::Cash,
            vec![balance],
            vec![],
            true,
            UUID4::new(),
            UnixNanos::from(1),
            UnixNanos::from(1),
            Some(Currency::USD()),
        ));

        assert_eq!(account.event_count(), 2);
        assert_eq!(
            account.balance_total(None),
            Some(Money::from("90000.00 USD"))
        );
        // free = total - locked holds after every event
        let balance = account.balance(None).unwrap();
        assert_eq!(balance.free, balance.total - balance.locked);
    }

    #[rstest]
    fn test_calculate_balance_locked_for_buy() {
        let mut account = cash_account();
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let locked = account
            .calculate_balance_locked(
                &instrument,
                OrderSide::Buy,
                Quantity::from(100_000_u64),
                Price::from("0.80000"),
                None,
            )
            .unwrap();
        assert_eq!(locked, Money::from("80000.00 USD"));
    }

    #[rstest]
    fn test_calculate_commission_taker() {
        let account = cash_account();
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        let commission = account
            .calculate_commission(
                &instrument,
                Quantity::from(100_000_u64),
                Price::from("0.80000"),
                LiquiditySide::Taker,
                None,
            )
            .unwrap();
        // 80,000 notional * 0.00002 taker fee
        assert_eq!(commission, Money::new(1.60, Currency::USD()));
    }
}
