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

//! Base state and calculations shared by all account implementations.

use std::collections::HashMap;

use helm_core::{UnixNanos, datetime::secs_to_nanos};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{
    enums::{AccountType, LiquiditySide, OrderSide},
    events::{AccountState, OrderFilled},
    identifiers::AccountId,
    instruments::InstrumentAny,
    position::Position,
    types::{AccountBalance, Currency, Money, Price, Quantity},
};

/// The account state shared by every account type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseAccount {
    /// The account ID.
    pub id: AccountId,
    /// The type of the account.
    pub account_type: AccountType,
    /// The account base currency (`None` for multi-currency accounts).
    pub base_currency: Option<Currency>,
    /// The account state events received, latest authoritative.
    pub events: Vec<AccountState>,
    /// The cumulative commissions per currency.
    pub commissions: HashMap<Currency, f64>,
    /// The current balances per currency.
    pub balances: HashMap<Currency, AccountBalance>,
    /// The starting balances per currency.
    pub balances_starting: HashMap<Currency, Money>,
}

impl BaseAccount {
    /// Creates a new [`BaseAccount`] instance from the given state event.
    #[must_use]
    pub fn new(event: AccountState) -> Self {
        let mut balances_starting: HashMap<Currency, Money> = HashMap::new();
        let mut balances: HashMap<Currency, AccountBalance> = HashMap::new();
        for balance in &event.balances {
            balances_starting.insert(balance.currency, balance.total);
            balances.insert(balance.currency, *balance);
        }
        Self {
            id: event.account_id,
            account_type: event.account_type,
            base_currency: event.base_currency,
            events: vec![event],
            commissions: HashMap::new(),
            balances,
            balances_starting,
        }
    }

    /// Returns the `AccountBalance` for the given currency, or `None` if absent.
    ///
    /// # Panics
    ///
    /// Panics if `currency` is `None` and the account has no base currency.
    #[must_use]
    pub fn base_balance(&self, currency: Option<Currency>) -> Option<&AccountBalance> {
        let currency = currency
            .or(self.base_currency)
            .expect("Currency must be specified");
        self.balances.get(&currency)
    }

    #[must_use]
    pub fn base_last_event(&self) -> Option<AccountState> {
        self.events.last().cloned()
    }

    /// Replaces the account balances with the given list.
    ///
    /// # Panics
    ///
    /// Panics if any updated balance has a total less than zero.
    pub fn update_balances(&mut self, balances: Vec<AccountBalance>) {
        for balance in balances {
            assert!(
                balance.total.raw >= 0,
                "Account invariant failed: balance total {} below zero",
                balance.total,
            );
            self.balances.insert(balance.currency, balance);
        }
    }

    /// Records the given commission against the cumulative totals.
    pub fn update_commissions(&mut self, commission: Money) {
        if commission.is_zero() {
            return;
        }
        let total = self.commissions.get(&commission.currency).unwrap_or(&0.0);
        self.commissions
            .insert(commission.currency, total + commission.as_f64());
    }

    /// Applies the given authoritative state event, replacing balances
    /// wholesale and retaining the event for audit.
    pub fn base_apply(&mut self, event: AccountState) {
        self.update_balances(event.balances.clone());
        self.events.push(event);
    }

    /// Purges account state events outside the lookback window.
    ///
    /// Guaranteed to retain at least the latest event.
    pub fn base_purge_account_events(&mut self, ts_now: UnixNanos, lookback_secs: u64) {
        let lookback_ns = secs_to_nanos(lookback_secs as f64);

        let mut retained_events = Vec::new();
        for event in &self.events {
            if event.ts_event.saturating_add(lookback_ns) > ts_now {
                retained_events.push(event.clone());
            }
        }

        if retained_events.is_empty() {
            if let Some(last) = self.events.last() {
                retained_events.push(last.clone());
            }
        }

        self.events = retained_events;
    }

    /// Calculates the balance to lock for a new order.
    ///
    /// Buys lock the notional value in quote currency; sells lock the sold
    /// quantity in base currency. Inverse instruments lock base denominated
    /// notional unless quote is explicitly requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the order side is unspecified.
    pub fn base_calculate_balance_locked(
        &mut self,
        instrument: &InstrumentAny,
        side: OrderSide,
        quantity: Quantity,
        price: Price,
        use_quote_for_inverse: Option<bool>,
    ) -> anyhow::Result<Money> {
        let base_currency = instrument
            .base_currency()
            .unwrap_or(instrument.quote_currency());
        let quote_currency = instrument.quote_currency();

        let notional: f64 = match side {
            OrderSide::Buy => instrument
                .calculate_notional_value(quantity, price, use_quote_for_inverse)
                .as_f64(),
            OrderSide::Sell => quantity.as_f64(),
            OrderSide::NoOrderSide => {
                anyhow::bail!("Invalid `OrderSide` for balance locked calculation")
            }
        };

        if instrument.is_inverse() && !use_quote_for_inverse.unwrap_or(false) {
            Ok(Money::new(notional, base_currency))
        } else if side == OrderSide::Buy {
            Ok(Money::new(notional, quote_currency))
        } else {
            Ok(Money::new(notional, base_currency))
        }
    }

    /// Calculates the asset-flow PnL amounts for the given fill.
    ///
    /// # Errors
    ///
    /// Returns an error if the fill order side is unspecified.
    pub fn base_calculate_pnls(
        &self,
        instrument: &InstrumentAny,
        fill: &OrderFilled,
        position: Option<&Position>,
    ) -> anyhow::Result<Vec<Money>> {
        let mut pnls: HashMap<Currency, Money> = HashMap::new();
        let base_currency = instrument.base_currency();

        let fill_qty_value = position.map_or(fill.last_qty.as_f64(), |pos| {
            pos.quantity.as_f64().min(fill.last_qty.as_f64())
        });
        let fill_qty = Quantity::new(fill_qty_value, fill.last_qty.precision);

        let notional = instrument.calculate_notional_value(fill_qty, fill.last_px, None);

        match fill.order_side {
            OrderSide::Buy => {
                if let (Some(base_currency), None) = (base_currency, self.base_currency) {
                    pnls.insert(base_currency, Money::new(fill_qty_value, base_currency));
                }
                pnls.insert(
                    notional.currency,
                    Money::new(-notional.as_f64(), notional.currency),
                );
            }
            OrderSide::Sell => {
                if let (Some(base_currency), None) = (base_currency, self.base_currency) {
                    pnls.insert(base_currency, Money::new(-fill_qty_value, base_currency));
                }
                pnls.insert(
                    notional.currency,
                    Money::new(notional.as_f64(), notional.currency),
                );
            }
            OrderSide::NoOrderSide => anyhow::bail!("Invalid `OrderSide` for PnL calculation"),
        }

        Ok(pnls.into_values().collect())
    }

    /// Calculates the commission for the given execution using the
    /// instrument's maker/taker fee rates.
    ///
    /// # Errors
    ///
    /// Returns an error if `liquidity_side` is unspecified.
    pub fn base_calculate_commission(
        &self,
        instrument: &InstrumentAny,
        last_qty: Quantity,
        last_px: Price,
        liquidity_side: LiquiditySide,
        use_quote_for_inverse: Option<bool>,
    ) -> anyhow::Result<Money> {
        let notional = instrument
            .calculate_notional_value(last_qty, last_px, use_quote_for_inverse)
            .as_f64();

        let commission = match liquidity_side {
            LiquiditySide::Maker => {
                notional * instrument.maker_fee().to_f64().unwrap_or(0.0)
            }
            LiquiditySide::Taker => {
                notional * instrument.taker_fee().to_f64().unwrap_or(0.0)
            }
            LiquiditySide::NoLiquiditySide => {
                anyhow::bail!("Invalid `LiquiditySide` for commission calculation")
            }
        };

        if instrument.is_inverse() && !use_quote_for_inverse.unwrap_or(false) {
            Ok(Money::new(
                commission,
                instrument
                    .base_currency()
                    .expect("Inverse instruments must have a base currency"),
            ))
        } else {
            Ok(Money::new(commission, instrument.quote_currency()))
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use helm_core::UUID4;

    fn state_at(ts_event: u64) -> AccountState {
        let balance = AccountBalance::new(
            Money::from("100000.00 USD"),
            Money::from("0.00 USD"),
            Money::from("100000.00 USD"),
        );
        AccountState::new(
            AccountId::from("SIM-001"),
            AccountType::Cash,
            vec![balance],
            vec![],
            true,
            UUID4::new(),
            UnixNanos::from(ts_event),
            UnixNanos::from(ts_event),
            Some(Currency::USD()),
        )
    }

    #[rstest]
    fn test_purge_account_events_retains_latest() {
        let mut account = BaseAccount::new(state_at(100_000_000));
        account.base_apply(state_at(200_000_000));
        account.base_apply(state_at(300_000_000));
        assert_eq!(account.events.len(), 3);

        account.base_purge_account_events(UnixNanos::from(1_000_000_000), 0);

        assert_eq!(account.events.len(), 1);
        assert_eq!(
            account.base_last_event().unwrap().ts_event,
            UnixNanos::from(300_000_000)
        );
    }

    #[rstest]
    fn test_update_commissions_accumulates() {
        let mut account = BaseAccount::new(state_at(0));
        account.update_commissions(Money::new(1.50, Currency::USD()));
        account.update_commissions(Money::new(2.00, Currency::USD()));
        assert_eq!(account.commissions.get(&Currency::USD()), Some(&3.50));
    }
}
