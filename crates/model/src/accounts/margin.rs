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

//! A margin account tracking initial and maintenance margin per instrument.

use std::{
    collections::HashMap,
    fmt::Display,
    ops::{Deref, DerefMut},
};

use helm_core::UnixNanos;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{
    accounts::{Account, base::BaseAccount},
    enums::{AccountType, LiquiditySide, OrderSide},
    events::{AccountState, OrderFilled},
    identifiers::{AccountId, InstrumentId},
    instruments::InstrumentAny,
    position::Position,
    types::{AccountBalance, Currency, MarginBalance, Money, Price, Quantity},
};

/// Provides a margin account which facilitates trading on margin, using
/// account assets as collateral.
///
/// Tracks initial (order) and maintenance (position) margin per instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarginAccount {
    pub base: BaseAccount,
    /// The leverages per instrument.
    pub leverages: HashMap<InstrumentId, f64>,
    /// The margin balances per instrument.
    pub margins: HashMap<InstrumentId, MarginBalance>,
    /// The default account leverage applied when no instrument leverage is set.
    pub default_leverage: f64,
}

impl MarginAccount {
    /// Creates a new [`MarginAccount`] instance from the given state event.
    #[must_use]
    pub fn new(event: AccountState) -> Self {
        let mut margins: HashMap<InstrumentId, MarginBalance> = HashMap::new();
        for margin in &event.margins {
            margins.insert(margin.instrument_id, *margin);
        }
        Self {
            base: BaseAccount::new(event),
            leverages: HashMap::new(),
            margins,
            default_leverage: 1.0,
        }
    }

    /// Sets the default account leverage.
    pub fn set_default_leverage(&mut self, leverage: f64) {
        debug_assert!(leverage >= 1.0);
        self.default_leverage = leverage;
    }

    /// Sets the leverage for the given instrument.
    pub fn set_leverage(&mut self, instrument_id: InstrumentId, leverage: f64) {
        debug_assert!(leverage >= 1.0);
        self.leverages.insert(instrument_id, leverage);
    }

    /// Returns the leverage in effect for the given instrument.
    #[must_use]
    pub fn leverage(&self, instrument_id: &InstrumentId) -> f64 {
        *self
            .leverages
            .get(instrument_id)
            .unwrap_or(&self.default_leverage)
    }

    /// Returns the margin balance for the given instrument, if any.
    #[must_use]
    pub fn margin(&self, instrument_id: &InstrumentId) -> Option<&MarginBalance> {
        self.margins.get(instrument_id)
    }

    /// Updates the margin balance for the given instrument.
    pub fn update_margin(&mut self, margin: MarginBalance) {
        self.margins.insert(margin.instrument_id, margin);
    }

    /// Calculates the initial (order) margin for the given order parameters.
    #[must_use]
    pub fn calculate_margin_init(
        &self,
        instrument: &InstrumentAny,
        quantity: Quantity,
        price: Price,
        use_quote_for_inverse: Option<bool>,
    ) -> Money {
        let notional = instrument.calculate_notional_value(quantity, price, use_quote_for_inverse);
        let leverage = self.leverage(&instrument.id());
        let margin = notional.as_f64() / leverage
            * instrument.margin_init().to_f64().unwrap_or(0.0);
        Money::new(margin, notional.currency)
    }

    /// Calculates the maintenance (position) margin for the given position
    /// parameters.
    #[must_use]
    pub fn calculate_margin_maint(
        &self,
        instrument: &InstrumentAny,
        quantity: Quantity,
        price: Price,
        use_quote_for_inverse: Option<bool>,
    ) -> Money {
        let notional = instrument.calculate_notional_value(quantity, price, use_quote_for_inverse);
        let leverage = self.leverage(&instrument.id());
        let margin = notional.as_f64() / leverage
            * instrument.margin_maint().to_f64().unwrap_or(0.0);
        Money::new(margin, notional.currency)
    }
}

impl Account for MarginAccount {
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
        for margin in &event.margins {
            self.margins.insert(margin.instrument_id, *margin);
        }
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
        // Margin accounts lock the initial margin rather than full notional
        let _ = side;
        Ok(self.calculate_margin_init(instrument, quantity, price, use_quote_for_inverse))
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

impl Deref for MarginAccount {
    type Target = BaseAccount;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for MarginAccount {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}

impl Display for MarginAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MarginAccount(id={}, type={}, base={})",
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

    fn margin_account() -> MarginAccount {
        let balance = AccountBalance::new(
            Money::from("1000000.00 USD"),
            Money::from("0.00 USD"),
            Money::from("1000000.00 USD"),
        );
        MarginAccount::new(AccountState::new(
            AccountId::from("SIM-001"),
            AccountType::Margin,
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
    fn test_leverage_defaults() {
        let mut account = margin_account();
        let instrument_id = InstrumentId::from("AUD/USD.SIM");
        assert_eq!(account.leverage(&instrument_id), 1.0);

        account.set_leverage(instrument_id, 10.0);
        assert_eq!(account.leverage(&instrument_id), 10.0);
    }

    #[rstest]
    fn test_calculate_margin_init_with_leverage() {
        let mut account = margin_account();
        let instrument = InstrumentAny::CurrencyPair(audusd_sim());
        account.set_leverage(instrument.id(), 10.0);

        let margin = account.calculate_margin_init(
            &instrument,
            Quantity::from(100_000_u64),
            Price::from("0.80000"),
            None,
        );
        // 80,000 notional / 10 leverage * 0.03 margin_init
        assert_eq!(margin, Money::new(240.00, Currency::USD()));
    }

    #[rstest]
    fn test_margins_updated_from_state_event() {
        let mut account = margin_account();
        let instrument_id = InstrumentId::from("AUD/USD.SIM");
        let margin = MarginBalance::new(
            Money::from("240.00 USD"),
            Money::from("80.00 USD"),
            instrument_id,
        );
        account.apply(AccountState::new(
            AccountId::from("SIM-001"),
            AccountType::Margin,
            vec![],
            vec![margin],
            true,
            UUID4::new(),
            UnixNanos::from(1),
            UnixNanos::from(1),
            Some(Currency::USD()),
        ));

        assert_eq!(account.margin(&instrument_id), Some(&margin));
    }
}
