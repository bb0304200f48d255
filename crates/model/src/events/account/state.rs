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

use std::fmt::Display;

use helm_core::{UUID4, UnixNanos};
use serde::{Deserialize, Serialize};

use crate::{
    enums::AccountType,
    identifiers::AccountId,
    types::{AccountBalance, Currency, MarginBalance},
};

/// Represents an event which includes information on the state of the account.
///
/// Account state events from the venue are authoritative: applying one
/// replaces balances wholesale, while older events are retained for audit.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct AccountState {
    /// The account ID associated with the event.
    pub account_id: AccountId,
    /// The type of the account.
    pub account_type: AccountType,
    /// The account balances.
    pub balances: Vec<AccountBalance>,
    /// The account margin balances.
    pub margins: Vec<MarginBalance>,
    /// If the state was reported from the exchange (otherwise system calculated).
    pub is_reported: bool,
    /// The unique identifier for the event.
    pub event_id: UUID4,
    /// UNIX timestamp (nanoseconds) when the event occurred.
    pub ts_event: UnixNanos,
    /// UNIX timestamp (nanoseconds) when the event was initialized.
    pub ts_init: UnixNanos,
    /// The account base currency (`None` for multi-currency accounts).
    pub base_currency: Option<Currency>,
}

impl AccountState {
    /// Creates a new [`AccountState`] instance.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub const fn new(
        account_id: AccountId,
        account_type: AccountType,
        balances: Vec<AccountBalance>,
        margins: Vec<MarginBalance>,
        is_reported: bool,
        event_id: UUID4,
        ts_event: UnixNanos,
        ts_init: UnixNanos,
        base_currency: Option<Currency>,
    ) -> Self {
        Self {
            account_id,
            account_type,
            balances,
            margins,
            is_reported,
            event_id,
            ts_event,
            ts_init,
            base_currency,
        }
    }
}

impl Display for AccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(account_id={}, account_type={}, base_currency={}, is_reported={})",
            stringify!(AccountState),
            self.account_id,
            self.account_type,
            self.base_currency
                .map_or("None".to_string(), |c| c.code.to_string()),
            self.is_reported,
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
    use crate::types::Money;

    #[rstest]
    fn test_account_state_new() {
        let balance = AccountBalance::new(
            Money::from("100000.00 USD"),
            Money::from("0.00 USD"),
            Money::from("100000.00 USD"),
        );
        let state = AccountState::new(
            AccountId::from("SIM-001"),
            AccountType::Cash,
            vec![balance],
            vec![],
            true,
            UUID4::new(),
            UnixNanos::default(),
            UnixNanos::default(),
            Some(Currency::USD()),
        );

        assert_eq!(state.balances.len(), 1);
        assert!(state.is_reported);
        assert_eq!(
            state.to_string(),
            format!(
                "AccountState(account_id=SIM-001, account_type=CASH, base_currency=USD, is_reported=true)"
            )
        );
    }
}
