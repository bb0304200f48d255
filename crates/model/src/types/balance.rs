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

//! Represents account balance and margin balance types.

use std::fmt::Display;

use helm_core::correctness::FAILED;
use serde::{Deserialize, Serialize};

use crate::{
    identifiers::InstrumentId,
    types::{Currency, Money},
};

/// Represents an account balance denominated in a particular currency.
///
/// Invariant: `free = total - locked` at all times.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The currency of the balance.
    pub currency: Currency,
    /// The total account balance.
    pub total: Money,
    /// The account balance locked (assigned to pending orders).
    pub locked: Money,
    /// The account balance free for trading.
    pub free: Money,
}

impl AccountBalance {
    /// Creates a new [`AccountBalance`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if the currencies are inconsistent or if
    /// `total - locked != free`.
    pub fn new_checked(total: Money, locked: Money, free: Money) -> anyhow::Result<Self> {
        if total.currency != locked.currency || total.currency != free.currency {
            anyhow::bail!(
                "Currency mismatch: total {}, locked {}, free {}",
                total.currency,
                locked.currency,
                free.currency,
            );
        }
        if total.raw - locked.raw != free.raw {
            anyhow::bail!(
                "Balance invariant failed: total {} - locked {} != free {}",
                total,
                locked,
                free,
            );
        }

        Ok(Self {
            currency: total.currency,
            total,
            locked,
            free,
        })
    }

    /// Creates a new [`AccountBalance`] instance.
    ///
    /// # Panics
    ///
    /// Panics if a correctness check fails.
    pub fn new(total: Money, locked: Money, free: Money) -> Self {
        Self::new_checked(total, locked, free).expect(FAILED)
    }
}

impl Display for AccountBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(total={}, locked={}, free={})",
            stringify!(AccountBalance),
            self.total,
            self.locked,
            self.free,
        )
    }
}

/// Represents a margin balance optionally associated with a particular instrument.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginBalance {
    /// The currency of the margin.
    pub currency: Currency,
    /// The initial (order) margin requirement for the instrument.
    pub initial: Money,
    /// The maintenance (position) margin requirement for the instrument.
    pub maintenance: Money,
    /// The instrument ID associated with the margin.
    pub instrument_id: InstrumentId,
}

impl MarginBalance {
    /// Creates a new [`MarginBalance`] instance.
    ///
    /// # Panics
    ///
    /// Panics if the initial and maintenance currencies are inconsistent.
    pub fn new(initial: Money, maintenance: Money, instrument_id: InstrumentId) -> Self {
        assert_eq!(
            initial.currency, maintenance.currency,
            "Currency mismatch: initial {}, maintenance {}",
            initial.currency, maintenance.currency,
        );

        Self {
            currency: initial.currency,
            initial,
            maintenance,
            instrument_id,
        }
    }
}

impl Display for MarginBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(initial={}, maintenance={}, instrument_id={})",
            stringify!(MarginBalance),
            self.initial,
            self.maintenance,
            self.instrument_id,
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

    #[rstest]
    fn test_account_balance_valid() {
        let balance = AccountBalance::new(
            Money::from("100000.00 USD"),
            Money::from("25000.00 USD"),
            Money::from("75000.00 USD"),
        );
        assert_eq!(balance.currency, Currency::USD());
        assert_eq!(balance.free, Money::from("75000.00 USD"));
    }

    #[rstest]
    fn test_account_balance_invariant_violation() {
        let result = AccountBalance::new_checked(
            Money::from("100000.00 USD"),
            Money::from("25000.00 USD"),
            Money::from("80000.00 USD"),
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn test_account_balance_currency_mismatch() {
        let result = AccountBalance::new_checked(
            Money::from("100000.00 USD"),
            Money::from("25000.00 AUD"),
            Money::from("75000.00 USD"),
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn test_margin_balance() {
        let margin = MarginBalance::new(
            Money::from("5000.00 USD"),
            Money::from("2500.00 USD"),
            InstrumentId::from("AUD/USD.SIM"),
        );
        assert_eq!(margin.currency, Currency::USD());
    }
}
