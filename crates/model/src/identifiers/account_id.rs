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

//! Represents a valid account ID with issuer and number components.

use ustr::Ustr;

use crate::identifiers::Venue;

/// Represents a valid account ID.
///
/// The value must include both an issuer (venue or broker) and a number,
/// separated by a hyphen, e.g. `SIM-001`.
#[repr(C)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccountId(Ustr);

impl_identifier_common!(AccountId);

impl AccountId {
    /// Returns the issuer (venue or broker) component of the account ID.
    ///
    /// # Panics
    ///
    /// Panics if the value does not contain a hyphen separator.
    #[must_use]
    pub fn get_issuer(&self) -> Venue {
        Venue::new(
            self.0
                .split_once('-')
                .expect("Invalid `AccountId` missing '-' separator")
                .0,
        )
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self(Ustr::from("SIM-001"))
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
    fn test_get_issuer() {
        let account_id = AccountId::new("BINANCE-001");
        assert_eq!(account_id.get_issuer(), Venue::new("BINANCE"));
    }

    #[rstest]
    fn test_string_reprs() {
        let id = AccountId::new("SIM-001");
        assert_eq!(id.as_str(), "SIM-001");
        assert_eq!(format!("{id:?}"), "\"SIM-001\"");
    }
}
