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

//! Represents a valid strategy ID.

use ustr::Ustr;

const EXTERNAL_STRATEGY_ID: &str = "EXTERNAL";

/// Represents a valid strategy ID.
///
/// Must be correctly formatted with two valid strings either side of a hyphen,
/// e.g. `EMACross-001`. The reserved value `EXTERNAL` tags orders which did
/// not originate from any strategy in the local system.
#[repr(C)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrategyId(Ustr);

impl_identifier_common!(StrategyId);

impl StrategyId {
    /// Returns the reserved `EXTERNAL` strategy ID.
    #[must_use]
    pub fn external() -> Self {
        Self(Ustr::from(EXTERNAL_STRATEGY_ID))
    }

    /// Returns whether this is the reserved `EXTERNAL` strategy ID.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.0 == EXTERNAL_STRATEGY_ID
    }

    /// Returns the numerical tag portion of the strategy ID.
    ///
    /// # Panics
    ///
    /// Panics if the value does not contain a hyphen separator.
    #[must_use]
    pub fn get_tag(&self) -> &str {
        self.0
            .rsplit_once('-')
            .expect("Invalid `StrategyId` missing '-' separator")
            .1
    }
}

impl Default for StrategyId {
    fn default() -> Self {
        Self(Ustr::from("S-001"))
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
    fn test_get_tag() {
        assert_eq!(StrategyId::new("EMACross-001").get_tag(), "001");
    }

    #[rstest]
    fn test_external() {
        assert!(StrategyId::external().is_external());
        assert!(!StrategyId::default().is_external());
    }
}
