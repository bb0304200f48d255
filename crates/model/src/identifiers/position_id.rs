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

//! Represents a valid position ID.

use ustr::Ustr;

/// Represents a valid position ID.
#[repr(C)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PositionId(Ustr);

impl_identifier_common!(PositionId);

impl PositionId {
    /// Returns whether the position ID was generated internally (virtual),
    /// rather than assigned by a venue.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.0.starts_with("P-")
    }
}

impl Default for PositionId {
    fn default() -> Self {
        Self(Ustr::from("P-001"))
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
    #[case("P-20200814-102234-001-001-1", true)]
    #[case("EXCHANGE-123456", false)]
    fn test_is_virtual(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(PositionId::new(value).is_virtual(), expected);
    }
}
