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

//! Identifier generators with embedded datetime tags.

use chrono::{DateTime, SecondsFormat, Utc};

pub mod client_order_id;
pub mod position_id;

pub use client_order_id::ClientOrderIdGenerator;
pub use position_id::PositionIdGenerator;

/// Returns a datetime tag in the format `YYYYMMDD-HHMMSS` for the given UNIX
/// milliseconds.
fn get_datetime_tag(unix_ms: u64) -> String {
    let datetime =
        DateTime::<Utc>::from_timestamp_millis(unix_ms as i64).unwrap_or(DateTime::UNIX_EPOCH);
    datetime
        .to_rfc3339_opts(SecondsFormat::Secs, true)
        .replace(['-', ':'], "")
        .replace('T', "-")
        .trim_end_matches('Z')
        .to_string()
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_get_datetime_tag() {
        assert_eq!(get_datetime_tag(0), "19700101-000000");
        assert_eq!(get_datetime_tag(1_000), "19700101-000001");
    }
}
