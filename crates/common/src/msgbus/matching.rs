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

//! Topic pattern matching for the message bus.

/// Matches a topic against a string pattern via dynamic programming.
///
/// The pattern may contain:
/// - `*` to match zero or more characters.
/// - `?` to match any single character.
/// - any other byte to match that byte exactly.
///
/// A single-row table is rolled over the topic: `row[p]` holds whether the
/// topic consumed so far matches the first `p` pattern bytes. Worst-case cost
/// is `O(topic.len() * pattern.len())` with no backtracking blowup on
/// pathological patterns.
#[must_use]
pub fn is_matching(topic: &[u8], pattern: &[u8]) -> bool {
    // Row for the empty topic: only a (possibly empty) run of leading '*'
    // matches nothing
    let mut row = vec![false; pattern.len() + 1];
    row[0] = true;
    for (p, byte) in pattern.iter().enumerate() {
        if *byte != b'*' {
            break;
        }
        row[p + 1] = true;
    }

    for byte in topic {
        // row[0] for a non-empty topic: the empty pattern no longer matches
        let mut diagonal = row[0];
        row[0] = false;

        for p in 1..=pattern.len() {
            let above = row[p];
            row[p] = match pattern[p - 1] {
                // Absorb this byte (above) or match nothing (left)
                b'*' => above || row[p - 1],
                b'?' => diagonal,
                exact => diagonal && exact == *byte,
            };
            diagonal = above;
        }
    }

    row[pattern.len()]
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("events.order.S-001", "events.order.S-001", true)]
    #[case("events.order.S-001", "events.order.*", true)]
    #[case("events.order.S-001", "events.*", true)]
    #[case("events.order.S-001", "*", true)]
    #[case("events.order.S-001", "events.position.*", false)]
    #[case("data.quotes.SIM.AUD/USD", "data.quotes.SIM.*", true)]
    #[case("data.quotes.SIM.AUD/USD", "data.?uotes.*", true)]
    #[case("events.order.S-001", "events.order.S-00?", true)]
    #[case("events.order.S-001", "events.order.S-0?", false)]
    #[case("events.order.S-001", "*.order.*", true)]
    #[case("events.order.S-001", "*S-001", true)]
    #[case("events.order.S-001", "**", true)]
    #[case("", "*", true)]
    #[case("", "?", false)]
    #[case("", "", true)]
    #[case("a", "", false)]
    fn test_is_matching(#[case] topic: &str, #[case] pattern: &str, #[case] expected: bool) {
        assert_eq!(is_matching(topic.as_bytes(), pattern.as_bytes()), expected);
    }

    #[rstest]
    fn test_pathological_pattern_terminates() {
        // A backtracking matcher degrades exponentially on this shape
        let topic = "a".repeat(64);
        let pattern = format!("{}a", "a*".repeat(32));
        assert!(is_matching(topic.as_bytes(), pattern.as_bytes()));
        assert!(!is_matching(format!("{topic}b").as_bytes(), pattern.as_bytes()));
    }
}
