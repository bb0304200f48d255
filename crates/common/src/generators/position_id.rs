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

use std::collections::HashMap;

use helm_core::AtomicTime;
use helm_model::identifiers::{PositionId, StrategyId, TraderId};

use super::get_datetime_tag;

/// Generates unique virtual position IDs in the format
/// `P-{datetime_tag}-{trader_tag}-{strategy_tag}-{count}`, counting per
/// strategy.
#[derive(Debug)]
pub struct PositionIdGenerator {
    clock: &'static AtomicTime,
    trader_id: TraderId,
    counts: HashMap<StrategyId, usize>,
}

impl PositionIdGenerator {
    /// Creates a new [`PositionIdGenerator`] instance.
    #[must_use]
    pub fn new(trader_id: TraderId, clock: &'static AtomicTime) -> Self {
        Self {
            clock,
            trader_id,
            counts: HashMap::new(),
        }
    }

    /// Sets the count for the given strategy.
    pub fn set_count(&mut self, count: usize, strategy_id: StrategyId) {
        self.counts.insert(strategy_id, count);
    }

    /// Resets all counts.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Returns the current count for the given strategy.
    #[must_use]
    pub fn count(&self, strategy_id: StrategyId) -> usize {
        *self.counts.get(&strategy_id).unwrap_or(&0)
    }

    /// Generates the next position ID for the given strategy.
    ///
    /// The `flipped` flag appends an `F` suffix, marking the position which
    /// results from splitting a position-flipping fill.
    pub fn generate(&mut self, strategy_id: StrategyId, flipped: bool) -> PositionId {
        let count = self.count(strategy_id) + 1;
        self.counts.insert(strategy_id, count);
        let datetime_tag = get_datetime_tag(self.clock.get_time_ms());
        let trader_tag = self.trader_id.get_tag();
        let strategy_tag = strategy_id.get_tag();
        let flipped = if flipped { "F" } else { "" };
        PositionId::from(format!(
            "P-{}-{}-{}-{}{}",
            datetime_tag, trader_tag, strategy_tag, count, flipped
        ))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use helm_core::time::get_atomic_clock_static;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_generate_counts_per_strategy() {
        let mut generator = PositionIdGenerator::new(TraderId::default(), get_atomic_clock_static());
        let strategy_a = StrategyId::from("S-001");
        let strategy_b = StrategyId::from("S-002");

        let id1 = generator.generate(strategy_a, false);
        let id2 = generator.generate(strategy_b, false);
        let id3 = generator.generate(strategy_a, true);

        assert_eq!(id1, PositionId::new("P-19700101-000000-001-001-1"));
        assert_eq!(id2, PositionId::new("P-19700101-000000-001-002-1"));
        assert_eq!(id3, PositionId::new("P-19700101-000000-001-001-2F"));
        assert_eq!(generator.count(strategy_a), 2);
        assert_eq!(generator.count(strategy_b), 1);
    }
}
