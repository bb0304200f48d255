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

use helm_core::AtomicTime;
use helm_model::identifiers::{ClientOrderId, StrategyId, TraderId};

use super::get_datetime_tag;

/// Generates unique client order IDs in the format
/// `O-{datetime_tag}-{trader_tag}-{strategy_tag}-{count}`.
#[derive(Debug)]
pub struct ClientOrderIdGenerator {
    clock: &'static AtomicTime,
    trader_id: TraderId,
    strategy_id: StrategyId,
    count: usize,
}

impl ClientOrderIdGenerator {
    /// Creates a new [`ClientOrderIdGenerator`] instance.
    #[must_use]
    pub const fn new(
        trader_id: TraderId,
        strategy_id: StrategyId,
        initial_count: usize,
        clock: &'static AtomicTime,
    ) -> Self {
        Self {
            clock,
            trader_id,
            strategy_id,
            count: initial_count,
        }
    }

    /// Sets the count to the given value.
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
    }

    /// Resets the count to zero.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Returns the current count.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Generates the next client order ID.
    pub fn generate(&mut self) -> ClientOrderId {
        let datetime_tag = get_datetime_tag(self.clock.get_time_ms());
        let trader_tag = self.trader_id.get_tag();
        let strategy_tag = self.strategy_id.get_tag();
        self.count += 1;
        ClientOrderId::from(format!(
            "O-{}-{}-{}-{}",
            datetime_tag, trader_tag, strategy_tag, self.count
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

    fn generator(initial_count: usize) -> ClientOrderIdGenerator {
        ClientOrderIdGenerator::new(
            TraderId::default(),
            StrategyId::default(),
            initial_count,
            get_atomic_clock_static(),
        )
    }

    #[rstest]
    fn test_generate_sequence() {
        let mut generator = generator(0);
        assert_eq!(
            generator.generate(),
            ClientOrderId::new("O-19700101-000000-001-001-1")
        );
        assert_eq!(
            generator.generate(),
            ClientOrderId::new("O-19700101-000000-001-001-2")
        );
        assert_eq!(generator.count(), 2);
    }

    #[rstest]
    fn test_generate_from_initial_count() {
        let mut generator = generator(5);
        assert_eq!(
            generator.generate(),
            ClientOrderId::new("O-19700101-000000-001-001-6")
        );
    }

    #[rstest]
    fn test_reset() {
        let mut generator = generator(0);
        generator.generate();
        generator.reset();
        assert_eq!(generator.count(), 0);
    }
}
