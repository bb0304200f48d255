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

//! Reference-counted subscription bookkeeping for data clients.

use ahash::AHashMap;
use helm_model::identifiers::InstrumentId;

/// The kind of market data subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    Quotes,
    Trades,
    BookDeltas,
    /// Periodic book snapshots at the given interval (milliseconds).
    BookSnapshots {
        interval_ms: u64,
    },
    Bars,
    MarkPrices,
    IndexPrices,
    FundingRates,
    InstrumentStatus,
}

/// Tracks reference counts for venue subscriptions.
///
/// Multiple local consumers can subscribe to the same stream; the venue call
/// is only needed on the first subscribe (count 0 -> 1) and the venue
/// unsubscribe only on the last (count 1 -> 0). Unsubscribing below zero is a
/// logged no-op.
#[derive(Debug, Default)]
pub struct SubscriptionBook {
    counts: AHashMap<(InstrumentId, SubscriptionKind), usize>,
}

impl SubscriptionBook {
    /// Creates a new empty [`SubscriptionBook`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the subscription count for the given stream.
    ///
    /// Returns true if the venue subscribe call is needed (first reference).
    pub fn subscribe(&mut self, instrument_id: InstrumentId, kind: SubscriptionKind) -> bool {
        let count = self.counts.entry((instrument_id, kind)).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Decrements the subscription count for the given stream.
    ///
    /// Returns true if the venue unsubscribe call is needed (last reference
    /// released). Unsubscribing a stream with no references is a no-op.
    pub fn unsubscribe(&mut self, instrument_id: InstrumentId, kind: SubscriptionKind) -> bool {
        match self.counts.get_mut(&(instrument_id, kind)) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.counts.remove(&(instrument_id, kind));
                true
            }
            None => {
                log::warn!("Unsubscribe with no active subscription: {instrument_id} {kind:?}");
                false
            }
        }
    }

    /// Returns whether the given stream has at least one reference.
    #[must_use]
    pub fn is_subscribed(&self, instrument_id: InstrumentId, kind: SubscriptionKind) -> bool {
        self.counts.contains_key(&(instrument_id, kind))
    }

    /// Returns the reference count for the given stream.
    #[must_use]
    pub fn count(&self, instrument_id: InstrumentId, kind: SubscriptionKind) -> usize {
        self.counts
            .get(&(instrument_id, kind))
            .copied()
            .unwrap_or(0)
    }

    /// Returns all subscribed streams.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<(InstrumentId, SubscriptionKind)> {
        self.counts.keys().copied().collect()
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
    fn test_ref_counting() {
        let mut book = SubscriptionBook::new();
        let instrument_id = InstrumentId::from("AUD/USD.SIM");

        // First reference needs the venue call
        assert!(book.subscribe(instrument_id, SubscriptionKind::Quotes));
        // Second reference does not
        assert!(!book.subscribe(instrument_id, SubscriptionKind::Quotes));
        assert_eq!(book.count(instrument_id, SubscriptionKind::Quotes), 2);

        // subscribe; subscribe; unsubscribe => still subscribed
        assert!(!book.unsubscribe(instrument_id, SubscriptionKind::Quotes));
        assert!(book.is_subscribed(instrument_id, SubscriptionKind::Quotes));

        // Last reference released => venue unsubscribe needed
        assert!(book.unsubscribe(instrument_id, SubscriptionKind::Quotes));
        assert!(!book.is_subscribed(instrument_id, SubscriptionKind::Quotes));
    }

    #[rstest]
    fn test_unsubscribe_below_zero_is_noop() {
        let mut book = SubscriptionBook::new();
        let instrument_id = InstrumentId::from("AUD/USD.SIM");
        assert!(!book.unsubscribe(instrument_id, SubscriptionKind::Trades));
    }

    #[rstest]
    fn test_kinds_tracked_independently() {
        let mut book = SubscriptionBook::new();
        let instrument_id = InstrumentId::from("AUD/USD.SIM");

        assert!(book.subscribe(instrument_id, SubscriptionKind::Quotes));
        assert!(book.subscribe(instrument_id, SubscriptionKind::Trades));
        assert!(book.subscribe(
            instrument_id,
            SubscriptionKind::BookSnapshots { interval_ms: 1_000 },
        ));

        assert_eq!(book.subscriptions().len(), 3);
        assert!(book.unsubscribe(instrument_id, SubscriptionKind::Trades));
        assert!(book.is_subscribed(instrument_id, SubscriptionKind::Quotes));
    }
}
