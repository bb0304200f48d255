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

//! Real-time and static `Clock` implementations with named timers.

use std::{fmt::Debug, num::NonZeroU64};

use chrono::{DateTime, Utc};
use helm_core::{
    AtomicTime, UnixNanos,
    correctness::{check_positive_u64, check_predicate_true, check_valid_string},
    time::get_atomic_clock_realtime,
};
use indexmap::IndexMap;
use tokio::sync::mpsc::UnboundedSender;
use ustr::Ustr;

use crate::timer::{LiveTimer, TestTimer, TimeEvent, TimeEventCallback};

/// Represents a type of clock.
///
/// An active timer is one which has not expired.
pub trait Clock: Debug {
    /// Returns the current date and time as a timezone-aware `DateTime<Utc>`.
    fn utc_now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.timestamp_ns().as_i64())
    }

    /// Returns the current UNIX timestamp in nanoseconds (ns).
    fn timestamp_ns(&self) -> UnixNanos;

    /// Returns the current UNIX timestamp in milliseconds (ms).
    fn timestamp_ms(&self) -> u64 {
        self.timestamp_ns().as_u64() / 1_000_000
    }

    /// Returns the current UNIX timestamp in seconds.
    fn timestamp(&self) -> f64 {
        self.timestamp_ns().as_f64() / 1_000_000_000.0
    }

    /// Returns the names of active timers in the clock.
    fn timer_names(&self) -> Vec<&str>;

    /// Returns the count of active timers in the clock.
    fn timer_count(&self) -> usize;

    /// Sets a timer to alert once at the specified time.
    ///
    /// Any existing timer with the same `name` is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is invalid, or if `alert_time_ns` is not in
    /// the future.
    fn set_time_alert_ns(
        &mut self,
        name: &str,
        alert_time_ns: UnixNanos,
        callback: Option<TimeEventCallback>,
    ) -> anyhow::Result<()>;

    /// Sets a timer to fire time events at every `interval_ns`, optionally
    /// bounded by a stop time.
    ///
    /// Any existing timer with the same `name` is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is invalid or `interval_ns` is zero.
    fn set_timer_ns(
        &mut self,
        name: &str,
        interval_ns: u64,
        start_time_ns: Option<UnixNanos>,
        stop_time_ns: Option<UnixNanos>,
        callback: Option<TimeEventCallback>,
    ) -> anyhow::Result<()>;

    /// Cancels the timer with the given `name`.
    fn cancel_timer(&mut self, name: &str);

    /// Cancels all timers.
    fn cancel_timers(&mut self);
}

/// A static test clock with manually advanced time.
///
/// Advancing time releases any due `TimeEvent`s in timestamp order.
pub struct TestClock {
    time: UnixNanos,
    timers: IndexMap<Ustr, TestTimer>,
    callbacks: IndexMap<Ustr, TimeEventCallback>,
    default_callback: Option<TimeEventCallback>,
}

impl Debug for TestClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TestClock))
            .field("time", &self.time)
            .field("timers", &self.timers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TestClock {
    /// Creates a new default [`TestClock`] instance.
    fn default() -> Self {
        Self::new()
    }
}

impl TestClock {
    /// Creates a new [`TestClock`] instance at the UNIX epoch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            time: UnixNanos::default(),
            timers: IndexMap::new(),
            callbacks: IndexMap::new(),
            default_callback: None,
        }
    }

    /// Registers a default callback for timers set without their own.
    pub fn register_default_handler(&mut self, callback: TimeEventCallback) {
        self.default_callback = Some(callback);
    }

    /// Sets the clock time without releasing any timer events.
    pub fn set_time(&mut self, to_time_ns: UnixNanos) {
        self.time = to_time_ns;
    }

    /// Advances the clock to the given time, returning all released
    /// [`TimeEvent`]s ordered by `ts_event`.
    pub fn advance_time(&mut self, to_time_ns: UnixNanos, set_time: bool) -> Vec<TimeEvent> {
        assert!(
            to_time_ns >= self.time,
            "Clock invariant failed: `to_time_ns` {} was < time {}",
            to_time_ns,
            self.time,
        );

        if set_time {
            self.time = to_time_ns;
        }

        let mut events: Vec<TimeEvent> = self
            .timers
            .values_mut()
            .flat_map(|timer| timer.advance(to_time_ns))
            .collect();
        events.sort_by_key(|event| event.ts_event);

        self.timers.retain(|_, timer| !timer.is_expired());
        events
    }

    /// Returns the callback registered for the given event, if any.
    #[must_use]
    pub fn get_handler(&self, event: &TimeEvent) -> Option<TimeEventCallback> {
        self.callbacks
            .get(&event.name)
            .or(self.default_callback.as_ref())
            .cloned()
    }
}

impl Clock for TestClock {
    fn timestamp_ns(&self) -> UnixNanos {
        self.time
    }

    fn timer_names(&self) -> Vec<&str> {
        self.timers
            .iter()
            .filter(|(_, timer)| !timer.is_expired())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn timer_count(&self) -> usize {
        self.timers
            .values()
            .filter(|timer| !timer.is_expired())
            .count()
    }

    fn set_time_alert_ns(
        &mut self,
        name: &str,
        alert_time_ns: UnixNanos,
        callback: Option<TimeEventCallback>,
    ) -> anyhow::Result<()> {
        check_valid_string(name, stringify!(name))?;
        check_predicate_true(
            alert_time_ns > self.time,
            "`alert_time_ns` was not in the future",
        )?;

        let interval_ns = alert_time_ns.as_u64() - self.time.as_u64();
        self.set_timer_ns(name, interval_ns, None, Some(alert_time_ns), callback)
    }

    fn set_timer_ns(
        &mut self,
        name: &str,
        interval_ns: u64,
        start_time_ns: Option<UnixNanos>,
        stop_time_ns: Option<UnixNanos>,
        callback: Option<TimeEventCallback>,
    ) -> anyhow::Result<()> {
        check_valid_string(name, stringify!(name))?;
        check_positive_u64(interval_ns, stringify!(interval_ns))?;

        let name = Ustr::from(name);
        if let Some(callback) = callback {
            self.callbacks.insert(name, callback);
        } else if self.default_callback.is_none() && !self.callbacks.contains_key(&name) {
            anyhow::bail!("No callback provided and no default callback registered");
        }

        let timer = TestTimer::new(
            name,
            NonZeroU64::new(interval_ns).expect("`interval_ns` already checked positive"),
            start_time_ns.unwrap_or(self.time),
            stop_time_ns,
            false,
        );
        self.timers.insert(name, timer);
        Ok(())
    }

    fn cancel_timer(&mut self, name: &str) {
        if let Some(mut timer) = self.timers.shift_remove(&Ustr::from(name)) {
            timer.cancel();
        }
    }

    fn cancel_timers(&mut self) {
        for timer in self.timers.values_mut() {
            timer.cancel();
        }
        self.timers.clear();
    }
}

/// A real-time clock which reads the monotonic atomic wall clock.
///
/// Timers run as `tokio` tasks sending [`TimeEvent`]s onto the channel
/// provided at construction.
pub struct LiveClock {
    time: &'static AtomicTime,
    timers: IndexMap<Ustr, LiveTimer>,
    time_event_tx: Option<UnboundedSender<TimeEvent>>,
}

impl Debug for LiveClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(LiveClock))
            .field("timers", &self.timers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for LiveClock {
    /// Creates a new default [`LiveClock`] instance with no timer channel.
    fn default() -> Self {
        Self::new(None)
    }
}

impl LiveClock {
    /// Creates a new [`LiveClock`] instance.
    #[must_use]
    pub fn new(time_event_tx: Option<UnboundedSender<TimeEvent>>) -> Self {
        Self {
            time: get_atomic_clock_realtime(),
            timers: IndexMap::new(),
            time_event_tx,
        }
    }
}

impl Clock for LiveClock {
    fn timestamp_ns(&self) -> UnixNanos {
        self.time.get_time_ns()
    }

    fn timer_names(&self) -> Vec<&str> {
        self.timers
            .iter()
            .filter(|(_, timer)| !timer.is_expired())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn timer_count(&self) -> usize {
        self.timers
            .values()
            .filter(|timer| !timer.is_expired())
            .count()
    }

    fn set_time_alert_ns(
        &mut self,
        name: &str,
        alert_time_ns: UnixNanos,
        callback: Option<TimeEventCallback>,
    ) -> anyhow::Result<()> {
        check_predicate_true(
            alert_time_ns > self.timestamp_ns(),
            "`alert_time_ns` was not in the future",
        )?;
        let interval_ns = alert_time_ns.as_u64() - self.timestamp_ns().as_u64();
        self.set_timer_ns(name, interval_ns, None, Some(alert_time_ns), callback)
    }

    fn set_timer_ns(
        &mut self,
        name: &str,
        interval_ns: u64,
        _start_time_ns: Option<UnixNanos>,
        stop_time_ns: Option<UnixNanos>,
        callback: Option<TimeEventCallback>,
    ) -> anyhow::Result<()> {
        check_valid_string(name, stringify!(name))?;
        check_positive_u64(interval_ns, stringify!(interval_ns))?;
        check_predicate_true(
            callback.is_none(),
            "Live timers deliver events over the channel; callbacks are not supported",
        )?;

        let sender = self
            .time_event_tx
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No time event channel configured for `LiveClock`"))?;

        let name = Ustr::from(name);
        let mut timer = LiveTimer::new(
            name,
            NonZeroU64::new(interval_ns).expect("`interval_ns` already checked positive"),
            stop_time_ns,
            sender,
        );
        timer.start();
        self.timers.insert(name, timer);
        Ok(())
    }

    fn cancel_timer(&mut self, name: &str) {
        if let Some(mut timer) = self.timers.shift_remove(&Ustr::from(name)) {
            timer.cancel();
        }
    }

    fn cancel_timers(&mut self) {
        for timer in self.timers.values_mut() {
            timer.cancel();
        }
        self.timers.clear();
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_test_clock_advance_releases_events_in_order() {
        let mut clock = TestClock::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let fired_clone = fired.clone();
        clock.register_default_handler(TimeEventCallback::from(move |event: TimeEvent| {
            fired_clone.borrow_mut().push(event.ts_event);
        }));

        clock
            .set_timer_ns("timer-a", 100, None, None, None)
            .unwrap();
        clock
            .set_timer_ns("timer-b", 150, None, None, None)
            .unwrap();
        assert_eq!(clock.timer_count(), 2);

        let events = clock.advance_time(UnixNanos::from(300), true);
        for event in &events {
            if let Some(handler) = clock.get_handler(event) {
                handler.call(event.clone());
            }
        }

        // timer-a at 100, timer-b at 150, timer-a at 200, timer-a/b at 300
        let fired = fired.borrow();
        assert_eq!(fired.len(), 5);
        assert!(fired.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(clock.timestamp_ns(), UnixNanos::from(300));
    }

    #[rstest]
    fn test_test_clock_time_alert_fires_once() {
        let mut clock = TestClock::new();
        clock.register_default_handler(TimeEventCallback::from(|_: TimeEvent| {}));
        clock
            .set_time_alert_ns("alert-1", UnixNanos::from(500), None)
            .unwrap();

        let events = clock.advance_time(UnixNanos::from(1_000), true);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ts_event, UnixNanos::from(500));
        assert_eq!(clock.timer_count(), 0);
    }

    #[rstest]
    fn test_test_clock_cancel_timer() {
        let mut clock = TestClock::new();
        clock.register_default_handler(TimeEventCallback::from(|_: TimeEvent| {}));
        clock
            .set_timer_ns("timer-a", 100, None, None, None)
            .unwrap();
        clock.cancel_timer("timer-a");
        assert_eq!(clock.timer_count(), 0);
        assert!(clock.advance_time(UnixNanos::from(1_000), true).is_empty());
    }

    #[rstest]
    fn test_live_clock_timestamps_monotonic() {
        let clock = LiveClock::default();
        let t1 = clock.timestamp_ns();
        let t2 = clock.timestamp_ns();
        assert!(t2 > t1);
    }
}
