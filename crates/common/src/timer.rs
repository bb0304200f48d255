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

//! Timer types for test and live clocks.

use std::{fmt::Display, num::NonZeroU64, rc::Rc};

use helm_core::{UUID4, UnixNanos, time::get_atomic_clock_realtime};
use tokio::sync::mpsc::UnboundedSender;
use ustr::Ustr;

/// Represents a time event occurring at the event timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeEvent {
    /// The event name (the timer it was generated by).
    pub name: Ustr,
    /// The unique identifier for the event.
    pub event_id: UUID4,
    /// UNIX timestamp (nanoseconds) when the event occurred.
    pub ts_event: UnixNanos,
    /// UNIX timestamp (nanoseconds) when the event was initialized.
    pub ts_init: UnixNanos,
}

impl TimeEvent {
    /// Creates a new [`TimeEvent`] instance.
    #[must_use]
    pub const fn new(name: Ustr, event_id: UUID4, ts_event: UnixNanos, ts_init: UnixNanos) -> Self {
        Self {
            name,
            event_id,
            ts_event,
            ts_init,
        }
    }
}

impl Display for TimeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TimeEvent(name={}, ts_event={}, ts_init={})",
            self.name, self.ts_event, self.ts_init,
        )
    }
}

/// A callback invoked when a time event fires (single-threaded).
#[derive(Clone)]
pub struct TimeEventCallback(pub Rc<dyn Fn(TimeEvent)>);

impl TimeEventCallback {
    /// Invokes the callback with the given event.
    pub fn call(&self, event: TimeEvent) {
        (self.0)(event);
    }
}

impl std::fmt::Debug for TimeEventCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TimeEventCallback)).finish()
    }
}

impl<F: Fn(TimeEvent) + 'static> From<F> for TimeEventCallback {
    fn from(value: F) -> Self {
        Self(Rc::new(value))
    }
}

/// A timer for deterministic testing, advanced manually.
#[derive(Clone, Debug)]
pub struct TestTimer {
    /// The timer name.
    pub name: Ustr,
    /// The interval (nanoseconds) between timer events.
    pub interval_ns: NonZeroU64,
    /// The UNIX timestamp (nanoseconds) when the timer started.
    pub start_time_ns: UnixNanos,
    /// The optional UNIX timestamp (nanoseconds) when the timer will stop.
    pub stop_time_ns: Option<UnixNanos>,
    next_time_ns: UnixNanos,
    is_expired: bool,
}

impl TestTimer {
    /// Creates a new [`TestTimer`] instance.
    #[must_use]
    pub fn new(
        name: Ustr,
        interval_ns: NonZeroU64,
        start_time_ns: UnixNanos,
        stop_time_ns: Option<UnixNanos>,
        fire_immediately: bool,
    ) -> Self {
        let next_time_ns = if fire_immediately {
            start_time_ns
        } else {
            start_time_ns + interval_ns.get()
        };
        Self {
            name,
            interval_ns,
            start_time_ns,
            stop_time_ns,
            next_time_ns,
            is_expired: false,
        }
    }

    /// Returns the next time the timer will fire.
    #[must_use]
    pub const fn next_time_ns(&self) -> UnixNanos {
        self.next_time_ns
    }

    /// Returns whether the timer is expired.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.is_expired
    }

    /// Advances the timer to the given time, returning all events which fired.
    pub fn advance(&mut self, to_time_ns: UnixNanos) -> Vec<TimeEvent> {
        let mut events = Vec::new();
        while !self.is_expired && self.next_time_ns <= to_time_ns {
            events.push(TimeEvent::new(
                self.name,
                UUID4::new(),
                self.next_time_ns,
                self.next_time_ns,
            ));

            if let Some(stop_time_ns) = self.stop_time_ns {
                if self.next_time_ns >= stop_time_ns {
                    self.is_expired = true;
                    break;
                }
            }
            self.next_time_ns += self.interval_ns.get();
        }
        events
    }

    /// Cancels the timer (no further events will fire).
    pub fn cancel(&mut self) {
        self.is_expired = true;
    }
}

/// A live timer firing events onto a channel from a `tokio` task.
#[derive(Debug)]
pub struct LiveTimer {
    /// The timer name.
    pub name: Ustr,
    /// The interval (nanoseconds) between timer events.
    pub interval_ns: NonZeroU64,
    /// The optional UNIX timestamp (nanoseconds) when the timer will stop.
    pub stop_time_ns: Option<UnixNanos>,
    task: Option<tokio::task::JoinHandle<()>>,
    sender: UnboundedSender<TimeEvent>,
}

impl LiveTimer {
    /// Creates a new [`LiveTimer`] instance.
    #[must_use]
    pub const fn new(
        name: Ustr,
        interval_ns: NonZeroU64,
        stop_time_ns: Option<UnixNanos>,
        sender: UnboundedSender<TimeEvent>,
    ) -> Self {
        Self {
            name,
            interval_ns,
            stop_time_ns,
            task: None,
            sender,
        }
    }

    /// Starts the timer task.
    ///
    /// Must be called within a `tokio` runtime.
    pub fn start(&mut self) {
        let name = self.name;
        let interval_ns = self.interval_ns.get();
        let stop_time_ns = self.stop_time_ns;
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_nanos(interval_ns));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await; // First tick completes immediately

            loop {
                interval.tick().await;
                let ts = get_atomic_clock_realtime().get_time_ns();

                if let Some(stop_time_ns) = stop_time_ns {
                    if ts >= stop_time_ns {
                        break;
                    }
                }

                let event = TimeEvent::new(name, UUID4::new(), ts, ts);
                if sender.send(event).is_err() {
                    break; // Receiver dropped
                }
            }
        });

        self.task = Some(task);
    }

    /// Returns whether the timer task has finished or was never started.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.task
            .as_ref()
            .map_or(true, tokio::task::JoinHandle::is_finished)
    }

    /// Cancels the timer, aborting the task.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for LiveTimer {
    fn drop(&mut self) {
        self.cancel();
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
    fn test_test_timer_advance_within_interval() {
        let mut timer = TestTimer::new(
            Ustr::from("timer-1"),
            NonZeroU64::new(100).unwrap(),
            UnixNanos::default(),
            None,
            false,
        );
        assert!(timer.advance(UnixNanos::from(99)).is_empty());
        assert!(!timer.is_expired());
    }

    #[rstest]
    fn test_test_timer_fires_on_each_interval() {
        let mut timer = TestTimer::new(
            Ustr::from("timer-1"),
            NonZeroU64::new(100).unwrap(),
            UnixNanos::default(),
            None,
            false,
        );
        let events = timer.advance(UnixNanos::from(350));
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].ts_event, UnixNanos::from(100));
        assert_eq!(events[2].ts_event, UnixNanos::from(300));
        assert_eq!(timer.next_time_ns(), UnixNanos::from(400));
    }

    #[rstest]
    fn test_test_timer_fire_immediately() {
        let mut timer = TestTimer::new(
            Ustr::from("timer-1"),
            NonZeroU64::new(100).unwrap(),
            UnixNanos::from(50),
            None,
            true,
        );
        let events = timer.advance(UnixNanos::from(50));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ts_event, UnixNanos::from(50));
    }

    #[rstest]
    fn test_test_timer_stop_time_expires() {
        let mut timer = TestTimer::new(
            Ustr::from("timer-1"),
            NonZeroU64::new(100).unwrap(),
            UnixNanos::default(),
            Some(UnixNanos::from(200)),
            false,
        );
        let events = timer.advance(UnixNanos::from(1_000));
        assert_eq!(events.len(), 2);
        assert!(timer.is_expired());
    }

    #[rstest]
    fn test_test_timer_cancel() {
        let mut timer = TestTimer::new(
            Ustr::from("timer-1"),
            NonZeroU64::new(100).unwrap(),
            UnixNanos::default(),
            None,
            false,
        );
        timer.cancel();
        assert!(timer.is_expired());
        assert!(timer.advance(UnixNanos::from(1_000)).is_empty());
    }
}
