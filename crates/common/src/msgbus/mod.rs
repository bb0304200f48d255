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

//! A common in-memory `MessageBus` for loosely coupled message passing patterns.
//!
//! Supports typed topic publish/subscribe with glob patterns, point-to-point
//! endpoints, and correlated request/response with deadlines. Delivery order
//! to a single subscriber equals publish order; a throwing or mismatched
//! handler affects that handler invocation only.

pub mod database;
pub mod handler;
pub mod matching;
pub mod switchboard;

use std::{
    any::Any,
    cell::{OnceCell, RefCell},
    fmt::Debug,
    rc::Rc,
};

use ahash::AHashMap;
use handler::ShareableMessageHandler;
use helm_core::{UUID4, UnixNanos};
use helm_model::identifiers::TraderId;
use indexmap::IndexMap;
use matching::is_matching;
use ustr::Ustr;

thread_local! {
    static MESSAGE_BUS: OnceCell<Rc<RefCell<MessageBus>>> = const { OnceCell::new() };
}

/// Sets the thread-local message bus.
///
/// # Panics
///
/// Panics if a message bus was already set for this thread.
pub fn set_message_bus(msgbus: Rc<RefCell<MessageBus>>) {
    MESSAGE_BUS.with(|bus| {
        assert!(bus.set(msgbus).is_ok(), "Message bus already set");
    });
}

/// Returns the thread-local message bus, initializing a default instance on
/// first access.
pub fn get_message_bus() -> Rc<RefCell<MessageBus>> {
    MESSAGE_BUS.with(|bus| {
        bus.get_or_init(|| Rc::new(RefCell::new(MessageBus::default())))
            .clone()
    })
}

/// Publishes the `message` to all subscribers with patterns matching `topic`.
pub fn publish(topic: Ustr, message: &dyn Any) {
    log::trace!("Publishing topic '{topic}'");
    let matching_subs = get_message_bus().borrow_mut().matching_subscriptions(topic);

    for sub in matching_subs {
        sub.handler.0.handle(message);
    }
}

/// Sends the `message` to the handler registered for the `endpoint` address.
pub fn send(endpoint: &Ustr, message: &dyn Any) {
    let handler = get_message_bus().borrow().get_endpoint(endpoint).cloned();
    if let Some(handler) = handler {
        handler.0.handle(message);
    } else {
        log::error!("No endpoint registered at '{endpoint}'");
    }
}

/// Registers the given `handler` for the `endpoint` address.
///
/// Replaces any existing handler at the endpoint.
pub fn register<T: AsRef<str>>(endpoint: T, handler: ShareableMessageHandler) {
    log::debug!(
        "Registering endpoint '{}' with handler ID {}",
        endpoint.as_ref(),
        handler.id(),
    );
    get_message_bus()
        .borrow_mut()
        .endpoints
        .insert(Ustr::from(endpoint.as_ref()), handler);
}

/// Deregisters the handler for the `endpoint` address.
pub fn deregister(endpoint: &Ustr) {
    log::debug!("Deregistering endpoint '{endpoint}'");
    get_message_bus()
        .borrow_mut()
        .endpoints
        .shift_remove(endpoint);
}

/// Subscribes the given `handler` to the `pattern`.
pub fn subscribe<T: AsRef<str>>(pattern: T, handler: ShareableMessageHandler, priority: Option<u8>) {
    log::debug!("Subscribing to pattern '{}'", pattern.as_ref());
    get_message_bus()
        .borrow_mut()
        .subscribe(pattern, handler, priority);
}

/// Unsubscribes the given `handler` from the `pattern`.
pub fn unsubscribe<T: AsRef<str>>(pattern: T, handler: &ShareableMessageHandler) {
    log::debug!("Unsubscribing from pattern '{}'", pattern.as_ref());
    get_message_bus()
        .borrow_mut()
        .unsubscribe(pattern, handler);
}

/// Returns whether the given `handler` is subscribed to the `pattern`.
#[must_use]
pub fn is_subscribed<T: AsRef<str>>(pattern: T, handler: &ShareableMessageHandler) -> bool {
    get_message_bus().borrow().is_subscribed(pattern, handler)
}

/// Returns the count of subscriptions matching the given `topic`.
#[must_use]
pub fn subscriptions_count<T: AsRef<str>>(topic: T) -> usize {
    get_message_bus()
        .borrow_mut()
        .matching_subscriptions(Ustr::from(topic.as_ref()))
        .len()
}

/// Registers a pending request correlation, sending `message` to `endpoint`.
///
/// The response callback is invoked at most once, when [`respond`] is called
/// with the returned correlation ID before `deadline_ns`.
pub fn request(
    endpoint: &Ustr,
    message: &dyn Any,
    callback: ShareableMessageHandler,
    deadline_ns: UnixNanos,
) -> UUID4 {
    let correlation_id = UUID4::new();
    get_message_bus()
        .borrow_mut()
        .register_request(correlation_id, callback, deadline_ns);
    send(endpoint, message);
    correlation_id
}

/// Responds to the pending request with the given `correlation_id`.
///
/// Duplicate or unknown correlations are dropped with a warning (at-most-once
/// delivery).
pub fn respond(correlation_id: &UUID4, message: &dyn Any) {
    let callback = get_message_bus()
        .borrow_mut()
        .take_request(correlation_id);
    match callback {
        Some(pending) => pending.callback.0.handle(message),
        None => log::warn!("No pending request for correlation ID {correlation_id} (dropping)"),
    }
}

/// Sweeps expired request correlations, returning the timed-out IDs.
pub fn sweep_expired_requests(ts_now: UnixNanos) -> Vec<UUID4> {
    let expired = get_message_bus().borrow_mut().sweep_expired(ts_now);
    for correlation_id in &expired {
        log::warn!("Request {correlation_id} timed out");
    }
    expired
}

/// Represents a subscription to a particular topic pattern.
///
/// Subscriptions with higher priority receive messages before lower priority
/// subscriptions; equal priorities deliver in subscription order.
#[derive(Clone)]
pub struct Subscription {
    /// The shareable message handler for the subscription.
    pub handler: ShareableMessageHandler,
    /// A copy of the handler ID for faster equality checks.
    pub handler_id: Ustr,
    /// The topic pattern for the subscription.
    pub pattern: Ustr,
    /// The priority for the subscription.
    pub priority: u8,
    /// The insertion sequence, for stable ordering within a priority.
    sequence: usize,
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Subscription {{ pattern: {}, handler: {}, priority: {} }}",
            self.pattern, self.handler_id, self.priority,
        )
    }
}

/// A pending request correlation.
pub struct PendingRequest {
    /// The response callback.
    pub callback: ShareableMessageHandler,
    /// The deadline (UNIX nanoseconds) after which the request times out.
    pub deadline_ns: UnixNanos,
}

/// The in-memory message bus.
pub struct MessageBus {
    /// The trader ID associated with the bus.
    pub trader_id: TraderId,
    /// The name of the bus instance.
    pub name: String,
    subscriptions: Vec<Subscription>,
    endpoints: IndexMap<Ustr, ShareableMessageHandler>,
    correlations: AHashMap<UUID4, PendingRequest>,
    topic_cache: AHashMap<Ustr, Vec<Subscription>>,
    sequence: usize,
}

impl Default for MessageBus {
    /// Creates a new default [`MessageBus`] instance.
    fn default() -> Self {
        Self::new(TraderId::default(), None)
    }
}

impl Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(MessageBus))
            .field("trader_id", &self.trader_id)
            .field("subscriptions", &self.subscriptions.len())
            .field("endpoints", &self.endpoints.len())
            .finish()
    }
}

impl MessageBus {
    /// Creates a new [`MessageBus`] instance.
    #[must_use]
    pub fn new(trader_id: TraderId, name: Option<String>) -> Self {
        Self {
            trader_id,
            name: name.unwrap_or_else(|| stringify!(MessageBus).to_string()),
            subscriptions: Vec::new(),
            endpoints: IndexMap::new(),
            correlations: AHashMap::new(),
            topic_cache: AHashMap::new(),
            sequence: 0,
        }
    }

    /// Returns the handler registered at the given endpoint, if any.
    #[must_use]
    pub fn get_endpoint(&self, endpoint: &Ustr) -> Option<&ShareableMessageHandler> {
        self.endpoints.get(endpoint)
    }

    /// Returns the registered endpoint addresses.
    #[must_use]
    pub fn endpoints(&self) -> Vec<&str> {
        self.endpoints.keys().map(Ustr::as_str).collect()
    }

    fn subscribe<T: AsRef<str>>(
        &mut self,
        pattern: T,
        handler: ShareableMessageHandler,
        priority: Option<u8>,
    ) {
        let pattern = Ustr::from(pattern.as_ref());
        let handler_id = handler.id();

        if self
            .subscriptions
            .iter()
            .any(|sub| sub.pattern == pattern && sub.handler_id == handler_id)
        {
            log::error!("Already subscribed: pattern '{pattern}' handler {handler_id}");
            return;
        }

        self.sequence += 1;
        self.subscriptions.push(Subscription {
            handler,
            handler_id,
            pattern,
            priority: priority.unwrap_or(0),
            sequence: self.sequence,
        });
        self.topic_cache.clear();
    }

    fn unsubscribe<T: AsRef<str>>(&mut self, pattern: T, handler: &ShareableMessageHandler) {
        let pattern = Ustr::from(pattern.as_ref());
        let handler_id = handler.id();
        self.subscriptions
            .retain(|sub| !(sub.pattern == pattern && sub.handler_id == handler_id));
        self.topic_cache.clear();
    }

    fn is_subscribed<T: AsRef<str>>(&self, pattern: T, handler: &ShareableMessageHandler) -> bool {
        let pattern = Ustr::from(pattern.as_ref());
        let handler_id = handler.id();
        self.subscriptions
            .iter()
            .any(|sub| sub.pattern == pattern && sub.handler_id == handler_id)
    }

    /// Returns the subscriptions matching the given `topic` in delivery order.
    pub fn matching_subscriptions(&mut self, topic: Ustr) -> Vec<Subscription> {
        if let Some(subs) = self.topic_cache.get(&topic) {
            return subs.clone();
        }

        let mut subs: Vec<Subscription> = self
            .subscriptions
            .iter()
            .filter(|sub| is_matching(topic.as_bytes(), sub.pattern.as_bytes()))
            .cloned()
            .collect();

        // Higher priority first, then insertion order
        subs.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });

        self.topic_cache.insert(topic, subs.clone());
        subs
    }

    fn register_request(
        &mut self,
        correlation_id: UUID4,
        callback: ShareableMessageHandler,
        deadline_ns: UnixNanos,
    ) {
        self.correlations.insert(
            correlation_id,
            PendingRequest {
                callback,
                deadline_ns,
            },
        );
    }

    fn take_request(&mut self, correlation_id: &UUID4) -> Option<PendingRequest> {
        self.correlations.remove(correlation_id)
    }

    fn sweep_expired(&mut self, ts_now: UnixNanos) -> Vec<UUID4> {
        let expired: Vec<UUID4> = self
            .correlations
            .iter()
            .filter(|(_, pending)| pending.deadline_ns <= ts_now)
            .map(|(id, _)| *id)
            .collect();
        for correlation_id in &expired {
            self.correlations.remove(correlation_id);
        }
        expired
    }

    /// Returns the count of pending request correlations.
    #[must_use]
    pub fn pending_requests_count(&self) -> usize {
        self.correlations.len()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use rstest::rstest;

    use super::{handler::TypedMessageHandler, *};

    fn recording_handler(id: &str, messages: Rc<RefCell<Vec<String>>>) -> ShareableMessageHandler {
        ShareableMessageHandler(Rc::new(TypedMessageHandler::new(
            Some(id),
            move |msg: &String| messages.borrow_mut().push(msg.clone()),
        )))
    }

    #[rstest]
    fn test_publish_delivers_in_publish_order() {
        let mut bus = MessageBus::default();
        let received = Rc::new(RefCell::new(Vec::new()));
        let handler = recording_handler("sub-order", received.clone());
        bus.subscribe("events.order.*", handler, None);

        let topic = Ustr::from("events.order.S-001");
        for sub in bus.matching_subscriptions(topic) {
            sub.handler.0.handle(&"first".to_string() as &dyn std::any::Any);
            sub.handler.0.handle(&"second".to_string() as &dyn std::any::Any);
        }

        assert_eq!(*received.borrow(), vec!["first", "second"]);
    }

    #[rstest]
    fn test_priority_ordering() {
        let mut bus = MessageBus::default();
        let received = Rc::new(RefCell::new(Vec::new()));

        let low_received = received.clone();
        let low = ShareableMessageHandler(Rc::new(TypedMessageHandler::new(
            Some("low"),
            move |_: &String| low_received.borrow_mut().push("low"),
        )));
        let high_received = received.clone();
        let high = ShareableMessageHandler(Rc::new(TypedMessageHandler::new(
            Some("high"),
            move |_: &String| high_received.borrow_mut().push("high"),
        )));

        bus.subscribe("topic", low, Some(0));
        bus.subscribe("topic", high, Some(10));

        let message = "msg".to_string();
        for sub in bus.matching_subscriptions(Ustr::from("topic")) {
            sub.handler.0.handle(&message as &dyn std::any::Any);
        }

        assert_eq!(*received.borrow(), vec!["high", "low"]);
    }

    #[rstest]
    fn test_type_mismatch_affects_single_handler_only() {
        let mut bus = MessageBus::default();
        let strings = Rc::new(RefCell::new(Vec::new()));
        let string_handler = recording_handler("strings", strings.clone());

        let ints = Rc::new(RefCell::new(Vec::new()));
        let ints_clone = ints.clone();
        let int_handler = ShareableMessageHandler(Rc::new(TypedMessageHandler::new(
            Some("ints"),
            move |msg: &i64| ints_clone.borrow_mut().push(*msg),
        )));

        bus.subscribe("topic", int_handler, None);
        bus.subscribe("topic", string_handler, None);

        let message = "payload".to_string();
        for sub in bus.matching_subscriptions(Ustr::from("topic")) {
            sub.handler.0.handle(&message as &dyn std::any::Any);
        }

        // The int handler logs the mismatch; the string handler still receives
        assert!(ints.borrow().is_empty());
        assert_eq!(*strings.borrow(), vec!["payload"]);
    }

    #[rstest]
    fn test_subscribe_unsubscribe() {
        let mut bus = MessageBus::default();
        let received = Rc::new(RefCell::new(Vec::new()));
        let handler = recording_handler("sub", received.clone());

        bus.subscribe("topic", handler.clone(), None);
        assert!(bus.is_subscribed("topic", &handler));

        // Duplicate subscribe is rejected
        bus.subscribe("topic", handler.clone(), None);
        assert_eq!(bus.subscriptions.len(), 1);

        bus.unsubscribe("topic", &handler);
        assert!(!bus.is_subscribed("topic", &handler));
        assert!(bus.matching_subscriptions(Ustr::from("topic")).is_empty());
    }

    #[rstest]
    fn test_request_response_at_most_once() {
        let mut bus = MessageBus::default();
        let responses = Rc::new(RefCell::new(Vec::new()));
        let callback = recording_handler("callback", responses.clone());

        let correlation_id = UUID4::new();
        bus.register_request(correlation_id, callback, UnixNanos::from(1_000));

        // First response resolves the correlation
        let pending = bus.take_request(&correlation_id);
        assert!(pending.is_some());
        pending
            .unwrap()
            .callback
            .0
            .handle(&"response".to_string() as &dyn std::any::Any);

        // Second response finds nothing (at-most-once)
        assert!(bus.take_request(&correlation_id).is_none());
        assert_eq!(*responses.borrow(), vec!["response"]);
    }

    #[rstest]
    fn test_sweep_expired_requests() {
        let mut bus = MessageBus::default();
        let callback = recording_handler("callback", Rc::new(RefCell::new(Vec::new())));

        let correlation_id = UUID4::new();
        bus.register_request(correlation_id, callback, UnixNanos::from(1_000));

        assert!(bus.sweep_expired(UnixNanos::from(500)).is_empty());
        let expired = bus.sweep_expired(UnixNanos::from(1_000));
        assert_eq!(expired, vec![correlation_id]);
        assert_eq!(bus.pending_requests_count(), 0);
    }
}
