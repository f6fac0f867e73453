//! Button event sources and the in-process dispatcher.
//!
//! Subscriptions are keyed by `(ButtonEventKind, SubscriberId)`, so any number
//! of independent consumers can share one source without their handlers
//! colliding.

use std::cell::RefCell;
use std::num::NonZeroU64;
use std::rc::Rc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use smallvec::SmallVec;
use tracing::trace;

use crate::ButtonEvent;
use crate::ButtonEventKind;

/// Identity token a subscriber registers its handlers under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(NonZeroU64);

impl SubscriberId {
    /// Returns an id that no other call in this process has returned.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);

        let value = NEXT.fetch_add(1, Ordering::Relaxed);
        SubscriberId(NonZeroU64::new(value).unwrap_or(NonZeroU64::MIN))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

pub type ButtonHandler = Rc<dyn Fn(&ButtonEvent)>;

/// Anything that delivers button down/up notifications to identity-scoped
/// subscribers.
///
/// Events for a single button must be delivered serially and in the order they
/// physically occurred.
pub trait ButtonEventSource {
    /// Registers `handler` for `kind` under `subscriber`, replacing any handler
    /// already registered under the same pair.
    fn subscribe(&self, kind: ButtonEventKind, subscriber: SubscriberId, handler: ButtonHandler);

    /// Removes the handler registered for `kind` under `subscriber`. Returns
    /// `false` if there was none.
    fn unsubscribe(&self, kind: ButtonEventKind, subscriber: SubscriberId) -> bool;
}

struct Subscription {
    kind: ButtonEventKind,
    subscriber: SubscriberId,
    handler: ButtonHandler,
}

/// Single-threaded [`ButtonEventSource`] that calls handlers synchronously in
/// registration order.
#[derive(Default)]
pub struct ButtonEventDispatcher {
    subscriptions: RefCell<Vec<Subscription>>,
}

impl ButtonEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every handler subscribed to its kind.
    ///
    /// The registry is not borrowed while handlers run, so handlers may
    /// subscribe or unsubscribe. Changes take effect from the next dispatch.
    pub fn dispatch(&self, event: &ButtonEvent) {
        let handlers: SmallVec<[ButtonHandler; 4]> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind == event.kind)
            .map(|s| s.handler.clone())
            .collect();

        trace!(?event, handlers = handlers.len(), "Dispatching button event");

        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self, kind: ButtonEventKind) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    pub fn is_subscribed(&self, kind: ButtonEventKind, subscriber: SubscriberId) -> bool {
        self.subscriptions
            .borrow()
            .iter()
            .any(|s| s.kind == kind && s.subscriber == subscriber)
    }
}

impl ButtonEventSource for ButtonEventDispatcher {
    fn subscribe(&self, kind: ButtonEventKind, subscriber: SubscriberId, handler: ButtonHandler) {
        let mut subscriptions = self.subscriptions.borrow_mut();

        if let Some(existing) = subscriptions
            .iter_mut()
            .find(|s| s.kind == kind && s.subscriber == subscriber)
        {
            existing.handler = handler;
            return;
        }

        subscriptions.push(Subscription {
            kind,
            subscriber,
            handler,
        });
    }

    fn unsubscribe(&self, kind: ButtonEventKind, subscriber: SubscriberId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let before = subscriptions.len();

        subscriptions.retain(|s| !(s.kind == kind && s.subscriber == subscriber));

        subscriptions.len() != before
    }
}

impl std::fmt::Debug for ButtonEventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonEventDispatcher")
            .field("down", &self.subscriber_count(ButtonEventKind::Down))
            .field("up", &self.subscriber_count(ButtonEventKind::Up))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Instant;

    use super::*;
    use crate::MouseButton;

    fn counter(count: &Rc<Cell<u32>>) -> ButtonHandler {
        let count = count.clone();
        Rc::new(move |_: &ButtonEvent| count.set(count.get() + 1))
    }

    #[test]
    fn subscriber_ids_are_unique() {
        let a = SubscriberId::next();
        let b = SubscriberId::next();
        assert_ne!(a, b);
        assert_ne!(a.get(), 0);
    }

    #[test]
    fn dispatch_reaches_only_matching_kind() {
        let dispatcher = ButtonEventDispatcher::new();
        let downs = Rc::new(Cell::new(0));
        let ups = Rc::new(Cell::new(0));
        let id = SubscriberId::next();

        dispatcher.subscribe(ButtonEventKind::Down, id, counter(&downs));
        dispatcher.subscribe(ButtonEventKind::Up, id, counter(&ups));

        let now = Instant::now();
        dispatcher.dispatch(&ButtonEvent::down(MouseButton::Left, now));
        dispatcher.dispatch(&ButtonEvent::down(MouseButton::Right, now));
        dispatcher.dispatch(&ButtonEvent::up(MouseButton::Left, now));

        assert_eq!(downs.get(), 2);
        assert_eq!(ups.get(), 1);
    }

    #[test]
    fn subscribing_same_identity_replaces_handler() {
        let dispatcher = ButtonEventDispatcher::new();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let id = SubscriberId::next();

        dispatcher.subscribe(ButtonEventKind::Down, id, counter(&first));
        dispatcher.subscribe(ButtonEventKind::Down, id, counter(&second));
        assert_eq!(dispatcher.subscriber_count(ButtonEventKind::Down), 1);

        dispatcher.dispatch(&ButtonEvent::down(MouseButton::Left, Instant::now()));

        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn identities_do_not_collide() {
        let dispatcher = ButtonEventDispatcher::new();
        let a = SubscriberId::next();
        let b = SubscriberId::next();
        let count = Rc::new(Cell::new(0));

        dispatcher.subscribe(ButtonEventKind::Down, a, counter(&count));
        dispatcher.subscribe(ButtonEventKind::Down, b, counter(&count));

        assert!(dispatcher.unsubscribe(ButtonEventKind::Down, a));
        assert!(!dispatcher.is_subscribed(ButtonEventKind::Down, a));
        assert!(dispatcher.is_subscribed(ButtonEventKind::Down, b));

        dispatcher.dispatch(&ButtonEvent::down(MouseButton::Left, Instant::now()));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unsubscribe_unknown_returns_false() {
        let dispatcher = ButtonEventDispatcher::new();
        assert!(!dispatcher.unsubscribe(ButtonEventKind::Up, SubscriberId::next()));
    }

    #[test]
    fn handler_can_unsubscribe_itself_during_dispatch() {
        let dispatcher = Rc::new(ButtonEventDispatcher::new());
        let id = SubscriberId::next();
        let calls = Rc::new(Cell::new(0));

        let handler: ButtonHandler = {
            let dispatcher = Rc::downgrade(&dispatcher);
            let calls = calls.clone();
            Rc::new(move |_: &ButtonEvent| {
                calls.set(calls.get() + 1);
                if let Some(dispatcher) = dispatcher.upgrade() {
                    dispatcher.unsubscribe(ButtonEventKind::Down, id);
                }
            })
        };
        dispatcher.subscribe(ButtonEventKind::Down, id, handler);

        let now = Instant::now();
        dispatcher.dispatch(&ButtonEvent::down(MouseButton::Left, now));
        dispatcher.dispatch(&ButtonEvent::down(MouseButton::Left, now));

        assert_eq!(calls.get(), 1);
        assert_eq!(dispatcher.subscriber_count(ButtonEventKind::Down), 0);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let dispatcher = ButtonEventDispatcher::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..3 {
            let order = order.clone();
            dispatcher.subscribe(
                ButtonEventKind::Up,
                SubscriberId::next(),
                Rc::new(move |_: &ButtonEvent| order.borrow_mut().push(tag)),
            );
        }

        dispatcher.dispatch(&ButtonEvent::up(MouseButton::Middle, Instant::now()));

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
