//! # Change Notifications
//!
//! A single subscriber slot. The store calls it synchronously after each
//! change; the subscriber cannot reach back into the store because the
//! store owns it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of change just happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChangeEvent {
    /// The whole tree was rebuilt (`load`, `reset`)
    Replaced,
    /// Topics or usage counts changed in place
    Mutated,
}

impl ChangeEvent {
    pub fn is_structural(self) -> bool {
        matches!(self, ChangeEvent::Replaced)
    }
}

type Subscriber = Box<dyn FnMut(ChangeEvent)>;

#[derive(Default)]
pub struct ChangeNotifier {
    subscriber: Option<Subscriber>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback`, replacing any previous subscriber
    pub fn subscribe(&mut self, callback: impl FnMut(ChangeEvent) + 'static) {
        self.subscriber = Some(Box::new(callback));
    }

    pub fn unsubscribe(&mut self) {
        self.subscriber = None;
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }

    /// No-op without a subscriber
    pub fn notify(&mut self, event: ChangeEvent) {
        if let Some(subscriber) = self.subscriber.as_mut() {
            subscriber(event);
        }
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribed", &self.has_subscriber())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_without_subscriber_is_noop() {
        let mut notifier = ChangeNotifier::new();
        notifier.notify(ChangeEvent::Replaced);
        assert!(!notifier.has_subscriber());
    }

    #[test]
    fn test_subscriber_replaced() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::new();

        let first = seen.clone();
        notifier.subscribe(move |e| first.borrow_mut().push(("first", e)));
        let second = seen.clone();
        notifier.subscribe(move |e| second.borrow_mut().push(("second", e)));

        notifier.notify(ChangeEvent::Mutated);
        assert_eq!(*seen.borrow(), vec![("second", ChangeEvent::Mutated)]);

        notifier.unsubscribe();
        notifier.notify(ChangeEvent::Replaced);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_event_wire_shape() {
        assert_eq!(
            serde_json::to_string(&ChangeEvent::Replaced).unwrap(),
            r#"{"kind":"replaced"}"#
        );
        assert!(ChangeEvent::Replaced.is_structural());
        assert!(!ChangeEvent::Mutated.is_structural());
    }
}
