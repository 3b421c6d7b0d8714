//! Latest-value multicast signal used to observe document mutations.
//!
//! # Design
//!
//! [`ChangeBus<T>`] keeps the most recently published value in shared,
//! reference-counted storage (`Rc<RefCell<..>>`). Every publish notifies all
//! live subscribers in registration order. A new subscriber is handed the
//! current value immediately, so components created after a document was
//! seeded can bootstrap without waiting for the first edit.
//!
//! Unlike a change-detecting observable, `publish` never compares values:
//! each call is an emission.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: callbacks live as long as their [`Subscription`]
//!   guard. Dead weak references are pruned lazily during `publish`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct BusInner<T> {
    value: T,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A latest-value signal with multicast notification.
///
/// # Invariants
///
/// 1. Subscribers are notified in registration order.
/// 2. No borrow of the inner state is held while callbacks run, so a callback
///    may read the bus or publish again.
pub struct ChangeBus<T> {
    inner: Rc<RefCell<BusInner<T>>>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ChangeBus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ChangeBus")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + 'static> ChangeBus<T> {
    /// Create a bus holding `value` with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                value,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the latest value.
    #[must_use]
    pub fn latest(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the latest value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the latest value and notify every live subscriber.
    pub fn publish(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
        }
        self.notify();
    }

    /// Register `callback`. It runs once right away with the latest value and
    /// then on every subsequent publish until the returned guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));

        let current = self.latest();
        strong(&current);

        Subscription {
            _guard: Box::new(strong),
        }
    }

    fn notify(&self) {
        let (callbacks, value) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let live: Vec<CallbackRc<T>> =
                inner.subscribers.iter().filter_map(|w| w.upgrade()).collect();
            (live, inner.value.clone())
        };

        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// RAII guard for a bus subscriber. Dropping it detaches the callback.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
