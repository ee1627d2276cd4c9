//! services/console/src/stores/notify.rs
//!
//! The explicit observable contract shared by every store: consumers
//! register a callback and are invoked synchronously after each committed
//! mutation. Stores call `notify` only after releasing their state lock,
//! so a callback always observes a fully-applied change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Handle returned by `subscribe`, used to unsubscribe later.
pub type SubscriptionId = u64;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// An id-keyed registry of change callbacks.
#[derive(Default)]
pub struct Subscribers {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(SubscriptionId, Callback)>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.write().push((id, Arc::new(callback)));
        id
    }

    /// Returns false when the id was already removed.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Invokes every callback. The registry lock is released first so a
    /// callback may subscribe or unsubscribe without deadlocking.
    pub fn notify(&self) {
        let snapshot: Vec<Callback> = self
            .callbacks
            .read()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in snapshot {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn notify_reaches_live_subscribers_only() {
        let subscribers = Subscribers::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_a = Arc::clone(&hits);
        let a = subscribers.add(move || {
            hits_a.fetch_add(1, Ordering::SeqCst);
        });
        let hits_b = Arc::clone(&hits);
        let _b = subscribers.add(move || {
            hits_b.fetch_add(1, Ordering::SeqCst);
        });

        subscribers.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        assert!(subscribers.remove(a));
        assert!(!subscribers.remove(a));
        subscribers.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn a_callback_may_unsubscribe_itself() {
        let subscribers = Arc::new(Subscribers::new());
        let id_slot = Arc::new(AtomicU64::new(0));

        let inner = Arc::clone(&subscribers);
        let slot = Arc::clone(&id_slot);
        let id = subscribers.add(move || {
            inner.remove(slot.load(Ordering::SeqCst));
        });
        id_slot.store(id, Ordering::SeqCst);

        subscribers.notify();
        assert!(!subscribers.remove(id));
    }
}
