//! Change-listener registry.
//!
//! # Responsibility
//! - Hold the set of listeners interested in one store's mutations.
//! - Deliver one synchronous call per listener per emitted change.
//!
//! # Invariants
//! - Listeners are deduplicated by `Arc` identity.
//! - A panicking listener is caught and logged; later listeners still run.
//! - Delivery happens on a cloned listener list, so a listener may subscribe,
//!   unsubscribe, or read the store while being notified.

use log::{error, trace};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Change callback. Invoked with no arguments; read the store for new state.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

type ListenerSet = Mutex<Vec<Listener>>;

#[derive(Default)]
pub struct SubscriptionRegistry {
    listeners: Arc<ListenerSet>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` unless the same `Arc` is already registered.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        {
            let mut listeners = lock(&self.listeners);
            if !listeners.iter().any(|known| Arc::ptr_eq(known, &listener)) {
                listeners.push(Arc::clone(&listener));
            }
        }
        Subscription {
            registry: Arc::downgrade(&self.listeners),
            listener,
            active: AtomicBool::new(true),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.listeners).is_empty()
    }

    /// Calls every registered listener once. Returns how many panicked.
    pub(crate) fn emit_change(&self, store: &str) -> usize {
        let snapshot: Vec<Listener> = lock(&self.listeners).clone();
        trace!(
            "event=emit_change module=store store={} listeners={}",
            store,
            snapshot.len()
        );

        let mut failed = 0;
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                failed += 1;
                error!(
                    "event=listener_panic module=store store={} status=error",
                    store
                );
            }
        }
        failed
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle does not unsubscribe; call `unsubscribe` explicitly.
pub struct Subscription {
    registry: Weak<ListenerSet>,
    listener: Listener,
    active: AtomicBool,
}

impl Subscription {
    /// Removes the listener. Calls after the first are no-ops.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(listeners) = self.registry.upgrade() {
            lock(&listeners).retain(|known| !Arc::ptr_eq(known, &self.listener));
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
