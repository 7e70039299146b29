//! Capture state observation
//!
//! Observers register for an explicit context and are called back with the
//! new value whenever that piece of capture state changes. Contexts are
//! plain enum values owned by the registry, so there is no process-wide
//! marker to compare against.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

/// Piece of capture state an observer can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CaptureObservation {
    /// A still image is being captured (drives the flash-bulb animation).
    CapturingStillImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Callback = Arc<dyn Fn(CaptureObservation, bool) + Send + Sync>;

struct Registration {
    context: CaptureObservation,
    callback: Callback,
}

#[derive(Default)]
pub struct CaptureObservers {
    next_id: AtomicU64,
    registrations: RwLock<BTreeMap<ObserverId, Registration>>,
}

impl CaptureObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, context: CaptureObservation, callback: F) -> ObserverId
    where
        F: Fn(CaptureObservation, bool) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Registration {
                    context,
                    callback: Arc::new(callback),
                },
            );
        trace!(?context, ?id, "Observer registered");
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn observer_count(&self, context: CaptureObservation) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|r| r.context == context)
            .count()
    }

    /// Calls every observer of `context` in registration order.
    ///
    /// Callbacks run outside the registry lock, so they may register or
    /// unregister observers themselves.
    pub fn notify(&self, context: CaptureObservation, value: bool) {
        let callbacks: Vec<Callback> = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|r| r.context == context)
            .map(|r| r.callback.clone())
            .collect();

        trace!(?context, value, observers = callbacks.len(), "Notifying observers");
        for callback in callbacks {
            callback(context, value);
        }
    }
}
