//! The process-wide record of which device is active, and who hears about changes.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use shared::domain::DeviceSerial;
use tracing::{debug, info};

/// Receives every device selection made after it subscribed.
pub trait DeviceSubscriber: Send + Sync {
    fn on_device_selected(&self, serial: &DeviceSerial);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct ContextState {
    current: DeviceSerial,
    subscribers: Vec<(SubscriptionId, Arc<dyn DeviceSubscriber>)>,
    next_id: u64,
}

#[derive(Default)]
struct Shared {
    state: RwLock<ContextState>,
    broadcast: Mutex<()>,
}

/// Handle to the active device. Clones share the same state and subscriber list.
///
/// Starts out empty (no device). Subscribing does not replay the current value; a
/// subscriber only hears about selections made after it registered.
#[derive(Clone, Default)]
pub struct DeviceContext {
    shared: Arc<Shared>,
}

impl DeviceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> DeviceSerial {
        self.read().current.clone()
    }

    /// Stores `serial` and notifies every subscriber, in registration order, before
    /// returning.
    ///
    /// Callbacks run without the state lock held, so they may call [`Self::current`].
    /// They must not call `set_device` themselves: broadcasts are serialized.
    pub fn set_device(&self, serial: impl Into<DeviceSerial>) {
        let serial = serial.into();
        let _broadcast = self
            .shared
            .broadcast
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let subscribers: Vec<Arc<dyn DeviceSubscriber>> = {
            let mut state = self.write();
            state.current = serial.clone();
            state
                .subscribers
                .iter()
                .map(|(_, subscriber)| Arc::clone(subscriber))
                .collect()
        };

        info!(device = %serial, subscribers = subscribers.len(), "device selected");
        for subscriber in subscribers {
            subscriber.on_device_selected(&serial);
        }
    }

    pub fn subscribe(&self, subscriber: Arc<dyn DeviceSubscriber>) -> SubscriptionId {
        let mut state = self.write();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.subscribers.push((id, subscriber));
        debug!(subscription = id.0, "device subscriber registered");
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.write();
        let before = state.subscribers.len();
        state.subscribers.retain(|(existing, _)| *existing != id);
        let removed = state.subscribers.len() != before;
        if removed {
            debug!(subscription = id.0, "device subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().subscribers.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, ContextState> {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContextState> {
        self.shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("DeviceContext")
            .field("current", &state.current)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

/// Logs each selection; useful as a default subscriber for front ends.
#[derive(Debug, Default)]
pub struct LoggingSubscriber;

impl DeviceSubscriber for LoggingSubscriber {
    fn on_device_selected(&self, serial: &DeviceSerial) {
        if serial.is_empty() {
            info!("device selection cleared");
        } else {
            info!(device = %serial, "active device changed");
        }
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
