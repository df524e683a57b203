// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device update subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Unique identifier for a subscription.
///
/// IDs increase monotonically within a registry, so ordering by ID is
/// ordering by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for update callbacks.
type UpdateCallback = Arc<dyn Fn() + Send + Sync>;

/// Registry for device update callbacks.
///
/// Uses `parking_lot::RwLock` so listeners can be added through a shared
/// reference. Callbacks are invoked in registration order, outside the
/// lock, so a callback may subscribe or unsubscribe without deadlocking.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Update callbacks keyed by registration order.
    callbacks: RwLock<BTreeMap<SubscriptionId, UpdateCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback invoked after every update.
    pub fn on_update<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.callbacks.write().clear();
    }

    /// Invokes every registered callback once, in registration order.
    pub fn dispatch(&self) {
        let callbacks: Vec<UpdateCallback> = self.callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new(42);
        assert_eq!(id.to_string(), "Sub(42)");
    }

    #[test]
    fn subscription_id_ordering() {
        assert!(SubscriptionId::new(1) < SubscriptionId::new(2));
        assert_eq!(SubscriptionId::new(7).value(), 7);
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.callback_count(), 0);
    }

    #[test]
    fn registry_update_callback() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let id = registry.on_update(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(registry.callback_count(), 1);

        registry.dispatch();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        assert!(registry.is_empty());

        registry.dispatch();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_dispatches_in_registration_order() {
        let registry = CallbackRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for n in 0..5 {
            let order = order.clone();
            registry.on_update(move || order.lock().push(n));
        }

        registry.dispatch();
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn registry_unsubscribe_nonexistent() {
        let registry = CallbackRegistry::new();
        assert!(!registry.unsubscribe(SubscriptionId::new(999)));
    }

    #[test]
    fn registry_unsubscribe_twice() {
        let registry = CallbackRegistry::new();
        let id = registry.on_update(|| {});
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
    }

    #[test]
    fn registry_clear() {
        let registry = CallbackRegistry::new();
        registry.on_update(|| {});
        registry.on_update(|| {});
        assert_eq!(registry.callback_count(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let slot = Arc::new(Mutex::new(None::<SubscriptionId>));

        let inner_registry = Arc::clone(&registry);
        let inner_slot = Arc::clone(&slot);
        let id = registry.on_update(move || {
            if let Some(id) = inner_slot.lock().take() {
                inner_registry.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        registry.dispatch();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_debug() {
        let registry = CallbackRegistry::new();
        registry.on_update(|| {});
        assert!(format!("{registry:?}").contains("callback_count: 1"));
    }
}
