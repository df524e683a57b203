// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that notify listeners of updates.

use crate::subscription::SubscriptionId;

/// Trait for types that accept update listeners.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use hatch_restore::device::{DeviceIdentity, RestoreDevice};
/// use hatch_restore::protocol::MemoryTransport;
/// use hatch_restore::subscription::Subscribable;
/// use serde_json::json;
///
/// let (transport, _updates) = MemoryTransport::new(8);
/// let identity = DeviceIdentity::new("Nursery", "thing-1", "aa:bb:cc:dd:ee:ff");
/// let mut device = RestoreDevice::new(identity, Arc::new(transport));
///
/// let sub_id = device.on_update(|| println!("restore updated"));
/// device.merge_reported(&json!({"connected": true}));
///
/// device.unsubscribe(sub_id);
/// ```
pub trait Subscribable {
    /// Subscribes to state updates.
    ///
    /// The callback is called once after every merge of reported state.
    fn on_update<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Removes every registered callback.
    fn clear_subscriptions(&self);
}
