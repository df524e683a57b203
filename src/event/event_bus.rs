// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast fan-out of session events.

use tokio::sync::broadcast;

use super::DeviceEvent;

/// Default number of undelivered events kept per listener.
pub(crate) const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fans [`DeviceEvent`]s out to every session listener.
///
/// A listener that falls more than `capacity` events behind loses the
/// oldest ones and sees `RecvError::Lagged` on its next receive. Events
/// published while nobody listens are dropped.
///
/// # Examples
///
/// ```
/// use hatch_restore::event::{DeviceEvent, EventBus};
///
/// let bus = EventBus::with_capacity(16);
/// let mut first = bus.subscribe();
/// let mut second = bus.subscribe();
///
/// bus.publish(DeviceEvent::device_removed("thing-1"));
///
/// assert!(first.try_recv().unwrap().is_lifecycle());
/// assert!(second.try_recv().unwrap().is_lifecycle());
/// ```
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per listener.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a listener for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Hands an event to every live listener.
    pub fn publish(&self, event: DeviceEvent) {
        let thing_name = event.thing_name().to_string();
        match self.sender.send(event) {
            Ok(listeners) => {
                tracing::trace!(thing_name = %thing_name, listeners, "Published device event");
            }
            Err(_) => {
                tracing::trace!(thing_name = %thing_name, "No listener for device event");
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}
