// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session-level device events.
//!
//! A [`RestoreSession`](crate::manager::RestoreSession) broadcasts a
//! [`DeviceEvent`] whenever a device is added or removed and after every
//! merged reported update. The [`EventBus`] uses tokio's broadcast channel,
//! so any number of listeners each receive every event.
//!
//! # Examples
//!
//! ```
//! use hatch_restore::event::{DeviceEvent, EventBus};
//!
//! let bus = EventBus::default();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::device_added("thing-1"));
//! assert_eq!(rx.try_recv().unwrap().thing_name(), "thing-1");
//! ```

mod device_event;
mod event_bus;

pub use device_event::DeviceEvent;
pub use event_bus::EventBus;
pub(crate) use event_bus::DEFAULT_CHANNEL_CAPACITY;
