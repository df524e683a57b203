// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hatch Restore - device-state model and shadow-patch protocol for the
//! Hatch Restore sunrise alarm and sound machine.
//!
//! A Restore is driven through a cloud shadow: the device reports its state
//! as a JSON document, and commands are published as partial "desired"
//! documents. This library keeps a typed copy of the reported state and
//! turns user intents into the exact desired patches the device expects.
//!
//! # Supported Features
//!
//! - **Reported state**: lenient merge of partial reports into a typed cache
//! - **Light control**: on/off, brightness, color id and raw intensity
//! - **Sound control**: on/off, sound id and volume
//! - **Routines**: start a numbered routine or stop playback
//! - **Entity adapters**: light, switch, number and media-player surfaces
//! - **Sessions**: many devices on one transport with broadcast events
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use hatch_restore::{DeviceIdentity, MemoryTransport, RestoreDevice};
//! use serde_json::json;
//!
//! let (transport, _updates) = MemoryTransport::new(16);
//! let transport = Arc::new(transport);
//! let mut device = RestoreDevice::new(
//!     DeviceIdentity::new("Nursery", "thing-1", "AA:BB:CC:DD:EE:FF"),
//!     Arc::clone(&transport),
//! );
//!
//! // Merge a reported document
//! device.merge_reported(&json!({
//!     "connected": true,
//!     "color": {"enabled": true, "i": 65535},
//!     "content": {"playing": "remote"},
//! }));
//! assert!(device.is_on());
//! assert!((device.light_brightness_percent() - 100.0).abs() < 1e-9);
//!
//! // Controls publish desired patches
//! device.set_sound_volume_percent(50.0);
//! let patch = transport.last_published("thing-1").unwrap();
//! assert_eq!(patch["sound"]["v"], json!(32768));
//! ```
//!
//! ## Update Callbacks
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use hatch_restore::subscription::Subscribable;
//! use hatch_restore::{DeviceIdentity, MemoryTransport, RestoreDevice};
//! use serde_json::json;
//!
//! let (transport, _updates) = MemoryTransport::new(16);
//! let mut device = RestoreDevice::new(
//!     DeviceIdentity::new("Nursery", "thing-1", "AA:BB:CC:DD:EE:FF"),
//!     Arc::new(transport),
//! );
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//! device.on_update(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! device.merge_reported(&json!({"sound": {"enabled": true}}));
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

pub mod device;
pub mod discovery;
pub mod error;
pub mod event;
pub mod manager;
pub mod patch;
pub mod protocol;
pub mod shadow;
pub mod state;
pub mod subscription;
pub mod types;

pub use device::{DeviceIdentity, DeviceSummary, RestoreDevice};
pub use discovery::DiscoveredDevice;
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{DeviceEvent, EventBus};
pub use manager::{ControlRequest, DeviceControl, RestoreSession, SessionConfig};
pub use patch::DesiredPatch;
pub use protocol::{MemoryTransport, ShadowTransport};
pub use shadow::{ReportedState, ShadowSync, ShadowUpdate};
pub use state::{RestoreState, StateChange};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{Level, Playing};
