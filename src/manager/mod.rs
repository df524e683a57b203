// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session management for the Restores of one account.
//!
//! # Overview
//!
//! A [`RestoreSession`] owns every device of an account and the transport
//! they share. It provides:
//!
//! - **Device management**: add devices by identity or from a device list
//! - **Bootstrap**: read each device's reported snapshot once at start
//! - **Update routing**: merge inbound reported updates in receive order
//! - **Controls**: send [`ControlRequest`]s to a session running in a task
//! - **Credential refresh timing**: when to rebuild the shadow connection
//! - **Event system**: subscribe to device events via broadcast channels
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use hatch_restore::device::DeviceIdentity;
//! use hatch_restore::event::DeviceEvent;
//! use hatch_restore::manager::{RestoreSession, SessionConfig};
//! use hatch_restore::protocol::MemoryTransport;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> hatch_restore::Result<()> {
//!     let config = SessionConfig::default();
//!     let (transport, updates) = MemoryTransport::new(config.update_capacity);
//!     let transport = Arc::new(transport);
//!
//!     let mut session = RestoreSession::new(Arc::clone(&transport), config);
//!     session.add_device(DeviceIdentity::new("Nursery", "thing-1", "aa:bb"))?;
//!     let mut events = session.subscribe();
//!
//!     transport.report("thing-1", json!({"connected": true}))?;
//!     let handle = tokio::spawn(async move {
//!         session.run(updates).await;
//!     });
//!
//!     while let Ok(event) = events.recv().await {
//!         if let DeviceEvent::StateUpdated { summary, .. } = event {
//!             assert!(summary.is_online);
//!             break;
//!         }
//!     }
//!     handle.abort();
//!     Ok(())
//! }
//! ```

mod control;
mod session;
mod session_config;

pub use control::{ControlRequest, DeviceControl};
pub use session::RestoreSession;
pub use session_config::{
    CLIENT_ID_PREFIX, ClientId, DEFAULT_UPDATE_CAPACITY, RefreshSchedule, SessionConfig,
};
