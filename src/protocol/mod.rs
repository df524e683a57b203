// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow transports.
//!
//! A transport carries shadow documents between the library and the
//! cloud. The library never talks to the network itself: it reads the
//! reported document when a device is bootstrapped and publishes desired
//! patches, while inbound reported updates arrive separately as
//! [`ShadowUpdate`](crate::shadow::ShadowUpdate) values on a channel the
//! transport owns.
//!
//! # Transports
//!
//! - [`MemoryTransport`]: an in-process shadow service for tests and demos
//!
//! # Architecture
//!
//! ```text
//! RestoreDevice::set_sound_enabled(true)
//!                 ↓
//!         DesiredPatch::remote(..)
//!                 ↓
//!   ShadowTransport::publish_desired()
//!                 ↓
//!        device applies desired
//!                 ↓
//!   ShadowUpdate on the update channel
//!                 ↓
//!      RestoreSession::dispatch()
//! ```

mod memory;

pub use memory::MemoryTransport;

use serde_json::Value;

use crate::error::ProtocolError;

/// Trait for transports that can read and update device shadows.
///
/// Both methods are called from synchronous control paths and must not
/// block on network round-trips; a networked implementation queues the
/// publish and returns.
pub trait ShadowTransport: Send + Sync {
    /// Reads the current reported document for a shadow.
    ///
    /// Returns `Ok(None)` when the transport cannot offer a snapshot, which
    /// is the default.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport failed to read the shadow.
    fn reported_state(&self, thing_name: &str) -> Result<Option<Value>, ProtocolError> {
        let _ = thing_name;
        Ok(None)
    }

    /// Publishes a partial desired-state document for a shadow.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the patch could not be queued.
    fn publish_desired(&self, thing_name: &str, patch: &Value) -> Result<(), ProtocolError>;
}
