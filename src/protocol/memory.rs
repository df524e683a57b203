// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process shadow service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use super::ShadowTransport;
use crate::error::ProtocolError;
use crate::shadow::{ShadowUpdate, merge_documents};

/// One shadow as held by the in-memory service.
#[derive(Debug)]
struct Shadow {
    reported: Value,
    desired: Value,
    published: Vec<Value>,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            reported: Value::Object(Map::new()),
            desired: Value::Object(Map::new()),
            published: Vec::new(),
        }
    }
}

/// Shadow transport backed by in-memory documents.
///
/// Plays both sides of the link: the library publishes desired patches
/// through [`ShadowTransport`], and the simulated device side calls
/// [`report`](Self::report) or [`accept_desired`](Self::accept_desired),
/// which forward [`ShadowUpdate`]s on the channel returned by
/// [`new`](Self::new).
///
/// # Examples
///
/// ```
/// use hatch_restore::protocol::{MemoryTransport, ShadowTransport};
/// use serde_json::json;
///
/// let (transport, mut updates) = MemoryTransport::new(16);
///
/// transport.publish_desired("thing-1", &json!({"sound": {"enabled": true}})).unwrap();
/// assert!(transport.accept_desired("thing-1").unwrap());
///
/// let update = updates.try_recv().unwrap();
/// assert_eq!(update.thing_name, "thing-1");
/// assert_eq!(transport.reported("thing-1"), Some(json!({"sound": {"enabled": true}})));
/// ```
#[derive(Debug)]
pub struct MemoryTransport {
    shadows: Mutex<HashMap<String, Shadow>>,
    fail_publishes: AtomicBool,
    updates: mpsc::Sender<ShadowUpdate>,
}

impl MemoryTransport {
    /// Creates a transport and the receiving end of its update channel.
    ///
    /// `capacity` bounds the number of undelivered updates; it must be
    /// non-zero.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ShadowUpdate>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let transport = Self {
            shadows: Mutex::new(HashMap::new()),
            fail_publishes: AtomicBool::new(false),
            updates: tx,
        };
        (transport, rx)
    }

    /// Stores a reported document without forwarding it.
    ///
    /// Used to seed the snapshot a session reads during bootstrap.
    pub fn set_reported(&self, thing_name: &str, document: Value) {
        self.shadows
            .lock()
            .entry(thing_name.to_string())
            .or_default()
            .reported = document;
    }

    /// Simulates the device reporting a partial state change.
    ///
    /// The document is merged into the stored reported state and
    /// forwarded on the update channel.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the update channel is full or closed.
    pub fn report(&self, thing_name: &str, document: Value) -> Result<(), ProtocolError> {
        merge_documents(
            &mut self
                .shadows
                .lock()
                .entry(thing_name.to_string())
                .or_default()
                .reported,
            &document,
        );
        self.forward(ShadowUpdate::new(thing_name, document))
    }

    /// Simulates the device applying its pending desired state.
    ///
    /// Pending desired changes are merged into the reported state and
    /// forwarded as one update. Returns `false` if nothing was pending.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the update channel is full or closed.
    pub fn accept_desired(&self, thing_name: &str) -> Result<bool, ProtocolError> {
        let pending = {
            let mut shadows = self.shadows.lock();
            let Some(shadow) = shadows.get_mut(thing_name) else {
                return Ok(false);
            };
            let pending = std::mem::replace(&mut shadow.desired, Value::Object(Map::new()));
            if pending.as_object().is_none_or(Map::is_empty) {
                return Ok(false);
            }
            merge_documents(&mut shadow.reported, &pending);
            pending
        };

        tracing::debug!(thing_name = %thing_name, "Device accepted desired state");
        self.forward(ShadowUpdate::new(thing_name, pending))?;
        Ok(true)
    }

    /// Makes every subsequent publish fail, or restores normal publishing.
    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    /// Returns the stored reported document for a shadow.
    #[must_use]
    pub fn reported(&self, thing_name: &str) -> Option<Value> {
        self.shadows
            .lock()
            .get(thing_name)
            .map(|shadow| shadow.reported.clone())
    }

    /// Returns the pending desired document for a shadow.
    #[must_use]
    pub fn desired(&self, thing_name: &str) -> Option<Value> {
        self.shadows
            .lock()
            .get(thing_name)
            .map(|shadow| shadow.desired.clone())
    }

    /// Returns every patch published to a shadow, oldest first.
    #[must_use]
    pub fn published(&self, thing_name: &str) -> Vec<Value> {
        self.shadows
            .lock()
            .get(thing_name)
            .map(|shadow| shadow.published.clone())
            .unwrap_or_default()
    }

    /// Returns the most recent patch published to a shadow.
    #[must_use]
    pub fn last_published(&self, thing_name: &str) -> Option<Value> {
        self.shadows
            .lock()
            .get(thing_name)
            .and_then(|shadow| shadow.published.last().cloned())
    }

    fn forward(&self, update: ShadowUpdate) -> Result<(), ProtocolError> {
        self.updates.try_send(update).map_err(|e| match e {
            mpsc::error::TrySendError::Full(update) => {
                ProtocolError::Unavailable(format!("update channel full for {}", update.thing_name))
            }
            mpsc::error::TrySendError::Closed(update) => {
                ProtocolError::ChannelClosed(update.thing_name)
            }
        })
    }
}

impl ShadowTransport for MemoryTransport {
    fn reported_state(&self, thing_name: &str) -> Result<Option<Value>, ProtocolError> {
        Ok(self.reported(thing_name))
    }

    fn publish_desired(&self, thing_name: &str, patch: &Value) -> Result<(), ProtocolError> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(ProtocolError::Publish {
                thing_name: thing_name.to_string(),
                message: "link down".to_string(),
            });
        }

        let mut shadows = self.shadows.lock();
        let shadow = shadows.entry(thing_name.to_string()).or_default();
        merge_documents(&mut shadow.desired, patch);
        shadow.published.push(patch.clone());
        Ok(())
    }
}
