// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session owning every Restore of one account.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};

use crate::device::{DeviceIdentity, DeviceSummary, RestoreDevice};
use crate::discovery::DiscoveredDevice;
use crate::error::{DeviceError, Error};
use crate::event::{DeviceEvent, EventBus};
use crate::protocol::ShadowTransport;
use crate::shadow::ShadowUpdate;
use crate::subscription::Subscribable;

use super::{ControlRequest, SessionConfig};

/// Owns the devices of one account, keyed by thing name.
///
/// The session shares one transport between all of its devices, routes
/// inbound reported updates to the addressed device in receive order, and
/// broadcasts a [`DeviceEvent`] for every device added, removed or updated.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use hatch_restore::device::DeviceIdentity;
/// use hatch_restore::manager::{RestoreSession, SessionConfig};
/// use hatch_restore::protocol::MemoryTransport;
/// use hatch_restore::shadow::ShadowUpdate;
/// use serde_json::json;
///
/// # fn main() -> hatch_restore::Result<()> {
/// let (transport, _updates) = MemoryTransport::new(8);
/// let mut session = RestoreSession::new(Arc::new(transport), SessionConfig::default());
/// session.add_device(DeviceIdentity::new("Nursery", "thing-1", "aa:bb"))?;
///
/// session.dispatch(&ShadowUpdate::new("thing-1", json!({"connected": true})))?;
/// assert!(session.device("thing-1").unwrap().is_online());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RestoreSession<T: ShadowTransport> {
    /// Transport shared by every device.
    transport: Arc<T>,
    /// Devices keyed by thing name.
    devices: HashMap<String, RestoreDevice<T>>,
    /// Event bus for broadcasting device events.
    event_bus: EventBus,
    config: SessionConfig,
}

impl<T: ShadowTransport> RestoreSession<T> {
    /// Creates an empty session.
    #[must_use]
    pub fn new(transport: Arc<T>, config: SessionConfig) -> Self {
        Self {
            transport,
            devices: HashMap::new(),
            event_bus: EventBus::with_capacity(config.event_capacity),
            config,
        }
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the shared transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to device events.
    ///
    /// Returns a receiver that will receive all events for all devices
    /// published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count()
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Adds a device for the given identity.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateDevice` if a device with the same thing name
    /// is already registered.
    pub fn add_device(&mut self, identity: DeviceIdentity) -> Result<&mut RestoreDevice<T>, Error> {
        let thing_name = identity.thing_name.clone();
        if self.devices.contains_key(&thing_name) {
            return Err(Error::DuplicateDevice(thing_name));
        }

        tracing::info!(
            thing_name = %thing_name,
            device_name = %identity.device_name,
            "Adding Restore"
        );
        let device = RestoreDevice::new(identity, Arc::clone(&self.transport));
        self.event_bus
            .publish(DeviceEvent::device_added(thing_name.as_str()));
        Ok(self.devices.entry(thing_name).or_insert(device))
    }

    /// Adds the device described by one device-list entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::Device` if the entry is incomplete or not a legacy
    /// Restore, and `Error::DuplicateDevice` if its thing name is taken.
    pub fn add_discovered_device(
        &mut self,
        entry: &DiscoveredDevice,
    ) -> Result<&mut RestoreDevice<T>, Error> {
        let identity = entry.identity()?;
        self.add_device(identity)
    }

    /// Adds a device for every usable legacy Restore in a device list.
    ///
    /// Incomplete entries, other products and already registered devices
    /// are skipped. Returns the number of devices added.
    pub fn add_discovered(&mut self, discovered: &[DiscoveredDevice]) -> usize {
        let mut added = 0;
        for entry in discovered {
            match self.add_discovered_device(entry) {
                Ok(_) => added += 1,
                Err(Error::Device(DeviceError::UnsupportedProduct(product))) => {
                    tracing::info!(
                        product = %product,
                        thing_name = ?entry.thing_name,
                        "Skipping unsupported product"
                    );
                }
                Err(e) => tracing::debug!(error = %e, "Skipping device list entry"),
            }
        }
        added
    }

    /// Removes a device, returning it if it was registered.
    pub fn remove_device(&mut self, thing_name: &str) -> Option<RestoreDevice<T>> {
        let device = self.devices.remove(thing_name)?;
        tracing::info!(thing_name = %thing_name, "Removed Restore");
        self.event_bus.publish(DeviceEvent::device_removed(thing_name));
        Some(device)
    }

    /// Returns the device for a thing name.
    #[must_use]
    pub fn device(&self, thing_name: &str) -> Option<&RestoreDevice<T>> {
        self.devices.get(thing_name)
    }

    /// Returns the device for a thing name, mutably.
    pub fn device_mut(&mut self, thing_name: &str) -> Option<&mut RestoreDevice<T>> {
        self.devices.get_mut(thing_name)
    }

    /// Returns every registered thing name, sorted.
    #[must_use]
    pub fn thing_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.devices.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if the session has no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns a snapshot of every device, sorted by thing name.
    #[must_use]
    pub fn summaries(&self) -> Vec<DeviceSummary> {
        self.thing_names()
            .iter()
            .filter_map(|name| self.devices.get(name))
            .map(RestoreDevice::summary)
            .collect()
    }

    /// Removes every device and its update listeners.
    pub fn shutdown(&mut self) {
        for thing_name in self.thing_names() {
            if let Some(device) = self.remove_device(&thing_name) {
                device.clear_subscriptions();
            }
        }
        tracing::info!("Session shut down");
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Reads one device's reported snapshot from the transport and merges
    /// it.
    ///
    /// Returns `None` if the transport had no snapshot, otherwise whether
    /// the merge changed any cached field. A merged snapshot is broadcast as
    /// `StateUpdated` carrying that flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` for an unknown thing name and
    /// `Error::Protocol` if the transport failed to read the shadow.
    pub fn refresh_device(&mut self, thing_name: &str) -> Result<Option<bool>, Error> {
        let device = self
            .devices
            .get_mut(thing_name)
            .ok_or_else(|| Error::DeviceNotFound(thing_name.to_string()))?;

        let changed = device.refresh()?;
        if let Some(changed) = changed {
            self.event_bus
                .publish(DeviceEvent::state_updated(device.summary(), changed));
        }
        Ok(changed)
    }

    /// Reads every device's reported snapshot from the transport and merges
    /// it.
    ///
    /// Transport errors are logged and the device is skipped. Returns the
    /// number of devices that received a snapshot, changed or not.
    pub fn bootstrap(&mut self) -> usize {
        let mut refreshed = 0;
        for thing_name in self.thing_names() {
            match self.refresh_device(&thing_name) {
                Ok(Some(_)) => refreshed += 1,
                Ok(None) => {
                    tracing::debug!(thing_name = %thing_name, "No reported snapshot available");
                }
                Err(e) => {
                    tracing::warn!(
                        thing_name = %thing_name,
                        error = %e,
                        "Failed to read reported state"
                    );
                }
            }
        }
        tracing::info!(refreshed, devices = self.devices.len(), "Bootstrap complete");
        refreshed
    }

    /// Merges one reported update into the addressed device.
    ///
    /// Returns whether any cached field changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no device has the update's thing
    /// name.
    pub fn dispatch(&mut self, update: &ShadowUpdate) -> Result<bool, Error> {
        let device = self
            .devices
            .get_mut(&update.thing_name)
            .ok_or_else(|| Error::DeviceNotFound(update.thing_name.clone()))?;

        let changed = device.merge_reported(&update.reported);
        self.event_bus
            .publish(DeviceEvent::state_updated(device.summary(), changed));
        Ok(changed)
    }

    /// Runs one control on the addressed device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no device has the request's thing
    /// name.
    pub fn control(&mut self, request: &ControlRequest) -> Result<(), Error> {
        let device = self
            .devices
            .get_mut(&request.thing_name)
            .ok_or_else(|| Error::DeviceNotFound(request.thing_name.clone()))?;

        tracing::debug!(
            thing_name = %request.thing_name,
            control = ?request.control,
            "Applying control"
        );
        request.control.apply(device);
        Ok(())
    }

    /// Applies updates from the channel in receive order until it closes.
    ///
    /// Same as [`run_with_controls`](Self::run_with_controls) without a
    /// control channel.
    pub async fn run(&mut self, updates: mpsc::Receiver<ShadowUpdate>) -> usize {
        let (closed, controls) = mpsc::channel(1);
        drop(closed);
        self.run_with_controls(updates, controls).await
    }

    /// Applies reported updates and control requests until the update
    /// channel closes.
    ///
    /// Bootstraps first when the configuration asks for it. Updates and
    /// controls are each handled in receive order, one at a time, so a
    /// spawned session stays controllable. Controls already queued when the
    /// update channel closes still run. Requests for unknown thing names are
    /// logged and skipped. Returns the number of updates applied.
    pub async fn run_with_controls(
        &mut self,
        mut updates: mpsc::Receiver<ShadowUpdate>,
        mut controls: mpsc::Receiver<ControlRequest>,
    ) -> usize {
        if self.config.bootstrap_on_start {
            self.bootstrap();
        }

        tracing::info!(devices = self.devices.len(), "Processing shadow updates");
        let mut applied = 0;
        let mut controls_open = true;
        loop {
            tokio::select! {
                update = updates.recv() => {
                    let Some(update) = update else {
                        break;
                    };
                    if self.apply_update(&update) {
                        applied += 1;
                    }
                }
                request = controls.recv(), if controls_open => match request {
                    Some(request) => self.apply_control(&request),
                    None => controls_open = false,
                },
            }
        }

        while let Ok(request) = controls.try_recv() {
            self.apply_control(&request);
        }

        tracing::info!(applied, "Shadow update channel closed");
        applied
    }

    fn apply_update(&mut self, update: &ShadowUpdate) -> bool {
        match self.dispatch(update) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    thing_name = %update.thing_name,
                    error = %e,
                    "Skipping shadow update"
                );
                false
            }
        }
    }

    fn apply_control(&mut self, request: &ControlRequest) {
        if let Err(e) = self.control(request) {
            tracing::warn!(
                thing_name = %request.thing_name,
                error = %e,
                "Skipping control request"
            );
        }
    }

    // =========================================================================
    // Credential Refresh
    // =========================================================================

    /// Time until the shadow connection should be rebuilt for credentials
    /// expiring at `expires_at`, per the configured [`RefreshSchedule`].
    ///
    /// [`RefreshSchedule`]: super::RefreshSchedule
    #[must_use]
    pub fn next_refresh_in(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        self.config.refresh.next_refresh_in(expires_at, now)
    }

    /// Delay before retrying a failed connection rebuild.
    #[must_use]
    pub fn refresh_retry_in(&self) -> Duration {
        self.config.refresh.retry_in()
    }
}
