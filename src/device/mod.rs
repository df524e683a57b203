// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Restore device model.
//!
//! A [`RestoreDevice`] keeps a local interpretation of its shadow and turns
//! control requests into desired-state patches.
//!
//! # Inbound
//!
//! Reported documents are sparse. Only the fields present are applied, and
//! the device's update listeners are notified once per merge:
//!
//! ```
//! use std::sync::Arc;
//!
//! use hatch_restore::device::{DeviceIdentity, RestoreDevice};
//! use hatch_restore::protocol::MemoryTransport;
//! use serde_json::json;
//!
//! let (transport, _updates) = MemoryTransport::new(8);
//! let identity = DeviceIdentity::new("Nursery", "thing-1", "aa:bb:cc:dd:ee:ff");
//! let mut device = RestoreDevice::new(identity, Arc::new(transport));
//!
//! device.merge_reported(&json!({"color": {"enabled": true, "i": 65535}}));
//! assert!(device.is_on());
//! assert_eq!(device.light_brightness_percent(), 100.0);
//! ```
//!
//! # Outbound
//!
//! Controls publish without waiting for the device. Light and sound share
//! one remote-mode unit on the firmware, so changing either re-sends both:
//!
//! ```
//! use std::sync::Arc;
//!
//! use hatch_restore::device::{DeviceIdentity, RestoreDevice};
//! use hatch_restore::protocol::MemoryTransport;
//! use serde_json::json;
//!
//! let (transport, _updates) = MemoryTransport::new(8);
//! let transport = Arc::new(transport);
//! let identity = DeviceIdentity::new("Nursery", "thing-1", "aa:bb:cc:dd:ee:ff");
//! let mut device = RestoreDevice::new(identity, Arc::clone(&transport));
//!
//! device.set_sound_enabled(true);
//!
//! let patch = transport.last_published("thing-1").unwrap();
//! assert_eq!(patch["content"]["playing"], json!("remote"));
//! assert_eq!(patch["color"]["enabled"], json!(false));
//! assert_eq!(patch["sound"]["enabled"], json!(true));
//! ```

mod entity;
mod identity;

pub use entity::{EntityDescriptor, EntityKind, MediaState};
pub use identity::{
    CONNECTION_MAC, DeviceIdentity, DeviceRegistryInfo, DeviceSummary, MANUFACTURER, MODEL,
    REGISTRY_DOMAIN,
};

use std::sync::Arc;

use serde_json::Value;

use crate::error::ProtocolError;
use crate::patch::{ColorPatch, DesiredPatch, SoundPatch};
use crate::protocol::ShadowTransport;
use crate::shadow::{ReportedState, ShadowSync};
use crate::state::{RestoreState, StateChange};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::types::{Level, Playing, clamp_u16};

/// Routine step used when none is given.
pub const DEFAULT_ROUTINE_STEP: u32 = 1;

/// A legacy Hatch Restore (`product=restore`) backed by a device shadow.
///
/// The device does not own its connection: it shares the transport with
/// the session and every other device of the account.
#[derive(Debug)]
pub struct RestoreDevice<T: ShadowTransport> {
    identity: DeviceIdentity,
    state: RestoreState,
    callbacks: CallbackRegistry,
    transport: Arc<T>,
}

impl<T: ShadowTransport> RestoreDevice<T> {
    /// Creates a device holding the firmware defaults.
    #[must_use]
    pub fn new(identity: DeviceIdentity, transport: Arc<T>) -> Self {
        Self {
            identity,
            state: RestoreState::new(),
            callbacks: CallbackRegistry::new(),
            transport,
        }
    }

    // ========== Identity ==========

    /// Returns the device identity.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns the user-facing device name.
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.identity.device_name
    }

    /// Returns the shadow identifier.
    #[must_use]
    pub fn thing_name(&self) -> &str {
        &self.identity.thing_name
    }

    /// Returns the hardware address.
    #[must_use]
    pub fn mac(&self) -> &str {
        &self.identity.mac
    }

    // ========== State ==========

    /// Returns the cached state.
    #[must_use]
    pub fn state(&self) -> &RestoreState {
        &self.state
    }

    /// Top-level on/off signal: the light state.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }

    /// Returns whether the device is connected to the cloud.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    /// Returns what the device is playing.
    #[must_use]
    pub fn current_playing(&self) -> &Playing {
        self.state.current_playing()
    }

    /// Light intensity as a percentage rounded to one decimal.
    #[must_use]
    pub fn light_brightness_percent(&self) -> f64 {
        self.state.light_brightness_percent()
    }

    /// Sound volume as a percentage rounded to one decimal.
    #[must_use]
    pub fn sound_volume_percent(&self) -> f64 {
        self.state.sound_volume_percent()
    }

    /// Returns a serializable snapshot of the device.
    #[must_use]
    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            device_name: self.identity.device_name.clone(),
            thing_name: self.identity.thing_name.clone(),
            mac: self.identity.mac.clone(),
            firmware_version: self.state.firmware_version().map(str::to_string),
            current_playing: self.state.current_playing().clone(),
            is_on: self.state.is_on(),
            is_online: self.state.is_online(),
            color_enabled: self.state.color_enabled(),
            sound_enabled: self.state.sound_enabled(),
        }
    }

    /// Returns the device registry entry shared by this device's entities.
    #[must_use]
    pub fn registry_info(&self) -> DeviceRegistryInfo {
        DeviceRegistryInfo::new(&self.identity, self.state.firmware_version())
    }

    // ========== Inbound ==========

    /// Merges a partial reported document into the cached state.
    ///
    /// Fields that are absent, `null`, or fail coercion leave the cache
    /// untouched. Update listeners are notified exactly once, even when
    /// nothing changed. Returns `true` if any cached field changed.
    pub fn merge_reported(&mut self, reported: &Value) -> bool {
        let parsed = ReportedState::from_value(reported);
        for rejected in parsed.rejected() {
            tracing::warn!(
                thing_name = %self.identity.thing_name,
                error = %rejected,
                "Skipping malformed reported field"
            );
        }

        let changes = parsed.to_state_changes();
        let change_count = changes.len();
        let changed = self.state.apply(&StateChange::batch(changes));
        tracing::debug!(
            thing_name = %self.identity.thing_name,
            change_count,
            changed,
            "Merged reported state"
        );

        self.callbacks.dispatch();
        changed
    }

    /// Reads the transport's reported snapshot and merges it.
    ///
    /// Returns `Ok(None)` if the transport has no snapshot to offer,
    /// otherwise whether the merge changed any cached field.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport failed to read the shadow.
    pub fn refresh(&mut self) -> Result<Option<bool>, ProtocolError> {
        let reported = self.transport.reported_state(&self.identity.thing_name)?;
        Ok(reported.map(|reported| self.merge_reported(&reported)))
    }

    // ========== Outbound ==========

    /// Publishes a desired-state patch, fire-and-forget.
    ///
    /// Transport failures are logged and dropped.
    pub fn publish_desired(&self, patch: &DesiredPatch) {
        let document = patch.to_value();
        tracing::debug!(
            thing_name = %self.identity.thing_name,
            patch = %document,
            "Publishing desired state"
        );
        if let Err(e) = self
            .transport
            .publish_desired(&self.identity.thing_name, &document)
        {
            tracing::warn!(
                thing_name = %self.identity.thing_name,
                error = %e,
                "Dropping desired state update"
            );
        }
    }

    /// Starts the device routine at the given step.
    pub fn turn_on_routine(&self, step: u32) {
        self.publish_desired(&DesiredPatch::routine(step));
    }

    /// Starts the device routine at its first step.
    pub fn turn_on_routine_default(&self) {
        self.turn_on_routine(DEFAULT_ROUTINE_STEP);
    }

    /// Stops playback, leaving light and sound settings untouched.
    pub fn turn_off(&self) {
        self.publish_desired(&DesiredPatch::stop());
    }

    /// Requests the light on or off, keeping the current sound flag.
    pub fn set_light_enabled(&self, enabled: bool) {
        self.apply_remote_state(enabled, self.state.sound_enabled());
    }

    /// Requests sound on or off, keeping the current light flag.
    ///
    /// Enabling sound while the cached volume is zero first restores the
    /// last audible volume, since the device reports `v = 0` while muted.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        if enabled && self.state.restore_audible_volume() {
            tracing::debug!(
                thing_name = %self.identity.thing_name,
                volume = %self.state.sound_volume(),
                "Restored last audible volume"
            );
        }
        self.apply_remote_state(self.state.color_enabled(), enabled);
    }

    /// Sets the light brightness as a percentage.
    ///
    /// The percentage is clamped to `[0, 100]`. Zero turns the light off,
    /// anything else turns it on.
    pub fn set_light_brightness_percent(&mut self, percent: f64) {
        let intensity = Level::from_percent(percent);
        self.state.set_color_intensity(intensity);
        self.state.set_color_enabled(!intensity.is_zero());
        self.apply_remote_state(self.state.color_enabled(), self.state.sound_enabled());
    }

    /// Sets the color id, clamped to `0..=65535`.
    pub fn set_color_id(&mut self, color_id: i64) {
        self.state.set_color_id(clamp_u16(color_id));
        self.publish_color_settings();
    }

    /// Sets the raw light intensity, clamped to `0..=65535`.
    pub fn set_color_intensity_raw(&mut self, raw: i64) {
        self.state.set_color_intensity(Level::clamped(raw));
        self.publish_color_settings();
    }

    /// Sets the sound volume as a percentage clamped to `[0, 100]`.
    pub fn set_sound_volume_percent(&mut self, percent: f64) {
        self.state.set_sound_volume(Level::from_percent(percent));
        if self.state.any_enabled() {
            self.apply_current_remote_state();
        } else {
            self.publish_desired(&DesiredPatch::stopped_with_sound(SoundPatch::full(
                false,
                self.state.sound_id(),
                self.state.sound_volume(),
            )));
        }
    }

    /// Publishes remote-mode playback for the given flags.
    ///
    /// Either flag set sends both sections with the cached ids and levels;
    /// both cleared stops playback and disables both.
    pub fn apply_remote_state(&self, color_enabled: bool, sound_enabled: bool) {
        let patch = if color_enabled || sound_enabled {
            DesiredPatch::remote(
                ColorPatch::full(
                    color_enabled,
                    self.state.color_id(),
                    self.state.color_intensity(),
                ),
                SoundPatch::full(
                    sound_enabled,
                    self.state.sound_id(),
                    self.state.sound_volume(),
                ),
            )
        } else {
            DesiredPatch::all_disabled()
        };
        self.publish_desired(&patch);
    }

    fn apply_current_remote_state(&self) {
        self.apply_remote_state(self.state.color_enabled(), self.state.sound_enabled());
    }

    // Stores color settings while stopped, or re-sends remote mode when playing.
    fn publish_color_settings(&self) {
        if self.state.any_enabled() {
            self.apply_current_remote_state();
        } else {
            self.publish_desired(&DesiredPatch::stopped_with_color(ColorPatch::full(
                false,
                self.state.color_id(),
                self.state.color_intensity(),
            )));
        }
    }
}

impl<T: ShadowTransport> ShadowSync for RestoreDevice<T> {
    fn merge_reported(&mut self, reported: &Value) -> bool {
        RestoreDevice::merge_reported(self, reported)
    }

    fn publish_desired(&self, patch: &DesiredPatch) {
        RestoreDevice::publish_desired(self, patch);
    }
}

impl<T: ShadowTransport> Subscribable for RestoreDevice<T> {
    fn on_update<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_update(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }

    fn clear_subscriptions(&self) {
        self.callbacks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MemoryTransport;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    const THING: &str = "thing-1";

    fn device() -> (RestoreDevice<MemoryTransport>, Arc<MemoryTransport>) {
        let (transport, _rx) = MemoryTransport::new(8);
        let transport = Arc::new(transport);
        let identity = DeviceIdentity::new("Nursery", THING, "aa:bb:cc:dd:ee:ff");
        (RestoreDevice::new(identity, Arc::clone(&transport)), transport)
    }

    fn last_patch(transport: &MemoryTransport) -> Value {
        transport.last_published(THING).unwrap()
    }

    // ========== Inbound ==========

    #[test]
    fn merge_applies_present_fields_only() {
        let (mut device, _) = device();
        device.merge_reported(&json!({"color": {"id": 12}}));

        assert_eq!(device.state().color_id(), 12);
        assert_eq!(device.state().color_intensity(), Level::MIDPOINT);
        assert_eq!(device.state().sound_id(), 10040);
        assert!(!device.is_online());
    }

    #[test]
    fn merge_returns_whether_anything_changed() {
        let (mut device, _) = device();
        assert!(device.merge_reported(&json!({"connected": true})));
        assert!(!device.merge_reported(&json!({"connected": true})));
        assert!(!device.merge_reported(&json!({})));
    }

    #[test]
    fn merge_notifies_once_even_without_changes() {
        let (mut device, _) = device();
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        device.on_update(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        device.merge_reported(&json!({"color": {"enabled": true, "id": 3, "i": 9}}));
        device.merge_reported(&json!({}));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn merge_skips_malformed_fields() {
        let (mut device, _) = device();
        device.merge_reported(&json!({"color": {"i": "bright", "id": 4}}));
        assert_eq!(device.state().color_intensity(), Level::MIDPOINT);
        assert_eq!(device.state().color_id(), 4);
    }

    #[test]
    fn merge_zero_volume_keeps_last_audible() {
        let (mut device, _) = device();
        device.merge_reported(&json!({"sound": {"v": 20000}}));
        device.merge_reported(&json!({"sound": {"v": 0}}));

        assert!(device.state().sound_volume().is_zero());
        assert_eq!(device.state().last_nonzero_sound_volume(), Level::new(20000));
    }

    #[test]
    fn refresh_reads_snapshot() {
        let (mut device, transport) = device();
        assert_eq!(device.refresh().unwrap(), None);

        transport.set_reported(THING, json!({"deviceInfo": {"f": "3.21"}, "connected": true}));
        assert_eq!(device.refresh().unwrap(), Some(true));
        assert_eq!(device.state().firmware_version(), Some("3.21"));
        assert!(device.is_online());

        assert_eq!(device.refresh().unwrap(), Some(false));
    }

    // ========== Outbound ==========

    #[test]
    fn turn_on_routine_publishes_content_only() {
        let (device, transport) = device();
        device.turn_on_routine_default();
        assert_eq!(
            last_patch(&transport),
            json!({"content": {"playing": "routine", "paused": false, "offset": 0, "step": 1}})
        );

        device.turn_on_routine(4);
        assert_eq!(last_patch(&transport)["content"]["step"], json!(4));
    }

    #[test]
    fn turn_off_publishes_stop() {
        let (device, transport) = device();
        device.turn_off();
        assert_eq!(
            last_patch(&transport),
            json!({"content": {"playing": "none", "paused": false, "offset": 0, "step": 0}})
        );
    }

    #[test]
    fn set_light_enabled_keeps_sound_flag() {
        let (mut device, transport) = device();
        device.merge_reported(&json!({"sound": {"enabled": true}}));

        device.set_light_enabled(true);
        let patch = last_patch(&transport);
        assert_eq!(patch["content"]["playing"], json!("remote"));
        assert_eq!(patch["color"], json!({"enabled": true, "id": 229, "i": 32767}));
        assert_eq!(patch["sound"], json!({"enabled": true, "id": 10040, "v": 32767}));
        // Local flags wait for the device to report.
        assert!(!device.state().color_enabled());
    }

    #[test]
    fn disabling_everything_sends_flags_only() {
        let (device, transport) = device();
        device.set_light_enabled(false);
        assert_eq!(
            last_patch(&transport),
            json!({
                "content": {"playing": "none", "paused": false, "offset": 0, "step": 0},
                "color": {"enabled": false},
                "sound": {"enabled": false}
            })
        );
    }

    #[test]
    fn enabling_muted_sound_restores_volume() {
        let (mut device, transport) = device();
        device.merge_reported(&json!({"sound": {"v": 20000}}));
        device.merge_reported(&json!({"sound": {"v": 0}}));

        device.set_sound_enabled(true);
        assert_eq!(device.state().sound_volume(), Level::new(20000));
        assert_eq!(last_patch(&transport)["sound"]["v"], json!(20000));
    }

    #[test]
    fn disabling_sound_keeps_zero_volume() {
        let (mut device, transport) = device();
        device.merge_reported(&json!({"sound": {"v": 0}, "color": {"enabled": true}}));

        device.set_sound_enabled(false);
        assert!(device.state().sound_volume().is_zero());
        assert_eq!(last_patch(&transport)["sound"]["v"], json!(0));
    }

    #[test]
    fn brightness_zero_turns_light_off() {
        let (mut device, transport) = device();
        device.merge_reported(&json!({"color": {"enabled": true}}));

        device.set_light_brightness_percent(0.0);
        assert!(!device.state().color_enabled());
        assert_eq!(last_patch(&transport)["color"]["enabled"], json!(false));
    }

    #[test]
    fn brightness_half_rounds_to_even() {
        let (mut device, transport) = device();
        device.set_light_brightness_percent(50.0);

        assert_eq!(device.state().color_intensity(), Level::new(32768));
        assert!(device.state().color_enabled());
        let patch = last_patch(&transport);
        assert_eq!(patch["content"]["playing"], json!("remote"));
        assert_eq!(patch["color"], json!({"enabled": true, "id": 229, "i": 32768}));
    }

    #[test]
    fn brightness_clamps_out_of_range() {
        let (mut device, _) = device();
        device.set_light_brightness_percent(140.0);
        assert_eq!(device.state().color_intensity(), Level::MAX);

        device.set_light_brightness_percent(-3.0);
        assert_eq!(device.state().color_intensity(), Level::MIN);
        assert!(!device.state().color_enabled());

        device.set_light_brightness_percent(f64::NAN);
        assert_eq!(device.state().color_intensity(), Level::MAX);
        assert!(device.state().color_enabled());
    }

    #[test]
    fn color_id_while_stopped_persists_without_playing() {
        let (mut device, transport) = device();
        device.set_color_id(5);

        assert_eq!(
            last_patch(&transport),
            json!({
                "content": {"playing": "none", "paused": false, "offset": 0, "step": 0},
                "color": {"enabled": false, "id": 5, "i": 32767}
            })
        );
    }

    #[test]
    fn color_id_while_playing_resends_remote() {
        let (mut device, transport) = device();
        device.merge_reported(&json!({"color": {"enabled": true}, "sound": {"id": 3, "v": 100}}));

        device.set_color_id(5);
        let patch = last_patch(&transport);
        assert_eq!(patch["content"]["playing"], json!("remote"));
        assert_eq!(patch["color"], json!({"enabled": true, "id": 5, "i": 32767}));
        assert_eq!(patch["sound"], json!({"enabled": false, "id": 3, "v": 100}));
    }

    #[test]
    fn color_id_clamps() {
        let (mut device, _) = device();
        device.set_color_id(-3);
        assert_eq!(device.state().color_id(), 0);
        device.set_color_id(70_000);
        assert_eq!(device.state().color_id(), u16::MAX);
    }

    #[test]
    fn color_intensity_raw_clamps_and_persists() {
        let (mut device, transport) = device();
        device.set_color_intensity_raw(100_000);

        assert_eq!(device.state().color_intensity(), Level::MAX);
        assert_eq!(last_patch(&transport)["color"]["i"], json!(65535));
        assert!(last_patch(&transport).get("sound").is_none());
    }

    #[test]
    fn volume_while_stopped_persists_sound() {
        let (mut device, transport) = device();
        device.set_sound_volume_percent(25.0);

        assert_eq!(device.state().sound_volume(), Level::new(16384));
        assert_eq!(device.state().last_nonzero_sound_volume(), Level::new(16384));
        assert_eq!(
            last_patch(&transport),
            json!({
                "content": {"playing": "none", "paused": false, "offset": 0, "step": 0},
                "sound": {"enabled": false, "id": 10040, "v": 16384}
            })
        );
    }

    #[test]
    fn volume_zero_never_becomes_last_audible() {
        let (mut device, transport) = device();
        device.merge_reported(&json!({"sound": {"enabled": true}}));

        device.set_sound_volume_percent(0.0);
        assert!(device.state().sound_volume().is_zero());
        assert_eq!(device.state().last_nonzero_sound_volume(), Level::MIDPOINT);
        assert_eq!(last_patch(&transport)["content"]["playing"], json!("remote"));
    }

    #[test]
    fn publish_failure_is_dropped() {
        let (mut device, transport) = device();
        transport.fail_publishes(true);

        device.set_light_brightness_percent(80.0);
        assert!(transport.published(THING).is_empty());
        assert!(device.state().color_enabled());
    }

    // ========== Snapshots ==========

    #[test]
    fn summary_reflects_state() {
        let (mut device, _) = device();
        device.merge_reported(&json!({
            "deviceInfo": {"f": 5},
            "connected": true,
            "content": {"playing": "remote"},
            "color": {"enabled": true},
        }));

        let summary = device.summary();
        assert_eq!(summary.device_name, "Nursery");
        assert_eq!(summary.thing_name, THING);
        assert_eq!(summary.firmware_version.as_deref(), Some("5"));
        assert_eq!(summary.current_playing, Playing::Remote);
        assert!(summary.is_on);
        assert!(summary.is_online);
        assert!(!summary.sound_enabled);
    }

    #[test]
    fn registry_info_tracks_firmware() {
        let (mut device, _) = device();
        assert!(device.registry_info().sw_version.is_none());

        device.merge_reported(&json!({"deviceInfo": {"f": "5.2.1"}}));
        let info = device.registry_info();
        assert_eq!(info.sw_version.as_deref(), Some("5.2.1"));
        assert_eq!(info.identifiers[0].1, THING);
        assert_eq!(info.connections.len(), 2);
    }

    #[test]
    fn shadow_sync_delegates() {
        fn drive(sync: &mut impl ShadowSync) -> bool {
            sync.publish_desired(&DesiredPatch::stop());
            sync.merge_reported(&json!({"connected": true}))
        }

        let (mut device, transport) = device();
        assert!(drive(&mut device));
        assert_eq!(transport.published(THING).len(), 1);
    }
}
