// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity surfaces exposed by a Restore.
//!
//! A host integration presents one Restore as six entities: a light, a
//! sound switch, three number controls and a media player. The adapters
//! here map those surfaces onto the device controls.

use std::fmt;

use serde::Serialize;

use super::{DeviceIdentity, RestoreDevice};
use crate::protocol::ShadowTransport;

/// The entity surfaces of a Restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    /// Light on/off and brightness.
    Light,
    /// Sound on/off switch.
    Sound,
    /// Sound volume percentage.
    SoundVolume,
    /// Raw color id.
    ColorId,
    /// Raw color intensity.
    ColorIntensity,
    /// Sound on/off and volume as a media player.
    SoundMedia,
}

impl EntityKind {
    /// Every entity kind, in platform order.
    pub const ALL: [Self; 6] = [
        Self::Light,
        Self::Sound,
        Self::SoundVolume,
        Self::ColorId,
        Self::ColorIntensity,
        Self::SoundMedia,
    ];

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Sound => "Sound",
            Self::SoundVolume => "Sound Volume",
            Self::ColorId => "Color ID",
            Self::ColorIntensity => "Color Intensity",
            Self::SoundMedia => "Sound Media",
        }
    }

    /// Returns the `(min, max, step)` range of a number entity.
    #[must_use]
    pub const fn number_range(self) -> Option<(f64, f64, f64)> {
        match self {
            Self::SoundVolume => Some((0.0, 100.0, 1.0)),
            Self::ColorId | Self::ColorIntensity => Some((0.0, 65535.0, 1.0)),
            Self::Light | Self::Sound | Self::SoundMedia => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Naming of one entity of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    /// The surface.
    pub kind: EntityKind,
    /// Stable identifier: `{thing_name}_{label}` in snake case.
    pub unique_id: String,
    /// Display name: `{device_name} {label}`.
    pub name: String,
}

impl EntityDescriptor {
    /// Names an entity of the given device.
    #[must_use]
    pub fn new(kind: EntityKind, identity: &DeviceIdentity) -> Self {
        let label = kind.label();
        Self {
            kind,
            unique_id: format!(
                "{}_{}",
                identity.thing_name,
                label.to_lowercase().replace(' ', "_")
            ),
            name: format!("{} {label}", identity.device_name),
        }
    }
}

/// Media player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaState {
    /// Sound is enabled.
    Playing,
    /// Sound is disabled.
    Idle,
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_i64(value: f64) -> i64 {
    // Float-to-int casts saturate; NaN becomes 0.
    value.round_ties_even() as i64
}

impl<T: ShadowTransport> RestoreDevice<T> {
    /// Describes every entity of this device.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityDescriptor> {
        EntityKind::ALL
            .iter()
            .map(|kind| EntityDescriptor::new(*kind, &self.identity))
            .collect()
    }

    // ========== Light ==========

    /// Light brightness on the `0..=255` scale.
    #[must_use]
    pub fn light_brightness(&self) -> u8 {
        self.state.color_intensity().to_u8_scale()
    }

    /// Turns the light on, optionally at a `0..=255` brightness.
    pub fn turn_light_on(&mut self, brightness: Option<u8>) {
        match brightness {
            Some(b) => self.set_light_brightness_percent(f64::from(b) / 255.0 * 100.0),
            None => self.set_light_enabled(true),
        }
    }

    /// Turns the light off.
    pub fn turn_light_off(&self) {
        self.set_light_enabled(false);
    }

    // ========== Sound switch ==========

    /// Turns sound on.
    pub fn turn_sound_on(&mut self) {
        self.set_sound_enabled(true);
    }

    /// Turns sound off.
    pub fn turn_sound_off(&mut self) {
        self.set_sound_enabled(false);
    }

    // ========== Numbers ==========

    /// Current color id as a number value.
    #[must_use]
    pub fn color_id_value(&self) -> f64 {
        f64::from(self.state.color_id())
    }

    /// Sets the color id from a number value, rounding to the nearest id.
    pub fn set_color_id_value(&mut self, value: f64) {
        self.set_color_id(round_to_i64(value));
    }

    /// Current color intensity as a number value.
    #[must_use]
    pub fn color_intensity_value(&self) -> f64 {
        f64::from(self.state.color_intensity().value())
    }

    /// Sets the raw color intensity from a number value.
    pub fn set_color_intensity_value(&mut self, value: f64) {
        self.set_color_intensity_raw(round_to_i64(value));
    }

    // ========== Media player ==========

    /// Media player state, following the sound switch.
    #[must_use]
    pub fn media_state(&self) -> MediaState {
        if self.state.sound_enabled() {
            MediaState::Playing
        } else {
            MediaState::Idle
        }
    }

    /// Volume between 0.0 and 1.0.
    #[must_use]
    pub fn volume_level(&self) -> f64 {
        self.state.sound_volume().fraction().clamp(0.0, 1.0)
    }

    /// Sets the volume from a 0.0 to 1.0 value.
    pub fn set_volume_level(&mut self, volume: f64) {
        self.set_sound_volume_percent(volume * 100.0);
    }

    /// Starts sound playback.
    pub fn media_play(&mut self) {
        self.set_sound_enabled(true);
    }

    /// Stops sound playback.
    pub fn media_stop(&mut self) {
        self.set_sound_enabled(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MemoryTransport;
    use crate::types::Level;
    use serde_json::json;
    use std::sync::Arc;

    fn device() -> (RestoreDevice<MemoryTransport>, Arc<MemoryTransport>) {
        let (transport, _rx) = MemoryTransport::new(8);
        let transport = Arc::new(transport);
        let identity = DeviceIdentity::new("Nursery Restore", "thing-1", "AA:BB:CC:DD:EE:F1");
        (RestoreDevice::new(identity, Arc::clone(&transport)), transport)
    }

    #[test]
    fn entity_labels_and_ids() {
        let (device, _) = device();
        let entities = device.entities();
        assert_eq!(entities.len(), 6);

        let ids: Vec<&str> = entities.iter().map(|e| e.unique_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "thing-1_light",
                "thing-1_sound",
                "thing-1_sound_volume",
                "thing-1_color_id",
                "thing-1_color_intensity",
                "thing-1_sound_media",
            ]
        );
        assert_eq!(entities[4].name, "Nursery Restore Color Intensity");
    }

    #[test]
    fn number_ranges() {
        assert_eq!(EntityKind::SoundVolume.number_range(), Some((0.0, 100.0, 1.0)));
        assert_eq!(EntityKind::ColorId.number_range(), Some((0.0, 65535.0, 1.0)));
        assert!(EntityKind::Light.number_range().is_none());
        assert_eq!(EntityKind::SoundMedia.to_string(), "Sound Media");
    }

    #[test]
    fn light_brightness_scale() {
        let (mut device, _) = device();
        device.merge_reported(&json!({"color": {"i": 65535}}));
        assert_eq!(device.light_brightness(), 255);

        device.merge_reported(&json!({"color": {"i": 0}}));
        assert_eq!(device.light_brightness(), 0);
    }

    #[test]
    fn turn_light_on_with_brightness() {
        let (mut device, transport) = device();
        device.turn_light_on(Some(255));

        assert_eq!(device.state().color_intensity(), Level::MAX);
        assert!(device.state().color_enabled());
        let patch = transport.last_published("thing-1").unwrap();
        assert_eq!(patch["color"]["i"], json!(65535));
    }

    #[test]
    fn turn_light_on_without_brightness_keeps_level() {
        let (mut device, transport) = device();
        device.turn_light_on(None);

        assert_eq!(device.state().color_intensity(), Level::MIDPOINT);
        let patch = transport.last_published("thing-1").unwrap();
        assert_eq!(patch["color"]["enabled"], json!(true));
    }

    #[test]
    fn turn_light_off_disables() {
        let (device, transport) = device();
        device.turn_light_off();
        let patch = transport.last_published("thing-1").unwrap();
        assert_eq!(patch["color"], json!({"enabled": false}));
    }

    #[test]
    fn media_state_follows_sound_flag() {
        let (mut device, _) = device();
        assert_eq!(device.media_state(), MediaState::Idle);

        device.merge_reported(&json!({"sound": {"enabled": true}}));
        assert_eq!(device.media_state(), MediaState::Playing);
    }

    #[test]
    fn volume_level_round_trip() {
        let (mut device, transport) = device();
        device.set_volume_level(0.5);

        assert_eq!(device.state().sound_volume(), Level::new(32768));
        assert!((device.volume_level() - 0.5).abs() < 0.001);
        let patch = transport.last_published("thing-1").unwrap();
        assert_eq!(patch["sound"]["v"], json!(32768));
    }

    #[test]
    fn media_play_restores_volume() {
        let (mut device, transport) = device();
        device.merge_reported(&json!({"sound": {"v": 0}}));

        device.media_play();
        assert_eq!(
            transport.last_published("thing-1").unwrap()["sound"]["v"],
            json!(32767)
        );

        device.media_stop();
        assert_eq!(
            transport.last_published("thing-1").unwrap()["content"]["playing"],
            json!("none")
        );
    }

    #[test]
    fn sound_switch() {
        let (mut device, transport) = device();
        device.turn_sound_on();
        assert_eq!(
            transport.last_published("thing-1").unwrap()["sound"]["enabled"],
            json!(true)
        );
        device.turn_sound_off();
        assert_eq!(
            transport.last_published("thing-1").unwrap()["sound"],
            json!({"enabled": false})
        );
    }

    #[test]
    fn number_setters_round() {
        let (mut device, _) = device();
        device.set_color_id_value(4.6);
        assert!((device.color_id_value() - 5.0).abs() < f64::EPSILON);

        device.set_color_intensity_value(1000.5);
        assert!((device.color_intensity_value() - 1000.0).abs() < f64::EPSILON);

        device.set_color_intensity_value(f64::NAN);
        assert!(device.color_intensity_value().abs() < f64::EPSILON);
    }
}
