// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Restore state tracking.

use serde::Serialize;

use crate::types::{Level, Playing};

use super::StateChange;

/// Default `color.id` until the device reports one.
pub const DEFAULT_COLOR_ID: u16 = 229;

/// Default `sound.id` until the device reports one.
pub const DEFAULT_SOUND_ID: u16 = 10040;

/// Locally cached interpretation of a Restore shadow.
///
/// Every field has a value from construction on; the defaults match what
/// the device ships with, so patches built before the first reported update
/// still carry sensible ids and levels.
///
/// # Invariant
///
/// `last_nonzero_sound_volume` always holds the most recent sound volume
/// that was observed or set above zero. It is never zero itself.
///
/// # Examples
///
/// ```
/// use hatch_restore::state::RestoreState;
/// use hatch_restore::types::Level;
///
/// let mut state = RestoreState::new();
/// state.set_sound_volume(Level::new(20000));
/// state.set_sound_volume(Level::MIN);
///
/// assert_eq!(state.sound_volume(), Level::MIN);
/// assert_eq!(state.last_nonzero_sound_volume(), Level::new(20000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreState {
    firmware_version: Option<String>,
    current_playing: Playing,
    is_online: bool,
    color_enabled: bool,
    color_id: u16,
    color_intensity: Level,
    sound_enabled: bool,
    sound_id: u16,
    sound_volume: Level,
    last_nonzero_sound_volume: Level,
}

impl Default for RestoreState {
    fn default() -> Self {
        Self {
            firmware_version: None,
            current_playing: Playing::None,
            is_online: false,
            color_enabled: false,
            color_id: DEFAULT_COLOR_ID,
            color_intensity: Level::MIDPOINT,
            sound_enabled: false,
            sound_id: DEFAULT_SOUND_ID,
            sound_volume: Level::MIDPOINT,
            last_nonzero_sound_volume: Level::MIDPOINT,
        }
    }
}

impl RestoreState {
    /// Creates a state holding the device defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Device ==========

    /// Firmware version, once reported.
    #[must_use]
    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    /// Current playback mode.
    #[must_use]
    pub fn current_playing(&self) -> &Playing {
        &self.current_playing
    }

    /// Whether the device is connected to the cloud.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.is_online
    }

    /// Sets the firmware version.
    pub fn set_firmware_version(&mut self, version: impl Into<String>) {
        self.firmware_version = Some(version.into());
    }

    /// Sets the playback mode.
    pub fn set_current_playing(&mut self, playing: Playing) {
        self.current_playing = playing;
    }

    /// Sets the online flag.
    pub fn set_online(&mut self, online: bool) {
        self.is_online = online;
    }

    // ========== Color ==========

    /// Whether the light is enabled.
    #[must_use]
    pub fn color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Selected color id.
    #[must_use]
    pub fn color_id(&self) -> u16 {
        self.color_id
    }

    /// Light intensity.
    #[must_use]
    pub fn color_intensity(&self) -> Level {
        self.color_intensity
    }

    /// Enables or disables the light.
    pub fn set_color_enabled(&mut self, enabled: bool) {
        self.color_enabled = enabled;
    }

    /// Sets the color id.
    pub fn set_color_id(&mut self, id: u16) {
        self.color_id = id;
    }

    /// Sets the light intensity.
    pub fn set_color_intensity(&mut self, intensity: Level) {
        self.color_intensity = intensity;
    }

    // ========== Sound ==========

    /// Whether sound is enabled.
    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Selected sound id.
    #[must_use]
    pub fn sound_id(&self) -> u16 {
        self.sound_id
    }

    /// Sound volume as last observed or set.
    #[must_use]
    pub fn sound_volume(&self) -> Level {
        self.sound_volume
    }

    /// Most recent sound volume above zero.
    #[must_use]
    pub fn last_nonzero_sound_volume(&self) -> Level {
        self.last_nonzero_sound_volume
    }

    /// Enables or disables sound.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    /// Sets the sound id.
    pub fn set_sound_id(&mut self, id: u16) {
        self.sound_id = id;
    }

    /// Sets the sound volume, remembering it if it is audible.
    pub fn set_sound_volume(&mut self, volume: Level) {
        self.sound_volume = volume;
        if !volume.is_zero() {
            self.last_nonzero_sound_volume = volume;
        }
    }

    /// Restores the sound volume from the last audible value.
    ///
    /// Returns `true` if the volume was zero and has been restored.
    pub fn restore_audible_volume(&mut self) -> bool {
        if self.sound_volume.is_zero() {
            self.sound_volume = self.last_nonzero_sound_volume;
            true
        } else {
            false
        }
    }

    // ========== Derived ==========

    /// Top-level on/off signal: the light state.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.color_enabled
    }

    /// Returns `true` if either the light or the sound is enabled.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.color_enabled || self.sound_enabled
    }

    /// Light intensity as a percentage rounded to one decimal.
    #[must_use]
    pub fn light_brightness_percent(&self) -> f64 {
        self.color_intensity.percent()
    }

    /// Sound volume as a percentage rounded to one decimal.
    #[must_use]
    pub fn sound_volume_percent(&self) -> f64 {
        self.sound_volume.percent()
    }

    // ========== State Changes ==========

    /// Applies a state change and returns whether the state actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        macro_rules! replace {
            ($field:ident, $value:expr) => {{
                let value = $value;
                if self.$field == value {
                    false
                } else {
                    self.$field = value;
                    true
                }
            }};
        }

        match change {
            StateChange::FirmwareVersion(version) => {
                replace!(firmware_version, Some(version.clone()))
            }
            StateChange::Playing(playing) => replace!(current_playing, playing.clone()),
            StateChange::Online(online) => replace!(is_online, *online),
            StateChange::ColorEnabled(enabled) => replace!(color_enabled, *enabled),
            StateChange::ColorId(id) => replace!(color_id, *id),
            StateChange::ColorIntensity(level) => replace!(color_intensity, *level),
            StateChange::SoundEnabled(enabled) => replace!(sound_enabled, *enabled),
            StateChange::SoundId(id) => replace!(sound_id, *id),
            StateChange::SoundVolume(level) => {
                let before = (self.sound_volume, self.last_nonzero_sound_volume);
                self.set_sound_volume(*level);
                before != (self.sound_volume, self.last_nonzero_sound_volume)
            }
            StateChange::Batch(changes) => {
                let mut any_changed = false;
                for c in changes {
                    if self.apply(c) {
                        any_changed = true;
                    }
                }
                any_changed
            }
        }
    }

    /// Resets all fields to the device defaults.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
