// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control requests delivered to a running session.

use crate::device::RestoreDevice;
use crate::protocol::ShadowTransport;

/// A control call on one device, as a value.
///
/// Each variant maps onto the [`RestoreDevice`] method of the same name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceControl {
    /// Start the device routine at a step.
    TurnOnRoutine(u32),
    /// Stop playback.
    TurnOff,
    /// Enable or disable the light.
    SetLightEnabled(bool),
    /// Enable or disable sound.
    SetSoundEnabled(bool),
    /// Set light brightness as a percentage.
    SetLightBrightnessPercent(f64),
    /// Set the raw color id.
    SetColorId(i64),
    /// Set the raw color intensity.
    SetColorIntensityRaw(i64),
    /// Set sound volume as a percentage.
    SetSoundVolumePercent(f64),
    /// Publish remote-mode playback for explicit flags.
    ApplyRemoteState {
        /// Light flag.
        color_enabled: bool,
        /// Sound flag.
        sound_enabled: bool,
    },
}

impl DeviceControl {
    /// Runs the control on a device.
    pub fn apply<T: ShadowTransport>(self, device: &mut RestoreDevice<T>) {
        match self {
            Self::TurnOnRoutine(step) => device.turn_on_routine(step),
            Self::TurnOff => device.turn_off(),
            Self::SetLightEnabled(enabled) => device.set_light_enabled(enabled),
            Self::SetSoundEnabled(enabled) => device.set_sound_enabled(enabled),
            Self::SetLightBrightnessPercent(percent) => {
                device.set_light_brightness_percent(percent);
            }
            Self::SetColorId(color_id) => device.set_color_id(color_id),
            Self::SetColorIntensityRaw(raw) => device.set_color_intensity_raw(raw),
            Self::SetSoundVolumePercent(percent) => device.set_sound_volume_percent(percent),
            Self::ApplyRemoteState {
                color_enabled,
                sound_enabled,
            } => device.apply_remote_state(color_enabled, sound_enabled),
        }
    }
}

/// A control addressed to a device by thing name.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlRequest {
    /// The addressed device.
    pub thing_name: String,
    /// The control to run.
    pub control: DeviceControl,
}

impl ControlRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(thing_name: impl Into<String>, control: DeviceControl) -> Self {
        Self {
            thing_name: thing_name.into(),
            control,
        }
    }
}
