// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sections of a desired-state patch.

use serde::{Deserialize, Serialize};

use crate::types::{Level, Playing};

/// The `content` section: what the device plays.
///
/// The firmware always expects the full section, so every field is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPatch {
    /// Playback mode.
    pub playing: Playing,
    /// Whether playback is paused.
    pub paused: bool,
    /// Offset into the current content.
    pub offset: u32,
    /// Routine step.
    pub step: u32,
}

impl ContentPatch {
    /// Stops playback.
    #[must_use]
    pub fn stopped() -> Self {
        Self::playing(Playing::None, 0)
    }

    /// Switches to remotely supplied color and sound.
    #[must_use]
    pub fn remote() -> Self {
        Self::playing(Playing::Remote, 0)
    }

    /// Starts the device routine at the given step.
    #[must_use]
    pub fn routine(step: u32) -> Self {
        Self::playing(Playing::Routine, step)
    }

    fn playing(playing: Playing, step: u32) -> Self {
        Self {
            playing,
            paused: false,
            offset: 0,
            step,
        }
    }
}

/// The `color` section.
///
/// When only `enabled` is set, the device keeps its stored id and intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPatch {
    /// Whether the light is on.
    pub enabled: bool,
    /// Color id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u16>,
    /// Light intensity.
    #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Level>,
}

impl ColorPatch {
    /// A color section carrying only the enabled flag.
    #[must_use]
    pub const fn enabled_only(enabled: bool) -> Self {
        Self {
            enabled,
            id: None,
            intensity: None,
        }
    }

    /// A color section carrying every field.
    #[must_use]
    pub const fn full(enabled: bool, id: u16, intensity: Level) -> Self {
        Self {
            enabled,
            id: Some(id),
            intensity: Some(intensity),
        }
    }
}

/// The `sound` section.
///
/// When only `enabled` is set, the device keeps its stored id and volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundPatch {
    /// Whether sound is on.
    pub enabled: bool,
    /// Sound id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u16>,
    /// Sound volume.
    #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Level>,
}

impl SoundPatch {
    /// A sound section carrying only the enabled flag.
    #[must_use]
    pub const fn enabled_only(enabled: bool) -> Self {
        Self {
            enabled,
            id: None,
            volume: None,
        }
    }

    /// A sound section carrying every field.
    #[must_use]
    pub const fn full(enabled: bool, id: u16, volume: Level) -> Self {
        Self {
            enabled,
            id: Some(id),
            volume: Some(volume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_serializes_every_field() {
        assert_eq!(
            serde_json::to_value(ContentPatch::routine(3)).unwrap(),
            json!({"playing": "routine", "paused": false, "offset": 0, "step": 3})
        );
        assert_eq!(
            serde_json::to_value(ContentPatch::stopped()).unwrap(),
            json!({"playing": "none", "paused": false, "offset": 0, "step": 0})
        );
    }

    #[test]
    fn color_uses_shadow_keys() {
        assert_eq!(
            serde_json::to_value(ColorPatch::full(true, 229, Level::new(100))).unwrap(),
            json!({"enabled": true, "id": 229, "i": 100})
        );
        assert_eq!(
            serde_json::to_value(ColorPatch::enabled_only(false)).unwrap(),
            json!({"enabled": false})
        );
    }

    #[test]
    fn sound_uses_shadow_keys() {
        assert_eq!(
            serde_json::to_value(SoundPatch::full(false, 10040, Level::MIN)).unwrap(),
            json!({"enabled": false, "id": 10040, "v": 0})
        );
        let parsed: SoundPatch = serde_json::from_value(json!({"enabled": true})).unwrap();
        assert_eq!(parsed, SoundPatch::enabled_only(true));
    }
}
