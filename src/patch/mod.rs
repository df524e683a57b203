// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Desired-state patches.
//!
//! Every control on a Restore is expressed as a partial document merged
//! into the `desired` half of its shadow.
//!
//! # Patch Shapes
//!
//! | Constructor | `content.playing` | `color` | `sound` |
//! |-------------|-------------------|---------|---------|
//! | [`DesiredPatch::routine`] | `routine` | - | - |
//! | [`DesiredPatch::stop`] | `none` | - | - |
//! | [`DesiredPatch::remote`] | `remote` | full | full |
//! | [`DesiredPatch::all_disabled`] | `none` | `enabled` only | `enabled` only |
//! | [`DesiredPatch::stopped_with_color`] | `none` | full | - |
//! | [`DesiredPatch::stopped_with_sound`] | `none` | - | full |
//!
//! The firmware treats remote mode as one unit across light and sound, so
//! a remote patch always carries both sections even when only one control
//! changed.
//!
//! # Examples
//!
//! ```
//! use hatch_restore::patch::{ColorPatch, DesiredPatch, SoundPatch};
//! use hatch_restore::types::Level;
//! use serde_json::json;
//!
//! let patch = DesiredPatch::remote(
//!     ColorPatch::full(true, 229, Level::MAX),
//!     SoundPatch::full(false, 10040, Level::MIDPOINT),
//! );
//!
//! assert_eq!(patch.to_value()["content"]["playing"], json!("remote"));
//! assert_eq!(patch.to_value()["sound"]["v"], json!(32767));
//! ```

mod section;

pub use section::{ColorPatch, ContentPatch, SoundPatch};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Playing;

/// A partial desired-state document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DesiredPatch {
    /// Playback section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentPatch>,
    /// Light section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorPatch>,
    /// Sound section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<SoundPatch>,
}

impl DesiredPatch {
    /// Starts the device routine at the given step.
    #[must_use]
    pub fn routine(step: u32) -> Self {
        Self {
            content: Some(ContentPatch::routine(step)),
            ..Self::default()
        }
    }

    /// Stops whatever is playing, leaving color and sound untouched.
    #[must_use]
    pub fn stop() -> Self {
        Self {
            content: Some(ContentPatch::stopped()),
            ..Self::default()
        }
    }

    /// Plays remotely supplied color and sound.
    #[must_use]
    pub fn remote(color: ColorPatch, sound: SoundPatch) -> Self {
        Self {
            content: Some(ContentPatch::remote()),
            color: Some(color),
            sound: Some(sound),
        }
    }

    /// Stops playback and disables both light and sound.
    ///
    /// Ids and levels are omitted; the device keeps its stored values.
    #[must_use]
    pub fn all_disabled() -> Self {
        Self {
            content: Some(ContentPatch::stopped()),
            color: Some(ColorPatch::enabled_only(false)),
            sound: Some(SoundPatch::enabled_only(false)),
        }
    }

    /// Stops playback while storing color settings on the device.
    #[must_use]
    pub fn stopped_with_color(color: ColorPatch) -> Self {
        Self {
            content: Some(ContentPatch::stopped()),
            color: Some(color),
            sound: None,
        }
    }

    /// Stops playback while storing sound settings on the device.
    #[must_use]
    pub fn stopped_with_sound(sound: SoundPatch) -> Self {
        Self {
            content: Some(ContentPatch::stopped()),
            color: None,
            sound: Some(sound),
        }
    }

    /// Returns the playback mode this patch requests, if any.
    #[must_use]
    pub fn playing(&self) -> Option<&Playing> {
        self.content.as_ref().map(|c| &c.playing)
    }

    /// Returns `true` if the patch switches the device to remote mode.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self.playing(), Some(Playing::Remote))
    }

    /// Returns `true` if the patch has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.color.is_none() && self.sound.is_none()
    }

    /// Renders the patch as a JSON document.
    #[must_use]
    pub fn to_value(&self) -> Value {
        // Plain structs with string keys always serialize.
        serde_json::to_value(self).unwrap_or_default()
    }
}
