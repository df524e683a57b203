// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the building blocks for updating a
//! [`RestoreState`](super::RestoreState). Each variant corresponds to one
//! recognized path of a reported shadow document.
//!
//! # Examples
//!
//! ```
//! use hatch_restore::state::{RestoreState, StateChange};
//! use hatch_restore::types::Level;
//!
//! let mut state = RestoreState::new();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::ColorEnabled(true)));
//! assert!(!state.apply(&StateChange::ColorEnabled(true)));
//!
//! state.apply(&StateChange::SoundVolume(Level::new(1200)));
//! assert_eq!(state.last_nonzero_sound_volume(), Level::new(1200));
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{Level, Playing};

/// A change to one field of the Restore state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    /// `deviceInfo.f` - firmware version.
    FirmwareVersion(String),

    /// `content.playing` - playback mode.
    Playing(Playing),

    /// `connected` - whether the device is online.
    Online(bool),

    /// `color.enabled` - light on/off.
    ColorEnabled(bool),

    /// `color.id` - selected color.
    ColorId(u16),

    /// `color.i` - light intensity.
    ColorIntensity(Level),

    /// `sound.enabled` - sound on/off.
    SoundEnabled(bool),

    /// `sound.id` - selected sound.
    SoundId(u16),

    /// `sound.v` - sound volume.
    SoundVolume(Level),

    /// Multiple changes from the same document.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Creates a batch of changes.
    #[must_use]
    pub fn batch(changes: Vec<StateChange>) -> Self {
        Self::Batch(changes)
    }

    /// Returns the dotted shadow path this change was read from.
    ///
    /// Batches have no single path and return `None`.
    #[must_use]
    pub fn path(&self) -> Option<&'static str> {
        match self {
            Self::FirmwareVersion(_) => Some("deviceInfo.f"),
            Self::Playing(_) => Some("content.playing"),
            Self::Online(_) => Some("connected"),
            Self::ColorEnabled(_) => Some("color.enabled"),
            Self::ColorId(_) => Some("color.id"),
            Self::ColorIntensity(_) => Some("color.i"),
            Self::SoundEnabled(_) => Some("sound.enabled"),
            Self::SoundId(_) => Some("sound.id"),
            Self::SoundVolume(_) => Some("sound.v"),
            Self::Batch(_) => None,
        }
    }

    /// Returns `true` if this change touches the `color` section.
    #[must_use]
    pub fn is_color(&self) -> bool {
        matches!(
            self,
            Self::ColorEnabled(_) | Self::ColorId(_) | Self::ColorIntensity(_)
        )
    }

    /// Returns `true` if this change touches the `sound` section.
    #[must_use]
    pub fn is_sound(&self) -> bool {
        matches!(
            self,
            Self::SoundEnabled(_) | Self::SoundId(_) | Self::SoundVolume(_)
        )
    }

    /// Returns the number of individual changes.
    ///
    /// For batch changes, returns the total count of nested changes.
    #[must_use]
    pub fn change_count(&self) -> usize {
        match self {
            Self::Batch(changes) => changes.iter().map(Self::change_count).sum(),
            _ => 1,
        }
    }
}
