// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use serde::Serialize;

use crate::device::DeviceSummary;

/// Events emitted by a session.
///
/// Every event names the shadow it concerns.
///
/// # Examples
///
/// ```
/// use hatch_restore::event::DeviceEvent;
///
/// let added = DeviceEvent::device_added("thing-1");
/// assert!(added.is_lifecycle());
/// assert_eq!(added.thing_name(), "thing-1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// A device was added to the session.
    DeviceAdded {
        /// The shadow of the added device.
        thing_name: String,
    },

    /// A device was removed from the session.
    DeviceRemoved {
        /// The shadow of the removed device.
        thing_name: String,
    },

    /// A reported update was merged into a device.
    ///
    /// Emitted for every merge, including ones that changed nothing.
    StateUpdated {
        /// The shadow of the device.
        thing_name: String,
        /// Whether any cached field changed.
        changed: bool,
        /// The device after the merge.
        summary: DeviceSummary,
    },
}

impl DeviceEvent {
    /// Returns the shadow this event concerns.
    #[must_use]
    pub fn thing_name(&self) -> &str {
        match self {
            Self::DeviceAdded { thing_name }
            | Self::DeviceRemoved { thing_name }
            | Self::StateUpdated { thing_name, .. } => thing_name,
        }
    }

    /// Returns `true` if this is a device lifecycle event (added/removed).
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Returns `true` if this is a state update event.
    #[must_use]
    pub fn is_state_update(&self) -> bool {
        matches!(self, Self::StateUpdated { .. })
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(thing_name: impl Into<String>) -> Self {
        Self::DeviceAdded {
            thing_name: thing_name.into(),
        }
    }

    /// Creates a device removed event.
    #[must_use]
    pub fn device_removed(thing_name: impl Into<String>) -> Self {
        Self::DeviceRemoved {
            thing_name: thing_name.into(),
        }
    }

    /// Creates a state updated event from a post-merge summary.
    #[must_use]
    pub fn state_updated(summary: DeviceSummary, changed: bool) -> Self {
        Self::StateUpdated {
            thing_name: summary.thing_name.clone(),
            changed,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Playing;

    fn summary() -> DeviceSummary {
        DeviceSummary {
            device_name: "Nursery".to_string(),
            thing_name: "thing-1".to_string(),
            mac: "aa:bb".to_string(),
            firmware_version: None,
            current_playing: Playing::None,
            is_on: false,
            is_online: true,
            color_enabled: false,
            sound_enabled: false,
        }
    }

    #[test]
    fn thing_name_extraction() {
        assert_eq!(DeviceEvent::device_added("a").thing_name(), "a");
        assert_eq!(DeviceEvent::device_removed("b").thing_name(), "b");
        assert_eq!(
            DeviceEvent::state_updated(summary(), true).thing_name(),
            "thing-1"
        );
    }

    #[test]
    fn lifecycle_events() {
        assert!(DeviceEvent::device_added("a").is_lifecycle());
        assert!(DeviceEvent::device_removed("a").is_lifecycle());
        assert!(!DeviceEvent::state_updated(summary(), false).is_lifecycle());
    }

    #[test]
    fn state_update_events() {
        let event = DeviceEvent::state_updated(summary(), false);
        assert!(event.is_state_update());
        assert!(!DeviceEvent::device_added("a").is_state_update());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(DeviceEvent::device_removed("thing-1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "device_removed", "thing_name": "thing-1"})
        );

        let json = serde_json::to_value(DeviceEvent::state_updated(summary(), true)).unwrap();
        assert_eq!(json["type"], "state_updated");
        assert_eq!(json["summary"]["is_online"], true);
    }
}
