// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity and snapshots.

use serde::{Deserialize, Serialize};

use crate::types::Playing;

/// Immutable identity of a Restore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// User-facing device name.
    pub device_name: String,
    /// Shadow identifier used for every shadow operation.
    pub thing_name: String,
    /// Hardware address, used only to link the device registry
    /// (see [`DeviceRegistryInfo`]).
    pub mac: String,
}

impl DeviceIdentity {
    /// Creates an identity.
    #[must_use]
    pub fn new(
        device_name: impl Into<String>,
        thing_name: impl Into<String>,
        mac: impl Into<String>,
    ) -> Self {
        Self {
            device_name: device_name.into(),
            thing_name: thing_name.into(),
            mac: mac.into(),
        }
    }
}

/// Integration domain the registry identifiers are scoped to.
pub const REGISTRY_DOMAIN: &str = "hatch_restore_light";

/// Manufacturer recorded in the device registry.
pub const MANUFACTURER: &str = "Hatch";

/// Model recorded in the device registry.
pub const MODEL: &str = "RestoreDevice";

/// Connection type of a hardware address in the device registry.
pub const CONNECTION_MAC: &str = "mac";

/// Device registry entry shared by every entity of one Restore.
///
/// The Restore reports a hardware address one off from the one its Wi-Fi
/// interface announces, so the entry links both: the address as given and
/// the same address with its last character replaced by `0`.
///
/// # Examples
///
/// ```
/// use hatch_restore::device::{DeviceIdentity, DeviceRegistryInfo};
///
/// let identity = DeviceIdentity::new("Nursery", "thing-1", "AA:BB:CC:DD:EE:F1");
/// let info = DeviceRegistryInfo::new(&identity, Some("5.2.1"));
///
/// assert_eq!(
///     info.connections,
///     vec![
///         ("mac".to_string(), "aa:bb:cc:dd:ee:f1".to_string()),
///         ("mac".to_string(), "aa:bb:cc:dd:ee:f0".to_string()),
///     ]
/// );
/// assert_eq!(info.sw_version.as_deref(), Some("5.2.1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistryInfo {
    /// `(connection type, value)` pairs, without duplicates.
    pub connections: Vec<(String, String)>,
    /// `(domain, id)` pairs.
    pub identifiers: Vec<(String, String)>,
    /// Always [`MANUFACTURER`].
    pub manufacturer: String,
    /// Always [`MODEL`].
    pub model: String,
    /// User-facing device name.
    pub name: String,
    /// Reported firmware version, if any.
    pub sw_version: Option<String>,
}

impl DeviceRegistryInfo {
    /// Builds the registry entry for an identity.
    #[must_use]
    pub fn new(identity: &DeviceIdentity, firmware_version: Option<&str>) -> Self {
        let mac = identity.mac.to_lowercase();
        let mut trimmed = mac.chars();
        trimmed.next_back();
        let sibling = format!("{}0", trimmed.as_str());

        let mut connections = vec![(CONNECTION_MAC.to_string(), mac)];
        if connections[0].1 != sibling {
            connections.push((CONNECTION_MAC.to_string(), sibling));
        }

        Self {
            connections,
            identifiers: vec![(REGISTRY_DOMAIN.to_string(), identity.thing_name.clone())],
            manufacturer: MANUFACTURER.to_string(),
            model: MODEL.to_string(),
            name: identity.device_name.clone(),
            sw_version: firmware_version.map(str::to_string),
        }
    }
}

/// Serializable snapshot of a device, as handed to session listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// User-facing device name.
    pub device_name: String,
    /// Shadow identifier.
    pub thing_name: String,
    /// Hardware address.
    pub mac: String,
    /// Reported firmware version.
    pub firmware_version: Option<String>,
    /// What the device is playing.
    pub current_playing: Playing,
    /// Top-level on/off signal (the light state).
    pub is_on: bool,
    /// Whether the device is connected to the cloud.
    pub is_online: bool,
    /// Whether the light is enabled.
    pub color_enabled: bool,
    /// Whether sound is enabled.
    pub sound_enabled: bool,
}
