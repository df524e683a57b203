// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device discovery from the vendor device list.
//!
//! The vendor's iot-device endpoint answers with one entry per device on the
//! account. Only complete entries for the legacy Restore become devices;
//! newer products are recognized and skipped.
//!
//! # Examples
//!
//! ```
//! use hatch_restore::discovery::DiscoveredDevice;
//! use serde_json::json;
//!
//! let response = json!({"payload": [
//!     {"product": "restore", "name": "Nursery", "thingName": "t-1", "macAddress": "AA:BB"},
//!     {"product": "restoreV5", "name": "Bedroom", "thingName": "t-2", "macAddress": "CC:DD"},
//!     {"product": "restore", "name": "", "thingName": "t-3", "macAddress": "EE:FF"},
//! ]});
//!
//! let devices = DiscoveredDevice::parse_list(&response);
//! assert_eq!(devices.len(), 3);
//!
//! let usable: Vec<_> = devices.iter().filter_map(|d| d.identity().ok()).collect();
//! assert_eq!(usable.len(), 1);
//! assert_eq!(usable[0].thing_name, "t-1");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::device::DeviceIdentity;
use crate::error::DeviceError;

/// The product code handled by [`RestoreDevice`](crate::device::RestoreDevice).
pub const SUPPORTED_PRODUCT: &str = "restore";

/// Product codes always requested from the device list, in request order.
pub const KNOWN_PRODUCTS: [&str; 9] = [
    "restPlus",
    "riot",
    "riotPlus",
    "restMini",
    "restore",
    "restoreIot",
    "restoreV4",
    "restoreV5",
    "restBaby",
];

/// Builds the product list for a device-list request.
///
/// The known products come first, followed by any products from the
/// member profile that are not already listed. Duplicates are dropped.
///
/// The library performs no vendor requests; this is for the host that
/// fetches the device list handed to [`DiscoveredDevice::parse_list`].
#[must_use]
pub fn iot_products(member_products: &[String]) -> Vec<String> {
    let mut products: Vec<String> = Vec::with_capacity(KNOWN_PRODUCTS.len() + member_products.len());
    let candidates = KNOWN_PRODUCTS
        .iter()
        .copied()
        .chain(member_products.iter().map(String::as_str));
    for product in candidates {
        if !products.iter().any(|p| p == product) {
            products.push(product.to_string());
        }
    }
    products
}

/// One entry of the vendor device list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredDevice {
    /// Product code, e.g. `restore`.
    #[serde(default)]
    pub product: Option<String>,
    /// User-facing device name.
    #[serde(default)]
    pub name: Option<String>,
    /// Shadow identifier.
    #[serde(default)]
    pub thing_name: Option<String>,
    /// Hardware address.
    #[serde(default)]
    pub mac_address: Option<String>,
}

impl DiscoveredDevice {
    /// Parses a device-list response.
    ///
    /// Accepts the `{"payload": [...]}` envelope or a bare array. Entries
    /// that are not objects of the expected shape are skipped; any other
    /// document yields an empty list.
    #[must_use]
    pub fn parse_list(response: &Value) -> Vec<Self> {
        let entries = match response {
            Value::Array(entries) => entries,
            Value::Object(envelope) => match envelope.get("payload") {
                Some(Value::Array(entries)) => entries,
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };

        entries
            .iter()
            .filter_map(|entry| match Self::deserialize(entry) {
                Ok(device) => Some(device),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed device list entry");
                    None
                }
            })
            .collect()
    }

    /// Returns `true` if this entry is a legacy Restore.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.product.as_deref() == Some(SUPPORTED_PRODUCT)
    }

    /// Returns the identity for a usable legacy Restore entry.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::IncompleteIdentity` if any of the four fields
    /// is missing or empty, and `DeviceError::UnsupportedProduct` for any
    /// product other than `restore`.
    pub fn identity(&self) -> Result<DeviceIdentity, DeviceError> {
        let product = required(self.product.as_deref(), "product")?;
        let name = required(self.name.as_deref(), "name")?;
        let thing_name = required(self.thing_name.as_deref(), "thingName")?;
        let mac = required(self.mac_address.as_deref(), "macAddress")?;

        if product != SUPPORTED_PRODUCT {
            return Err(DeviceError::UnsupportedProduct(product.to_string()));
        }

        Ok(DeviceIdentity::new(name, thing_name, mac))
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, DeviceError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(DeviceError::IncompleteIdentity(field))
}
