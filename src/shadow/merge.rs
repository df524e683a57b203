// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow document merging.

use serde_json::{Map, Value};

/// Merges a partial document into a full one, the way the shadow service
/// applies an update.
///
/// Objects merge key by key, recursively. Any other value replaces the
/// target. A `null` in the patch deletes the key.
///
/// # Examples
///
/// ```
/// use hatch_restore::shadow::merge_documents;
/// use serde_json::json;
///
/// let mut reported = json!({"color": {"enabled": false, "id": 229}, "connected": true});
/// merge_documents(&mut reported, &json!({"color": {"enabled": true}, "connected": null}));
///
/// assert_eq!(reported, json!({"color": {"enabled": true, "id": 229}}));
/// ```
pub fn merge_documents(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge_documents(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
