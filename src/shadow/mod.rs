// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device shadow documents.
//!
//! A Restore keeps its state in a remote shadow split into a `reported`
//! half (last known device state) and a `desired` half (requested changes).
//! The shadow service only sends the sections that changed, so documents
//! arriving here are sparse:
//!
//! ```json
//! {"color": {"i": 40000}, "content": {"playing": "remote"}}
//! ```
//!
//! This module reads those documents ([`ReportedState`]), merges them the
//! way the shadow service does ([`merge_documents`]), and defines the
//! capability contract ([`ShadowSync`]) implemented by device models.
//!
//! # Examples
//!
//! ```
//! use hatch_restore::shadow::ReportedState;
//! use hatch_restore::state::StateChange;
//! use serde_json::json;
//!
//! let reported = ReportedState::from_value(&json!({"connected": true}));
//! assert_eq!(reported.to_state_changes(), vec![StateChange::Online(true)]);
//! ```

mod merge;
mod reported;

pub use merge::merge_documents;
pub use reported::ReportedState;

use serde_json::Value;

use crate::patch::DesiredPatch;

/// An inbound reported-state update for one shadow.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowUpdate {
    /// The shadow the update belongs to.
    pub thing_name: String,
    /// The partial `reported` document.
    pub reported: Value,
}

impl ShadowUpdate {
    /// Creates an update for the given shadow.
    #[must_use]
    pub fn new(thing_name: impl Into<String>, reported: Value) -> Self {
        Self {
            thing_name: thing_name.into(),
            reported,
        }
    }
}

/// Local/remote synchronization contract for a shadow-backed device.
///
/// Implementors keep a local interpretation of the shadow current with
/// [`merge_reported`](Self::merge_reported) and push requested changes
/// with [`publish_desired`](Self::publish_desired).
pub trait ShadowSync {
    /// Merges a partial reported document into local state.
    ///
    /// Returns `true` if any local field changed. Never fails: absent or
    /// malformed fields are skipped.
    fn merge_reported(&mut self, reported: &Value) -> bool;

    /// Publishes a desired-state patch without waiting for acknowledgment.
    fn publish_desired(&self, patch: &DesiredPatch);
}
