// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Restore state management types.
//!
//! [`RestoreState`] is the local interpretation of a device shadow, while
//! [`StateChange`] represents individual field updates read from reported
//! documents.
//!
//! # Examples
//!
//! ```
//! use hatch_restore::state::{RestoreState, StateChange};
//!
//! let mut state = RestoreState::new();
//! state.apply(&StateChange::Online(true));
//!
//! assert!(state.is_online());
//! ```

mod device_state;
mod state_change;

pub use device_state::{DEFAULT_COLOR_ID, DEFAULT_SOUND_ID, RestoreState};
pub use state_change::StateChange;
