// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Restore shadow fields.
//!
//! # Types
//!
//! - [`Level`] - Raw 16-bit intensity/volume (0-65535) with percent conversions
//! - [`Playing`] - Content playback mode (`none`, `routine`, `remote`, or vendor-specific)

mod level;
mod playing;

pub use level::Level;
pub(crate) use level::clamp_u16;
pub use playing::Playing;
