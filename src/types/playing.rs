// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Content playback mode reported under `content.playing`.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the device is currently playing.
///
/// The vendor does not constrain this string, so values other than the
/// three recognized modes are kept verbatim in [`Playing::Other`].
///
/// # Examples
///
/// ```
/// use hatch_restore::types::Playing;
///
/// assert_eq!("remote".parse::<Playing>().unwrap(), Playing::Remote);
/// assert_eq!(Playing::Routine.as_str(), "routine");
///
/// let unknown: Playing = "favorite".into();
/// assert_eq!(unknown, Playing::Other("favorite".to_string()));
/// assert_eq!(unknown.as_str(), "favorite");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Playing {
    /// Nothing is playing.
    #[default]
    None,
    /// A device-local routine, selected by step index.
    Routine,
    /// Color and sound supplied remotely through the shadow.
    Remote,
    /// Any other vendor-supplied mode.
    Other(String),
}

impl Playing {
    /// Returns the shadow string for this mode.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Routine => "routine",
            Self::Remote => "remote",
            Self::Other(value) => value,
        }
    }

    /// Returns `true` unless nothing is playing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Playing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Playing {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for Playing {
    fn from(value: &str) -> Self {
        match value {
            "none" => Self::None,
            "routine" => Self::Routine,
            "remote" => Self::Remote,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Playing {
    fn from(value: String) -> Self {
        match value.as_str() {
            "none" => Self::None,
            "routine" => Self::Routine,
            "remote" => Self::Remote,
            _ => Self::Other(value),
        }
    }
}

impl From<Playing> for String {
    fn from(value: Playing) -> Self {
        match value {
            Playing::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}
