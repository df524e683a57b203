// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw 16-bit level type for light intensity and sound volume.
//!
//! The Restore shadow stores intensities and volumes as unsigned 16-bit
//! integers. This module wraps them and provides the percent conversions
//! used by the controls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Raw device level (0-65535).
///
/// Used for `color.i` (light intensity) and `sound.v` (sound volume).
///
/// # Examples
///
/// ```
/// use hatch_restore::types::Level;
///
/// let half = Level::from_percent(50.0);
/// assert_eq!(half.value(), 32768);
/// assert!((half.percent() - 50.0).abs() < f64::EPSILON);
///
/// // Out-of-range raw values are rejected by `try_from_raw`
/// assert!(Level::try_from_raw(70_000).is_err());
/// assert_eq!(Level::clamped(70_000), Level::MAX);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Level(u16);

impl Level {
    /// Minimum level (silent / dark).
    pub const MIN: Self = Self(0);

    /// Maximum level.
    pub const MAX: Self = Self(u16::MAX);

    /// Midpoint level the device uses until it reports otherwise.
    pub const MIDPOINT: Self = Self(32767);

    const FULL_SCALE: f64 = 65535.0;

    /// Creates a level from a raw 16-bit value.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Creates a level from a wide integer.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is negative or above 65535.
    pub fn try_from_raw(value: i64) -> Result<Self, ValueError> {
        u16::try_from(value)
            .map(Self)
            .map_err(|_| ValueError::OutOfRange {
                min: 0,
                max: i64::from(u16::MAX),
                actual: value,
            })
    }

    /// Creates a level from a wide integer, clamping to `0..=65535`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(clamp_u16(value))
    }

    /// Converts a percentage into a level.
    ///
    /// The percentage is clamped to `[0, 100]` and scaled onto the 16-bit
    /// range, rounding half to even. NaN saturates to full scale, the same
    /// as `max(0, min(100, x))` with an unordered `x`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_percent(percent: f64) -> Self {
        let percent = if percent.is_nan() {
            100.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        // Bounded to [0, 65535] by the clamp above.
        Self((percent / 100.0 * Self::FULL_SCALE).round_ties_even() as u16)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns `true` for the zero level.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the level as a fraction between 0.0 and 1.0.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        f64::from(self.0) / Self::FULL_SCALE
    }

    /// Returns the level as a percentage rounded to one decimal place.
    #[must_use]
    pub fn percent(&self) -> f64 {
        (self.fraction() * 1000.0).round() / 10.0
    }

    /// Rescales the level onto `0..=255`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_u8_scale(&self) -> u8 {
        (self.fraction() * 255.0).round() as u8
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for Level {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Level> for u16 {
    fn from(level: Level) -> Self {
        level.0
    }
}

/// Clamps a wide integer onto `0..=65535`.
#[must_use]
pub(crate) fn clamp_u16(value: i64) -> u16 {
    u16::try_from(value.clamp(0, i64::from(u16::MAX))).unwrap_or(u16::MAX)
}
