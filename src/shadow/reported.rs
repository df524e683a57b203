// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lenient reader for partial reported documents.

use std::str::FromStr;

use serde_json::Value;

use crate::error::ParseError;
use crate::state::StateChange;
use crate::types::{Level, Playing};

/// Fields read from a partial `reported` shadow document.
///
/// The shadow service only delivers the sections that changed, so every
/// field is optional. A path that is missing, `null`, or nested under a
/// non-object parent is treated as absent. A path that is present but
/// cannot be coerced to its type is also treated as absent and recorded in
/// [`rejected`](Self::rejected).
///
/// # Examples
///
/// ```
/// use hatch_restore::shadow::ReportedState;
/// use serde_json::json;
///
/// let reported = ReportedState::from_value(&json!({
///     "color": {"enabled": true, "i": 65535},
///     "sound": {"v": "loud"}
/// }));
///
/// assert_eq!(reported.color_enabled(), Some(true));
/// assert_eq!(reported.color_intensity().map(|l| l.value()), Some(65535));
/// assert_eq!(reported.sound_volume(), None);
/// assert_eq!(reported.rejected().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ReportedState {
    firmware_version: Option<String>,
    playing: Option<Playing>,
    connected: Option<bool>,
    color_enabled: Option<bool>,
    color_id: Option<u16>,
    color_intensity: Option<Level>,
    sound_enabled: Option<bool>,
    sound_id: Option<u16>,
    sound_volume: Option<Level>,
    rejected: Vec<ParseError>,
}

impl ReportedState {
    /// Reads every recognized path from a reported document.
    #[must_use]
    pub fn from_value(document: &Value) -> Self {
        let mut reader = FieldReader {
            document,
            rejected: Vec::new(),
        };

        Self {
            firmware_version: reader.read("deviceInfo.f", coerce_text),
            playing: reader.read("content.playing", coerce_str).map(Playing::from),
            connected: reader.read("connected", coerce_bool),
            color_enabled: reader.read("color.enabled", coerce_bool),
            color_id: reader.read("color.id", coerce_u16),
            color_intensity: reader.read("color.i", coerce_u16).map(Level::new),
            sound_enabled: reader.read("sound.enabled", coerce_bool),
            sound_id: reader.read("sound.id", coerce_u16),
            sound_volume: reader.read("sound.v", coerce_u16).map(Level::new),
            rejected: reader.rejected,
        }
    }

    /// Firmware version from `deviceInfo.f`.
    #[must_use]
    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    /// Playback mode from `content.playing`.
    #[must_use]
    pub fn playing(&self) -> Option<&Playing> {
        self.playing.as_ref()
    }

    /// Online flag from `connected`.
    #[must_use]
    pub fn connected(&self) -> Option<bool> {
        self.connected
    }

    /// Light flag from `color.enabled`.
    #[must_use]
    pub fn color_enabled(&self) -> Option<bool> {
        self.color_enabled
    }

    /// Color id from `color.id`.
    #[must_use]
    pub fn color_id(&self) -> Option<u16> {
        self.color_id
    }

    /// Light intensity from `color.i`.
    #[must_use]
    pub fn color_intensity(&self) -> Option<Level> {
        self.color_intensity
    }

    /// Sound flag from `sound.enabled`.
    #[must_use]
    pub fn sound_enabled(&self) -> Option<bool> {
        self.sound_enabled
    }

    /// Sound id from `sound.id`.
    #[must_use]
    pub fn sound_id(&self) -> Option<u16> {
        self.sound_id
    }

    /// Sound volume from `sound.v`.
    #[must_use]
    pub fn sound_volume(&self) -> Option<Level> {
        self.sound_volume
    }

    /// Fields that were present but could not be coerced.
    #[must_use]
    pub fn rejected(&self) -> &[ParseError] {
        &self.rejected
    }

    /// Returns `true` if no recognized field was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_state_changes().is_empty()
    }

    /// Converts the present fields into state changes, in table order.
    #[must_use]
    pub fn to_state_changes(&self) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if let Some(version) = &self.firmware_version {
            changes.push(StateChange::FirmwareVersion(version.clone()));
        }
        if let Some(playing) = &self.playing {
            changes.push(StateChange::Playing(playing.clone()));
        }
        if let Some(online) = self.connected {
            changes.push(StateChange::Online(online));
        }
        if let Some(enabled) = self.color_enabled {
            changes.push(StateChange::ColorEnabled(enabled));
        }
        if let Some(id) = self.color_id {
            changes.push(StateChange::ColorId(id));
        }
        if let Some(level) = self.color_intensity {
            changes.push(StateChange::ColorIntensity(level));
        }
        if let Some(enabled) = self.sound_enabled {
            changes.push(StateChange::SoundEnabled(enabled));
        }
        if let Some(id) = self.sound_id {
            changes.push(StateChange::SoundId(id));
        }
        if let Some(level) = self.sound_volume {
            changes.push(StateChange::SoundVolume(level));
        }

        changes
    }
}

impl FromStr for ReportedState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let document: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(&document))
    }
}

/// Looks up dotted paths and collects coercion failures.
struct FieldReader<'a> {
    document: &'a Value,
    rejected: Vec<ParseError>,
}

impl FieldReader<'_> {
    fn read<T>(&mut self, path: &str, coerce: fn(&Value) -> Result<T, String>) -> Option<T> {
        let pointer = format!("/{}", path.replace('.', "/"));
        let value = self.document.pointer(&pointer).filter(|v| !v.is_null())?;

        match coerce(value) {
            Ok(v) => Some(v),
            Err(message) => {
                self.rejected.push(ParseError::InvalidValue {
                    field: path.to_string(),
                    message,
                });
                None
            }
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn coerce_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(format!("expected boolean, found {}", describe(other))),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_u16(value: &Value) -> Result<u16, String> {
    let wide = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if n.is_u64() {
                // Only reachable above i64::MAX.
                i64::MAX
            } else {
                match n.as_f64() {
                    // Saturating cast; range is checked below.
                    Some(f) if f.is_finite() => f.trunc() as i64,
                    _ => return Err(format!("expected integer, found {}", describe(value))),
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected integer, found {}", describe(value)))?,
        other => return Err(format!("expected integer, found {}", describe(other))),
    };

    Level::try_from_raw(wide)
        .map(|level| level.value())
        .map_err(|e| e.to_string())
}

fn coerce_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected string, found {}", describe(other))),
    }
}

fn coerce_str(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(format!("expected string, found {}", describe(other))),
    }
}
