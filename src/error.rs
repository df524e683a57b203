// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `hatch_restore` library.
//!
//! Merges of reported state and control calls never fail from the caller's
//! point of view. [`Error`] surfaces from the session (unknown or duplicate
//! devices, unusable device-list entries, transport reads). Value and parse
//! errors stay with the APIs that produce them, and rejected reported fields
//! are logged rather than returned.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error reported by a shadow transport.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while creating a device.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// No device with the given thing name is owned by the session.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// A device with the given thing name is already owned by the session.
    #[error("device already registered: {0}")]
    DuplicateDevice(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },
}

/// Errors raised by shadow transports.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A desired-state patch could not be published.
    #[error("failed to publish desired state for {thing_name}: {message}")]
    Publish {
        /// The shadow the patch was addressed to.
        thing_name: String,
        /// Transport-specific failure description.
        message: String,
    },

    /// The transport has no connection to the shadow service.
    #[error("shadow service unavailable: {0}")]
    Unavailable(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing shadow documents.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field was present but its value could not be coerced.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// Dotted path of the field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to device creation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The discovered product is not modelled by this library.
    #[error("unsupported product: {0}")]
    UnsupportedProduct(String),

    /// A discovered entry is missing one of its identity fields.
    #[error("incomplete device identity: missing {0}")]
    IncompleteIdentity(&'static str),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 65535,
            actual: 70000,
        };
        assert_eq!(err.to_string(), "value 70000 is out of range [0, 65535]");
    }

    #[test]
    fn error_from_device_error() {
        let err: Error = DeviceError::UnsupportedProduct("restoreV5".to_string()).into();
        assert!(matches!(
            err,
            Error::Device(DeviceError::UnsupportedProduct(ref p)) if p == "restoreV5"
        ));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::InvalidValue {
            field: "color.i".to_string(),
            message: "expected integer, found string \"bright\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse color.i: expected integer, found string \"bright\""
        );
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::Publish {
            thing_name: "restore-1".to_string(),
            message: "link down".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to publish desired state for restore-1: link down"
        );
    }

    #[test]
    fn session_error_display() {
        assert_eq!(
            Error::DeviceNotFound("abc".to_string()).to_string(),
            "device not found: abc"
        );
        assert_eq!(
            Error::DuplicateDevice("abc".to_string()).to_string(),
            "device already registered: abc"
        );
    }
}
