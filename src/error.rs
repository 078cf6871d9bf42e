// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `matter_link` library.
//!
//! This module provides the error hierarchy for failures across the
//! library: onboarding payload parsing, attribute value validation, the
//! native controller seam, cluster operations and commissioning.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::AttributeKey;
use crate::types::DeviceType;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// An onboarding payload could not be parsed.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// An attribute value failed validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The native controller or BLE adapter reported a failure.
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),

    /// A commissioning session ended in failure.
    #[error("commissioning error: {0}")]
    Commissioning(#[from] CommissioningError),

    /// A connected device handle could not be resolved in time.
    #[error("device {0} is unreachable")]
    Unreachable(String),

    /// A cluster operation failed after the handle was resolved.
    #[error("{operation} failed: {cause}")]
    OperationFailed {
        /// Name of the failed operation.
        operation: &'static str,
        /// Underlying controller failure.
        #[source]
        cause: ControllerError,
    },

    /// The device refuses the operation in its current configuration.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The native layer returned something that violates its contract.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A configuration document could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The persistent store collaborator failed.
    #[error("store error: {0}")]
    Store(String),

    /// An internal channel was closed.
    #[error("channel closed")]
    ChannelClosed,
}

/// Errors raised while parsing an onboarding payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// A manual code has the wrong number of digits.
    #[error("Matter only supports 11- or 21-digit codes")]
    InvalidManualCodeLength(usize),

    /// A manual code contains a non-digit character.
    #[error("manual code contains non-digit character {0:?}")]
    InvalidDigit(char),

    /// The Verhoeff check digit does not match.
    #[error("manual code check digit mismatch")]
    CheckDigitMismatch,

    /// The QR text does not start with `MT:`.
    #[error("QR code must start with \"MT:\"")]
    MissingPrefix,

    /// The QR body contains a character outside the base-38 alphabet.
    #[error("invalid base-38 character {0:?}")]
    InvalidBase38Character(char),

    /// The QR body length cannot be split into base-38 chunks.
    #[error("invalid base-38 length {0}")]
    InvalidBase38Length(usize),

    /// A base-38 chunk decodes to a value wider than its byte count.
    #[error("base-38 chunk out of range")]
    Base38Overflow,

    /// The packed header is shorter than 88 bits.
    #[error("QR payload too short: {0} bytes")]
    TooShort(usize),

    /// Optional TLV data after the header is malformed.
    #[error("malformed TLV extension: {0}")]
    InvalidTlv(String),

    /// A decoded field has a value that Matter forbids.
    #[error("invalid {field}: {value}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Its decoded value.
        value: u64,
    },
}

/// Errors related to attribute value validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A hue value is outside the valid range (0-360).
    #[error("hue value {0} is out of range [0, 360]")]
    InvalidHue(u16),

    /// A saturation value is outside the valid range (0-100).
    #[error("saturation value {0} is out of range [0, 100]")]
    InvalidSaturation(u8),

    /// A brightness value is outside the valid range (0-100).
    #[error("brightness value {0} is out of range [0, 100]")]
    InvalidBrightness(u8),

    /// A raw fan mode does not name a known mode.
    #[error("unknown fan mode {0}")]
    UnknownFanMode(u8),

    /// A native attribute had an unexpected data type.
    #[error("unexpected attribute data: expected {0}")]
    UnexpectedData(&'static str),

    /// A device type does not support an attribute.
    #[error("{device_type} does not support {attribute}")]
    UnsupportedAttribute {
        /// The device type.
        device_type: DeviceType,
        /// The attribute it does not support.
        attribute: AttributeKey,
    },

    /// A value was stored under another attribute's key.
    #[error("{value} value stored under {key}")]
    MismatchedAttribute {
        /// Key the value was stored under.
        key: AttributeKey,
        /// Attribute the value belongs to.
        value: AttributeKey,
    },
}

/// Failures reported by the native controller or BLE adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The native call did not complete in time.
    #[error("timed out")]
    Timeout,

    /// The peer went away during the call.
    #[error("disconnected")]
    Disconnected,

    /// The native layer returned a non-success status code.
    #[error("native status {0}")]
    Status(i64),

    /// Any other native failure.
    #[error("{0}")]
    Failed(String),
}

/// Reason a commissioning session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommissioningErrorCode {
    /// Catch-all for native error codes.
    Unknown,
    /// No device matching the payload was discovered.
    DeviceNotFound,
    /// Device attestation failed and the caller asked to block on it.
    AttestationFailed,
    /// The device was commissioned but could not be saved locally.
    AddDeviceFailed,
    /// A commissioning window could not be opened.
    WindowOpenFailed,
    /// Device type introspection failed after pairing.
    TypeIntrospectionFailed,
    /// The device could not be prepared for sharing.
    ShareConfigFailed,
    /// The native pairing step failed.
    PairingFailed,
    /// The onboarding payload could not be parsed.
    InvalidOnboardingPayload,
    /// An operation was requested in the wrong session state.
    IncorrectState,
    /// A caller supplied device id is not usable.
    InvalidDeviceIdentifier,
}

impl fmt::Display for CommissioningErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A terminal commissioning failure with a displayable message.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct CommissioningError {
    /// Machine readable reason.
    pub code: CommissioningErrorCode,
    /// Human readable message suitable for direct display.
    pub message: String,
}

impl CommissioningError {
    /// Creates a new commissioning error.
    #[must_use]
    pub fn new(code: CommissioningErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
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
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidHue(400);
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::InvalidHue(400))));
    }

    #[test]
    fn manual_code_length_message() {
        let err = PayloadError::InvalidManualCodeLength(10);
        assert_eq!(err.to_string(), "Matter only supports 11- or 21-digit codes");
    }

    #[test]
    fn commissioning_error_keeps_message_apart_from_code() {
        let err = CommissioningError::new(
            CommissioningErrorCode::DeviceNotFound,
            "Failed to discover device node",
        );
        assert_eq!(err.code, CommissioningErrorCode::DeviceNotFound);
        assert_eq!(err.message, "Failed to discover device node");
        assert_eq!(
            err.to_string(),
            "DeviceNotFound: Failed to discover device node"
        );
    }

    #[test]
    fn operation_failed_display() {
        let err = Error::OperationFailed {
            operation: "read on-off",
            cause: ControllerError::Timeout,
        };
        assert_eq!(err.to_string(), "read on-off failed: timed out");
    }
}
