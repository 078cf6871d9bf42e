// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Matter onboarding payloads.
//!
//! A payload is what a user scans or types to admit a device: a QR code
//! (`MT:` followed by base-38 text) or a manual pairing code of 11 or 21
//! digits. Both parse into an [`OnboardingPayload`].
//!
//! # Examples
//!
//! ```
//! use matter_link::payload::{DiscoveryCapabilities, OnboardingPayload};
//!
//! let qr = OnboardingPayload::parse("MT:Y.K9042C00KA0648G00").unwrap();
//! assert_eq!(qr.discriminator, 3840);
//! assert!(qr.discovery_capabilities.contains(DiscoveryCapabilities::BLE));
//!
//! let manual = OnboardingPayload::parse("3497-0112-332").unwrap();
//! assert_eq!(manual.setup_pin_code, qr.setup_pin_code);
//! assert!(manual.matches_discriminator(qr.discriminator));
//! ```

mod base38;
mod manual;
mod qr;
mod tlv;
mod verhoeff;

use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

pub use manual::{LONG_CODE_LEN, SHORT_CODE_LEN, format_manual_code, validate_manual_code};
pub use tlv::QrTagValue;

/// Largest setup PIN code Matter allows.
pub const MAX_SETUP_PIN_CODE: u32 = 99_999_998;

/// Largest 12-bit discriminator.
pub const MAX_DISCRIMINATOR: u16 = 0x0FFF;

/// Checks whether a setup PIN code is acceptable to Matter.
///
/// Zero, repeated digits and the two trivial sequences are rejected.
#[must_use]
pub fn is_valid_setup_pin(pin: u32) -> bool {
    const INVALID: [u32; 12] = [
        0,
        11_111_111,
        22_222_222,
        33_333_333,
        44_444_444,
        55_555_555,
        66_666_666,
        77_777_777,
        88_888_888,
        99_999_999,
        12_345_678,
        87_654_321,
    ];
    pin <= MAX_SETUP_PIN_CODE && !INVALID.contains(&pin)
}

bitflags! {
    /// Transports a device advertises for commissioning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DiscoveryCapabilities: u8 {
        /// Device hosts a Wi-Fi soft access point.
        const SOFT_AP = 0b001;
        /// Device advertises over Bluetooth LE.
        const BLE = 0b010;
        /// Device is already on the IP network.
        const ON_NETWORK = 0b100;
    }
}

/// How the device expects commissioning to be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommissioningFlow {
    /// Device is commissionable as soon as it powers up.
    #[default]
    Standard,
    /// A user action on the device is required first.
    UserActionRequired,
    /// Vendor specific flow.
    Custom,
}

impl CommissioningFlow {
    pub(crate) const fn code(self) -> u64 {
        match self {
            Self::Standard => 0,
            Self::UserActionRequired => 1,
            Self::Custom => 2,
        }
    }
}

impl TryFrom<u64> for CommissioningFlow {
    type Error = PayloadError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Standard),
            1 => Ok(Self::UserActionRequired),
            2 => Ok(Self::Custom),
            other => Err(PayloadError::InvalidField {
                field: "commissioning flow",
                value: other,
            }),
        }
    }
}

/// A parsed onboarding payload.
///
/// Manual pairing codes only carry the top four bits of the
/// discriminator; `has_short_discriminator` is set and `discriminator`
/// holds those four bits. Use [`OnboardingPayload::matches_discriminator`]
/// to compare against a discovered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingPayload {
    /// Payload format version, always 0.
    pub version: u8,
    /// Vendor id, 0 when the payload does not carry one.
    pub vendor_id: u16,
    /// Product id, 0 when the payload does not carry one.
    pub product_id: u16,
    /// Commissioning flow.
    pub commissioning_flow: CommissioningFlow,
    /// Transports the device advertises on.
    pub discovery_capabilities: DiscoveryCapabilities,
    /// 12-bit discriminator, or the 4-bit short form.
    pub discriminator: u16,
    /// Whether `discriminator` is the 4-bit short form.
    pub has_short_discriminator: bool,
    /// Setup PIN code (passcode).
    pub setup_pin_code: u32,
    /// Optional data elements from a QR code, keyed by context tag.
    pub extra_tags: BTreeMap<u8, QrTagValue>,
}

impl OnboardingPayload {
    /// Parses a QR code or a manual pairing code.
    ///
    /// Text starting with `MT:` (any case) is treated as a QR code and
    /// upper-cased; anything else as a manual code, with `-`, en-dash
    /// and space separators ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] describing the first problem found.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let text = text.trim();
        match text.get(..qr::PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(qr::PREFIX) => {
                let body = text[qr::PREFIX.len()..].to_ascii_uppercase();
                qr::parse(&body)
            }
            _ => manual::parse(text),
        }
    }

    /// Parses the URI of an NFC `mt:` record.
    ///
    /// NFC records carry the QR text in lower or mixed case, so the URI
    /// is upper-cased before parsing.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::MissingPrefix` if the URI is not an `mt:`
    /// URI, or any QR parse error.
    pub fn from_nfc_uri(uri: &str) -> Result<Self, PayloadError> {
        let upper = uri.trim().to_ascii_uppercase();
        match upper.strip_prefix(qr::PREFIX) {
            Some(body) => qr::parse(body),
            None => Err(PayloadError::MissingPrefix),
        }
    }

    /// Returns the QR text for this payload.
    ///
    /// A short discriminator is widened by shifting it into the top four
    /// bits.
    #[must_use]
    pub fn to_qr_code(&self) -> String {
        qr::encode(self)
    }

    /// Returns the manual pairing code for this payload.
    #[must_use]
    pub fn to_manual_code(&self) -> String {
        manual::encode(self)
    }

    /// Returns the 4-bit short discriminator.
    #[must_use]
    pub const fn short_discriminator(&self) -> u16 {
        if self.has_short_discriminator {
            self.discriminator & 0x0F
        } else {
            (self.discriminator >> 8) & 0x0F
        }
    }

    /// Returns the discriminator widened to 12 bits.
    ///
    /// For a short discriminator the low eight bits are zero.
    #[must_use]
    pub const fn long_discriminator(&self) -> u16 {
        if self.has_short_discriminator {
            (self.discriminator & 0x0F) << 8
        } else {
            self.discriminator & MAX_DISCRIMINATOR
        }
    }

    /// Whether a discovered device's 12-bit discriminator matches.
    ///
    /// Only the top four bits are compared for short discriminators.
    #[must_use]
    pub const fn matches_discriminator(&self, discovered: u16) -> bool {
        if self.has_short_discriminator {
            (discovered >> 8) & 0x0F == self.discriminator & 0x0F
        } else {
            discovered & MAX_DISCRIMINATOR == self.discriminator & MAX_DISCRIMINATOR
        }
    }

    fn check(&self) -> Result<(), PayloadError> {
        if self.version != 0 {
            return Err(PayloadError::InvalidField {
                field: "version",
                value: u64::from(self.version),
            });
        }
        if !is_valid_setup_pin(self.setup_pin_code) {
            return Err(PayloadError::InvalidField {
                field: "setup PIN code",
                value: u64::from(self.setup_pin_code),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_prefix_is_case_insensitive() {
        let upper = OnboardingPayload::parse("MT:Y.K9042C00KA0648G00").unwrap();
        let lower = OnboardingPayload::parse("mt:y.k9042c00ka0648g00").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn nfc_uri_is_upper_cased() {
        let payload = OnboardingPayload::from_nfc_uri("mt:y.k90afn00ka0648g00").unwrap();
        assert!(
            payload
                .discovery_capabilities
                .contains(DiscoveryCapabilities::ON_NETWORK)
        );
        assert_eq!(
            OnboardingPayload::from_nfc_uri("https://example.com"),
            Err(PayloadError::MissingPrefix)
        );
    }

    #[test]
    fn manual_and_qr_agree() {
        let qr = OnboardingPayload::parse("MT:Y.K9042C00KA0648G00").unwrap();
        let manual = OnboardingPayload::parse(&qr.to_manual_code()).unwrap();
        assert_eq!(manual.setup_pin_code, qr.setup_pin_code);
        assert_eq!(manual.short_discriminator(), qr.short_discriminator());
        assert!(manual.matches_discriminator(3840));
        assert!(manual.matches_discriminator(0x0F12));
        assert!(!manual.matches_discriminator(0x0E00));
        assert!(qr.matches_discriminator(3840));
        assert!(!qr.matches_discriminator(3841));
    }

    #[test]
    fn invalid_pins() {
        assert!(is_valid_setup_pin(20_202_021));
        assert!(!is_valid_setup_pin(0));
        assert!(!is_valid_setup_pin(12_345_678));
        assert!(!is_valid_setup_pin(99_999_999));
        assert!(!is_valid_setup_pin(100_000_000));
    }

    #[test]
    fn qr_encoding_includes_extra_tags() {
        let mut payload = OnboardingPayload::parse("MT:-24J0Q1212MGVH7SR00").unwrap();
        payload
            .extra_tags
            .insert(0, QrTagValue::String("SN42".to_string()));
        let text = payload.to_qr_code();
        assert!(text.len() > "MT:-24J0Q1212MGVH7SR00".len());
        assert_eq!(OnboardingPayload::parse(&text).unwrap(), payload);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(OnboardingPayload::parse("MT:").is_err());
        assert!(OnboardingPayload::parse("hello").is_err());
        assert_eq!(
            OnboardingPayload::parse("1234567890").unwrap_err(),
            PayloadError::InvalidManualCodeLength(10)
        );
    }
}
