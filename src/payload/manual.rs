// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Manual pairing codes (11 or 21 decimal digits).
//!
//! Layout, most significant first:
//!
//! | digits | content                                                  |
//! |--------|----------------------------------------------------------|
//! | 1      | vendor/product flag << 2, top two short discriminator bits |
//! | 5      | low two short discriminator bits << 14, PIN bits 0-13    |
//! | 4      | PIN bits 14-26                                           |
//! | 5 + 5  | vendor id and product id, only in 21-digit codes         |
//! | 1      | Verhoeff check digit                                     |

use std::collections::BTreeMap;

use super::{CommissioningFlow, DiscoveryCapabilities, OnboardingPayload, verhoeff};
use crate::error::PayloadError;

/// Digits in a code without vendor and product id.
pub const SHORT_CODE_LEN: usize = 11;

/// Digits in a code carrying vendor and product id.
pub const LONG_CODE_LEN: usize = 21;

const PIN_LOW_BITS: u32 = 14;
const PIN_LOW_MASK: u32 = (1 << PIN_LOW_BITS) - 1;

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '–' | ' ')
}

/// Strips separators and checks that exactly 11 or 21 digits remain.
///
/// Returns the bare digits. The check digit is not verified here, see
/// [`parse`] for full validation.
///
/// # Errors
///
/// Returns `PayloadError::InvalidManualCodeLength` ("Matter only supports
/// 11- or 21-digit codes") for any other length and
/// `PayloadError::InvalidDigit` for non-digit characters.
///
/// # Examples
///
/// ```
/// use matter_link::payload::validate_manual_code;
///
/// assert!(validate_manual_code("1234-5678-901").is_ok());
/// assert!(validate_manual_code("1234567890").is_err());
/// ```
pub fn validate_manual_code(code: &str) -> Result<String, PayloadError> {
    let digits: String = code.chars().filter(|&c| !is_separator(c)).collect();
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(PayloadError::InvalidDigit(bad));
    }
    match digits.len() {
        SHORT_CODE_LEN | LONG_CODE_LEN => Ok(digits),
        other => Err(PayloadError::InvalidManualCodeLength(other)),
    }
}

fn number(digits: &str) -> u32 {
    digits
        .bytes()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Parses a manual pairing code.
///
/// The resulting payload always carries a short (4-bit) discriminator
/// and no discovery capabilities.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn parse(code: &str) -> Result<OnboardingPayload, PayloadError> {
    let digits = validate_manual_code(code)?;
    if !verhoeff::validate(&digits) {
        return Err(PayloadError::CheckDigitMismatch);
    }

    let chunk1 = number(&digits[0..1]);
    let chunk2 = number(&digits[1..6]);
    let chunk3 = number(&digits[6..10]);

    if chunk1 > 7 {
        return Err(PayloadError::InvalidField {
            field: "leading digit",
            value: u64::from(chunk1),
        });
    }
    let vid_pid_present = chunk1 & 0b100 != 0;
    if vid_pid_present != (digits.len() == LONG_CODE_LEN) {
        return Err(PayloadError::InvalidManualCodeLength(digits.len()));
    }

    let discriminator = (((chunk1 & 0b11) << 2) | (chunk2 >> PIN_LOW_BITS)) as u16;
    let setup_pin_code = (chunk3 << PIN_LOW_BITS) | (chunk2 & PIN_LOW_MASK);

    let (vendor_id, product_id, commissioning_flow) = if vid_pid_present {
        let vid = number(&digits[10..15]);
        let pid = number(&digits[15..20]);
        let vid = u16::try_from(vid).map_err(|_| PayloadError::InvalidField {
            field: "vendor id",
            value: u64::from(vid),
        })?;
        let pid = u16::try_from(pid).map_err(|_| PayloadError::InvalidField {
            field: "product id",
            value: u64::from(pid),
        })?;
        (vid, pid, CommissioningFlow::Custom)
    } else {
        (0, 0, CommissioningFlow::Standard)
    };

    let payload = OnboardingPayload {
        version: 0,
        vendor_id,
        product_id,
        commissioning_flow,
        discovery_capabilities: DiscoveryCapabilities::empty(),
        discriminator,
        has_short_discriminator: true,
        setup_pin_code,
        extra_tags: BTreeMap::new(),
    };
    payload.check()?;
    Ok(payload)
}

/// Encodes a payload as a manual pairing code.
///
/// Vendor and product id are included when the payload uses a custom
/// commissioning flow.
pub(crate) fn encode(payload: &OnboardingPayload) -> String {
    let short = u32::from(payload.short_discriminator());
    let include_ids = payload.commissioning_flow == CommissioningFlow::Custom;
    let chunk1 = (u32::from(include_ids) << 2) | (short >> 2);
    let chunk2 = ((short & 0b11) << PIN_LOW_BITS) | (payload.setup_pin_code & PIN_LOW_MASK);
    let chunk3 = payload.setup_pin_code >> PIN_LOW_BITS;

    let mut digits = format!("{chunk1}{chunk2:05}{chunk3:04}");
    if include_ids {
        digits.push_str(&format!(
            "{:05}{:05}",
            payload.vendor_id, payload.product_id
        ));
    }
    if let Some(check) = verhoeff::compute(&digits) {
        digits.push(check);
    }
    digits
}

/// Groups a manual code for display, joined with en-dashes.
///
/// 11-digit codes become `4–4–3`, 21-digit codes `4–4–4–4–5`. Anything
/// else is returned unchanged.
///
/// # Examples
///
/// ```
/// use matter_link::payload::format_manual_code;
///
/// assert_eq!(format_manual_code("34970112332"), "3497–0112–332");
/// ```
#[must_use]
pub fn format_manual_code(code: &str) -> String {
    let groups: &[usize] = match code.len() {
        SHORT_CODE_LEN => &[4, 4, 3],
        LONG_CODE_LEN => &[4, 4, 4, 4, 5],
        _ => return code.to_string(),
    };
    if !code.is_ascii() {
        return code.to_string();
    }
    let mut parts = Vec::with_capacity(groups.len());
    let mut start = 0;
    for &len in groups {
        parts.push(&code[start..start + len]);
        start += len;
    }
    parts.join("–")
}
