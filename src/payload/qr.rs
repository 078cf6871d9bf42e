// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! QR code payload (`MT:` prefix, base-38 body).

use super::{CommissioningFlow, DiscoveryCapabilities, OnboardingPayload, base38, tlv};
use crate::error::PayloadError;

/// QR code prefix.
pub const PREFIX: &str = "MT:";

/// Shortest valid base-38 body (11 header bytes).
pub const MIN_BODY_LEN: usize = 19;

const HEADER_BYTES: usize = 11;

const VERSION_BITS: u32 = 3;
const VENDOR_ID_BITS: u32 = 16;
const PRODUCT_ID_BITS: u32 = 16;
const FLOW_BITS: u32 = 2;
const CAPABILITIES_BITS: u32 = 8;
const DISCRIMINATOR_BITS: u32 = 12;
const PASSCODE_BITS: u32 = 27;
const PADDING_BITS: u32 = 4;

struct BitReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl BitReader<'_> {
    fn read(&mut self, bits: u32) -> u64 {
        let mut value = 0u64;
        for i in 0..bits as usize {
            let bit = self.offset + i;
            if (self.bytes[bit / 8] >> (bit % 8)) & 1 == 1 {
                value |= 1 << i;
            }
        }
        self.offset += bits as usize;
        value
    }
}

struct BitWriter {
    bytes: Vec<u8>,
    offset: usize,
}

impl BitWriter {
    fn write(&mut self, value: u64, bits: u32) {
        for i in 0..bits as usize {
            if (value >> i) & 1 == 1 {
                let bit = self.offset + i;
                self.bytes[bit / 8] |= 1 << (bit % 8);
            }
        }
        self.offset += bits as usize;
    }
}

/// Parses the base-38 body of a QR code (without the prefix).
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn parse(body: &str) -> Result<OnboardingPayload, PayloadError> {
    if body.len() < MIN_BODY_LEN {
        return Err(PayloadError::InvalidBase38Length(body.len()));
    }
    let bytes = base38::decode(body)?;
    if bytes.len() < HEADER_BYTES {
        return Err(PayloadError::TooShort(bytes.len()));
    }

    let mut reader = BitReader {
        bytes: &bytes[..HEADER_BYTES],
        offset: 0,
    };
    let version = reader.read(VERSION_BITS) as u8;
    let vendor_id = reader.read(VENDOR_ID_BITS) as u16;
    let product_id = reader.read(PRODUCT_ID_BITS) as u16;
    let flow = reader.read(FLOW_BITS);
    let capabilities = reader.read(CAPABILITIES_BITS) as u8;
    let discriminator = reader.read(DISCRIMINATOR_BITS) as u16;
    let setup_pin_code = reader.read(PASSCODE_BITS) as u32;

    let commissioning_flow = CommissioningFlow::try_from(flow)?;
    let extra_tags = tlv::parse(&bytes[HEADER_BYTES..])?;

    let payload = OnboardingPayload {
        version,
        vendor_id,
        product_id,
        commissioning_flow,
        discovery_capabilities: DiscoveryCapabilities::from_bits_truncate(capabilities),
        discriminator,
        has_short_discriminator: false,
        setup_pin_code,
        extra_tags,
    };
    payload.check()?;
    Ok(payload)
}

/// Encodes a payload as QR text including the `MT:` prefix.
pub(crate) fn encode(payload: &OnboardingPayload) -> String {
    let total_bits = VERSION_BITS
        + VENDOR_ID_BITS
        + PRODUCT_ID_BITS
        + FLOW_BITS
        + CAPABILITIES_BITS
        + DISCRIMINATOR_BITS
        + PASSCODE_BITS
        + PADDING_BITS;
    let mut writer = BitWriter {
        bytes: vec![0; total_bits as usize / 8],
        offset: 0,
    };
    writer.write(u64::from(payload.version), VERSION_BITS);
    writer.write(u64::from(payload.vendor_id), VENDOR_ID_BITS);
    writer.write(u64::from(payload.product_id), PRODUCT_ID_BITS);
    writer.write(payload.commissioning_flow.code(), FLOW_BITS);
    writer.write(
        u64::from(payload.discovery_capabilities.bits()),
        CAPABILITIES_BITS,
    );
    writer.write(u64::from(payload.long_discriminator()), DISCRIMINATOR_BITS);
    writer.write(u64::from(payload.setup_pin_code), PASSCODE_BITS);
    writer.write(0, PADDING_BITS);

    let mut bytes = writer.bytes;
    bytes.extend(tlv::encode(&payload.extra_tags));
    format!("{PREFIX}{}", base38::encode(&bytes))
}
