// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optional TLV data carried after the QR payload header.
//!
//! Only the subset QR codes use is handled: one anonymous structure of
//! context-tagged integers and UTF-8 strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

const ANONYMOUS_STRUCTURE: u8 = 0x15;
const END_OF_CONTAINER: u8 = 0x18;
const CONTEXT_TAG: u8 = 0x20;
const TAG_CONTROL_MASK: u8 = 0xE0;
const ELEMENT_TYPE_MASK: u8 = 0x1F;

const SIGNED_INT_1: u8 = 0x00;
const SIGNED_INT_8: u8 = 0x03;
const UNSIGNED_INT_1: u8 = 0x04;
const UNSIGNED_INT_8: u8 = 0x07;
const UTF8_LEN_1: u8 = 0x0C;
const UTF8_LEN_8: u8 = 0x0F;

/// Value of an optional QR data element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrTagValue {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// UTF-8 string.
    String(String),
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], PayloadError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| PayloadError::InvalidTlv("unexpected end of data".to_string()))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn byte(&mut self) -> Result<u8, PayloadError> {
        Ok(self.take(1)?[0])
    }

    fn uint(&mut self, width: usize) -> Result<u64, PayloadError> {
        let raw = self.take(width)?;
        Ok(raw
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }
}

/// Parses the TLV bytes following the QR header.
///
/// An empty slice yields no tags.
///
/// # Errors
///
/// Returns `PayloadError::InvalidTlv` for anything outside the supported
/// subset or for truncated data.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn parse(bytes: &[u8]) -> Result<BTreeMap<u8, QrTagValue>, PayloadError> {
    let mut tags = BTreeMap::new();
    if bytes.iter().all(|&b| b == 0) {
        return Ok(tags);
    }

    let mut reader = Reader { bytes, pos: 0 };
    if reader.byte()? != ANONYMOUS_STRUCTURE {
        return Err(PayloadError::InvalidTlv(
            "expected anonymous structure".to_string(),
        ));
    }

    loop {
        let control = reader.byte()?;
        if control == END_OF_CONTAINER {
            break;
        }
        if control & TAG_CONTROL_MASK != CONTEXT_TAG {
            return Err(PayloadError::InvalidTlv(format!(
                "unsupported tag control {control:#04x}"
            )));
        }
        let tag = reader.byte()?;
        let element = control & ELEMENT_TYPE_MASK;
        let value = match element {
            SIGNED_INT_1..=SIGNED_INT_8 => {
                let width = 1usize << (element - SIGNED_INT_1);
                let raw = reader.uint(width)?;
                let shift = 64 - 8 * width as u32;
                QrTagValue::Int(((raw << shift) as i64) >> shift)
            }
            UNSIGNED_INT_1..=UNSIGNED_INT_8 => {
                let width = 1usize << (element - UNSIGNED_INT_1);
                QrTagValue::UInt(reader.uint(width)?)
            }
            UTF8_LEN_1..=UTF8_LEN_8 => {
                let width = 1usize << (element - UTF8_LEN_1);
                let len = usize::try_from(reader.uint(width)?)
                    .map_err(|_| PayloadError::InvalidTlv("string too long".to_string()))?;
                let raw = reader.take(len)?;
                let text = std::str::from_utf8(raw)
                    .map_err(|e| PayloadError::InvalidTlv(e.to_string()))?;
                QrTagValue::String(text.to_string())
            }
            other => {
                return Err(PayloadError::InvalidTlv(format!(
                    "unsupported element type {other:#04x}"
                )));
            }
        };
        tags.insert(tag, value);
    }
    Ok(tags)
}

/// Encodes tags as an anonymous TLV structure.
///
/// Returns an empty vector when there are no tags.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode(tags: &BTreeMap<u8, QrTagValue>) -> Vec<u8> {
    if tags.is_empty() {
        return Vec::new();
    }
    let mut out = vec![ANONYMOUS_STRUCTURE];
    for (&tag, value) in tags {
        match value {
            QrTagValue::Int(v) => {
                out.extend_from_slice(&[CONTEXT_TAG | SIGNED_INT_8, tag]);
                out.extend_from_slice(&v.to_le_bytes());
            }
            QrTagValue::UInt(v) => {
                out.extend_from_slice(&[CONTEXT_TAG | UNSIGNED_INT_8, tag]);
                out.extend_from_slice(&v.to_le_bytes());
            }
            QrTagValue::String(s) => {
                let len = s.len().min(usize::from(u8::MAX));
                out.extend_from_slice(&[CONTEXT_TAG | UTF8_LEN_1, tag, len as u8]);
                out.extend_from_slice(&s.as_bytes()[..len]);
            }
        }
    }
    out.push(END_OF_CONTAINER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serial_number_and_vendor_int() {
        let bytes = [
            0x15, // structure
            0x2C, 0x00, 0x03, b'A', b'B', b'C', // tag 0: "ABC"
            0x24, 0x82, 0x2A, // tag 0x82: u8 42
            0x20, 0x83, 0xFF, // tag 0x83: i8 -1
            0x18,
        ];
        let tags = parse(&bytes).unwrap();
        assert_eq!(tags.get(&0), Some(&QrTagValue::String("ABC".to_string())));
        assert_eq!(tags.get(&0x82), Some(&QrTagValue::UInt(42)));
        assert_eq!(tags.get(&0x83), Some(&QrTagValue::Int(-1)));
    }

    #[test]
    fn empty_and_zero_padding_yield_no_tags() {
        assert!(parse(&[]).unwrap().is_empty());
        assert!(parse(&[0, 0]).unwrap().is_empty());
    }

    #[test]
    fn truncated_data_is_an_error() {
        assert!(matches!(
            parse(&[0x15, 0x2C, 0x00, 0x05, b'A']),
            Err(PayloadError::InvalidTlv(_))
        ));
        assert!(matches!(parse(&[0x15, 0x24]), Err(PayloadError::InvalidTlv(_))));
    }

    #[test]
    fn encoded_tags_parse_back() {
        let mut tags = BTreeMap::new();
        tags.insert(0, QrTagValue::String("SN-1".to_string()));
        tags.insert(0x80, QrTagValue::Int(-300));
        assert_eq!(parse(&encode(&tags)).unwrap(), tags);
    }
}
