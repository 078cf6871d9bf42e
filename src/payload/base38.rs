// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Base-38 codec used by QR onboarding payloads.
//!
//! Bytes are grouped little-endian into chunks of three; a chunk of 3, 2
//! or 1 bytes becomes 5, 4 or 2 characters, least significant digit
//! first.

use crate::error::PayloadError;

const ALPHABET: &[u8; 38] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-.";
const RADIX: u32 = 38;

fn char_count(bytes: usize) -> usize {
    match bytes {
        3 => 5,
        2 => 4,
        _ => 2,
    }
}

fn digit_value(c: char) -> Result<u32, PayloadError> {
    match c {
        '0'..='9' => Ok(c as u32 - '0' as u32),
        'A'..='Z' => Ok(c as u32 - 'A' as u32 + 10),
        '-' => Ok(36),
        '.' => Ok(37),
        other => Err(PayloadError::InvalidBase38Character(other)),
    }
}

/// Encodes bytes as base-38 text.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 5);
    for chunk in bytes.chunks(3) {
        let mut value = chunk
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        for _ in 0..char_count(chunk.len()) {
            out.push(char::from(ALPHABET[(value % RADIX) as usize]));
            value /= RADIX;
        }
    }
    out
}

/// Decodes base-38 text into bytes.
///
/// # Errors
///
/// Returns an error for characters outside the alphabet, for lengths
/// that do not split into 5/4/2 character chunks, and for chunks whose
/// value does not fit their byte count.
#[allow(clippy::cast_possible_truncation)]
pub fn decode(text: &str) -> Result<Vec<u8>, PayloadError> {
    let chars: Vec<char> = text.chars().collect();
    if matches!(chars.len() % 5, 1 | 3) {
        return Err(PayloadError::InvalidBase38Length(chars.len()));
    }

    let mut out = Vec::with_capacity(chars.len() / 5 * 3 + 2);
    for chunk in chars.chunks(5) {
        let byte_count = match chunk.len() {
            5 => 3,
            4 => 2,
            _ => 1,
        };
        let mut value: u32 = 0;
        for &c in chunk.iter().rev() {
            value = value * RADIX + digit_value(c)?;
        }
        if value >> (8 * byte_count) != 0 {
            return Err(PayloadError::Base38Overflow);
        }
        for i in 0..byte_count {
            out.push(((value >> (8 * i)) & 0xFF) as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(encode(&[]), "");
        assert_eq!(encode(&[10]), "A0");
        assert_eq!(encode(&[0xFF]), "R6");
        assert_eq!(encode(b"Hello World!"), "KKHF3W2S013OPM3EJX11");
        assert_eq!(decode("KKHF3W2S013OPM3EJX11").unwrap(), b"Hello World!");
    }

    #[test]
    fn partial_chunks() {
        assert_eq!(decode(&encode(&[1, 2, 3, 4])).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(decode(&encode(&[9, 8, 7, 6, 5])).unwrap(), vec![9, 8, 7, 6, 5]);
    }

    #[test]
    fn rejects_bad_characters_and_lengths() {
        assert_eq!(
            decode("AB$"),
            Err(PayloadError::InvalidBase38Length(3))
        );
        assert_eq!(
            decode("ab"),
            Err(PayloadError::InvalidBase38Character('b'))
        );
        // "..": 37 + 37 * 38 = 1443, does not fit one byte
        assert_eq!(decode(".."), Err(PayloadError::Base38Overflow));
    }
}
