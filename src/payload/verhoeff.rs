// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Verhoeff check digit over decimal strings.

const MULTIPLY: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

const PERMUTE: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 6, 8, 7, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

const INVERSE: [u8; 10] = [0, 4, 3, 2, 1, 5, 6, 7, 8, 9];

fn checksum(digits: &[u8], offset: usize) -> u8 {
    digits
        .iter()
        .rev()
        .enumerate()
        .fold(0u8, |c, (i, &d)| {
            MULTIPLY[c as usize][PERMUTE[(i + offset) % 8][d as usize] as usize]
        })
}

/// Computes the check digit for a string of decimal digits.
///
/// Returns `None` if `digits` contains anything but `0-9`.
#[must_use]
pub fn compute(digits: &str) -> Option<char> {
    let values = to_values(digits)?;
    let c = INVERSE[checksum(&values, 1) as usize];
    Some(char::from(b'0' + c))
}

/// Validates a string of decimal digits whose last digit is the check digit.
#[must_use]
pub fn validate(digits_with_check: &str) -> bool {
    match to_values(digits_with_check) {
        Some(values) if !values.is_empty() => checksum(&values, 0) == 0,
        _ => false,
    }
}

fn to_values(digits: &str) -> Option<Vec<u8>> {
    digits
        .bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_vector() {
        assert_eq!(compute("236"), Some('3'));
        assert!(validate("2363"));
        assert!(!validate("2364"));
    }

    #[test]
    fn manual_code_vector() {
        assert_eq!(compute("3497011233"), Some('2'));
        assert!(validate("34970112332"));
    }

    #[test]
    fn rejects_non_digits() {
        assert_eq!(compute("12a"), None);
        assert!(!validate(""));
        assert!(!validate("1-2"));
    }

    #[test]
    fn detects_adjacent_transposition() {
        assert!(validate("34970112332"));
        assert!(!validate("43970112332"));
    }
}
