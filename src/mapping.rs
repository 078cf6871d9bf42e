// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remapping between vendor attribute ranges and the standard scale.
//!
//! Matter devices report hue, saturation and level on a 0-254 scale and
//! color temperature in mireds (154-526). The rest of the library works
//! on the standard scale: hue 0-360, saturation and brightness 0-100,
//! color temperature 0-100.
//!
//! # Examples
//!
//! ```
//! use matter_link::mapping::{map_linear, map_range};
//!
//! assert_eq!(map_linear(127, 254, 360), 180);
//! assert_eq!(map_range(340, 154, 526, 0, 100), 50);
//! ```

use crate::types::{Brightness, ColorTemperature, HsvColor};

/// Vendor maximum for hue.
pub const VENDOR_MAX_HUE: i32 = 254;
/// Vendor maximum for saturation.
pub const VENDOR_MAX_SATURATION: i32 = 254;
/// Vendor maximum for level (brightness).
pub const VENDOR_MAX_LEVEL: i32 = 254;
/// Coolest color temperature in mireds.
pub const VENDOR_MIN_MIREDS: i32 = 154;
/// Warmest color temperature in mireds.
pub const VENDOR_MAX_MIREDS: i32 = 526;

/// Standard maximum for hue.
pub const STANDARD_MAX_HUE: i32 = 360;
/// Standard maximum for saturation.
pub const STANDARD_MAX_SATURATION: i32 = 100;
/// Standard maximum for brightness.
pub const STANDARD_MAX_BRIGHTNESS: i32 = 100;
/// Standard minimum for color temperature.
pub const STANDARD_MIN_COLOR_TEMPERATURE: i32 = 0;
/// Standard maximum for color temperature.
pub const STANDARD_MAX_COLOR_TEMPERATURE: i32 = 100;

/// Scales `value` from `0..=from_max` to `0..=to_max`, rounding to the
/// nearest integer with halves away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn map_linear(value: i32, from_max: i32, to_max: i32) -> i32 {
    if from_max == 0 {
        return 0;
    }
    let scaled = f64::from(value) * f64::from(to_max) / f64::from(from_max);
    scaled.round() as i32
}

/// Maps `value` from `from_min..=from_max` to `to_min..=to_max`.
///
/// Uses half-up integer division: half the source span is added before
/// dividing, so midpoints round towards the upper value. Results outside
/// the `i32` range saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn map_range(value: i32, from_min: i32, from_max: i32, to_min: i32, to_max: i32) -> i32 {
    let divisor = i128::from(from_max) - i128::from(from_min);
    if divisor == 0 {
        return to_min;
    }
    let dividend = i128::from(to_max) - i128::from(to_min);
    let delta = i128::from(value) - i128::from(from_min);
    let mapped = (delta * dividend + divisor / 2) / divisor + i128::from(to_min);
    mapped.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(value: i32) -> u8 {
    value.clamp(0, i32::from(u8::MAX)) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u16(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

/// Converts a vendor level (0-254) to a brightness percentage.
#[must_use]
pub fn level_to_brightness(level: u8) -> Brightness {
    Brightness::clamped(to_u8(map_linear(
        i32::from(level),
        VENDOR_MAX_LEVEL,
        STANDARD_MAX_BRIGHTNESS,
    )))
}

/// Converts a brightness percentage to a vendor level (0-254).
#[must_use]
pub fn brightness_to_level(brightness: Brightness) -> u8 {
    to_u8(map_linear(
        i32::from(brightness.value()),
        STANDARD_MAX_BRIGHTNESS,
        VENDOR_MAX_LEVEL,
    ))
}

/// Converts vendor hue and saturation (0-254 each) to a standard color.
#[must_use]
pub fn vendor_to_hsv(hue: u8, saturation: u8) -> HsvColor {
    HsvColor::clamped(
        to_u16(map_linear(
            i32::from(hue),
            VENDOR_MAX_HUE,
            STANDARD_MAX_HUE,
        )),
        to_u8(map_linear(
            i32::from(saturation),
            VENDOR_MAX_SATURATION,
            STANDARD_MAX_SATURATION,
        )),
    )
}

/// Converts a standard color to vendor hue and saturation.
#[must_use]
pub fn hsv_to_vendor(color: HsvColor) -> (u8, u8) {
    (
        to_u8(map_linear(
            i32::from(color.hue()),
            STANDARD_MAX_HUE,
            VENDOR_MAX_HUE,
        )),
        to_u8(map_linear(
            i32::from(color.saturation()),
            STANDARD_MAX_SATURATION,
            VENDOR_MAX_SATURATION,
        )),
    )
}

/// Converts mireds to the standard color temperature scale.
///
/// Values outside 154-526 are clamped first.
#[must_use]
pub fn mireds_to_standard(mireds: u16) -> ColorTemperature {
    let mireds = i32::from(mireds).clamp(VENDOR_MIN_MIREDS, VENDOR_MAX_MIREDS);
    ColorTemperature::clamped(to_u8(map_range(
        mireds,
        VENDOR_MIN_MIREDS,
        VENDOR_MAX_MIREDS,
        STANDARD_MIN_COLOR_TEMPERATURE,
        STANDARD_MAX_COLOR_TEMPERATURE,
    )))
}

/// Converts a standard color temperature to mireds.
#[must_use]
pub fn standard_to_mireds(temperature: ColorTemperature) -> u16 {
    to_u16(map_range(
        i32::from(temperature.value()),
        STANDARD_MIN_COLOR_TEMPERATURE,
        STANDARD_MAX_COLOR_TEMPERATURE,
        VENDOR_MIN_MIREDS,
        VENDOR_MAX_MIREDS,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_127_maps_to_180_and_back() {
        assert_eq!(map_linear(127, VENDOR_MAX_HUE, STANDARD_MAX_HUE), 180);
        assert_eq!(map_linear(180, STANDARD_MAX_HUE, VENDOR_MAX_HUE), 127);
    }

    #[test]
    fn map_linear_rounds_to_nearest() {
        // 1 * 100 / 254 = 0.39
        assert_eq!(map_linear(1, 254, 100), 0);
        // 2 * 100 / 254 = 0.79
        assert_eq!(map_linear(2, 254, 100), 1);
        assert_eq!(map_linear(254, 254, 100), 100);
    }

    #[test]
    fn map_range_endpoints() {
        assert_eq!(map_range(154, 154, 526, 0, 100), 0);
        assert_eq!(map_range(526, 154, 526, 0, 100), 100);
        assert_eq!(map_range(0, 0, 100, 154, 526), 154);
        assert_eq!(map_range(100, 0, 100, 154, 526), 526);
    }

    #[test]
    fn map_range_round_trip_within_one_unit() {
        for v in 0..=100 {
            let there = map_range(v, 0, 100, 154, 526);
            let back = map_range(there, 154, 526, 0, 100);
            assert!((back - v).abs() <= 1, "{v} -> {there} -> {back}");
        }
    }

    #[test]
    fn map_linear_round_trip_within_one_unit() {
        for v in 0..=100 {
            let there = map_linear(v, 100, 254);
            let back = map_linear(there, 254, 100);
            assert!((back - v).abs() <= 1, "{v} -> {there} -> {back}");
        }
        for v in 0..=254 {
            let there = map_linear(v, 254, 360);
            let back = map_linear(there, 360, 254);
            assert!((back - v).abs() <= 1, "{v} -> {there} -> {back}");
        }
    }

    #[test]
    fn map_range_handles_wide_inputs() {
        assert_eq!(map_range(100_000, 0, 100_000, 0, 100_000), 100_000);
        assert_eq!(map_range(i32::MAX, i32::MIN, i32::MAX, 0, 100), 100);
        assert_eq!(map_range(i32::MAX, 0, 1, 0, i32::MAX), i32::MAX);
        assert_eq!(map_range(i32::MIN, 0, 1, 0, i32::MAX), i32::MIN);
    }

    #[test]
    fn degenerate_ranges_do_not_divide_by_zero() {
        assert_eq!(map_linear(5, 0, 100), 0);
        assert_eq!(map_range(5, 3, 3, 10, 20), 10);
    }

    #[test]
    fn typed_helpers() {
        assert_eq!(level_to_brightness(254).value(), 100);
        assert_eq!(brightness_to_level(Brightness::MAX), 254);
        assert_eq!(vendor_to_hsv(127, 254), HsvColor::clamped(180, 100));
        assert_eq!(hsv_to_vendor(HsvColor::clamped(180, 100)), (127, 254));
        assert_eq!(mireds_to_standard(154), ColorTemperature::MIN);
        assert_eq!(mireds_to_standard(1000), ColorTemperature::MAX);
        assert_eq!(standard_to_mireds(ColorTemperature::MAX), 526);
    }
}
