// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types on the standard scale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Color temperature on the standard 0-100 scale.
///
/// 0 corresponds to the coolest supported mired value (154) and 100 to
/// the warmest (526). See [`crate::mapping::mireds_to_standard`].
///
/// # Examples
///
/// ```
/// use matter_link::types::ColorTemperature;
///
/// let ct = ColorTemperature::new(30).unwrap();
/// assert_eq!(ct.value(), 30);
/// assert!(ColorTemperature::new(101).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct ColorTemperature(u8);

impl ColorTemperature {
    /// Coolest (0).
    pub const MIN: Self = Self(0);

    /// Warmest (100).
    pub const MAX: Self = Self(100);

    /// Creates a new color temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a color temperature, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the standard scale value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ColorTemperature {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColorTemperature> for u8 {
    fn from(value: ColorTemperature) -> Self {
        value.0
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hue and saturation on the standard scale.
///
/// - Hue: 0-360 degrees
/// - Saturation: 0-100 percent
///
/// The value channel of the color is carried separately as
/// [`Brightness`](super::Brightness).
///
/// # Examples
///
/// ```
/// use matter_link::types::HsvColor;
///
/// let red = HsvColor::new(0, 100).unwrap();
/// assert_eq!(red.hue(), 0);
/// assert!(HsvColor::new(361, 50).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HsvColor {
    hue: u16,
    saturation: u8,
}

impl HsvColor {
    /// Maximum hue in degrees.
    pub const MAX_HUE: u16 = 360;

    /// Maximum saturation in percent.
    pub const MAX_SATURATION: u8 = 100;

    /// Creates a new color.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHue` or `ValueError::InvalidSaturation`
    /// when a component is out of range.
    pub fn new(hue: u16, saturation: u8) -> Result<Self, ValueError> {
        if hue > Self::MAX_HUE {
            return Err(ValueError::InvalidHue(hue));
        }
        if saturation > Self::MAX_SATURATION {
            return Err(ValueError::InvalidSaturation(saturation));
        }
        Ok(Self { hue, saturation })
    }

    /// Creates a color, clamping each component to its range.
    #[must_use]
    pub fn clamped(hue: u16, saturation: u8) -> Self {
        Self {
            hue: hue.min(Self::MAX_HUE),
            saturation: saturation.min(Self::MAX_SATURATION),
        }
    }

    /// Returns the hue in degrees.
    #[must_use]
    pub const fn hue(&self) -> u16 {
        self.hue
    }

    /// Returns the saturation in percent.
    #[must_use]
    pub const fn saturation(&self) -> u8 {
        self.saturation
    }
}

impl fmt::Display for HsvColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsv({}, {}%)", self.hue, self.saturation)
    }
}
