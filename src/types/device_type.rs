// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Matter device types recognised by the library.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Device type as reported by a device's descriptor cluster.
///
/// Device types the library does not model are kept as
/// [`DeviceType::Unrecognized`] with their raw id, so introspection never
/// fails on an unfamiliar device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// On/off light (0x0100).
    OnOffLight,
    /// Dimmable light (0x0101).
    DimmableLight,
    /// On/off light switch (0x0103).
    OnOffLightSwitch,
    /// Dimmer switch (0x0104).
    DimmerSwitch,
    /// Color dimmer switch (0x0105).
    ColorDimmerSwitch,
    /// On/off plug-in unit (0x010A).
    Socket,
    /// Dimmable plug-in unit (0x010B).
    DimmableSocket,
    /// Color temperature light (0x010C).
    ColorTemperatureLight,
    /// Extended color light (0x010D).
    ExtendedColorLight,
    /// Fan (0x002B).
    Fan,
    /// Any other device type id.
    Unrecognized(u32),
}

impl DeviceType {
    /// Returns the Matter device type id.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::OnOffLight => 0x0100,
            Self::DimmableLight => 0x0101,
            Self::OnOffLightSwitch => 0x0103,
            Self::DimmerSwitch => 0x0104,
            Self::ColorDimmerSwitch => 0x0105,
            Self::Socket => 0x010A,
            Self::DimmableSocket => 0x010B,
            Self::ColorTemperatureLight => 0x010C,
            Self::ExtendedColorLight => 0x010D,
            Self::Fan => 0x002B,
            Self::Unrecognized(code) => code,
        }
    }

    /// Whether the library models this device type.
    #[must_use]
    pub const fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<u32> for DeviceType {
    fn from(code: u32) -> Self {
        match code {
            0x0100 => Self::OnOffLight,
            0x0101 => Self::DimmableLight,
            0x0103 => Self::OnOffLightSwitch,
            0x0104 => Self::DimmerSwitch,
            0x0105 => Self::ColorDimmerSwitch,
            0x010A => Self::Socket,
            0x010B => Self::DimmableSocket,
            0x010C => Self::ColorTemperatureLight,
            0x010D => Self::ExtendedColorLight,
            0x002B => Self::Fan,
            other => Self::Unrecognized(other),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized(code) => write!(f, "Unrecognized({code:#06x})"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}
