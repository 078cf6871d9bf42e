// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan modes of the fan control cluster.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Fan mode attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FanMode {
    /// Fan stopped.
    #[default]
    Off,
    /// Low speed.
    Low,
    /// Medium speed.
    Medium,
    /// High speed.
    High,
    /// Running at the last used speed.
    On,
    /// Speed chosen by the fan.
    Auto,
}

impl FanMode {
    /// Returns the raw attribute value.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::On => 4,
            Self::Auto => 5,
        }
    }

    /// Whether the fan is running in this mode.
    #[must_use]
    pub const fn is_running(self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl TryFrom<u8> for FanMode {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            4 => Ok(Self::On),
            5 => Ok(Self::Auto),
            other => Err(ValueError::UnknownFanMode(other)),
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
