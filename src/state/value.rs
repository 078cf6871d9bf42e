// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed state attribute values.
//!
//! A [`StateValue`] carries both the attribute it belongs to and its typed
//! value, so a snapshot can never store a brightness under the color key.
//!
//! # Examples
//!
//! ```
//! use matter_link::AttributeKey;
//! use matter_link::state::StateValue;
//! use matter_link::types::Brightness;
//!
//! let value = StateValue::Brightness(Brightness::clamped(40));
//! assert_eq!(value.key(), AttributeKey::Brightness);
//! ```

use serde::{Deserialize, Serialize};

use crate::capabilities::AttributeKey;
use crate::types::{Brightness, ColorTemperature, FanMode, FanSpeed, HsvColor};

/// A value for one [`AttributeKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value")]
pub enum StateValue {
    /// Whether the device is reachable.
    Online(bool),
    /// On/off state.
    Switch(bool),
    /// Brightness percentage.
    Brightness(Brightness),
    /// Hue and saturation.
    Color(HsvColor),
    /// Color temperature on the standard scale.
    ColorTemperature(ColorTemperature),
    /// Fan mode.
    FanMode(FanMode),
    /// Fan speed percentage.
    FanSpeed(FanSpeed),
}

impl StateValue {
    /// Returns the attribute this value belongs to.
    #[must_use]
    pub const fn key(&self) -> AttributeKey {
        match self {
            Self::Online(_) => AttributeKey::Online,
            Self::Switch(_) => AttributeKey::Switch,
            Self::Brightness(_) => AttributeKey::Brightness,
            Self::Color(_) => AttributeKey::Color,
            Self::ColorTemperature(_) => AttributeKey::ColorTemperature,
            Self::FanMode(_) => AttributeKey::FanMode,
            Self::FanSpeed(_) => AttributeKey::FanSpeed,
        }
    }

    /// Returns the boolean payload of `Online` and `Switch` values.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Online(v) | Self::Switch(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_follows_variant() {
        assert_eq!(StateValue::Online(true).key(), AttributeKey::Online);
        assert_eq!(
            StateValue::FanMode(FanMode::Auto).key(),
            AttributeKey::FanMode
        );
        assert_eq!(
            StateValue::Color(HsvColor::default()).key(),
            AttributeKey::Color
        );
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_value(StateValue::Switch(true)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "attribute": "Switch", "value": true })
        );
    }
}
