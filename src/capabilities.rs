// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device type to supported state attribute table.
//!
//! Each [`DeviceType`] exposes a fixed set of [`AttributeKey`]s. The
//! table decides which attributes are read for a device, which report
//! values are kept in a [`DeviceStateSnapshot`](crate::state::DeviceStateSnapshot),
//! and which writes are skipped as no-ops.
//!
//! # Examples
//!
//! ```
//! use matter_link::{AttributeKey, is_attribute_supported};
//! use matter_link::types::DeviceType;
//!
//! assert!(is_attribute_supported(DeviceType::Fan, AttributeKey::FanMode));
//! assert!(!is_attribute_supported(DeviceType::Fan, AttributeKey::Brightness));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DeviceType;

/// A normalized device state attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeKey {
    /// Device reachability.
    Online,
    /// On/off state.
    Switch,
    /// Brightness percentage.
    Brightness,
    /// Hue and saturation.
    Color,
    /// Color temperature on the standard scale.
    ColorTemperature,
    /// Fan mode.
    FanMode,
    /// Fan speed percentage.
    FanSpeed,
}

impl AttributeKey {
    /// All attribute keys in report order.
    pub const ALL: [Self; 7] = [
        Self::Online,
        Self::Switch,
        Self::Brightness,
        Self::Color,
        Self::ColorTemperature,
        Self::FanMode,
        Self::FanSpeed,
    ];
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

use AttributeKey::{Brightness, Color, ColorTemperature, FanMode, FanSpeed, Online, Switch};

const LIGHT_ATTRIBUTES: &[AttributeKey] = &[Online, Switch, Brightness, ColorTemperature];
const COLOR_LIGHT_ATTRIBUTES: &[AttributeKey] =
    &[Online, Switch, Brightness, ColorTemperature, Color];
const ON_OFF_ATTRIBUTES: &[AttributeKey] = &[Online, Switch];
const DIMMABLE_ATTRIBUTES: &[AttributeKey] = &[Online, Switch, Brightness];
const COLOR_DIMMER_ATTRIBUTES: &[AttributeKey] = &[Online, Switch, Brightness, Color];
const FAN_ATTRIBUTES: &[AttributeKey] = &[Online, Switch, FanMode, FanSpeed];
const ONLINE_ONLY: &[AttributeKey] = &[Online];

/// Returns the attributes a device type supports.
///
/// Every device type supports [`AttributeKey::Online`]. Device types the
/// library does not recognise support nothing else.
#[must_use]
pub const fn supported_attributes(device_type: DeviceType) -> &'static [AttributeKey] {
    match device_type {
        DeviceType::OnOffLight | DeviceType::DimmableLight => LIGHT_ATTRIBUTES,
        DeviceType::ColorTemperatureLight | DeviceType::ExtendedColorLight => {
            COLOR_LIGHT_ATTRIBUTES
        }
        DeviceType::Socket | DeviceType::OnOffLightSwitch => ON_OFF_ATTRIBUTES,
        DeviceType::DimmableSocket | DeviceType::DimmerSwitch => DIMMABLE_ATTRIBUTES,
        DeviceType::ColorDimmerSwitch => COLOR_DIMMER_ATTRIBUTES,
        DeviceType::Fan => FAN_ATTRIBUTES,
        DeviceType::Unrecognized(_) => ONLINE_ONLY,
    }
}

/// Checks whether `device_type` exposes `attribute`.
#[must_use]
pub fn is_attribute_supported(device_type: DeviceType, attribute: AttributeKey) -> bool {
    supported_attributes(device_type).contains(&attribute)
}
