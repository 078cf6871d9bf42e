// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized device state snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StateValue;
use crate::capabilities::{AttributeKey, is_attribute_supported};
use crate::error::ValueError;
use crate::types::{Brightness, ColorTemperature, DeviceType, FanMode, FanSpeed, HsvColor};

/// A set of attribute values read or reported for one device.
///
/// A snapshot is bound to a [`DeviceType`] and silently drops values for
/// attributes that type does not support, so its attribute set is always
/// a subset of [`supported_attributes`](crate::supported_attributes).
///
/// Snapshots are produced fresh on each read or report. Merging them
/// into a long-lived state is the job of the store
/// ([`DeviceRegistry::merge_state`](crate::store::DeviceRegistry::merge_state)).
///
/// # Examples
///
/// ```
/// use matter_link::AttributeKey;
/// use matter_link::state::{DeviceStateSnapshot, StateValue};
/// use matter_link::types::{Brightness, DeviceType};
///
/// let mut snapshot = DeviceStateSnapshot::online(DeviceType::Socket, true);
/// assert!(snapshot.apply(StateValue::Switch(true)));
///
/// // Sockets have no brightness, the value is dropped
/// assert!(!snapshot.apply(StateValue::Brightness(Brightness::MAX)));
/// assert!(!snapshot.contains(AttributeKey::Brightness));
/// ```
///
/// Deserialization rejects values the device type does not support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct DeviceStateSnapshot {
    device_type: DeviceType,
    values: BTreeMap<AttributeKey, StateValue>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    device_type: DeviceType,
    values: BTreeMap<AttributeKey, StateValue>,
}

impl TryFrom<RawSnapshot> for DeviceStateSnapshot {
    type Error = ValueError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let mut snapshot = Self::new(raw.device_type);
        for (key, value) in raw.values {
            if value.key() != key {
                return Err(ValueError::MismatchedAttribute {
                    key,
                    value: value.key(),
                });
            }
            if !snapshot.apply(value) {
                return Err(ValueError::UnsupportedAttribute {
                    device_type: raw.device_type,
                    attribute: key,
                });
            }
        }
        Ok(snapshot)
    }
}

impl DeviceStateSnapshot {
    /// Creates an empty snapshot for a device type.
    #[must_use]
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            device_type,
            values: BTreeMap::new(),
        }
    }

    /// Creates a snapshot holding only the online flag.
    #[must_use]
    pub fn online(device_type: DeviceType, online: bool) -> Self {
        let mut snapshot = Self::new(device_type);
        snapshot.apply(StateValue::Online(online));
        snapshot
    }

    /// Stores a value if the device type supports its attribute.
    ///
    /// Returns `true` if the value was stored.
    pub fn apply(&mut self, value: StateValue) -> bool {
        let key = value.key();
        if !is_attribute_supported(self.device_type, key) {
            return false;
        }
        self.values.insert(key, value);
        true
    }

    /// Returns the device type this snapshot belongs to.
    #[must_use]
    pub const fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Returns the value stored for an attribute.
    #[must_use]
    pub fn get(&self, key: AttributeKey) -> Option<&StateValue> {
        self.values.get(&key)
    }

    /// Whether a value is stored for an attribute.
    #[must_use]
    pub fn contains(&self, key: AttributeKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Iterates over the stored attributes.
    pub fn keys(&self) -> impl Iterator<Item = AttributeKey> + '_ {
        self.values.keys().copied()
    }

    /// Iterates over the stored values.
    pub fn values(&self) -> impl Iterator<Item = &StateValue> {
        self.values.values()
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // ========================================================================
    // Typed getters
    // ========================================================================

    /// Returns the online flag.
    #[must_use]
    pub fn is_online(&self) -> Option<bool> {
        match self.get(AttributeKey::Online) {
            Some(StateValue::Online(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the on/off state.
    #[must_use]
    pub fn switch(&self) -> Option<bool> {
        match self.get(AttributeKey::Switch) {
            Some(StateValue::Switch(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the brightness.
    #[must_use]
    pub fn brightness(&self) -> Option<Brightness> {
        match self.get(AttributeKey::Brightness) {
            Some(StateValue::Brightness(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the color.
    #[must_use]
    pub fn color(&self) -> Option<HsvColor> {
        match self.get(AttributeKey::Color) {
            Some(StateValue::Color(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the color temperature.
    #[must_use]
    pub fn color_temperature(&self) -> Option<ColorTemperature> {
        match self.get(AttributeKey::ColorTemperature) {
            Some(StateValue::ColorTemperature(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the fan mode.
    #[must_use]
    pub fn fan_mode(&self) -> Option<FanMode> {
        match self.get(AttributeKey::FanMode) {
            Some(StateValue::FanMode(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the fan speed.
    #[must_use]
    pub fn fan_speed(&self) -> Option<FanSpeed> {
        match self.get(AttributeKey::FanSpeed) {
            Some(StateValue::FanSpeed(v)) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::supported_attributes;

    #[test]
    fn drops_unsupported_attributes() {
        let mut snapshot = DeviceStateSnapshot::new(DeviceType::Fan);
        assert!(snapshot.apply(StateValue::FanMode(FanMode::High)));
        assert!(!snapshot.apply(StateValue::Brightness(Brightness::MAX)));
        assert_eq!(snapshot.fan_mode(), Some(FanMode::High));
        assert_eq!(snapshot.brightness(), None);
    }

    #[test]
    fn keys_are_always_supported() {
        let mut snapshot = DeviceStateSnapshot::new(DeviceType::DimmableSocket);
        snapshot.apply(StateValue::Online(true));
        snapshot.apply(StateValue::Switch(false));
        snapshot.apply(StateValue::Color(HsvColor::clamped(20, 20)));
        snapshot.apply(StateValue::Brightness(Brightness::clamped(10)));
        let allowed = supported_attributes(DeviceType::DimmableSocket);
        assert!(snapshot.keys().all(|k| allowed.contains(&k)));
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn deserialize_keeps_supported_values() {
        let mut snapshot = DeviceStateSnapshot::online(DeviceType::DimmableLight, true);
        snapshot.apply(StateValue::Brightness(Brightness::clamped(40)));

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: DeviceStateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn deserialize_rejects_unsupported_values() {
        let mut fan = DeviceStateSnapshot::new(DeviceType::Fan);
        fan.apply(StateValue::FanSpeed(FanSpeed::clamped(30)));
        let json = serde_json::to_string(&fan)
            .unwrap()
            .replace("\"Fan\"", "\"Socket\"");

        let err = serde_json::from_str::<DeviceStateSnapshot>(&json).unwrap_err();
        assert!(err.to_string().contains("does not support"), "{err}");
    }

    #[test]
    fn deserialize_rejects_mismatched_keys() {
        let snapshot = DeviceStateSnapshot::online(DeviceType::Socket, true);
        let value = serde_json::to_value(&snapshot).unwrap();
        let online = value["values"]["Online"].clone();
        let json = serde_json::json!({
            "device_type": value["device_type"],
            "values": { "Switch": online },
        });

        let err = serde_json::from_value::<DeviceStateSnapshot>(json).unwrap_err();
        assert!(err.to_string().contains("value stored under"), "{err}");
    }

    #[test]
    fn later_value_replaces_earlier() {
        let mut snapshot = DeviceStateSnapshot::online(DeviceType::Socket, false);
        snapshot.apply(StateValue::Online(true));
        assert_eq!(snapshot.is_online(), Some(true));
        assert_eq!(snapshot.len(), 1);
    }
}
