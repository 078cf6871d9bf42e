// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Records kept in the application stores.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{DeviceStateSnapshot, StateValue};
use crate::types::{
    Brightness, ColorTemperature, DeviceIdentity, DeviceType, FanMode, FanSpeed, HsvColor, NodeId,
};

/// A commissioned device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Operational node id.
    pub device_id: NodeId,
    /// User facing name.
    pub name: String,
    /// Device type found during commissioning.
    pub device_type: DeviceType,
    /// Vendor id.
    pub vendor_id: u16,
    /// Product id.
    pub product_id: u16,
    /// Room the user placed the device in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// When the device was commissioned.
    pub date_commissioned: DateTime<Utc>,
}

impl DeviceRecord {
    /// Builds a record for a freshly commissioned device.
    #[must_use]
    pub fn from_identity(identity: &DeviceIdentity, name: impl Into<String>) -> Self {
        Self {
            device_id: identity.device_id,
            name: name.into(),
            device_type: identity.device_type,
            vendor_id: identity.vendor_id,
            product_id: identity.product_id,
            room: None,
            date_commissioned: Utc::now(),
        }
    }
}

/// Every commissioned device, in commissioning order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Devices {
    /// The devices.
    pub devices: Vec<DeviceRecord>,
}

impl Devices {
    /// Finds a device.
    #[must_use]
    pub fn find(&self, device_id: NodeId) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| d.device_id == device_id)
    }

    pub(crate) fn find_mut(&mut self, device_id: NodeId) -> Option<&mut DeviceRecord> {
        self.devices.iter_mut().find(|d| d.device_id == device_id)
    }
}

/// Last known state of one device.
///
/// Unlike a [`DeviceStateSnapshot`], every attribute has a value; those a
/// device has never reported keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStateRecord {
    /// Device the state belongs to.
    pub device_id: NodeId,
    /// When the state was last written.
    pub date_captured: DateTime<Utc>,
    /// Reachability.
    pub online: bool,
    /// On/off state.
    pub on: bool,
    /// Brightness.
    pub brightness: Brightness,
    /// Hue and saturation.
    pub color: HsvColor,
    /// Color temperature.
    pub color_temperature: ColorTemperature,
    /// Fan mode.
    pub fan_mode: FanMode,
    /// Fan speed.
    pub fan_speed: FanSpeed,
}

impl DeviceStateRecord {
    /// A record holding only reachability.
    #[must_use]
    pub fn new(device_id: NodeId, online: bool) -> Self {
        Self {
            device_id,
            date_captured: Utc::now(),
            online,
            on: false,
            brightness: Brightness::default(),
            color: HsvColor::default(),
            color_temperature: ColorTemperature::default(),
            fan_mode: FanMode::default(),
            fan_speed: FanSpeed::default(),
        }
    }

    /// Overwrites the attributes present in `snapshot`.
    ///
    /// A snapshot without `Online` marks the device offline.
    pub fn merge(&mut self, snapshot: &DeviceStateSnapshot) {
        self.date_captured = Utc::now();
        self.online = snapshot.is_online().unwrap_or(false);
        for value in snapshot.values() {
            match *value {
                StateValue::Online(_) => {}
                StateValue::Switch(on) => self.on = on,
                StateValue::Brightness(brightness) => self.brightness = brightness,
                StateValue::Color(color) => self.color = color,
                StateValue::ColorTemperature(temperature) => self.color_temperature = temperature,
                StateValue::FanMode(mode) => self.fan_mode = mode,
                StateValue::FanSpeed(speed) => self.fan_speed = speed,
            }
        }
    }
}

/// Last known state of every device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStates {
    /// The states.
    pub states: Vec<DeviceStateRecord>,
}

impl DeviceStates {
    /// Finds a device's state.
    #[must_use]
    pub fn find(&self, device_id: NodeId) -> Option<&DeviceStateRecord> {
        self.states.iter().find(|s| s.device_id == device_id)
    }
}

/// OAuth tokens of the signed-in user.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuth {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// OpenID Connect id token.
    pub id_token: String,
    /// Token type, usually `Bearer`.
    pub token_type: String,
    /// Granted scopes.
    pub scope: String,
    /// When the access token expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserAuth {
    /// Whether the access token is missing or expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_empty() || self.expires_at.is_some_and(|at| now >= at)
    }
}

impl fmt::Debug for UserAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAuth")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account id.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Full name.
    pub name: String,
    /// Nickname.
    pub nickname: String,
    /// Avatar URL.
    pub picture_url: String,
}
