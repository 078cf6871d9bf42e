// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cluster, attribute and command ids of the supported clusters.

pub mod on_off {
    pub const CLUSTER: u32 = 0x0006;
    pub const ON_OFF: u32 = 0x0000;
    pub const OFF: u32 = 0x00;
    pub const ON: u32 = 0x01;
}

pub mod level_control {
    pub const CLUSTER: u32 = 0x0008;
    pub const CURRENT_LEVEL: u32 = 0x0000;
    pub const MOVE_TO_LEVEL: u32 = 0x00;
}

pub mod color_control {
    pub const CLUSTER: u32 = 0x0300;
    pub const CURRENT_HUE: u32 = 0x0000;
    pub const CURRENT_SATURATION: u32 = 0x0001;
    pub const COLOR_TEMPERATURE_MIREDS: u32 = 0x0007;
    pub const MOVE_TO_HUE_AND_SATURATION: u32 = 0x06;
    pub const MOVE_TO_COLOR_TEMPERATURE: u32 = 0x0A;
}

pub mod fan_control {
    pub const CLUSTER: u32 = 0x0202;
    pub const FAN_MODE: u32 = 0x0000;
    pub const PERCENT_SETTING: u32 = 0x0002;
}

pub mod descriptor {
    pub const CLUSTER: u32 = 0x001D;
    pub const DEVICE_TYPE_LIST: u32 = 0x0000;
    pub const PARTS_LIST: u32 = 0x0003;
    /// Field of a device type struct holding the device type id.
    pub const DEVICE_TYPE_FIELD: u8 = 0;
}

pub mod basic_information {
    pub const CLUSTER: u32 = 0x0028;
    pub const VENDOR_NAME: u32 = 0x0001;
    pub const VENDOR_ID: u32 = 0x0002;
    pub const PRODUCT_NAME: u32 = 0x0003;
    pub const PRODUCT_ID: u32 = 0x0004;
    pub const NODE_LABEL: u32 = 0x0005;
    pub const UNIQUE_ID: u32 = 0x0012;
}

pub mod administrator_commissioning {
    pub const CLUSTER: u32 = 0x003C;
    pub const WINDOW_STATUS: u32 = 0x0000;
    pub const REVOKE_COMMISSIONING: u32 = 0x02;
}

pub mod operational_credentials {
    pub const CLUSTER: u32 = 0x003E;
    pub const SUPPORTED_FABRICS: u32 = 0x0002;
    pub const COMMISSIONED_FABRICS: u32 = 0x0003;
    pub const CURRENT_FABRIC_INDEX: u32 = 0x0005;
}

/// Clusters whose reports feed device state snapshots.
pub const STATE_CLUSTERS: [u32; 4] = [
    on_off::CLUSTER,
    level_control::CLUSTER,
    color_control::CLUSTER,
    fan_control::CLUSTER,
];
