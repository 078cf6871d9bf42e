// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity of a commissioned device.

use serde::{Deserialize, Serialize};

use super::{DeviceType, NodeId};

/// What commissioning learned about a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Operational node id assigned during commissioning.
    pub device_id: NodeId,
    /// Vendor id, from the payload or read back from the device.
    pub vendor_id: u16,
    /// Product id, from the payload or read back from the device.
    pub product_id: u16,
    /// Device type reported by the first application endpoint.
    pub device_type: DeviceType,
}
