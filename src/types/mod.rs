// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Matter device control.
//!
//! Every value type here is expressed on the standard scale used by the
//! rest of the library. Each type ensures values are within their valid
//! ranges at construction time.
//!
//! # Types
//!
//! - [`NodeId`] - Operational node id, always nonzero
//! - [`DeviceType`] - Matter device type
//! - [`DeviceIdentity`] - Result of a successful commissioning
//! - [`Brightness`] - Brightness level (0-100%)
//! - [`ColorTemperature`] - Color temperature (0-100 standard scale)
//! - [`HsvColor`] - Hue 0-360 and saturation 0-100
//! - [`FanMode`] / [`FanSpeed`] - Fan control

mod color;
mod device_type;
mod fan;
mod identity;
mod level;
mod node_id;

pub use color::{ColorTemperature, HsvColor};
pub use device_type::DeviceType;
pub use fan::FanMode;
pub use identity::DeviceIdentity;
pub use level::{Brightness, FanSpeed};
pub use node_id::NodeId;
