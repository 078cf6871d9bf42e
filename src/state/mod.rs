// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized device state.
//!
//! [`StateValue`] is a typed attribute value and [`DeviceStateSnapshot`]
//! is the set of values read or reported for one device at one moment.
//!
//! # Examples
//!
//! ```
//! use matter_link::state::{DeviceStateSnapshot, StateValue};
//! use matter_link::types::DeviceType;
//!
//! let mut snapshot = DeviceStateSnapshot::online(DeviceType::OnOffLight, true);
//! snapshot.apply(StateValue::Switch(true));
//!
//! assert_eq!(snapshot.switch(), Some(true));
//! ```

mod snapshot;
mod value;

pub use snapshot::DeviceStateSnapshot;
pub use value::StateValue;
