// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state synchronization.
//!
//! [`DeviceStateSyncEngine`] combines two mechanisms per tracked device:
//!
//! - A native subscription on the control endpoint. Each report is
//!   translated into a [`DeviceStateSnapshot`](crate::state::DeviceStateSnapshot)
//!   holding only the attributes the device type supports.
//! - A shared liveness loop that pings every tracked device and reports
//!   `Online` transitions. Its interval grows with the number of tracked
//!   devices; see [`ping_interval`].
//!
//! ```text
//! Unsubscribed -> Subscribed (Online <-> Offline) -> Unsubscribed
//! ```
//!
//! Snapshots are delivered to a [`SubscriptionListener`]. An unbounded
//! `mpsc` sender of [`SyncEvent`]s, a [`SyncEventBus`] and an
//! [`FnListener`] closure all work as listeners.

mod engine;
mod listener;
mod liveness;
mod report;

pub use engine::DeviceStateSyncEngine;
pub use listener::{FnListener, SubscriptionListener, SyncEvent, SyncEventBus};
pub use liveness::{LivenessTransition, evaluate_ping, ping_interval};
pub use report::translate_report;
