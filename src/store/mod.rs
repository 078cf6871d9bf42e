// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persistent application data.
//!
//! The host application owns persistence. This module defines the
//! [`Store`] seam it implements, the record types kept in it, and the
//! [`DeviceRegistry`] that keeps device and device state records in step
//! with commissioning and sync.
//!
//! [`MemoryStore`] keeps everything in memory and is enough for tests and
//! short-lived tools.
//!
//! # Examples
//!
//! ```ignore
//! let store = MemoryStore::new(Devices::default());
//! let registry = DeviceRegistry::new(store, MemoryStore::new(DeviceStates::default()));
//!
//! registry.add_device(&identity, "Kitchen light").await?;
//! registry.merge_state(identity.device_id, &snapshot).await?;
//! ```

mod memory;
mod records;
mod registry;

pub use memory::MemoryStore;
pub use records::{DeviceRecord, DeviceStateRecord, DeviceStates, Devices, UserAuth, UserProfile};
pub use registry::DeviceRegistry;

use std::future::Future;

use tokio_stream::wrappers::WatchStream;

use crate::error::Result;

/// A single persisted value with change notification.
pub trait Store<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Returns the current value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the value cannot be loaded.
    fn get(&self) -> impl Future<Output = Result<T>> + Send;

    /// Replaces the value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the value cannot be saved.
    fn set(&self, value: T) -> impl Future<Output = Result<()>> + Send;

    /// Modifies the value in place and saves it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the value cannot be loaded or saved.
    fn update<F>(&self, modify: F) -> impl Future<Output = Result<()>> + Send
    where
        F: FnOnce(&mut T) + Send;

    /// Yields the current value, then every saved change.
    ///
    /// Each call starts an independent stream.
    fn changes(&self) -> WatchStream<T>;
}
