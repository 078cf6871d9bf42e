// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device and device state bookkeeping.

use tokio_stream::wrappers::WatchStream;

use super::records::{DeviceRecord, DeviceStateRecord, DeviceStates, Devices};
use super::Store;
use crate::error::{CommissioningError, CommissioningErrorCode, Error, Result};
use crate::state::DeviceStateSnapshot;
use crate::types::{DeviceIdentity, DeviceType, NodeId};

/// Keeps the device list and the device state list.
#[derive(Debug)]
pub struct DeviceRegistry<D, S> {
    devices: D,
    states: S,
}

impl<D, S> DeviceRegistry<D, S>
where
    D: Store<Devices>,
    S: Store<DeviceStates>,
{
    /// Creates a registry over the two stores.
    pub fn new(devices: D, states: S) -> Self {
        Self { devices, states }
    }

    // ========================================================================
    // Devices
    // ========================================================================

    /// Records a commissioned device with an offline initial state.
    ///
    /// # Errors
    ///
    /// Returns `Error::Commissioning` with `AddDeviceFailed` if either
    /// store rejects the write. The device stays commissioned on its
    /// fabric.
    pub async fn add_device(&self, identity: &DeviceIdentity, name: &str) -> Result<DeviceRecord> {
        let record = DeviceRecord::from_identity(identity, name);
        tracing::debug!(device_id = %identity.device_id, name, "Adding device");

        let stored = record.clone();
        let written = self
            .devices
            .update(move |devices| devices.devices.push(stored))
            .await;
        let written = match written {
            Ok(()) => {
                let state = DeviceStateRecord::new(identity.device_id, false);
                self.states
                    .update(move |states| states.states.push(state))
                    .await
            }
            Err(e) => Err(e),
        };

        written.map_err(|e| {
            tracing::warn!(device_id = %identity.device_id, error = %e, "Failed to add device");
            Error::from(CommissioningError::new(
                CommissioningErrorCode::AddDeviceFailed,
                format!("Failed to add device {}: {e}", identity.device_id),
            ))
        })?;
        Ok(record)
    }

    /// Every recorded device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the device list cannot be loaded.
    pub async fn devices(&self) -> Result<Vec<DeviceRecord>> {
        Ok(self.devices.get().await?.devices)
    }

    /// One recorded device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the device list cannot be loaded.
    pub async fn device(&self, device_id: NodeId) -> Result<Option<DeviceRecord>> {
        Ok(self.devices.get().await?.find(device_id).cloned())
    }

    /// Renames a device. Returns `false` if the device is unknown.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the device list cannot be saved.
    pub async fn rename_device(&self, device_id: NodeId, name: &str) -> Result<bool> {
        let name = name.to_string();
        self.modify_device(device_id, move |record| record.name = name)
            .await
    }

    /// Changes a device's type. Returns `false` if the device is unknown.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the device list cannot be saved.
    pub async fn update_device_type(&self, device_id: NodeId, device_type: DeviceType) -> Result<bool> {
        self.modify_device(device_id, move |record| record.device_type = device_type)
            .await
    }

    /// Moves a device to a room. Returns `false` if the device is unknown.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the device list cannot be saved.
    pub async fn update_device_room(&self, device_id: NodeId, room: Option<String>) -> Result<bool> {
        self.modify_device(device_id, move |record| record.room = room)
            .await
    }

    /// Forgets a device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the device is unknown or the list cannot
    /// be saved.
    pub async fn remove_device(&self, device_id: NodeId) -> Result<()> {
        if self.devices.get().await?.find(device_id).is_none() {
            return Err(Error::Store(format!("Device not found: {device_id}")));
        }
        tracing::debug!(%device_id, "Removing device");
        self.devices
            .update(move |devices| devices.devices.retain(|d| d.device_id != device_id))
            .await
    }

    /// Device list followed by every change.
    #[must_use]
    pub fn device_changes(&self) -> WatchStream<Devices> {
        self.devices.changes()
    }

    async fn modify_device<F>(&self, device_id: NodeId, modify: F) -> Result<bool>
    where
        F: FnOnce(&mut DeviceRecord) + Send,
    {
        if self.devices.get().await?.find(device_id).is_none() {
            tracing::warn!(%device_id, "Cannot update unknown device");
            return Ok(false);
        }
        self.devices
            .update(move |devices| {
                if let Some(record) = devices.find_mut(device_id) {
                    modify(record);
                }
            })
            .await?;
        Ok(true)
    }

    // ========================================================================
    // Device states
    // ========================================================================

    /// Every recorded device state.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the state list cannot be loaded.
    pub async fn device_states(&self) -> Result<Vec<DeviceStateRecord>> {
        Ok(self.states.get().await?.states)
    }

    /// One device's recorded state.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the state list cannot be loaded.
    pub async fn device_state(&self, device_id: NodeId) -> Result<Option<DeviceStateRecord>> {
        Ok(self.states.get().await?.find(device_id).cloned())
    }

    /// Merges a snapshot into the device's recorded state.
    ///
    /// A device without a recorded state gets a new one carrying only the
    /// snapshot's online flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the state list cannot be saved.
    pub async fn merge_state(&self, device_id: NodeId, snapshot: &DeviceStateSnapshot) -> Result<()> {
        let snapshot = snapshot.clone();
        self.states
            .update(move |states| {
                match states.states.iter_mut().find(|s| s.device_id == device_id) {
                    Some(record) => record.merge(&snapshot),
                    None => {
                        tracing::warn!(%device_id, "No recorded state, adding one");
                        let online = snapshot.is_online().unwrap_or(false);
                        states.states.push(DeviceStateRecord::new(device_id, online));
                    }
                }
            })
            .await
    }

    /// Forgets a device's state.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if no state is recorded for the device or the
    /// list cannot be saved.
    pub async fn remove_state(&self, device_id: NodeId) -> Result<()> {
        if self.states.get().await?.find(device_id).is_none() {
            return Err(Error::Store(format!("Device not found: {device_id}")));
        }
        self.states
            .update(move |states| states.states.retain(|s| s.device_id != device_id))
            .await
    }

    /// State list followed by every change.
    #[must_use]
    pub fn state_changes(&self) -> WatchStream<DeviceStates> {
        self.states.changes()
    }
}
