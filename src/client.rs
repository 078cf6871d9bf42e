// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entry point tying the engines to one controller.

use std::sync::Arc;

use crate::cluster::ClusterAccessor;
use crate::commissioning::CommissioningEngine;
use crate::config::ClientConfig;
use crate::controller::DeviceController;
use crate::error::Result;
use crate::share::DeviceShareEngine;
use crate::sync::DeviceStateSyncEngine;
use crate::transport::BleAdapter;
use crate::types::NodeId;

/// Owns the native controller and BLE adapter and the engines using them.
///
/// The host application creates the controller and adapter once and
/// hands them in; every engine shares them. Engines are cheap handles and
/// can be cloned into tasks.
///
/// # Examples
///
/// ```ignore
/// use std::sync::Arc;
/// use matter_link::{ClientConfig, MatterClient};
///
/// let client = MatterClient::new(Arc::new(controller), Arc::new(adapter), ClientConfig::default());
///
/// let session = client.commissioning().start_commissioning("MT:Y.K9042C00KA0648G00")?;
/// let identity = session.outcome().await?;
///
/// client
///     .sync()
///     .subscribe(identity.device_id, identity.device_type, tx)
///     .await?;
///
/// client.shutdown();
/// ```
pub struct MatterClient<C: DeviceController, B: BleAdapter> {
    controller: Arc<C>,
    adapter: Arc<B>,
    config: ClientConfig,
    clusters: ClusterAccessor<C>,
    commissioning: CommissioningEngine<C, B>,
    sync: DeviceStateSyncEngine<C>,
    share: DeviceShareEngine<C>,
}

impl<C: DeviceController, B: BleAdapter> std::fmt::Debug for MatterClient<C, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatterClient")
            .field("config", &self.config)
            .field("commissioning", &self.commissioning)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

impl<C: DeviceController, B: BleAdapter> MatterClient<C, B> {
    /// Creates a client.
    #[must_use]
    pub fn new(controller: Arc<C>, adapter: Arc<B>, config: ClientConfig) -> Self {
        Self {
            clusters: ClusterAccessor::new(Arc::clone(&controller), config.clone()),
            commissioning: CommissioningEngine::new(
                Arc::clone(&controller),
                Arc::clone(&adapter),
                config.clone(),
            ),
            sync: DeviceStateSyncEngine::new(Arc::clone(&controller), config.clone()),
            share: DeviceShareEngine::new(Arc::clone(&controller), config.clone()),
            controller,
            adapter,
            config,
        }
    }

    /// Commissioning engine.
    #[must_use]
    pub fn commissioning(&self) -> &CommissioningEngine<C, B> {
        &self.commissioning
    }

    /// State sync engine.
    #[must_use]
    pub fn sync(&self) -> &DeviceStateSyncEngine<C> {
        &self.sync
    }

    /// Device sharing engine.
    #[must_use]
    pub fn share(&self) -> &DeviceShareEngine<C> {
        &self.share
    }

    /// Typed cluster operations.
    #[must_use]
    pub fn clusters(&self) -> &ClusterAccessor<C> {
        &self.clusters
    }

    /// The shared controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<C> {
        &self.controller
    }

    /// The shared BLE adapter.
    #[must_use]
    pub fn adapter(&self) -> &Arc<B> {
        &self.adapter
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Writes the device's node label.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn rename_device(&self, device_id: NodeId, name: &str) -> Result<()> {
        self.clusters.write_node_label(device_id, name).await
    }

    /// Reads the device's node label.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn device_name(&self, device_id: NodeId) -> Result<String> {
        self.clusters.read_node_label(device_id).await
    }

    /// Reads the device's persistent unique id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn device_unique_id(&self, device_id: NodeId) -> Result<String> {
        self.clusters.read_unique_id(device_id).await
    }

    /// Number of fabrics the device has joined.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn commissioned_fabrics(&self, device_id: NodeId) -> Result<u8> {
        self.clusters.read_commissioned_fabrics(device_id).await
    }

    /// Number of fabrics the device can join.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn supported_fabrics(&self, device_id: NodeId) -> Result<u8> {
        self.clusters.read_supported_fabrics(device_id).await
    }

    /// Stops tracking a device and removes it from this fabric.
    ///
    /// # Errors
    ///
    /// Returns `Error::OperationFailed` if unpairing fails. A failure to
    /// shut the subscription down is logged and does not stop unpairing.
    pub async fn decommission(&self, device_id: NodeId) -> Result<()> {
        if let Err(e) = self.sync.unsubscribe(device_id).await {
            tracing::warn!(%device_id, error = %e, "Failed to unsubscribe before decommissioning");
        }
        self.commissioning.decommission(device_id).await
    }

    /// Stops everything: commissioning, liveness polling and subscriptions.
    pub fn shutdown(&self) {
        self.commissioning.cancel();
        self.sync.unsubscribe_all();
        self.controller.close();
        tracing::info!("Matter client shut down");
    }
}
