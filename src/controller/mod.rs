// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seam to the native Matter device controller.
//!
//! The native CHIP stack is callback driven. Implementations of
//! [`DeviceController`] bridge it to this crate in two ways:
//!
//! - Single request/response calls (reads, writes, handle resolution)
//!   are async methods whose future completes when the native callback
//!   fires.
//! - Streams of callbacks (subscription reports, commissioning
//!   completion, attestation failures) are delivered into `mpsc` senders
//!   handed to the controller.
//!
//! One controller instance is shared by every engine in the process.
//! It is created by the host application and passed in explicitly; see
//! [`MatterClient`](crate::MatterClient).

mod data;
mod events;

pub use data::{
    AttributeData, AttributeId, AttributePath, AttributePathPattern, ClusterId, CommandId,
    CommandPath, EndpointId,
};
pub use events::{
    AttestationReport, CommissioningReport, DeviceHandle, DiscoveredNode, NodeReport,
    PairingWindowCodes, SubscriptionEvent, WiFiCredentials,
};

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::ControllerError;
use crate::types::NodeId;

/// Native Matter device controller.
///
/// Async methods return `Send` futures so engines holding the controller
/// in an `Arc` can drive them from spawned tasks.
pub trait DeviceController: Send + Sync + 'static {
    // ========================================================================
    // Device sessions
    // ========================================================================

    /// Resolves a live session with a commissioned node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be reached within `timeout`.
    fn connected_device(
        &self,
        node_id: NodeId,
        timeout: Duration,
    ) -> impl Future<Output = Result<DeviceHandle, ControllerError>> + Send;

    /// Releases a handle obtained from [`connected_device`](Self::connected_device).
    fn release_device(&self, handle: DeviceHandle);

    // ========================================================================
    // Interaction model
    // ========================================================================

    /// Reads one attribute.
    ///
    /// # Errors
    ///
    /// Returns the native failure.
    fn read_attribute(
        &self,
        handle: DeviceHandle,
        path: AttributePath,
    ) -> impl Future<Output = Result<AttributeData, ControllerError>> + Send;

    /// Writes one attribute.
    ///
    /// # Errors
    ///
    /// Returns the native failure.
    fn write_attribute(
        &self,
        handle: DeviceHandle,
        path: AttributePath,
        value: AttributeData,
    ) -> impl Future<Output = Result<(), ControllerError>> + Send;

    /// Invokes a cluster command.
    ///
    /// `timed` requests a timed invoke with the given window.
    ///
    /// # Errors
    ///
    /// Returns the native failure.
    fn invoke_command(
        &self,
        handle: DeviceHandle,
        path: CommandPath,
        fields: AttributeData,
        timed: Option<Duration>,
    ) -> impl Future<Output = Result<(), ControllerError>> + Send;

    /// Subscribes to attribute changes.
    ///
    /// The future resolves once the request has been sent. The device's
    /// answer and every later report arrive through `sink`.
    ///
    /// # Errors
    ///
    /// Returns the native failure if the request could not be sent.
    fn subscribe(
        &self,
        handle: DeviceHandle,
        paths: Vec<AttributePathPattern>,
        min_interval: Duration,
        max_interval: Duration,
        sink: mpsc::UnboundedSender<SubscriptionEvent>,
    ) -> impl Future<Output = Result<(), ControllerError>> + Send;

    /// Shuts down subscriptions to a node on a fabric.
    ///
    /// With `subscription_id` only that subscription is shut down.
    fn shutdown_subscriptions(
        &self,
        fabric_index: u8,
        node_id: NodeId,
        subscription_id: Option<u64>,
    );

    /// Shuts down every subscription this controller holds.
    fn shutdown_all_subscriptions(&self);

    // ========================================================================
    // Commissioning
    // ========================================================================

    /// Starts network discovery of commissionable nodes.
    ///
    /// # Errors
    ///
    /// Returns the native failure.
    fn discover_commissionable_nodes(&self) -> Result<(), ControllerError>;

    /// Returns the discovered node at `index`, if any.
    fn discovered_device(&self, index: usize) -> Option<DiscoveredNode>;

    /// Installs the listener for pairing and commissioning completion.
    ///
    /// Replaces any previous listener.
    fn set_completion_listener(&self, listener: mpsc::UnboundedSender<CommissioningReport>);

    /// Installs the device attestation delegate.
    ///
    /// While installed, attestation failures are sent to `delegate` and
    /// commissioning pauses until
    /// [`continue_commissioning`](Self::continue_commissioning) is called.
    fn set_attestation_delegate(
        &self,
        fail_safe: Duration,
        delegate: mpsc::UnboundedSender<AttestationReport>,
    );

    /// Starts pairing over an established BLE connection.
    ///
    /// Completion is reported to the completion listener.
    ///
    /// # Errors
    ///
    /// Returns the native failure if pairing could not be started.
    fn pair_device_ble(
        &self,
        node_id: NodeId,
        connection_id: u32,
        setup_pin_code: u32,
        credentials: &WiFiCredentials,
    ) -> Result<(), ControllerError>;

    /// Starts pairing with a device already on the IP network.
    ///
    /// Completion is reported to the completion listener.
    ///
    /// # Errors
    ///
    /// Returns the native failure if pairing could not be started.
    fn pair_device_with_address(
        &self,
        node_id: NodeId,
        address: SocketAddr,
        discriminator: u16,
        setup_pin_code: u32,
    ) -> Result<(), ControllerError>;

    /// Resumes commissioning after an attestation failure.
    fn continue_commissioning(&self, device_ptr: u64, ignore_attestation_failure: bool);

    /// Opens an enhanced commissioning window on a commissioned device.
    ///
    /// # Errors
    ///
    /// Returns the native failure.
    fn open_pairing_window(
        &self,
        handle: DeviceHandle,
        duration: Duration,
        iterations: u32,
        discriminator: u16,
        setup_pin_code: u32,
    ) -> impl Future<Output = Result<PairingWindowCodes, ControllerError>> + Send;

    /// Removes a node from this controller's fabric.
    ///
    /// # Errors
    ///
    /// Returns the native failure.
    fn unpair_device(
        &self,
        node_id: NodeId,
    ) -> impl Future<Output = Result<(), ControllerError>> + Send;

    /// Releases native commissioning resources.
    ///
    /// Called at the end of every commissioning session. The controller
    /// must stay usable for later sessions and device operations.
    fn close(&self);
}
