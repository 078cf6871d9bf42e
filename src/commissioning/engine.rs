// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The commissioning state machine.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::AbortHandle;

use super::{CommissioningEvent, CommissioningEvents, CommissioningState, SessionId};
use crate::cluster::ClusterAccessor;
use crate::config::ClientConfig;
use crate::controller::{
    AttestationReport, CommissioningReport, DeviceController, DiscoveredNode, WiFiCredentials,
};
use crate::error::{
    CommissioningError,
    CommissioningErrorCode::{
        AttestationFailed, DeviceNotFound, IncorrectState, InvalidDeviceIdentifier,
        InvalidOnboardingPayload, PairingFailed, TypeIntrospectionFailed, Unknown,
    },
    ControllerError, Error, Result,
};
use crate::payload::{DiscoveryCapabilities, OnboardingPayload};
use crate::transport::{
    BleAdapter, BleConnection, BlePeripheral, BleTransport, DiscoveryFilter, DiscoveryMode,
    Transport, UdpTransport,
};
use crate::types::{DeviceIdentity, DeviceType, NodeId};

const BLE_NOT_FOUND: &str = "Ble manager failed to find device";
const NODE_NOT_FOUND: &str = "Failed to discover device node";
const INTROSPECTION_FAILED: &str = "Failed to introspect device type";

/// Drives one commissioning session at a time.
///
/// Cloning is cheap; clones share the same session slot.
pub struct CommissioningEngine<C: DeviceController, B: BleAdapter> {
    inner: Arc<Inner<C, B>>,
}

impl<C: DeviceController, B: BleAdapter> Clone for CommissioningEngine<C, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: DeviceController, B: BleAdapter> fmt::Debug for CommissioningEngine<C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommissioningEngine")
            .field("state", &*self.inner.state.borrow())
            .field("active_device", &self.active_device())
            .finish_non_exhaustive()
    }
}

struct Inner<C: DeviceController, B: BleAdapter> {
    controller: Arc<C>,
    clusters: ClusterAccessor<C>,
    ble: BleTransport<B>,
    udp: UdpTransport<C>,
    config: ClientConfig,
    current: Mutex<Option<ActiveSession>>,
    state: watch::Sender<CommissioningState>,
}

/// The single session slot.
struct ActiveSession {
    id: SessionId,
    device_id: NodeId,
    events: mpsc::UnboundedSender<CommissioningEvent>,
    credentials: Option<oneshot::Sender<WiFiCredentials>>,
    pending_attestation: Option<u64>,
    driver: Option<AbortHandle>,
}

/// What the driver task owns.
struct SessionContext {
    id: SessionId,
    device_id: NodeId,
    payload: OnboardingPayload,
    events: mpsc::UnboundedSender<CommissioningEvent>,
}

impl<C: DeviceController, B: BleAdapter> CommissioningEngine<C, B> {
    /// Creates an engine over the shared controller and BLE adapter.
    #[must_use]
    pub fn new(controller: Arc<C>, adapter: Arc<B>, config: ClientConfig) -> Self {
        let (state, _) = watch::channel(CommissioningState::Idle);
        Self {
            inner: Arc::new(Inner {
                clusters: ClusterAccessor::new(Arc::clone(&controller), config.clone()),
                ble: BleTransport::new(adapter, &config),
                udp: UdpTransport::new(Arc::clone(&controller), &config),
                controller,
                config,
                current: Mutex::new(None),
                state,
            }),
        }
    }

    /// Starts commissioning the device described by `payload` under a
    /// freshly generated device id.
    ///
    /// Any session in flight is finished first. Must be called from
    /// within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOnboardingPayload` if `payload` does not parse.
    pub fn start_commissioning(&self, payload: &str) -> Result<CommissioningEvents> {
        self.start(NodeId::generate(), payload)
    }

    /// Starts commissioning under a caller supplied device id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDeviceIdentifier` for a zero id and
    /// `InvalidOnboardingPayload` if `payload` does not parse.
    pub fn start_commissioning_with_id(
        &self,
        device_id: u64,
        payload: &str,
    ) -> Result<CommissioningEvents> {
        let Some(device_id) = NodeId::new(device_id) else {
            return Err(CommissioningError::new(
                InvalidDeviceIdentifier,
                "Device id must be nonzero",
            )
            .into());
        };
        self.start(device_id, payload)
    }

    fn start(&self, device_id: NodeId, text: &str) -> Result<CommissioningEvents> {
        self.inner.finish_current();

        let payload = match OnboardingPayload::parse(text) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected onboarding payload");
                self.inner.state.send_replace(CommissioningState::Failed);
                return Err(CommissioningError::new(InvalidOnboardingPayload, e.to_string()).into());
            }
        };

        let id = SessionId::new();
        let (events, receiver) = mpsc::unbounded_channel();
        *self.inner.current.lock() = Some(ActiveSession {
            id,
            device_id,
            events: events.clone(),
            credentials: None,
            pending_attestation: None,
            driver: None,
        });

        let ctx = SessionContext {
            id,
            device_id,
            payload,
            events,
        };
        tracing::info!(
            session = %id,
            %device_id,
            discriminator = ctx.payload.discriminator,
            capabilities = ?ctx.payload.discovery_capabilities,
            "Commissioning started"
        );
        self.inner.transition(&ctx, CommissioningState::PayloadParsed);

        let driver = tokio::spawn(Arc::clone(&self.inner).run(ctx));
        let abort = driver.abort_handle();
        if self
            .inner
            .with_session(id, |session| session.driver = Some(abort))
            .is_none()
        {
            driver.abort();
        }

        Ok(CommissioningEvents::new(id, device_id, receiver))
    }

    /// Supplies Wi-Fi credentials to a session parked in
    /// [`CommissioningState::AwaitingWiFiCredentials`].
    ///
    /// A `device_id` that does not match the active session fails that
    /// session with `PairingFailed`.
    ///
    /// # Errors
    ///
    /// Returns `PairingFailed` on a device id mismatch and
    /// `IncorrectState` if no session is waiting for credentials.
    pub fn continue_commissioning(
        &self,
        device_id: NodeId,
        credentials: WiFiCredentials,
    ) -> Result<()> {
        let mut slot = self.inner.current.lock();
        let Some(session) = slot.as_mut() else {
            return Err(incorrect_state("No commissioning session is active"));
        };

        if session.device_id != device_id {
            let id = session.id;
            drop(slot);
            let error = CommissioningError::new(
                PairingFailed,
                format!("Device {device_id} does not match the active commissioning session"),
            );
            self.inner.finish(id, Some(error.clone()), true);
            return Err(error.into());
        }

        let Some(sender) = session.credentials.take() else {
            return Err(incorrect_state(
                "Commissioning session is not waiting for WiFi credentials",
            ));
        };
        drop(slot);

        sender.send(credentials).map_err(|_| Error::ChannelClosed)
    }

    /// Resumes a session paused on an attestation failure.
    ///
    /// Only used when attestation failures block; otherwise they are
    /// ignored automatically. Passing `ignore_failure = false` aborts the
    /// session with `AttestationFailed`.
    ///
    /// # Errors
    ///
    /// Returns `IncorrectState` if no attestation failure is pending for
    /// `device_ptr`.
    pub fn continue_after_attestation(&self, device_ptr: u64, ignore_failure: bool) -> Result<()> {
        let id = {
            let mut slot = self.inner.current.lock();
            match slot.as_mut() {
                Some(session) if session.pending_attestation == Some(device_ptr) => {
                    session.pending_attestation = None;
                    session.id
                }
                _ => {
                    return Err(incorrect_state(
                        "No attestation failure is pending for this device",
                    ));
                }
            }
        };

        self.inner
            .controller
            .continue_commissioning(device_ptr, ignore_failure);

        if ignore_failure {
            tracing::warn!(session = %id, "Continuing commissioning despite attestation failure");
        } else {
            self.inner.finish(
                id,
                Some(CommissioningError::new(
                    AttestationFailed,
                    "Device attestation failed",
                )),
                true,
            );
        }
        Ok(())
    }

    /// Finishes the active session, if any, without reporting a result.
    ///
    /// Returns whether a session was active.
    pub fn cancel(&self) -> bool {
        self.inner.finish_current()
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> CommissioningState {
        *self.inner.state.borrow()
    }

    /// Watches the session state.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<CommissioningState> {
        self.inner.state.subscribe()
    }

    /// Device id of the active session.
    #[must_use]
    pub fn active_device(&self) -> Option<NodeId> {
        self.inner.current.lock().as_ref().map(|s| s.device_id)
    }

    /// Removes a commissioned device from this controller's fabric.
    ///
    /// # Errors
    ///
    /// Returns `Error::OperationFailed` if unpairing fails or times out.
    pub async fn decommission(&self, device_id: NodeId) -> Result<()> {
        let unpair = self.inner.controller.unpair_device(device_id);
        match tokio::time::timeout(self.inner.config.admin_command_timeout, unpair).await {
            Ok(Ok(())) => {
                tracing::info!(%device_id, "Device decommissioned");
                Ok(())
            }
            Ok(Err(cause)) => Err(Error::OperationFailed {
                operation: "unpair device",
                cause,
            }),
            Err(_) => Err(Error::OperationFailed {
                operation: "unpair device",
                cause: ControllerError::Timeout,
            }),
        }
    }
}

fn incorrect_state(message: &str) -> Error {
    CommissioningError::new(IncorrectState, message).into()
}

impl<C: DeviceController, B: BleAdapter> Inner<C, B> {
    fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut ActiveSession) -> R) -> Option<R> {
        let mut slot = self.current.lock();
        slot.as_mut().filter(|s| s.id == id).map(f)
    }

    fn transition(&self, ctx: &SessionContext, state: CommissioningState) {
        tracing::debug!(session = %ctx.id, device_id = %ctx.device_id, ?state, "Commissioning state changed");
        self.state.send_replace(state);
        let _ = ctx.events.send(CommissioningEvent::StateChanged(state));
    }

    fn finish_current(&self) -> bool {
        let Some(id) = self.current.lock().as_ref().map(|s| s.id) else {
            return false;
        };
        let finished = self.finish(id, None, true);
        if finished {
            self.state.send_replace(CommissioningState::Idle);
        }
        finished
    }

    /// Clears the slot and releases native resources.
    ///
    /// Does nothing unless `id` is still the active session, so each
    /// session is finished exactly once.
    fn finish(&self, id: SessionId, failure: Option<CommissioningError>, abort_driver: bool) -> bool {
        let session = {
            let mut slot = self.current.lock();
            if slot.as_ref().is_some_and(|s| s.id == id) {
                slot.take()
            } else {
                None
            }
        };
        let Some(session) = session else {
            return false;
        };

        if abort_driver && let Some(driver) = &session.driver {
            driver.abort();
        }

        if let Some(error) = failure {
            tracing::warn!(
                session = %id,
                device_id = %session.device_id,
                code = %error.code,
                message = %error.message,
                "Commissioning failed"
            );
            self.state.send_replace(CommissioningState::Failed);
            let _ = session
                .events
                .send(CommissioningEvent::StateChanged(CommissioningState::Failed));
            let _ = session.events.send(CommissioningEvent::Failed(error));
        }

        self.controller.close();
        self.ble.adapter().close();
        tracing::debug!(session = %id, device_id = %session.device_id, "Commissioning session finished");
        true
    }

    async fn run(self: Arc<Self>, ctx: SessionContext) {
        match self.drive(&ctx).await {
            Ok(identity) => {
                tracing::info!(
                    session = %ctx.id,
                    device_id = %identity.device_id,
                    device_type = %identity.device_type,
                    vendor_id = identity.vendor_id,
                    product_id = identity.product_id,
                    "Commissioning succeeded"
                );
                self.transition(&ctx, CommissioningState::Succeeded);
                let _ = ctx.events.send(CommissioningEvent::Succeeded(identity));
                self.finish(ctx.id, None, false);
            }
            Err(error) => {
                self.finish(ctx.id, Some(error), false);
            }
        }
    }

    async fn drive(&self, ctx: &SessionContext) -> std::result::Result<DeviceIdentity, CommissioningError> {
        self.transition(ctx, CommissioningState::TransportSelection);
        let capabilities = ctx.payload.discovery_capabilities;

        if capabilities.contains(DiscoveryCapabilities::ON_NETWORK) {
            let node = self
                .find_on_network(ctx, DiscoveryMode::Strict)
                .await
                .ok_or_else(|| CommissioningError::new(DeviceNotFound, NODE_NOT_FOUND))?;
            self.pair_on_network(ctx, node).await?;
        } else if capabilities.contains(DiscoveryCapabilities::BLE) {
            let credentials = self.request_credentials(ctx).await?;
            let peripheral = self
                .find_over_ble(ctx)
                .await
                .ok_or_else(|| CommissioningError::new(DeviceNotFound, BLE_NOT_FOUND))?;
            let connection = self.connect_ble(peripheral).await?;
            self.pair_over_ble(ctx, connection, &credentials).await?;
        } else if let Some(peripheral) = self.find_over_ble(ctx).await {
            let connection = self.connect_ble(peripheral).await?;
            match self.request_credentials(ctx).await {
                Ok(credentials) => self.pair_over_ble(ctx, connection, &credentials).await?,
                Err(e) => {
                    self.ble.disconnect(connection);
                    return Err(e);
                }
            }
        } else if let Some(node) = self.find_on_network(ctx, DiscoveryMode::Lenient).await {
            tracing::info!(session = %ctx.id, "No BLE device found, pairing over the network");
            self.pair_on_network(ctx, node).await?;
        } else {
            tracing::info!(session = %ctx.id, "No network node found, retrying over BLE");
            let credentials = self.request_credentials(ctx).await?;
            let peripheral = self
                .find_over_ble(ctx)
                .await
                .ok_or_else(|| CommissioningError::new(DeviceNotFound, BLE_NOT_FOUND))?;
            let connection = self.connect_ble(peripheral).await?;
            self.pair_over_ble(ctx, connection, &credentials).await?;
        }

        self.introspect(ctx).await
    }

    // ========================================================================
    // Transports
    // ========================================================================

    async fn find_over_ble(&self, ctx: &SessionContext) -> Option<BlePeripheral> {
        let filter = DiscoveryFilter::from_payload(&ctx.payload, DiscoveryMode::Strict);
        match self.ble.discover(&filter, self.config.ble_scan_timeout).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(session = %ctx.id, error = %e, "BLE scan could not start");
                None
            }
        }
    }

    async fn find_on_network(&self, ctx: &SessionContext, mode: DiscoveryMode) -> Option<DiscoveredNode> {
        let filter = DiscoveryFilter::from_payload(&ctx.payload, mode);
        match self.udp.discover(&filter, self.config.udp_grace_window).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(session = %ctx.id, error = %e, "Network discovery could not start");
                None
            }
        }
    }

    async fn connect_ble(
        &self,
        peripheral: BlePeripheral,
    ) -> std::result::Result<BleConnection, CommissioningError> {
        self.ble.connect(peripheral).await.map_err(|e| {
            CommissioningError::new(
                PairingFailed,
                format!("Failed to connect to the device over BLE: {e}"),
            )
        })
    }

    async fn pair_over_ble(
        &self,
        ctx: &SessionContext,
        connection: BleConnection,
        credentials: &WiFiCredentials,
    ) -> std::result::Result<(), CommissioningError> {
        let connection_id = connection.connection_id;
        let pin = ctx.payload.setup_pin_code;
        let result = self
            .pair(ctx, |controller| {
                controller.pair_device_ble(ctx.device_id, connection_id, pin, credentials)
            })
            .await;
        self.ble.disconnect(connection);
        result
    }

    async fn pair_on_network(
        &self,
        ctx: &SessionContext,
        node: DiscoveredNode,
    ) -> std::result::Result<(), CommissioningError> {
        let discriminator = node.discriminator;
        let address = self
            .udp
            .connect(node)
            .await
            .map_err(|_| CommissioningError::new(DeviceNotFound, NODE_NOT_FOUND))?;
        let pin = ctx.payload.setup_pin_code;
        tracing::debug!(session = %ctx.id, %address, discriminator, "Pairing by address");
        self.pair(ctx, |controller| {
            controller.pair_device_with_address(ctx.device_id, address, discriminator, pin)
        })
        .await
    }

    // ========================================================================
    // Pairing
    // ========================================================================

    async fn request_credentials(
        &self,
        ctx: &SessionContext,
    ) -> std::result::Result<WiFiCredentials, CommissioningError> {
        let (sender, receiver) = oneshot::channel();
        if self
            .with_session(ctx.id, |session| session.credentials = Some(sender))
            .is_none()
        {
            return Err(CommissioningError::new(
                IncorrectState,
                "Commissioning session is no longer active",
            ));
        }

        self.transition(ctx, CommissioningState::AwaitingWiFiCredentials);
        let _ = ctx.events.send(CommissioningEvent::WiFiCredentialsRequired {
            device_id: ctx.device_id,
        });

        let credentials = receiver.await.map_err(|_| {
            CommissioningError::new(PairingFailed, "WiFi credentials were not provided")
        })?;
        tracing::debug!(session = %ctx.id, ssid = %credentials.ssid, "WiFi credentials received");
        self.transition(ctx, CommissioningState::TransportSelection);
        Ok(credentials)
    }

    async fn pair<F>(&self, ctx: &SessionContext, start: F) -> std::result::Result<(), CommissioningError>
    where
        F: FnOnce(&C) -> std::result::Result<(), ControllerError>,
    {
        let (completion_sink, mut completion) = mpsc::unbounded_channel();
        let (attestation_sink, mut attestation) = mpsc::unbounded_channel();
        self.controller.set_completion_listener(completion_sink);
        self.controller
            .set_attestation_delegate(self.config.attestation_fail_safe, attestation_sink);
        self.transition(ctx, CommissioningState::Pairing);

        if let Err(e) = start(self.controller.as_ref()) {
            tracing::warn!(session = %ctx.id, error = %e, "Native pairing call failed");
            return Err(CommissioningError::new(Unknown, "Failed to pair the device."));
        }

        let deadline = tokio::time::sleep(self.config.pairing_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                report = completion.recv() => {
                    let Some(report) = report else {
                        return Err(CommissioningError::new(
                            Unknown,
                            "Controller stopped reporting commissioning progress",
                        ));
                    };
                    if let Some(outcome) = completion_outcome(ctx.device_id, report) {
                        return outcome;
                    }
                }
                Some(report) = attestation.recv() => self.on_attestation(ctx, report),
                () = &mut deadline => {
                    return Err(CommissioningError::new(
                        Unknown,
                        "Timed out waiting for the device to be commissioned",
                    ));
                }
            }
        }
    }

    fn on_attestation(&self, ctx: &SessionContext, report: AttestationReport) {
        if !self.config.block_on_attestation_failure {
            tracing::warn!(
                session = %ctx.id,
                error_code = report.error_code,
                "Device attestation failed, continuing commissioning"
            );
            self.controller
                .continue_commissioning(report.device_ptr, true);
            return;
        }

        let parked = self
            .with_session(ctx.id, |session| {
                session.pending_attestation = Some(report.device_ptr);
            })
            .is_some();
        if parked {
            tracing::warn!(
                session = %ctx.id,
                error_code = report.error_code,
                "Device attestation failed, waiting for the caller"
            );
            let _ = ctx.events.send(CommissioningEvent::AttestationFailure {
                device_ptr: report.device_ptr,
                error_code: report.error_code,
            });
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    async fn introspect(&self, ctx: &SessionContext) -> std::result::Result<DeviceIdentity, CommissioningError> {
        self.transition(ctx, CommissioningState::Introspecting);
        let device_id = ctx.device_id;

        let device_type = self.read_device_type(device_id).await.map_err(|e| {
            tracing::warn!(session = %ctx.id, error = %e, "Device type introspection failed");
            CommissioningError::new(TypeIntrospectionFailed, INTROSPECTION_FAILED)
        })?;

        let vendor_id = if ctx.payload.vendor_id == 0 {
            self.clusters.read_vendor_id(device_id).await.unwrap_or_else(|e| {
                tracing::warn!(session = %ctx.id, error = %e, "Could not read vendor id");
                0
            })
        } else {
            ctx.payload.vendor_id
        };
        let product_id = if ctx.payload.product_id == 0 {
            self.clusters.read_product_id(device_id).await.unwrap_or_else(|e| {
                tracing::warn!(session = %ctx.id, error = %e, "Could not read product id");
                0
            })
        } else {
            ctx.payload.product_id
        };

        Ok(DeviceIdentity {
            device_id,
            vendor_id,
            product_id,
            device_type,
        })
    }

    /// Reads the first device type of the first endpoint the root lists.
    async fn read_device_type(&self, device_id: NodeId) -> Result<DeviceType> {
        let parts = self.clusters.read_parts_list(device_id).await?;
        let endpoint = *parts
            .first()
            .ok_or_else(|| Error::IllegalState("device lists no endpoints".into()))?;

        let types = self.clusters.read_device_types(device_id, endpoint).await?;
        if types.len() > 1 {
            tracing::debug!(%device_id, endpoint, ?types, "Several device types reported, using the first");
        }
        types
            .first()
            .map(|&code| DeviceType::from(code))
            .ok_or_else(|| Error::IllegalState(format!("endpoint {endpoint} lists no device type")))
    }
}

/// Maps a completion report to the end of the pairing wait, if it is one.
fn completion_outcome(
    device_id: NodeId,
    report: CommissioningReport,
) -> Option<std::result::Result<(), CommissioningError>> {
    match report {
        CommissioningReport::PairingComplete { code: 0 } => {
            tracing::debug!(%device_id, "PASE session established");
            None
        }
        CommissioningReport::PairingComplete { code } => Some(Err(CommissioningError::new(
            PairingFailed,
            format!("Pairing completed with code: {code}"),
        ))),
        CommissioningReport::CommissioningComplete { node_id, .. } if node_id != device_id => {
            tracing::debug!(%device_id, stale = %node_id, "Ignoring completion for another node");
            None
        }
        CommissioningReport::CommissioningComplete { code: 0, .. } => Some(Ok(())),
        CommissioningReport::CommissioningComplete { code, .. } => Some(Err(
            CommissioningError::new(Unknown, format!("Commissioning failed with code: {code}")),
        )),
        CommissioningReport::Error(message) => Some(Err(CommissioningError::new(Unknown, message))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommissioningErrorCode;

    fn node(value: u64) -> NodeId {
        NodeId::new(value).unwrap()
    }

    #[test]
    fn pairing_complete_zero_keeps_waiting() {
        let outcome =
            completion_outcome(node(1), CommissioningReport::PairingComplete { code: 0 });
        assert!(outcome.is_none());
    }

    #[test]
    fn pairing_complete_nonzero_is_pairing_failed() {
        let err = completion_outcome(node(1), CommissioningReport::PairingComplete { code: 50 })
            .unwrap()
            .unwrap_err();
        assert_eq!(err.code, CommissioningErrorCode::PairingFailed);
        assert_eq!(err.message, "Pairing completed with code: 50");
    }

    #[test]
    fn commissioning_complete_for_other_node_is_ignored() {
        let report = CommissioningReport::CommissioningComplete {
            node_id: node(2),
            code: 0,
        };
        assert!(completion_outcome(node(1), report).is_none());
    }

    #[test]
    fn commissioning_complete_nonzero_is_unknown() {
        let report = CommissioningReport::CommissioningComplete {
            node_id: node(1),
            code: 3,
        };
        let err = completion_outcome(node(1), report).unwrap().unwrap_err();
        assert_eq!(err.code, CommissioningErrorCode::Unknown);
        assert_eq!(err.message, "Commissioning failed with code: 3");
    }

    #[test]
    fn commissioning_complete_zero_succeeds() {
        let report = CommissioningReport::CommissioningComplete {
            node_id: node(1),
            code: 0,
        };
        assert_eq!(completion_outcome(node(1), report), Some(Ok(())));
    }
}
