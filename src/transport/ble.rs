// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BLE discovery and GATT link setup.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::{DiscoveryFilter, Transport};
use crate::config::ClientConfig;
use crate::error::{ControllerError, Error, Result};

/// Matter BLE service UUID (`0xFFF6`).
pub const MATTER_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000_FFF6_0000_1000_8000_0080_5F9B_34FB);

/// A BLE advertisement seen while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlePeripheral {
    /// Hardware address.
    pub address: String,
    /// Advertised local name.
    pub name: Option<String>,
    /// Service data advertised under the Matter service UUID.
    pub service_data: Vec<u8>,
}

/// Service data filter for the Matter advertisement.
///
/// The advertised data starts with an opcode byte followed by a
/// little-endian 16-bit value holding the version nibble and the 12-bit
/// discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDataFilter {
    /// Service UUID the data is advertised under.
    pub service_uuid: Uuid,
    /// Expected data.
    pub data: [u8; 3],
    /// Bits of `data` that must match.
    pub mask: [u8; 3],
}

impl ServiceDataFilter {
    /// Builds the filter for a discriminator.
    ///
    /// Short discriminators only constrain the upper byte.
    #[must_use]
    pub fn for_discriminator(filter: &DiscoveryFilter) -> Self {
        let value = (u16::from(filter.version & 0x0F) << 12) | filter.long_discriminator();
        let [lo, hi] = value.to_le_bytes();
        Self {
            service_uuid: MATTER_SERVICE_UUID,
            data: [0x00, lo, hi],
            mask: [0xFF, if filter.short { 0x00 } else { 0xFF }, 0xFF],
        }
    }

    /// Whether advertised service data passes the filter.
    #[must_use]
    pub fn matches(&self, service_data: &[u8]) -> bool {
        service_data.len() >= self.data.len()
            && self
                .data
                .iter()
                .zip(&self.mask)
                .zip(service_data)
                .all(|((want, mask), got)| want & mask == got & mask)
    }
}

/// Callbacks from a GATT connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattEvent {
    /// The link went up or down.
    ConnectionStateChanged {
        /// Whether the link is now up.
        connected: bool,
        /// Native status, 0 on success.
        status: i32,
    },
    /// Service discovery finished.
    ServicesDiscovered {
        /// Native status, 0 on success.
        status: i32,
    },
    /// MTU negotiation finished.
    MtuChanged {
        /// Negotiated MTU.
        mtu: u16,
        /// Native status, 0 on success.
        status: i32,
    },
}

/// An open GATT connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattSession {
    /// Adapter specific session id.
    pub id: u64,
    /// Address of the peripheral.
    pub address: String,
}

/// A GATT link handed to the native stack for pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BleConnection {
    /// The GATT session.
    pub session: GattSession,
    /// Connection id assigned by the native stack.
    pub connection_id: u32,
    /// Negotiated MTU.
    pub mtu: u16,
}

/// Host BLE adapter.
///
/// Calls start work and return immediately; results arrive through the
/// supplied senders.
pub trait BleAdapter: Send + Sync + 'static {
    /// Starts scanning, sending matching advertisements to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the adapter failure.
    fn start_scan(
        &self,
        filter: ServiceDataFilter,
        sink: mpsc::UnboundedSender<BlePeripheral>,
    ) -> std::result::Result<(), ControllerError>;

    /// Stops scanning.
    fn stop_scan(&self);

    /// Connects GATT, sending connection callbacks to `events`.
    ///
    /// # Errors
    ///
    /// Returns the adapter failure.
    fn connect_gatt(
        &self,
        peripheral: &BlePeripheral,
        events: mpsc::UnboundedSender<GattEvent>,
    ) -> std::result::Result<GattSession, ControllerError>;

    /// Starts service discovery.
    ///
    /// # Errors
    ///
    /// Returns the adapter failure.
    fn discover_services(&self, session: &GattSession) -> std::result::Result<(), ControllerError>;

    /// Starts MTU negotiation.
    ///
    /// # Errors
    ///
    /// Returns the adapter failure.
    fn request_mtu(&self, session: &GattSession, mtu: u16)
    -> std::result::Result<(), ControllerError>;

    /// Hands the session to the native stack, returning its connection id.
    ///
    /// # Errors
    ///
    /// Returns the adapter failure.
    fn register_connection(&self, session: &GattSession) -> std::result::Result<u32, ControllerError>;

    /// Closes a GATT session.
    fn disconnect(&self, session: GattSession);

    /// Releases adapter resources held for commissioning.
    fn close(&self);
}

/// BLE transport over a host adapter.
#[derive(Debug)]
pub struct BleTransport<B: BleAdapter> {
    adapter: Arc<B>,
    connect_timeout: Duration,
    mtu: u16,
}

impl<B: BleAdapter> BleTransport<B> {
    /// Creates a transport over `adapter`.
    #[must_use]
    pub fn new(adapter: Arc<B>, config: &ClientConfig) -> Self {
        Self {
            adapter,
            connect_timeout: config.ble_connect_timeout,
            mtu: config.ble_mtu,
        }
    }

    /// The underlying adapter.
    #[must_use]
    pub fn adapter(&self) -> &Arc<B> {
        &self.adapter
    }

    async fn establish(
        &self,
        session: &GattSession,
        events: &mut mpsc::UnboundedReceiver<GattEvent>,
    ) -> std::result::Result<BleConnection, ControllerError> {
        loop {
            match next_event(events).await? {
                GattEvent::ConnectionStateChanged {
                    connected: true,
                    status: 0,
                } => break,
                GattEvent::ConnectionStateChanged { status, .. } if status != 0 => {
                    return Err(ControllerError::Status(i64::from(status)));
                }
                GattEvent::ConnectionStateChanged { .. } => {
                    return Err(ControllerError::Disconnected);
                }
                other => tracing::trace!(?other, "Ignoring GATT event before connect"),
            }
        }
        tracing::debug!(address = %session.address, "GATT connected, discovering services");

        self.adapter.discover_services(session)?;
        loop {
            match next_event(events).await? {
                GattEvent::ServicesDiscovered { status: 0 } => break,
                GattEvent::ServicesDiscovered { status } => {
                    return Err(ControllerError::Status(i64::from(status)));
                }
                GattEvent::ConnectionStateChanged {
                    connected: false, ..
                } => return Err(ControllerError::Disconnected),
                other => tracing::trace!(?other, "Ignoring GATT event during discovery"),
            }
        }
        tracing::debug!(address = %session.address, mtu = self.mtu, "Services discovered, requesting MTU");

        self.adapter.request_mtu(session, self.mtu)?;
        let mtu = loop {
            match next_event(events).await? {
                GattEvent::MtuChanged { mtu, status: 0 } => break mtu,
                GattEvent::MtuChanged { status, .. } => {
                    return Err(ControllerError::Status(i64::from(status)));
                }
                GattEvent::ConnectionStateChanged {
                    connected: false, ..
                } => return Err(ControllerError::Disconnected),
                other => tracing::trace!(?other, "Ignoring GATT event during MTU negotiation"),
            }
        };

        let connection_id = self.adapter.register_connection(session)?;
        Ok(BleConnection {
            session: session.clone(),
            connection_id,
            mtu,
        })
    }
}

async fn next_event(
    events: &mut mpsc::UnboundedReceiver<GattEvent>,
) -> std::result::Result<GattEvent, ControllerError> {
    events.recv().await.ok_or(ControllerError::Disconnected)
}

impl<B: BleAdapter> Transport for BleTransport<B> {
    type Peer = BlePeripheral;
    type Connection = BleConnection;

    async fn discover(
        &self,
        filter: &DiscoveryFilter,
        timeout: Duration,
    ) -> Result<Option<BlePeripheral>> {
        let service_filter = ServiceDataFilter::for_discriminator(filter);
        let (sink, mut found) = mpsc::unbounded_channel();
        self.adapter.start_scan(service_filter, sink)?;
        tracing::debug!(
            discriminator = filter.discriminator,
            short = filter.short,
            ?timeout,
            "BLE scan started"
        );

        let scan = async {
            while let Some(peripheral) = found.recv().await {
                if service_filter.matches(&peripheral.service_data) {
                    return Some(peripheral);
                }
                tracing::trace!(address = %peripheral.address, "Skipping non-matching advertisement");
            }
            None
        };
        let result = tokio::time::timeout(timeout, scan).await.ok().flatten();
        self.adapter.stop_scan();

        match &result {
            Some(peripheral) => {
                tracing::debug!(address = %peripheral.address, "Found matching BLE device");
            }
            None => tracing::debug!("BLE scan found no matching device"),
        }
        Ok(result)
    }

    async fn connect(&self, peer: BlePeripheral) -> Result<BleConnection> {
        let (sink, mut events) = mpsc::unbounded_channel();
        let session = self.adapter.connect_gatt(&peer, sink).map_err(|e| {
            tracing::warn!(address = %peer.address, error = %e, "GATT connect failed");
            Error::Unreachable(peer.address.clone())
        })?;

        match tokio::time::timeout(self.connect_timeout, self.establish(&session, &mut events))
            .await
        {
            Ok(Ok(connection)) => {
                tracing::debug!(
                    address = %peer.address,
                    connection_id = connection.connection_id,
                    mtu = connection.mtu,
                    "BLE link ready"
                );
                Ok(connection)
            }
            Ok(Err(e)) => {
                tracing::warn!(address = %peer.address, error = %e, "BLE link setup failed");
                self.adapter.disconnect(session);
                Err(Error::Unreachable(peer.address))
            }
            Err(_) => {
                tracing::warn!(address = %peer.address, "BLE link setup timed out");
                self.adapter.disconnect(session);
                Err(Error::Unreachable(peer.address))
            }
        }
    }

    fn disconnect(&self, connection: BleConnection) {
        self.adapter.disconnect(connection.session);
    }
}
