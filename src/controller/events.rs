// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Values the native controller hands back asynchronously.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use super::{AttributeData, AttributePath};
use crate::error::ControllerError;
use crate::types::NodeId;

/// Opaque reference to a live CASE session with a device.
///
/// Obtained from [`DeviceController::connected_device`](super::DeviceController::connected_device)
/// and only valid until released.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(u64);

impl DeviceHandle {
    /// Wraps a native device pointer.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the native device pointer.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceHandle({:#x})", self.0)
    }
}

/// Attribute values carried by one subscription report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeReport {
    /// Reported values by path.
    pub attributes: BTreeMap<AttributePath, AttributeData>,
}

impl NodeReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style.
    #[must_use]
    pub fn with(mut self, path: AttributePath, value: AttributeData) -> Self {
        self.attributes.insert(path, value);
        self
    }
}

/// Events delivered into a subscription sink.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    /// The device accepted the subscription.
    Established {
        /// Subscription id assigned by the device.
        subscription_id: u64,
    },
    /// Attribute values changed.
    Report(NodeReport),
    /// The native layer lost the subscription and will retry.
    Resubscribing {
        /// Why the subscription dropped.
        cause: String,
        /// Delay before the next attempt.
        next_attempt: Duration,
    },
    /// The subscription failed for good.
    Error(ControllerError),
}

/// Events from the native commissioning completion listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommissioningReport {
    /// PASE session setup finished.
    PairingComplete {
        /// Native status, 0 on success.
        code: i64,
    },
    /// Commissioning finished for a node.
    CommissioningComplete {
        /// Node the report refers to.
        node_id: NodeId,
        /// Native status, 0 on success.
        code: i64,
    },
    /// The native layer raised an error outside a status callback.
    Error(String),
}

/// A device attestation failure raised mid commissioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationReport {
    /// Native device pointer to pass back to `continue_commissioning`.
    pub device_ptr: u64,
    /// Native attestation error code.
    pub error_code: i64,
}

/// A commissionable node found by network discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredNode {
    /// Long discriminator the node advertises.
    pub discriminator: u16,
    /// Resolved IP addresses, preferred first.
    pub addresses: Vec<IpAddr>,
    /// Advertised port.
    pub port: u16,
    /// Vendor id, if advertised.
    pub vendor_id: Option<u16>,
    /// Product id, if advertised.
    pub product_id: Option<u16>,
}

/// Wi-Fi credentials sent to a device during BLE commissioning.
#[derive(Clone, PartialEq, Eq)]
pub struct WiFiCredentials {
    /// Network name.
    pub ssid: String,
    /// Network password.
    pub password: String,
}

impl WiFiCredentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for WiFiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WiFiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Codes returned when a pairing window is opened.
///
/// The native layer may omit either code; callers treat a missing code
/// as a malformed response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingWindowCodes {
    /// Manual pairing code.
    pub manual_code: Option<String>,
    /// QR code text.
    pub qr_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = WiFiCredentials::new("home", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("home"));
        assert!(!debug.contains("hunter2"));
    }
}
