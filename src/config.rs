// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timeouts and limits shared by the engines.
//!
//! Every field has a default, so a configuration document only needs to
//! name what it changes. Durations are written in milliseconds.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use matter_link::ClientConfig;
//!
//! let config = ClientConfig::default()
//!     .with_ping_timeout(Duration::from_millis(500))
//!     .with_block_on_attestation_failure(true);
//! assert_eq!(config.ble_mtu, 247);
//!
//! let config = ClientConfig::from_json_str(r#"{ "udp_grace_window": 3000 }"#).unwrap();
//! assert_eq!(config.udp_grace_window, Duration::from_secs(3));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::EndpointId;
use crate::error::Result;

/// Endpoint hosting the application clusters of supported devices.
pub const CONTROL_ENDPOINT: EndpointId = 1;

/// Root node endpoint.
pub const ROOT_ENDPOINT: EndpointId = 0;

/// IANA assigned Matter port.
pub const MATTER_PORT: u16 = 5540;

/// Configuration for a [`MatterClient`](crate::MatterClient) and its engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Time allowed to resolve a connected device handle.
    #[serde(with = "millis")]
    pub handle_timeout: Duration,
    /// Time allowed for a liveness ping.
    #[serde(with = "millis")]
    pub ping_timeout: Duration,
    /// Time allowed for one cluster read, write or invoke.
    #[serde(with = "millis")]
    pub operation_timeout: Duration,
    /// Timed invoke window for administrator commissioning commands.
    #[serde(with = "millis")]
    pub admin_command_timeout: Duration,
    /// How long a BLE scan waits for a matching advertisement.
    #[serde(with = "millis")]
    pub ble_scan_timeout: Duration,
    /// How long GATT connection, service discovery and MTU negotiation may take.
    #[serde(with = "millis")]
    pub ble_connect_timeout: Duration,
    /// MTU requested after GATT service discovery.
    pub ble_mtu: u16,
    /// Wait between starting network discovery and reading its results.
    #[serde(with = "millis")]
    pub udp_grace_window: Duration,
    /// Number of discovered nodes inspected after the grace window.
    pub max_discovered_nodes: usize,
    /// Port used when pairing by address.
    pub commissioning_port: u16,
    /// Fail-safe armed while attestation is being checked.
    #[serde(with = "millis")]
    pub attestation_fail_safe: Duration,
    /// Longest wait for the native layer to report pairing completion.
    #[serde(with = "millis")]
    pub pairing_timeout: Duration,
    /// Whether attestation failures pause commissioning for the caller.
    pub block_on_attestation_failure: bool,
    /// Default duration of a sharing commissioning window.
    #[serde(with = "millis")]
    pub share_window: Duration,
    /// PBKDF iterations for sharing commissioning windows.
    pub pin_iterations: u32,
    /// Minimum subscription report interval.
    #[serde(with = "millis")]
    pub min_report_interval: Duration,
    /// Maximum subscription report interval.
    #[serde(with = "millis")]
    pub max_report_interval: Duration,
    /// Consecutive failed pings after which a device counts as offline.
    pub max_device_pings: u32,
    /// Endpoint that subscriptions and control operations target.
    pub control_endpoint: EndpointId,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            handle_timeout: Duration::from_secs(15),
            ping_timeout: Duration::from_secs(1),
            operation_timeout: Duration::from_millis(1000),
            admin_command_timeout: Duration::from_secs(10),
            ble_scan_timeout: Duration::from_secs(10),
            ble_connect_timeout: Duration::from_secs(15),
            ble_mtu: 247,
            udp_grace_window: Duration::from_secs(7),
            max_discovered_nodes: 10,
            commissioning_port: MATTER_PORT,
            attestation_fail_safe: Duration::from_secs(600),
            pairing_timeout: Duration::from_secs(600),
            block_on_attestation_failure: false,
            share_window: Duration::from_secs(180),
            pin_iterations: 10_000,
            min_report_interval: Duration::from_secs(1),
            max_report_interval: Duration::from_secs(60),
            max_device_pings: 1,
            control_endpoint: CONTROL_ENDPOINT,
        }
    }
}

impl ClientConfig {
    /// Decodes a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the handle resolution timeout.
    #[must_use]
    pub fn with_handle_timeout(mut self, timeout: Duration) -> Self {
        self.handle_timeout = timeout;
        self
    }

    /// Sets the liveness ping timeout.
    #[must_use]
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Sets the cluster operation timeout.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Sets the BLE scan timeout.
    #[must_use]
    pub fn with_ble_scan_timeout(mut self, timeout: Duration) -> Self {
        self.ble_scan_timeout = timeout;
        self
    }

    /// Sets the UDP discovery grace window.
    #[must_use]
    pub fn with_udp_grace_window(mut self, window: Duration) -> Self {
        self.udp_grace_window = window;
        self
    }

    /// Sets the pairing completion timeout.
    #[must_use]
    pub fn with_pairing_timeout(mut self, timeout: Duration) -> Self {
        self.pairing_timeout = timeout;
        self
    }

    /// Makes attestation failures pause commissioning for the caller.
    #[must_use]
    pub fn with_block_on_attestation_failure(mut self, block: bool) -> Self {
        self.block_on_attestation_failure = block;
        self
    }

    /// Sets the offline threshold for liveness pings.
    #[must_use]
    pub fn with_max_device_pings(mut self, pings: u32) -> Self {
        self.max_device_pings = pings.max(1);
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timeouts() {
        let config = ClientConfig::default();
        assert_eq!(config.handle_timeout, Duration::from_secs(15));
        assert_eq!(config.ping_timeout, Duration::from_secs(1));
        assert_eq!(config.operation_timeout, Duration::from_secs(1));
        assert_eq!(config.ble_scan_timeout, Duration::from_secs(10));
        assert_eq!(config.udp_grace_window, Duration::from_secs(7));
        assert_eq!(config.share_window, Duration::from_secs(180));
        assert_eq!(config.attestation_fail_safe, Duration::from_secs(600));
        assert_eq!(config.max_discovered_nodes, 10);
        assert_eq!(config.commissioning_port, 5540);
        assert_eq!(config.max_device_pings, 1);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ClientConfig::from_json_str(r#"{ "ping_timeout": 250, "ble_mtu": 185 }"#).unwrap();
        assert_eq!(config.ping_timeout, Duration::from_millis(250));
        assert_eq!(config.ble_mtu, 185);
        assert_eq!(config.handle_timeout, Duration::from_secs(15));
    }

    #[test]
    fn json_round_trip() {
        let config = ClientConfig::default().with_block_on_attestation_failure(true);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ClientConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ClientConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn max_device_pings_is_at_least_one() {
        assert_eq!(ClientConfig::default().with_max_device_pings(0).max_device_pings, 1);
    }
}
