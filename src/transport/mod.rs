// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Physical transports used while commissioning.
//!
//! A [`Transport`] finds an uncommissioned device and brings up whatever
//! link pairing needs:
//!
//! - [`BleTransport`] scans for a Matter BLE advertisement whose service
//!   data carries the discriminator, then connects GATT, discovers
//!   services and negotiates the MTU.
//! - [`UdpTransport`] triggers network discovery of commissionable nodes,
//!   waits a grace window and picks a node by discriminator, yielding an
//!   IP address to pair with.
//!
//! "Not found" is `Ok(None)`, not an error, so the commissioning engine
//! can fall back to the other transport.

mod ble;
mod udp;

pub use ble::{
    BleAdapter, BleConnection, BlePeripheral, BleTransport, GattEvent, GattSession,
    MATTER_SERVICE_UUID, ServiceDataFilter,
};
pub use udp::UdpTransport;

use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::payload::{MAX_DISCRIMINATOR, OnboardingPayload};

/// How strictly discovery matches the discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// Only a device advertising a matching discriminator is accepted.
    Strict,
    /// The first discovered device is accepted regardless of discriminator.
    Lenient,
}

/// What discovery looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryFilter {
    /// Discriminator, 4 bits when `short` is set and 12 bits otherwise.
    pub discriminator: u16,
    /// Whether `discriminator` is a short discriminator.
    pub short: bool,
    /// Payload version advertised next to the discriminator.
    pub version: u8,
    /// Matching strictness.
    pub mode: DiscoveryMode,
}

impl DiscoveryFilter {
    /// Builds a filter for the device described by `payload`.
    #[must_use]
    pub const fn from_payload(payload: &OnboardingPayload, mode: DiscoveryMode) -> Self {
        Self {
            discriminator: payload.discriminator,
            short: payload.has_short_discriminator,
            version: payload.version,
            mode,
        }
    }

    /// Whether an advertised 12-bit discriminator satisfies this filter.
    #[must_use]
    pub const fn matches(&self, advertised: u16) -> bool {
        match self.mode {
            DiscoveryMode::Lenient => true,
            DiscoveryMode::Strict if self.short => {
                (advertised >> 8) & 0x0F == self.discriminator & 0x0F
            }
            DiscoveryMode::Strict => {
                advertised & MAX_DISCRIMINATOR == self.discriminator & MAX_DISCRIMINATOR
            }
        }
    }

    /// The discriminator widened to 12 bits.
    #[must_use]
    pub const fn long_discriminator(&self) -> u16 {
        if self.short {
            (self.discriminator & 0x0F) << 8
        } else {
            self.discriminator & MAX_DISCRIMINATOR
        }
    }
}

/// A physical transport able to find and connect an uncommissioned device.
pub trait Transport: Send + Sync {
    /// A discovered device.
    type Peer: Send;
    /// A live link usable for pairing.
    type Connection: Send;

    /// Looks for a device matching `filter` for at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error only if discovery could not be started.
    fn discover(
        &self,
        filter: &DiscoveryFilter,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<Self::Peer>>> + Send;

    /// Brings up a link to a discovered device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` if the link cannot be established.
    fn connect(&self, peer: Self::Peer) -> impl Future<Output = Result<Self::Connection>> + Send;

    /// Tears down a link.
    fn disconnect(&self, connection: Self::Connection);
}
