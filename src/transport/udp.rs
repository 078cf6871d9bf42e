// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commissionable node discovery on the IP network.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use super::{DiscoveryFilter, DiscoveryMode, Transport};
use crate::config::ClientConfig;
use crate::controller::{DeviceController, DiscoveredNode};
use crate::error::{Error, Result};

/// UDP/mDNS transport backed by the controller's node discovery.
///
/// Discovery results are only read after the grace window passes, and
/// at most `max_discovered_nodes` entries are inspected.
#[derive(Debug)]
pub struct UdpTransport<C: DeviceController> {
    controller: Arc<C>,
    max_nodes: usize,
    port: u16,
}

impl<C: DeviceController> UdpTransport<C> {
    /// Creates a transport over `controller`.
    #[must_use]
    pub fn new(controller: Arc<C>, config: &ClientConfig) -> Self {
        Self {
            controller,
            max_nodes: config.max_discovered_nodes,
            port: config.commissioning_port,
        }
    }

    fn select(&self, filter: &DiscoveryFilter) -> Option<DiscoveredNode> {
        (0..self.max_nodes)
            .filter_map(|index| self.controller.discovered_device(index))
            .filter(|node| !node.addresses.is_empty())
            .find(|node| {
                let accepted = filter.matches(node.discriminator);
                if accepted && filter.mode == DiscoveryMode::Lenient {
                    tracing::debug!(
                        advertised = node.discriminator,
                        expected = filter.discriminator,
                        "Accepting first discovered node"
                    );
                }
                accepted
            })
    }
}

impl<C: DeviceController> Transport for UdpTransport<C> {
    type Peer = DiscoveredNode;
    type Connection = SocketAddr;

    async fn discover(
        &self,
        filter: &DiscoveryFilter,
        grace_window: Duration,
    ) -> Result<Option<DiscoveredNode>> {
        self.controller.discover_commissionable_nodes()?;
        tracing::debug!(
            discriminator = filter.discriminator,
            mode = ?filter.mode,
            ?grace_window,
            "Network discovery started"
        );
        tokio::time::sleep(grace_window).await;

        let node = self.select(filter);
        match &node {
            Some(node) => tracing::debug!(
                discriminator = node.discriminator,
                addresses = ?node.addresses,
                "Found commissionable node"
            ),
            None => tracing::debug!("No commissionable node matched"),
        }
        Ok(node)
    }

    async fn connect(&self, peer: DiscoveredNode) -> Result<SocketAddr> {
        peer.addresses
            .first()
            .map(|ip| SocketAddr::new(*ip, self.port))
            .ok_or_else(|| Error::Unreachable(format!("node {}", peer.discriminator)))
    }

    fn disconnect(&self, _connection: SocketAddr) {}
}
