// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Receivers of device state updates.
//!
//! - [`SubscriptionListener`] - The trait the sync engine calls into
//! - [`SyncEvent`] - Owned form of each callback, for channels
//! - [`SyncEventBus`] - Broadcasts updates to any number of receivers
//! - [`FnListener`] - Wraps a closure as a listener

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::error::Error;
use crate::state::DeviceStateSnapshot;
use crate::types::NodeId;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Receives state updates for subscribed devices.
///
/// Called from engine tasks; implementations must not block.
pub trait SubscriptionListener: Send + Sync {
    /// A fresh snapshot was produced by a report or a liveness change.
    fn on_report(&self, device_id: NodeId, snapshot: DeviceStateSnapshot);

    /// The device accepted a subscription.
    fn on_subscription_established(&self, device_id: NodeId, subscription_id: u64) {
        let _ = (device_id, subscription_id);
    }

    /// A subscription could not be established or failed.
    fn on_error(&self, device_id: NodeId, error: &Error) {
        let _ = (device_id, error);
    }
}

/// Owned form of a listener callback.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A fresh snapshot.
    Report {
        /// Device the snapshot belongs to.
        device_id: NodeId,
        /// The snapshot.
        snapshot: DeviceStateSnapshot,
    },
    /// A subscription was established.
    SubscriptionEstablished {
        /// Subscribed device.
        device_id: NodeId,
        /// Subscription id assigned by the device.
        subscription_id: u64,
    },
    /// A subscription failed.
    Error {
        /// Affected device.
        device_id: NodeId,
        /// Failure description.
        message: String,
    },
}

impl SyncEvent {
    /// Device the event is about.
    #[must_use]
    pub fn device_id(&self) -> NodeId {
        match self {
            Self::Report { device_id, .. }
            | Self::SubscriptionEstablished { device_id, .. }
            | Self::Error { device_id, .. } => *device_id,
        }
    }
}

impl SubscriptionListener for mpsc::UnboundedSender<SyncEvent> {
    fn on_report(&self, device_id: NodeId, snapshot: DeviceStateSnapshot) {
        let _ = self.send(SyncEvent::Report {
            device_id,
            snapshot,
        });
    }

    fn on_subscription_established(&self, device_id: NodeId, subscription_id: u64) {
        let _ = self.send(SyncEvent::SubscriptionEstablished {
            device_id,
            subscription_id,
        });
    }

    fn on_error(&self, device_id: NodeId, error: &Error) {
        let _ = self.send(SyncEvent::Error {
            device_id,
            message: error.to_string(),
        });
    }
}

/// Broadcasts [`SyncEvent`]s to every receiver.
///
/// Slow receivers lose events once the channel is full.
#[derive(Debug, Clone)]
pub struct SyncEventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl SyncEventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receives events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event; dropped if nobody listens.
    pub fn publish(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for SyncEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionListener for SyncEventBus {
    fn on_report(&self, device_id: NodeId, snapshot: DeviceStateSnapshot) {
        self.publish(SyncEvent::Report {
            device_id,
            snapshot,
        });
    }

    fn on_subscription_established(&self, device_id: NodeId, subscription_id: u64) {
        self.publish(SyncEvent::SubscriptionEstablished {
            device_id,
            subscription_id,
        });
    }

    fn on_error(&self, device_id: NodeId, error: &Error) {
        self.publish(SyncEvent::Error {
            device_id,
            message: error.to_string(),
        });
    }
}

type ReportCallback = Arc<dyn Fn(NodeId, DeviceStateSnapshot) + Send + Sync>;

/// A listener that only cares about snapshots.
#[derive(Clone)]
pub struct FnListener {
    on_report: ReportCallback,
}

impl FnListener {
    /// Wraps `callback`.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(NodeId, DeviceStateSnapshot) + Send + Sync + 'static,
    {
        Self {
            on_report: Arc::new(callback),
        }
    }
}

impl std::fmt::Debug for FnListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}

impl SubscriptionListener for FnListener {
    fn on_report(&self, device_id: NodeId, snapshot: DeviceStateSnapshot) {
        (self.on_report)(device_id, snapshot);
    }
}
