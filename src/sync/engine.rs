// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live subscriptions and the liveness ping loop.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use super::listener::SubscriptionListener;
use super::liveness::{LivenessTransition, evaluate_ping, ping_interval};
use super::report::translate_report;
use crate::capabilities::{AttributeKey, is_attribute_supported, supported_attributes};
use crate::cluster::{ClusterAccessor, ConnectedDevice};
use crate::config::ClientConfig;
use crate::controller::{AttributePathPattern, DeviceController, SubscriptionEvent};
use crate::error::{Error, Result};
use crate::state::{DeviceStateSnapshot, StateValue};
use crate::types::{DeviceType, FanMode, NodeId};

/// Keeps subscribed devices' state flowing to their listeners.
///
/// Each subscribed device gets a native attribute subscription on the
/// control endpoint. A shared background loop pings every tracked device
/// and reports online/offline transitions between subscription reports.
///
/// Cloning is cheap; clones share the same tracked devices.
pub struct DeviceStateSyncEngine<C: DeviceController> {
    inner: Arc<SyncInner<C>>,
}

impl<C: DeviceController> Clone for DeviceStateSyncEngine<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: DeviceController> fmt::Debug for DeviceStateSyncEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceStateSyncEngine")
            .field("tracked", &self.tracked_devices())
            .finish_non_exhaustive()
    }
}

struct SyncInner<C: DeviceController> {
    controller: Arc<C>,
    clusters: ClusterAccessor<C>,
    config: ClientConfig,
    tasks: Mutex<HashMap<NodeId, SubscriptionTask<C>>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

struct SubscriptionTask<C: DeviceController> {
    device_type: DeviceType,
    listener: Arc<dyn SubscriptionListener>,
    consecutive_offline_pings: u32,
    active: Option<ActiveSubscription<C>>,
}

impl<C: DeviceController> SubscriptionTask<C> {
    fn stop(self) {
        if let Some(active) = self.active {
            active.forwarder.abort();
        }
    }

    /// Whether the device has no live native subscription.
    fn needs_subscription(&self) -> bool {
        self.active
            .as_ref()
            .is_none_or(|active| active.forwarder.is_finished())
    }
}

/// A native subscription and the handle it was made through.
///
/// The handle is released when the subscription is dropped.
struct ActiveSubscription<C: DeviceController> {
    device: ConnectedDevice<C>,
    forwarder: JoinHandle<()>,
    subscription_id: Option<u64>,
}

impl<C: DeviceController> DeviceStateSyncEngine<C> {
    /// Creates an engine over the shared controller.
    #[must_use]
    pub fn new(controller: Arc<C>, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                clusters: ClusterAccessor::new(Arc::clone(&controller), config.clone()),
                controller,
                config,
                tasks: Mutex::new(HashMap::new()),
                poller: Mutex::new(None),
            }),
        }
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Tracks a device and subscribes to its state.
    ///
    /// The ping loop is stopped while the device is registered and
    /// restarted with an interval for the new device count. A device that
    /// was already tracked is replaced and its old native subscription is
    /// shut down.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed` if the
    /// native subscription cannot be set up. The device stays tracked, so
    /// the ping loop re-subscribes once it answers.
    pub async fn subscribe<L>(&self, device_id: NodeId, device_type: DeviceType, listener: L) -> Result<()>
    where
        L: SubscriptionListener + 'static,
    {
        self.inner.stop_polling();
        let previous = self.inner.tasks.lock().insert(
            device_id,
            SubscriptionTask {
                device_type,
                listener: Arc::new(listener),
                consecutive_offline_pings: 0,
                active: None,
            },
        );
        self.inner.start_polling();

        if let Some(active) = previous.and_then(|task| task.active) {
            self.inner.retire(device_id, active).await;
        }

        tracing::debug!(%device_id, %device_type, "Subscribing to device state");
        self.inner.establish(device_id).await
    }

    /// Stops tracking a device and shuts down its subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the fabric index needed to shut the native
    /// subscription down cannot be read. The device is untracked anyway.
    pub async fn unsubscribe(&self, device_id: NodeId) -> Result<()> {
        self.unsubscribe_inner(device_id, None).await
    }

    /// Stops tracking a device and shuts down one of its subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the fabric index cannot be read.
    pub async fn unsubscribe_subscription(&self, device_id: NodeId, subscription_id: u64) -> Result<()> {
        self.unsubscribe_inner(device_id, Some(subscription_id))
            .await
    }

    async fn unsubscribe_inner(&self, device_id: NodeId, subscription_id: Option<u64>) -> Result<()> {
        self.inner.stop_polling();
        let removed = self.inner.tasks.lock().remove(&device_id);
        self.inner.start_polling();

        let Some(task) = removed else {
            return Ok(());
        };
        task.stop();

        let fabric_index = self
            .inner
            .clusters
            .read_current_fabric_index(device_id)
            .await?;
        self.inner
            .controller
            .shutdown_subscriptions(fabric_index, device_id, subscription_id);
        tracing::debug!(%device_id, fabric_index, ?subscription_id, "Unsubscribed from device");
        Ok(())
    }

    /// Stops tracking every device and shuts down all subscriptions.
    pub fn unsubscribe_all(&self) {
        self.inner.stop_polling();
        let drained: Vec<SubscriptionTask<C>> = self
            .inner
            .tasks
            .lock()
            .drain()
            .map(|(_, task)| task)
            .collect();
        for task in drained {
            task.stop();
        }
        self.inner.controller.shutdown_all_subscriptions();
        tracing::debug!("Unsubscribed from all devices");
    }

    /// Devices currently tracked, in ascending id order.
    #[must_use]
    pub fn tracked_devices(&self) -> Vec<NodeId> {
        let mut devices: Vec<NodeId> = self.inner.tasks.lock().keys().copied().collect();
        devices.sort_unstable();
        devices
    }

    /// Last subscription id the device reported, if any.
    #[must_use]
    pub fn subscription_id(&self, device_id: NodeId) -> Option<u64> {
        self.inner
            .tasks
            .lock()
            .get(&device_id)
            .and_then(|task| task.active.as_ref())
            .and_then(|active| active.subscription_id)
    }

    /// Consecutive failed pings recorded for a tracked device.
    #[must_use]
    pub fn consecutive_offline_pings(&self, device_id: NodeId) -> Option<u32> {
        self.inner
            .tasks
            .lock()
            .get(&device_id)
            .map(|task| task.consecutive_offline_pings)
    }

    /// Whether the background ping loop is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .as_ref()
            .is_some_and(|poller| !poller.is_finished())
    }

    // ========================================================================
    // Liveness
    // ========================================================================

    /// Runs one liveness tick over every tracked device.
    ///
    /// Pings run concurrently; transitions are reported to each device's
    /// listener once all pings have finished.
    pub async fn poll_liveness(&self) {
        self.inner.poll_liveness().await;
    }

    /// Pings a device with the configured ping timeout.
    pub async fn is_device_online(&self, device_id: NodeId) -> bool {
        self.inner.ping(device_id).await
    }

    // ========================================================================
    // Reads and writes
    // ========================================================================

    /// Reads every attribute the device type supports.
    ///
    /// Any failed read yields a snapshot holding only `Online: false`.
    pub async fn read_device_states(&self, device_id: NodeId, device_type: DeviceType) -> DeviceStateSnapshot {
        let mut snapshot = DeviceStateSnapshot::online(device_type, true);
        for &key in supported_attributes(device_type) {
            if key == AttributeKey::Online {
                continue;
            }
            match self.read_value(device_id, device_type, key).await {
                Ok(value) => {
                    snapshot.apply(value);
                }
                Err(e) => {
                    tracing::debug!(%device_id, attribute = %key, error = %e, "Device state read failed");
                    return DeviceStateSnapshot::online(device_type, false);
                }
            }
        }
        snapshot
    }

    /// Reads one attribute.
    ///
    /// Returns `Ok(None)` without touching the device if the device type
    /// does not support `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_device_state(
        &self,
        device_id: NodeId,
        device_type: DeviceType,
        key: AttributeKey,
    ) -> Result<Option<StateValue>> {
        if !is_attribute_supported(device_type, key) {
            return Ok(None);
        }
        self.read_value(device_id, device_type, key).await.map(Some)
    }

    /// Writes one attribute.
    ///
    /// Returns `Ok(false)` without touching the device if the device type
    /// does not support the attribute or it is read-only.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn write_device_state(
        &self,
        device_id: NodeId,
        device_type: DeviceType,
        value: StateValue,
    ) -> Result<bool> {
        if !is_attribute_supported(device_type, value.key()) {
            return Ok(false);
        }
        let clusters = &self.inner.clusters;
        match value {
            StateValue::Online(_) => return Ok(false),
            StateValue::Switch(on) if device_type == DeviceType::Fan => {
                let mode = if on { FanMode::On } else { FanMode::Off };
                clusters.write_fan_mode(device_id, mode).await?;
            }
            StateValue::Switch(on) => clusters.write_on_off(device_id, on).await?,
            StateValue::Brightness(brightness) => {
                clusters.write_brightness(device_id, brightness).await?;
            }
            StateValue::Color(color) => clusters.write_color(device_id, color).await?,
            StateValue::ColorTemperature(temperature) => {
                clusters
                    .write_color_temperature(device_id, temperature)
                    .await?;
            }
            StateValue::FanMode(mode) => clusters.write_fan_mode(device_id, mode).await?,
            StateValue::FanSpeed(speed) => clusters.write_fan_speed(device_id, speed).await?,
        }
        Ok(true)
    }

    async fn read_value(
        &self,
        device_id: NodeId,
        device_type: DeviceType,
        key: AttributeKey,
    ) -> Result<StateValue> {
        let clusters = &self.inner.clusters;
        Ok(match key {
            AttributeKey::Online => StateValue::Online(self.inner.ping(device_id).await),
            AttributeKey::Switch if device_type == DeviceType::Fan => {
                StateValue::Switch(clusters.read_fan_mode(device_id).await?.is_running())
            }
            AttributeKey::Switch => StateValue::Switch(clusters.read_on_off(device_id).await?),
            AttributeKey::Brightness => StateValue::Brightness(clusters.read_brightness(device_id).await?),
            AttributeKey::Color => StateValue::Color(clusters.read_color(device_id).await?),
            AttributeKey::ColorTemperature => {
                StateValue::ColorTemperature(clusters.read_color_temperature(device_id).await?)
            }
            AttributeKey::FanMode => StateValue::FanMode(clusters.read_fan_mode(device_id).await?),
            AttributeKey::FanSpeed => StateValue::FanSpeed(clusters.read_fan_speed(device_id).await?),
        })
    }
}

impl<C: DeviceController> SyncInner<C> {
    fn stop_polling(&self) {
        if let Some(poller) = self.poller.lock().take() {
            poller.abort();
        }
    }

    fn start_polling(self: &Arc<Self>) {
        let mut poller = self.poller.lock();
        if let Some(previous) = poller.take() {
            previous.abort();
        }

        let tracked = self.tasks.lock().len();
        if tracked == 0 {
            return;
        }

        let interval = ping_interval(tracked);
        let weak = Arc::downgrade(self);
        *poller = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.poll_liveness().await;
            }
        }));
        tracing::debug!(tracked, ?interval, "Liveness polling started");
    }

    async fn ping(&self, device_id: NodeId) -> bool {
        self.clusters
            .connect_within(device_id, self.config.ping_timeout)
            .await
            .is_ok()
    }

    async fn poll_liveness(self: &Arc<Self>) {
        let devices: Vec<NodeId> = self.tasks.lock().keys().copied().collect();
        if devices.is_empty() {
            return;
        }

        let mut pings = JoinSet::new();
        for device_id in devices {
            let inner = Arc::clone(self);
            pings.spawn(async move { (device_id, inner.ping(device_id).await) });
        }

        while let Some(joined) = pings.join_next().await {
            match joined {
                Ok((device_id, online)) => self.apply_ping(device_id, online).await,
                Err(e) => tracing::warn!(error = %e, "Liveness ping task failed"),
            }
        }
    }

    async fn apply_ping(self: &Arc<Self>, device_id: NodeId, online: bool) {
        let (transition, resubscribe, device_type, listener) = {
            let mut tasks = self.tasks.lock();
            let Some(task) = tasks.get_mut(&device_id) else {
                return;
            };
            let (transition, next) = evaluate_ping(
                task.consecutive_offline_pings,
                online,
                self.config.max_device_pings,
            );
            task.consecutive_offline_pings = next;
            let resubscribe = online && task.needs_subscription();
            (transition, resubscribe, task.device_type, Arc::clone(&task.listener))
        };

        match transition {
            LivenessTransition::Unchanged if resubscribe => {
                tracing::debug!(%device_id, "Subscribing to answering device");
                if let Err(e) = self.establish(device_id).await {
                    tracing::warn!(%device_id, error = %e, "Subscription retry failed");
                }
            }
            LivenessTransition::Unchanged => {}
            LivenessTransition::WentOffline => {
                tracing::info!(%device_id, "Device went offline");
                listener.on_report(device_id, DeviceStateSnapshot::online(device_type, false));
            }
            LivenessTransition::BackOnline => {
                tracing::info!(%device_id, "Device is back online");
                listener.on_report(device_id, DeviceStateSnapshot::online(device_type, true));
                if let Err(e) = self.establish(device_id).await {
                    tracing::warn!(%device_id, error = %e, "Re-subscription failed");
                    listener.on_error(device_id, &e);
                }
            }
        }
    }

    /// Sets up the native subscription for a tracked device.
    ///
    /// A subscription the device already had is shut down first. The
    /// connected handle is kept until the new subscription is dropped.
    async fn establish(self: &Arc<Self>, device_id: NodeId) -> Result<()> {
        let device = self.clusters.connect(device_id).await?;

        let previous = self
            .tasks
            .lock()
            .get_mut(&device_id)
            .and_then(|task| task.active.take());
        if let Some(previous) = previous {
            self.retire(device_id, previous).await;
        }

        let (sink, events) = mpsc::unbounded_channel();
        self.clusters
            .subscribe_with(
                &device,
                vec![AttributePathPattern::endpoint(self.config.control_endpoint)],
                sink,
            )
            .await?;

        // The forwarder is spawned under the lock so its first event sees
        // the new subscription.
        let mut tasks = self.tasks.lock();
        let Some(task) = tasks.get_mut(&device_id) else {
            return Err(Error::IllegalState(format!(
                "device {device_id} was unsubscribed while subscribing"
            )));
        };
        task.active = Some(ActiveSubscription {
            device,
            forwarder: tokio::spawn(forward(Arc::downgrade(self), device_id, events)),
            subscription_id: None,
        });
        Ok(())
    }

    /// Stops a replaced subscription and shuts it down natively.
    async fn retire(&self, device_id: NodeId, active: ActiveSubscription<C>) {
        active.forwarder.abort();
        match self.clusters.read_current_fabric_index(device_id).await {
            Ok(fabric_index) => {
                self.controller.shutdown_subscriptions(
                    fabric_index,
                    device_id,
                    active.subscription_id,
                );
                tracing::debug!(
                    %device_id,
                    fabric_index,
                    subscription_id = ?active.subscription_id,
                    "Replaced subscription shut down"
                );
            }
            Err(e) => {
                tracing::warn!(
                    %device_id,
                    error = %e,
                    "Could not shut down replaced subscription"
                );
            }
        }
        drop(active.device);
    }
}

/// Delivers a device's subscription events to its listener.
async fn forward<C: DeviceController>(
    inner: Weak<SyncInner<C>>,
    device_id: NodeId,
    mut events: mpsc::UnboundedReceiver<SubscriptionEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let Some((device_type, listener)) = inner.observe(device_id, &event) else {
            break;
        };

        match event {
            SubscriptionEvent::Established { subscription_id } => {
                tracing::debug!(%device_id, subscription_id, "Subscription established");
                listener.on_subscription_established(device_id, subscription_id);
            }
            SubscriptionEvent::Report(report) => {
                let snapshot = translate_report(&report, device_type, inner.config.control_endpoint);
                listener.on_report(device_id, snapshot);
            }
            SubscriptionEvent::Resubscribing { cause, next_attempt } => {
                tracing::debug!(%device_id, %cause, ?next_attempt, "Native layer resubscribing");
            }
            SubscriptionEvent::Error(e) => {
                tracing::warn!(%device_id, error = %e, "Subscription failed");
                listener.on_error(device_id, &Error::Controller(e));
            }
        }
    }
}

impl<C: DeviceController> SyncInner<C> {
    /// Updates the task for an incoming event.
    ///
    /// Returns `None` once the device is no longer tracked.
    fn observe(
        &self,
        device_id: NodeId,
        event: &SubscriptionEvent,
    ) -> Option<(DeviceType, Arc<dyn SubscriptionListener>)> {
        let mut tasks = self.tasks.lock();
        let task = tasks.get_mut(&device_id)?;
        match event {
            SubscriptionEvent::Established { subscription_id } => {
                if let Some(active) = task.active.as_mut() {
                    active.subscription_id = Some(*subscription_id);
                }
                task.consecutive_offline_pings = 0;
            }
            SubscriptionEvent::Report(_) => task.consecutive_offline_pings = 0,
            SubscriptionEvent::Resubscribing { .. } | SubscriptionEvent::Error(_) => {}
        }
        Some((task.device_type, Arc::clone(&task.listener)))
    }
}
