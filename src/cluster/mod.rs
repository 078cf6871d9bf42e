// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed, timeout-bound cluster operations.
//!
//! [`ClusterAccessor`] turns a node id into a scoped
//! [`ConnectedDevice`], issues exactly one native read, write or invoke
//! under a timeout, and converts values between the vendor scale and the
//! standard scale. Handle resolution failures surface as
//! [`Error::Unreachable`], everything after that as
//! [`Error::OperationFailed`]. Nothing is retried here.
//!
//! # Examples
//!
//! ```ignore
//! let accessor = ClusterAccessor::new(controller, ClientConfig::default());
//!
//! accessor.write_on_off(node_id, true).await?;
//! let brightness = accessor.read_brightness(node_id).await?;
//! ```

mod handle;
pub mod ids;

pub use handle::ConnectedDevice;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{ClientConfig, ROOT_ENDPOINT};
use crate::controller::{
    AttributeData, AttributePath, AttributePathPattern, CommandPath, DeviceController,
    EndpointId, PairingWindowCodes, SubscriptionEvent,
};
use crate::error::{ControllerError, Error, Result, ValueError};
use crate::mapping;
use crate::types::{Brightness, ColorTemperature, FanMode, FanSpeed, HsvColor, NodeId};

use ids::{
    administrator_commissioning, basic_information, color_control, descriptor, fan_control,
    level_control, on_off, operational_credentials,
};

/// Status of the administrator commissioning window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    /// No window is open.
    NotOpen,
    /// An enhanced (passcode) window is open.
    EnhancedOpen,
    /// A basic window is open.
    BasicOpen,
}

impl WindowStatus {
    /// Whether any window is open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::NotOpen)
    }
}

impl TryFrom<u8> for WindowStatus {
    type Error = ValueError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NotOpen),
            1 => Ok(Self::EnhancedOpen),
            2 => Ok(Self::BasicOpen),
            _ => Err(ValueError::UnexpectedData("window status 0-2")),
        }
    }
}

/// Values from a single-attribute subscription.
///
/// Dropping the stream stops forwarding; the native subscription itself
/// is shut down through the sync engine or the controller.
#[derive(Debug)]
pub struct AttributeStream<T> {
    values: mpsc::UnboundedReceiver<T>,
    forwarder: JoinHandle<()>,
}

impl<T> AttributeStream<T> {
    /// Waits for the next reported value.
    ///
    /// Returns `None` once the subscription has ended.
    pub async fn recv(&mut self) -> Option<T> {
        self.values.recv().await
    }
}

impl<T> Drop for AttributeStream<T> {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Typed access to the clusters this library supports.
#[derive(Debug)]
pub struct ClusterAccessor<C: DeviceController> {
    controller: Arc<C>,
    config: ClientConfig,
}

impl<C: DeviceController> Clone for ClusterAccessor<C> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            config: self.config.clone(),
        }
    }
}

impl<C: DeviceController> ClusterAccessor<C> {
    /// Creates an accessor over a shared controller.
    #[must_use]
    pub fn new(controller: Arc<C>, config: ClientConfig) -> Self {
        Self { controller, config }
    }

    /// Returns the shared controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<C> {
        &self.controller
    }

    fn control(&self, cluster: u32, attribute: u32) -> AttributePath {
        AttributePath::new(self.config.control_endpoint, cluster, attribute)
    }

    fn command(&self, cluster: u32, command: u32) -> CommandPath {
        CommandPath::new(self.config.control_endpoint, cluster, command)
    }

    // ========================================================================
    // Handles and primitives
    // ========================================================================

    /// Resolves a connected device handle with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` if the handle cannot be resolved.
    pub async fn connect(&self, node_id: NodeId) -> Result<ConnectedDevice<C>> {
        self.connect_within(node_id, self.config.handle_timeout)
            .await
    }

    /// Resolves a connected device handle within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` if the handle cannot be resolved.
    pub async fn connect_within(
        &self,
        node_id: NodeId,
        timeout: Duration,
    ) -> Result<ConnectedDevice<C>> {
        let resolve = self.controller.connected_device(node_id, timeout);
        match tokio::time::timeout(timeout, resolve).await {
            Ok(Ok(handle)) => Ok(ConnectedDevice::new(
                Arc::clone(&self.controller),
                node_id,
                handle,
            )),
            Ok(Err(e)) => {
                tracing::debug!(%node_id, error = %e, "Failed to resolve device handle");
                Err(Error::Unreachable(node_id.to_string()))
            }
            Err(_) => {
                tracing::debug!(%node_id, ?timeout, "Timed out resolving device handle");
                Err(Error::Unreachable(node_id.to_string()))
            }
        }
    }

    async fn bounded<T>(
        operation: &'static str,
        limit: Duration,
        call: impl Future<Output = std::result::Result<T, ControllerError>>,
    ) -> Result<T> {
        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(cause)) => Err(Error::OperationFailed { operation, cause }),
            Err(_) => Err(Error::OperationFailed {
                operation,
                cause: ControllerError::Timeout,
            }),
        }
    }

    /// Reads one attribute through an already connected device.
    ///
    /// # Errors
    ///
    /// Returns `Error::OperationFailed` on native failure or timeout.
    pub async fn read_with(
        &self,
        device: &ConnectedDevice<C>,
        path: AttributePath,
        operation: &'static str,
    ) -> Result<AttributeData> {
        Self::bounded(
            operation,
            self.config.operation_timeout,
            self.controller.read_attribute(device.handle(), path),
        )
        .await
    }

    async fn read(
        &self,
        node_id: NodeId,
        path: AttributePath,
        operation: &'static str,
    ) -> Result<AttributeData> {
        let device = self.connect(node_id).await?;
        self.read_with(&device, path, operation).await
    }

    async fn write(
        &self,
        node_id: NodeId,
        path: AttributePath,
        value: AttributeData,
        operation: &'static str,
    ) -> Result<()> {
        let device = self.connect(node_id).await?;
        Self::bounded(
            operation,
            self.config.operation_timeout,
            self.controller
                .write_attribute(device.handle(), path, value),
        )
        .await
    }

    async fn invoke(
        &self,
        node_id: NodeId,
        path: CommandPath,
        fields: AttributeData,
        timed: Option<Duration>,
        operation: &'static str,
    ) -> Result<()> {
        let device = self.connect(node_id).await?;
        let limit = timed.unwrap_or(self.config.operation_timeout);
        Self::bounded(
            operation,
            limit,
            self.controller
                .invoke_command(device.handle(), path, fields, timed),
        )
        .await
    }

    /// Sends a subscription request with the configured report intervals.
    ///
    /// # Errors
    ///
    /// Returns `Error::OperationFailed` if the request cannot be sent.
    pub async fn subscribe_with(
        &self,
        device: &ConnectedDevice<C>,
        paths: Vec<AttributePathPattern>,
        sink: mpsc::UnboundedSender<SubscriptionEvent>,
    ) -> Result<()> {
        Self::bounded(
            "subscribe",
            self.config.operation_timeout,
            self.controller.subscribe(
                device.handle(),
                paths,
                self.config.min_report_interval,
                self.config.max_report_interval,
                sink,
            ),
        )
        .await
    }

    /// Subscribes to one attribute and converts each reported value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed` if the
    /// subscription request cannot be sent.
    pub async fn subscribe_attribute<T, F>(
        &self,
        node_id: NodeId,
        path: AttributePath,
        convert: F,
    ) -> Result<AttributeStream<T>>
    where
        T: Send + 'static,
        F: Fn(&AttributeData) -> std::result::Result<T, ValueError> + Send + 'static,
    {
        let device = self.connect(node_id).await?;
        let (sink, mut events) = mpsc::unbounded_channel();
        self.subscribe_with(&device, vec![AttributePathPattern::exact(path)], sink)
            .await?;

        let (tx, values) = mpsc::unbounded_channel();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    SubscriptionEvent::Established { subscription_id } => {
                        tracing::debug!(%node_id, %path, subscription_id, "Attribute subscription established");
                    }
                    SubscriptionEvent::Report(report) => {
                        let Some(data) = report.attributes.get(&path) else {
                            continue;
                        };
                        match convert(data) {
                            Ok(value) => {
                                if tx.send(value).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(%node_id, %path, error = %e, "Dropping malformed report");
                            }
                        }
                    }
                    SubscriptionEvent::Resubscribing { cause, next_attempt } => {
                        tracing::debug!(%node_id, %path, %cause, ?next_attempt, "Resubscribing");
                    }
                    SubscriptionEvent::Error(e) => {
                        tracing::warn!(%node_id, %path, error = %e, "Attribute subscription failed");
                        break;
                    }
                }
            }
        });

        Ok(AttributeStream { values, forwarder })
    }

    // ========================================================================
    // On/Off
    // ========================================================================

    /// Reads the on/off state.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_on_off(&self, node_id: NodeId) -> Result<bool> {
        let data = self
            .read(node_id, self.control(on_off::CLUSTER, on_off::ON_OFF), "read on-off")
            .await?;
        Ok(data.as_bool()?)
    }

    /// Switches the device on or off.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn write_on_off(&self, node_id: NodeId, on: bool) -> Result<()> {
        let command = if on { on_off::ON } else { on_off::OFF };
        self.invoke(
            node_id,
            self.command(on_off::CLUSTER, command),
            AttributeData::structure([]),
            None,
            "write on-off",
        )
        .await
    }

    // ========================================================================
    // Level control
    // ========================================================================

    /// Reads the current level as a brightness percentage.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_brightness(&self, node_id: NodeId) -> Result<Brightness> {
        let data = self
            .read(
                node_id,
                self.control(level_control::CLUSTER, level_control::CURRENT_LEVEL),
                "read current level",
            )
            .await?;
        Ok(mapping::level_to_brightness(data.as_uint()?))
    }

    /// Moves to a brightness level.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn write_brightness(&self, node_id: NodeId, brightness: Brightness) -> Result<()> {
        let level = mapping::brightness_to_level(brightness);
        self.invoke(
            node_id,
            self.command(level_control::CLUSTER, level_control::MOVE_TO_LEVEL),
            AttributeData::structure([
                (0, level.into()),
                (1, 0u16.into()),
                (2, 0u8.into()),
                (3, 0u8.into()),
            ]),
            None,
            "move to level",
        )
        .await
    }

    // ========================================================================
    // Color control
    // ========================================================================

    /// Reads the color temperature on the standard scale.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_color_temperature(&self, node_id: NodeId) -> Result<ColorTemperature> {
        let data = self
            .read(
                node_id,
                self.control(
                    color_control::CLUSTER,
                    color_control::COLOR_TEMPERATURE_MIREDS,
                ),
                "read color temperature",
            )
            .await?;
        Ok(mapping::mireds_to_standard(data.as_uint()?))
    }

    /// Moves to a color temperature given on the standard scale.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn write_color_temperature(
        &self,
        node_id: NodeId,
        temperature: ColorTemperature,
    ) -> Result<()> {
        let mireds = mapping::standard_to_mireds(temperature);
        self.invoke(
            node_id,
            self.command(
                color_control::CLUSTER,
                color_control::MOVE_TO_COLOR_TEMPERATURE,
            ),
            AttributeData::structure([
                (0, mireds.into()),
                (1, 0u16.into()),
                (2, 0u8.into()),
                (3, 0u8.into()),
            ]),
            None,
            "move to color temperature",
        )
        .await
    }

    /// Reads hue and saturation.
    ///
    /// Both attributes are read over one handle.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_color(&self, node_id: NodeId) -> Result<HsvColor> {
        let device = self.connect(node_id).await?;
        let hue = self
            .read_with(
                &device,
                self.control(color_control::CLUSTER, color_control::CURRENT_HUE),
                "read hue",
            )
            .await?;
        let saturation = self
            .read_with(
                &device,
                self.control(color_control::CLUSTER, color_control::CURRENT_SATURATION),
                "read saturation",
            )
            .await?;
        Ok(mapping::vendor_to_hsv(hue.as_uint()?, saturation.as_uint()?))
    }

    /// Moves to a hue and saturation.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn write_color(&self, node_id: NodeId, color: HsvColor) -> Result<()> {
        let (hue, saturation) = mapping::hsv_to_vendor(color);
        self.invoke(
            node_id,
            self.command(
                color_control::CLUSTER,
                color_control::MOVE_TO_HUE_AND_SATURATION,
            ),
            AttributeData::structure([
                (0, hue.into()),
                (1, saturation.into()),
                (2, 0u16.into()),
                (3, 0u8.into()),
                (4, 0u8.into()),
            ]),
            None,
            "move to hue and saturation",
        )
        .await
    }

    // ========================================================================
    // Fan control
    // ========================================================================

    /// Reads the fan mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_fan_mode(&self, node_id: NodeId) -> Result<FanMode> {
        let data = self
            .read(
                node_id,
                self.control(fan_control::CLUSTER, fan_control::FAN_MODE),
                "read fan mode",
            )
            .await?;
        Ok(FanMode::try_from(data.as_uint::<u8>()?)?)
    }

    /// Writes the fan mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn write_fan_mode(&self, node_id: NodeId, mode: FanMode) -> Result<()> {
        self.write(
            node_id,
            self.control(fan_control::CLUSTER, fan_control::FAN_MODE),
            mode.code().into(),
            "write fan mode",
        )
        .await
    }

    /// Reads the fan speed percent setting.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_fan_speed(&self, node_id: NodeId) -> Result<FanSpeed> {
        let data = self
            .read(
                node_id,
                self.control(fan_control::CLUSTER, fan_control::PERCENT_SETTING),
                "read fan percent",
            )
            .await?;
        Ok(FanSpeed::clamped(data.as_uint()?))
    }

    /// Writes the fan speed percent setting.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn write_fan_speed(&self, node_id: NodeId, speed: FanSpeed) -> Result<()> {
        self.write(
            node_id,
            self.control(fan_control::CLUSTER, fan_control::PERCENT_SETTING),
            speed.value().into(),
            "write fan percent",
        )
        .await
    }

    /// Subscribes to fan mode changes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn subscribe_fan_mode(&self, node_id: NodeId) -> Result<AttributeStream<FanMode>> {
        self.subscribe_attribute(
            node_id,
            self.control(fan_control::CLUSTER, fan_control::FAN_MODE),
            |data| FanMode::try_from(data.as_uint::<u8>()?),
        )
        .await
    }

    /// Subscribes to fan speed changes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn subscribe_fan_speed(&self, node_id: NodeId) -> Result<AttributeStream<FanSpeed>> {
        self.subscribe_attribute(
            node_id,
            self.control(fan_control::CLUSTER, fan_control::PERCENT_SETTING),
            |data| Ok(FanSpeed::clamped(data.as_uint()?)),
        )
        .await
    }

    // ========================================================================
    // Basic information
    // ========================================================================

    fn root(cluster: u32, attribute: u32) -> AttributePath {
        AttributePath::new(ROOT_ENDPOINT, cluster, attribute)
    }

    async fn read_root_string(
        &self,
        node_id: NodeId,
        attribute: u32,
        operation: &'static str,
    ) -> Result<String> {
        let data = self
            .read(
                node_id,
                Self::root(basic_information::CLUSTER, attribute),
                operation,
            )
            .await?;
        Ok(data.as_str()?.to_string())
    }

    /// Reads the user visible node label.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_node_label(&self, node_id: NodeId) -> Result<String> {
        self.read_root_string(node_id, basic_information::NODE_LABEL, "read node label")
            .await
    }

    /// Writes the user visible node label.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn write_node_label(&self, node_id: NodeId, label: &str) -> Result<()> {
        self.write(
            node_id,
            Self::root(basic_information::CLUSTER, basic_information::NODE_LABEL),
            label.into(),
            "write node label",
        )
        .await
    }

    /// Reads the vendor id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_vendor_id(&self, node_id: NodeId) -> Result<u16> {
        let data = self
            .read(
                node_id,
                Self::root(basic_information::CLUSTER, basic_information::VENDOR_ID),
                "read vendor id",
            )
            .await?;
        Ok(data.as_uint()?)
    }

    /// Reads the product id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_product_id(&self, node_id: NodeId) -> Result<u16> {
        let data = self
            .read(
                node_id,
                Self::root(basic_information::CLUSTER, basic_information::PRODUCT_ID),
                "read product id",
            )
            .await?;
        Ok(data.as_uint()?)
    }

    /// Reads the vendor name.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_vendor_name(&self, node_id: NodeId) -> Result<String> {
        self.read_root_string(node_id, basic_information::VENDOR_NAME, "read vendor name")
            .await
    }

    /// Reads the product name.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_product_name(&self, node_id: NodeId) -> Result<String> {
        self.read_root_string(node_id, basic_information::PRODUCT_NAME, "read product name")
            .await
    }

    /// Reads the persistent unique id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_unique_id(&self, node_id: NodeId) -> Result<String> {
        self.read_root_string(node_id, basic_information::UNIQUE_ID, "read unique id")
            .await
    }

    // ========================================================================
    // Operational credentials
    // ========================================================================

    async fn read_fabric_attribute(
        &self,
        node_id: NodeId,
        attribute: u32,
        operation: &'static str,
    ) -> Result<u8> {
        let data = self
            .read(
                node_id,
                Self::root(operational_credentials::CLUSTER, attribute),
                operation,
            )
            .await?;
        Ok(data.as_uint()?)
    }

    /// Reads how many fabrics the device supports.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_supported_fabrics(&self, node_id: NodeId) -> Result<u8> {
        self.read_fabric_attribute(
            node_id,
            operational_credentials::SUPPORTED_FABRICS,
            "read supported fabrics",
        )
        .await
    }

    /// Reads how many fabrics the device is commissioned to.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_commissioned_fabrics(&self, node_id: NodeId) -> Result<u8> {
        self.read_fabric_attribute(
            node_id,
            operational_credentials::COMMISSIONED_FABRICS,
            "read commissioned fabrics",
        )
        .await
    }

    /// Reads the index of the fabric this controller accesses the device on.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_current_fabric_index(&self, node_id: NodeId) -> Result<u8> {
        self.read_fabric_attribute(
            node_id,
            operational_credentials::CURRENT_FABRIC_INDEX,
            "read current fabric index",
        )
        .await
    }

    // ========================================================================
    // Administrator commissioning
    // ========================================================================

    /// Reads the commissioning window status.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_window_status(&self, node_id: NodeId) -> Result<WindowStatus> {
        let data = self
            .read(
                node_id,
                Self::root(
                    administrator_commissioning::CLUSTER,
                    administrator_commissioning::WINDOW_STATUS,
                ),
                "read window status",
            )
            .await?;
        Ok(WindowStatus::try_from(data.as_uint::<u8>()?)?)
    }

    /// Closes any open commissioning window.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn revoke_commissioning(&self, node_id: NodeId) -> Result<()> {
        self.invoke(
            node_id,
            CommandPath::new(
                ROOT_ENDPOINT,
                administrator_commissioning::CLUSTER,
                administrator_commissioning::REVOKE_COMMISSIONING,
            ),
            AttributeData::structure([]),
            Some(self.config.admin_command_timeout),
            "revoke commissioning",
        )
        .await
    }

    /// Opens an enhanced commissioning window.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn open_pairing_window(
        &self,
        node_id: NodeId,
        duration: Duration,
        discriminator: u16,
        setup_pin_code: u32,
    ) -> Result<PairingWindowCodes> {
        let device = self.connect(node_id).await?;
        Self::bounded(
            "open pairing window",
            self.config.admin_command_timeout,
            self.controller.open_pairing_window(
                device.handle(),
                duration,
                self.config.pin_iterations,
                discriminator,
                setup_pin_code,
            ),
        )
        .await
    }

    // ========================================================================
    // Descriptor
    // ========================================================================

    /// Reads the endpoints listed by the root descriptor.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_parts_list(&self, node_id: NodeId) -> Result<Vec<EndpointId>> {
        let data = self
            .read(
                node_id,
                Self::root(descriptor::CLUSTER, descriptor::PARTS_LIST),
                "read parts list",
            )
            .await?;
        data.as_list()?
            .iter()
            .map(|item| item.as_uint::<EndpointId>().map_err(Error::from))
            .collect()
    }

    /// Reads the device type ids of an endpoint, in reported order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unreachable` or `Error::OperationFailed`.
    pub async fn read_device_types(
        &self,
        node_id: NodeId,
        endpoint: EndpointId,
    ) -> Result<Vec<u32>> {
        let data = self
            .read(
                node_id,
                AttributePath::new(endpoint, descriptor::CLUSTER, descriptor::DEVICE_TYPE_LIST),
                "read device type list",
            )
            .await?;
        data.as_list()?
            .iter()
            .map(|item| {
                item.field(descriptor::DEVICE_TYPE_FIELD)
                    .and_then(AttributeData::as_uint::<u32>)
                    .map_err(Error::from)
            })
            .collect()
    }
}
