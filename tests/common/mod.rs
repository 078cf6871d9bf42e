// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process fakes of the native controller and the BLE adapter.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use matter_link::cluster::ids::{basic_information, descriptor, operational_credentials};
use matter_link::controller::{
    AttestationReport, AttributeData, AttributePath, AttributePathPattern, CommandPath,
    CommissioningReport, DeviceController, DeviceHandle, DiscoveredNode, NodeReport,
    PairingWindowCodes, SubscriptionEvent, WiFiCredentials,
};
use matter_link::transport::{
    BleAdapter, BlePeripheral, GattEvent, GattSession, ServiceDataFilter,
};
use matter_link::{ControllerError, DeviceType, NodeId};
use parking_lot::Mutex;
use tokio::sync::mpsc;

pub const DEFAULT_PAYLOAD_BLE: &str = "MT:Y.K9042C00KA0648G00";
pub const DEFAULT_PAYLOAD_ON_NETWORK: &str = "MT:Y.K90AFN00KA0648G00";
pub const DEFAULT_DISCRIMINATOR: u16 = 3840;

pub fn node(id: u64) -> NodeId {
    NodeId::new(id).unwrap()
}

/// Discovered node advertising the default discriminator.
pub fn network_node(discriminator: u16) -> DiscoveredNode {
    DiscoveredNode {
        discriminator,
        addresses: vec![IpAddr::V4(Ipv4Addr::new(192, 168, 1, 40))],
        port: 5540,
        vendor_id: Some(0xFFF1),
        product_id: Some(0x8000),
    }
}

/// Advertisement carrying `discriminator` in its service data.
pub fn peripheral(discriminator: u16) -> BlePeripheral {
    let [lo, hi] = (discriminator & 0x0FFF).to_le_bytes();
    BlePeripheral {
        address: "AA:BB:CC:DD:EE:FF".to_string(),
        name: Some("MATTER-3840".to_string()),
        service_data: vec![0x00, lo, hi],
    }
}

// ============================================================================
// Controller
// ============================================================================

/// How the fake answers a pairing call.
#[derive(Debug, Clone)]
pub enum PairingBehavior {
    /// Reports PASE success then commissioning success.
    Succeed,
    /// Raises an attestation failure and waits for `continue_commissioning`.
    AttestationFailure { device_ptr: u64, error_code: i64 },
    /// Reports the given completion events.
    Report(Vec<CommissioningReport>),
    /// Returns an error from the pairing call itself.
    RejectCall,
    /// Never answers.
    Silent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairCall {
    Ble {
        node_id: NodeId,
        connection_id: u32,
        setup_pin_code: u32,
        ssid: String,
    },
    Address {
        node_id: NodeId,
        address: SocketAddr,
        discriminator: u16,
        setup_pin_code: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoke {
    pub node_id: NodeId,
    pub path: CommandPath,
    pub fields: AttributeData,
    pub timed: Option<Duration>,
}

#[derive(Debug)]
pub struct FakeController {
    attributes: Mutex<HashMap<(NodeId, AttributePath), AttributeData>>,
    unreachable: Mutex<HashSet<NodeId>>,
    discovered: Mutex<Vec<DiscoveredNode>>,
    pairing: Mutex<PairingBehavior>,
    window_codes: Mutex<PairingWindowCodes>,
    fail_window: Mutex<bool>,

    completion: Mutex<Option<mpsc::UnboundedSender<CommissioningReport>>>,
    attestation: Mutex<Option<mpsc::UnboundedSender<AttestationReport>>>,
    subscriptions: Mutex<Vec<(NodeId, mpsc::UnboundedSender<SubscriptionEvent>)>>,
    next_subscription_id: AtomicU64,

    pub pair_calls: Mutex<Vec<PairCall>>,
    pub writes: Mutex<Vec<(NodeId, AttributePath, AttributeData)>>,
    pub invokes: Mutex<Vec<Invoke>>,
    pub continued: Mutex<Vec<(u64, bool)>>,
    pub shutdowns: Mutex<Vec<(u8, NodeId, Option<u64>)>>,
    pub opened_windows: Mutex<Vec<(NodeId, Duration, u32, u16, u32)>>,
    pub unpaired: Mutex<Vec<NodeId>>,
    pub connect_calls: AtomicUsize,
    pub released: AtomicUsize,
    pub discovery_calls: AtomicUsize,
    pub subscribe_calls: AtomicUsize,
    pub shutdown_all_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
}

impl Default for FakeController {
    fn default() -> Self {
        Self {
            attributes: Mutex::new(HashMap::new()),
            unreachable: Mutex::new(HashSet::new()),
            discovered: Mutex::new(Vec::new()),
            pairing: Mutex::new(PairingBehavior::Succeed),
            window_codes: Mutex::new(PairingWindowCodes {
                manual_code: Some("34970112332".to_string()),
                qr_code: Some(DEFAULT_PAYLOAD_BLE.to_string()),
            }),
            fail_window: Mutex::new(false),
            completion: Mutex::new(None),
            attestation: Mutex::new(None),
            subscriptions: Mutex::new(Vec::new()),
            next_subscription_id: AtomicU64::new(1),
            pair_calls: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            invokes: Mutex::new(Vec::new()),
            continued: Mutex::new(Vec::new()),
            shutdowns: Mutex::new(Vec::new()),
            opened_windows: Mutex::new(Vec::new()),
            unpaired: Mutex::new(Vec::new()),
            connect_calls: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            discovery_calls: AtomicUsize::new(0),
            subscribe_calls: AtomicUsize::new(0),
            shutdown_all_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_attribute(&self, node_id: NodeId, path: AttributePath, value: AttributeData) {
        self.attributes.lock().insert((node_id, path), value);
    }

    pub fn attribute(&self, node_id: NodeId, path: AttributePath) -> Option<AttributeData> {
        self.attributes.lock().get(&(node_id, path)).cloned()
    }

    /// Descriptor and basic information answers for a freshly paired node.
    pub fn provision(&self, node_id: NodeId, device_type: DeviceType) {
        self.set_attribute(
            node_id,
            AttributePath::new(0, descriptor::CLUSTER, descriptor::PARTS_LIST),
            AttributeData::List(vec![1u16.into()]),
        );
        self.set_attribute(
            node_id,
            AttributePath::new(1, descriptor::CLUSTER, descriptor::DEVICE_TYPE_LIST),
            AttributeData::List(vec![AttributeData::structure([(
                descriptor::DEVICE_TYPE_FIELD,
                device_type.code().into(),
            )])]),
        );
        self.set_attribute(
            node_id,
            AttributePath::new(0, basic_information::CLUSTER, basic_information::VENDOR_ID),
            0xFFF1u16.into(),
        );
        self.set_attribute(
            node_id,
            AttributePath::new(0, basic_information::CLUSTER, basic_information::PRODUCT_ID),
            0x8000u16.into(),
        );
    }

    pub fn set_fabrics(&self, node_id: NodeId, supported: u8, commissioned: u8) {
        let at = |attribute| AttributePath::new(0, operational_credentials::CLUSTER, attribute);
        self.set_attribute(node_id, at(operational_credentials::SUPPORTED_FABRICS), supported.into());
        self.set_attribute(
            node_id,
            at(operational_credentials::COMMISSIONED_FABRICS),
            commissioned.into(),
        );
        self.set_attribute(node_id, at(operational_credentials::CURRENT_FABRIC_INDEX), 1u8.into());
    }

    pub fn set_reachable(&self, node_id: NodeId, reachable: bool) {
        let mut unreachable = self.unreachable.lock();
        if reachable {
            unreachable.remove(&node_id);
        } else {
            unreachable.insert(node_id);
        }
    }

    pub fn add_discovered(&self, node: DiscoveredNode) {
        self.discovered.lock().push(node);
    }

    pub fn set_pairing(&self, behavior: PairingBehavior) {
        *self.pairing.lock() = behavior;
    }

    pub fn set_window_codes(&self, codes: PairingWindowCodes) {
        *self.window_codes.lock() = codes;
    }

    /// Makes opening a commissioning window return a native status.
    pub fn fail_window_open(&self, fail: bool) {
        *self.fail_window.lock() = fail;
    }

    /// Sends a completion report through the installed listener.
    pub fn report_completion(&self, report: CommissioningReport) {
        if let Some(listener) = self.completion.lock().as_ref() {
            let _ = listener.send(report);
        }
    }

    /// Sends an event to every subscription sink held for `node_id`.
    pub fn push(&self, node_id: NodeId, event: SubscriptionEvent) {
        for (subscribed, sink) in self.subscriptions.lock().iter() {
            if *subscribed == node_id {
                let _ = sink.send(event.clone());
            }
        }
    }

    pub fn push_report(&self, node_id: NodeId, report: NodeReport) {
        self.push(node_id, SubscriptionEvent::Report(report));
    }

    pub fn pair_calls(&self) -> Vec<PairCall> {
        self.pair_calls.lock().clone()
    }

    pub fn invokes(&self) -> Vec<Invoke> {
        self.invokes.lock().clone()
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn subscribes(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    fn node_of(handle: DeviceHandle) -> NodeId {
        NodeId::new(handle.raw()).unwrap()
    }

    fn answer_pairing(&self, node_id: NodeId) -> Result<(), ControllerError> {
        let behavior = self.pairing.lock().clone();
        match behavior {
            PairingBehavior::Succeed => {
                self.report_completion(CommissioningReport::PairingComplete { code: 0 });
                self.report_completion(CommissioningReport::CommissioningComplete {
                    node_id,
                    code: 0,
                });
            }
            PairingBehavior::AttestationFailure {
                device_ptr,
                error_code,
            } => {
                self.report_completion(CommissioningReport::PairingComplete { code: 0 });
                if let Some(delegate) = self.attestation.lock().as_ref() {
                    let _ = delegate.send(AttestationReport {
                        device_ptr,
                        error_code,
                    });
                }
            }
            PairingBehavior::Report(reports) => {
                for report in reports {
                    self.report_completion(report);
                }
            }
            PairingBehavior::RejectCall => {
                return Err(ControllerError::Failed("pairing rejected".into()));
            }
            PairingBehavior::Silent => {}
        }
        Ok(())
    }

    fn last_paired_node(&self) -> Option<NodeId> {
        self.pair_calls.lock().last().map(|call| match call {
            PairCall::Ble { node_id, .. } | PairCall::Address { node_id, .. } => *node_id,
        })
    }
}

impl DeviceController for FakeController {
    async fn connected_device(
        &self,
        node_id: NodeId,
        _timeout: Duration,
    ) -> Result<DeviceHandle, ControllerError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.lock().contains(&node_id) {
            return Err(ControllerError::Timeout);
        }
        Ok(DeviceHandle::new(node_id.value()))
    }

    fn release_device(&self, _handle: DeviceHandle) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    async fn read_attribute(
        &self,
        handle: DeviceHandle,
        path: AttributePath,
    ) -> Result<AttributeData, ControllerError> {
        self.attribute(Self::node_of(handle), path)
            .ok_or(ControllerError::Status(0x86))
    }

    async fn write_attribute(
        &self,
        handle: DeviceHandle,
        path: AttributePath,
        value: AttributeData,
    ) -> Result<(), ControllerError> {
        let node_id = Self::node_of(handle);
        self.writes.lock().push((node_id, path, value.clone()));
        self.set_attribute(node_id, path, value);
        Ok(())
    }

    async fn invoke_command(
        &self,
        handle: DeviceHandle,
        path: CommandPath,
        fields: AttributeData,
        timed: Option<Duration>,
    ) -> Result<(), ControllerError> {
        self.invokes.lock().push(Invoke {
            node_id: Self::node_of(handle),
            path,
            fields,
            timed,
        });
        Ok(())
    }

    async fn subscribe(
        &self,
        handle: DeviceHandle,
        _paths: Vec<AttributePathPattern>,
        _min_interval: Duration,
        _max_interval: Duration,
        sink: mpsc::UnboundedSender<SubscriptionEvent>,
    ) -> Result<(), ControllerError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let subscription_id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst);
        let _ = sink.send(SubscriptionEvent::Established { subscription_id });
        self.subscriptions.lock().push((Self::node_of(handle), sink));
        Ok(())
    }

    fn shutdown_subscriptions(&self, fabric_index: u8, node_id: NodeId, subscription_id: Option<u64>) {
        self.shutdowns
            .lock()
            .push((fabric_index, node_id, subscription_id));
        self.subscriptions.lock().retain(|(n, _)| *n != node_id);
    }

    fn shutdown_all_subscriptions(&self) {
        self.shutdown_all_calls.fetch_add(1, Ordering::SeqCst);
        self.subscriptions.lock().clear();
    }

    fn discover_commissionable_nodes(&self) -> Result<(), ControllerError> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn discovered_device(&self, index: usize) -> Option<DiscoveredNode> {
        self.discovered.lock().get(index).cloned()
    }

    fn set_completion_listener(&self, listener: mpsc::UnboundedSender<CommissioningReport>) {
        *self.completion.lock() = Some(listener);
    }

    fn set_attestation_delegate(
        &self,
        _fail_safe: Duration,
        delegate: mpsc::UnboundedSender<AttestationReport>,
    ) {
        *self.attestation.lock() = Some(delegate);
    }

    fn pair_device_ble(
        &self,
        node_id: NodeId,
        connection_id: u32,
        setup_pin_code: u32,
        credentials: &WiFiCredentials,
    ) -> Result<(), ControllerError> {
        self.pair_calls.lock().push(PairCall::Ble {
            node_id,
            connection_id,
            setup_pin_code,
            ssid: credentials.ssid.clone(),
        });
        self.answer_pairing(node_id)
    }

    fn pair_device_with_address(
        &self,
        node_id: NodeId,
        address: SocketAddr,
        discriminator: u16,
        setup_pin_code: u32,
    ) -> Result<(), ControllerError> {
        self.pair_calls.lock().push(PairCall::Address {
            node_id,
            address,
            discriminator,
            setup_pin_code,
        });
        self.answer_pairing(node_id)
    }

    fn continue_commissioning(&self, device_ptr: u64, ignore_attestation_failure: bool) {
        self.continued
            .lock()
            .push((device_ptr, ignore_attestation_failure));
        if ignore_attestation_failure && let Some(node_id) = self.last_paired_node() {
            self.report_completion(CommissioningReport::CommissioningComplete { node_id, code: 0 });
        }
    }

    async fn open_pairing_window(
        &self,
        handle: DeviceHandle,
        duration: Duration,
        iterations: u32,
        discriminator: u16,
        setup_pin_code: u32,
    ) -> Result<PairingWindowCodes, ControllerError> {
        self.opened_windows.lock().push((
            Self::node_of(handle),
            duration,
            iterations,
            discriminator,
            setup_pin_code,
        ));
        if *self.fail_window.lock() {
            return Err(ControllerError::Status(0x01));
        }
        Ok(self.window_codes.lock().clone())
    }

    async fn unpair_device(&self, node_id: NodeId) -> Result<(), ControllerError> {
        self.unpaired.lock().push(node_id);
        Ok(())
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// BLE adapter
// ============================================================================

#[derive(Debug, Default)]
pub struct FakeBleAdapter {
    advertisements: Mutex<Vec<BlePeripheral>>,
    scan_sink: Mutex<Option<mpsc::UnboundedSender<BlePeripheral>>>,
    gatt_events: Mutex<Option<mpsc::UnboundedSender<GattEvent>>>,
    fail_connect: Mutex<bool>,
    next_session: AtomicU64,
    next_connection: AtomicU32,
    pub scans: AtomicUsize,
    pub stopped_scans: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub close_calls: AtomicUsize,
}

impl FakeBleAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advertise(&self, peripheral: BlePeripheral) {
        self.advertisements.lock().push(peripheral);
    }

    /// Makes GATT connection report a link failure.
    pub fn fail_connect(&self, fail: bool) {
        *self.fail_connect.lock() = fail;
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn gatt(&self, event: GattEvent) {
        if let Some(events) = self.gatt_events.lock().as_ref() {
            let _ = events.send(event);
        }
    }
}

impl BleAdapter for FakeBleAdapter {
    fn start_scan(
        &self,
        _filter: ServiceDataFilter,
        sink: mpsc::UnboundedSender<BlePeripheral>,
    ) -> Result<(), ControllerError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        for peripheral in self.advertisements.lock().iter() {
            let _ = sink.send(peripheral.clone());
        }
        *self.scan_sink.lock() = Some(sink);
        Ok(())
    }

    fn stop_scan(&self) {
        self.stopped_scans.fetch_add(1, Ordering::SeqCst);
        self.scan_sink.lock().take();
    }

    fn connect_gatt(
        &self,
        peripheral: &BlePeripheral,
        events: mpsc::UnboundedSender<GattEvent>,
    ) -> Result<GattSession, ControllerError> {
        let status = if *self.fail_connect.lock() { 133 } else { 0 };
        let _ = events.send(GattEvent::ConnectionStateChanged {
            connected: status == 0,
            status,
        });
        *self.gatt_events.lock() = Some(events);
        Ok(GattSession {
            id: self.next_session.fetch_add(1, Ordering::SeqCst),
            address: peripheral.address.clone(),
        })
    }

    fn discover_services(&self, _session: &GattSession) -> Result<(), ControllerError> {
        self.gatt(GattEvent::ServicesDiscovered { status: 0 });
        Ok(())
    }

    fn request_mtu(&self, _session: &GattSession, mtu: u16) -> Result<(), ControllerError> {
        self.gatt(GattEvent::MtuChanged { mtu, status: 0 });
        Ok(())
    }

    fn register_connection(&self, _session: &GattSession) -> Result<u32, ControllerError> {
        Ok(self.next_connection.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn disconnect(&self, _session: GattSession) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.gatt_events.lock().take();
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}
