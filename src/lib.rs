// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `matter_link` - Matter device commissioning and state synchronization.
//!
//! This library drives a native Matter (CHIP) device controller: it
//! commissions devices over BLE or the IP network, keeps their state in
//! sync through subscriptions and liveness pings, and shares them with
//! other ecosystems by opening commissioning windows.
//!
//! The native stack itself is not part of this crate. The host
//! application implements [`DeviceController`](controller::DeviceController)
//! and [`BleAdapter`](transport::BleAdapter) over it.
//!
//! # Supported Features
//!
//! - **Onboarding payloads**: QR codes and 11/21 digit manual codes
//! - **Commissioning**: BLE and on-network transports with fallback,
//!   WiFi credential hand-off and attestation override
//! - **State sync**: Subscription reports and liveness polling turned
//!   into [`DeviceStateSnapshot`](state::DeviceStateSnapshot)s
//! - **Device control**: On/off, brightness, color, color temperature and fan
//! - **Sharing**: Enhanced commissioning windows with fresh setup PINs
//!
//! # Supported Device Types
//!
//! Lights (on/off, dimmable, color temperature, extended color), light
//! switches and dimmers, sockets and fans. See [`supported_attributes`].
//!
//! # Quick Start
//!
//! ## Commissioning
//!
//! ```ignore
//! use std::sync::Arc;
//! use matter_link::{ClientConfig, MatterClient};
//! use matter_link::commissioning::CommissioningEvent;
//!
//! let client = MatterClient::new(Arc::new(controller), Arc::new(adapter), ClientConfig::default());
//!
//! let mut session = client.commissioning().start_commissioning("MT:Y.K9042C00KA0648G00")?;
//! while let Some(event) = session.recv().await {
//!     match event {
//!         CommissioningEvent::WiFiCredentialsRequired { device_id } => {
//!             client
//!                 .commissioning()
//!                 .continue_commissioning(device_id, WiFiCredentials::new("home", "secret"))?;
//!         }
//!         CommissioningEvent::Succeeded(identity) => println!("commissioned {identity:?}"),
//!         CommissioningEvent::Failed(error) => eprintln!("{error}"),
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## State Sync
//!
//! ```ignore
//! use matter_link::sync::SyncEvent;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! client.sync().subscribe(device_id, device_type, tx).await?;
//!
//! while let Some(SyncEvent::Report { device_id, snapshot }) = rx.recv().await {
//!     println!("{device_id}: online={:?}", snapshot.is_online());
//! }
//! ```
//!
//! ## Value Types
//!
//! ```
//! use matter_link::mapping::vendor_to_hsv;
//! use matter_link::types::HsvColor;
//!
//! assert_eq!(vendor_to_hsv(127, 254), HsvColor::clamped(180, 100));
//! ```

mod capabilities;
mod client;
pub mod cluster;
pub mod commissioning;
pub mod config;
pub mod controller;
pub mod error;
pub mod mapping;
pub mod payload;
pub mod share;
pub mod state;
pub mod store;
pub mod sync;
pub mod transport;
pub mod types;

pub use capabilities::{AttributeKey, is_attribute_supported, supported_attributes};
pub use client::MatterClient;
pub use commissioning::{CommissioningEngine, CommissioningEvent, CommissioningState};
pub use config::ClientConfig;
pub use error::{
    CommissioningError, CommissioningErrorCode, ControllerError, Error, PayloadError, Result,
    ValueError,
};
pub use payload::OnboardingPayload;
pub use share::{DeviceShareEngine, SharePayload};
pub use state::{DeviceStateSnapshot, StateValue};
pub use sync::{DeviceStateSyncEngine, SubscriptionListener, SyncEvent};
pub use types::{DeviceIdentity, DeviceType, NodeId};
