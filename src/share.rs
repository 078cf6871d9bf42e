// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sharing a commissioned device with another ecosystem.
//!
//! Sharing opens an enhanced commissioning window on the device with a
//! fresh setup PIN. The returned [`SharePayload`] carries the codes the
//! other controller needs to join the device to its own fabric.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterAccessor;
use crate::config::ClientConfig;
use crate::controller::DeviceController;
use crate::error::{CommissioningError, CommissioningErrorCode, Error, Result};
use crate::payload::{MAX_DISCRIMINATOR, format_manual_code, is_valid_setup_pin};
use crate::types::NodeId;

/// Exclusive upper bound of a setup PIN.
const PIN_BOUND: u32 = 100_000_000;

/// Codes for joining a shared device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    /// QR code text.
    pub qr_code: String,
    /// 11 or 21 digit manual pairing code.
    pub manual_code: String,
    /// Setup PIN of the open window.
    pub setup_pin: u32,
    /// Discriminator the device advertises while the window is open.
    pub discriminator: u16,
    /// When the commissioning window closes.
    pub expires_at: DateTime<Utc>,
}

impl SharePayload {
    /// Manual code grouped for display.
    #[must_use]
    pub fn formatted_manual_code(&self) -> String {
        format_manual_code(&self.manual_code)
    }

    /// Whether the window has closed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Opens commissioning windows on commissioned devices.
pub struct DeviceShareEngine<C: DeviceController> {
    clusters: ClusterAccessor<C>,
    config: ClientConfig,
}

impl<C: DeviceController> Clone for DeviceShareEngine<C> {
    fn clone(&self) -> Self {
        Self {
            clusters: self.clusters.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C: DeviceController> std::fmt::Debug for DeviceShareEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceShareEngine").finish_non_exhaustive()
    }
}

impl<C: DeviceController> DeviceShareEngine<C> {
    /// Creates an engine over the shared controller.
    #[must_use]
    pub fn new(controller: Arc<C>, config: ClientConfig) -> Self {
        Self {
            clusters: ClusterAccessor::new(controller, config.clone()),
            config,
        }
    }

    /// Opens a commissioning window so another controller can join the device.
    ///
    /// `duration` defaults to the configured share window. An already open
    /// window is revoked first.
    ///
    /// # Errors
    ///
    /// - `Error::Commissioning` with `ShareConfigFailed` if the
    ///   discriminator does not fit in 12 bits
    /// - `Error::Unreachable` if the device cannot be reached
    /// - `Error::UnsupportedOperation` if every fabric slot is taken
    /// - `Error::OperationFailed` if a read or the revoke fails
    /// - `Error::Commissioning` with `WindowOpenFailed` if the device
    ///   does not open the window
    /// - `Error::IllegalState` if the device opened the window without
    ///   returning its codes
    pub async fn share_device(
        &self,
        device_id: NodeId,
        discriminator: u16,
        duration: Option<Duration>,
    ) -> Result<SharePayload> {
        if discriminator > MAX_DISCRIMINATOR {
            return Err(CommissioningError::new(
                CommissioningErrorCode::ShareConfigFailed,
                format!("Discriminator {discriminator} does not fit in 12 bits"),
            )
            .into());
        }
        let duration = duration.unwrap_or(self.config.share_window);

        drop(self.clusters.connect(device_id).await?);

        let supported = self.clusters.read_supported_fabrics(device_id).await?;
        let commissioned = self.clusters.read_commissioned_fabrics(device_id).await?;
        if commissioned >= supported {
            tracing::warn!(%device_id, commissioned, supported, "Cannot share device");
            return Err(Error::UnsupportedOperation(
                "Device has reached maximum supported commissions".to_string(),
            ));
        }

        if self.clusters.read_window_status(device_id).await?.is_open() {
            tracing::debug!(%device_id, "Revoking open commissioning window");
            self.clusters.revoke_commissioning(device_id).await?;
        }

        let setup_pin = generate_pin(&mut time_seeded_rng());
        let codes = self
            .clusters
            .open_pairing_window(device_id, duration, discriminator, setup_pin)
            .await
            .map_err(|e| match e {
                Error::OperationFailed { cause, .. } => {
                    tracing::warn!(%device_id, error = %cause, "Commissioning window not opened");
                    CommissioningError::new(
                        CommissioningErrorCode::WindowOpenFailed,
                        format!(
                            "Opening pairing window for device {device_id} failed: {cause}"
                        ),
                    )
                    .into()
                }
                other => other,
            })?;

        let (Some(qr_code), Some(manual_code)) = (codes.qr_code, codes.manual_code) else {
            return Err(Error::IllegalState(format!(
                "Opening pairing window for device {device_id} failed to return payload"
            )));
        };

        let now = Utc::now();
        let expires_at = TimeDelta::from_std(duration)
            .ok()
            .and_then(|window| now.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        tracing::info!(%device_id, discriminator, ?duration, "Commissioning window opened");
        Ok(SharePayload {
            qr_code,
            manual_code,
            setup_pin,
            discriminator,
            expires_at,
        })
    }
}

/// Weak randomness; the PIN only guards a short-lived window.
#[allow(clippy::cast_possible_truncation)]
fn time_seeded_rng() -> StdRng {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64);
    StdRng::seed_from_u64(seed)
}

fn generate_pin<R: Rng>(rng: &mut R) -> u32 {
    loop {
        let pin = rng.gen_range(1..PIN_BOUND);
        if is_valid_setup_pin(pin) {
            return pin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_pins_are_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let pin = generate_pin(&mut rng);
            assert!(pin < PIN_BOUND);
            assert!(is_valid_setup_pin(pin), "{pin}");
        }
    }

    #[test]
    fn same_seed_same_pin() {
        let a = generate_pin(&mut StdRng::seed_from_u64(42));
        let b = generate_pin(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn formatted_manual_code_groups_digits() {
        let payload = SharePayload {
            qr_code: "MT:Y.K9042C00KA0648G00".to_string(),
            manual_code: "34970112332".to_string(),
            setup_pin: 20_202_021,
            discriminator: 3840,
            expires_at: DateTime::<Utc>::MAX_UTC,
        };
        assert_eq!(payload.formatted_manual_code(), "3497–0112–332");
        assert!(!payload.is_expired_at(Utc::now()));
    }
}
