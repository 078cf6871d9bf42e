// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation of native subscription reports into state snapshots.

use crate::cluster::ids::{STATE_CLUSTERS, color_control, fan_control, level_control, on_off};
use crate::controller::{AttributeData, AttributePath, EndpointId, NodeReport};
use crate::error::ValueError;
use crate::mapping;
use crate::state::{DeviceStateSnapshot, StateValue};
use crate::types::{DeviceType, FanMode, FanSpeed};

/// Builds a snapshot from one report.
///
/// A report proves the device is reachable, so the snapshot is always
/// online. Only `endpoint` and the state clusters are considered; other
/// paths are skipped. Hue and saturation become a color only when both
/// are present. Values the device type does not support are dropped.
#[must_use]
pub fn translate_report(
    report: &NodeReport,
    device_type: DeviceType,
    endpoint: EndpointId,
) -> DeviceStateSnapshot {
    let mut snapshot = DeviceStateSnapshot::online(device_type, true);
    let mut hue = None;
    let mut saturation = None;

    for (path, data) in &report.attributes {
        if path.endpoint != endpoint || !STATE_CLUSTERS.contains(&path.cluster) {
            continue;
        }
        let decoded = match (path.cluster, path.attribute) {
            (color_control::CLUSTER, color_control::CURRENT_HUE) => {
                hue = data.as_uint::<u8>().ok();
                continue;
            }
            (color_control::CLUSTER, color_control::CURRENT_SATURATION) => {
                saturation = data.as_uint::<u8>().ok();
                continue;
            }
            _ => decode(path, data),
        };

        match decoded {
            Ok(values) => {
                for value in values {
                    snapshot.apply(value);
                }
            }
            Err(e) => tracing::debug!(%path, error = %e, "Skipping undecodable report value"),
        }
    }

    if let (Some(hue), Some(saturation)) = (hue, saturation) {
        snapshot.apply(StateValue::Color(mapping::vendor_to_hsv(hue, saturation)));
    }
    snapshot
}

fn decode(path: &AttributePath, data: &AttributeData) -> Result<Vec<StateValue>, ValueError> {
    let values = match (path.cluster, path.attribute) {
        (on_off::CLUSTER, on_off::ON_OFF) => vec![StateValue::Switch(data.as_bool()?)],
        (level_control::CLUSTER, level_control::CURRENT_LEVEL) => vec![StateValue::Brightness(
            mapping::level_to_brightness(data.as_uint()?),
        )],
        (color_control::CLUSTER, color_control::COLOR_TEMPERATURE_MIREDS) => {
            vec![StateValue::ColorTemperature(mapping::mireds_to_standard(
                data.as_uint()?,
            ))]
        }
        (fan_control::CLUSTER, fan_control::FAN_MODE) => {
            let mode = FanMode::try_from(data.as_uint::<u8>()?)?;
            vec![StateValue::FanMode(mode), StateValue::Switch(mode.is_running())]
        }
        (fan_control::CLUSTER, fan_control::PERCENT_SETTING) => {
            vec![StateValue::FanSpeed(FanSpeed::clamped(data.as_uint()?))]
        }
        _ => Vec::new(),
    };
    Ok(values)
}
