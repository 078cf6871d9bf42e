// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Liveness ping scheduling and online/offline hysteresis.

use std::f64::consts::SQRT_2;
use std::time::Duration;

/// Task count at which the poll interval reaches half its maximum.
const CENTER: f64 = 25.0;
/// Spread of the S-curve.
const SPREAD: f64 = 18.0;
/// Half the maximum poll interval, in seconds.
const HALF_RANGE_SECS: f64 = 30.0;

/// Interval between liveness ticks for `task_count` tracked devices.
///
/// Follows an error-function S-curve centred at 25 devices with spread
/// 18, scaled to 0-60 s, so larger fleets are pinged less often.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn ping_interval(task_count: usize) -> Duration {
    let n = task_count as f64;
    let secs = HALF_RANGE_SECS * (1.0 + erf((n - CENTER) / (SPREAD * SQRT_2)));
    Duration::from_millis((secs * 1000.0).round() as u64)
}

/// Error function, Abramowitz and Stegun 7.1.26 (absolute error below 1.5e-7).
fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A: [f64; 5] = [
        0.254_829_592,
        -0.284_496_736,
        1.421_413_741,
        -1.453_152_027,
        1.061_405_429,
    ];

    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = A.iter().rev().fold(0.0, |acc, a| acc * t + a) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Online/offline change caused by one ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessTransition {
    /// Nothing to report.
    Unchanged,
    /// The device answered after enough failed pings.
    BackOnline,
    /// The device stopped answering.
    WentOffline,
}

/// Evaluates one ping against the failure count before it.
///
/// Returns the transition to report and the new failure count. The count
/// resets on success and saturates at `max_pings + 1` on failure.
#[must_use]
pub fn evaluate_ping(
    consecutive_failures: u32,
    online: bool,
    max_pings: u32,
) -> (LivenessTransition, u32) {
    let transition = if online && consecutive_failures >= max_pings {
        LivenessTransition::BackOnline
    } else if !online && max_pings.checked_sub(1) == Some(consecutive_failures) {
        LivenessTransition::WentOffline
    } else {
        LivenessTransition::Unchanged
    };

    let next = if online {
        0
    } else {
        consecutive_failures
            .saturating_add(1)
            .min(max_pings.saturating_add(1))
    };
    (transition, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_half_range_at_center() {
        assert_eq!(ping_interval(25), Duration::from_secs(30));
    }

    #[test]
    fn interval_grows_with_fleet_size() {
        let small = ping_interval(1);
        let large = ping_interval(60);
        assert!(small < ping_interval(25));
        assert!(large > ping_interval(25));
        assert!(large <= Duration::from_secs(60));
        assert!(ping_interval(0) > Duration::ZERO);
    }

    #[test]
    fn erf_matches_reference_values() {
        assert!(erf(0.0).abs() < 1e-6);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-0.5) + 0.520_499_88).abs() < 1e-6);
    }

    #[test]
    fn interval_for_empty_fleet() {
        // erf(-25 / (18 * sqrt 2)) ~= -0.8355
        let secs = ping_interval(0).as_secs_f64();
        assert!((secs - 4.93).abs() < 0.05, "{secs}");
    }

    #[test]
    fn first_failure_goes_offline_once() {
        let (t, count) = evaluate_ping(0, false, 1);
        assert_eq!(t, LivenessTransition::WentOffline);
        assert_eq!(count, 1);

        let (t, count) = evaluate_ping(count, false, 1);
        assert_eq!(t, LivenessTransition::Unchanged);
        assert_eq!(count, 2);

        let (t, count) = evaluate_ping(count, false, 1);
        assert_eq!(t, LivenessTransition::Unchanged);
        assert_eq!(count, 2);
    }

    #[test]
    fn success_after_failures_comes_back_once() {
        let (t, count) = evaluate_ping(2, true, 1);
        assert_eq!(t, LivenessTransition::BackOnline);
        assert_eq!(count, 0);

        let (t, count) = evaluate_ping(count, true, 1);
        assert_eq!(t, LivenessTransition::Unchanged);
        assert_eq!(count, 0);
    }

    #[test]
    fn larger_threshold() {
        // Offline fires when the count before the ping is max - 1.
        assert_eq!(evaluate_ping(0, false, 3).0, LivenessTransition::Unchanged);
        assert_eq!(evaluate_ping(1, false, 3).0, LivenessTransition::Unchanged);
        assert_eq!(evaluate_ping(2, false, 3).0, LivenessTransition::WentOffline);
        assert_eq!(evaluate_ping(3, false, 3), (LivenessTransition::Unchanged, 4));
        assert_eq!(evaluate_ping(4, false, 3), (LivenessTransition::Unchanged, 4));
        assert_eq!(evaluate_ping(2, true, 3), (LivenessTransition::Unchanged, 0));
        assert_eq!(evaluate_ping(3, true, 3), (LivenessTransition::BackOnline, 0));
    }
}
