// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriptions, liveness polling and device state reads and writes.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{FakeController, node};
use matter_link::cluster::ids::{fan_control, level_control, on_off};
use matter_link::controller::{AttributeData, AttributePath, NodeReport};
use matter_link::sync::{SyncEvent, ping_interval};
use matter_link::types::{Brightness, FanMode, FanSpeed};
use matter_link::{
    AttributeKey, ClientConfig, DeviceStateSnapshot, DeviceStateSyncEngine, DeviceType, NodeId,
    StateValue,
};
use tokio::sync::mpsc;

fn engine() -> (Arc<FakeController>, DeviceStateSyncEngine<FakeController>) {
    let controller = Arc::new(FakeController::new());
    let engine = DeviceStateSyncEngine::new(Arc::clone(&controller), ClientConfig::default());
    (controller, engine)
}

fn control(cluster: u32, attribute: u32) -> AttributePath {
    AttributePath::new(1, cluster, attribute)
}

async fn subscribed(
    engine: &DeviceStateSyncEngine<FakeController>,
    device_id: NodeId,
    device_type: DeviceType,
) -> mpsc::UnboundedReceiver<SyncEvent> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    engine.subscribe(device_id, device_type, tx).await.unwrap();
    match rx.recv().await {
        Some(SyncEvent::SubscriptionEstablished { .. }) => rx,
        other => panic!("expected subscription, got {other:?}"),
    }
}

fn expect_report(event: Option<SyncEvent>) -> DeviceStateSnapshot {
    match event {
        Some(SyncEvent::Report { snapshot, .. }) => snapshot,
        other => panic!("expected report, got {other:?}"),
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

mod subscriptions {
    use super::*;

    #[tokio::test]
    async fn subscribe_reports_establishment() {
        let (controller, engine) = engine();
        let (tx, mut rx) = mpsc::unbounded_channel();

        engine
            .subscribe(node(1), DeviceType::Socket, tx)
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await,
            Some(SyncEvent::SubscriptionEstablished {
                device_id: node(1),
                subscription_id: 1,
            })
        );
        assert_eq!(engine.subscription_id(node(1)), Some(1));
        assert_eq!(engine.tracked_devices(), vec![node(1)]);
        assert!(engine.is_polling());
        assert_eq!(controller.subscribes(), 1);
    }

    #[tokio::test]
    async fn reports_become_snapshots() {
        let (controller, engine) = engine();
        let mut rx = subscribed(&engine, node(2), DeviceType::DimmableLight).await;

        controller.push_report(
            node(2),
            NodeReport::new()
                .with(control(on_off::CLUSTER, on_off::ON_OFF), true.into())
                .with(
                    control(level_control::CLUSTER, level_control::CURRENT_LEVEL),
                    254u8.into(),
                ),
        );

        let snapshot = expect_report(rx.recv().await);
        assert_eq!(snapshot.is_online(), Some(true));
        assert_eq!(snapshot.switch(), Some(true));
        assert_eq!(snapshot.brightness(), Some(Brightness::clamped(100)));
    }

    #[tokio::test]
    async fn report_values_outside_device_type_are_dropped() {
        let (controller, engine) = engine();
        let mut rx = subscribed(&engine, node(3), DeviceType::Socket).await;

        controller.push_report(
            node(3),
            NodeReport::new()
                .with(control(on_off::CLUSTER, on_off::ON_OFF), false.into())
                .with(
                    control(level_control::CLUSTER, level_control::CURRENT_LEVEL),
                    10u8.into(),
                ),
        );

        let snapshot = expect_report(rx.recv().await);
        assert_eq!(snapshot.switch(), Some(false));
        assert!(!snapshot.contains(AttributeKey::Brightness));
    }

    #[tokio::test]
    async fn resubscribing_replaces_listener() {
        let (controller, engine) = engine();
        let mut first = subscribed(&engine, node(4), DeviceType::Socket).await;
        let mut second = subscribed(&engine, node(4), DeviceType::Socket).await;

        controller.push_report(
            node(4),
            NodeReport::new().with(control(on_off::CLUSTER, on_off::ON_OFF), true.into()),
        );

        expect_report(second.recv().await);
        assert!(first.try_recv().is_err());
        assert_eq!(engine.tracked_devices(), vec![node(4)]);
    }

    #[tokio::test]
    async fn unreachable_device_stays_tracked() {
        let (controller, engine) = engine();
        controller.set_reachable(node(5), false);
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(engine.subscribe(node(5), DeviceType::Socket, tx).await.is_err());
        assert_eq!(engine.tracked_devices(), vec![node(5)]);
        assert_eq!(engine.subscription_id(node(5)), None);
    }

    #[tokio::test]
    async fn resubscribing_shuts_down_replaced_subscription() {
        let (controller, engine) = engine();
        controller.set_fabrics(node(12), 5, 1);
        let _first = subscribed(&engine, node(12), DeviceType::Socket).await;
        let _second = subscribed(&engine, node(12), DeviceType::Socket).await;

        assert_eq!(controller.subscribes(), 2);
        assert_eq!(*controller.shutdowns.lock(), vec![(1, node(12), Some(1))]);
        assert_eq!(engine.subscription_id(node(12)), Some(2));
    }

    #[tokio::test]
    async fn subscription_holds_its_handle_until_unsubscribed() {
        let (controller, engine) = engine();
        controller.set_fabrics(node(13), 5, 1);
        let _rx = subscribed(&engine, node(13), DeviceType::Socket).await;

        assert_eq!(controller.connect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.released.load(Ordering::SeqCst), 0);

        engine.unsubscribe(node(13)).await.unwrap();
        assert_eq!(
            controller.released.load(Ordering::SeqCst),
            controller.connect_calls.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn replaced_subscription_releases_its_handle() {
        let (controller, engine) = engine();
        controller.set_fabrics(node(14), 5, 1);
        let _first = subscribed(&engine, node(14), DeviceType::Socket).await;
        let _second = subscribed(&engine, node(14), DeviceType::Socket).await;

        // Only the live subscription's handle is still held
        assert_eq!(
            controller.released.load(Ordering::SeqCst) + 1,
            controller.connect_calls.load(Ordering::SeqCst)
        );

        engine.unsubscribe_all();
        assert_eq!(
            controller.released.load(Ordering::SeqCst),
            controller.connect_calls.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn unsubscribe_shuts_down_on_current_fabric() {
        let (controller, engine) = engine();
        controller.set_fabrics(node(6), 5, 1);
        let _rx = subscribed(&engine, node(6), DeviceType::Socket).await;

        engine.unsubscribe(node(6)).await.unwrap();

        assert_eq!(*controller.shutdowns.lock(), vec![(1, node(6), None)]);
        assert!(engine.tracked_devices().is_empty());
        assert!(!engine.is_polling());
    }

    #[tokio::test]
    async fn unsubscribe_one_subscription() {
        let (controller, engine) = engine();
        controller.set_fabrics(node(7), 5, 1);
        let _rx = subscribed(&engine, node(7), DeviceType::Socket).await;

        engine.unsubscribe_subscription(node(7), 9).await.unwrap();
        assert_eq!(*controller.shutdowns.lock(), vec![(1, node(7), Some(9))]);
    }

    #[tokio::test]
    async fn unsubscribe_unknown_device_is_a_no_op() {
        let (controller, engine) = engine();
        engine.unsubscribe(node(8)).await.unwrap();
        assert!(controller.shutdowns.lock().is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_without_fabric_index_still_untracks() {
        let (controller, engine) = engine();
        let _rx = subscribed(&engine, node(9), DeviceType::Socket).await;

        assert!(engine.unsubscribe(node(9)).await.is_err());
        assert!(engine.tracked_devices().is_empty());
        assert!(controller.shutdowns.lock().is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_all_clears_everything() {
        let (controller, engine) = engine();
        let _a = subscribed(&engine, node(10), DeviceType::Socket).await;
        let _b = subscribed(&engine, node(11), DeviceType::Fan).await;
        assert_eq!(engine.tracked_devices(), vec![node(10), node(11)]);

        engine.unsubscribe_all();

        assert!(engine.tracked_devices().is_empty());
        assert!(!engine.is_polling());
        assert_eq!(controller.shutdown_all_calls.load(Ordering::SeqCst), 1);
    }
}

// ============================================================================
// Liveness
// ============================================================================

mod liveness {
    use super::*;

    #[tokio::test]
    async fn offline_then_back_online() {
        let (controller, engine) = engine();
        let mut rx = subscribed(&engine, node(20), DeviceType::Socket).await;

        controller.set_reachable(node(20), false);
        engine.poll_liveness().await;
        let snapshot = expect_report(rx.try_recv().ok());
        assert_eq!(snapshot, DeviceStateSnapshot::online(DeviceType::Socket, false));
        assert_eq!(engine.consecutive_offline_pings(node(20)), Some(1));

        engine.poll_liveness().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.consecutive_offline_pings(node(20)), Some(2));

        controller.set_reachable(node(20), true);
        engine.poll_liveness().await;
        let snapshot = expect_report(rx.try_recv().ok());
        assert_eq!(snapshot.is_online(), Some(true));
        assert_eq!(engine.consecutive_offline_pings(node(20)), Some(0));

        assert_eq!(
            rx.recv().await,
            Some(SyncEvent::SubscriptionEstablished {
                device_id: node(20),
                subscription_id: 2,
            })
        );
        assert_eq!(controller.subscribes(), 2);
    }

    #[tokio::test]
    async fn back_online_shuts_down_stale_subscription() {
        let (controller, engine) = engine();
        controller.set_fabrics(node(25), 5, 1);
        let mut rx = subscribed(&engine, node(25), DeviceType::Socket).await;

        controller.set_reachable(node(25), false);
        engine.poll_liveness().await;
        controller.set_reachable(node(25), true);
        engine.poll_liveness().await;

        expect_report(rx.try_recv().ok());
        expect_report(rx.try_recv().ok());
        assert_eq!(
            rx.recv().await,
            Some(SyncEvent::SubscriptionEstablished {
                device_id: node(25),
                subscription_id: 2,
            })
        );
        assert_eq!(*controller.shutdowns.lock(), vec![(1, node(25), Some(1))]);
    }

    #[tokio::test]
    async fn failed_subscription_is_retried_once_device_answers() {
        let (controller, engine) = engine();
        controller.set_reachable(node(26), false);
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(engine.subscribe(node(26), DeviceType::Socket, tx).await.is_err());
        assert_eq!(controller.subscribes(), 0);

        controller.set_reachable(node(26), true);
        engine.poll_liveness().await;

        assert_eq!(
            rx.recv().await,
            Some(SyncEvent::SubscriptionEstablished {
                device_id: node(26),
                subscription_id: 1,
            })
        );
        assert_eq!(controller.subscribes(), 1);
        assert_eq!(engine.subscription_id(node(26)), Some(1));

        engine.poll_liveness().await;
        engine.poll_liveness().await;
        assert_eq!(controller.subscribes(), 1);
    }

    #[tokio::test]
    async fn answering_device_reports_nothing() {
        let (_controller, engine) = engine();
        let mut rx = subscribed(&engine, node(21), DeviceType::Socket).await;

        engine.poll_liveness().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.consecutive_offline_pings(node(21)), Some(0));
    }

    #[tokio::test]
    async fn threshold_counts_failed_pings() {
        let controller = Arc::new(FakeController::new());
        let engine = DeviceStateSyncEngine::new(
            Arc::clone(&controller),
            ClientConfig::default().with_max_device_pings(3),
        );
        let mut rx = subscribed(&engine, node(22), DeviceType::Socket).await;
        controller.set_reachable(node(22), false);

        engine.poll_liveness().await;
        engine.poll_liveness().await;
        assert!(rx.try_recv().is_err());

        engine.poll_liveness().await;
        let snapshot = expect_report(rx.try_recv().ok());
        assert_eq!(snapshot.is_online(), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn background_loop_pings_devices() {
        let (controller, engine) = engine();
        controller.set_reachable(node(23), false);
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(engine.subscribe(node(23), DeviceType::Fan, tx).await.is_err());
        assert!(engine.is_polling());

        let event = tokio::time::timeout(ping_interval(1) * 2, rx.recv())
            .await
            .unwrap();
        let snapshot = expect_report(event);
        assert_eq!(snapshot, DeviceStateSnapshot::online(DeviceType::Fan, false));
    }

    #[tokio::test]
    async fn is_device_online_pings() {
        let (controller, engine) = engine();
        assert!(engine.is_device_online(node(24)).await);
        controller.set_reachable(node(24), false);
        assert!(!engine.is_device_online(node(24)).await);
    }
}

// ============================================================================
// Reads and writes
// ============================================================================

mod reads_and_writes {
    use super::*;

    #[tokio::test]
    async fn reads_every_supported_attribute() {
        let (controller, engine) = engine();
        controller.set_attribute(node(30), control(on_off::CLUSTER, on_off::ON_OFF), true.into());
        controller.set_attribute(
            node(30),
            control(level_control::CLUSTER, level_control::CURRENT_LEVEL),
            127u8.into(),
        );

        let snapshot = engine
            .read_device_states(node(30), DeviceType::DimmableSocket)
            .await;
        assert_eq!(snapshot.is_online(), Some(true));
        assert_eq!(snapshot.switch(), Some(true));
        assert_eq!(snapshot.brightness(), Some(Brightness::clamped(50)));
    }

    #[tokio::test]
    async fn failed_read_is_offline() {
        let (controller, engine) = engine();
        controller.set_attribute(node(31), control(on_off::CLUSTER, on_off::ON_OFF), true.into());

        let snapshot = engine
            .read_device_states(node(31), DeviceType::DimmableSocket)
            .await;
        assert_eq!(snapshot, DeviceStateSnapshot::online(DeviceType::DimmableSocket, false));
    }

    #[tokio::test]
    async fn fan_switch_follows_fan_mode() {
        let (controller, engine) = engine();
        controller.set_attribute(
            node(32),
            control(fan_control::CLUSTER, fan_control::FAN_MODE),
            3u8.into(),
        );
        controller.set_attribute(
            node(32),
            control(fan_control::CLUSTER, fan_control::PERCENT_SETTING),
            60u8.into(),
        );

        let snapshot = engine.read_device_states(node(32), DeviceType::Fan).await;
        assert_eq!(snapshot.switch(), Some(true));
        assert_eq!(snapshot.fan_mode(), Some(FanMode::High));
        assert_eq!(snapshot.fan_speed(), Some(FanSpeed::clamped(60)));
    }

    #[tokio::test]
    async fn single_read() {
        let (controller, engine) = engine();
        controller.set_attribute(node(33), control(on_off::CLUSTER, on_off::ON_OFF), false.into());

        let value = engine
            .read_device_state(node(33), DeviceType::Socket, AttributeKey::Switch)
            .await
            .unwrap();
        assert_eq!(value, Some(StateValue::Switch(false)));

        let value = engine
            .read_device_state(node(33), DeviceType::Socket, AttributeKey::Brightness)
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn switch_write_invokes_on_off() {
        let (controller, engine) = engine();

        let written = engine
            .write_device_state(node(34), DeviceType::Socket, StateValue::Switch(true))
            .await
            .unwrap();

        assert!(written);
        let invokes = controller.invokes();
        assert_eq!(invokes.len(), 1);
        assert_eq!(invokes[0].path.cluster, on_off::CLUSTER);
        assert_eq!(invokes[0].path.command, on_off::ON);
    }

    #[tokio::test]
    async fn fan_switch_write_sets_fan_mode() {
        let (controller, engine) = engine();

        engine
            .write_device_state(node(35), DeviceType::Fan, StateValue::Switch(false))
            .await
            .unwrap();

        assert!(controller.invokes().is_empty());
        assert_eq!(
            controller.attribute(node(35), control(fan_control::CLUSTER, fan_control::FAN_MODE)),
            Some(AttributeData::from(0u8))
        );
    }

    #[tokio::test]
    async fn unsupported_writes_are_skipped() {
        let (controller, engine) = engine();

        let online = engine
            .write_device_state(node(36), DeviceType::Socket, StateValue::Online(true))
            .await
            .unwrap();
        let brightness = engine
            .write_device_state(
                node(36),
                DeviceType::Socket,
                StateValue::Brightness(Brightness::clamped(10)),
            )
            .await
            .unwrap();

        assert!(!online);
        assert!(!brightness);
        assert!(controller.invokes().is_empty());
        assert!(controller.writes.lock().is_empty());
    }

    #[tokio::test]
    async fn write_to_unreachable_device_fails() {
        let (controller, engine) = engine();
        controller.set_reachable(node(37), false);

        let result = engine
            .write_device_state(node(37), DeviceType::Socket, StateValue::Switch(true))
            .await;
        assert!(result.is_err());
    }
}

#[test]
fn ping_interval_grows_with_fleet() {
    assert!(ping_interval(1) < ping_interval(50));
    assert!(ping_interval(50) <= Duration::from_secs(60));
}
