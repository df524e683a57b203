// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for sessions driving several Restores over the
//! in-memory shadow.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hatch_restore::event::DeviceEvent;
use hatch_restore::manager::{RestoreSession, SessionConfig};
use hatch_restore::subscription::Subscribable;
use hatch_restore::types::{Level, Playing};
use hatch_restore::{DeviceIdentity, DiscoveredDevice, Error, MemoryTransport};
use serde_json::json;
use tokio::sync::mpsc;

fn identity(thing_name: &str) -> DeviceIdentity {
    DeviceIdentity::new(format!("Restore {thing_name}"), thing_name, "AA:BB:CC:DD:EE:FF")
}

fn session_with(
    config: SessionConfig,
) -> (
    RestoreSession<MemoryTransport>,
    Arc<MemoryTransport>,
    mpsc::Receiver<hatch_restore::ShadowUpdate>,
) {
    let (transport, updates) = MemoryTransport::new(config.update_capacity);
    let transport = Arc::new(transport);
    (
        RestoreSession::new(Arc::clone(&transport), config),
        transport,
        updates,
    )
}

// ============================================================================
// Device Registration
// ============================================================================

mod registration {
    use super::*;

    #[test]
    fn discovered_devices_become_sessions_entries() {
        let (mut session, _, _updates) = session_with(SessionConfig::default());
        let list = DiscoveredDevice::parse_list(&json!({"payload": [
            {"product": "restore", "name": "Nursery", "thingName": "t-1", "macAddress": "m1"},
            {"product": "restore", "name": "Bedroom", "thingName": "t-2", "macAddress": "m2"},
            {"product": "riot", "name": "Rest", "thingName": "t-3", "macAddress": "m3"},
            {"product": "restore", "name": "Broken", "thingName": "t-4"},
        ]}));

        assert_eq!(session.add_discovered(&list), 2);
        assert_eq!(session.thing_names(), vec!["t-1", "t-2"]);
        assert_eq!(session.device("t-2").unwrap().device_name(), "Bedroom");
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let (mut session, _, _updates) = session_with(SessionConfig::default());
        session.add_device(identity("t-1")).unwrap();

        assert!(matches!(
            session.add_device(identity("t-1")),
            Err(Error::DuplicateDevice(name)) if name == "t-1"
        ));
    }

    #[test]
    fn entities_are_named_after_the_device() {
        let (mut session, _, _updates) = session_with(SessionConfig::default());
        session.add_device(identity("t-1")).unwrap();

        let names: Vec<String> = session
            .device("t-1")
            .unwrap()
            .entities()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names[0], "Restore t-1 Light");
        assert_eq!(names[5], "Restore t-1 Sound Media");
    }
}

// ============================================================================
// Update Routing
// ============================================================================

mod update_routing {
    use super::*;

    #[tokio::test]
    async fn reported_updates_apply_in_order() {
        let config = SessionConfig::default().with_bootstrap(false);
        let (mut session, transport, updates) = session_with(config);
        session.add_device(identity("t-1")).unwrap();
        session.add_device(identity("t-2")).unwrap();

        transport.report("t-1", json!({"sound": {"v": 100}})).unwrap();
        transport.report("t-2", json!({"connected": true})).unwrap();
        transport.report("t-9", json!({"connected": true})).unwrap();
        transport.report("t-1", json!({"sound": {"v": 300}})).unwrap();

        let (tx, rx) = mpsc::channel(8);
        let mut updates = updates;
        while let Ok(update) = updates.try_recv() {
            tx.send(update).await.unwrap();
        }
        drop(tx);

        assert_eq!(session.run(rx).await, 3);
        assert_eq!(
            session.device("t-1").unwrap().state().sound_volume(),
            Level::new(300)
        );
        assert!(session.device("t-2").unwrap().is_online());
    }

    #[tokio::test]
    async fn state_updates_are_broadcast() {
        let (mut session, transport, mut updates) = session_with(SessionConfig::default());
        session.add_device(identity("t-1")).unwrap();
        let mut events = session.subscribe();

        transport
            .report("t-1", json!({"content": {"playing": "remote"}, "color": {"enabled": true}}))
            .unwrap();
        let update = updates.recv().await.unwrap();
        assert!(session.dispatch(&update).unwrap());

        match events.recv().await.unwrap() {
            DeviceEvent::StateUpdated { summary, changed, .. } => {
                assert!(changed);
                assert!(summary.is_on);
                assert_eq!(summary.current_playing, Playing::Remote);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_thing_is_an_error() {
        let (mut session, _, _updates) = session_with(SessionConfig::default());
        let update = hatch_restore::ShadowUpdate::new("ghost", json!({}));
        assert!(matches!(
            session.dispatch(&update),
            Err(Error::DeviceNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn callbacks_fire_once_per_merge() {
        let (mut session, _, _updates) = session_with(SessionConfig::default());
        session.add_device(identity("t-1")).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        session.device("t-1").unwrap().on_update(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for volume in [0, 0, 5] {
            let update = hatch_restore::ShadowUpdate::new("t-1", json!({"sound": {"v": volume}}));
            session.dispatch(&update).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}

// ============================================================================
// Round Trip Through The Shadow
// ============================================================================

mod round_trip {
    use super::*;

    #[tokio::test]
    async fn bootstrap_then_control_then_accept() {
        let (mut session, transport, mut updates) = session_with(SessionConfig::default());
        session.add_device(identity("t-1")).unwrap();
        transport.set_reported(
            "t-1",
            json!({
                "connected": true,
                "deviceInfo": {"f": 61},
                "sound": {"enabled": false, "id": 4, "v": 20000},
            }),
        );

        assert_eq!(session.bootstrap(), 1);
        let device = session.device_mut("t-1").unwrap();
        assert_eq!(device.state().firmware_version(), Some("61"));

        device.set_sound_volume_percent(0.0);
        device.set_sound_enabled(true);
        let patch = transport.last_published("t-1").unwrap();
        assert_eq!(patch["sound"]["v"], json!(20000));

        assert!(transport.accept_desired("t-1").unwrap());
        let update = updates.recv().await.unwrap();
        session.dispatch(&update).unwrap();

        let device = session.device("t-1").unwrap();
        assert!(device.state().sound_enabled());
        assert_eq!(device.current_playing(), &Playing::Remote);
        assert_eq!(device.summary().firmware_version.as_deref(), Some("61"));
    }

    #[test]
    fn shutdown_drops_listeners() {
        let (mut session, _, _updates) = session_with(SessionConfig::default());
        session.add_device(identity("t-1")).unwrap();
        session.device("t-1").unwrap().on_update(|| {});

        let mut events = session.subscribe();
        session.shutdown();

        assert!(session.is_empty());
        assert!(matches!(
            events.try_recv().unwrap(),
            DeviceEvent::DeviceRemoved { thing_name } if thing_name == "t-1"
        ));
    }
}
