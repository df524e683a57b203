// SPDX-License-Identifier: MPL-2.0

//! Demo program: drive a simulated Restore through the in-memory shadow.
//!
//! Registers the Restores of a canned device list, bootstraps their reported
//! state, sends a few controls, lets the simulated device accept them, and
//! prints the resulting session events. Once the session runs in its own
//! task, further controls go through its control channel.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example simulated_restore
//! ```

use std::sync::Arc;
use std::time::Duration;

use hatch_restore::event::DeviceEvent;
use hatch_restore::manager::{
    ClientId, ControlRequest, DeviceControl, RestoreSession, SessionConfig,
};
use hatch_restore::{DiscoveredDevice, MemoryTransport};
use serde_json::json;
use tokio::sync::mpsc;

const THING: &str = "restore-nursery";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = SessionConfig::default().with_bootstrap(false);
    println!("Client id: {}", ClientId::for_account("parent@example.com"));

    let (transport, updates) = MemoryTransport::new(config.update_capacity);
    let transport = Arc::new(transport);
    let mut session = RestoreSession::new(Arc::clone(&transport), config);

    let list = DiscoveredDevice::parse_list(&json!({"payload": [
        {"product": "restore", "name": "Nursery", "thingName": THING, "macAddress": "AA:BB:CC:DD:EE:01"},
        {"product": "restoreV5", "name": "Bedroom", "thingName": "restore-v5", "macAddress": "AA:BB:CC:DD:EE:02"},
    ]}));
    let added = session.add_discovered(&list);
    println!("Registered {added} Restore(s): {:?}", session.thing_names());

    transport.set_reported(
        THING,
        json!({
            "connected": true,
            "deviceInfo": {"f": "5.2.1"},
            "content": {"playing": "none"},
            "color": {"enabled": false, "id": 9, "i": 32767},
            "sound": {"enabled": false, "id": 2, "v": 0},
        }),
    );
    session.bootstrap();

    if let Some(device) = session.device_mut(THING) {
        println!(
            "Bootstrapped {}: online={} brightness={}%",
            device.device_name(),
            device.is_online(),
            device.light_brightness_percent()
        );
        device.set_light_brightness_percent(75.0);
        device.set_sound_enabled(true);
    }
    for patch in transport.published(THING) {
        println!("Published desired: {patch}");
    }

    let mut events = session.subscribe();
    let (controls, control_rx) = mpsc::channel(8);
    let runner = tokio::spawn(async move {
        session.run_with_controls(updates, control_rx).await;
    });

    transport.accept_desired(THING)?;
    transport.report(THING, json!({"sound": {"v": 48000}}))?;

    controls
        .send(ControlRequest::new(THING, DeviceControl::SetColorId(12)))
        .await?;
    controls
        .send(ControlRequest::new(THING, DeviceControl::TurnOff))
        .await?;

    for _ in 0..2 {
        match tokio::time::timeout(Duration::from_secs(1), events.recv()).await {
            Ok(Ok(DeviceEvent::StateUpdated { summary, changed, .. })) => {
                println!("State updated (changed={changed}): {}", serde_json::to_string(&summary)?);
            }
            Ok(Ok(other)) => println!("Event: {other:?}"),
            Ok(Err(e)) => {
                println!("Event stream ended: {e}");
                break;
            }
            Err(_) => {
                println!("No event within one second");
                break;
            }
        }
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    for patch in transport.published(THING).iter().skip(2) {
        println!("Published desired while running: {patch}");
    }

    runner.abort();
    println!("Done!");
    Ok(())
}
