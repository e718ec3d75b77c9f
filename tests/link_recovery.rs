//! End-to-end degradation and recovery scenarios for the sensor link.
//!
//! Exercises the full path — transport, parser, monitor, fallback — through
//! the public facade, the way the training application drives it: a steady
//! poll with the device dropping in and out underneath.

use rehalink::link::SensorLink;
use rehalink::transport::{ScriptedOutcome, ScriptedTransport};
use rehalink::types::{ConnectionState, SensorEndpoint};

use std::sync::Arc;

const PAYLOAD: &str =
    r#"{"force": 45.2, "angle": 87.6, "timestamp": 1700000000.0, "quality": 0.95}"#;

fn scripted_link(threshold: u32) -> (SensorLink, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new());
    let link = SensorLink::with_transport(
        Box::new(Arc::clone(&transport)),
        SensorEndpoint::new("192.168.4.1", 80),
        threshold,
    );
    (link, transport)
}

/// A full session: healthy polling, WiFi drop-out, degraded operation on
/// synthetic data, device recovery, healed polling. The caller never sees a
/// single error on the read path.
#[tokio::test]
async fn test_dropout_and_recovery_session() {
    let (link, transport) = scripted_link(3);

    // Device up: connect, then five clean polls.
    transport.push(ScriptedOutcome::Ok);
    transport.push_n(ScriptedOutcome::Payload(PAYLOAD.to_string()), 5);
    link.connect().await.unwrap();
    for _ in 0..5 {
        let reading = link.read_once().await;
        assert_eq!(reading.force, 45.2);
    }
    assert_eq!(link.status().await.state, ConnectionState::Connected);

    // WiFi drops: the first two failures stay Connected (below threshold),
    // the third degrades to Simulating. Every poll still yields a reading.
    transport.push_n(ScriptedOutcome::Refused, 6);
    for i in 0..6 {
        let reading = link.read_once().await;
        assert!(reading.force.is_finite(), "poll {i} produced no reading");
        assert!(reading.quality >= 0.85);
    }
    let status = link.status().await;
    assert_eq!(status.state, ConnectionState::Simulating);
    assert_eq!(status.error_count, 6);

    // Device comes back: the very next successful read heals the link.
    transport.push_n(ScriptedOutcome::Payload(PAYLOAD.to_string()), 2);
    let reading = link.read_once().await;
    assert_eq!(reading.force, 45.2);
    let status = link.status().await;
    assert_eq!(status.state, ConnectionState::Connected);
    assert_eq!(status.error_count, 0);

    // And stays healthy.
    let reading = link.read_once().await;
    assert_eq!(reading.angle, 87.6);
}

/// Intermittent failures below the threshold never degrade the link: each
/// success resets the counter.
#[tokio::test]
async fn test_intermittent_failures_below_threshold_stay_connected() {
    let (link, transport) = scripted_link(3);
    transport.push(ScriptedOutcome::Ok);
    link.connect().await.unwrap();

    for _ in 0..4 {
        transport.push_n(ScriptedOutcome::TimedOut, 2);
        transport.push(ScriptedOutcome::Payload(PAYLOAD.to_string()));
        link.read_once().await;
        link.read_once().await;
        let reading = link.read_once().await;
        assert_eq!(reading.force, 45.2);
    }

    let status = link.status().await;
    assert_eq!(status.state, ConnectionState::Connected);
    assert_eq!(status.error_count, 0);
}

/// Malformed payloads count toward degradation exactly like network
/// failures — three bad bodies take the link down.
#[tokio::test]
async fn test_malformed_payload_streak_degrades() {
    let (link, transport) = scripted_link(3);
    transport.push(ScriptedOutcome::Ok);
    link.connect().await.unwrap();

    let bad_payloads = [
        r#"{"force": "NaN", "angle": 87.6, "timestamp": 1.0, "quality": 0.9}"#,
        r#"{"angle": 87.6, "timestamp": 1.0, "quality": 0.9}"#,
        r#"{"force": 45.2, "angle": 87.6, "timestamp": 1.0, "quality": 1.7}"#,
    ];
    for payload in bad_payloads {
        transport.push(ScriptedOutcome::Payload(payload.to_string()));
        let reading = link.read_once().await;
        // Fallback reading, never the malformed values.
        assert!((10.0..=100.0).contains(&reading.force));
    }

    assert_eq!(link.status().await.state, ConnectionState::Simulating);
}

/// Mixed failure kinds accumulate into one consecutive-failure streak.
#[tokio::test]
async fn test_mixed_failure_kinds_share_the_counter() {
    let (link, transport) = scripted_link(3);
    transport.push(ScriptedOutcome::Ok);
    link.connect().await.unwrap();

    transport.push(ScriptedOutcome::TimedOut);
    transport.push(ScriptedOutcome::Rejected(500));
    transport.push(ScriptedOutcome::Payload("not json".to_string()));
    for _ in 0..3 {
        link.read_once().await;
    }

    let status = link.status().await;
    assert_eq!(status.state, ConnectionState::Simulating);
    assert_eq!(status.error_count, 3);
}

/// While degraded, command sending still reports definite outcomes.
#[tokio::test]
async fn test_commands_surface_failures_while_simulating() {
    let (link, transport) = scripted_link(1);
    transport.push(ScriptedOutcome::Ok);
    link.connect().await.unwrap();

    transport.push(ScriptedOutcome::Refused);
    link.read_once().await;
    assert_eq!(link.status().await.state, ConnectionState::Simulating);

    transport.push(ScriptedOutcome::Refused);
    let request = rehalink::types::CommandRequest {
        command: "exit".to_string(),
        mode: "training".to_string(),
        force: 0.0,
        angle: 90.0,
    };
    assert!(link.send_command(&request).await.is_err());

    // Reads keep flowing regardless.
    let reading = link.read_once().await;
    assert!(reading.quality >= 0.85);
}
