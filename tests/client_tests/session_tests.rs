//! Client session tests

use ackrelay::client::{Client, Control};
use ackrelay::protocol::decode_command;
use ackrelay::{Config, InputEvent, RelayError};

use crate::common::{RecordingConsole, ScriptedLink};

fn config() -> Config {
    Config::builder()
        .max_attempts(3)
        .ack_timeout_ms(100)
        .idle_poll_ms(5)
        .build()
}

fn sent_sequences(link: &ScriptedLink) -> Vec<(u32, String)> {
    link.sent()
        .iter()
        .map(|frame| {
            let packet = decode_command(frame).unwrap();
            (packet.sequence, packet.payload)
        })
        .collect()
}

// =============================================================================
// Submit
// =============================================================================

#[test]
fn test_moves_are_queued_with_increasing_sequence() {
    let link = ScriptedLink::new();
    let mut client = Client::new(&link, &config());

    assert_eq!(client.submit(InputEvent::MoveUp), Control::Continue);
    assert_eq!(client.submit(InputEvent::MoveRight), Control::Continue);

    assert_eq!(client.queue().len(), 2);
    assert_eq!(client.next_sequence(), 2);
    assert_eq!(link.transmissions(), 0);
}

#[test]
fn test_unrecognized_consumes_no_sequence() {
    let link = ScriptedLink::new();
    let mut client = Client::new(&link, &config());

    client.submit(InputEvent::Unrecognized);
    client.submit(InputEvent::MoveDown);

    assert_eq!(client.queue().len(), 1);
    assert_eq!(client.next_sequence(), 1);
}

#[test]
fn test_quit_requests_termination() {
    let link = ScriptedLink::new();
    let mut client = Client::new(&link, &config());
    assert_eq!(client.submit(InputEvent::Quit), Control::Quit);
    assert!(client.queue().is_empty());
}

// =============================================================================
// Pump
// =============================================================================

#[test]
fn test_pump_sends_oldest_first() {
    let link = ScriptedLink::new()
        .then_reply(&[b"ACK 0"])
        .then_reply(&[b"ACK 1"]);
    let mut client = Client::new(&link, &config());
    let mut console = RecordingConsole::default();

    client.submit(InputEvent::MoveLeft);
    client.submit(InputEvent::MoveUp);

    assert!(client.pump(&mut console).unwrap().is_ok());
    assert!(client.pump(&mut console).unwrap().is_ok());
    assert!(client.pump(&mut console).is_none());

    assert_eq!(
        sent_sequences(&link),
        vec![(0, "MOVE LEFT".to_string()), (1, "MOVE UP".to_string())]
    );
    assert_eq!(
        console.statuses,
        vec!["ACK received for Seq: 0", "ACK received for Seq: 1"]
    );
}

#[test]
fn test_failed_delivery_drops_command_and_continues() {
    let link = ScriptedLink::new()
        .then_silence()
        .then_silence()
        .then_silence()
        .then_reply(&[b"ACK 1"]);
    let mut client = Client::new(&link, &config());
    let mut console = RecordingConsole::default();

    client.submit(InputEvent::MoveUp);
    client.submit(InputEvent::MoveDown);

    let first = client.pump(&mut console).unwrap();
    assert!(matches!(
        first,
        Err(RelayError::DeliveryFailed { sequence: 0, attempts: 3 })
    ));
    assert!(client.pump(&mut console).unwrap().is_ok());

    assert_eq!(link.transmissions(), 4);
    assert_eq!(
        console.statuses,
        vec![
            "ACK not received for Seq: 0, retrying...",
            "ACK not received for Seq: 0, retrying...",
            "Failed to receive ACK for Seq: 0 after 3 attempts.",
            "ACK received for Seq: 1",
        ]
    );
}

#[test]
fn test_each_lost_attempt_is_reported_before_the_ack() {
    let link = ScriptedLink::new()
        .then_silence()
        .then_silence()
        .then_reply(&[b"ACK 0"]);
    let mut client = Client::new(&link, &config());
    let mut console = RecordingConsole::default();

    client.submit(InputEvent::MoveRight);
    let delivery = client.pump(&mut console).unwrap().unwrap();

    assert_eq!(delivery.attempts, 3);
    assert_eq!(
        console.statuses,
        vec![
            "ACK not received for Seq: 0, retrying...",
            "ACK not received for Seq: 0, retrying...",
            "ACK received for Seq: 0",
        ]
    );
}

#[test]
fn test_handshake_uses_sequence_zero() {
    let link = ScriptedLink::new().then_reply(&[b"ACK 0"]);
    let mut client = Client::new(&link, &config());
    let mut console = RecordingConsole::default();

    let delivery = client.handshake("HELLO", &mut console).unwrap();

    assert_eq!(delivery.sequence, 0);
    assert_eq!(client.next_sequence(), 1);
    assert_eq!(sent_sequences(&link), vec![(0, "HELLO".to_string())]);
}

#[test]
fn test_ack_lookalike_handshake_is_refused_before_sending() {
    let link = ScriptedLink::new();
    let mut client = Client::new(&link, &config());
    let mut console = RecordingConsole::default();

    let result = client.handshake("ACK 1", &mut console);

    assert!(matches!(result, Err(RelayError::InvalidPayload(_))));
    assert_eq!(link.transmissions(), 0);
    assert_eq!(console.statuses.len(), 1);
    assert!(console.statuses[0].starts_with("Could not send Seq: 0"));
}

// =============================================================================
// Broadcast Drain
// =============================================================================

#[test]
fn test_drain_shows_broadcasts_and_skips_late_acks() {
    let link = ScriptedLink::new();
    link.preload(b"MOVE UP");
    link.preload(b"ACK 3");
    link.preload(b"MOVE LEFT");
    let mut client = Client::new(&link, &config());
    let mut console = RecordingConsole::default();

    assert_eq!(client.drain_broadcasts(&mut console), 2);
    assert_eq!(console.broadcasts, vec!["MOVE UP", "MOVE LEFT"]);
}

// =============================================================================
// Run Loop
// =============================================================================

#[test]
fn test_run_sends_burst_in_order_then_quits() {
    let link = ScriptedLink::new()
        .then_reply(&[b"ACK 0"])
        .then_reply(&[b"ACK 1"])
        .then_reply(&[b"ACK 2"]);
    let mut client = Client::new(&link, &config());
    let mut console = RecordingConsole::default();

    let (tx, rx) = crossbeam::channel::unbounded();
    for event in [
        InputEvent::MoveUp,
        InputEvent::Unrecognized,
        InputEvent::MoveDown,
        InputEvent::MoveRight,
    ] {
        tx.send(event).unwrap();
    }
    drop(tx);

    client.run(&rx, &mut console).unwrap();

    assert_eq!(
        sent_sequences(&link),
        vec![
            (0, "MOVE UP".to_string()),
            (1, "MOVE DOWN".to_string()),
            (2, "MOVE RIGHT".to_string()),
        ]
    );
    assert_eq!(console.statuses.len(), 3);
}

#[test]
fn test_run_stops_at_quit_without_sending_later_input() {
    let link = ScriptedLink::new().then_reply(&[b"ACK 0"]);
    let mut client = Client::new(&link, &config());
    let mut console = RecordingConsole::default();

    let (tx, rx) = crossbeam::channel::unbounded();
    tx.send(InputEvent::Quit).unwrap();
    tx.send(InputEvent::MoveUp).unwrap();

    client.run(&rx, &mut console).unwrap();

    assert_eq!(link.transmissions(), 0);
}

#[test]
fn test_run_sends_configured_handshake_first() {
    let link = ScriptedLink::new()
        .then_reply(&[b"ACK 0"])
        .then_reply(&[b"ACK 1"]);
    let config = Config::builder()
        .ack_timeout_ms(100)
        .idle_poll_ms(5)
        .handshake("JOIN")
        .build();
    let mut client = Client::new(&link, &config);
    let mut console = RecordingConsole::default();

    let (tx, rx) = crossbeam::channel::unbounded();
    tx.send(InputEvent::MoveLeft).unwrap();
    drop(tx);

    client.run(&rx, &mut console).unwrap();

    assert_eq!(
        sent_sequences(&link),
        vec![(0, "JOIN".to_string()), (1, "MOVE LEFT".to_string())]
    );
}
