//! Tests for the client frame presets.

use stomp_engine::{AckMode, commands};

// =============================================================================
// SEND
// =============================================================================

#[test]
fn send_sets_destination_and_length() {
    let frame = commands::send("/queue/a", "héllo");
    assert_eq!(frame.command, "SEND");
    assert_eq!(frame.destination(), Some("/queue/a"));
    assert_eq!(frame.get_header("content-length"), Some("6"));
    assert!(!frame.has_header("content-type"));
}

#[test]
fn send_with_type_sets_content_type() {
    let frame = commands::send_with_type("/queue/a", "application/json", "{}");
    assert_eq!(frame.content_type(), Some("application/json"));
    assert_eq!(frame.get_header("content-length"), Some("2"));
    assert_eq!(frame.body, b"{}");
}

// =============================================================================
// Subscriptions and acknowledgements
// =============================================================================

#[test]
fn subscribe_and_unsubscribe() {
    let frame = commands::subscribe("sub-0", "/topic/t", AckMode::ClientIndividual);
    assert_eq!(frame.command, "SUBSCRIBE");
    assert_eq!(frame.get_header("id"), Some("sub-0"));
    assert_eq!(frame.destination(), Some("/topic/t"));
    assert_eq!(frame.get_header("ack"), Some("client-individual"));

    let frame = commands::unsubscribe("sub-0");
    assert_eq!(frame.command, "UNSUBSCRIBE");
    assert_eq!(frame.get_header("id"), Some("sub-0"));
}

#[test]
fn ack_and_nack_carry_both_addressing_styles() {
    for (frame, command) in [
        (commands::ack("sub-1", "m-7"), "ACK"),
        (commands::nack("sub-1", "m-7"), "NACK"),
    ] {
        assert_eq!(frame.command, command);
        assert_eq!(frame.get_header("id"), Some("m-7"));
        assert_eq!(frame.subscription(), Some("sub-1"));
        assert_eq!(frame.message_id(), Some("m-7"));
    }
}

#[test]
fn disconnect_with_and_without_receipt() {
    assert!(commands::disconnect(None).headers().is_empty());
    let frame = commands::disconnect(Some("bye"));
    assert_eq!(frame.command, "DISCONNECT");
    assert_eq!(frame.get_header("receipt"), Some("bye"));
}
