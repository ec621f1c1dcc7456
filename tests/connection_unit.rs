//! Unit tests for connection-related types.
//!
//! Engine behavior driven through a mock transport lives in engine_unit.rs;
//! this file covers the public value types and error handling.

use std::io;
use stomp_engine::{AckMode, ConnError, ConnectionState};

// =============================================================================
// AckMode Tests
// =============================================================================

#[test]
fn ack_mode_wire_values() {
    assert_eq!(AckMode::Auto.as_str(), "auto");
    assert_eq!(AckMode::Client.as_str(), "client");
    assert_eq!(AckMode::ClientIndividual.as_str(), "client-individual");
}

#[test]
fn ack_mode_defaults_to_auto() {
    assert_eq!(AckMode::default(), AckMode::Auto);
}

#[test]
fn ack_mode_copy_and_eq() {
    let mode = AckMode::Client;
    let copied = mode;
    assert_eq!(mode, copied);
    assert_ne!(AckMode::Auto, AckMode::Client);
    assert_ne!(AckMode::Client, AckMode::ClientIndividual);
}

// =============================================================================
// ConnectionState Tests
// =============================================================================

#[test]
fn connection_state_debug_and_eq() {
    assert_eq!(format!("{:?}", ConnectionState::Connecting), "Connecting");
    assert_ne!(ConnectionState::Connected, ConnectionState::Disconnected);
}

// =============================================================================
// ConnError Tests
// =============================================================================

#[test]
fn conn_error_io_display() {
    let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    let display = ConnError::Io(io_err).to_string();
    assert!(display.contains("io error"));
    assert!(display.contains("connection refused"));
}

#[test]
fn conn_error_protocol_display() {
    let display = ConnError::Protocol("heartbeat timeout".to_string()).to_string();
    assert_eq!(display, "protocol error: heartbeat timeout");
}

#[test]
fn conn_error_closed_display() {
    assert_eq!(ConnError::Closed.to_string(), "connection closed");
}

#[test]
fn conn_error_io_from() {
    let io_err = io::Error::new(io::ErrorKind::TimedOut, "timeout");
    let conn_err: ConnError = io_err.into();
    match conn_err {
        ConnError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
        other => panic!("expected Io variant, got {:?}", other),
    }
}

#[test]
fn conn_error_is_error_trait() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<ConnError>();
}
