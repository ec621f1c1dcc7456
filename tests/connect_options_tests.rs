//! Tests for ConnectOptions and the CONNECT frame built from them.

use stomp_engine::commands::{self, DEFAULT_ACCEPT_VERSION};
use stomp_engine::{ConnectOptions, Heartbeat};

// ============================================================================
// Builder tests
// ============================================================================

#[test]
fn connect_options_default() {
    let opts = ConnectOptions::new();
    assert_eq!(opts, ConnectOptions::default());
    assert!(opts.accept_version.is_none());
    assert!(opts.host.is_none());
    assert!(opts.login.is_none());
    assert!(opts.passcode.is_none());
    assert!(opts.client_id.is_none());
    assert!(opts.headers.is_empty());
    assert_eq!(opts.heartbeat, Heartbeat::new(10000, 10000));
}

#[test]
fn connect_options_builder_chain() {
    let opts = ConnectOptions::new()
        .accept_version("1.1")
        .host("/production")
        .credentials("admin", "s3cret")
        .client_id("durable-1")
        .heartbeat(Heartbeat::disabled())
        .header("x-custom", "value");

    assert_eq!(opts.accept_version.as_deref(), Some("1.1"));
    assert_eq!(opts.host.as_deref(), Some("/production"));
    assert_eq!(opts.login.as_deref(), Some("admin"));
    assert_eq!(opts.passcode.as_deref(), Some("s3cret"));
    assert_eq!(opts.client_id.as_deref(), Some("durable-1"));
    assert_eq!(opts.heartbeat, Heartbeat::new(0, 0));
    assert_eq!(
        opts.headers,
        vec![("x-custom".to_string(), "value".to_string())]
    );
}

#[test]
fn connect_options_headers_keep_order() {
    let opts = ConnectOptions::new()
        .header("key1", "value1")
        .header("key2", "value2")
        .header("key3", "value3");
    let keys: Vec<&str> = opts.headers.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["key1", "key2", "key3"]);
}

#[test]
fn connect_options_empty_values_allowed() {
    let opts = ConnectOptions::new().client_id("").host("");
    assert_eq!(opts.client_id, Some(String::new()));
    assert_eq!(opts.host, Some(String::new()));
}

// ============================================================================
// CONNECT frame
// ============================================================================

#[test]
fn connect_frame_defaults() {
    let frame = commands::connect(&ConnectOptions::default());
    assert_eq!(frame.command, "CONNECT");
    assert_eq!(frame.get_header("accept-version"), Some(DEFAULT_ACCEPT_VERSION));
    assert_eq!(frame.get_header("accept-version"), Some("1.1,1.0"));
    assert_eq!(frame.get_header("heart-beat"), Some("10000,10000"));
    assert!(!frame.has_header("host"));
    assert!(!frame.has_header("login"));
    assert!(!frame.has_header("passcode"));
    assert!(frame.body.is_empty());
}

#[test]
fn connect_frame_carries_optional_headers() {
    let opts = ConnectOptions::new()
        .host("vhost")
        .credentials("guest", "guest")
        .client_id("app-1")
        .heartbeat(Heartbeat::new(5000, 0));
    let frame = commands::connect(&opts);
    assert_eq!(frame.get_header("host"), Some("vhost"));
    assert_eq!(frame.get_header("login"), Some("guest"));
    assert_eq!(frame.get_header("passcode"), Some("guest"));
    assert_eq!(frame.get_header("client-id"), Some("app-1"));
    assert_eq!(frame.get_header("heart-beat"), Some("5000,0"));
}

#[test]
fn connect_frame_accept_version_override() {
    let opts = ConnectOptions::new().accept_version("1.0");
    let frame = commands::connect(&opts);
    assert_eq!(frame.get_header("accept-version"), Some("1.0"));
}

#[test]
fn connect_frame_custom_headers_override_generated() {
    let opts = ConnectOptions::new()
        .header("activemq.prefetchSize", "1")
        .header("Heart-Beat", "0,0");
    let frame = commands::connect(&opts);
    assert_eq!(frame.get_header("activemq.prefetchsize"), Some("1"));
    assert_eq!(frame.get_header("heart-beat"), Some("0,0"));
    let heart_beats = frame
        .headers()
        .iter()
        .filter(|(k, _)| k == "heart-beat")
        .count();
    assert_eq!(heart_beats, 1);
}
