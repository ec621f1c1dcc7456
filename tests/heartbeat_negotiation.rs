//! Tests for heart-beat header parsing and interval negotiation.

use std::time::Duration;
use stomp_engine::{Heartbeat, negotiate_heartbeats, parse_heartbeat_header};

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn parse_well_formed() {
    assert_eq!(parse_heartbeat_header("10000,20000"), (10000, 20000));
    assert_eq!(parse_heartbeat_header("0,0"), (0, 0));
}

#[test]
fn parse_tolerates_whitespace() {
    assert_eq!(parse_heartbeat_header(" 100 , 200 "), (100, 200));
}

#[test]
fn parse_missing_or_invalid_fields_are_zero() {
    assert_eq!(parse_heartbeat_header(""), (0, 0));
    assert_eq!(parse_heartbeat_header("500"), (500, 0));
    assert_eq!(parse_heartbeat_header("abc,300"), (0, 300));
    assert_eq!(parse_heartbeat_header("-1,x"), (0, 0));
}

#[test]
fn heartbeat_parse_and_display() {
    let hb = Heartbeat::parse("1500,2500");
    assert_eq!(hb, Heartbeat::new(1500, 2500));
    assert_eq!(hb.to_string(), "1500,2500");
    assert_eq!(Heartbeat::default().to_string(), "10000,10000");
}

#[test]
fn heartbeat_from_duration() {
    let hb = Heartbeat::from_duration(Duration::from_secs(3));
    assert_eq!(hb, Heartbeat::new(3000, 3000));
    assert_eq!(Heartbeat::disabled(), Heartbeat::new(0, 0));
}

#[test]
fn heartbeat_from_huge_duration_saturates() {
    let hb = Heartbeat::from_duration(Duration::MAX);
    assert_eq!(hb, Heartbeat::new(u64::MAX, u64::MAX));
}

// ============================================================================
// Negotiation
// ============================================================================

#[test]
fn negotiate_takes_larger_interval_per_direction() {
    // client 10000,10000 against server 20000,5000
    let (send, expect) = negotiate_heartbeats(10000, 10000, 20000, 5000);
    assert_eq!(send, Some(Duration::from_millis(10000)));
    assert_eq!(expect, Some(Duration::from_millis(20000)));
}

#[test]
fn negotiate_both_disabled() {
    assert_eq!(negotiate_heartbeats(0, 0, 0, 0), (None, None));
}

#[test]
fn negotiate_one_side_zero_uses_other() {
    let (send, expect) = negotiate_heartbeats(0, 0, 4000, 3000);
    assert_eq!(send, Some(Duration::from_millis(3000)));
    assert_eq!(expect, Some(Duration::from_millis(4000)));

    let (send, expect) = negotiate_heartbeats(7000, 0, 0, 0);
    assert_eq!(send, Some(Duration::from_millis(7000)));
    assert_eq!(expect, None);
}
