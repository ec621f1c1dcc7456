//! A sans-IO STOMP client engine.
//!
//! The crate is layered from the wire up:
//! - [`Frame`] with header escaping ([`escape`]) and serialization
//!   ([`codec::encode_frame`]);
//! - [`FrameDecoder`], a resumable parser that turns arbitrarily fragmented
//!   byte chunks into frames;
//! - [`ConnectionEngine`], which runs the CONNECT/CONNECTED handshake,
//!   negotiates heartbeats and serializes outbound frames through a single
//!   FIFO queue. It performs no I/O itself: a transport binding delivers
//!   bytes, ticks and writable events, and implements [`Transport`].
//!
//! [`Client`] is a ready-made tokio TCP binding and [`StompCodec`] plugs the
//! frame format into `tokio_util::codec::Framed`.

pub mod client;
pub mod codec;
pub mod commands;
pub mod connection;
pub mod decoder;
pub mod escape;
pub mod frame;
pub mod handler;
pub mod queue;
pub mod transport;

pub use client::Client;
pub use codec::{StompCodec, StompItem, encode_frame};
pub use commands::AckMode;
pub use connection::{
    ConnError, ConnectOptions, ConnectionEngine, ConnectionState, Heartbeat,
    negotiate_heartbeats, parse_heartbeat_header,
};
pub use decoder::FrameDecoder;
pub use frame::Frame;
pub use handler::{NoopHandler, StompHandler};
pub use queue::OutboundQueue;
pub use transport::Transport;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_frame_display() {
        let f = Frame::new("CONNECT")
            .header("accept-version", "1.1,1.0")
            .set_body(b"hello".to_vec());
        let s = format!("{}", f);
        assert!(s.contains("CONNECT"));
        assert!(s.contains("Body (5 bytes)"));
    }
}
