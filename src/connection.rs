use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::codec::{HEARTBEAT, encode_frame};
use crate::commands;
use crate::decoder::FrameDecoder;
use crate::frame::{self, Frame};
use crate::handler::{NoopHandler, StompHandler};
use crate::queue::OutboundQueue;
use crate::transport::Transport;

/// Errors returned by connection operations.
#[derive(Error, Debug)]
pub enum ConnError {
    /// I/O-level error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Protocol-level error
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The connection has already been shut down
    #[error("connection closed")]
    Closed,
}

/// Lifecycle of one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// CONNECT queued, waiting for CONNECTED.
    Connecting,
    Connected,
}

/// Client heartbeat proposal, in milliseconds.
///
/// `send_ms` is how often the client offers to send heartbeats, `receive_ms`
/// how often it wants to receive them. Zero disables that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub send_ms: u64,
    pub receive_ms: u64,
}

impl Heartbeat {
    pub fn new(send_ms: u64, receive_ms: u64) -> Self {
        Self {
            send_ms,
            receive_ms,
        }
    }

    /// No heartbeats in either direction.
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    /// Same interval in both directions.
    pub fn from_duration(interval: Duration) -> Self {
        let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        Self::new(ms, ms)
    }

    /// Parse a `heart-beat` header value; see [`parse_heartbeat_header`].
    pub fn parse(header: &str) -> Self {
        let (send_ms, receive_ms) = parse_heartbeat_header(header);
        Self::new(send_ms, receive_ms)
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new(10000, 10000)
    }
}

impl fmt::Display for Heartbeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.send_ms, self.receive_ms)
    }
}

/// Settings used to build the CONNECT frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Overrides the default `accept-version` of `1.1,1.0`.
    pub accept_version: Option<String>,
    pub host: Option<String>,
    pub login: Option<String>,
    pub passcode: Option<String>,
    /// Broker-specific `client-id` (durable subscriptions on ActiveMQ).
    pub client_id: Option<String>,
    pub heartbeat: Heartbeat,
    /// Extra CONNECT headers, applied after the generated ones.
    pub headers: Vec<(String, String)>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept_version(mut self, version: impl Into<String>) -> Self {
        self.accept_version = Some(version.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn credentials(mut self, login: impl Into<String>, passcode: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self.passcode = Some(passcode.into());
        self
    }

    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    pub fn heartbeat(mut self, heartbeat: Heartbeat) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Parse the STOMP `heart-beat` header value (format: "cx,cy").
///
/// Returns a tuple `(cx, cy)` where each value is the heartbeat interval in
/// milliseconds. Missing or invalid fields default to `0`.
pub fn parse_heartbeat_header(header: &str) -> (u64, u64) {
    let mut parts = header.split(',');
    let cx = parts
        .next()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let cy = parts
        .next()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    (cx, cy)
}

/// Negotiate heartbeat intervals between client and server.
///
/// Parameters
/// - `client_out`: how often the client offers to send heartbeats (ms).
/// - `client_in`: how often the client wants to receive heartbeats (ms).
/// - `server_out`: server's advertised outgoing interval (ms).
/// - `server_in`: server's advertised incoming interval (ms).
///
/// Returns `(outgoing, incoming)`: each is the larger of the two matching
/// values, or `None` when both of them are 0.
pub fn negotiate_heartbeats(
    client_out: u64,
    client_in: u64,
    server_out: u64,
    server_in: u64,
) -> (Option<Duration>, Option<Duration>) {
    let negotiated_out_ms = std::cmp::max(client_out, server_in);
    let negotiated_in_ms = std::cmp::max(client_in, server_out);

    let outgoing = if negotiated_out_ms == 0 {
        None
    } else {
        Some(Duration::from_millis(negotiated_out_ms))
    };
    let incoming = if negotiated_in_ms == 0 {
        None
    } else {
        Some(Duration::from_millis(negotiated_in_ms))
    };
    (outgoing, incoming)
}

#[derive(Debug)]
struct HeartbeatState {
    send_interval: Option<Duration>,
    expect_interval: Option<Duration>,
    last_sent_at: Instant,
    last_received_at: Instant,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sans-IO STOMP client connection.
///
/// The engine owns no socket, thread or timer. A transport binding drives it
/// through the `on_*` entry points and supplies a [`Transport`] for writes and
/// write wake-ups; inbound frames are reported to a [`StompHandler`].
///
/// Every method takes `&self`. Application threads may call `send_frame` and
/// the id generators while the I/O context drives the `on_*` methods. The
/// outbound queue lock is never held while calling into the transport or the
/// handler.
pub struct ConnectionEngine<T: Transport, H: StompHandler = NoopHandler> {
    transport: T,
    handler: H,
    options: ConnectOptions,
    state: Mutex<ConnectionState>,
    decoder: Mutex<FrameDecoder>,
    heartbeat: Mutex<HeartbeatState>,
    queue: OutboundQueue,
    sub_id_counter: AtomicU64,
    tx_id_counter: AtomicU64,
}

impl<T: Transport> ConnectionEngine<T, NoopHandler> {
    /// Engine with default options that ignores inbound events.
    pub fn new(transport: T) -> Self {
        Self::with_handler(transport, NoopHandler, ConnectOptions::default())
    }
}

impl<T: Transport, H: StompHandler> ConnectionEngine<T, H> {
    pub fn with_handler(transport: T, handler: H, options: ConnectOptions) -> Self {
        let now = Instant::now();
        Self {
            transport,
            handler,
            options,
            state: Mutex::new(ConnectionState::Disconnected),
            decoder: Mutex::new(FrameDecoder::new()),
            heartbeat: Mutex::new(HeartbeatState {
                send_interval: None,
                expect_interval: None,
                last_sent_at: now,
                last_received_at: now,
            }),
            queue: OutboundQueue::new(),
            sub_id_counter: AtomicU64::new(0),
            tx_id_counter: AtomicU64::new(0),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    pub fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    fn set_state(&self, next: ConnectionState) -> ConnectionState {
        let mut state = lock(&self.state);
        let previous = *state;
        *state = next;
        if previous != next {
            debug!(?previous, ?next, "connection state changed");
        }
        previous
    }

    /// Negotiated `(send, expect)` heartbeat intervals; `None` when disabled
    /// or not yet connected.
    pub fn heartbeat(&self) -> (Option<Duration>, Option<Duration>) {
        let hb = lock(&self.heartbeat);
        (hb.send_interval, hb.expect_interval)
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// The transport is up: queue the CONNECT frame. Anything submitted while
    /// disconnected is discarded so CONNECT is the first frame written.
    pub fn on_transport_established(&self) {
        lock(&self.decoder).reset();
        {
            let mut hb = lock(&self.heartbeat);
            let now = Instant::now();
            hb.send_interval = None;
            hb.expect_interval = None;
            hb.last_sent_at = now;
            hb.last_received_at = now;
        }
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!(dropped, "discarded frames queued before CONNECT");
        }
        self.set_state(ConnectionState::Connecting);
        self.send_frame(commands::connect(&self.options));
    }

    /// Feed inbound bytes and dispatch every frame they complete.
    pub fn on_bytes_received(&self, chunk: &[u8]) {
        let now = Instant::now();
        lock(&self.heartbeat).last_received_at = now;

        let frames = lock(&self.decoder).feed(chunk);
        for f in frames {
            self.dispatch(f, now);
        }
    }

    fn dispatch(&self, f: Frame, now: Instant) {
        trace!(command = %f.command, "inbound frame");
        match f.command.as_str() {
            frame::commands::CONNECTED => {
                let (sx, sy) = f
                    .get_header(frame::headers::HEART_BEAT)
                    .map(parse_heartbeat_header)
                    .unwrap_or((0, 0));
                let client = self.options.heartbeat;
                let (send, expect) =
                    negotiate_heartbeats(client.send_ms, client.receive_ms, sx, sy);
                {
                    let mut hb = lock(&self.heartbeat);
                    hb.send_interval = send;
                    hb.expect_interval = expect;
                    hb.last_sent_at = now;
                }
                self.set_state(ConnectionState::Connected);
                debug!(?send, ?expect, "handshake complete");
                self.handler.on_connected(&f);
            }
            frame::commands::MESSAGE => self.handler.on_message(&f),
            _ => self.handler.on_frame(&f),
        }
    }

    /// Periodic poll: send a heartbeat when one is due and re-arm the writer
    /// while frames are pending.
    ///
    /// A due heartbeat is skipped while the queue is non-empty; the pending
    /// bytes keep the connection alive once written.
    pub fn on_tick(&self, now: Instant) {
        if self.state() == ConnectionState::Connected {
            let idle = self.queue.is_empty();
            let due = {
                let mut hb = lock(&self.heartbeat);
                match hb.send_interval {
                    Some(interval) if now.saturating_duration_since(hb.last_sent_at) >= interval => {
                        hb.last_sent_at = now;
                        idle
                    }
                    _ => false,
                }
            };
            if due {
                trace!("queueing heartbeat");
                self.queue.push(Bytes::from_static(HEARTBEAT));
            }
        }

        if !self.queue.is_empty() {
            self.transport.request_writable();
        }
    }

    /// Write at most one pending buffer.
    ///
    /// Returns `Ok(true)` when a buffer was written and `Ok(false)` when the
    /// queue was empty. A failed buffer is dropped, not re-queued.
    pub fn on_writable(&self) -> Result<bool, ConnError> {
        let Some(buf) = self.queue.pop() else {
            return Ok(false);
        };
        match self.transport.write_bytes(&buf) {
            Ok(()) => {
                trace!(len = buf.len(), "buffer written");
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, len = buf.len(), "write failed, buffer dropped");
                Err(ConnError::Io(e))
            }
        }
    }

    /// The transport closed. Resets the engine so the next
    /// `on_transport_established` starts a clean handshake, then notifies the
    /// handler.
    pub fn on_transport_closed(&self) {
        self.set_state(ConnectionState::Disconnected);
        lock(&self.decoder).reset();
        {
            let mut hb = lock(&self.heartbeat);
            hb.send_interval = None;
            hb.expect_interval = None;
        }
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!(dropped, "discarded unsent buffers on close");
        }
        self.handler.on_closed();
    }

    /// Serialize `frame` and queue it behind everything already pending.
    ///
    /// A frame whose command is empty or spans several lines cannot be
    /// framed on the wire; it is dropped with a warning.
    pub fn send_frame(&self, frame: Frame) {
        if !frame.command_is_valid() {
            warn!(command = ?frame.command, "refusing to send frame with invalid command");
            return;
        }
        trace!(command = %frame.command, "queueing frame");
        self.queue.push(encode_frame(&frame));
        self.transport.request_writable();
    }

    /// True when the server was expected to send something (data or
    /// heartbeat) and has been silent for more than twice the negotiated
    /// interval. The engine only reports this; closing is up to the binding.
    pub fn peer_silent(&self, now: Instant) -> bool {
        let hb = lock(&self.heartbeat);
        match hb.expect_interval {
            Some(interval) => now.saturating_duration_since(hb.last_received_at) > interval * 2,
            None => false,
        }
    }

    /// Next subscription id for this connection: `sub-<hex>`.
    pub fn generate_subscription_id(&self) -> String {
        format!("sub-{:x}", self.sub_id_counter.fetch_add(1, Ordering::SeqCst))
    }

    /// Next transaction id for this connection: `tx-<hex>`.
    pub fn generate_transaction_id(&self) -> String {
        format!("tx-{:x}", self.tx_id_counter.fetch_add(1, Ordering::SeqCst))
    }
}
