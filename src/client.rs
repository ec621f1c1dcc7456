//! tokio TCP binding for [`ConnectionEngine`].
//!
//! `Client::connect` opens the socket and spawns one I/O task that owns both
//! halves of the stream. The task feeds inbound bytes to the engine, answers
//! writable requests by calling `on_writable` (re-arming itself while frames
//! are pending), and ticks the engine every 100 ms. Application code keeps a
//! cloneable `Client` handle and submits frames from any task or thread.

use bytes::Bytes;
use futures::StreamExt;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, Notify, broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::{debug, warn};

use crate::commands;
use crate::connection::{ConnError, ConnectOptions, ConnectionEngine, ConnectionState};
use crate::frame::Frame;
use crate::handler::StompHandler;
use crate::transport::Transport;

/// Interval at which the I/O task calls `on_tick`.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// `Transport` that hands buffers to the I/O task over a channel.
///
/// `write_bytes` never blocks; the socket write happens on the I/O task in
/// the order buffers were handed over.
pub struct ChannelTransport {
    writable: Arc<Notify>,
    out: mpsc::UnboundedSender<Bytes>,
}

impl Transport for ChannelTransport {
    fn write_bytes(&self, buf: &[u8]) -> io::Result<()> {
        self.out
            .send(Bytes::copy_from_slice(buf))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "writer task has exited"))
    }

    fn request_writable(&self) {
        self.writable.notify_one();
    }
}

type Engine<H> = ConnectionEngine<ChannelTransport, H>;

/// Handle to a STOMP connection running on a background tokio task.
pub struct Client<H: StompHandler + Send + Sync + 'static> {
    engine: Arc<Engine<H>>,
    shutdown_tx: broadcast::Sender<()>,
    task: Arc<Mutex<Option<JoinHandle<Result<(), ConnError>>>>>,
}

impl<H: StompHandler + Send + Sync + 'static> Clone for Client<H> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            shutdown_tx: self.shutdown_tx.clone(),
            task: self.task.clone(),
        }
    }
}

impl<H: StompHandler + Send + Sync + 'static> Client<H> {
    /// Open a TCP connection to `addr` and start the STOMP handshake.
    ///
    /// Returns once the socket is connected and CONNECT is queued; the
    /// handler's `on_connected` fires when the broker answers.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        options: ConnectOptions,
        handler: H,
    ) -> Result<Self, ConnError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream, options, handler))
    }

    /// Run the engine over an already connected stream.
    pub fn from_stream(stream: TcpStream, options: ConnectOptions, handler: H) -> Self {
        let writable = Arc::new(Notify::new());
        let (out_tx, out_rx) = mpsc::unbounded_channel::<Bytes>();
        let transport = ChannelTransport {
            writable: writable.clone(),
            out: out_tx,
        };
        let engine = Arc::new(ConnectionEngine::with_handler(transport, handler, options));
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

        engine.on_transport_established();

        let task = tokio::spawn(run_io(
            stream,
            engine.clone(),
            writable,
            out_rx,
            shutdown_rx,
        ));

        Client {
            engine,
            shutdown_tx,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// The engine driven by this client, for id generation and inspection.
    pub fn engine(&self) -> &ConnectionEngine<ChannelTransport, H> {
        &self.engine
    }

    pub fn state(&self) -> ConnectionState {
        self.engine.state()
    }

    /// Queue a frame for transmission.
    pub fn send_frame(&self, frame: Frame) -> Result<(), ConnError> {
        if self.engine.state() == ConnectionState::Disconnected {
            return Err(ConnError::Closed);
        }
        self.engine.send_frame(frame);
        Ok(())
    }

    /// Send DISCONNECT, flush pending frames and wait for the I/O task.
    ///
    /// Returns the error that ended the task, if any. Only the first call on
    /// a set of cloned handles waits; later calls return immediately.
    pub async fn close(&self) -> Result<(), ConnError> {
        if self.engine.state() != ConnectionState::Disconnected {
            self.engine.send_frame(commands::disconnect(None));
        }
        let _ = self.shutdown_tx.send(());
        let handle = self.task.lock().await.take();
        match handle {
            Some(h) => h.await.map_err(|e| ConnError::Io(io::Error::other(e)))?,
            None => Ok(()),
        }
    }
}

async fn run_io<H: StompHandler + Send + Sync + 'static>(
    stream: TcpStream,
    engine: Arc<Engine<H>>,
    writable: Arc<Notify>,
    mut out_rx: mpsc::UnboundedReceiver<Bytes>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), ConnError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, BytesCodec::new());
    let mut tick = tokio::time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result = loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                break flush(&engine, &mut out_rx, &mut write_half).await;
            }
            chunk = reader.next() => match chunk {
                Some(Ok(bytes)) => engine.on_bytes_received(&bytes),
                Some(Err(e)) => break Err(ConnError::Io(e)),
                None => {
                    debug!("peer closed the connection");
                    break Ok(());
                }
            },
            _ = writable.notified() => {
                if let Err(e) = engine.on_writable() {
                    break Err(e);
                }
                if engine.has_pending() {
                    writable.notify_one();
                }
            }
            Some(buf) = out_rx.recv() => {
                if let Err(e) = write_half.write_all(&buf).await {
                    break Err(ConnError::Io(e));
                }
            }
            _ = tick.tick() => {
                let now = Instant::now();
                engine.on_tick(now);
                if engine.peer_silent(now) {
                    warn!("no data from broker within the negotiated heartbeat window");
                    break Err(ConnError::Protocol("heartbeat timeout".into()));
                }
            }
        }
    };

    let _ = write_half.shutdown().await;
    engine.on_transport_closed();
    result
}

/// Write everything still queued in the engine and the channel.
async fn flush<H: StompHandler>(
    engine: &Engine<H>,
    out_rx: &mut mpsc::UnboundedReceiver<Bytes>,
    write_half: &mut OwnedWriteHalf,
) -> Result<(), ConnError> {
    while engine.on_writable()? {}
    while let Ok(buf) = out_rx.try_recv() {
        write_half.write_all(&buf).await?;
    }
    write_half.flush().await?;
    Ok(())
}
