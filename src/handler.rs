use crate::frame::Frame;

/// Application callbacks invoked by `ConnectionEngine`.
///
/// Every method defaults to a no-op. Callbacks run on whatever context drives
/// the engine (usually the transport's I/O task), so they should return
/// quickly; they may call `send_frame` on the same engine.
pub trait StompHandler {
    /// The server accepted the handshake with this `CONNECTED` frame.
    fn on_connected(&self, _frame: &Frame) {}

    /// An inbound `MESSAGE` frame.
    fn on_message(&self, _frame: &Frame) {}

    /// The transport reported the connection closed.
    fn on_closed(&self) {}

    /// Any inbound frame other than `CONNECTED` and `MESSAGE` (for example
    /// `RECEIPT` or `ERROR`).
    fn on_frame(&self, _frame: &Frame) {}
}

/// Handler that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl StompHandler for NoopHandler {}

impl<H: StompHandler + ?Sized> StompHandler for std::sync::Arc<H> {
    fn on_connected(&self, frame: &Frame) {
        (**self).on_connected(frame)
    }

    fn on_message(&self, frame: &Frame) {
        (**self).on_message(frame)
    }

    fn on_closed(&self) {
        (**self).on_closed()
    }

    fn on_frame(&self, frame: &Frame) {
        (**self).on_frame(frame)
    }
}
