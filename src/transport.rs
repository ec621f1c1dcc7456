use std::io;

/// The byte-stream side of a connection, as seen by `ConnectionEngine`.
///
/// Implementations must not call back into the engine from either method.
pub trait Transport {
    /// Best-effort write of one complete serialized buffer.
    fn write_bytes(&self, buf: &[u8]) -> io::Result<()>;

    /// Ask the transport to call `ConnectionEngine::on_writable` soon.
    fn request_writable(&self);
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn write_bytes(&self, buf: &[u8]) -> io::Result<()> {
        (**self).write_bytes(buf)
    }

    fn request_writable(&self) {
        (**self).request_writable()
    }
}
