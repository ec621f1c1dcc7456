use bytes::{BufMut, Bytes, BytesMut};
use std::collections::VecDeque;
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::decoder::FrameDecoder;
use crate::escape::escape_header;
use crate::frame::{Frame, headers};

/// Wire form of a heartbeat: a single line feed outside any frame.
pub const HEARTBEAT: &[u8] = b"\n";

/// Serialize a frame into its wire representation.
///
/// Layout: `COMMAND\n`, one `name:value\n` line per header (both sides
/// escaped), an empty line, the body, and a trailing NUL. When the frame has
/// no `content-length` and its body contains NUL or is not valid UTF-8, one
/// is appended so the receiver does not cut the body short.
pub fn encode_frame(frame: &Frame) -> Bytes {
    let mut dst = BytesMut::with_capacity(frame.command.len() + frame.body.len() + 64);
    encode_frame_into(frame, &mut dst);
    dst.freeze()
}

/// Append the wire representation of `frame` to `dst`.
pub fn encode_frame_into(frame: &Frame, dst: &mut BytesMut) {
    debug_assert!(
        frame.command_is_valid(),
        "frame command must be a non-empty single line: {:?}",
        frame.command
    );
    dst.extend_from_slice(frame.command.as_bytes());
    dst.put_u8(b'\n');
    for (k, v) in frame.headers() {
        dst.extend_from_slice(&escape_header(k.as_bytes()));
        dst.put_u8(b':');
        dst.extend_from_slice(&escape_header(v.as_bytes()));
        dst.put_u8(b'\n');
    }
    if needs_content_length(frame) {
        dst.extend_from_slice(headers::CONTENT_LENGTH.as_bytes());
        dst.put_u8(b':');
        dst.extend_from_slice(frame.body.len().to_string().as_bytes());
        dst.put_u8(b'\n');
    }
    dst.put_u8(b'\n');
    dst.extend_from_slice(&frame.body);
    dst.put_u8(0);
}

fn needs_content_length(frame: &Frame) -> bool {
    !frame.has_header(headers::CONTENT_LENGTH)
        && (frame.body.contains(&0) || std::str::from_utf8(&frame.body).is_err())
}

/// Items accepted by the `StompCodec` encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StompItem {
    /// A STOMP frame (command + headers + body)
    Frame(Frame),
    /// A single heartbeat pulse (LF)
    Heartbeat,
}

/// `tokio_util` codec over [`FrameDecoder`] and [`encode_frame`].
///
/// Decoding yields `StompItem::Frame` only; heartbeats are absorbed by the
/// decoder. Every byte handed to `decode` is consumed immediately and any
/// partial frame is carried inside the decoder.
#[derive(Debug, Default)]
pub struct StompCodec {
    decoder: FrameDecoder,
    ready: VecDeque<Frame>,
}

impl StompCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for StompCodec {
    type Item = StompItem;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            let chunk = src.split();
            self.ready.extend(self.decoder.feed(&chunk));
        }
        Ok(self.ready.pop_front().map(StompItem::Frame))
    }
}

impl Encoder<StompItem> for StompCodec {
    type Error = io::Error;

    fn encode(&mut self, item: StompItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            StompItem::Heartbeat => dst.extend_from_slice(HEARTBEAT),
            StompItem::Frame(frame) => encode_frame_into(&frame, dst),
        }
        Ok(())
    }
}
