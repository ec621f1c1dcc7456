//! Incremental STOMP frame decoder.
//!
//! `FrameDecoder` consumes byte chunks of any size and emits every frame
//! completed by that chunk. All partial state (an unterminated line, the frame
//! being assembled, a partially read body) is kept between calls, so the same
//! byte stream produces the same frames however it is fragmented.

use tracing::{debug, trace, warn};

use crate::escape::unescape_header;
use crate::frame::{Frame, headers};

/// Largest up-front body reservation made from a declared `content-length`.
const MAX_BODY_RESERVE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Reading the command line or header lines.
    AwaitingHeaders,
    /// Header block finished, collecting body bytes.
    ReadingBody,
    /// Body complete, the next byte must be NUL.
    AwaitingTerminator,
    /// A frame was abandoned; skipping input up to the next NUL.
    Resynchronizing,
}

/// Streaming decoder turning byte chunks into `Frame`s.
#[derive(Debug)]
pub struct FrameDecoder {
    state: DecoderState,
    line: Vec<u8>,
    frame: Option<Frame>,
    content_length: Option<usize>,
    body: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::AwaitingHeaders,
            line: Vec::with_capacity(1024),
            frame: None,
            content_length: None,
            body: Vec::new(),
        }
    }

    /// Drop any partial frame and return to the initial state.
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitingHeaders;
        self.line.clear();
        self.frame = None;
        self.content_length = None;
        self.body = Vec::new();
    }

    /// True when no frame is in progress and no partial line is buffered.
    pub fn is_idle(&self) -> bool {
        self.state == DecoderState::AwaitingHeaders && self.frame.is_none() && self.line.is_empty()
    }

    /// Consume `chunk` and return the frames it completed, in arrival order.
    ///
    /// A bare line feed outside a frame is a heartbeat and produces nothing.
    /// Malformed input never fails: bad header lines are dropped, and a frame
    /// whose body is not followed by NUL is discarded while the decoder skips
    /// ahead to the next NUL.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut out = Vec::new();
        let mut pos = 0usize;

        while pos < chunk.len() {
            let rest = &chunk[pos..];
            match self.state {
                DecoderState::AwaitingHeaders => match rest.iter().position(|&b| b == b'\n') {
                    Some(i) => {
                        self.line.extend_from_slice(&rest[..i]);
                        pos += i + 1;
                        self.finish_line();
                    }
                    None => {
                        self.line.extend_from_slice(rest);
                        pos = chunk.len();
                    }
                },
                DecoderState::ReadingBody => match self.content_length {
                    Some(expected) => {
                        let take = (expected - self.body.len()).min(rest.len());
                        self.body.extend_from_slice(&rest[..take]);
                        pos += take;
                        if self.body.len() == expected {
                            self.state = DecoderState::AwaitingTerminator;
                        }
                    }
                    None => match rest.iter().position(|&b| b == 0) {
                        Some(i) => {
                            self.body.extend_from_slice(&rest[..i]);
                            pos += i + 1;
                            out.push(self.complete());
                        }
                        None => {
                            self.body.extend_from_slice(rest);
                            pos = chunk.len();
                        }
                    },
                },
                DecoderState::AwaitingTerminator => {
                    let b = rest[0];
                    pos += 1;
                    if b == 0 {
                        out.push(self.complete());
                    } else {
                        let command = self.frame.as_ref().map(|f| f.command.clone());
                        warn!(
                            ?command,
                            byte = b,
                            "expected NUL after frame body, dropping frame"
                        );
                        self.frame = None;
                        self.content_length = None;
                        self.body = Vec::new();
                        self.state = DecoderState::Resynchronizing;
                    }
                }
                DecoderState::Resynchronizing => match rest.iter().position(|&b| b == 0) {
                    Some(i) => {
                        pos += i + 1;
                        debug!("resynchronized on NUL terminator");
                        self.reset();
                    }
                    None => pos = chunk.len(),
                },
            }
        }

        out
    }

    fn finish_line(&mut self) {
        let mut line = std::mem::take(&mut self.line);
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        if self.frame.is_none() {
            if line.is_empty() {
                trace!("heartbeat received");
            } else {
                self.frame = Some(Frame::new(String::from_utf8_lossy(&line).into_owned()));
            }
            line.clear();
            self.line = line;
            return;
        }

        match self.frame.as_mut() {
            None => {}
            Some(frame) if line.is_empty() => {
                self.content_length = match frame.get_header(headers::CONTENT_LENGTH) {
                    Some(raw) => match raw.trim().parse::<usize>() {
                        Ok(n) => Some(n),
                        Err(_) => {
                            warn!(value = raw, "ignoring unparseable content-length");
                            None
                        }
                    },
                    None => None,
                };
                if let Some(n) = self.content_length {
                    self.body.reserve(n.min(MAX_BODY_RESERVE));
                }
                self.state = match self.content_length {
                    Some(0) => DecoderState::AwaitingTerminator,
                    _ => DecoderState::ReadingBody,
                };
            }
            Some(frame) => match line.iter().position(|&b| b == b':') {
                Some(colon) => {
                    let name = unescape_header(&line[..colon]);
                    let value = unescape_header(&line[colon + 1..]);
                    frame.set_header(
                        String::from_utf8_lossy(&name).into_owned(),
                        String::from_utf8_lossy(&value).into_owned(),
                    );
                }
                None => debug!(
                    line = %String::from_utf8_lossy(&line),
                    "dropping header line without ':'"
                ),
            },
        }

        line.clear();
        self.line = line;
    }

    fn complete(&mut self) -> Frame {
        let mut frame = self.frame.take().unwrap_or_default();
        frame.body = std::mem::take(&mut self.body);
        trace!(command = %frame.command, body_len = frame.body.len(), "frame decoded");
        self.reset();
        frame
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
