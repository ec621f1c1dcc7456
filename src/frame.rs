use std::fmt;

/// Well-known STOMP command names.
pub mod commands {
    pub const CONNECT: &str = "CONNECT";
    pub const CONNECTED: &str = "CONNECTED";
    pub const SEND: &str = "SEND";
    pub const SUBSCRIBE: &str = "SUBSCRIBE";
    pub const UNSUBSCRIBE: &str = "UNSUBSCRIBE";
    pub const ACK: &str = "ACK";
    pub const NACK: &str = "NACK";
    pub const BEGIN: &str = "BEGIN";
    pub const COMMIT: &str = "COMMIT";
    pub const ABORT: &str = "ABORT";
    pub const DISCONNECT: &str = "DISCONNECT";
    pub const MESSAGE: &str = "MESSAGE";
    pub const RECEIPT: &str = "RECEIPT";
    pub const ERROR: &str = "ERROR";
}

/// Well-known header names (already lower-cased).
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const ACCEPT_VERSION: &str = "accept-version";
    pub const HEART_BEAT: &str = "heart-beat";
    pub const HOST: &str = "host";
    pub const LOGIN: &str = "login";
    pub const PASSCODE: &str = "passcode";
    pub const DESTINATION: &str = "destination";
    pub const SUBSCRIPTION: &str = "subscription";
    pub const MESSAGE_ID: &str = "message-id";
    pub const TRANSACTION: &str = "transaction";
    pub const RECEIPT: &str = "receipt";
    pub const ID: &str = "id";
    pub const ACK: &str = "ack";
}

/// One STOMP frame: command, headers and raw body bytes.
///
/// Header names are stored lower-cased. Setting a header that already exists
/// replaces its value, so a name appears at most once. Headers keep the order
/// in which they were first set, which makes encoding deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// STOMP command (e.g. CONNECT, SEND, MESSAGE)
    pub command: String,
    headers: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl Frame {
    /// Create a new frame with the given command and empty headers/body.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Add a header (builder style).
    ///
    /// Returns the mutated `Frame` allowing builder-style chaining.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    /// Set a header in place. The name is lower-cased; an existing value for
    /// the same name is overwritten.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_lowercase();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
    }

    /// Remove a header, returning its previous value.
    pub fn remove_header(&mut self, key: &str) -> Option<String> {
        let key = key.to_lowercase();
        let idx = self.headers.iter().position(|(k, _)| *k == key)?;
        Some(self.headers.remove(idx).1)
    }

    /// Set the frame body (builder style).
    pub fn set_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get the value of a header by name (case-insensitive).
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// True when the command is non-empty and fits on a single line.
    pub fn command_is_valid(&self) -> bool {
        !self.command.is_empty() && !self.command.contains(['\n', '\r', '\0'])
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.get_header(key).is_some()
    }

    /// Headers as `(name, value)` pairs in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn destination(&self) -> Option<&str> {
        self.get_header(headers::DESTINATION)
    }

    pub fn subscription(&self) -> Option<&str> {
        self.get_header(headers::SUBSCRIPTION)
    }

    pub fn message_id(&self) -> Option<&str> {
        self.get_header(headers::MESSAGE_ID)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get_header(headers::CONTENT_TYPE)
    }

    /// Declared `content-length`, or the body length when the header is
    /// absent or not a valid integer.
    pub fn content_length(&self) -> usize {
        self.get_header(headers::CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(self.body.len())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Command: {}", self.command)?;
        for (k, v) in &self.headers {
            writeln!(f, "{}: {}", k, v)?;
        }
        writeln!(f, "Body ({} bytes)", self.body.len())
    }
}
