//! Header presets for client frames.
//!
//! Each function returns a complete `Frame` ready for
//! `ConnectionEngine::send_frame`. Ids are plain arguments; obtain them from
//! `ConnectionEngine::generate_subscription_id` and
//! `ConnectionEngine::generate_transaction_id` when the broker does not
//! dictate them.

use crate::connection::ConnectOptions;
use crate::frame::{Frame, commands, headers};

/// Accept-version advertised when `ConnectOptions` does not override it.
pub const DEFAULT_ACCEPT_VERSION: &str = "1.1,1.0";

/// Subscription acknowledgement modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    #[default]
    Auto,
    Client,
    ClientIndividual,
}

impl AckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AckMode::Auto => "auto",
            AckMode::Client => "client",
            AckMode::ClientIndividual => "client-individual",
        }
    }
}

/// `CONNECT` carrying `accept-version`, `heart-beat` and whatever optional
/// headers `options` sets. Custom headers are applied last and may override
/// the generated ones.
pub fn connect(options: &ConnectOptions) -> Frame {
    let accept_version = options
        .accept_version
        .as_deref()
        .unwrap_or(DEFAULT_ACCEPT_VERSION);

    let mut f = Frame::new(commands::CONNECT)
        .header(headers::ACCEPT_VERSION, accept_version)
        .header(headers::HEART_BEAT, options.heartbeat.to_string());
    if let Some(host) = &options.host {
        f.set_header(headers::HOST, host.as_str());
    }
    if let Some(login) = &options.login {
        f.set_header(headers::LOGIN, login.as_str());
    }
    if let Some(passcode) = &options.passcode {
        f.set_header(headers::PASSCODE, passcode.as_str());
    }
    if let Some(client_id) = &options.client_id {
        f.set_header("client-id", client_id.as_str());
    }
    for (k, v) in &options.headers {
        f.set_header(k.as_str(), v.as_str());
    }
    f
}

/// `SEND` with `content-length` set to the body's byte length.
pub fn send(destination: &str, body: impl Into<Vec<u8>>) -> Frame {
    let body = body.into();
    Frame::new(commands::SEND)
        .header(headers::DESTINATION, destination)
        .header(headers::CONTENT_LENGTH, body.len().to_string())
        .set_body(body)
}

/// `SEND` with a `content-type` header, e.g. `text/plain` or
/// `application/json`. Other headers can be added with [`Frame::header`].
pub fn send_with_type(destination: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Frame {
    send(destination, body).header(headers::CONTENT_TYPE, content_type)
}

/// `SEND` inside a transaction.
pub fn send_in_transaction(destination: &str, transaction: &str, body: impl Into<Vec<u8>>) -> Frame {
    send(destination, body).header(headers::TRANSACTION, transaction)
}

pub fn subscribe(id: &str, destination: &str, ack: AckMode) -> Frame {
    Frame::new(commands::SUBSCRIBE)
        .header(headers::ID, id)
        .header(headers::DESTINATION, destination)
        .header(headers::ACK, ack.as_str())
}

pub fn unsubscribe(id: &str) -> Frame {
    Frame::new(commands::UNSUBSCRIBE).header(headers::ID, id)
}

/// `ACK` for a message received on `subscription`.
///
/// Carries both the 1.1 (`subscription` + `message-id`) and 1.2 (`id`)
/// addressing headers.
pub fn ack(subscription: &str, message_id: &str) -> Frame {
    ack_frame(commands::ACK, subscription, message_id)
}

pub fn nack(subscription: &str, message_id: &str) -> Frame {
    ack_frame(commands::NACK, subscription, message_id)
}

fn ack_frame(command: &str, subscription: &str, message_id: &str) -> Frame {
    Frame::new(command)
        .header(headers::ID, message_id)
        .header(headers::SUBSCRIPTION, subscription)
        .header(headers::MESSAGE_ID, message_id)
}

pub fn begin(transaction: &str) -> Frame {
    Frame::new(commands::BEGIN).header(headers::TRANSACTION, transaction)
}

pub fn commit(transaction: &str) -> Frame {
    Frame::new(commands::COMMIT).header(headers::TRANSACTION, transaction)
}

pub fn abort(transaction: &str) -> Frame {
    Frame::new(commands::ABORT).header(headers::TRANSACTION, transaction)
}

/// `DISCONNECT`, optionally asking the broker for a receipt.
pub fn disconnect(receipt: Option<&str>) -> Frame {
    let f = Frame::new(commands::DISCONNECT);
    match receipt {
        Some(r) => f.header(headers::RECEIPT, r),
        None => f,
    }
}
