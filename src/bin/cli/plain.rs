use chrono::Local;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use stomp_engine::{Client, ConnError, ConnectOptions, Frame, Heartbeat, StompHandler};
use tokio::sync::{mpsc, watch};

use super::args::Cli;
use super::commands::{CommandResult, Subscriptions, execute_command, help_text, subscribe};
use super::exit_codes;

/// Outcome of the CONNECT/CONNECTED exchange as seen by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Handshake {
    Pending,
    Connected(String),
    Rejected(String),
    Closed,
}

/// Prints inbound traffic and reports handshake progress.
struct ConsoleHandler {
    handshake: watch::Sender<Handshake>,
}

impl StompHandler for ConsoleHandler {
    fn on_connected(&self, frame: &Frame) {
        let version = frame.get_header("version").unwrap_or("1.0").to_string();
        self.handshake.send_replace(Handshake::Connected(version));
    }

    fn on_message(&self, frame: &Frame) {
        let dest = frame.destination().unwrap_or("?");
        println!("\n[{}] [{}] MESSAGE received:", timestamp(), dest);
        for (k, v) in frame.headers() {
            println!("  {}: {}", k, v);
        }
        if !frame.body.is_empty() {
            match std::str::from_utf8(&frame.body) {
                Ok(s) => println!("  Body: {}", s),
                Err(_) => println!("  Body: ({} bytes, binary)", frame.body.len()),
            }
        }
        prompt();
    }

    fn on_frame(&self, frame: &Frame) {
        if frame.command != "ERROR" {
            return;
        }
        let message = frame.get_header("message").unwrap_or("unknown error").to_string();
        if *self.handshake.borrow() == Handshake::Pending {
            self.handshake.send_replace(Handshake::Rejected(message));
            return;
        }
        eprintln!("\n[{}] [BROKER ERROR] {}", timestamp(), message);
        for (k, v) in frame.headers() {
            eprintln!("  {}: {}", k, v);
        }
        prompt();
    }

    fn on_closed(&self) {
        self.handshake.send_replace(Handshake::Closed);
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S%.3f").to_string()
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

/// Run the CLI in plain (line-oriented) mode
pub async fn run(cli: &Cli) -> Result<(), (String, u8)> {
    println!("Connecting to {}...", cli.address);

    let mut options = ConnectOptions::new()
        .credentials(cli.login.as_str(), cli.passcode.as_str())
        .heartbeat(Heartbeat::parse(&cli.heartbeat));
    if let Some(host) = &cli.host {
        options = options.host(host.as_str());
    }

    let (hs_tx, mut hs_rx) = watch::channel(Handshake::Pending);
    let client = Client::connect(cli.address.as_str(), options, ConsoleHandler { handshake: hs_tx })
        .await
        .map_err(|e| format_connection_error(&e, &cli.address))?;

    let outcome = {
        let waited = tokio::time::timeout(
            Duration::from_secs(cli.connect_timeout),
            hs_rx.wait_for(|h| *h != Handshake::Pending),
        )
        .await;
        match waited {
            Ok(Ok(h)) => Some(h.clone()),
            Ok(Err(_)) => Some(Handshake::Closed),
            Err(_) => None,
        }
    };
    let Some(outcome) = outcome else {
        let _ = client.close().await;
        return Err((
            format!("No CONNECTED frame from {} within {}s", cli.address, cli.connect_timeout),
            exit_codes::PROTOCOL_ERROR,
        ));
    };
    match outcome {
        Handshake::Connected(version) => println!("Connected (STOMP {}).", version),
        Handshake::Rejected(message) => {
            let _ = client.close().await;
            return Err((format!("Connection rejected: {}", message), exit_codes::AUTH_ERROR));
        }
        Handshake::Pending | Handshake::Closed => {
            return Err((
                format!("Connection closed by {} during handshake", cli.address),
                exit_codes::NETWORK_ERROR,
            ));
        }
    }

    let mut subs = Subscriptions::new();
    for dest in &cli.subscribe {
        report(subscribe(&client, &mut subs, dest));
    }

    // Channel to receive user commands from stdin reader
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<String>(16);

    // Spawn blocking stdin reader
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(l) => {
                    if cmd_tx.blocking_send(l).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    println!();
    println!("{}", help_text());
    println!();

    loop {
        prompt();

        let line = tokio::select! {
            line = cmd_rx.recv() => match line {
                Some(l) => l,
                None => break,
            },
            _ = hs_rx.wait_for(|h| *h == Handshake::Closed) => {
                println!("\nConnection closed by broker.");
                return Ok(());
            }
        };

        match execute_command(&line, &client, &mut subs) {
            CommandResult::Quit => break,
            other => report(other),
        }
    }

    println!("Disconnecting...");
    client
        .close()
        .await
        .map_err(|e| (format!("Error while closing: {}", e), exit_codes::NETWORK_ERROR))
}

fn report(result: CommandResult) {
    match result {
        CommandResult::Ok | CommandResult::Quit => {}
        CommandResult::Info(msg) => println!("{}", msg),
        CommandResult::Error(msg) => eprintln!("{}", msg),
    }
}

/// Format a connection error with user-friendly messaging
fn format_connection_error(err: &ConnError, address: &str) -> (String, u8) {
    match err {
        ConnError::Io(io_err) => {
            let message = match io_err.kind() {
                io::ErrorKind::ConnectionRefused => format!("Connection refused: {}", address),
                io::ErrorKind::TimedOut => format!("Connection timed out: {}", address),
                _ => format!("Connection failed: {}", io_err),
            };
            (message, exit_codes::NETWORK_ERROR)
        }
        ConnError::Protocol(msg) => (format!("Protocol error: {}", msg), exit_codes::PROTOCOL_ERROR),
        ConnError::Closed => (
            format!("Connection to {} closed", address),
            exit_codes::NETWORK_ERROR,
        ),
    }
}
