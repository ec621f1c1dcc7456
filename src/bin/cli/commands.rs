use std::collections::BTreeMap;

use stomp_engine::{AckMode, Client, StompHandler, commands};

/// Result of executing a command
pub enum CommandResult {
    /// Command executed successfully
    Ok,
    /// Command requests exit
    Quit,
    /// Informational output for the user
    Info(String),
    /// Error executing command
    Error(String),
}

/// Active subscriptions: destination -> subscription id.
pub type Subscriptions = BTreeMap<String, String>;

/// Parse and execute one line of user input.
pub fn execute_command<H: StompHandler + Send + Sync + 'static>(
    line: &str,
    client: &Client<H>,
    subs: &mut Subscriptions,
) -> CommandResult {
    let parts: Vec<&str> = line.trim().splitn(3, ' ').collect();
    if parts.is_empty() || parts[0].is_empty() {
        return CommandResult::Ok;
    }

    match parts[0] {
        "quit" | "exit" | "q" => CommandResult::Quit,

        "send" => {
            if parts.len() < 3 {
                return CommandResult::Error("Usage: send <destination> <message>".to_string());
            }
            let frame = commands::send_with_type(parts[1], "text/plain", parts[2]);
            match client.send_frame(frame) {
                Ok(()) => CommandResult::Ok,
                Err(e) => CommandResult::Error(format!("Send error: {}", e)),
            }
        }

        "sub" | "subscribe" => {
            if parts.len() < 2 {
                return CommandResult::Error("Usage: sub <destination>".to_string());
            }
            subscribe(client, subs, parts[1])
        }

        "unsub" | "unsubscribe" => {
            if parts.len() < 2 {
                return CommandResult::Error("Usage: unsub <destination|id>".to_string());
            }
            let key = parts[1];
            let dest = subs
                .iter()
                .find(|(d, id)| d.as_str() == key || id.as_str() == key)
                .map(|(d, _)| d.clone());
            let Some(dest) = dest else {
                return CommandResult::Error(format!("Not subscribed: {}", key));
            };
            let Some(id) = subs.remove(&dest) else {
                return CommandResult::Error(format!("Not subscribed: {}", key));
            };
            match client.send_frame(commands::unsubscribe(&id)) {
                Ok(()) => CommandResult::Info(format!("Unsubscribed from {} ({})", dest, id)),
                Err(e) => CommandResult::Error(format!("Unsubscribe error: {}", e)),
            }
        }

        "subs" => {
            if subs.is_empty() {
                return CommandResult::Info("No active subscriptions".to_string());
            }
            let lines: Vec<String> = subs
                .iter()
                .map(|(dest, id)| format!("  {}  {}", id, dest))
                .collect();
            CommandResult::Info(lines.join("\n"))
        }

        "help" | "?" => CommandResult::Info(help_text()),

        _ => CommandResult::Error(format!(
            "Unknown command: {}. Type 'help' for commands.",
            parts[0]
        )),
    }
}

/// Subscribe to `dest` with an engine-generated id, unless already subscribed.
pub fn subscribe<H: StompHandler + Send + Sync + 'static>(
    client: &Client<H>,
    subs: &mut Subscriptions,
    dest: &str,
) -> CommandResult {
    if let Some(id) = subs.get(dest) {
        return CommandResult::Info(format!("Already subscribed to {} ({})", dest, id));
    }
    let id = client.engine().generate_subscription_id();
    match client.send_frame(commands::subscribe(&id, dest, AckMode::Auto)) {
        Ok(()) => {
            subs.insert(dest.to_string(), id.clone());
            CommandResult::Info(format!("Subscribed to {} ({})", dest, id))
        }
        Err(e) => CommandResult::Error(format!("Failed to subscribe to '{}': {}", dest, e)),
    }
}

pub fn help_text() -> String {
    [
        "Commands:",
        "  send <destination> <message>  - Send a message",
        "  sub <destination>             - Subscribe to a destination",
        "  unsub <destination|id>        - Cancel a subscription",
        "  subs                          - List active subscriptions",
        "  quit                          - Exit",
    ]
    .join("\n")
}
