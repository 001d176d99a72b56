//! # CommandHandler: run a shell command per notification.
//!
//! Executes `sh -c <command>` from the system temp directory, capturing
//! combined stdout/stderr. The transition is exported to the command through
//! the environment:
//!
//! | variable         | value                                   |
//! |------------------|-----------------------------------------|
//! | `WARDEN_EVENT`   | kind tag, e.g. `offline-all`            |
//! | `WARDEN_HOST`    | name of the host that transitioned      |
//! | `WARDEN_ADDRESS` | last address of that host               |
//! | `WARDEN_ONLINE`  | other online host names, space separated |

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::HandlerError;
use crate::events::Event;
use crate::subscribers::Handler;

/// Handler running an external shell command.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    command: String,
}

impl CommandHandler {
    /// Creates a handler for the given shell command line.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Handler for CommandHandler {
    async fn on_event(&self, ev: &Event) -> Result<(), HandlerError> {
        info!(command = %self.command, kind = %ev.kind, host = %ev.host.name, "executing external command");

        let online = ev.online_names().collect::<Vec<_>>().join(" ");
        let out = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(std::env::temp_dir())
            .env("WARDEN_EVENT", ev.kind.as_str())
            .env("WARDEN_HOST", &ev.host.name)
            .env("WARDEN_ADDRESS", &ev.host.address)
            .env("WARDEN_ONLINE", online)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| HandlerError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        if out.status.success() {
            info!(command = %self.command, output = %output.trim_end(), "external command exited successfully");
            Ok(())
        } else {
            Err(HandlerError::Exit {
                command: self.command.clone(),
                status: out.status,
                output: output.trim_end().to_string(),
            })
        }
    }

    fn name(&self) -> &str {
        "command"
    }
}
