//! # Configuration file.
//!
//! [`Settings`] is the TOML file read once at startup. It produces the registry
//! [`Config`], the listen address and the initial subscriptions.
//!
//! ## Format
//! ```toml
//! heartbeat-ttl = "30s"
//! address = "0.0.0.0"
//! port = 8080
//! shutdown-grace = "10s"      # optional
//!
//! [[online]]
//! exec = "logger host up"
//!
//! [[offline-all]]
//! hosts = ["db1", "db2"]
//! exec = "page-oncall 'database tier down'"
//! ```
//!
//! Each `[[online]]`, `[[online-all]]`, `[[offline]]` and `[[offline-all]]` block
//! becomes one subscription running its `exec` command. `hosts` is optional; when
//! present it scopes the subscription to those names.
//!
//! ## Example
//! ```rust
//! use std::path::Path;
//! use std::time::Duration;
//! use warden::Settings;
//!
//! let s = Settings::parse(Path::new("inline"), r#"
//!     heartbeat-ttl = "1m"
//!     address = "127.0.0.1"
//!     port = 9000
//! "#).unwrap();
//!
//! assert_eq!(s.heartbeat_ttl, Duration::from_secs(60));
//! assert!(s.subscriptions().is_empty());
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::core::Config;
use crate::error::ConfigError;
use crate::events::EventKind;
use crate::subscribers::{CommandHandler, Subscription};

fn default_grace() -> Duration {
    Duration::from_secs(10)
}

/// Parsed configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// How long a host stays online without a heartbeat (required, > 0).
    #[serde(with = "humantime_serde")]
    pub heartbeat_ttl: Duration,
    /// HTTP listen address.
    pub address: String,
    /// HTTP listen port.
    pub port: u16,
    /// Maximum wait for running handlers on shutdown.
    #[serde(with = "humantime_serde", default = "default_grace")]
    pub shutdown_grace: Duration,

    #[serde(default)]
    pub online: Vec<Action>,
    #[serde(default)]
    pub online_all: Vec<Action>,
    #[serde(default)]
    pub offline: Vec<Action>,
    #[serde(default)]
    pub offline_all: Vec<Action>,
}

/// One notification block.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Action {
    /// Host filter; empty or absent means any host.
    #[serde(default)]
    pub hosts: Vec<String>,
    /// Shell command run for every matching transition.
    pub exec: String,
}

impl Settings {
    /// Reads and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parses and validates configuration text; `origin` is only used in errors.
    pub fn parse(origin: &Path, text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat_ttl.is_zero() {
            return Err(ConfigError::Invalid(
                "heartbeat-ttl must be greater than zero".into(),
            ));
        }
        if self.address.trim().is_empty() {
            return Err(ConfigError::Invalid("address must not be empty".into()));
        }
        for (kind, action) in self.actions() {
            if action.exec.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "[[{kind}]] block has an empty exec"
                )));
            }
        }
        Ok(())
    }

    /// Registry configuration derived from the file.
    pub fn warden_config(&self) -> Config {
        Config {
            ttl: self.heartbeat_ttl,
            grace: self.shutdown_grace,
        }
    }

    /// Address the HTTP listener binds to.
    pub fn listen_addr(&self) -> (&str, u16) {
        (self.address.as_str(), self.port)
    }

    /// Every block with its kind: online, online-all, offline, offline-all.
    pub fn actions(&self) -> impl Iterator<Item = (EventKind, &Action)> + '_ {
        [
            (EventKind::Online, &self.online),
            (EventKind::OnlineAll, &self.online_all),
            (EventKind::Offline, &self.offline),
            (EventKind::OfflineAll, &self.offline_all),
        ]
        .into_iter()
        .flat_map(|(kind, actions)| actions.iter().map(move |a| (kind, a)))
    }

    /// One command subscription per block, host filters included.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.actions()
            .map(|(kind, action)| {
                Subscription::new(
                    kind,
                    action.hosts.iter().cloned(),
                    Arc::new(CommandHandler::new(action.exec.clone())),
                )
            })
            .collect()
    }
}
