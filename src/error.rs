//! Error types used by the warden runtime, handlers and configuration.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`]: errors raised by the registry runtime itself.
//! - [`HandlerError`]: errors raised by individual handler invocations.
//! - [`ConfigError`]: errors raised while loading the configuration file.
//!
//! Each type provides `as_label` for logs/metrics. Heartbeat and listing
//! operations have no error path at all; these types only cover the edges.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the warden runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; in-flight handlers were abandoned.
    #[error("shutdown timeout {grace:?} exceeded; {pending} handler task(s) abandoned")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of handler tasks still running when the grace period ended.
        pending: usize,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use warden::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), pending: 2 };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Errors produced by handler invocations.
///
/// Handler errors never travel back into the registry. The dispatcher logs
/// them and moves on.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// External command could not be started.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        /// The shell command line.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// External command ran but exited unsuccessfully.
    #[error("`{command}` exited with {status}; output: {output}")]
    Exit {
        /// The shell command line.
        command: String,
        /// Exit status as reported by the OS.
        status: std::process::ExitStatus,
        /// Combined stdout/stderr.
        output: String,
    },

    /// Handler-specific failure.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl HandlerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use warden::HandlerError;
    ///
    /// let err = HandlerError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "handler_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Spawn { .. } => "handler_spawn",
            HandlerError::Exit { .. } => "handler_exit",
            HandlerError::Fail { .. } => "handler_failed",
        }
    }
}

/// # Errors produced while loading configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected schema.
    #[error("failed to parse `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration parsed but carries an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "config_read",
            ConfigError::Parse { .. } => "config_parse",
            ConfigError::Invalid(_) => "config_invalid",
        }
    }
}
