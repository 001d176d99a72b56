//! # LogWriter: transition logger
//!
//! A minimal handler that records incoming [`Event`]s through `tracing`.
//!
//! ## Example output
//! ```text
//! INFO warden::subscribers::log: host online seq=0 at=2026-03-02T10:15:00.412Z host="web1" address="10.0.0.7" online=0
//! INFO warden::subscribers::log: host group online seq=1 at=2026-03-02T10:15:01.038Z host="web2" address="10.0.0.8" online=1
//! INFO warden::subscribers::log: host offline seq=2 at=2026-03-02T10:15:31.040Z host="web1" address="10.0.0.7" online=1
//! ```

use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::error::HandlerError;
use crate::events::{Event, EventKind};
use crate::subscribers::Handler;

/// Event writer handler.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for LogWriter {
    async fn on_event(&self, e: &Event) -> Result<(), HandlerError> {
        let what = match e.kind {
            EventKind::Online => "host online",
            EventKind::OnlineAll => "host group online",
            EventKind::Offline => "host offline",
            EventKind::OfflineAll => "host group offline",
        };
        info!(
            seq = e.seq,
            at = %timestamp(e.at),
            host = %e.host.name,
            address = %e.host.address,
            online = e.online.len(),
            "{what}"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

fn timestamp(at: SystemTime) -> String {
    DateTime::<Utc>::from(at).to_rfc3339_opts(SecondsFormat::Millis, true)
}
