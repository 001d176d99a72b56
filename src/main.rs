//! warden: heartbeat liveness monitor daemon.
//!
//! Reads the configuration file, starts the registry with one command
//! subscription per notification block and serves the HTTP listener until a
//! termination signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use warden::{EventKind, LogWriter, Settings, Subscription, Warden};

#[derive(Parser)]
#[command(name = "warden", version)]
#[command(about = "Heartbeat liveness monitor with online/offline notifications")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "WARDEN_CONFIG", default_value = "/etc/warden.toml")]
    config: PathBuf,

    /// Also log every online/offline transition through the event pipeline
    #[arg(long, env = "WARDEN_LOG_EVENTS")]
    log_events: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warden=info")),
        )
        .init();

    let cli = Cli::parse();

    info!("config file: {}", cli.config.display());
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let mut subscriptions = settings.subscriptions();
    if cli.log_events {
        for kind in [EventKind::Online, EventKind::Offline] {
            subscriptions.push(Subscription::new(
                kind,
                Vec::<String>::new(),
                Arc::new(LogWriter::new()),
            ));
        }
    }
    let count = subscriptions.len();
    let warden = Warden::builder(settings.warden_config())
        .with_subscriptions(subscriptions)
        .build();
    info!(ttl = ?warden.ttl(), subscriptions = count, "registry started");

    let (address, port) = settings.listen_addr();
    let listener = TcpListener::bind((address, port))
        .await
        .with_context(|| format!("binding {address}:{port}"))?;
    info!("listening on {}", listener.local_addr()?);

    let served = warden::http::serve(listener, Arc::clone(&warden), async {
        match warden::wait_for_shutdown_signal().await {
            Ok(sig) => info!("received {sig}, shutting down"),
            Err(err) => error!("cannot listen for shutdown signals: {err}"),
        }
    })
    .await;

    if let Err(err) = warden.shutdown().await {
        warn!(label = err.as_label(), "{err}");
    }

    served.context("http listener failed")?;
    info!("stopped");
    Ok(())
}
