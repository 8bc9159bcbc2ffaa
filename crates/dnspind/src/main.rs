//! dnspind, the DNS record pinning daemon.
//!
//! A thin shell around the core reconciler: read configuration, wire the
//! HTTP IP source to the Cloudflare provider, run until told to stop.
//! All behavior lives in the library crates; nothing here retries,
//! decides, or talks to the network directly.
//!
//! Configuration comes from the environment (a `.env` file is honored
//! when present):
//!
//! - `API_TOKEN`: Cloudflare API token (required)
//! - `ZONE_IDENTIFIER`: zone the record lives in (required)
//! - `NAME` / `DOMAIN`: relative record name and its zone apex (required)
//! - `RECORD_TYPE`: `A` or `AAAA` (default `A`)
//! - `INTERVAL`: seconds between polls (default 300)
//! - `TTL`: record TTL, `1` means automatic (default 1)
//! - `PROXIED`: route through Cloudflare (`true`/`1`/`t`, default off)
//! - `COMMENT`: free-form note stored on the record (default empty)
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::Result;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dnspin_core::{Config, Reconciler};
use dnspin_ip_http::HttpIpSource;
use dnspin_provider_cloudflare::CloudflareProvider;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown, or the record was created and there is nothing to poll
/// - 1: Configuration error
/// - 2: Runtime error (startup lookup, resolve or create failed)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // A .env file is a convenience for local runs; deployments set the
    // environment directly.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting dnspind");

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    // One record, one loop: a single-threaded runtime carries it.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => DaemonExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {}", e);
                DaemonExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Wire the components together and hand control to the reconciler
async fn run_daemon(config: Config) -> Result<()> {
    info!(
        "Managing {} record {} in zone {}",
        config.record.record_type,
        config.record.fqdn(),
        config.zone_id
    );

    let ip_source = HttpIpSource::for_record_type(config.record.record_type);
    let provider = CloudflareProvider::new(config.api_token.clone(), config.zone_id.clone());

    let shutdown_rx = spawn_signal_watcher()?;

    let reconciler = Reconciler::new(Box::new(ip_source), Box::new(provider), config);
    reconciler.run_with_shutdown(Some(shutdown_rx)).await?;

    info!("dnspind stopped");
    Ok(())
}

/// Install SIGTERM and SIGINT handlers and turn the first signal into a
/// oneshot the reconciler selects on.
///
/// Handlers are installed before the task is spawned so a setup failure
/// surfaces as a startup error instead of an unstoppable daemon.
#[cfg(unix)]
fn spawn_signal_watcher() -> Result<tokio::sync::oneshot::Receiver<()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received {}, shutting down", name);
        let _ = tx.send(());
    });

    Ok(rx)
}

/// CTRL-C fallback for non-Unix platforms
#[cfg(not(unix))]
fn spawn_signal_watcher() -> Result<tokio::sync::oneshot::Receiver<()>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received CTRL-C, shutting down");
                let _ = tx.send(());
            }
            Err(e) => {
                error!("Failed to listen for CTRL-C: {}", e);
                // Hold the sender so the drop does not read as a shutdown.
                std::future::pending::<()>().await;
            }
        }
    });

    Ok(rx)
}
