//! The reconciliation loop.
//!
//! One record, one loop. A single lookup at startup decides the mode for
//! the whole run:
//!
//! - no record: resolve the public address, create the record once, done.
//! - record present: poll forever, re-resolving the address and pushing an
//!   update every interval. Iteration errors are logged and absorbed; a
//!   failing iteration delays the next attempt by a growing backoff
//!   instead of the plain interval.
//!
//! The poll loop only ends on a shutdown signal.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::backoff::Backoff;
use crate::config::Config;
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource};

/// Drives the managed record toward the current public address
pub struct Reconciler {
    ip_source: Box<dyn IpSource>,
    provider: Box<dyn DnsProvider>,
    config: Config,
}

impl Reconciler {
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: Config,
    ) -> Self {
        Self {
            ip_source,
            provider,
            config,
        }
    }

    /// Run until the work is done or a shutdown signal arrives
    ///
    /// # Returns
    ///
    /// - `Ok(())`: record created (one-shot run) or clean shutdown
    /// - `Err(Error)`: startup failure (initial lookup, resolve or create)
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run with a controlled shutdown signal
    ///
    /// `pub` so contract tests and the daemon can terminate the poll loop
    /// deterministically. With `None` the loop shuts down on Ctrl-C only.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        let fqdn = self.config.record.fqdn();

        // The startup lookup decides the mode. Failure here is fatal.
        match self.provider.find_record(&self.config.record).await? {
            None => {
                let ip = self.ip_source.current_ip().await?;
                self.provider.create_record(&self.config.record, ip).await?;
                info!(
                    "Created {} record {} -> {}, nothing left to do",
                    self.config.record.record_type, fqdn, ip
                );
                Ok(())
            }
            Some(id) => {
                info!(
                    "Record {} exists (id {}), polling every {}s",
                    fqdn,
                    id,
                    self.config.interval.as_secs()
                );
                self.poll(shutdown_rx).await
            }
        }
    }

    /// The poll loop: reconcile, sleep, repeat until shutdown
    async fn poll(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        let mut backoff = Backoff::new(self.config.backoff);

        if let Some(mut rx) = shutdown_rx {
            loop {
                let delay = self.poll_once(&mut backoff).await;
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = &mut rx => {
                        info!("Shutdown signal received");
                        return Ok(());
                    }
                }
            }
        } else {
            loop {
                let delay = self.poll_once(&mut backoff).await;
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutdown signal received");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// One iteration body. Errors are logged and absorbed; the returned
    /// duration is how long to sleep before the next pass.
    async fn poll_once(&self, backoff: &mut Backoff) -> Duration {
        match self.reconcile_once().await {
            Ok(()) => {
                backoff.reset();
                self.config.interval
            }
            Err(e) => {
                let delay = backoff.next_delay();
                error!(
                    "Poll iteration failed: {} (next attempt in {}s)",
                    e,
                    delay.as_secs()
                );
                delay
            }
        }
    }

    /// Resolve the address, re-look-up the record, then converge.
    ///
    /// The identifier is never cached across iterations. A record deleted
    /// externally shows up as absence here and is created again, rather
    /// than failing an update against a stale id.
    async fn reconcile_once(&self) -> Result<()> {
        let ip = self.ip_source.current_ip().await?;
        let target = &self.config.record;

        match self.provider.find_record(target).await? {
            Some(id) => {
                self.provider.update_record(&id, target, ip).await?;
                info!("Updated {} -> {}", target.fqdn(), ip);
            }
            None => {
                self.provider.create_record(target, ip).await?;
                warn!(
                    "Record {} was deleted externally, created it again -> {}",
                    target.fqdn(),
                    ip
                );
            }
        }
        Ok(())
    }
}
