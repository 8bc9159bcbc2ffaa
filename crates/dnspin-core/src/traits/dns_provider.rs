//! DNS provider trait.
//!
//! The provider owns the record's remote copy. The reconciler drives it
//! through three operations: find, create, update. Providers stay
//! single-shot per call; retry and scheduling decisions live in the
//! reconciler.

use async_trait::async_trait;
use std::net::IpAddr;

use crate::config::RecordTarget;

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Find the managed record, returning its provider-side id if present
    ///
    /// Implementations must scan the complete listing for the zone, every
    /// page of it, before declaring absence. A record matches when its
    /// fully-qualified name equals [`RecordTarget::fqdn`] and its type
    /// equals the target's type. If several records match, the first one
    /// in listing order wins.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(id))`: the record exists
    /// - `Ok(None)`: no record of this (name, type) in the zone
    /// - `Err(Error)`: the listing request failed
    async fn find_record(&self, target: &RecordTarget) -> Result<Option<String>, crate::Error>;

    /// Create the record pointing at `ip`, returning the new record id
    async fn create_record(
        &self,
        target: &RecordTarget,
        ip: IpAddr,
    ) -> Result<String, crate::Error>;

    /// Point the existing record `record_id` at `ip`
    ///
    /// The full parameter set (ttl, proxied, comment) is re-sent so the
    /// remote copy converges on the configured state, not just the address.
    async fn update_record(
        &self,
        record_id: &str,
        target: &RecordTarget,
        ip: IpAddr,
    ) -> Result<(), crate::Error>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
