//! Public-address source trait.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for resolving the caller's current public address
///
/// Implementations ask some external vantage point which address the rest
/// of the world sees for this host. One outbound request per call; retry
/// policy belongs to the caller, not the source.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: the address, in the family this source serves
    /// - `Err(Error)`: the request failed or returned something unusable
    async fn current_ip(&self) -> Result<IpAddr, crate::Error>;
}
