//! HTTP public IP source.
//!
//! Asks an external echo service (ipify) for the address the machine is
//! seen as on the public internet. The endpoint follows the record
//! family: A records resolve via the IPv4-only endpoint, AAAA records
//! via the IPv6-only endpoint, so the answer can never be from the wrong
//! family even behind dual-stack connectivity.
//!
//! Every call fetches fresh; the reconciler decides how often to ask.

use async_trait::async_trait;
use dnspin_core::config::RecordType;
use dnspin_core::traits::IpSource;
use dnspin_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Echo service for IPv4 lookups
const IPV4_ENDPOINT: &str = "https://api.ipify.org";

/// Echo service for IPv6 lookups
const IPV6_ENDPOINT: &str = "https://api6.ipify.org";

/// Default HTTP timeout for IP lookups (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP-based public IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    endpoint: String,

    /// Record family the answer must belong to
    record_type: RecordType,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source resolving the family the record needs
    pub fn for_record_type(record_type: RecordType) -> Self {
        let endpoint = match record_type {
            RecordType::A => IPV4_ENDPOINT,
            RecordType::Aaaa => IPV6_ENDPOINT,
        };
        Self::with_endpoint_impl(endpoint, record_type)
    }

    fn with_endpoint_impl(endpoint: impl Into<String>, record_type: RecordType) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint: endpoint.into(),
            record_type,
            client,
        }
    }

    /// Test constructor pointing at a mock server instead of ipify
    #[cfg(test)]
    fn with_endpoint(endpoint: impl Into<String>, record_type: RecordType) -> Self {
        Self::with_endpoint_impl(endpoint, record_type)
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current_ip(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("request to {} failed: {}", self.endpoint, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} answered with status {}",
                self.endpoint,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("failed to read response: {}", e)))?;

        let ip_text = body.trim();
        let ip: IpAddr = ip_text
            .parse()
            .map_err(|_| Error::ip_source(format!("not an IP address: {:?}", ip_text)))?;

        // A dual-stack host can answer from the wrong family if the
        // endpoint ever resolves both; reject instead of publishing it.
        if !self.record_type.matches(ip) {
            return Err(Error::ip_source(format!(
                "{} is the wrong family for an {} record",
                ip,
                self.record_type.as_str()
            )));
        }

        debug!("Resolved public IP {} via {}", ip, self.endpoint);
        Ok(ip)
    }
}
