//! Cloudflare DNS provider.
//!
//! Implements [`DnsProvider`] against the Cloudflare API v4:
//!
//! - lookup: GET `/zones/:zone_id/dns_records`, paginated; every page is
//!   scanned before a record is declared absent, and the first match in
//!   listing order wins when duplicates exist
//! - create: POST `/zones/:zone_id/dns_records` with the relative name
//!   (Cloudflare qualifies it against the zone)
//! - update: PUT `/zones/:zone_id/dns_records/:record_id`
//!
//! All responses arrive in the v4 envelope (`success`, `errors`,
//! `result`, `result_info`); a `success: false` body counts as a
//! provider error even under HTTP 200.
//!
//! The API token never appears in logs or `Debug` output.

use async_trait::async_trait;
use dnspin_core::config::RecordTarget;
use dnspin_core::traits::DnsProvider;
use dnspin_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for record listings
const LIST_PAGE_SIZE: u32 = 100;

/// Cloudflare DNS provider
pub struct CloudflareProvider {
    /// Cloudflare API token. Never log this value.
    api_token: String,

    /// Zone the managed record lives in
    zone_id: String,

    /// API base URL; overridden in tests
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Cloudflare API v4 response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    total_pages: u32,
}

/// A DNS record as the listing returns it (names are fully qualified)
#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
}

/// Body for create and update calls
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: String,
    ttl: u32,
    proxied: bool,
    comment: &'a str,
}

impl<'a> RecordPayload<'a> {
    fn for_target(target: &'a RecordTarget, ip: IpAddr) -> Self {
        Self {
            record_type: target.record_type.as_str(),
            // Cloudflare accepts the relative name and qualifies it.
            name: &target.name,
            content: ip.to_string(),
            ttl: target.ttl,
            proxied: target.proxied,
            comment: &target.comment,
        }
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// The token comes pre-validated from the configuration layer; this
    /// constructor does not check it again.
    pub fn new(api_token: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self::with_base(api_token, zone_id, CLOUDFLARE_API_BASE)
    }

    fn with_base(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            base_url: base_url.into(),
            client,
        }
    }

    /// Test constructor pointing at a mock server instead of the live API
    #[cfg(test)]
    fn with_base_url(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_base(api_token, zone_id, base_url)
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, self.zone_id)
    }

    /// Map error statuses before touching the body
    async fn check_status(
        &self,
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error response".to_string());

        match status.as_u16() {
            401 | 403 => Err(Error::auth(format!(
                "Cloudflare rejected the API token during {} (status {})",
                context, status
            ))),
            429 => Err(Error::rate_limited(format!(
                "Cloudflare rate limit hit during {} (status {})",
                context, status
            ))),
            500..=599 => Err(Error::provider(
                "cloudflare",
                format!("server error during {} ({}): {}", context, status, body),
            )),
            _ => Err(Error::provider(
                "cloudflare",
                format!("{} failed ({}): {}", context, status, body),
            )),
        }
    }

    /// Decode the v4 envelope, treating `success: false` as an error
    async fn decode<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        context: &str,
    ) -> Result<ApiResponse<T>> {
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("failed to read {} response: {}", context, e)))?;
        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;

        if !envelope.success {
            let message = envelope
                .errors
                .first()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .unwrap_or_else(|| format!("{} reported failure without detail", context));
            return Err(Error::provider("cloudflare", message));
        }

        Ok(envelope)
    }

    /// Fetch one listing page for the given record type
    async fn list_page(&self, record_type: &str, page: u32) -> Result<(Vec<DnsRecord>, u32)> {
        let response = self
            .client
            .get(self.records_url())
            .query(&[
                ("type", record_type.to_string()),
                ("page", page.to_string()),
                ("per_page", LIST_PAGE_SIZE.to_string()),
            ])
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("record listing request failed: {}", e)))?;

        let response = self.check_status(response, "record listing").await?;
        let envelope: ApiResponse<Vec<DnsRecord>> =
            self.decode(response, "record listing").await?;

        let records = envelope.result.unwrap_or_default();
        let total_pages = envelope
            .result_info
            .map(|info| info.total_pages)
            .unwrap_or(1)
            .max(1);

        Ok((records, total_pages))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Scan the zone listing for the target record
    ///
    /// Absence is only declared after the last page. The first match in
    /// listing order wins; later duplicates are logged and ignored.
    async fn find_record(&self, target: &RecordTarget) -> Result<Option<String>> {
        let fqdn = target.fqdn();
        let record_type = target.record_type.as_str();

        let mut found: Option<String> = None;
        let mut page = 1;
        loop {
            let (records, total_pages) = self.list_page(record_type, page).await?;
            for record in records {
                if record.name == fqdn && record.record_type == record_type {
                    match &found {
                        None => found = Some(record.id),
                        Some(first) => warn!(
                            "Duplicate {} record for {} (id {}), keeping the first listed (id {})",
                            record_type, fqdn, record.id, first
                        ),
                    }
                }
            }
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(found)
    }

    async fn create_record(&self, target: &RecordTarget, ip: IpAddr) -> Result<String> {
        let payload = RecordPayload::for_target(target, ip);

        let response = self
            .client
            .post(self.records_url())
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("record create request failed: {}", e)))?;

        let response = self.check_status(response, "record create").await?;
        let envelope: ApiResponse<DnsRecord> = self.decode(response, "record create").await?;

        let record = envelope.result.ok_or_else(|| {
            Error::provider("cloudflare", "create response carried no record")
        })?;
        debug!("Created record {} (id {})", record.name, record.id);
        Ok(record.id)
    }

    async fn update_record(&self, record_id: &str, target: &RecordTarget, ip: IpAddr) -> Result<()> {
        let payload = RecordPayload::for_target(target, ip);
        let url = format!("{}/{}", self.records_url(), record_id);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("record update request failed: {}", e)))?;

        let response = self.check_status(response, "record update").await?;
        let _: ApiResponse<DnsRecord> = self.decode(response, "record update").await?;

        debug!("Updated record {} -> {}", record_id, ip);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
