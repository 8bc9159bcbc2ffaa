//! Runtime configuration.
//!
//! All settings come from environment variables, read once at startup into
//! an explicit [`Config`] and validated before anything touches the network.
//! A malformed value fails construction instead of surfacing later inside
//! an API call.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use crate::backoff::BackoffConfig;
use crate::error::{Error, Result};

/// Default seconds between poll iterations (`INTERVAL`)
const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Default record TTL (`TTL`); 1 means "automatic" at the provider
const DEFAULT_TTL: u32 = 1;

/// DNS record type managed by the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Parse from the `RECORD_TYPE` environment value (case-insensitive)
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(Error::config(format!(
                "RECORD_TYPE must be A or AAAA, got '{}'",
                other
            ))),
        }
    }

    /// Wire representation of the type, as the provider spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Whether `ip` belongs to the address family this type records
    pub fn matches(&self, ip: IpAddr) -> bool {
        match self {
            RecordType::A => ip.is_ipv4(),
            RecordType::Aaaa => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single DNS record this daemon manages
#[derive(Debug, Clone)]
pub struct RecordTarget {
    /// Relative record name (e.g. "home")
    pub name: String,
    /// Apex domain the record lives under (e.g. "example.com")
    pub domain: String,
    /// Record type; also selects the address family to resolve
    pub record_type: RecordType,
    /// Record TTL in seconds; 1 means "automatic"
    pub ttl: u32,
    /// Whether the provider should proxy traffic for this record
    pub proxied: bool,
    /// Free-text comment stored with the record
    pub comment: String,
}

impl RecordTarget {
    /// Fully-qualified name as it appears in provider listings
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.name, self.domain)
    }
}

/// Validated daemon configuration
#[derive(Clone)]
pub struct Config {
    /// Time between poll iterations
    pub interval: Duration,
    /// Provider API token
    pub api_token: String,
    /// Provider zone the record belongs to
    pub zone_id: String,
    /// The managed record
    pub record: RecordTarget,
    /// Backoff policy for failed poll iterations
    pub backoff: BackoffConfig,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Construction validates everything: missing required variables,
    /// non-numeric or zero `INTERVAL`, non-numeric `TTL`, and unknown
    /// record types are all rejected here.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let interval_secs = match lookup("INTERVAL") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::config(format!("INTERVAL must be a number of seconds, got '{}'", raw))
                })?;
                if secs == 0 {
                    return Err(Error::config("INTERVAL must be greater than zero"));
                }
                secs
            }
            None => DEFAULT_INTERVAL_SECS,
        };

        let api_token = required(&lookup, "API_TOKEN")?;
        let zone_id = required(&lookup, "ZONE_IDENTIFIER")?;
        let domain = required(&lookup, "DOMAIN")?;
        let name = required(&lookup, "NAME")?;

        let record_type = match lookup("RECORD_TYPE") {
            Some(raw) => RecordType::parse(&raw)?,
            None => RecordType::A,
        };

        let ttl = match lookup("TTL") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::config(format!("TTL must be a number of seconds, got '{}'", raw))
            })?,
            None => DEFAULT_TTL,
        };

        let proxied = lookup("PROXIED").map(|raw| parse_bool(&raw)).unwrap_or(false);
        let comment = lookup("COMMENT").unwrap_or_default();

        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            api_token,
            zone_id,
            record: RecordTarget {
                name,
                domain,
                record_type,
                ttl,
                proxied,
                comment,
            },
            backoff: BackoffConfig::default(),
        })
    }
}

// Manual impl so the token never leaks into logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("interval", &self.interval)
            .field("api_token", &"***REDACTED***")
            .field("zone_id", &self.zone_id)
            .field("record", &self.record)
            .field("backoff", &self.backoff)
            .finish()
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::config(format!("{} is required", key))),
    }
}

/// "true", "1" and "t" (any case) enable the flag; everything else disables it
fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "t")
}
