//! Core library for the dnspin dynamic DNS daemon.
//!
//! dnspin keeps one DNS record pointed at the host's current public
//! address. This crate carries the pieces the daemon wires together:
//!
//! - [`Config`]: validated, environment-derived settings
//! - [`IpSource`]: resolve the current public address
//! - [`DnsProvider`]: look up and mutate the record at the provider
//! - [`Reconciler`]: the create-or-update loop driving both

pub mod backoff;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use config::{Config, RecordTarget, RecordType};
pub use error::{Error, Result};
pub use reconciler::Reconciler;
pub use traits::{DnsProvider, IpSource};
