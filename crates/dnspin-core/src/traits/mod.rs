//! Core traits for the daemon.
//!
//! - [`IpSource`]: resolve the current public address
//! - [`DnsProvider`]: look up and mutate the managed record

pub mod dns_provider;
pub mod ip_source;

pub use dns_provider::DnsProvider;
pub use ip_source::IpSource;
