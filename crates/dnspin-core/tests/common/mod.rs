//! Test doubles and common utilities for reconciler contract tests
//!
//! The mocks here model the two external services: a scriptable address
//! source and a one-record "zone" whose listing behavior can be overridden
//! per call.

use dnspin_core::backoff::BackoffConfig;
use dnspin_core::config::{Config, RecordTarget, RecordType};
use dnspin_core::error::{Error, Result};
use dnspin_core::traits::{DnsProvider, IpSource};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An address source that replays a script, then repeats a fallback
///
/// Script entries are either an address or an error message. Once the
/// script is exhausted every further call returns the fallback address.
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<std::result::Result<IpAddr, String>>>>,
    fallback: IpAddr,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    /// Source that always resolves to `ip`
    pub fn always(ip: IpAddr) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue an address for the next unanswered call
    pub fn push_ok(self, ip: IpAddr) -> Self {
        self.script.lock().unwrap().push_back(Ok(ip));
        self
    }

    /// Queue a resolution failure for the next unanswered call
    pub fn push_err(self, msg: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(msg.to_string()));
        self
    }

    /// Get the number of times current_ip() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new ScriptedIpSource that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            fallback: other.fallback,
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current_ip(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(ip)) => Ok(ip),
            Some(Err(msg)) => Err(Error::ip_source(msg)),
            None => Ok(self.fallback),
        }
    }
}

/// A mock DnsProvider holding a single record slot
///
/// `find_record` first consumes any scripted results, then falls back to
/// whatever the slot holds. `create_record` fills the slot with a fresh
/// id, so a scripted "record gone" answer is followed by the re-created
/// record being visible again.
pub struct MockDnsProvider {
    /// Scripted find_record answers, consumed before the slot is consulted
    find_script: Arc<Mutex<VecDeque<std::result::Result<Option<String>, String>>>>,
    /// The record the mock zone currently holds
    record_id: Arc<Mutex<Option<String>>>,
    /// How many upcoming update calls should fail
    failing_updates: Arc<AtomicUsize>,
    /// How many upcoming create calls should fail
    failing_creates: Arc<AtomicUsize>,
    find_call_count: Arc<AtomicUsize>,
    create_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    /// Targets captured from create calls
    created: Arc<Mutex<Vec<(RecordTarget, IpAddr)>>>,
    /// (record id, address) captured from successful update calls
    updated: Arc<Mutex<Vec<(String, IpAddr)>>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            find_script: Arc::new(Mutex::new(VecDeque::new())),
            record_id: Arc::new(Mutex::new(None)),
            failing_updates: Arc::new(AtomicUsize::new(0)),
            failing_creates: Arc::new(AtomicUsize::new(0)),
            find_call_count: Arc::new(AtomicUsize::new(0)),
            create_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            created: Arc::new(Mutex::new(Vec::new())),
            updated: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start with an existing record in the zone
    pub fn with_record(self, id: &str) -> Self {
        *self.record_id.lock().unwrap() = Some(id.to_string());
        self
    }

    /// Queue a find_record answer ahead of the slot lookup
    pub fn push_find(self, answer: Option<&str>) -> Self {
        self.find_script
            .lock()
            .unwrap()
            .push_back(Ok(answer.map(String::from)));
        self
    }

    /// Queue a find_record failure
    pub fn push_find_err(self, msg: &str) -> Self {
        self.find_script
            .lock()
            .unwrap()
            .push_back(Err(msg.to_string()));
        self
    }

    /// Make the next `n` update calls fail
    pub fn fail_updates(self, n: usize) -> Self {
        self.failing_updates.store(n, Ordering::SeqCst);
        self
    }

    /// Make the next `n` create calls fail
    pub fn fail_creates(self, n: usize) -> Self {
        self.failing_creates.store(n, Ordering::SeqCst);
        self
    }

    pub fn find_call_count(&self) -> usize {
        self.find_call_count.load(Ordering::SeqCst)
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Targets and addresses captured from create calls
    pub fn created(&self) -> Vec<(RecordTarget, IpAddr)> {
        self.created.lock().unwrap().clone()
    }

    /// Record ids and addresses captured from successful update calls
    pub fn updated(&self) -> Vec<(String, IpAddr)> {
        self.updated.lock().unwrap().clone()
    }

    /// Create a new MockDnsProvider that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            find_script: Arc::clone(&other.find_script),
            record_id: Arc::clone(&other.record_id),
            failing_updates: Arc::clone(&other.failing_updates),
            failing_creates: Arc::clone(&other.failing_creates),
            find_call_count: Arc::clone(&other.find_call_count),
            create_call_count: Arc::clone(&other.create_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            created: Arc::clone(&other.created),
            updated: Arc::clone(&other.updated),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_record(&self, _target: &RecordTarget) -> Result<Option<String>> {
        self.find_call_count.fetch_add(1, Ordering::SeqCst);
        match self.find_script.lock().unwrap().pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(msg)) => Err(Error::provider("mock", msg)),
            None => Ok(self.record_id.lock().unwrap().clone()),
        }
    }

    async fn create_record(&self, target: &RecordTarget, ip: IpAddr) -> Result<String> {
        let n = self.create_call_count.fetch_add(1, Ordering::SeqCst);
        if decrement_if_positive(&self.failing_creates) {
            return Err(Error::provider("mock", "create refused"));
        }
        let id = format!("rec-{}", n + 1);
        *self.record_id.lock().unwrap() = Some(id.clone());
        self.created.lock().unwrap().push((target.clone(), ip));
        Ok(id)
    }

    async fn update_record(&self, record_id: &str, _target: &RecordTarget, ip: IpAddr) -> Result<()> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        if decrement_if_positive(&self.failing_updates) {
            return Err(Error::provider("mock", "update refused"));
        }
        self.updated
            .lock()
            .unwrap()
            .push((record_id.to_string(), ip));
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

fn decrement_if_positive(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Helper to create a minimal Config for testing
///
/// The backoff is shrunk to milliseconds so failure-path tests finish
/// quickly.
pub fn test_config(interval: Duration) -> Config {
    Config {
        interval,
        api_token: "test-token".to_string(),
        zone_id: "zone-1".to_string(),
        record: RecordTarget {
            name: "home".to_string(),
            domain: "example.com".to_string(),
            record_type: RecordType::A,
            ttl: 1,
            proxied: false,
            comment: String::new(),
        },
        backoff: BackoffConfig {
            initial: Duration::from_millis(20),
            max: Duration::from_millis(160),
            multiplier: 2,
        },
    }
}

/// Shorthand for an IPv4 address literal
pub fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::from([a, b, c, d])
}
