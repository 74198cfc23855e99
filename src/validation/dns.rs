use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::ResolveError,
};

use crate::error::ValidationError;

/// A mail exchanger for a domain. Ordering is by ascending preference, so
/// sorting a list puts the preferred host first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: normalize_exchange(&exchange.into()),
        }
    }
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

/// DNS lookups needed by the domain and mailbox stages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolves `domain` to its addresses.
    async fn lookup_host(&self, domain: &str) -> Result<Vec<IpAddr>, ValidationError>;

    /// Resolves the MX records published for `domain`, in no particular order.
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ValidationError>;
}

/// [`DnsResolver`] backed by the tokio flavour of `trust-dns-resolver`.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Uses the host's resolver configuration (`/etc/resolv.conf` on Unix).
    pub fn from_system_conf() -> Result<Self, ResolveError> {
        let inner = TokioAsyncResolver::tokio_from_system_conf()?;
        Ok(Self { inner })
    }

    /// Uses the library's default upstream servers with
    /// - 2 second timeout per request
    /// - 2 attempts
    pub fn with_defaults() -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(2);
        opts.attempts = 2;
        Self {
            inner: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

#[async_trait]
impl DnsResolver for SystemResolver {
    async fn lookup_host(&self, domain: &str) -> Result<Vec<IpAddr>, ValidationError> {
        let lookup = self
            .inner
            .lookup_ip(domain)
            .await
            .map_err(|err| ValidationError::resolve(domain, err))?;
        Ok(lookup.iter().collect())
    }

    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ValidationError> {
        let lookup = self
            .inner
            .mx_lookup(domain)
            .await
            .map_err(|err| ValidationError::resolve(domain, err))?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), mx.exchange().to_utf8()))
            .collect())
    }
}
