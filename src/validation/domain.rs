use std::sync::{Arc, LazyLock};
use std::time::Duration;

use phf::phf_set;
use regex::Regex;
use tracing::{debug, warn};

use super::dns::DnsResolver;
use super::timeout::with_timeout;

/// Well-known mail providers and institutional TLDs. A domain equal to, or
/// ending in `.` followed by, one of these is accepted without a lookup.
static TRUSTED_DOMAINS: phf::Set<&'static str> = phf_set! {
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "yahoo.co.uk",
    "yahoo.fr",
    "ymail.com",
    "hotmail.com",
    "hotmail.co.uk",
    "outlook.com",
    "live.com",
    "msn.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "aol.com",
    "protonmail.com",
    "proton.me",
    "gmx.com",
    "gmx.de",
    "web.de",
    "zoho.com",
    "yandex.com",
    "yandex.ru",
    "mail.ru",
    "qq.com",
    "163.com",
    "edu",
    "gov",
    "mil",
    "ac.uk",
    "gov.uk",
    "edu.au",
    "gov.au",
    "ac.in",
    "edu.in",
    "gov.in",
};

pub const MAX_DOMAIN_LENGTH: usize = 253;

static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+",
        r"[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
    ))
    .unwrap_or_else(|err| panic!("domain pattern is a valid regex: {err}"))
});

/// Case-insensitive exact or dot-suffix match against [`TRUSTED_DOMAINS`].
pub fn is_trusted_domain(domain: &str) -> bool {
    let domain = domain.to_ascii_lowercase();
    std::iter::successors(Some(domain.as_str()), |rest| {
        rest.split_once('.').map(|(_, parent)| parent)
    })
    .any(|candidate| TRUSTED_DOMAINS.contains(candidate))
}

/// Label syntax used when DNS is inconclusive: labels of 1-63 alphanumerics
/// or hyphens, at least one dot, at most 253 characters overall.
pub fn is_well_formed_domain(domain: &str) -> bool {
    domain.len() <= MAX_DOMAIN_LENGTH && DOMAIN_PATTERN.is_match(domain)
}

/// How the domain stage reached its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainCheck {
    /// Matched the allowlist; no lookup was made.
    Trusted,
    /// Resolution succeeded.
    Resolved,
    /// Resolution failed or timed out but the domain is syntactically sound.
    Unverified { timed_out: bool },
    /// Resolution failed and the domain is malformed.
    Rejected { timed_out: bool },
}

impl DomainCheck {
    pub fn exists(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    pub fn timed_out(&self) -> bool {
        matches!(
            self,
            Self::Unverified { timed_out: true } | Self::Rejected { timed_out: true }
        )
    }
}

/// Decides whether a domain exists, preferring false positives over
/// rejecting addresses whose DNS is only transiently unreachable.
pub struct DomainValidator {
    resolver: Arc<dyn DnsResolver>,
}

impl DomainValidator {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }

    pub async fn exists(&self, domain: &str, timeout: Duration) -> bool {
        self.check(domain, timeout).await.exists()
    }

    pub async fn check(&self, domain: &str, timeout: Duration) -> DomainCheck {
        if is_trusted_domain(domain) {
            debug!(domain, "domain on trusted list, skipping lookup");
            return DomainCheck::Trusted;
        }

        let lookup = with_timeout(timeout, self.resolver.lookup_host(domain))
            .await
            .and_then(|resolved| resolved);
        let err = match lookup {
            Ok(addresses) => {
                debug!(domain, addresses = addresses.len(), "domain resolved");
                return DomainCheck::Resolved;
            }
            Err(err) => err,
        };

        let timed_out = err.is_timeout();
        if is_well_formed_domain(domain) {
            // Not distinguishable from a resolved domain in the result.
            warn!(domain, error = %err, "domain lookup inconclusive, accepting on syntax");
            DomainCheck::Unverified { timed_out }
        } else {
            debug!(domain, error = %err, "domain lookup failed and domain is malformed");
            DomainCheck::Rejected { timed_out }
        }
    }
}
