use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

use super::dns::DnsResolver;
use super::syntax::domain_of;
use super::timeout::with_timeout;
use crate::error::ValidationError;

pub const SMTP_PORT: u16 = 25;

/// How the mailbox stage reached its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxCheck {
    /// Something accepted a TCP connection on the preferred exchanger.
    Reachable { exchange: String },
    /// MX lookup failed or returned no records.
    NoMailExchanger,
    /// The preferred exchanger refused or failed the connection.
    Unreachable { exchange: String },
    /// The MX lookup or the connection attempt ran out of time.
    TimedOut,
}

impl MailboxCheck {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Connection-level reachability probe against a domain's preferred mail
/// exchanger.
///
/// Only a TCP connect is attempted; no SMTP command is ever sent, so a
/// positive answer means "something listens on the exchanger", not "the
/// mailbox exists".
pub struct MailboxProbe {
    resolver: Arc<dyn DnsResolver>,
    port: u16,
}

impl MailboxProbe {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self::with_port(resolver, SMTP_PORT)
    }

    pub fn with_port(resolver: Arc<dyn DnsResolver>, port: u16) -> Self {
        Self { resolver, port }
    }

    pub async fn probe(&self, email: &str, timeout: Duration) -> bool {
        self.check(email, timeout).await.is_reachable()
    }

    pub async fn check(&self, email: &str, timeout: Duration) -> MailboxCheck {
        match self.connect_preferred_exchanger(email, timeout).await {
            Ok(exchange) => {
                debug!(email, exchange = %exchange, "mail exchanger accepted connection");
                MailboxCheck::Reachable { exchange }
            }
            Err(err) => {
                debug!(email, error = %err, "mailbox probe failed");
                match err {
                    ValidationError::Timeout { .. } => MailboxCheck::TimedOut,
                    ValidationError::Connect { host, .. } => {
                        MailboxCheck::Unreachable { exchange: host }
                    }
                    ValidationError::Resolve { .. }
                    | ValidationError::NoMailExchanger { .. }
                    | ValidationError::MissingDomain => MailboxCheck::NoMailExchanger,
                }
            }
        }
    }

    async fn connect_preferred_exchanger(
        &self,
        email: &str,
        timeout: Duration,
    ) -> Result<String, ValidationError> {
        let domain = domain_of(email).ok_or(ValidationError::MissingDomain)?;

        let mut records = with_timeout(timeout, self.resolver.lookup_mx(domain)).await??;
        records.sort();
        let preferred = records
            .into_iter()
            .next()
            .ok_or_else(|| ValidationError::NoMailExchanger {
                domain: domain.to_string(),
            })?;

        debug!(
            domain,
            exchange = %preferred.exchange,
            preference = preferred.preference,
            "probing preferred mail exchanger"
        );

        // Timing out drops the pending connect and its socket with it.
        let stream = with_timeout(
            timeout,
            TcpStream::connect((preferred.exchange.as_str(), self.port)),
        )
        .await?
        .map_err(|err| ValidationError::connect(preferred.exchange.clone(), err))?;

        // Reachability is all we need; close before anything is exchanged.
        drop(stream);
        Ok(preferred.exchange)
    }
}
