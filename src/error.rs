use std::time::Duration;
use thiserror::Error;

/// Failures raised by the network-bound validation stages.
///
/// These never reach callers of the orchestrator: each stage folds them into
/// a verdict, and the orchestrator turns verdicts into [`ErrorCode`]s.
///
/// [`ErrorCode`]: crate::models::email::ErrorCode
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("operation timed out after {after:?}")]
    Timeout { after: Duration },
    #[error("DNS lookup failed for {name}: {source}")]
    Resolve {
        name: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no mail exchanger published for {domain}")]
    NoMailExchanger { domain: String },
    #[error("email address has no domain part")]
    MissingDomain,
}

impl ValidationError {
    pub(crate) fn resolve(
        name: impl Into<String>,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Resolve {
            name: name.into(),
            source,
        }
    }

    pub(crate) fn connect(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            source,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Invalid service configuration read from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
    #[error("environment variable {name} must be greater than zero")]
    Zero { name: &'static str },
}

impl From<ConfigError> for std::io::Error {
    fn from(err: ConfigError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}
