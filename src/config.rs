use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::ConfigError;
use crate::rate_limit::RateLimitConfig;
use crate::validation::mailbox::SMTP_PORT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Service settings, read from the process environment (and `.env`).
///
/// | Variable | Default |
/// |---|---|
/// | `BIND_ADDR` | `127.0.0.1` |
/// | `PORT` | `8080` |
/// | `RATE_LIMIT_WINDOW_MS` | `60000` |
/// | `RATE_LIMIT_MAX_REQUESTS` | `10` |
/// | `CACHE_TTL_MS` | `300000` |
/// | `CACHE_MAX_ENTRIES` | `10000` |
/// | `SMTP_PROBE_PORT` | `25` |
/// | `SWEEP_INTERVAL_MS` | `60000` |
/// | `LOG_FORMAT` | `text` |
/// | `TRUST_PROXY_HEADERS` | `false` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub smtp_port: u16,
    pub sweep_interval: Duration,
    pub log_format: LogFormat,
    /// Take the client address from `Forwarded`/`X-Forwarded-For`. Only safe
    /// behind a reverse proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            smtp_port: SMTP_PORT,
            sweep_interval: Duration::from_secs(60),
            log_format: LogFormat::default(),
            trust_proxy_headers: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let vars = Vars(&lookup);

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: vars.nonzero("PORT", defaults.port)?,
            rate_limit: RateLimitConfig {
                window: vars.millis("RATE_LIMIT_WINDOW_MS", defaults.rate_limit.window)?,
                max_requests: vars
                    .nonzero("RATE_LIMIT_MAX_REQUESTS", defaults.rate_limit.max_requests)?,
            },
            cache: CacheConfig {
                ttl: vars.millis("CACHE_TTL_MS", defaults.cache.ttl)?,
                max_entries: vars.nonzero("CACHE_MAX_ENTRIES", defaults.cache.max_entries)?,
            },
            smtp_port: vars.nonzero("SMTP_PROBE_PORT", defaults.smtp_port)?,
            sweep_interval: vars.millis("SWEEP_INTERVAL_MS", defaults.sweep_interval)?,
            log_format: vars.parsed("LOG_FORMAT", defaults.log_format)?,
            trust_proxy_headers: vars
                .parsed("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers)?,
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn parsed<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match (self.0)(name) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name, value }),
        }
    }

    fn nonzero<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + PartialEq + Default,
    {
        let value = self.parsed(name, default)?;
        if value == T::default() {
            return Err(ConfigError::Zero { name });
        }
        Ok(value)
    }

    fn millis(&self, name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        let default_millis = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
        self.nonzero(name, default_millis).map(Duration::from_millis)
    }
}
