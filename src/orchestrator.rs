use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use futures::future::join_all;
use tracing::{debug, error, info, instrument};

use crate::cache::ResultCache;
use crate::clock::SharedClock;
use crate::config::AppConfig;
use crate::models::email::MAILBOX_WARNING;
use crate::models::{ErrorCode, ValidationRequest, ValidationResult, ValidationSteps};
use crate::rate_limit::RateLimiter;
use crate::validation::syntax::{domain_of, is_well_formed};
use crate::validation::{DnsResolver, DomainValidator, MailboxProbe};

/// Stage reached by a request. Any hard failure jumps straight to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Admitted,
    FormatChecked,
    DomainChecked,
    MailboxChecked,
    Done,
}

/// Runs the full pipeline for one address: rate limit, cache, then format,
/// domain and mailbox checks in that order.
pub struct ValidationOrchestrator {
    rate_limiter: RateLimiter,
    cache: ResultCache,
    domain: DomainValidator,
    mailbox: MailboxProbe,
}

impl ValidationOrchestrator {
    pub fn new(
        rate_limiter: RateLimiter,
        cache: ResultCache,
        domain: DomainValidator,
        mailbox: MailboxProbe,
    ) -> Self {
        Self {
            rate_limiter,
            cache,
            domain,
            mailbox,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        resolver: Arc<dyn DnsResolver>,
        clock: SharedClock,
    ) -> Self {
        Self::new(
            RateLimiter::new(config.rate_limit, clock.clone()),
            ResultCache::new(config.cache, clock),
            DomainValidator::new(resolver.clone()),
            MailboxProbe::with_port(resolver, config.smtp_port),
        )
    }

    /// Validates `request` on behalf of `identifier` (typically the client IP).
    ///
    /// Never fails: every outcome, including a panic inside a network stage,
    /// comes back as a [`ValidationResult`].
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn validate(&self, request: &ValidationRequest, identifier: &str) -> ValidationResult {
        let started = Instant::now();

        if !self.rate_limiter.admit(identifier) {
            let mut result = ValidationResult::rate_limited();
            result.processing_time_millis = elapsed_millis(started);
            return result;
        }

        if let Some(mut cached) = self.cache.get(&request.email) {
            debug!("serving cached result");
            cached.processing_time_millis = elapsed_millis(started);
            return cached;
        }

        let outcome = AssertUnwindSafe(self.run_stages(request))
            .catch_unwind()
            .await;
        match outcome {
            Ok(mut result) => {
                result.processing_time_millis = elapsed_millis(started);
                self.cache.put(&request.email, result.clone());
                info!(
                    is_valid = result.is_valid,
                    errors = ?result.errors,
                    elapsed_ms = result.processing_time_millis,
                    "validation finished"
                );
                result
            }
            Err(_) => {
                error!("validation stage panicked, reporting network error");
                let mut result = ValidationResult::network_error();
                result.processing_time_millis = elapsed_millis(started);
                result
            }
        }
    }

    /// Validates a batch concurrently. Each address is admitted separately
    /// against `identifier`'s budget; results keep the input order.
    pub async fn validate_many(
        &self,
        requests: &[ValidationRequest],
        identifier: &str,
    ) -> Vec<ValidationResult> {
        join_all(
            requests
                .iter()
                .map(|request| self.validate(request, identifier)),
        )
        .await
    }

    /// Drops stale cache entries and elapsed rate-limit windows.
    /// Returns `(cache entries removed, rate-limit entries removed)`.
    pub fn purge_expired(&self) -> (usize, usize) {
        (self.cache.purge_expired(), self.rate_limiter.purge_expired())
    }

    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.rate_limiter.tracked()
    }

    async fn run_stages(&self, request: &ValidationRequest) -> ValidationResult {
        let timeout = request.timeout();
        let mut stage = Stage::Admitted;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        // Skipped stages count as passed.
        let mut steps = ValidationSteps {
            format: true,
            domain: true,
            mailbox: true,
        };

        while stage != Stage::Done {
            stage = match stage {
                Stage::Admitted => {
                    steps.format = is_well_formed(&request.email);
                    if steps.format {
                        Stage::FormatChecked
                    } else {
                        errors.push(ErrorCode::InvalidFormat);
                        Stage::Done
                    }
                }
                Stage::FormatChecked => {
                    if request.check_domain {
                        let domain = domain_of(&request.email).unwrap_or_default();
                        let check = self.domain.check(domain, timeout).await;
                        debug!(domain, ?check, "domain stage finished");
                        steps.domain = check.exists();
                        if !steps.domain {
                            errors.push(ErrorCode::DomainNotFound);
                            if check.timed_out() {
                                errors.push(ErrorCode::Timeout);
                            }
                        }
                    }
                    if steps.domain {
                        Stage::DomainChecked
                    } else {
                        Stage::Done
                    }
                }
                Stage::DomainChecked => {
                    if request.check_mailbox {
                        let check = self.mailbox.check(&request.email, timeout).await;
                        debug!(?check, "mailbox stage finished");
                        steps.mailbox = check.is_reachable();
                        if !steps.mailbox {
                            errors.push(ErrorCode::MailboxNotFound);
                            if check.timed_out() {
                                errors.push(ErrorCode::Timeout);
                            }
                            warnings.push(MAILBOX_WARNING.to_string());
                        }
                    }
                    Stage::MailboxChecked
                }
                Stage::MailboxChecked | Stage::Done => Stage::Done,
            };
        }

        let is_valid =
            steps.format && steps.domain && (!request.check_mailbox || steps.mailbox);

        ValidationResult {
            is_valid,
            errors,
            warnings,
            steps,
            processing_time_millis: 0,
        }
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
