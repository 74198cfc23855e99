/// Checks an email address against a single-pass address grammar.
///
/// # Examples
/// ```
/// use email_verifier::validation::syntax::is_well_formed;
///
/// assert!(is_well_formed("user.name+tag@example.com"));
/// assert!(!is_well_formed("user@localhost"));
/// ```
pub mod syntax;

/// DNS seam shared by the domain and mailbox stages, with the
/// `trust-dns-resolver` implementation used in production.
pub mod dns;

/// Decides whether a domain exists.
///
/// Order of checks:
/// 1. Trusted provider / institutional TLD allowlist (no network)
/// 2. Host resolution raced against the request timeout
/// 3. Lenient label-syntax fallback when resolution is inconclusive
pub mod domain;

/// Connection-level probe of the preferred mail exchanger on port 25.
pub mod mailbox;

/// Generic "operation vs. timer" race used by every network call.
pub mod timeout;

pub use dns::{DnsResolver, MxRecord, SystemResolver};
pub use domain::{DomainCheck, DomainValidator};
pub use mailbox::{MailboxCheck, MailboxProbe};
pub use timeout::with_timeout;
