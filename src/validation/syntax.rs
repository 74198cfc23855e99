use regex::Regex;
use std::sync::LazyLock;

/// Dot-atom local part of RFC 5322 `atext` characters, `@`, then a domain of
/// at least two dot-separated labels. Each label is 1-63 alphanumerics or
/// hyphens and cannot start or end with a hyphen.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
        r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    ))
    .unwrap_or_else(|err| panic!("email pattern is a valid regex: {err}"))
});

/// Checks `email` against the address grammar. Pure and synchronous.
///
/// # Examples
/// ```
/// use email_verifier::validation::syntax::is_well_formed;
///
/// assert!(is_well_formed("user.name+tag@example.com"));
/// assert!(!is_well_formed("user@localhost"));
/// assert!(!is_well_formed("invalid@ex_mple.com"));
/// ```
pub fn is_well_formed(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Returns the part after the last `@`, if any.
pub fn domain_of(email: &str) -> Option<&str> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}
