use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use utoipa::ToSchema;

pub const DEFAULT_TIMEOUT_MILLIS: u64 = 10_000;

pub const MAILBOX_WARNING: &str = "mailbox verification failed - email may still be valid";

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MILLIS
}

/// A single validation request as received from the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub email: String,
    #[serde(default = "default_true")]
    pub check_domain: bool,
    #[serde(default = "default_true")]
    pub check_mailbox: bool,
    /// Per network call timeout, in milliseconds.
    #[serde(rename = "timeout", default = "default_timeout")]
    pub timeout_millis: u64,
}

impl ValidationRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            check_domain: true,
            check_mailbox: true,
            timeout_millis: DEFAULT_TIMEOUT_MILLIS,
        }
    }

    pub fn with_domain_check(mut self, enabled: bool) -> Self {
        self.check_domain = enabled;
        self
    }

    pub fn with_mailbox_check(mut self, enabled: bool) -> Self {
        self.check_mailbox = enabled;
        self
    }

    pub fn with_timeout_millis(mut self, millis: u64) -> Self {
        self.timeout_millis = millis;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

/// Hard failure reasons, serialized as `INVALID_FORMAT`, `DOMAIN_NOT_FOUND`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidFormat,
    DomainNotFound,
    MailboxNotFound,
    Timeout,
    RateLimited,
    NetworkError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::DomainNotFound => "DOMAIN_NOT_FOUND",
            Self::MailboxNotFound => "MAILBOX_NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::RateLimited => "RATE_LIMITED",
            Self::NetworkError => "NETWORK_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-stage outcome. Stages that were skipped are recorded as passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationSteps {
    pub format: bool,
    pub domain: bool,
    pub mailbox: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ErrorCode>,
    pub warnings: Vec<String>,
    #[serde(rename = "validationSteps")]
    pub steps: ValidationSteps,
    #[serde(rename = "processingTime")]
    pub processing_time_millis: u64,
}

impl ValidationResult {
    /// Result for a request refused by the rate limiter. Nothing was checked.
    pub fn rate_limited() -> Self {
        Self::failure(ErrorCode::RateLimited)
    }

    /// Result for an unexpected failure caught at the orchestrator boundary.
    pub fn network_error() -> Self {
        Self::failure(ErrorCode::NetworkError)
    }

    fn failure(code: ErrorCode) -> Self {
        Self {
            is_valid: false,
            errors: vec![code],
            warnings: Vec::new(),
            steps: ValidationSteps::default(),
            processing_time_millis: 0,
        }
    }

    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.contains(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_defaults_apply() {
        let json = r#"{"email": "user@example.com"}"#;
        let request: ValidationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request, ValidationRequest::new("user@example.com"));
        assert_eq!(request.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn request_reads_camel_case_flags() {
        let json = r#"{"email": "a@b.io", "checkDomain": false, "checkMailbox": false, "timeout": 250}"#;
        let request: ValidationRequest = serde_json::from_str(json).unwrap();
        assert!(!request.check_domain);
        assert!(!request.check_mailbox);
        assert_eq!(request.timeout_millis, 250);
    }

    #[test]
    fn request_requires_email() {
        let result: Result<ValidationRequest, _> = serde_json::from_str(r#"{"checkDomain": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn request_rejects_wrong_types() {
        assert!(serde_json::from_str::<ValidationRequest>(r#"{"email": 123}"#).is_err());
        assert!(serde_json::from_str::<ValidationRequest>(r#"{"email": null}"#).is_err());
        assert!(
            serde_json::from_str::<ValidationRequest>(r#"{"email": "a@b.io", "timeout": -1}"#)
                .is_err()
        );
    }

    #[test]
    fn request_ignores_extra_fields() {
        let json = r#"{"email": "user@example.com", "extra": "ignored"}"#;
        let request: ValidationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "user@example.com");
    }

    #[test]
    fn result_serializes_to_wire_shape() {
        let result = ValidationResult {
            is_valid: false,
            errors: vec![ErrorCode::MailboxNotFound],
            warnings: vec![MAILBOX_WARNING.to_string()],
            steps: ValidationSteps {
                format: true,
                domain: true,
                mailbox: false,
            },
            processing_time_millis: 42,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "isValid": false,
                "errors": ["MAILBOX_NOT_FOUND"],
                "warnings": [MAILBOX_WARNING],
                "validationSteps": { "format": true, "domain": true, "mailbox": false },
                "processingTime": 42
            })
        );
    }

    #[test]
    fn rate_limited_result_checks_nothing() {
        let result = ValidationResult::rate_limited();
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![ErrorCode::RateLimited]);
        assert_eq!(result.steps, ValidationSteps::default());
    }

    #[test]
    fn error_code_display_matches_serde() {
        for code in [
            ErrorCode::InvalidFormat,
            ErrorCode::DomainNotFound,
            ErrorCode::MailboxNotFound,
            ErrorCode::Timeout,
            ErrorCode::RateLimited,
            ErrorCode::NetworkError,
        ] {
            let serialized = serde_json::to_value(code).unwrap();
            assert_eq!(serialized, json!(code.to_string()));
        }
    }
}
