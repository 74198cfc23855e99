use crate::config::AppConfig;
use crate::models::{ErrorCode, ValidationRequest, ValidationResult, email::DEFAULT_TIMEOUT_MILLIS};
use crate::orchestrator::ValidationOrchestrator;
use crate::routes::ErrorResponse;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

/// Largest batch accepted by the bulk endpoint.
pub const MAX_BULK_EMAILS: usize = 50;

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Deserialize, Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkValidationRequest {
    pub emails: Vec<String>,
    pub check_domain: Option<bool>,
    pub check_mailbox: Option<bool>,
    /// Per network call timeout, in milliseconds.
    pub timeout: Option<u64>,
}

impl BulkValidationRequest {
    fn requests(&self) -> Vec<ValidationRequest> {
        self.emails
            .iter()
            .map(|email| {
                ValidationRequest::new(email.as_str())
                    .with_domain_check(self.check_domain.unwrap_or(true))
                    .with_mailbox_check(self.check_mailbox.unwrap_or(true))
                    .with_timeout_millis(self.timeout.unwrap_or(DEFAULT_TIMEOUT_MILLIS))
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BulkValidationItem {
    pub email: String,
    pub validation: ValidationResult,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkValidationResponse {
    pub results: Vec<BulkValidationItem>,
    pub valid_count: usize,
    pub invalid_count: usize,
}

/// How the rate-limit identity of a caller is derived. Registered as app
/// data; when absent, only the socket peer address is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientIdentity {
    trust_proxy_headers: bool,
}

impl ClientIdentity {
    /// Keys callers on the TCP peer address.
    pub fn peer_only() -> Self {
        Self::default()
    }

    /// Keys callers on `Forwarded`/`X-Forwarded-For`, falling back to the peer.
    pub fn behind_proxy() -> Self {
        Self {
            trust_proxy_headers: true,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            trust_proxy_headers: config.trust_proxy_headers,
        }
    }

    fn identify(&self, req: &HttpRequest) -> String {
        if self.trust_proxy_headers {
            if let Some(addr) = req.connection_info().realip_remote_addr() {
                return addr.to_owned();
            }
        }
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

fn client_identifier(req: &HttpRequest) -> String {
    req.app_data::<web::Data<ClientIdentity>>()
        .map(|identity| *identity.get_ref())
        .unwrap_or_default()
        .identify(req)
}

fn status_for(result: &ValidationResult) -> StatusCode {
    if result.has_error(ErrorCode::RateLimited) {
        StatusCode::TOO_MANY_REQUESTS
    } else if result.has_error(ErrorCode::NetworkError) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

fn check_request(request: &ValidationRequest) -> Result<(), ErrorResponse> {
    if request.email.trim().is_empty() {
        return Err(ErrorResponse::invalid_request("email must not be empty"));
    }
    if request.timeout_millis == 0 {
        return Err(ErrorResponse::invalid_request("timeout must be positive"));
    }
    Ok(())
}

/// # Email Validation Endpoint
///
/// Runs one address through the validation pipeline:
/// 1. Format check against the address grammar
/// 2. Domain existence (allowlist, DNS, then label syntax)
/// 3. Mailbox reachability (TCP connect to the preferred MX), optional
///
/// A `200` does not mean the address is valid; read `isValid` in the body.
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com", "checkMailbox": false }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-email",
    request_body = ValidationRequest,
    responses(
        (status = 200, description = "Validation completed", body = ValidationResult),
        (status = 400, description = "Unreadable request", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ValidationResult),
        (status = 500, description = "Unexpected network failure", body = ValidationResult)
    ),
    tag = "Email Validation"
)]
#[post("/validate-email")]
pub async fn validate_email(
    req: HttpRequest,
    body: web::Json<ValidationRequest>,
    orchestrator: web::Data<ValidationOrchestrator>,
) -> impl Responder {
    let request = body.into_inner();
    if let Err(error) = check_request(&request) {
        return HttpResponse::BadRequest().json(error);
    }

    let identifier = client_identifier(&req);
    let result = orchestrator.validate(&request, &identifier).await;
    HttpResponse::build(status_for(&result)).json(result)
}

/// # Bulk Email Validation Endpoint
///
/// Validates up to [`MAX_BULK_EMAILS`] addresses concurrently with shared
/// options. Each address counts against the caller's rate limit, so a large
/// batch can come back partly `RATE_LIMITED`.
///
/// ## Example Request
/// ```json
/// { "emails": ["user1@example.com", "user2@example.com"], "checkMailbox": false }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-emails-bulk",
    request_body = BulkValidationRequest,
    responses(
        (status = 200, description = "Per-address results with counts", body = BulkValidationResponse),
        (status = 400, description = "Unreadable request or batch too large", body = ErrorResponse)
    ),
    tag = "Email Validation"
)]
#[post("/validate-emails-bulk")]
pub async fn validate_emails_bulk(
    req: HttpRequest,
    body: web::Json<BulkValidationRequest>,
    orchestrator: web::Data<ValidationOrchestrator>,
) -> impl Responder {
    if body.emails.len() > MAX_BULK_EMAILS {
        return HttpResponse::BadRequest().json(ErrorResponse::invalid_request(format!(
            "at most {MAX_BULK_EMAILS} emails per request"
        )));
    }
    if body.timeout == Some(0) {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::invalid_request("timeout must be positive"));
    }

    let identifier = client_identifier(&req);
    let requests = body.requests();
    debug!(count = requests.len(), identifier = %identifier, "bulk validation");
    let results = orchestrator.validate_many(&requests, &identifier).await;

    let valid_count = results.iter().filter(|result| result.is_valid).count();
    let response = BulkValidationResponse {
        invalid_count: results.len() - valid_count,
        valid_count,
        results: requests
            .into_iter()
            .zip(results)
            .map(|(request, validation)| BulkValidationItem {
                email: request.email,
                validation,
            })
            .collect(),
    };
    HttpResponse::Ok().json(response)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(validate_email).service(validate_emails_bulk);
}
