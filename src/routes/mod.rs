use actix_web::{HttpRequest, HttpResponse, error, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Health Check Endpoint
///
/// Liveness plus the current size of the result cache and rate-limit table.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "UP",
///   "timestamp": "2023-10-05T12:34:56.789Z",
///   "cachedResults": 4,
///   "trackedClients": 1
/// }
/// ```
pub mod health;

/// # Email Validation Endpoints
///
/// Single and bulk validation of addresses through the format, domain and
/// mailbox stages.
///
/// ## Request
/// - Method: POST
/// - Body: `{ "email": "...", "checkDomain": true, "checkMailbox": true, "timeout": 10000 }`
///
/// ## Responses
/// - **200 OK**: Validation ran; the body says whether the address is valid
/// - **400 Bad Request**: Body could not be read as a validation request
/// - **429 Too Many Requests**: Client exceeded its request budget
/// - **500 Internal Server Error**: A network stage failed unexpectedly
pub mod email;

#[cfg(test)]
mod email_test;

/// Body of every 400 produced by the API.
#[derive(Serialize, Deserialize, Debug, PartialEq, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            error: "INVALID_REQUEST".to_string(),
            message: message.into(),
        }
    }
}

/// Rejects unreadable JSON bodies with an [`ErrorResponse`] instead of
/// actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let body = ErrorResponse::invalid_request(err.to_string());
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// # API Route Configuration
///
/// Sets up versioned API endpoints under the `/api/v1` base path.
///
/// ```text
/// GET  /api/v1/health
/// POST /api/v1/validate-email
/// POST /api/v1/validate-emails-bulk
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(json_config())
            .configure(health::configure_routes)
            .configure(email::configure_routes),
    );
}
