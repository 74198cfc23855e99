use utoipa::OpenApi;

/// OpenAPI document for the REST surface, generated at compile time from the
/// route annotations and served by Swagger UI at `/swagger-ui/`.
///
/// # Endpoints
/// - Health Check: `GET /api/v1/health`
/// - Email Validation: `POST /api/v1/validate-email`
/// - Bulk Email Validation: `POST /api/v1/validate-emails-bulk`
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::email::validate_email,
        crate::routes::email::validate_emails_bulk,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::email::ValidationRequest,
            crate::models::email::ValidationResult,
            crate::models::email::ValidationSteps,
            crate::models::email::ErrorCode,
            crate::routes::ErrorResponse,
            crate::routes::email::BulkValidationRequest,
            crate::routes::email::BulkValidationItem,
            crate::routes::email::BulkValidationResponse
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Email Validation", description = "Email address deliverability checks")
    ),
    info(
        description = "Checks whether an email address is well-formed, whether its domain exists, and whether its mail exchanger accepts connections",
        title = "Email Verifier API",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
