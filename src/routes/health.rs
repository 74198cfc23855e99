use crate::models::HealthResponse;
use crate::orchestrator::ValidationOrchestrator;
use actix_web::{HttpResponse, Responder, get, web};

/// # Health Check Endpoint
///
/// Returns `UP`, a timestamp, and the number of cached results and tracked
/// clients held in memory.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health Check"
)]
#[get("/health")]
pub async fn health(orchestrator: web::Data<ValidationOrchestrator>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::up(
        orchestrator.cached_results(),
        orchestrator.tracked_clients(),
    ))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
