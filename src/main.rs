use std::sync::Arc;

use actix_web::{App, HttpServer, web::Data};
use email_verifier::clock::system_clock;
use email_verifier::config::AppConfig;
use email_verifier::openapi::ApiDoc;
use email_verifier::orchestrator::ValidationOrchestrator;
use email_verifier::routes::email::ClientIdentity;
use email_verifier::telemetry;
use email_verifier::validation::{DnsResolver, SystemResolver};
use email_verifier::worker::SweepWorker;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Verifier Service Entry Point
///
/// Loads `.env`, reads [`AppConfig`], installs logging, and serves:
/// - REST API under `/api/v1` (configured in routes)
/// - Swagger UI at `/swagger-ui/`
/// - OpenAPI spec at `/api-docs/openapi.json`
///
/// A background [`SweepWorker`] trims expired cache and rate-limit entries.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    telemetry::init(config.log_format);

    let resolver: Arc<dyn DnsResolver> = match SystemResolver::from_system_conf() {
        Ok(resolver) => Arc::new(resolver),
        Err(e) => {
            warn!(error = %e, "system resolver config unavailable, using defaults");
            Arc::new(SystemResolver::with_defaults())
        }
    };

    let orchestrator = Arc::new(ValidationOrchestrator::from_config(
        &config,
        resolver,
        system_clock(),
    ));

    let sweeper = SweepWorker::new(orchestrator.clone(), config.sweep_interval);
    let sweep_task = tokio::spawn(async move { sweeper.start().await });

    let state = Data::from(orchestrator);
    let identity = Data::new(ClientIdentity::from_config(&config));
    if config.trust_proxy_headers {
        info!("rate limiting on forwarded client addresses");
    }
    info!(addr = %config.bind_addr, port = config.port, "starting http server");

    let served = HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .app_data(identity.clone())
            .configure(email_verifier::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await;

    sweep_task.abort();
    served
}
