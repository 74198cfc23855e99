use super::email::{BulkValidationResponse, ClientIdentity, MAX_BULK_EMAILS};
use super::{ErrorResponse, configure};
use crate::clock::system_clock;
use crate::config::AppConfig;
use crate::models::{ErrorCode, ValidationResult};
use crate::orchestrator::ValidationOrchestrator;
use crate::orchestrator::tests::PanickingResolver;
use crate::rate_limit::RateLimitConfig;
use crate::validation::DnsResolver;
use crate::validation::dns::MockDnsResolver;
use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, test, web};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

async fn app_with(
    resolver: impl DnsResolver + 'static,
    max_requests: u32,
) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    app_with_identity(resolver, max_requests, ClientIdentity::peer_only()).await
}

async fn app_with_identity(
    resolver: impl DnsResolver + 'static,
    max_requests: u32,
    identity: ClientIdentity,
) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    let config = AppConfig {
        rate_limit: RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests,
        },
        ..AppConfig::default()
    };
    let orchestrator =
        ValidationOrchestrator::from_config(&config, Arc::new(resolver), system_clock());
    test::init_service(
        App::new()
            .app_data(web::Data::new(orchestrator))
            .app_data(web::Data::new(identity))
            .configure(configure),
    )
    .await
}

fn peer(ip: &str) -> SocketAddr {
    SocketAddr::new(ip.parse().unwrap(), 4000)
}

fn post_single(body: serde_json::Value, client: &str) -> Request {
    test::TestRequest::post()
        .uri("/api/v1/validate-email")
        .peer_addr(peer(client))
        .set_json(body)
        .to_request()
}

#[actix_web::test]
async fn test_valid_email_without_network_checks() {
    let mut resolver = MockDnsResolver::new();
    resolver.expect_lookup_host().times(0);
    let app = app_with(resolver, 10).await;

    let req = post_single(
        json!({"email": "jane.doe@example.com", "checkDomain": false, "checkMailbox": false}),
        "10.1.1.1",
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let result: ValidationResult = test::read_body_json(resp).await;
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert!(result.steps.format && result.steps.domain && result.steps.mailbox);
}

#[actix_web::test]
async fn test_invalid_format_is_still_200() {
    let app = app_with(MockDnsResolver::new(), 10).await;

    let req = post_single(json!({"email": "not-an-address"}), "10.1.1.2");
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["isValid"], json!(false));
    assert_eq!(body["errors"], json!(["INVALID_FORMAT"]));
    assert_eq!(body["validationSteps"]["format"], json!(false));
    assert!(body["processingTime"].is_u64());
}

#[actix_web::test]
async fn test_unreadable_bodies_are_rejected() {
    let app = app_with(MockDnsResolver::new(), 10).await;

    let cases = [
        test::TestRequest::post()
            .uri("/api/v1/validate-email")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request(),
        post_single(json!({"checkDomain": true}), "10.1.1.3"),
        post_single(json!({"email": 42}), "10.1.1.3"),
        post_single(json!({"email": ""}), "10.1.1.3"),
        post_single(json!({"email": "   "}), "10.1.1.3"),
        post_single(json!({"email": "a@b.io", "timeout": 0}), "10.1.1.3"),
    ];

    for req in cases {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "INVALID_REQUEST");
        assert!(!body.message.is_empty());
    }
}

#[actix_web::test]
async fn test_rate_limit_maps_to_429_per_client() {
    let app = app_with(MockDnsResolver::new(), 2).await;
    let body = json!({"email": "a@example.com", "checkDomain": false, "checkMailbox": false});

    for _ in 0..2 {
        let resp = test::call_service(&app, post_single(body.clone(), "192.0.2.10")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(&app, post_single(body.clone(), "192.0.2.10")).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let result: ValidationResult = test::read_body_json(resp).await;
    assert_eq!(result.errors, vec![ErrorCode::RateLimited]);
    assert!(!result.steps.format);

    let resp = test::call_service(&app, post_single(body, "192.0.2.11")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_requests_without_client_address_share_a_budget() {
    let app = app_with(MockDnsResolver::new(), 1).await;
    let request = || {
        test::TestRequest::post()
            .uri("/api/v1/validate-email")
            .set_json(json!({"email": "x@example.com", "checkDomain": false, "checkMailbox": false}))
            .to_request()
    };

    assert_eq!(test::call_service(&app, request()).await.status(), StatusCode::OK);
    assert_eq!(
        test::call_service(&app, request()).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[actix_web::test]
async fn test_forwarded_headers_do_not_reset_the_budget() {
    let app = app_with(MockDnsResolver::new(), 1).await;
    let body = json!({"email": "a@example.com", "checkDomain": false, "checkMailbox": false});

    let mut statuses = Vec::new();
    for i in 0..5 {
        let req = test::TestRequest::post()
            .uri("/api/v1/validate-email")
            .peer_addr(peer("198.51.100.9"))
            .insert_header(("x-forwarded-for", format!("203.0.113.{i}")))
            .set_json(body.clone())
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }

    assert_eq!(statuses[0], StatusCode::OK);
    assert!(
        statuses[1..]
            .iter()
            .all(|status| *status == StatusCode::TOO_MANY_REQUESTS)
    );
}

#[actix_web::test]
async fn test_trusted_proxy_keys_on_forwarded_client() {
    let app = app_with_identity(MockDnsResolver::new(), 1, ClientIdentity::behind_proxy()).await;
    let body = json!({"email": "a@example.com", "checkDomain": false, "checkMailbox": false});
    let via_proxy = |client: &str| {
        test::TestRequest::post()
            .uri("/api/v1/validate-email")
            .peer_addr(peer("10.0.0.2"))
            .insert_header(("x-forwarded-for", client.to_string()))
            .set_json(body.clone())
            .to_request()
    };

    assert_eq!(
        test::call_service(&app, via_proxy("203.0.113.1")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        test::call_service(&app, via_proxy("203.0.113.2")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        test::call_service(&app, via_proxy("203.0.113.1")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[actix_web::test]
async fn test_stage_panic_maps_to_500() {
    let app = app_with(PanickingResolver, 10).await;

    let req = post_single(json!({"email": "user@example.com"}), "10.1.1.4");
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let result: ValidationResult = test::read_body_json(resp).await;
    assert_eq!(result.errors, vec![ErrorCode::NetworkError]);
}

#[actix_web::test]
async fn test_bulk_validation_counts_and_order() {
    let app = app_with(MockDnsResolver::new(), 10).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/validate-emails-bulk")
        .peer_addr(peer("10.2.2.2"))
        .set_json(json!({
            "emails": ["first@example.com", "broken", "third@example.org"],
            "checkDomain": false,
            "checkMailbox": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: BulkValidationResponse = test::read_body_json(resp).await;
    assert_eq!(body.valid_count, 2);
    assert_eq!(body.invalid_count, 1);
    let emails: Vec<&str> = body.results.iter().map(|item| item.email.as_str()).collect();
    assert_eq!(emails, ["first@example.com", "broken", "third@example.org"]);
    assert_eq!(body.results[1].validation.errors, vec![ErrorCode::InvalidFormat]);
}

#[actix_web::test]
async fn test_bulk_validation_spends_rate_limit_per_address() {
    let app = app_with(MockDnsResolver::new(), 2).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/validate-emails-bulk")
        .peer_addr(peer("10.3.3.3"))
        .set_json(json!({
            "emails": ["a@example.com", "b@example.com", "c@example.com"],
            "checkDomain": false,
            "checkMailbox": false
        }))
        .to_request();
    let body: BulkValidationResponse = test::call_and_read_body_json(&app, req).await;

    let limited = body
        .results
        .iter()
        .filter(|item| item.validation.errors == vec![ErrorCode::RateLimited])
        .count();
    assert_eq!(limited, 1);
    assert_eq!(body.valid_count, 2);
}

#[actix_web::test]
async fn test_bulk_validation_accepts_empty_list() {
    let app = app_with(MockDnsResolver::new(), 10).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/validate-emails-bulk")
        .set_json(json!({"emails": []}))
        .to_request();
    let body: BulkValidationResponse = test::call_and_read_body_json(&app, req).await;
    assert!(body.results.is_empty());
    assert_eq!(body.valid_count, 0);
    assert_eq!(body.invalid_count, 0);
}

#[actix_web::test]
async fn test_bulk_validation_rejects_oversized_batches() {
    let app = app_with(MockDnsResolver::new(), 10).await;
    let emails: Vec<String> = (0..=MAX_BULK_EMAILS)
        .map(|i| format!("user{i}@example.com"))
        .collect();

    let req = test::TestRequest::post()
        .uri("/api/v1/validate-emails-bulk")
        .set_json(json!({"emails": emails}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "INVALID_REQUEST");
}
