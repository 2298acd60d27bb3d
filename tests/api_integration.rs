/// End-to-end tests driving the full router in process.
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concierge_leads_api::catalog::VehicleCatalog;
use concierge_leads_api::config::Config;
use concierge_leads_api::handlers::{router, AppState};

fn unconfigured() -> Config {
    Config {
        port: 3000,
        crm_webhook_url: None,
        crm_webhook_token: None,
        resend_api_key: None,
        resend_from_email: "concierge@edmonton-cars.ca".to_string(),
        email_api_base_url: "https://api.resend.com".to_string(),
        smtp_account: None,
        smtp_password: None,
        concierge_inbox: "leads@edmonton-cars.ca".to_string(),
    }
}

fn app(config: Config) -> axum::Router {
    let catalog = VehicleCatalog::from_embedded().unwrap();
    router(Arc::new(AppState::new(config, catalog)))
}

fn post_leads(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/leads")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_submission_with_nothing_configured_returns_mocked_and_skipped() {
    let app = app(unconfigured());

    let body = r#"{
        "fullName": "Alex Taylor",
        "email": "alex@example.com",
        "vehicleCategory": "SUV",
        "budgetRange": "30-40k",
        "timeline": "1 month",
        "optIn": true
    }"#;

    let response = app.oneshot(post_leads(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["ok"], true);
    assert!(!json["leadId"].as_str().unwrap().is_empty());
    assert_eq!(json["crm"]["status"], "mocked");
    assert_eq!(json["email"]["internal"]["status"], "skipped");
    assert_eq!(json["email"]["acknowledgment"]["status"], "skipped");
}

#[tokio::test]
async fn test_missing_email_is_rejected_with_reason() {
    let app = app(unconfigured());

    let response = app
        .oneshot(post_leads(r#"{"fullName": "Alex Taylor"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_get_on_lead_endpoint_is_method_not_allowed() {
    let app = app(unconfigured());

    let request = Request::builder()
        .method("GET")
        .uri("/api/leads")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers().get(header::ALLOW).unwrap(),
        "POST"
    );

    let json = response_json(response).await;
    assert_eq!(json["error"], "Method Not Allowed");
}

#[tokio::test]
async fn test_oversized_body_is_aborted() {
    let app = app(unconfigured());

    // One byte over the cap; the limit layer refuses to buffer it
    let oversized = format!(r#"{{"notes": "{}"}}"#, "x".repeat(1_000_001));
    let response = app.oneshot(post_leads(&oversized)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_malformed_json_is_a_server_error() {
    let app = app(unconfigured());

    let response = app.oneshot(post_leads("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid JSON"));
}

#[tokio::test]
async fn test_crm_failure_still_returns_ok_to_the_caller() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/leads"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let config = Config {
        crm_webhook_url: Some(format!("{}/hooks/leads", mock_server.uri())),
        ..unconfigured()
    };

    let response = app(config)
        .oneshot(post_leads(
            r#"{"name": "Alex Taylor", "contactEmail": "alex@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["crm"]["status"], "failed");
    assert!(json["crm"]["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_crm_success_reports_forwarded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/leads"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config {
        crm_webhook_url: Some(format!("{}/hooks/leads", mock_server.uri())),
        ..unconfigured()
    };

    let response = app(config)
        .oneshot(post_leads(
            r#"{"fullName": "Alex Taylor", "email": "alex@example.com", "optIn": true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["crm"]["status"], "forwarded");

    // The forwarded payload is the normalized lead, defaults applied
    let requests = mock_server.received_requests().await.unwrap();
    let forwarded: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(forwarded["fullName"], "Alex Taylor");
    assert_eq!(forwarded["vehicleCategory"], "Not specified");
    assert_eq!(forwarded["pipelineStage"], "new");
    assert_eq!(forwarded["leadSource"], "edmonton-cars.ca");
    assert_eq!(forwarded["leadId"], json["leadId"]);
}

#[tokio::test]
async fn test_declined_consent_is_rejected() {
    let app = app(unconfigured());

    let response = app
        .oneshot(post_leads(
            r#"{"fullName": "Alex Taylor", "email": "alex@example.com", "optIn": false}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Consent"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app(unconfigured());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_vehicle_catalog_endpoints() {
    let app = app(unconfigured());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/vehicles")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let all = response_json(response).await;
    assert!(!all.as_array().unwrap().is_empty());

    let first_id = all[0]["id"].as_str().unwrap().to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/vehicles/{}", first_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = response_json(response).await;
    assert_eq!(spec["id"], first_id.as_str());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/vehicles/no-such-vehicle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/makes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let makes = response_json(response).await;
    let makes: Vec<&str> = makes
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let mut sorted = makes.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(makes, sorted);
}

#[tokio::test]
async fn test_filter_vehicles_by_make() {
    let app = app(unconfigured());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vehicles?make=Toyota")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let specs = response_json(response).await;
    let specs = specs.as_array().unwrap();
    assert!(!specs.is_empty());
    assert!(specs.iter().all(|s| s["make"] == "Toyota"));
}
