use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use trackit::infra::{LatencyInjector, MockCarrierFeed};
use trackit::normalize::FixedClock;
use trackit::rate_limiter::RateLimiter;
use trackit::server::{create_server, AppState};
use trackit::ShipmentNormalizer;

const NOW: f64 = 1_700_000_000.0;

fn app_with_limiter(rate_limiter: RateLimiter) -> Router {
    let normalizer = Arc::new(ShipmentNormalizer::new().with_clock(Arc::new(FixedClock(NOW))));
    let feed = Arc::new(MockCarrierFeed::generate(4, Some(11), 0.0));
    let state = AppState::new(normalizer, feed, rate_limiter, LatencyInjector::disabled());
    create_server(state)
}

fn app() -> Router {
    app_with_limiter(RateLimiter::unlimited())
}

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_and_health() -> Result<()> {
    let app = app();

    let (status, body) = send(&app, get("/")).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("TrackIt"));

    let (status, body) = send(&app, get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_track_normalizes_both_formats() -> Result<()> {
    let app = app();

    let (status, body) = send(&app, get("/api/v1/track/TRACK0001")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tracking_id"], "TRACK0001");
    assert_eq!(body["carrier_name"], "Format-B");
    assert_eq!(body["last_update"], NOW);

    let (status, body) = send(&app, get("/api/v1/track/TRACK0002")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["carrier_name"], "Format-A");
    assert!(body["current_location"]["latitude"].is_f64());
    Ok(())
}

#[tokio::test]
async fn test_track_unknown_shipment_is_404() -> Result<()> {
    let (status, body) = send(&app(), get("/api/v1/track/NOEXISTE9999")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    Ok(())
}

#[tokio::test]
async fn test_standard_endpoint_serves_stored_records() -> Result<()> {
    let app = app();

    let (status, _) = send(&app, get("/api/trackit/standard/TRACK0003")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, tracked) = send(&app, get("/api/v1/track/TRACK0003")).await?;
    let (status, stored) = send(&app, get("/api/trackit/standard/TRACK0003")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, tracked);
    Ok(())
}

#[tokio::test]
async fn test_normalize_endpoint() -> Result<()> {
    let payload = json!({
        "id_seguimiento": "TRACKB",
        "estado": "Entregado",
        "detalles": "x",
        "ubicacion": {"latitud": 6.3, "longitud": -75.6}
    });

    let (status, body) = send(&app(), post_json("/api/v1/normalize/Format-B", payload)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["normalized_status"], "DELIVERED");
    assert_eq!(body["current_location"], json!({"latitude": 6.3, "longitude": -75.6}));
    Ok(())
}

#[tokio::test]
async fn test_normalize_unrecognized_carrier_is_400() -> Result<()> {
    let (status, body) = send(
        &app(),
        post_json("/api/v1/normalize/Format-X", json!({"foo": "bar"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unrecognized_carrier");
    assert!(body["field"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_normalize_invalid_payload_is_422() -> Result<()> {
    let (status, body) = send(
        &app(),
        post_json("/api/v1/normalize/Format-A", json!({"tracking_number": "T1"})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "missing_field");
    assert!(body["field"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_returns_429() -> Result<()> {
    let app = app_with_limiter(RateLimiter::new(2, Duration::from_secs(60)));

    for _ in 0..2 {
        let (status, _) = send(&app, get("/api/v1/track/TRACK0002")).await?;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, get("/api/v1/track/TRACK0002")).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");

    // Only the tracking route is limited
    let (status, _) = send(&app, get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_webhook_simulator() -> Result<()> {
    let app = app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/webhook_simulator",
            json!({"tracking_id": "TRACK0001", "new_status": "Entregado"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::ACCEPTED);
    let receipt = body["receipt_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(receipt).is_ok());

    let (status, body) = send(
        &app,
        post_json("/api/v1/webhook_simulator", json!({"tracking_id": "TRACK0001"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_fields");
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() -> Result<()> {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/normalize/Format-A")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"tracking_number\": "))
        .unwrap();
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");
    assert!(body["detail"].is_string());
    assert!(body["field"].is_null());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/webhook_simulator")
        .body(Body::from("tracking_id=TRACK0001"))
        .unwrap();
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "invalid_body");
    Ok(())
}
