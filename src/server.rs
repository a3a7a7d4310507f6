use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hyper::Server;
use serde_json::{json, Value};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::TrackShipmentUseCase;
use crate::config::Config;
use crate::domain::TrackItShipment;
use crate::error::{NormalizeError, TrackItError};
use crate::infra::{InMemoryShipmentStore, LatencyInjector, MockCarrierFeed};
use crate::normalize::ShipmentNormalizer;
use crate::observability::metrics;
use crate::rate_limiter::RateLimiter;

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    pub tracking: Arc<TrackShipmentUseCase>,
    pub feed: Arc<MockCarrierFeed>,
    pub rate_limiter: RateLimiter,
    pub latency: Arc<LatencyInjector>,
}

impl AppState {
    pub fn new(
        normalizer: Arc<ShipmentNormalizer>,
        feed: Arc<MockCarrierFeed>,
        rate_limiter: RateLimiter,
        latency: LatencyInjector,
    ) -> Self {
        let store = Arc::new(InMemoryShipmentStore::new());
        let tracking = Arc::new(TrackShipmentUseCase::new(normalizer, feed.clone(), store));
        Self {
            tracking,
            feed,
            rate_limiter,
            latency: Arc::new(latency),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let normalizer =
            Arc::new(ShipmentNormalizer::new().with_vocabulary(config.status_vocabulary()));
        let feed = Arc::new(MockCarrierFeed::generate(
            config.simulation.mock_shipments,
            config.simulation.seed,
            config.simulation.drift_probability,
        ));
        Self::new(
            normalizer,
            feed,
            RateLimiter::from_config(&config.rate_limit),
            LatencyInjector::from_config(&config.simulation),
        )
    }
}

/// Maps service errors onto HTTP responses: caller mistakes are 4xx, anything
/// else is a 500. Every variant renders the same `{error, detail, field}` body.
pub enum ApiError {
    Service(TrackItError),
    /// Request body that is not JSON, or not sent as JSON
    Body(JsonRejection),
}

impl From<TrackItError> for ApiError {
    fn from(e: TrackItError) -> Self {
        ApiError::Service(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

pub fn status_for(error: &TrackItError) -> StatusCode {
    match error {
        TrackItError::NotFound(_) => StatusCode::NOT_FOUND,
        TrackItError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        TrackItError::Normalize(NormalizeError::UnrecognizedCarrier(_)) => StatusCode::BAD_REQUEST,
        TrackItError::Normalize(NormalizeError::ValidationFailed { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            ApiError::Service(error) => error,
            ApiError::Body(rejection) => {
                let body = json!({
                    "error": "invalid_body",
                    "detail": rejection.body_text(),
                    "field": Value::Null,
                });
                return (rejection.status(), Json(body)).into_response();
            }
        };

        let status = status_for(&error);
        let (kind, field) = match &error {
            TrackItError::NotFound(_) => ("not_found", None),
            TrackItError::RateLimited(_) => ("rate_limited", None),
            TrackItError::Normalize(NormalizeError::UnrecognizedCarrier(_)) => {
                ("unrecognized_carrier", None)
            }
            TrackItError::Normalize(NormalizeError::ValidationFailed { source, .. }) => {
                (source.kind(), Some(source.field().to_string()))
            }
            _ => ("internal", None),
        };
        if status.is_server_error() {
            warn!(error = %error, "Request failed");
        }

        let body = json!({
            "error": kind,
            "detail": error.to_string(),
            "field": field,
        });
        (status, Json(body)).into_response()
    }
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "TrackIt API is running. Use /api/v1/track/{id} for shipment tracking."
    }))
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "trackit",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Fetch from the upstream carrier, normalize, store and return the canonical record
async fn track_shipment(
    State(state): State<AppState>,
    Path(tracking_id): Path<String>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<TrackItShipment>, ApiError> {
    metrics::api::request("track");

    let client = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    if let Err(e) = state.rate_limiter.check(&client).await {
        metrics::api::rate_limited();
        warn!(client = %client, "Rate limit exceeded");
        return Err(e.into());
    }

    if state.latency.maybe_delay().await {
        metrics::api::latency_injected();
    }
    state.feed.maybe_drift().await;

    let shipment = state.tracking.track(&tracking_id).await?;
    Ok(Json(shipment))
}

/// Return a shipment that was already normalized, without touching the carrier
async fn get_normalized_shipment(
    State(state): State<AppState>,
    Path(tracking_id): Path<String>,
) -> Result<Json<TrackItShipment>, ApiError> {
    metrics::api::request("standard");
    Ok(Json(state.tracking.lookup(&tracking_id).await?))
}

/// Normalize an arbitrary payload for the given carrier; nothing is stored
async fn normalize_payload(
    State(state): State<AppState>,
    Path(carrier): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TrackItShipment>, ApiError> {
    metrics::api::request("normalize");
    let Json(raw) = body?;
    Ok(Json(state.tracking.normalize_payload(&raw, &carrier)?))
}

/// Accept a carrier push notification. Only the envelope is checked; the
/// payload is acknowledged, not processed.
async fn webhook_simulator(body: Result<Json<Value>, JsonRejection>) -> Response {
    metrics::api::request("webhook");
    let data = match body {
        Ok(Json(data)) => data,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    if data.get("tracking_id").is_some() && data.get("new_status").is_some() {
        let receipt_id = Uuid::new_v4();
        info!(receipt_id = %receipt_id, "Webhook accepted");
        (
            StatusCode::ACCEPTED,
            Json(json!({
                "message": "Webhook received",
                "receipt_id": receipt_id,
            })),
        )
            .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_fields",
                "detail": "Webhook payload requires tracking_id and new_status",
                "field": Value::Null,
            })),
        )
            .into_response()
    }
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/v1/track/:tracking_id", get(track_shipment))
        .route("/api/trackit/standard/:tracking_id", get(get_normalized_shipment))
        .route("/api/v1/normalize/:carrier", post(normalize_payload))
        .route("/api/v1/webhook_simulator", post(webhook_simulator))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config);
    info!(
        shipments = state.feed.len().await,
        carriers = ?state.tracking.normalizer().registry().list_carriers(),
        "Mock carrier feed ready"
    );

    let reset_task = state.rate_limiter.spawn_reset_task();
    let app = create_server(state);

    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    info!(%addr, "TrackIt API listening");

    Server::bind(&addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    reset_task.abort();
    Ok(())
}
