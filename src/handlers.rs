use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::catalog::{VehicleCatalog, VehicleSpec};
use crate::config::Config;
use crate::crm_client::CrmForwarder;
use crate::errors::AppError;
use crate::lead_handler;
use crate::mailer::NotificationDispatcher;

/// Request bodies above this size are rejected before parsing.
pub const MAX_BODY_BYTES: usize = 1_000_000;

/// Shared application state injected into handlers.
///
/// Built once at startup; nothing here mutates per request, so requests
/// share it without synchronization.
pub struct AppState {
    /// Vehicle dataset backing the comparison table.
    pub catalog: VehicleCatalog,
    /// Best-effort CRM delivery.
    pub crm: CrmForwarder,
    /// Best-effort transactional email delivery.
    pub mailer: NotificationDispatcher,
}

impl AppState {
    /// Wires every component from configuration plus a parsed catalog.
    pub fn new(config: Config, catalog: VehicleCatalog) -> Self {
        Self {
            crm: CrmForwarder::new(&config),
            mailer: NotificationDispatcher::new(&config),
            catalog,
        }
    }
}

/// Builds the application router with its middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/leads",
            post(lead_handler::submit_lead).fallback(lead_handler::method_not_allowed),
        )
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles/:id", get(get_vehicle))
        .route("/api/makes", get(list_makes))
        .with_state(state)
        // Cap raw payload size; oversized bodies abort before the handler runs
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "concierge-leads-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

#[derive(Debug, Deserialize)]
pub struct VehicleQuery {
    /// Restrict the listing to a single make.
    pub make: Option<String>,
}

/// GET /api/vehicles
pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VehicleQuery>,
) -> Json<Vec<VehicleSpec>> {
    let specs = match query.make {
        Some(ref make) => state
            .catalog
            .by_make(make)
            .into_iter()
            .cloned()
            .collect(),
        None => state.catalog.all().to_vec(),
    };

    Json(specs)
}

/// GET /api/vehicles/:id
pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VehicleSpec>, AppError> {
    state
        .catalog
        .by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No vehicle with id '{}'", id)))
}

/// GET /api/makes
pub async fn list_makes(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.catalog.makes())
}
