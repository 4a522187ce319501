//! HTTP routes.
//!
//! The HTTP surface is a thin mapping over the ingestion coordinator:
//! it parses the request, invokes `ingest`/`fetch`, and translates the
//! outcome to a status code and JSON body. No validation or persistence
//! logic lives here.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use crate::ingest::{IngestCoordinator, IngestOutcome};
use crate::schema::Violation;
use crate::store::{StoreBackend, StoreRecord};

/// Shared state for all handlers.
pub struct AppState {
    /// The ingestion engine
    pub coordinator: IngestCoordinator<StoreBackend>,
    /// Schema directory, re-read on reload requests
    pub schema_dir: PathBuf,
}

/// Query parameters for ingestion.
#[derive(Debug, Deserialize)]
pub struct IngestQuery {
    /// Explicit schema version; absent means latest
    pub version: Option<u32>,
}

/// Body returned for a persisted document.
#[derive(Debug, Serialize)]
pub struct PersistedResponse {
    pub id: String,
    pub schema: String,
    pub version: u32,
    pub persisted_at: String,
}

impl From<&StoreRecord> for PersistedResponse {
    fn from(record: &StoreRecord) -> Self {
        Self {
            id: record.id.clone(),
            schema: record.schema_name.clone(),
            version: record.schema_version,
            persisted_at: record.persisted_at.to_rfc3339(),
        }
    }
}

/// Body returned for a rejected document.
#[derive(Debug, Serialize)]
pub struct RejectedResponse {
    pub error: &'static str,
    pub violations: Vec<Violation>,
}

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// One catalog entry.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub version: u32,
    pub latest: bool,
}

/// Catalog body.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub schemas: Vec<CatalogEntry>,
}

/// Reload body.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub loaded: usize,
}

/// Builds the API router.
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ingest/:name", post(ingest_document))
        .route(
            "/documents/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/healthcheck", get(healthcheck))
        .route("/schemas", get(list_schemas))
        .route("/schemas/reload", post(reload_schemas))
        .with_state(state)
}

/// POST /ingest/:name - validate and persist one document.
async fn ingest_document(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<IngestQuery>,
    Json(document): Json<Value>,
) -> ApiResult<Response> {
    let outcome = state
        .coordinator
        .ingest(document, &name, query.version)
        .await?;

    Ok(match outcome {
        IngestOutcome::Persisted(record) => (
            StatusCode::CREATED,
            Json(PersistedResponse::from(&record)),
        )
            .into_response(),
        IngestOutcome::Rejected(violations) => (
            StatusCode::BAD_REQUEST,
            Json(RejectedResponse {
                error: "document rejected",
                violations,
            }),
        )
            .into_response(),
    })
}

/// GET /documents/:id - fetch a persisted record.
async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<StoreRecord>> {
    let record = state.coordinator.fetch(&id).await?;
    Ok(Json(record))
}

/// PUT /documents/:id - replace a record's document after re-validating
/// it against the schema the record was accepted under.
async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(document): Json<Value>,
) -> ApiResult<Response> {
    let outcome = state.coordinator.update(&id, document).await?;

    Ok(match outcome {
        IngestOutcome::Persisted(record) => {
            (StatusCode::OK, Json(PersistedResponse::from(&record))).into_response()
        }
        IngestOutcome::Rejected(violations) => (
            StatusCode::BAD_REQUEST,
            Json(RejectedResponse {
                error: "document rejected",
                violations,
            }),
        )
            .into_response(),
    })
}

/// DELETE /documents/:id - remove a persisted record.
async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.coordinator.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /healthcheck - probe the store.
async fn healthcheck(State(state): State<Arc<AppState>>) -> Response {
    match state.coordinator.ping_store().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "healthy" })).into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
            }),
        )
            .into_response(),
    }
}

/// GET /schemas - list every loaded (name, version) pair.
async fn list_schemas(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let snapshot = state.coordinator.registry().snapshot();
    let schemas = snapshot
        .catalog()
        .map(|(name, version)| CatalogEntry {
            name: name.to_string(),
            version,
            latest: snapshot.latest_version(name) == Some(version),
        })
        .collect();
    Json(CatalogResponse { schemas })
}

/// POST /schemas/reload - re-read the schema directory.
///
/// A failed reload keeps the previous snapshot serving and reports the
/// load failure.
async fn reload_schemas(State(state): State<Arc<AppState>>) -> ApiResult<Json<ReloadResponse>> {
    let loaded = state.coordinator.registry().load(&state.schema_dir)?;
    Ok(Json(ReloadResponse { loaded }))
}
