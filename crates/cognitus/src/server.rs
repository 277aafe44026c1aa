//! HTTP review API.
//!
//! A review surface (a TUI, a browser page, a script) drives Cognitus over
//! JSON. The server opens the collection and index, runs one sync pass,
//! and only then binds, so every admission it serves sees a synced index.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Status, version, and whether the index is synced |
//! | `POST`   | `/sync` | Run a sync pass and return its report |
//! | `POST`   | `/cards/check` | Classify `{front, back}` without writing |
//! | `POST`   | `/cards` | Admit `{topic, front, back}` |
//! | `DELETE` | `/cards/{id}` | Remove a card and its index entry |
//! | `POST`   | `/generate` | Generate candidates for `{topic}`; `save: true` admits them |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_synced", "message": "the index has not been synced with the collection yet" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `not_synced` (409),
//! `store_unavailable` (503), `index_corrupt` (500), `generation_failed`
//! (502), `internal` (500).
//!
//! A rejected card is not an error: `POST /cards` answers `200` with
//! `{"status": "rejected", "matched_id": .., "score": ..}`, and `201` with
//! `{"status": "admitted", "id": .., "indexed": ..}` when a card is created.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use cognitus_core::admission::Admission;
use cognitus_core::classify::Classification;
use cognitus_core::error::{Error, IndexError, StoreError};
use cognitus_core::models::CardId;
use cognitus_core::parse::GeneratedCard;
use cognitus_core::reconcile::{NoProgress, SyncReport};

use crate::config::Config;
use crate::generate::generate_cards;
use crate::service::SqliteCognitus;

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    service: Arc<SqliteCognitus>,
}

/// Open the stores, sync, and serve on `[server].bind` until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(SqliteCognitus::open(config).await?);
    let report = service.sync(&NoProgress).await?;
    tracing::info!(
        collection = report.collection_size,
        deleted = report.deleted,
        inserted = report.inserted,
        skipped = report.skipped.len(),
        "startup sync complete"
    );

    let app = router(Arc::new(config.clone()), service);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "review API listening");
    println!("Cognitus review API listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router over an already-opened service.
pub fn router(config: Arc<Config>, service: Arc<SqliteCognitus>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/sync", post(handle_sync))
        .route("/cards/check", post(handle_check))
        .route("/cards", post(handle_admit))
        .route("/cards/{id}", delete(handle_remove))
        .route("/generate", post(handle_generate))
        .layer(cors)
        .with_state(AppState { config, service })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::NotSynced => AppError::new(StatusCode::CONFLICT, "not_synced", message),
            Error::Store(StoreError::Unavailable(_)) => {
                AppError::new(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message)
            }
            Error::Store(StoreError::NotFound(_)) => {
                AppError::new(StatusCode::NOT_FOUND, "not_found", message)
            }
            Error::Index(IndexError::Corrupt(_)) => {
                AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "index_corrupt", message)
            }
            _ => {
                tracing::error!(error = %message, "request failed");
                AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(bad_request(format!("{} must not be empty", field)));
    }
    Ok(())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    synced: bool,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        synced: state.service.is_synced().await,
    })
}

// ============ POST /sync ============

async fn handle_sync(State(state): State<AppState>) -> Result<Json<SyncReport>, AppError> {
    let report = state.service.sync(&NoProgress).await?;
    Ok(Json(report))
}

// ============ POST /cards/check ============

#[derive(Deserialize)]
struct CheckRequest {
    front: String,
    back: String,
}

async fn handle_check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<Classification>, AppError> {
    require("front", &req.front)?;
    require("back", &req.back)?;
    Ok(Json(state.service.classify(&req.front, &req.back).await?))
}

// ============ POST /cards ============

#[derive(Deserialize)]
struct AdmitRequest {
    topic: String,
    front: String,
    back: String,
}

async fn handle_admit(
    State(state): State<AppState>,
    Json(req): Json<AdmitRequest>,
) -> Result<(StatusCode, Json<Admission>), AppError> {
    require("topic", &req.topic)?;
    require("front", &req.front)?;
    require("back", &req.back)?;

    let admission = state
        .service
        .admit(&req.topic, &req.front, &req.back)
        .await?;
    let status = if admission.is_admitted() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(admission)))
}

// ============ DELETE /cards/{id} ============

#[derive(Serialize)]
struct RemoveResponse {
    removed: CardId,
}

async fn handle_remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RemoveResponse>, AppError> {
    let id = CardId(id);
    if !state.service.remove(id).await? {
        return Err(AppError::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("card {} not found in the collection", id),
        ));
    }
    Ok(Json(RemoveResponse { removed: id }))
}

// ============ POST /generate ============

#[derive(Deserialize)]
struct GenerateRequest {
    topic: String,
    #[serde(default)]
    save: bool,
}

#[derive(Serialize)]
struct GenerateResponse {
    topic: String,
    cards: Vec<GeneratedCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admissions: Option<Vec<Admission>>,
}

async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    require("topic", &req.topic)?;
    if !state.config.generation.is_enabled() {
        return Err(bad_request("generation is disabled in the configuration"));
    }

    // No service lock is held while the request is in flight.
    let cards = generate_cards(&state.config.generation, &req.topic)
        .await
        .map_err(|e| AppError::new(StatusCode::BAD_GATEWAY, "generation_failed", e.to_string()))?;

    let admissions = if req.save {
        Some(state.service.admit_all(&req.topic, &cards).await?)
    } else {
        None
    };

    Ok(Json(GenerateResponse {
        topic: req.topic,
        cards,
        admissions,
    }))
}
