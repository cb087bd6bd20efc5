// 🌐 HTTP API - axum routes over the checker core
//
// Classification may block on the remote client, so every handler that
// classifies runs on the blocking pool.

use crate::bin_table::BinEntry;
use crate::cache::CacheStats;
use crate::classifier::BinClassifier;
use crate::report::{check_card, check_many, BatchSummary, CardReport};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<BinClassifier>,
    pub batch_limit: usize,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub cards: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    reports: Vec<CardReport>,
    summary: BatchSummary,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/check/:number - validate + classify one card
///
/// `Path` has already percent-decoded the segment once.
async fn check_single(State(state): State<AppState>, Path(number): Path<String>) -> Response {
    let classifier = Arc::clone(&state.classifier);
    match tokio::task::spawn_blocking(move || check_card(&classifier, &number)).await {
        Ok(report) => ApiResponse::ok(report),
        Err(e) => {
            error!("check task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "check failed")
        }
    }
}

/// POST /api/check - batch of cards
async fn check_batch(State(state): State<AppState>, Json(request): Json<BatchRequest>) -> Response {
    if request.cards.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Please enter credit card numbers to check.");
    }

    let classifier = Arc::clone(&state.classifier);
    let limit = state.batch_limit;
    let task = tokio::task::spawn_blocking(move || {
        let cards: Vec<&str> = request
            .cards
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        check_many(&classifier, &cards, limit)
    });

    match task.await {
        Ok(reports) => {
            let summary = BatchSummary::from_reports(&reports);
            ApiResponse::ok(BatchResponse { reports, summary })
        }
        Err(e) => {
            error!("batch task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "batch failed")
        }
    }
}

/// GET /api/bin/:prefix - issuer metadata only
async fn classify_prefix(State(state): State<AppState>, Path(prefix): Path<String>) -> Response {
    let classifier = Arc::clone(&state.classifier);
    match tokio::task::spawn_blocking(move || classifier.classify(&prefix)).await {
        Ok(entry) => ApiResponse::<BinEntry>::ok(entry),
        Err(e) => {
            error!("classify task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "classify failed")
        }
    }
}

/// GET /api/cache - cache statistics
async fn cache_stats(State(state): State<AppState>) -> Response {
    ApiResponse::<CacheStats>::ok(state.classifier.cache_stats())
}

/// DELETE /api/cache - drop cached remote answers
async fn clear_cache(State(state): State<AppState>) -> Response {
    state.classifier.clear_cache();
    ApiResponse::ok(state.classifier.cache_stats())
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/check", axum::routing::post(check_batch))
        .route("/check/:number", get(check_single))
        .route("/bin/:prefix", get(classify_prefix))
        .route("/cache", get(cache_stats).delete(clear_cache))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
