//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer or the history store.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, Utc};

use super::dto::{
    AnalysisListResponse, AnalysisRecord, AnalyzeRequest, CompareData, CreatePoiRequest,
    HealthResponse, OverlayQuery, OverlayResponse, PointOfInterest, PoiListResponse,
    RevisitOutcome, RevisitResponse, SelectionOutcome,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{AnalysisId, PoiId};
use crate::services::{self, AnalysisRequest};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verify the service is running and the history store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let store_status = match state.store.health_check().await {
        Ok(true) => "ready".to_string(),
        Ok(false) => "unavailable".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        store: store_status,
    }))
}

// =============================================================================
// Analyses
// =============================================================================

/// POST /v1/analyses
///
/// Run a full analysis of the submitted region and persist the result.
pub async fn run_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<AnalysisRecord>), AppError> {
    let record = state
        .analysis
        .run(AnalysisRequest {
            geometry: request.geometry,
            tag: request.tag,
            window: None,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/analyses
///
/// List per-record summaries of the stored history, newest first.
pub async fn list_analyses(State(state): State<AppState>) -> HandlerResult<AnalysisListResponse> {
    let records = state.store.list_analyses().await?;
    let analyses: Vec<_> = records.iter().map(services::summarize).collect();
    let total = analyses.len();

    Ok(Json(AnalysisListResponse { analyses, total }))
}

/// GET /v1/analyses/current
///
/// The current analysis, falling back to the most recent one; `null` when
/// the history is empty.
pub async fn get_current_analysis(
    State(state): State<AppState>,
) -> HandlerResult<Option<AnalysisRecord>> {
    let record = state.store.current_analysis().await?;
    Ok(Json(record))
}

/// GET /v1/analyses/{id}
///
/// The full stored record, series included.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<AnalysisRecord> {
    let record = state.store.get_analysis(&AnalysisId::new(id)).await?;
    Ok(Json(record))
}

/// DELETE /v1/analyses/{id}
///
/// Remove an analysis; the comparison selection and the current pointer
/// are pruned with it.
pub async fn delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_analysis(&AnalysisId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/analyses/{id}/selection
///
/// Toggle the analysis in the comparison selection (capped at two).
pub async fn toggle_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<SelectionOutcome> {
    let outcome = state.store.toggle_compare(&AnalysisId::new(id)).await?;
    Ok(Json(outcome))
}

/// POST /v1/analyses/{id}/revisit
///
/// Stage the analysis geometry for a map revisit.
pub async fn request_revisit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<RevisitOutcome> {
    let outcome = state.store.request_revisit(&AnalysisId::new(id)).await?;
    Ok(Json(outcome))
}

// =============================================================================
// Comparison & Export
// =============================================================================

/// GET /v1/compare
///
/// Load both sides of the staged comparison; consumes the selection.
pub async fn get_compare(State(state): State<AppState>) -> HandlerResult<CompareData> {
    let data = services::load_compare_data(state.store.as_ref()).await?;
    Ok(Json(data))
}

/// GET /v1/history/export.csv
///
/// The full history as a CSV download.
pub async fn export_history(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let csv = services::export_history_csv(state.store.as_ref()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bloomwatch_history.csv\"",
            ),
        ],
        csv,
    ))
}

// =============================================================================
// Revisit
// =============================================================================

/// GET /v1/revisit
///
/// The staged revisit geometry, if any; consumed by this read.
pub async fn poll_revisit(State(state): State<AppState>) -> HandlerResult<RevisitResponse> {
    let geometry = state.store.take_revisit().await?;
    Ok(Json(RevisitResponse { geometry }))
}

// =============================================================================
// Points of Interest
// =============================================================================

/// GET /v1/pois
pub async fn list_pois(State(state): State<AppState>) -> HandlerResult<PoiListResponse> {
    let pois = state.store.list_pois().await?;
    let total = pois.len();
    Ok(Json(PoiListResponse { pois, total }))
}

/// POST /v1/pois
///
/// Geocode and save a map marker.
pub async fn create_poi(
    State(state): State<AppState>,
    Json(request): Json<CreatePoiRequest>,
) -> Result<(StatusCode, Json<PointOfInterest>), AppError> {
    let poi = state.pois.register(request.lat, request.lon).await?;
    Ok((StatusCode::CREATED, Json(poi)))
}

/// DELETE /v1/pois/{id}
pub async fn delete_poi(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.delete_poi(PoiId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Overlay
// =============================================================================

/// GET /v1/overlay-url?year=
///
/// The WMS tile URL template for the requested year (current year when
/// omitted). 503 with code NOT_CONFIGURED when no instance id is set.
pub async fn get_overlay_url(
    State(state): State<AppState>,
    Query(query): Query<OverlayQuery>,
) -> HandlerResult<OverlayResponse> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let url = services::wms_overlay_url(&state.overlay, year)?;
    Ok(Json(OverlayResponse { url }))
}
