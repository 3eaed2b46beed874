//! Data Transfer Objects for the HTTP API.
//!
//! Request and response bodies specific to the REST surface. The pipeline
//! DTOs (records, summaries, comparison payloads) already live in
//! [`crate::api`] and are re-exported here.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    AnalysisRecord, AnalysisSummary, CompareData, CompareEntry, PointOfInterest,
};
pub use crate::store::{RevisitOutcome, SelectionOutcome};

use crate::models::Geometry;

/// Request body for running an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Region to analyze (GeoJSON-compatible polygon)
    pub geometry: Geometry,
    /// Optional user-assigned label
    #[serde(default)]
    pub tag: Option<String>,
}

/// Response for the history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisListResponse {
    /// Per-record summaries, newest first
    pub analyses: Vec<AnalysisSummary>,
    pub total: usize,
}

/// Request body for saving a point of interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePoiRequest {
    pub lat: f64,
    pub lon: f64,
}

/// Response for the POI listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiListResponse {
    pub pois: Vec<PointOfInterest>,
    pub total: usize,
}

/// Query parameters for the overlay URL endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OverlayQuery {
    /// Overlay year; defaults to the current year
    #[serde(default)]
    pub year: Option<i32>,
}

/// Response carrying the WMS tile URL template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayResponse {
    pub url: String,
}

/// Response for the revisit poll. The staged geometry is consumed by the
/// request that reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisitResponse {
    pub geometry: Option<Geometry>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Store backend status
    pub store: String,
}
