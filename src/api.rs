//! Public API surface for the analysis backend.
//!
//! This file consolidates the DTO types shared by the pipeline, the history
//! store and the HTTP API. All types derive Serialize/Deserialize; field
//! names keep the camelCase layout of the persisted history documents so
//! existing exports stay readable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::{GeoPoint, Geometry, GeometryError};

/// Analysis identifier (time-derived string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnalysisId(pub String);

/// Point-of-interest identifier (unix milliseconds at creation).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoiId(pub i64);

impl AnalysisId {
    pub fn new(value: impl Into<String>) -> Self {
        AnalysisId(value.into())
    }

    /// Derive an id from a creation timestamp, `analysis_<unix-millis>`.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        AnalysisId(format!("analysis_{}", at.timestamp_millis()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl PoiId {
    pub fn new(value: i64) -> Self {
        PoiId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for PoiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PoiId> for i64 {
    fn from(id: PoiId) -> Self {
        id.0
    }
}

impl From<&str> for AnalysisId {
    fn from(value: &str) -> Self {
        AnalysisId(value.to_string())
    }
}

/// One observation in a monthly index series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Start date of the aggregation interval
    pub date: NaiveDate,
    /// Index value; always finite (non-finite samples are dropped at extraction)
    pub value: f64,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Monthly index series extracted from one statistics response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexBundle {
    pub ndvi: Vec<TimePoint>,
    pub ndwi: Vec<TimePoint>,
    pub ndre: Vec<TimePoint>,
    pub cloud_coverage: Vec<TimePoint>,
}

/// Completed analysis stored in history. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: AnalysisId,
    /// Creation timestamp
    pub date: DateTime<Utc>,
    /// Surface area in hectares, rounded to 2 decimals
    #[serde(rename = "area")]
    pub area_ha: f64,
    /// Analyzed region; may be absent in documents written by older clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    /// Dominant land-cover label, or "not available"
    pub crop_type: String,
    /// Optional user-assigned label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub indices: IndexBundle,
    pub recommendations: String,
}

/// Named map marker saved by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PoiId,
    pub name: String,
    /// `[lat, lon]` pair (map marker order)
    pub coords: [f64; 2],
}

/// Per-record aggregate view used for history listings and CSV rows.
///
/// Each average is the arithmetic mean of the stored series; `None` when the
/// series is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub id: AnalysisId,
    pub date: DateTime<Utc>,
    pub tag: Option<String>,
    pub crop_type: String,
    pub area_ha: f64,
    pub avg_ndvi: Option<f64>,
    pub avg_ndwi: Option<f64>,
    pub avg_ndre: Option<f64>,
    pub avg_cloud_pct: Option<f64>,
    pub avg_fpi: Option<f64>,
}

/// Most recent finite value of each stored series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestIndexValues {
    pub ndvi: Option<f64>,
    pub ndwi: Option<f64>,
    pub ndre: Option<f64>,
    pub cloud_pct: Option<f64>,
    pub fpi: Option<f64>,
}

/// One side of a two-analysis comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareEntry {
    pub id: AnalysisId,
    pub date: DateTime<Utc>,
    pub tag: Option<String>,
    pub crop_type: String,
    pub area_ha: f64,
    pub latest: LatestIndexValues,
    /// NDVI series for the overlay chart
    pub ndvi_series: Vec<TimePoint>,
}

/// Side-by-side data for the comparison view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareData {
    pub current: CompareEntry,
    pub comparison: CompareEntry,
}
