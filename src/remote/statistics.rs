//! Statistics API client for monthly index aggregates.
//!
//! The request body and response schema are typed end to end: a response
//! that does not carry the expected top-level structure is a schema error,
//! while a missing band inside one interval only drops that interval's
//! sample downstream.

use serde::{Deserialize, Deserializer, Serialize};

use super::decode_json;
use super::error::{RemoteError, RemoteResult};
use super::AggregationWindow;
use crate::config::StatisticsConfig;
use crate::models::Geometry;

/// CRS identifier sent with every request geometry (WGS84 lon/lat order).
pub const CRS84: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// Collection queried for both statistics and land cover.
pub const SOURCE_TYPE: &str = "S2L2A";

const MOSAICKING_ORDER: &str = "mostRecent";

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsRequest {
    pub input: RequestInput,
    pub aggregation: Aggregation,
}

/// Shared `input` block of the statistics and process requests.
#[derive(Debug, Clone, Serialize)]
pub struct RequestInput {
    pub bounds: RequestBounds,
    pub data: Vec<DataSource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBounds {
    pub geometry: Geometry,
    pub properties: CrsProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrsProperties {
    pub crs: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub data_filter: DataFilter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFilter {
    pub time_range: TimeRange,
    pub mosaicking_order: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeRange {
    pub from: chrono::DateTime<chrono::Utc>,
    pub to: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub time_range: TimeRange,
    pub aggregation_interval: AggregationInterval,
    pub evalscript: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregationInterval {
    pub of: String,
}

/// Build the shared `input` block for a region and window.
pub(crate) fn region_input(geometry: &Geometry, window: &AggregationWindow) -> RequestInput {
    RequestInput {
        bounds: RequestBounds {
            geometry: geometry.clone(),
            properties: CrsProperties {
                crs: CRS84.to_string(),
            },
        },
        data: vec![DataSource {
            source_type: SOURCE_TYPE.to_string(),
            data_filter: DataFilter {
                time_range: TimeRange {
                    from: window.from,
                    to: window.to,
                },
                mosaicking_order: MOSAICKING_ORDER.to_string(),
            },
        }],
    }
}

// ---------------------------------------------------------------------------
// Response schema
// ---------------------------------------------------------------------------

/// Decoded statistics response: one entry per aggregation interval.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatisticsResponse {
    pub data: Vec<IntervalEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IntervalEntry {
    pub interval: Interval,
    #[serde(default)]
    pub outputs: Outputs,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Interval {
    /// Interval start, RFC3339; the date part becomes the sample date
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub indices: Option<OutputBands>,
    #[serde(default)]
    pub cloud_info: Option<OutputBands>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OutputBands {
    #[serde(default)]
    pub bands: Bands,
}

/// Band slots of one output. The indices output uses B0..B2, the cloud
/// output only B0.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Bands {
    #[serde(rename = "B0", default)]
    pub b0: Option<BandStats>,
    #[serde(rename = "B1", default)]
    pub b1: Option<BandStats>,
    #[serde(rename = "B2", default)]
    pub b2: Option<BandStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BandStats {
    #[serde(default)]
    pub stats: Stats,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Stats {
    /// Mean band value over the interval. The service encodes non-numeric
    /// means as strings ("NaN"), which decode to a non-finite value here
    /// and are dropped during series extraction.
    #[serde(default, deserialize_with = "lenient_mean")]
    pub mean: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMean {
    Number(f64),
    Text(String),
}

fn lenient_mean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw: Option<RawMean> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawMean::Number(v)) => Some(v),
        Some(RawMean::Text(s)) => s.parse::<f64>().ok(),
        None => None,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Statistics API.
pub struct StatisticsClient {
    http: reqwest::Client,
    config: StatisticsConfig,
}

impl StatisticsClient {
    pub fn new(http: reqwest::Client, config: StatisticsConfig) -> Self {
        Self { http, config }
    }

    /// Build the request body for a region and window.
    pub fn build_request(&self, geometry: &Geometry, window: &AggregationWindow) -> StatisticsRequest {
        StatisticsRequest {
            input: region_input(geometry, window),
            aggregation: Aggregation {
                time_range: TimeRange {
                    from: window.from,
                    to: window.to,
                },
                aggregation_interval: AggregationInterval {
                    of: window.interval.clone(),
                },
                evalscript: self.config.evalscript.clone(),
            },
        }
    }

    /// POST the statistics request and decode the monthly aggregates.
    pub async fn fetch(
        &self,
        token: &str,
        geometry: &Geometry,
        window: &AggregationWindow,
    ) -> RemoteResult<StatisticsResponse> {
        let request = self.build_request(geometry, window);

        let response = self
            .http
            .post(&self.config.url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<empty response>".to_string());

        if !status.is_success() {
            return Err(RemoteError::Service {
                status: status.as_u16(),
                body,
            });
        }

        decode_json(&body)
    }
}
