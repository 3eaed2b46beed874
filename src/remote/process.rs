//! Process API client for the land-cover classification raster.
//!
//! The service renders the scene-classification band of the most recent
//! mosaic as a small TIFF. Interpreting the raster into a crop label is
//! not implemented yet, so the result only records that a raster arrived.

use serde::Serialize;

use super::error::{RemoteError, RemoteResult};
use super::statistics::{region_input, RequestInput};
use super::AggregationWindow;
use crate::config::ProcessConfig;
use crate::models::Geometry;

/// Label recorded when a classification raster was received.
pub const CLASSIFICATION_PENDING: &str =
    "Classification raster received (TIFF), pending interpretation.";

#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    pub input: RequestInput,
    pub output: OutputSpec,
    pub evalscript: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSpec {
    pub width: u32,
    pub height: u32,
    pub responses: Vec<ResponseSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseSpec {
    pub identifier: String,
    pub format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Outcome of a classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandCoverResult {
    /// Classification label, `None` when the service returned no raster
    pub label: Option<String>,
    /// Size of the received raster in bytes, zero when absent
    pub size_bytes: usize,
}

impl LandCoverResult {
    pub fn pending(size_bytes: usize) -> Self {
        Self {
            label: Some(CLASSIFICATION_PENDING.to_string()),
            size_bytes,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            label: None,
            size_bytes: 0,
        }
    }
}

/// Client for the Process API.
pub struct ProcessClient {
    http: reqwest::Client,
    config: ProcessConfig,
}

impl ProcessClient {
    pub fn new(http: reqwest::Client, config: ProcessConfig) -> Self {
        Self { http, config }
    }

    /// Build the request body for a region and window.
    pub fn build_request(&self, geometry: &Geometry, window: &AggregationWindow) -> ProcessRequest {
        ProcessRequest {
            input: region_input(geometry, window),
            output: OutputSpec {
                width: self.config.width,
                height: self.config.height,
                responses: vec![ResponseSpec {
                    identifier: "default".to_string(),
                    format: ResponseFormat {
                        mime_type: "image/tiff".to_string(),
                    },
                }],
            },
            evalscript: self.config.evalscript.clone(),
        }
    }

    /// POST the process request and report whether a raster came back.
    pub async fn classify(
        &self,
        token: &str,
        geometry: &Geometry,
        window: &AggregationWindow,
    ) -> RemoteResult<LandCoverResult> {
        let request = self.build_request(geometry, window);

        let response = self
            .http
            .post(&self.config.url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "image/tiff")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<empty response>".to_string());
            return Err(RemoteError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let raster = response.bytes().await?;
        if raster.is_empty() {
            log::warn!("process API returned an empty raster, recording land cover as unavailable");
            return Ok(LandCoverResult::unavailable());
        }

        log::debug!("received classification raster of {} bytes", raster.len());
        Ok(LandCoverResult::pending(raster.len()))
    }
}
