//! Concurrent collection of statistics and land cover for one region.

use super::error::RemoteResult;
use super::process::{LandCoverResult, ProcessClient};
use super::statistics::{StatisticsClient, StatisticsResponse};
use super::AggregationWindow;
use crate::models::Geometry;

/// Everything fetched from the imagery service for one analyzed region.
#[derive(Debug, Clone)]
pub struct RegionBundle {
    pub statistics: StatisticsResponse,
    pub land_cover: LandCoverResult,
}

/// Fans one analysis out to the statistics and process APIs.
pub struct RegionAggregator {
    statistics: StatisticsClient,
    process: ProcessClient,
}

impl RegionAggregator {
    pub fn new(statistics: StatisticsClient, process: ProcessClient) -> Self {
        Self {
            statistics,
            process,
        }
    }

    /// Fetch the monthly aggregates and the classification raster
    /// concurrently under one bearer token.
    ///
    /// Both requests run to completion before errors are examined; when
    /// both fail, the statistics failure is the one reported. Partial
    /// success is not an outcome.
    pub async fn analyze_region(
        &self,
        token: &str,
        geometry: &Geometry,
        window: &AggregationWindow,
    ) -> RemoteResult<RegionBundle> {
        let (statistics, land_cover) = tokio::join!(
            self.statistics.fetch(token, geometry, window),
            self.process.classify(token, geometry, window),
        );

        Ok(RegionBundle {
            statistics: statistics?,
            land_cover: land_cover?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProcessConfig, StatisticsConfig};
    use crate::remote::RemoteError;

    #[tokio::test]
    async fn test_unreachable_services_surface_a_transport_error() {
        let http = reqwest::Client::new();
        let aggregator = RegionAggregator::new(
            StatisticsClient::new(
                http.clone(),
                StatisticsConfig {
                    url: "http://127.0.0.1:1/statistics".to_string(),
                    ..StatisticsConfig::default()
                },
            ),
            ProcessClient::new(
                http,
                ProcessConfig {
                    url: "http://127.0.0.1:1/process".to_string(),
                    ..ProcessConfig::default()
                },
            ),
        );

        let geometry = Geometry::polygon(vec![vec![
            [2.0, 41.0],
            [2.1, 41.0],
            [2.1, 41.1],
        ]])
        .unwrap();
        let window = AggregationWindow::trailing_year(chrono::Utc::now());

        let err = aggregator
            .analyze_region("token", &geometry, &window)
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
    }
}
