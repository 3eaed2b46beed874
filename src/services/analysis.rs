//! End-to-end region analysis.
//!
//! One `run` call drives the whole pipeline: area computation, token
//! acquisition, the joined statistics and land-cover fetch, record
//! assembly, and persistence. Nothing reaches the store unless every
//! earlier step succeeded.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::api::AnalysisRecord;
use crate::models::Geometry;
use crate::remote::{AggregationWindow, RegionAggregator, RemoteError, TokenBroker};
use crate::store::{HistoryStore, StoreError};

use super::area::compute_area_ha;
use super::series::build_record;

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub geometry: Geometry,
    /// Optional user-assigned label carried into the record
    pub tag: Option<String>,
    /// Aggregation window; defaults to the trailing year when absent
    pub window: Option<AggregationWindow>,
}

/// Failure of an analysis run. Either the satellite side or the store
/// side failed; in both cases the history is left untouched.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Satellite data request failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("Analysis could not be saved: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrates the analysis pipeline over a token broker, the region
/// aggregator and the history store.
pub struct AnalysisService {
    broker: Arc<TokenBroker>,
    aggregator: RegionAggregator,
    store: Arc<dyn HistoryStore>,
}

impl AnalysisService {
    pub fn new(
        broker: Arc<TokenBroker>,
        aggregator: RegionAggregator,
        store: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            broker,
            aggregator,
            store,
        }
    }

    /// Run a full analysis of the requested region and persist the result.
    ///
    /// The token is acquired strictly before either fetch starts. A 401
    /// from the imagery services drops the cached token so the next run
    /// starts from a fresh acquisition. The new record becomes the
    /// current analysis.
    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisRecord, AnalysisError> {
        let area_ha = compute_area_ha(&request.geometry);
        let window = request
            .window
            .unwrap_or_else(|| AggregationWindow::trailing_year(Utc::now()));

        let token = self.broker.acquire().await?;
        let bundle = match self
            .aggregator
            .analyze_region(&token, &request.geometry, &window)
            .await
        {
            Ok(bundle) => bundle,
            Err(error) => {
                if matches!(error, RemoteError::Service { status: 401, .. }) {
                    // The cached token outlived its server-side validity.
                    self.broker.invalidate().await;
                }
                return Err(error.into());
            }
        };

        let record = build_record(
            &bundle.statistics,
            area_ha,
            request.geometry,
            &bundle.land_cover,
            request.tag,
            Utc::now(),
        );

        self.store.add_analysis(&record).await?;
        self.store.set_current(&record.id).await?;

        log::info!(
            "analysis {} stored ({:.2} ha, {} intervals)",
            record.id,
            record.area_ha,
            record.indices.ndvi.len()
        );
        Ok(record)
    }
}

#[cfg(test)]
#[cfg(feature = "memory-store")]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, ProcessConfig, StatisticsConfig};
    use crate::remote::{ProcessClient, StatisticsClient};
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn square() -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![
                [2.0, 41.0],
                [2.01, 41.0],
                [2.01, 41.01],
                [2.0, 41.01],
                [2.0, 41.0],
            ]],
        }
    }

    fn unroutable_service() -> AnalysisService {
        let http = reqwest::Client::new();
        let broker = Arc::new(TokenBroker::new(
            http.clone(),
            AuthConfig {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                token_endpoints: vec!["http://127.0.0.1:1/token".to_string()],
            },
        ));
        let aggregator = RegionAggregator::new(
            StatisticsClient::new(
                http.clone(),
                StatisticsConfig {
                    url: "http://127.0.0.1:1/statistics".to_string(),
                    ..Default::default()
                },
            ),
            ProcessClient::new(
                http,
                ProcessConfig {
                    url: "http://127.0.0.1:1/process".to_string(),
                    ..Default::default()
                },
            ),
        );
        AnalysisService::new(broker, aggregator, Arc::new(MemoryStore::default()))
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            geometry: square(),
            tag: None,
            window: None,
        }
    }

    #[tokio::test]
    async fn test_run_without_token_stores_nothing() {
        let service = unroutable_service();

        let err = service.run(request()).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Remote(RemoteError::Authentication(_))
        ));

        let stored = service.store.list_analyses().await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_run_with_failed_fetch_stores_nothing() {
        let service = unroutable_service();
        // A cached token gets past acquisition; both fetches then fail.
        service
            .broker
            .seed_cache("cached-token", Duration::from_secs(600))
            .await;

        let err = service.run(request()).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Remote(RemoteError::Transport(_))
        ));

        let stored = service.store.list_analyses().await.unwrap();
        assert!(stored.is_empty());
        assert!(service.store.current_analysis().await.unwrap().is_none());
    }
}
