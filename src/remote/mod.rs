//! Clients for the remote imagery and geocoding services.
//!
//! This module talks to the Copernicus Data Space: OAuth token acquisition
//! with endpoint failover, the Statistics API for monthly index aggregates,
//! the Process API for the land-cover raster, and nominatim for reverse
//! geocoding of map markers. The aggregator drives the two imagery requests
//! concurrently for one analysis.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  AnalysisService (services/analysis.rs)                   │
//! └───────┬──────────────────────┬───────────────────────────┘
//!         │                      │
//! ┌───────▼────────┐   ┌─────────▼────────────────────────────┐
//! │  TokenBroker   │   │  RegionAggregator                     │
//! │  (cache + TTL) │   │  statistics + land cover, joined      │
//! └────────────────┘   └───────┬──────────────────┬───────────┘
//!                              │                  │
//!                    ┌─────────▼───────┐ ┌────────▼─────────┐
//!                    │ StatisticsClient│ │  ProcessClient    │
//!                    └─────────────────┘ └──────────────────┘
//! ```

pub mod aggregator;
pub mod error;
pub mod geocode;
pub mod process;
pub mod statistics;
pub mod token;

pub use aggregator::{RegionAggregator, RegionBundle};
pub use error::{RemoteError, RemoteResult};
pub use geocode::ReverseGeocoder;
pub use process::{LandCoverResult, ProcessClient};
pub use statistics::{StatisticsClient, StatisticsResponse};
pub use token::TokenBroker;

use chrono::{DateTime, Months, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Time window and sampling interval for the imagery requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// ISO-8601 duration per sample, e.g. "P1M"
    pub interval: String,
}

impl AggregationWindow {
    /// Trailing twelve months ending at `now`, sampled monthly.
    pub fn trailing_year(now: DateTime<Utc>) -> Self {
        let from = now
            .checked_sub_months(Months::new(12))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            from,
            to: now,
            interval: "P1M".to_string(),
        }
    }
}

/// Decode a JSON body into a typed response, reporting the failing path on
/// a structural mismatch.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &str) -> RemoteResult<T> {
    let deserializer = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(deserializer).map_err(RemoteError::schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_trailing_year_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let window = AggregationWindow::trailing_year(now);

        assert_eq!(window.to, now);
        assert_eq!(
            window.from,
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(window.interval, "P1M");
    }

    #[test]
    fn test_decode_json_reports_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Outer {
            #[allow(dead_code)]
            data: Vec<Inner>,
        }
        #[derive(Debug, serde::Deserialize)]
        struct Inner {
            #[allow(dead_code)]
            value: f64,
        }

        let err = decode_json::<Outer>(r#"{"data": [{"value": "oops"}]}"#).unwrap_err();
        match err {
            RemoteError::Schema { path, .. } => assert_eq!(path, "data[0].value"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }
}
