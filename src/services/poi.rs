//! Point-of-interest registration.

use std::sync::Arc;

use chrono::Utc;

use crate::api::{PointOfInterest, PoiId};
use crate::remote::ReverseGeocoder;
use crate::store::{HistoryStore, StoreResult};

/// Registers map markers: resolves a place name for the coordinates and
/// appends the marker to the store.
pub struct PoiService {
    geocoder: ReverseGeocoder,
    store: Arc<dyn HistoryStore>,
}

impl PoiService {
    pub fn new(geocoder: ReverseGeocoder, store: Arc<dyn HistoryStore>) -> Self {
        Self { geocoder, store }
    }

    /// Geocode and save a marker at the given coordinates.
    ///
    /// Geocoding is best effort; an unreachable geocoder still yields a
    /// saved marker with a coordinate label as its name.
    pub async fn register(&self, lat: f64, lon: f64) -> StoreResult<PointOfInterest> {
        let name = self.geocoder.locate(lat, lon).await;
        let poi = PointOfInterest {
            id: PoiId::new(Utc::now().timestamp_millis()),
            name,
            coords: [lat, lon],
        };

        self.store.add_poi(&poi).await?;
        log::info!("saved point of interest {} ({})", poi.id, poi.name);
        Ok(poi)
    }
}
