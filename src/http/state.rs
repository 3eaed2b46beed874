//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::OverlayConfig;
use crate::services::{AnalysisService, PoiService};
use crate::store::HistoryStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Full analysis pipeline (token, fetch, record assembly, persist)
    pub analysis: Arc<AnalysisService>,
    /// Marker registration (geocode + store)
    pub pois: Arc<PoiService>,
    /// History store for reads and selection management
    pub store: Arc<dyn HistoryStore>,
    /// WMS overlay settings
    pub overlay: OverlayConfig,
}

impl AppState {
    pub fn new(
        analysis: Arc<AnalysisService>,
        pois: Arc<PoiService>,
        store: Arc<dyn HistoryStore>,
        overlay: OverlayConfig,
    ) -> Self {
        Self {
            analysis,
            pois,
            store,
            overlay,
        }
    }
}
