//! In-memory history store.
//!
//! Keeps everything in process memory, making it ideal for unit tests and
//! for deployments that accept losing history on restart.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use super::error::StoreResult;
use super::state::HistoryState;
use super::{HistoryStore, RevisitOutcome, SelectionOutcome};
use crate::api::{AnalysisId, AnalysisRecord, PoiId, PointOfInterest};
use crate::models::Geometry;

/// In-memory history store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<HistoryState>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }

    async fn add_analysis(&self, record: &AnalysisRecord) -> StoreResult<()> {
        self.state.write().add_analysis(record)
    }

    async fn get_analysis(&self, id: &AnalysisId) -> StoreResult<AnalysisRecord> {
        self.state.read().get_analysis(id)
    }

    async fn list_analyses(&self) -> StoreResult<Vec<AnalysisRecord>> {
        Ok(self.state.read().list_analyses())
    }

    async fn delete_analysis(&self, id: &AnalysisId) -> StoreResult<()> {
        self.state.write().delete_analysis(id)
    }

    async fn toggle_compare(&self, id: &AnalysisId) -> StoreResult<SelectionOutcome> {
        self.state.write().toggle_compare(id)
    }

    async fn compare_selection(&self) -> StoreResult<Vec<AnalysisId>> {
        Ok(self.state.read().compare_selection())
    }

    async fn take_compare_selection(&self) -> StoreResult<Vec<AnalysisId>> {
        Ok(self.state.write().take_compare_selection())
    }

    async fn set_current(&self, id: &AnalysisId) -> StoreResult<()> {
        self.state.write().set_current(id)
    }

    async fn current_analysis(&self) -> StoreResult<Option<AnalysisRecord>> {
        Ok(self.state.read().current_analysis())
    }

    async fn request_revisit(&self, id: &AnalysisId) -> StoreResult<RevisitOutcome> {
        self.state.write().request_revisit(id)
    }

    async fn take_revisit(&self) -> StoreResult<Option<Geometry>> {
        Ok(self.state.write().take_revisit())
    }

    async fn add_poi(&self, poi: &PointOfInterest) -> StoreResult<()> {
        self.state.write().add_poi(poi);
        Ok(())
    }

    async fn list_pois(&self) -> StoreResult<Vec<PointOfInterest>> {
        Ok(self.state.read().list_pois())
    }

    async fn delete_poi(&self, id: PoiId) -> StoreResult<()> {
        self.state.write().delete_poi(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::IndexBundle;
    use chrono::{TimeZone, Utc};

    fn test_record(id: &str, day: u32) -> AnalysisRecord {
        AnalysisRecord {
            id: AnalysisId::from(id),
            date: Utc.with_ymd_and_hms(2025, 4, day, 8, 0, 0).unwrap(),
            area_ha: 3.2,
            geometry: None,
            crop_type: "not available".to_string(),
            tag: Some("field A".to_string()),
            indices: IndexBundle::default(),
            recommendations: String::new(),
        }
    }

    #[tokio::test]
    async fn test_store_via_trait_object() {
        let store: Arc<dyn HistoryStore> = Arc::new(MemoryStore::new());

        assert!(store.health_check().await.unwrap());
        store.add_analysis(&test_record("a1", 2)).await.unwrap();
        store.add_analysis(&test_record("a2", 7)).await.unwrap();

        let listed = store.list_analyses().await.unwrap();
        assert_eq!(listed[0].id, AnalysisId::from("a2"));
        assert_eq!(listed[1].id, AnalysisId::from("a1"));

        store.delete_analysis(&AnalysisId::from("a2")).await.unwrap();
        assert_eq!(store.list_analyses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let aliased = store.clone();

        store.add_analysis(&test_record("a1", 1)).await.unwrap();
        assert!(aliased.get_analysis(&AnalysisId::from("a1")).await.is_ok());
    }
}
