//! JSON file history store.
//!
//! The whole state lives in memory and is written back to a single JSON
//! document after every successful mutation. Documents written by this
//! backend keep the camelCase key layout of [`super::state::HistoryState`],
//! so exports from older clients load unchanged.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::PathBuf;

use super::error::{ErrorContext, StoreError, StoreResult};
use super::state::HistoryState;
use super::{HistoryStore, RevisitOutcome, SelectionOutcome};
use crate::api::{AnalysisId, AnalysisRecord, PoiId, PointOfInterest};
use crate::models::Geometry;

/// History store persisted as one JSON document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<HistoryState>,
    // Serializes mutations; a draft replaces the live state only after it
    // reaches the file. The state lock itself is never held across an await.
    write_gate: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    /// Open a store at `path`, loading the existing document if present.
    pub async fn open(path: PathBuf) -> StoreResult<Self> {
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StoreError::serialization_with_context(
                    e.to_string(),
                    ErrorContext::new("load_history").with_details(path.display().to_string()),
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HistoryState::default(),
            Err(e) => {
                return Err(StoreError::io_with_context(
                    e.to_string(),
                    ErrorContext::new("load_history").with_details(path.display().to_string()),
                ));
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::io_with_context(
                        e.to_string(),
                        ErrorContext::new("load_history")
                            .with_details(parent.display().to_string()),
                    )
                })?;
            }
        }

        Ok(Self {
            path,
            state: RwLock::new(state),
            write_gate: tokio::sync::Mutex::new(()),
        })
    }

    /// Apply a mutation and persist the resulting state. A failing mutation
    /// leaves both the state and the document untouched.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut HistoryState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let _gate = self.write_gate.lock().await;

        let mut draft = self.state.read().clone();
        let value = op(&mut draft)?;
        self.persist(&draft).await?;

        *self.state.write() = draft;
        Ok(value)
    }

    async fn persist(&self, state: &HistoryState) -> StoreResult<()> {
        let body = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::serialization(e.to_string()))?;

        tokio::fs::write(&self.path, body).await.map_err(|e| {
            StoreError::io_with_context(
                e.to_string(),
                ErrorContext::new("persist_history").with_details(self.path.display().to_string()),
            )
        })
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    async fn health_check(&self) -> StoreResult<bool> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.is_file()),
            // Nothing persisted yet; the first mutation will create it
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(_) => Ok(false),
        }
    }

    async fn add_analysis(&self, record: &AnalysisRecord) -> StoreResult<()> {
        self.mutate(|state| state.add_analysis(record)).await
    }

    async fn get_analysis(&self, id: &AnalysisId) -> StoreResult<AnalysisRecord> {
        self.state.read().get_analysis(id)
    }

    async fn list_analyses(&self) -> StoreResult<Vec<AnalysisRecord>> {
        Ok(self.state.read().list_analyses())
    }

    async fn delete_analysis(&self, id: &AnalysisId) -> StoreResult<()> {
        self.mutate(|state| state.delete_analysis(id)).await
    }

    async fn toggle_compare(&self, id: &AnalysisId) -> StoreResult<SelectionOutcome> {
        self.mutate(|state| state.toggle_compare(id)).await
    }

    async fn compare_selection(&self) -> StoreResult<Vec<AnalysisId>> {
        Ok(self.state.read().compare_selection())
    }

    async fn take_compare_selection(&self) -> StoreResult<Vec<AnalysisId>> {
        self.mutate(|state| Ok(state.take_compare_selection())).await
    }

    async fn set_current(&self, id: &AnalysisId) -> StoreResult<()> {
        self.mutate(|state| state.set_current(id)).await
    }

    async fn current_analysis(&self) -> StoreResult<Option<AnalysisRecord>> {
        Ok(self.state.read().current_analysis())
    }

    async fn request_revisit(&self, id: &AnalysisId) -> StoreResult<RevisitOutcome> {
        self.mutate(|state| state.request_revisit(id)).await
    }

    async fn take_revisit(&self) -> StoreResult<Option<Geometry>> {
        self.mutate(|state| Ok(state.take_revisit())).await
    }

    async fn add_poi(&self, poi: &PointOfInterest) -> StoreResult<()> {
        self.mutate(|state| {
            state.add_poi(poi);
            Ok(())
        })
        .await
    }

    async fn list_pois(&self) -> StoreResult<Vec<PointOfInterest>> {
        Ok(self.state.read().list_pois())
    }

    async fn delete_poi(&self, id: PoiId) -> StoreResult<()> {
        self.mutate(|state| state.delete_poi(id)).await
    }
}
