//! History store for completed analyses, map markers and view state.
//!
//! The store is an append-only analysis history plus a small amount of view
//! state (comparison selection, current pointer, staged revisit geometry),
//! behind a trait so backends can be swapped.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Service layer (services/) and HTTP handlers (http/)    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  HistoryStore trait (this module)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ JsonFileStore    │     │  MemoryStore            │
//! │ (one JSON doc,   │     │  (tests and ephemeral   │
//! │  write-through)  │     │   deployments)          │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! Both backends share the mutation rules in [`state`]; the file backend
//! persists the state after every successful mutation.

#[cfg(not(any(feature = "memory-store", feature = "file-store")))]
compile_error!("Enable at least one history store backend feature.");

pub mod error;
#[cfg(feature = "file-store")]
pub mod file;
#[cfg(feature = "memory-store")]
pub mod memory;
mod state;

pub use error::{ErrorContext, StoreError, StoreResult};
#[cfg(feature = "file-store")]
pub use file::JsonFileStore;
#[cfg(feature = "memory-store")]
pub use memory::MemoryStore;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, OnceLock};

use crate::api::{AnalysisId, AnalysisRecord, PoiId, PointOfInterest};
use crate::config::StoreConfig;
use crate::models::Geometry;

/// Rejection reason when a third analysis is offered for comparison.
pub const COMPARE_LIMIT_MESSAGE: &str = "Only two analyses can be compared at a time";

/// Result of toggling an analysis in the comparison selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SelectionOutcome {
    /// The id joined the selection
    Added { selected: Vec<AnalysisId> },
    /// The id left the selection
    Removed { selected: Vec<AnalysisId> },
    /// Two analyses were already selected; nothing changed
    Rejected { reason: String },
}

/// Result of staging an analysis for a map revisit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RevisitOutcome {
    /// The record's geometry is staged for the next `take_revisit`
    Scheduled,
    /// The record has no geometry; nothing was staged
    NoGeometry,
}

/// Persistent history of analyses and points of interest.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Check if the backend is able to serve requests.
    async fn health_check(&self) -> StoreResult<bool>;

    // ==================== Analysis history ====================

    /// Append a completed analysis. The history is append-only; reusing an
    /// existing id is a validation error.
    async fn add_analysis(&self, record: &AnalysisRecord) -> StoreResult<()>;

    /// Retrieve one analysis by id.
    async fn get_analysis(&self, id: &AnalysisId) -> StoreResult<AnalysisRecord>;

    /// All stored analyses, sorted by date descending.
    async fn list_analyses(&self) -> StoreResult<Vec<AnalysisRecord>>;

    /// Delete an analysis. Its id is also removed from the comparison
    /// selection, and the current pointer is cleared if it matches.
    async fn delete_analysis(&self, id: &AnalysisId) -> StoreResult<()>;

    // ==================== Comparison selection ====================

    /// Toggle an analysis in or out of the two-slot comparison selection.
    async fn toggle_compare(&self, id: &AnalysisId) -> StoreResult<SelectionOutcome>;

    /// The current selection, oldest pick first.
    async fn compare_selection(&self) -> StoreResult<Vec<AnalysisId>>;

    /// Return the selection and clear it.
    async fn take_compare_selection(&self) -> StoreResult<Vec<AnalysisId>>;

    // ==================== Current pointer ====================

    /// Point the history at an analysis (typically the one just added).
    async fn set_current(&self, id: &AnalysisId) -> StoreResult<()>;

    /// The current analysis, falling back to the most recent record when
    /// the pointer is unset or no longer resolves.
    async fn current_analysis(&self) -> StoreResult<Option<AnalysisRecord>>;

    // ==================== Revisit hand-off ====================

    /// Stage an analysis region for the map to jump back to.
    async fn request_revisit(&self, id: &AnalysisId) -> StoreResult<RevisitOutcome>;

    /// Return the staged revisit geometry and clear it.
    async fn take_revisit(&self) -> StoreResult<Option<Geometry>>;

    // ==================== Points of interest ====================

    /// Save a named map marker.
    async fn add_poi(&self, poi: &PointOfInterest) -> StoreResult<()>;

    /// All saved markers, insertion order.
    async fn list_pois(&self) -> StoreResult<Vec<PointOfInterest>>;

    /// Delete a marker by id.
    async fn delete_poi(&self, id: PoiId) -> StoreResult<()>;
}

/// Global store instance initialized once per process.
static STORE: OnceLock<Arc<dyn HistoryStore>> = OnceLock::new();

async fn create_selected_store(config: &StoreConfig) -> StoreResult<Arc<dyn HistoryStore>> {
    #[cfg(feature = "file-store")]
    if let Some(path) = &config.path {
        let store = JsonFileStore::open(path.clone()).await?;
        log::info!("history store: JSON document at {}", path.display());
        return Ok(Arc::new(store));
    }

    #[cfg(not(feature = "file-store"))]
    if config.path.is_some() {
        log::warn!("store.path is set but the file-store feature is disabled, using memory");
    }

    #[cfg(feature = "memory-store")]
    {
        log::info!("history store: in-memory");
        Ok(Arc::new(MemoryStore::new()))
    }
    #[cfg(not(feature = "memory-store"))]
    {
        Err(StoreError::configuration(
            "No usable store backend: set store.path or enable the memory-store feature",
        ))
    }
}

/// Initialize the global store singleton for the configured backend.
pub async fn init_store(config: &StoreConfig) -> anyhow::Result<()> {
    if STORE.get().is_some() {
        return Ok(());
    }

    let store = create_selected_store(config)
        .await
        .context("Failed to initialize the history store")?;
    let _ = STORE.set(store);
    Ok(())
}

/// Get a reference to the global store instance.
pub fn get_store() -> anyhow::Result<&'static Arc<dyn HistoryStore>> {
    STORE
        .get()
        .context("History store not initialized. Call init_store() first.")
}
