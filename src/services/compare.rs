//! Side-by-side comparison of two stored analyses.
//!
//! The selection is staged in the history store by [`toggle_compare`]
//! (capped at two entries) and consumed here in one shot: loading the
//! comparison clears the selection, so a refresh of the comparison view
//! starts from an empty slate.
//!
//! [`toggle_compare`]: crate::store::HistoryStore::toggle_compare

use thiserror::Error;

use crate::api::{AnalysisId, AnalysisRecord, CompareData, CompareEntry};
use crate::store::{HistoryStore, StoreError};

use super::summary::latest_values;

/// Failure modes of the comparison view.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The staged selection did not hold exactly two analyses.
    #[error("comparison requires exactly two selected analyses, found {found}")]
    Selection { found: usize },

    /// A selected analysis was deleted between staging and loading.
    #[error("selected analysis {id} no longer exists")]
    MissingRecord { id: AnalysisId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn compare_entry(record: &AnalysisRecord) -> CompareEntry {
    CompareEntry {
        id: record.id.clone(),
        date: record.date,
        tag: record.tag.clone(),
        crop_type: record.crop_type.clone(),
        area_ha: record.area_ha,
        latest: latest_values(record),
        ndvi_series: record.indices.ndvi.clone(),
    }
}

/// Assemble the comparison payload from two resolved records.
///
/// The first selected analysis becomes `current` and the second one
/// `comparison`, preserving the order the user picked them in.
pub fn compute_compare_data(current: &AnalysisRecord, comparison: &AnalysisRecord) -> CompareData {
    CompareData {
        current: compare_entry(current),
        comparison: compare_entry(comparison),
    }
}

async fn resolve(store: &dyn HistoryStore, id: AnalysisId) -> Result<AnalysisRecord, CompareError> {
    match store.get_analysis(&id).await {
        Ok(record) => Ok(record),
        Err(StoreError::NotFound { .. }) => Err(CompareError::MissingRecord { id }),
        Err(other) => Err(other.into()),
    }
}

/// Consume the staged selection and load both sides of the comparison.
///
/// The selection is taken (and therefore cleared) before the records are
/// resolved; a selection of any size other than two is rejected without
/// touching the analysis records.
pub async fn load_compare_data(store: &dyn HistoryStore) -> Result<CompareData, CompareError> {
    let selection = store.take_compare_selection().await?;
    let [current_id, comparison_id]: [AnalysisId; 2] = selection
        .try_into()
        .map_err(|ids: Vec<AnalysisId>| CompareError::Selection { found: ids.len() })?;

    let (current, comparison) = futures::future::try_join(
        resolve(store, current_id),
        resolve(store, comparison_id),
    )
    .await?;

    Ok(compute_compare_data(&current, &comparison))
}
