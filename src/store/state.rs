//! Shared history state and its mutation rules.
//!
//! Both store backends operate on the same state struct; the file backend
//! additionally persists it as a JSON document, so the serde layout here is
//! the on-disk layout.

use serde::{Deserialize, Serialize};

use super::error::{ErrorContext, StoreError, StoreResult};
use super::{RevisitOutcome, SelectionOutcome, COMPARE_LIMIT_MESSAGE};
use crate::api::{AnalysisId, AnalysisRecord, PoiId, PointOfInterest};
use crate::models::Geometry;

/// Complete history state. Also the shape of the persisted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct HistoryState {
    pub analysis_history: Vec<AnalysisRecord>,
    pub poi_history: Vec<PointOfInterest>,
    pub current_analysis_id: Option<AnalysisId>,
    pub compare_selection: Vec<AnalysisId>,
    pub revisit_location: Option<Geometry>,
}

impl HistoryState {
    fn find(&self, id: &AnalysisId) -> Option<&AnalysisRecord> {
        self.analysis_history.iter().find(|record| &record.id == id)
    }

    fn require(&self, id: &AnalysisId, operation: &str) -> StoreResult<&AnalysisRecord> {
        self.find(id).ok_or_else(|| {
            StoreError::not_found_with_context(
                format!("Analysis {} does not exist", id),
                ErrorContext::new(operation)
                    .with_entity("analysis")
                    .with_entity_id(id),
            )
        })
    }

    /// Append a record. The history is append-only, so an id collision is
    /// rejected instead of overwriting.
    pub fn add_analysis(&mut self, record: &AnalysisRecord) -> StoreResult<()> {
        if self.find(&record.id).is_some() {
            return Err(StoreError::validation_with_context(
                format!("Analysis {} is already stored", record.id),
                ErrorContext::new("add_analysis")
                    .with_entity("analysis")
                    .with_entity_id(&record.id),
            ));
        }
        self.analysis_history.push(record.clone());
        Ok(())
    }

    pub fn get_analysis(&self, id: &AnalysisId) -> StoreResult<AnalysisRecord> {
        self.require(id, "get_analysis").cloned()
    }

    /// All records, most recent first.
    pub fn list_analyses(&self) -> Vec<AnalysisRecord> {
        let mut records = self.analysis_history.clone();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }

    /// Remove a record along with every reference to it: its slot in the
    /// comparison selection and, when it matches, the current pointer.
    pub fn delete_analysis(&mut self, id: &AnalysisId) -> StoreResult<()> {
        self.require(id, "delete_analysis")?;
        self.analysis_history.retain(|record| &record.id != id);
        self.compare_selection.retain(|selected| selected != id);
        if self.current_analysis_id.as_ref() == Some(id) {
            self.current_analysis_id = None;
        }
        Ok(())
    }

    /// Toggle a record in or out of the comparison selection.
    ///
    /// The selection holds at most two ids; a third candidate is rejected
    /// with a user-facing reason and the selection stays untouched.
    pub fn toggle_compare(&mut self, id: &AnalysisId) -> StoreResult<SelectionOutcome> {
        self.require(id, "toggle_compare")?;

        if self.compare_selection.contains(id) {
            self.compare_selection.retain(|selected| selected != id);
            return Ok(SelectionOutcome::Removed {
                selected: self.compare_selection.clone(),
            });
        }

        if self.compare_selection.len() >= 2 {
            return Ok(SelectionOutcome::Rejected {
                reason: COMPARE_LIMIT_MESSAGE.to_string(),
            });
        }

        self.compare_selection.push(id.clone());
        Ok(SelectionOutcome::Added {
            selected: self.compare_selection.clone(),
        })
    }

    pub fn compare_selection(&self) -> Vec<AnalysisId> {
        self.compare_selection.clone()
    }

    /// Return the selection and clear it.
    pub fn take_compare_selection(&mut self) -> Vec<AnalysisId> {
        std::mem::take(&mut self.compare_selection)
    }

    pub fn set_current(&mut self, id: &AnalysisId) -> StoreResult<()> {
        self.require(id, "set_current")?;
        self.current_analysis_id = Some(id.clone());
        Ok(())
    }

    /// The record the current pointer names, or the most recent record when
    /// the pointer is unset or no longer resolves.
    pub fn current_analysis(&self) -> Option<AnalysisRecord> {
        if let Some(id) = &self.current_analysis_id {
            if let Some(record) = self.find(id) {
                return Some(record.clone());
            }
        }
        self.analysis_history
            .iter()
            .max_by_key(|record| record.date)
            .cloned()
    }

    /// Stage a record's geometry for the map to pick up later.
    pub fn request_revisit(&mut self, id: &AnalysisId) -> StoreResult<RevisitOutcome> {
        let geometry = self.require(id, "request_revisit")?.geometry.clone();
        match geometry {
            Some(geometry) => {
                self.revisit_location = Some(geometry);
                Ok(RevisitOutcome::Scheduled)
            }
            None => Ok(RevisitOutcome::NoGeometry),
        }
    }

    /// Return the staged revisit geometry and clear it.
    pub fn take_revisit(&mut self) -> Option<Geometry> {
        self.revisit_location.take()
    }

    pub fn add_poi(&mut self, poi: &PointOfInterest) {
        self.poi_history.push(poi.clone());
    }

    pub fn list_pois(&self) -> Vec<PointOfInterest> {
        self.poi_history.clone()
    }

    pub fn delete_poi(&mut self, id: PoiId) -> StoreResult<()> {
        let before = self.poi_history.len();
        self.poi_history.retain(|poi| poi.id != id);
        if self.poi_history.len() == before {
            return Err(StoreError::not_found_with_context(
                format!("Point of interest {} does not exist", id),
                ErrorContext::new("delete_poi")
                    .with_entity("poi")
                    .with_entity_id(id.value()),
            ));
        }
        Ok(())
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
            date: Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
            area_ha: 12.5,
            geometry: Some(
                Geometry::polygon(vec![vec![[2.0, 41.0], [2.1, 41.0], [2.1, 41.1]]]).unwrap(),
            ),
            crop_type: "not available".to_string(),
            tag: None,
            indices: IndexBundle::default(),
            recommendations: String::new(),
        }
    }

    fn populated(ids: &[(&str, u32)]) -> HistoryState {
        let mut state = HistoryState::default();
        for (id, day) in ids {
            state.add_analysis(&test_record(id, *day)).unwrap();
        }
        state
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut state = populated(&[("a1", 1)]);
        let err = state.add_analysis(&test_record("a1", 2)).unwrap_err();
        assert!(matches!(err, StoreError::ValidationError { .. }));
        assert_eq!(state.analysis_history.len(), 1);
    }

    #[test]
    fn test_list_is_sorted_most_recent_first() {
        let state = populated(&[("a1", 3), ("a2", 9), ("a3", 6)]);
        let ids: Vec<String> = state
            .list_analyses()
            .into_iter()
            .map(|record| record.id.value().to_string())
            .collect();
        assert_eq!(ids, vec!["a2", "a3", "a1"]);
    }

    #[test]
    fn test_delete_prunes_selection_and_current_pointer() {
        let mut state = populated(&[("a1", 1), ("a2", 2)]);
        state.set_current(&AnalysisId::from("a1")).unwrap();
        state.toggle_compare(&AnalysisId::from("a1")).unwrap();
        state.toggle_compare(&AnalysisId::from("a2")).unwrap();

        state.delete_analysis(&AnalysisId::from("a1")).unwrap();

        assert_eq!(state.compare_selection, vec![AnalysisId::from("a2")]);
        assert!(state.current_analysis_id.is_none());
        // The pointer is gone, so the most recent survivor is current
        assert_eq!(state.current_analysis().unwrap().id, AnalysisId::from("a2"));
    }

    #[test]
    fn test_delete_unknown_id_is_not_found() {
        let mut state = populated(&[("a1", 1)]);
        let err = state.delete_analysis(&AnalysisId::from("ghost")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_third_selection_is_rejected_and_state_unchanged() {
        let mut state = populated(&[("a1", 1), ("a2", 2), ("a3", 3)]);
        state.toggle_compare(&AnalysisId::from("a1")).unwrap();
        state.toggle_compare(&AnalysisId::from("a2")).unwrap();

        let outcome = state.toggle_compare(&AnalysisId::from("a3")).unwrap();
        assert_eq!(
            outcome,
            SelectionOutcome::Rejected {
                reason: COMPARE_LIMIT_MESSAGE.to_string(),
            }
        );
        assert_eq!(
            state.compare_selection,
            vec![AnalysisId::from("a1"), AnalysisId::from("a2")]
        );
    }

    #[test]
    fn test_toggle_removes_an_already_selected_id() {
        let mut state = populated(&[("a1", 1), ("a2", 2)]);
        state.toggle_compare(&AnalysisId::from("a1")).unwrap();
        state.toggle_compare(&AnalysisId::from("a2")).unwrap();

        let outcome = state.toggle_compare(&AnalysisId::from("a1")).unwrap();
        assert_eq!(
            outcome,
            SelectionOutcome::Removed {
                selected: vec![AnalysisId::from("a2")],
            }
        );
    }

    #[test]
    fn test_take_selection_clears_it() {
        let mut state = populated(&[("a1", 1), ("a2", 2)]);
        state.toggle_compare(&AnalysisId::from("a1")).unwrap();
        state.toggle_compare(&AnalysisId::from("a2")).unwrap();

        let taken = state.take_compare_selection();
        assert_eq!(taken.len(), 2);
        assert!(state.compare_selection.is_empty());
    }

    #[test]
    fn test_current_falls_back_to_most_recent() {
        let state = populated(&[("a1", 1), ("a2", 9), ("a3", 5)]);
        assert_eq!(state.current_analysis().unwrap().id, AnalysisId::from("a2"));
    }

    #[test]
    fn test_current_of_empty_history_is_none() {
        let state = HistoryState::default();
        assert!(state.current_analysis().is_none());
    }

    #[test]
    fn test_revisit_stages_geometry_and_is_consumed_once() {
        let mut state = populated(&[("a1", 1)]);
        let outcome = state.request_revisit(&AnalysisId::from("a1")).unwrap();
        assert_eq!(outcome, RevisitOutcome::Scheduled);

        assert!(state.take_revisit().is_some());
        assert!(state.take_revisit().is_none());
    }

    #[test]
    fn test_revisit_without_geometry_changes_nothing() {
        let mut record = test_record("a1", 1);
        record.geometry = None;
        let mut state = HistoryState::default();
        state.add_analysis(&record).unwrap();

        let outcome = state.request_revisit(&AnalysisId::from("a1")).unwrap();
        assert_eq!(outcome, RevisitOutcome::NoGeometry);
        assert!(state.revisit_location.is_none());
    }

    #[test]
    fn test_poi_lifecycle() {
        let mut state = HistoryState::default();
        let poi = PointOfInterest {
            id: PoiId(1700000000000),
            name: "Alpens".to_string(),
            coords: [42.11, 2.10],
        };
        state.add_poi(&poi);
        assert_eq!(state.list_pois(), vec![poi]);

        state.delete_poi(PoiId(1700000000000)).unwrap();
        assert!(state.list_pois().is_empty());
        assert!(matches!(
            state.delete_poi(PoiId(1700000000000)),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_document_round_trip_uses_camel_case_keys() {
        let mut state = populated(&[("a1", 1)]);
        state.set_current(&AnalysisId::from("a1")).unwrap();

        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("analysisHistory").is_some());
        assert!(json.get("poiHistory").is_some());
        assert_eq!(json["currentAnalysisId"], "a1");
        assert!(json.get("compareSelection").is_some());
        assert!(json.get("revisitLocation").is_some());

        let decoded: HistoryState = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.analysis_history.len(), 1);
    }
}
