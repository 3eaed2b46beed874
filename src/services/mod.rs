//! Service layer for business logic and orchestration.
//!
//! This module sits between the remote clients, the history store and the
//! HTTP surface. Pure computations (area, series extraction, summaries)
//! live next to the orchestration that drives them.

pub mod analysis;
pub mod area;
pub mod compare;
pub mod export;
pub mod overlay;
pub mod poi;
pub mod series;
pub mod summary;

pub use analysis::{AnalysisError, AnalysisRequest, AnalysisService};
pub use area::compute_area_ha;
pub use compare::{compute_compare_data, load_compare_data, CompareError};
pub use export::{export_history_csv, render_csv};
pub use overlay::wms_overlay_url;
pub use poi::PoiService;
pub use series::{build_record, extract_series, fpi, normalize_index};
pub use summary::{latest_values, summarize};
