//! CSV export of the analysis history.
//!
//! One row per stored analysis, newest first, with the per-series averages
//! from [`summarize`]. Quoting and quote-doubling are left to the csv
//! writer; absent averages render as empty fields.

use chrono::SecondsFormat;

use crate::api::AnalysisRecord;
use crate::store::{HistoryStore, StoreError, StoreResult};

use super::summary::summarize;

const HEADER: [&str; 10] = [
    "analysis_id",
    "date_iso",
    "tag",
    "crop_type",
    "area_ha",
    "avg_ndvi",
    "avg_ndwi",
    "avg_ndre",
    "avg_cloud_pct",
    "avg_fpi",
];

fn fmt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => String::new(),
    }
}

/// Render the given records as a CSV document with the fixed header
/// `analysis_id,date_iso,tag,crop_type,area_ha,avg_ndvi,avg_ndwi,avg_ndre,avg_cloud_pct,avg_fpi`.
pub fn render_csv(records: &[AnalysisRecord]) -> StoreResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .map_err(|err| StoreError::internal(format!("Failed to write CSV header: {err}")))?;

    for record in records {
        let summary = summarize(record);
        let row = [
            summary.id.value().to_string(),
            summary.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            summary.tag.unwrap_or_default(),
            summary.crop_type,
            format!("{:.2}", summary.area_ha),
            fmt(summary.avg_ndvi, 4),
            fmt(summary.avg_ndwi, 4),
            fmt(summary.avg_ndre, 4),
            fmt(summary.avg_cloud_pct, 2),
            fmt(summary.avg_fpi, 3),
        ];
        writer
            .write_record(&row)
            .map_err(|err| StoreError::internal(format!("Failed to write CSV row: {err}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| StoreError::internal(format!("Failed to flush CSV writer: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| StoreError::internal(format!("CSV output is not valid UTF-8: {err}")))
}

/// Render the full stored history, newest first.
pub async fn export_history_csv(store: &dyn HistoryStore) -> StoreResult<String> {
    let records = store.list_analyses().await?;
    render_csv(&records)
}
