//! Per-record aggregate views over the stored series.

use crate::api::{AnalysisRecord, AnalysisSummary, LatestIndexValues, TimePoint};

use super::series::fpi;

fn mean(series: &[TimePoint]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let sum: f64 = series.iter().map(|point| point.value).sum();
    Some(sum / series.len() as f64)
}

fn last_finite(series: &[TimePoint]) -> Option<f64> {
    series
        .iter()
        .rev()
        .map(|point| point.value)
        .find(|value| value.is_finite())
}

/// Aggregate view of one record: the arithmetic mean of each series, with
/// the flowering potential derived from the mean NDVI/NDWI pair.
pub fn summarize(record: &AnalysisRecord) -> AnalysisSummary {
    let avg_ndvi = mean(&record.indices.ndvi);
    let avg_ndwi = mean(&record.indices.ndwi);
    let avg_fpi = match (avg_ndvi, avg_ndwi) {
        (Some(ndvi), Some(ndwi)) => fpi(ndvi, ndwi),
        _ => None,
    };

    AnalysisSummary {
        id: record.id.clone(),
        date: record.date,
        tag: record.tag.clone(),
        crop_type: record.crop_type.clone(),
        area_ha: record.area_ha,
        avg_ndvi,
        avg_ndwi,
        avg_ndre: mean(&record.indices.ndre),
        avg_cloud_pct: mean(&record.indices.cloud_coverage),
        avg_fpi,
    }
}

/// Most recent finite value of each series, scanning backward.
pub fn latest_values(record: &AnalysisRecord) -> LatestIndexValues {
    let ndvi = last_finite(&record.indices.ndvi);
    let ndwi = last_finite(&record.indices.ndwi);
    let fpi = match (ndvi, ndwi) {
        (Some(ndvi), Some(ndwi)) => fpi(ndvi, ndwi),
        _ => None,
    };

    LatestIndexValues {
        ndvi,
        ndwi,
        ndre: last_finite(&record.indices.ndre),
        cloud_pct: last_finite(&record.indices.cloud_coverage),
        fpi,
    }
}
