//! Monthly index series extraction and derived values.
//!
//! Everything here is pure: the statistics response goes in, the series and
//! the assembled analysis record come out. Absent or non-finite samples are
//! dropped silently; a month without data simply has no point.

use chrono::{DateTime, NaiveDate, Utc};

use crate::api::{AnalysisId, AnalysisRecord, IndexBundle, TimePoint};
use crate::models::Geometry;
use crate::remote::process::LandCoverResult;
use crate::remote::statistics::{BandStats, Bands, IntervalEntry, OutputBands, StatisticsResponse};

/// Crop label when the classification service had nothing to say.
const CROP_TYPE_FALLBACK: &str = "not available";

/// Placeholder until recommendations derive from the record's own data.
const RECOMMENDATIONS_PLACEHOLDER: &str = "Recommendations based on real data coming soon.";

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn interval_date(entry: &IntervalEntry) -> Option<NaiveDate> {
    let date_part = entry.interval.from.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn band_mean(output: Option<&OutputBands>, pick: fn(&Bands) -> &Option<BandStats>) -> Option<f64> {
    output
        .and_then(|bands| pick(&bands.bands).as_ref())
        .and_then(|band| band.stats.mean)
}

fn push_finite(series: &mut Vec<TimePoint>, date: NaiveDate, value: Option<f64>, decimals: i32) {
    if let Some(value) = value.filter(|v| v.is_finite()) {
        series.push(TimePoint::new(date, round_to(value, decimals)));
    }
}

/// Extract the four monthly series from a statistics response.
///
/// Index values keep 4 decimals; cloud coverage is scaled to percent and
/// keeps 2. A band missing from one interval only skips that sample.
pub fn extract_series(response: &StatisticsResponse) -> IndexBundle {
    let mut bundle = IndexBundle::default();

    for entry in &response.data {
        let Some(date) = interval_date(entry) else {
            log::debug!(
                "Skipping interval with unparseable start {:?}",
                entry.interval.from
            );
            continue;
        };

        let indices = entry.outputs.indices.as_ref();
        push_finite(&mut bundle.ndvi, date, band_mean(indices, |b| &b.b0), 4);
        push_finite(&mut bundle.ndwi, date, band_mean(indices, |b| &b.b1), 4);
        push_finite(&mut bundle.ndre, date, band_mean(indices, |b| &b.b2), 4);

        let cloud = band_mean(entry.outputs.cloud_info.as_ref(), |b| &b.b0);
        push_finite(
            &mut bundle.cloud_coverage,
            date,
            cloud.map(|fraction| fraction * 100.0),
            2,
        );
    }

    bundle
}

/// Map an index from its native [-1, 1] range onto [0, 1].
pub fn normalize_index(value: f64) -> f64 {
    ((value + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Flowering potential index: high vegetation combined with low water.
///
/// `None` unless both inputs are finite.
pub fn fpi(ndvi: f64, ndwi: f64) -> Option<f64> {
    if !ndvi.is_finite() || !ndwi.is_finite() {
        return None;
    }
    Some(normalize_index(ndvi) * (1.0 - normalize_index(ndwi)))
}

/// Assemble the analysis record stored in history.
///
/// `created_at` determines both the record date and the derived id.
pub fn build_record(
    response: &StatisticsResponse,
    area_ha: f64,
    geometry: Geometry,
    land_cover: &LandCoverResult,
    tag: Option<String>,
    created_at: DateTime<Utc>,
) -> AnalysisRecord {
    AnalysisRecord {
        id: AnalysisId::from_timestamp(created_at),
        date: created_at,
        area_ha: round_to(area_ha, 2),
        geometry: Some(geometry),
        crop_type: land_cover
            .label
            .clone()
            .unwrap_or_else(|| CROP_TYPE_FALLBACK.to_string()),
        tag,
        indices: extract_series(response),
        recommendations: RECOMMENDATIONS_PLACEHOLDER.to_string(),
    }
}
