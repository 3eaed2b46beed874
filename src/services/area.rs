//! Surface area of an analyzed region.

use crate::models::{distinct_vertex_count, Geometry};

const EARTH_RADIUS_M: f64 = 6378137.0;

/// Area of the polygon's outer ring in hectares.
///
/// Uses the spherical geodesic formula over the outer ring. Should that
/// come out non-finite, the planar shoelace value over the raw coordinates
/// stands in as a rough approximation (logged, since it is not in real
/// hectares). Malformed geometry yields exactly 0.0; this function never
/// errors.
pub fn compute_area_ha(geometry: &Geometry) -> f64 {
    let Some(ring) = geometry.outer_ring() else {
        return 0.0;
    };
    let ring = without_closing_vertex(ring);
    if distinct_vertex_count(ring) < 3 {
        return 0.0;
    }

    let hectares = geodesic_area_m2(ring) / 10_000.0;
    if hectares.is_finite() {
        return hectares;
    }

    log::warn!("Geodesic area is not finite, using the planar approximation");
    let planar = planar_area(ring);
    if planar.is_finite() {
        planar
    } else {
        0.0
    }
}

/// Drop the closing vertex of a GeoJSON-style ring, if present.
fn without_closing_vertex(ring: &[[f64; 2]]) -> &[[f64; 2]] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Spherical excess area in square meters, ring vertices in `[lon, lat]`
/// order without a closing duplicate.
fn geodesic_area_m2(ring: &[[f64; 2]]) -> f64 {
    let d2r = std::f64::consts::PI / 180.0;
    let n = ring.len();

    let mut area = 0.0;
    for i in 0..n {
        let [lon1, lat1] = ring[i];
        let [lon2, lat2] = ring[(i + 1) % n];
        area += (lon2 - lon1) * d2r * (2.0 + (lat1 * d2r).sin() + (lat2 * d2r).sin());
    }

    (area * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

/// Planar shoelace area over raw coordinates (degrees squared).
fn planar_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    let mut area = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        let [x1, y1] = ring[j];
        let [x2, y2] = ring[i];
        area += x1 * y2 - x2 * y1;
        j = i;
    }
    (area / 2.0).abs()
}
