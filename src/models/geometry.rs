//! Geographic geometry types for analyzed regions.
//!
//! Geometries follow the GeoJSON layout (`type` tag, `[lon, lat]` coordinate
//! order, WGS84) so drawn shapes from the map frontend deserialize directly
//! and persisted history documents stay readable by older tooling.

use serde::{Deserialize, Serialize};

/// Error type for geometry construction and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Polygon ring needs at least 3 distinct vertices")]
    RingTooSmall,
    #[error("Polygon has no rings")]
    EmptyPolygon,
}

/// Geographic point (latitude, longitude) in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeometryError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeometryError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeometryError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }
}

/// GeoJSON-compatible geometry for an analyzed region.
///
/// Coordinates are `[lon, lat]` pairs. Polygon rings may or may not repeat
/// the first vertex at the end; both forms are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    Point { coordinates: [f64; 2] },
}

impl Geometry {
    /// Build a validated polygon. The first ring is the outer boundary.
    pub fn polygon(coordinates: Vec<Vec<[f64; 2]>>) -> Result<Self, GeometryError> {
        let outer = coordinates.first().ok_or(GeometryError::EmptyPolygon)?;
        if distinct_vertex_count(outer) < 3 {
            return Err(GeometryError::RingTooSmall);
        }
        Ok(Geometry::Polygon { coordinates })
    }

    /// Build a point geometry from a validated geographic position.
    pub fn point(position: GeoPoint) -> Self {
        Geometry::Point {
            coordinates: [position.lon, position.lat],
        }
    }

    /// Outer boundary ring of a polygon, `None` for other geometry kinds.
    pub fn outer_ring(&self) -> Option<&[[f64; 2]]> {
        match self {
            Geometry::Polygon { coordinates } => coordinates.first().map(|r| r.as_slice()),
            Geometry::Point { .. } => None,
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, Geometry::Polygon { .. })
    }
}

/// Count distinct vertices in a ring, ignoring a closing duplicate.
pub fn distinct_vertex_count(ring: &[[f64; 2]]) -> usize {
    let mut seen: Vec<[f64; 2]> = Vec::with_capacity(ring.len());
    for vertex in ring {
        if !seen.contains(vertex) {
            seen.push(*vertex);
        }
    }
    seen.len()
}
