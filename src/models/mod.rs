//! Core domain types shared across the pipeline.

pub mod geometry;

pub use geometry::{distinct_vertex_count, GeoPoint, Geometry, GeometryError};
