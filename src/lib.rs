//! # BloomWatch Analysis Backend
//!
//! Satellite vegetation monitoring analysis engine.
//!
//! This crate orchestrates field analyses against the Copernicus Data Space:
//! it manages OAuth token acquisition with endpoint failover, computes field
//! areas from drawn geometries, fetches monthly index statistics and land-cover
//! classification concurrently, post-processes the raw responses into clean
//! time series, and keeps a comparison-capable analysis history. The HTTP
//! layer exposes the same operations as a REST API for the map frontend.
//!
//! ## Features
//!
//! - **Token lifecycle**: cached bearer token with TTL and ordered endpoint failover
//! - **Area computation**: geodesic polygon area in hectares with a planar fallback
//! - **Data acquisition**: concurrent statistics + land-cover requests, fail-fast
//! - **Series processing**: per-interval index extraction, rounding, FPI composite
//! - **History**: append-only analysis store with comparison selection and CSV export
//! - **HTTP API**: axum-based REST endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) shared across the pipeline
//! - [`models`]: Geographic geometry types
//! - [`config`]: Application configuration (file, environment)
//! - [`remote`]: Clients for the imagery service (token, statistics, process, geocode)
//! - [`services`]: Analysis orchestration and pure post-processing
//! - [`store`]: History persistence (in-memory and JSON-file backends)
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - StoreError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod config;
pub mod models;

pub mod remote;

pub mod services;

pub mod store;

#[cfg(feature = "http-server")]
pub mod http;
