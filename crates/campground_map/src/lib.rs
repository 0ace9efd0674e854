//! # Campground Map
//!
//! This crate renders enriched campground records as a standalone interactive map: a single
//! HTML file using Leaflet with clustered markers colored by availability.

/// Map options, markers, HTML template and errors.
pub mod types;
pub use types::*;

/// Rendering of enriched records into the map document.
pub mod render;
pub use render::MapRenderer;
