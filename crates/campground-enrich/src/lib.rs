//! # Campground Enrich
//!
//! This crate enriches a static list of campground records with live booking availability
//! from the NSW National Parks reservation API. It handles context id extraction, anonymous
//! session cookies, cached availability lookups and classification of each record for today.

/// Types for campground records, availability status and errors
mod types;
pub use types::*;

/// Booking-system identifier extraction
mod context_id;
pub use context_id::*;

/// Tri-state availability classification for a given day
mod classifier;
pub use classifier::*;

/// Anonymous cookie session against the parks website
mod session_manager;
pub use session_manager::*;

/// HTTP client that replays responses from a TTL cache
mod cached_client;
pub use cached_client::*;

/// Client for the reservation availability endpoint
mod nsw_client;
pub use nsw_client::*;

/// Loading campground records from disk
mod loader;
pub use loader::*;

/// Sequential enrichment of campground records
mod enricher;
pub use enricher::*;
