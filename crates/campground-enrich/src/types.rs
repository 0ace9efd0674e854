use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys added to every enriched record
pub const DERIVED_KEYS: [&str; 3] = ["_context_id", "_dates", "_availability"];

/// A campground as read from the input file.
///
/// The record is kept as an open JSON object so unknown fields survive enrichment untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampgroundRecord(pub Map<String, Value>);

/// Latitude and longitude of a campground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl CampgroundRecord {
    /// Raw booking identifier, only when the `id` field is a string
    pub fn raw_id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Display title of the campground
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Coordinates from `coords.lat` / `coords.lon`.
    ///
    /// Both numbers and numeric strings are accepted. Missing, non-numeric or non-finite
    /// values yield `None`.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let coords = self.0.get("coords")?.as_object()?;
        let lat = coordinate_value(coords.get("lat")?)?;
        let lon = coordinate_value(coords.get("lon")?)?;
        Some(Coordinates { lat, lon })
    }

    /// All fields of the record
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CampgroundRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn coordinate_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    parsed.is_finite().then_some(parsed)
}

/// Whether a campground can be booked today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    /// Today's date is listed as bookable
    Available,
    /// Dates were returned but today is not among them
    Unavailable,
    /// No identifier, a failed lookup, or an empty date list
    Unknown,
}

impl AvailabilityStatus {
    /// Lowercase name used in output and popups
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Unavailable => "unavailable",
            AvailabilityStatus::Unknown => "unknown",
        }
    }

    /// Marker color for the rendered map
    pub fn marker_color(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "green",
            AvailabilityStatus::Unavailable => "red",
            AvailabilityStatus::Unknown => "gray",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A campground record with its derived availability fields attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    /// The original record
    #[serde(flatten)]
    pub record: CampgroundRecord,

    /// Cleaned booking identifier, if one could be extracted
    #[serde(rename = "_context_id")]
    pub context_id: Option<String>,

    /// Dates returned by the availability API, if the lookup resolved
    #[serde(rename = "_dates")]
    pub dates: Option<Vec<String>>,

    /// Availability for the day of the run
    #[serde(rename = "_availability")]
    pub availability: AvailabilityStatus,
}

impl EnrichedRecord {
    /// Attach derived fields to a record.
    ///
    /// Any derived keys already present in the input are replaced.
    pub fn new(
        mut record: CampgroundRecord,
        context_id: Option<String>,
        dates: Option<Vec<String>>,
        availability: AvailabilityStatus,
    ) -> Self {
        for key in DERIVED_KEYS {
            record.0.remove(key);
        }

        Self {
            record,
            context_id,
            dates,
            availability,
        }
    }
}

/// Fatal errors of an enrichment run
#[derive(thiserror::Error, Debug)]
pub enum EnrichError {
    /// Input file does not exist
    #[error("Missing file: {}", .0.display())]
    InputMissing(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is valid JSON but not a top-level array
    #[error("{}: expected a list of objects", .0.display())]
    NotAnArray(PathBuf),

    /// An element of the input array is not an object
    #[error("Record {index} is not an object")]
    InvalidRecord {
        /// Position of the offending element
        index: usize,
    },

    /// Session could not be established with the parks website
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Why a single availability lookup failed.
///
/// The orchestrator collapses every variant to an unknown status; the variants exist so
/// callers and tests can tell the failure modes apart.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// Body is not valid JSON
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// JSON that holds neither a date list nor a bare array of strings
    #[error("Unexpected response shape")]
    UnexpectedShape,
}
