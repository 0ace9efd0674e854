use std::fs;
use std::path::Path;

use campground_enrich::EnrichedRecord;
use serde::Serialize;
use tracing::{debug, info};

use crate::types::{Bounds, MAP_TEMPLATE_HTML, MapError, MapMarker, MapOptions, PageConfig};

const DEFAULT_TITLE: &str = "Unknown campground";

/// Renders enriched campgrounds as a Leaflet map document
pub struct MapRenderer {
    options: MapOptions,
}

impl MapRenderer {
    /// Create a renderer, falling back to the default NSW view
    pub fn new(options: Option<MapOptions>) -> Self {
        Self {
            options: options.unwrap_or_default(),
        }
    }

    /// Markers for every record with resolvable coordinates, in input order
    pub fn markers(&self, records: &[EnrichedRecord]) -> Vec<MapMarker> {
        records
            .iter()
            .filter_map(|record| {
                let Some(coords) = record.record.coordinates() else {
                    debug!(
                        "Skipping {} without coordinates",
                        record.record.title().unwrap_or(DEFAULT_TITLE)
                    );
                    return None;
                };

                Some(MapMarker {
                    lat: coords.lat,
                    lon: coords.lon,
                    color: record.availability.marker_color(),
                    popup: popup_html(record),
                })
            })
            .collect()
    }

    /// Render the full HTML document
    pub fn render(&self, records: &[EnrichedRecord]) -> Result<String, MapError> {
        let markers = self.markers(records);
        let config = PageConfig {
            options: &self.options,
            bounds: marker_bounds(&markers),
        };

        Ok(MAP_TEMPLATE_HTML
            .replace("{{TITLE}}", &plain_text(&self.options.title))
            .replace("{{CONFIG}}", &script_json(&config)?)
            .replace("{{MARKERS}}", &script_json(&markers)?))
    }

    /// Render and write the document to `path`. Returns the number of markers placed.
    pub fn save(&self, records: &[EnrichedRecord], path: &Path) -> Result<usize, MapError> {
        let html = self.render(records)?;
        fs::write(path, html)?;

        let placed = self.markers(records).len();
        info!("Saved map with {} markers to {}", placed, path.display());
        Ok(placed)
    }
}

/// Popup lines for a record, joined with `<br/>`. Record text never carries markup.
pub fn popup_html(record: &EnrichedRecord) -> String {
    let title = record.record.title().unwrap_or(DEFAULT_TITLE);

    let mut lines = vec![plain_text(title)];
    if let Some(context_id) = &record.context_id {
        lines.push(format!("ID: {}", plain_text(context_id)));
    }
    lines.push(format!("Status: {}", record.availability));

    lines.join("<br/>")
}

/// Smallest box containing every marker, or `None` without markers
pub fn marker_bounds(markers: &[MapMarker]) -> Option<Bounds> {
    let first = markers.first()?;
    let mut bounds = [[first.lat, first.lon], [first.lat, first.lon]];

    for marker in &markers[1..] {
        bounds[0][0] = bounds[0][0].min(marker.lat);
        bounds[0][1] = bounds[0][1].min(marker.lon);
        bounds[1][0] = bounds[1][0].max(marker.lat);
        bounds[1][1] = bounds[1][1].max(marker.lon);
    }

    Some(bounds)
}

/// Strip every tag and escape what remains, so the text renders literally
fn plain_text(text: &str) -> String {
    ammonia::Builder::empty().clean(text).to_string()
}

/// JSON safe to embed inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> Result<String, MapError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
