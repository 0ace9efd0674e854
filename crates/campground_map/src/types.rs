use serde::Serialize;

/// Errors raised while rendering or writing the map
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Marker or option data could not be serialized for the page script
    #[error("Failed to serialize map data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The map file could not be written
    #[error("Failed to write map: {0}")]
    Io(#[from] std::io::Error),
}

/// Display settings for the rendered map
#[derive(Debug, Clone, Serialize)]
pub struct MapOptions {
    /// Page title
    #[serde(skip)]
    pub title: String,

    /// Initial center as `[lat, lon]`, roughly the middle of NSW by default
    pub center: [f64; 2],

    /// Initial zoom level
    pub zoom: u8,

    /// Tile URL template
    pub tile_url: String,

    /// Attribution shown for the tiles
    pub attribution: String,

    /// Padding in pixels when fitting the view to the markers
    pub padding: [u32; 2],

    /// Maximum popup width in pixels
    pub popup_max_width: u32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            title: "Campground availability".to_string(),
            center: [-32.0, 147.0],
            zoom: 6,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            padding: [20, 20],
            popup_max_width: 300,
        }
    }
}

/// One map marker, as handed to the page script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// Marker fill color
    pub color: &'static str,
    /// Popup content (sanitized HTML)
    pub popup: String,
}

/// Bounding box of all markers as `[[south, west], [north, east]]`
pub type Bounds = [[f64; 2]; 2];

/// Page options as embedded in the document
#[derive(Debug, Serialize)]
pub(crate) struct PageConfig<'a> {
    #[serde(flatten)]
    pub options: &'a MapOptions,
    pub bounds: Option<Bounds>,
}

/// Document template. Placeholders are substituted by the renderer.
pub const MAP_TEMPLATE_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{TITLE}}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css">
    <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css">
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
    <style>
        html, body, #map { height: 100%; margin: 0; }
        .status-marker { width: 14px; height: 14px; border-radius: 50%; border: 2px solid white; box-shadow: 0 0 3px rgba(0,0,0,0.6); }
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        const config = {{CONFIG}};
        const markers = {{MARKERS}};

        const map = L.map("map").setView(config.center, config.zoom);
        L.tileLayer(config.tile_url, { attribution: config.attribution, maxZoom: 19 }).addTo(map);

        const cluster = L.markerClusterGroup().addTo(map);
        for (const m of markers) {
            const icon = L.divIcon({
                className: "",
                html: '<div class="status-marker" style="background:' + m.color + '"></div>',
                iconSize: [18, 18],
            });
            L.marker([m.lat, m.lon], { icon: icon })
                .bindPopup(m.popup, { maxWidth: config.popup_max_width })
                .addTo(cluster);
        }

        if (config.bounds) {
            map.fitBounds(config.bounds, { padding: config.padding });
        }
    </script>
</body>
</html>
"##;
