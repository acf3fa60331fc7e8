//! Map of a query result.
//!
//! [`RiskMap`] is a plain marker list centred on the queried point. It is
//! exported as a `GeoJSON` `FeatureCollection` and as a standalone Leaflet
//! page that embeds that collection.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use georisk_risk_models::{Coordinate, MergedRiskRecord};

use crate::RenderError;
use crate::colors::{QUERY_POINT_COLOR, marker_color};

/// Popup text of the queried-address marker.
pub const QUERY_POINT_POPUP: &str = "Your location";

/// What a marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The geocoded address.
    QueryPoint,
    /// A located hazard declaration.
    Risk,
}

impl MarkerKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::QueryPoint => "query",
            Self::Risk => "risk",
        }
    }
}

/// One map marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    /// Marker position.
    pub position: Coordinate,
    /// CSS colour name.
    pub color: &'static str,
    /// Popup HTML. Label text is escaped; only the `<br>` separator is
    /// markup.
    pub popup: String,
    /// What the marker stands for.
    pub kind: MarkerKind,
}

/// Map centred on the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskMap {
    /// Map centre (the geocoded address).
    pub center: Coordinate,
    /// Initial zoom level.
    pub zoom: u8,
    /// Query-point marker first, then one per located record in input
    /// order.
    pub markers: Vec<MapMarker>,
}

impl RiskMap {
    /// Initial zoom level (street/neighbourhood scale).
    pub const DEFAULT_ZOOM: u8 = 12;

    /// Builds the map for a query centred on `center`.
    ///
    /// Records without a location are skipped; they only appear in the
    /// table.
    #[must_use]
    pub fn build(center: Coordinate, records: &[MergedRiskRecord]) -> Self {
        let mut markers = Vec::with_capacity(records.len() + 1);

        markers.push(MapMarker {
            position: center,
            color: QUERY_POINT_COLOR,
            popup: QUERY_POINT_POPUP.to_string(),
            kind: MarkerKind::QueryPoint,
        });

        for merged in records {
            let Some(position) = merged.location else {
                continue;
            };
            let label = &merged.record.libelle_risque_jo;
            markers.push(MapMarker {
                position,
                color: marker_color(label),
                popup: format!(
                    "{}<br>{}",
                    escape_html(label),
                    escape_html(&merged.record.date_fin_evt)
                ),
                kind: MarkerKind::Risk,
            });
        }

        Self {
            center,
            zoom: Self::DEFAULT_ZOOM,
            markers,
        }
    }

    /// Markers for hazard declarations (everything but the query point).
    pub fn risk_markers(&self) -> impl Iterator<Item = &MapMarker> {
        self.markers.iter().filter(|m| m.kind == MarkerKind::Risk)
    }

    /// Exports the markers as a `GeoJSON` `FeatureCollection`.
    ///
    /// Positions are written longitude first, as `GeoJSON` requires.
    #[must_use]
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .markers
            .iter()
            .map(|marker| {
                let mut properties = JsonObject::new();
                properties.insert("kind".to_string(), marker.kind.as_str().into());
                properties.insert("color".to_string(), marker.color.into());
                properties.insert("popup".to_string(), marker.popup.clone().into());

                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Point(vec![
                        marker.position.longitude,
                        marker.position.latitude,
                    ]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Renders a standalone Leaflet page showing the markers.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Json`] if the `GeoJSON` cannot be serialized.
    pub fn to_html(&self) -> Result<String, RenderError> {
        // `</` inside an inline script would end the script element.
        let geojson = serde_json::to_string(&self.to_geojson())?.replace("</", "<\\/");

        Ok(HTML_TEMPLATE
            .replace("__CENTER_LAT__", &self.center.latitude.to_string())
            .replace("__CENTER_LON__", &self.center.longitude.to_string())
            .replace("__ZOOM__", &self.zoom.to_string())
            .replace("__GEOJSON__", &geojson))
    }
}

/// Escapes text for inclusion in HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Know Your Risk - GeoRisques Explorer</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
  html, body { height: 100%; margin: 0; }
  #map { height: 100%; }
</style>
</head>
<body>
<div id="map"></div>
<script>
  const data = __GEOJSON__;
  const map = L.map("map").setView([__CENTER_LAT__, __CENTER_LON__], __ZOOM__);
  L.tileLayer("https://tile.openstreetmap.org/{z}/{x}/{y}.png", {
    maxZoom: 19,
    attribution: "&copy; OpenStreetMap contributors",
  }).addTo(map);
  L.geoJSON(data, {
    pointToLayer: (feature, latlng) => L.circleMarker(latlng, {
      radius: feature.properties.kind === "query" ? 10 : 7,
      color: feature.properties.color,
      fillColor: feature.properties.color,
      fillOpacity: 0.8,
    }),
    onEachFeature: (feature, layer) => layer.bindPopup(feature.properties.popup),
  }).addTo(map);
</script>
</body>
</html>
"#;
