#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presentation of query results.
//!
//! - [`map::RiskMap`]: markers for the query point and every located
//!   record, coloured by hazard label ([`colors`]), exported as `GeoJSON`
//!   and as a Leaflet page.
//! - [`table::RiskTable`]: all records, located or not, sorted by event end
//!   date.

pub mod colors;
pub mod map;
pub mod table;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use map::RiskMap;
pub use table::RiskTable;

/// File name of the rendered map page.
pub const MAP_HTML_FILE: &str = "risk_map.html";

/// File name of the rendered `GeoJSON`.
pub const MAP_GEOJSON_FILE: &str = "risk_map.geojson";

/// Errors from rendering outputs.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing an output file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `GeoJSON` serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paths written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFiles {
    /// Leaflet page.
    pub html: PathBuf,
    /// `GeoJSON` `FeatureCollection`.
    pub geojson: PathBuf,
}

/// Writes the map page and its `GeoJSON` into `dir`, creating it if needed.
/// Existing files from a previous query are overwritten.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or any file operation fails.
pub fn write_outputs(map: &RiskMap, dir: &Path) -> Result<RenderedFiles, RenderError> {
    std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let html = dir.join(MAP_HTML_FILE);
    write_file(&html, &map.to_html()?)?;

    let geojson = dir.join(MAP_GEOJSON_FILE);
    write_file(&geojson, &serde_json::to_string_pretty(&map.to_geojson())?)?;

    log::info!(
        "Wrote map with {} marker(s) to {}",
        map.markers.len(),
        html.display()
    );

    Ok(RenderedFiles { html, geojson })
}

fn write_file(path: &Path, contents: &str) -> Result<(), RenderError> {
    std::fs::write(path, contents).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use georisk_risk_models::Coordinate;

    use super::*;

    #[test]
    fn writes_html_and_geojson() {
        let dir = std::env::temp_dir().join(format!("georisk_render_{}", std::process::id()));
        let map = RiskMap::build(Coordinate::new(48.85, 2.35), &[]);

        let files = write_outputs(&map, &dir).unwrap();

        let html = std::fs::read_to_string(&files.html).unwrap();
        assert!(html.contains("L.map(\"map\")"));

        let geojson: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files.geojson).unwrap()).unwrap();
        assert_eq!(geojson["type"], "FeatureCollection");
        assert_eq!(geojson["features"].as_array().unwrap().len(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
