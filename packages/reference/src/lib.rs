#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Commune reference table.
//!
//! Loads the static CSV that maps each INSEE commune code to a
//! representative coordinate. The file carries the coordinate as a single
//! `_geopoint` column (`"lat,lon"`) and the commune identifier as
//! `code_commune_insee`, which some exports store as a number and
//! therefore without its leading zero.
//!
//! The table is immutable once loaded. [`shared`] keeps a single
//! process-wide copy so the file is parsed at most once.

pub mod paths;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use georisk_risk_models::{CommuneCode, Coordinate, InvalidCommuneCodeError, ReferenceRow};
use thiserror::Error;

/// Header of the combined `"lat,lon"` column.
pub const GEOPOINT_COLUMN: &str = "_geopoint";

/// Header of the commune identifier column.
pub const COMMUNE_CODE_COLUMN: &str = "code_commune_insee";

/// Errors from loading the reference table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// The file could not be opened.
    #[error("Failed to open reference file {}: {source}", path.display())]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV itself is malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Reference file is missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },

    /// A `_geopoint` value is not two comma-separated numbers.
    #[error("Line {line}: cannot split _geopoint value {value:?} into latitude,longitude")]
    Geopoint {
        /// 1-based line number in the file.
        line: u64,
        /// The offending value.
        value: String,
    },

    /// A commune identifier cannot be normalized.
    #[error("Line {line}: {source}")]
    CommuneCode {
        /// 1-based line number in the file.
        line: u64,
        /// Normalization failure.
        #[source]
        source: InvalidCommuneCodeError,
    },
}

/// In-memory commune reference table, keyed by [`CommuneCode`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
    index: BTreeMap<CommuneCode, usize>,
    duplicates: usize,
}

impl ReferenceTable {
    /// Parses a reference CSV from any reader.
    ///
    /// When a commune code appears more than once (the La Poste export has
    /// one row per postal code), the first row wins and later rows are
    /// counted in [`Self::duplicate_count`].
    ///
    /// # Errors
    ///
    /// Returns [`DataLoadError`] if the CSV is malformed, a required column
    /// is missing, or any row has an unusable `_geopoint` or commune code.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, DataLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let geopoint_idx = column_index(&headers, GEOPOINT_COLUMN)?;
        let code_idx = column_index(&headers, COMMUNE_CODE_COLUMN)?;

        let mut table = Self::default();

        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);

            let raw_point = record.get(geopoint_idx).unwrap_or("");
            let coordinate = parse_geopoint(raw_point).ok_or_else(|| DataLoadError::Geopoint {
                line,
                value: raw_point.to_string(),
            })?;

            let commune_id = CommuneCode::normalize(record.get(code_idx).unwrap_or(""))
                .map_err(|source| DataLoadError::CommuneCode { line, source })?;

            table.insert(ReferenceRow {
                commune_id,
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
            });
        }

        if table.duplicates > 0 {
            log::info!(
                "Reference table: kept first of {} duplicate commune rows",
                table.duplicates
            );
        }

        Ok(table)
    }

    fn insert(&mut self, row: ReferenceRow) {
        if self.index.contains_key(&row.commune_id) {
            log::debug!("Duplicate reference row for commune {}", row.commune_id);
            self.duplicates += 1;
            return;
        }
        self.index.insert(row.commune_id.clone(), self.rows.len());
        self.rows.push(row);
    }

    /// Looks up the representative coordinate for a commune.
    #[must_use]
    pub fn get(&self, code: &CommuneCode) -> Option<Coordinate> {
        self.index
            .get(code)
            .map(|&idx| self.rows[idx].coordinate())
    }

    /// Rows in file order, one per distinct commune.
    #[must_use]
    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    /// Number of distinct communes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows skipped because their commune was already present.
    #[must_use]
    pub const fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}

impl FromIterator<ReferenceRow> for ReferenceTable {
    fn from_iter<T: IntoIterator<Item = ReferenceRow>>(iter: T) -> Self {
        let mut table = Self::default();
        for row in iter {
            table.insert(row);
        }
        table
    }
}

fn column_index(headers: &csv::StringRecord, column: &'static str) -> Result<usize, DataLoadError> {
    headers
        .iter()
        .position(|h| h.trim().trim_start_matches('\u{feff}') == column)
        .ok_or(DataLoadError::MissingColumn { column })
}

/// Splits a `"lat,lon"` value into a [`Coordinate`].
///
/// Returns `None` unless the value has exactly two comma-separated parts
/// that both parse as finite numbers.
#[must_use]
pub fn parse_geopoint(raw: &str) -> Option<Coordinate> {
    let mut parts = raw.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lon = parts.next()?.trim().parse::<f64>().ok()?;

    if parts.next().is_some() || !lat.is_finite() || !lon.is_finite() {
        return None;
    }

    Some(Coordinate::new(lat, lon))
}

/// Reads and parses the reference CSV at `path`.
///
/// # Errors
///
/// Returns [`DataLoadError`] if the file is missing or malformed.
pub fn load_reference_table(path: &Path) -> Result<ReferenceTable, DataLoadError> {
    log::info!("Loading commune reference table from {}", path.display());

    let file = std::fs::File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = ReferenceTable::from_reader(std::io::BufReader::new(file))?;

    log::info!("Loaded {} communes into reference table", table.len());
    Ok(table)
}

static SHARED: OnceLock<ReferenceTable> = OnceLock::new();

/// Returns the process-wide reference table, loading it from `path` on the
/// first successful call.
///
/// Later calls return the cached table and ignore `path`. A failed load
/// caches nothing, so the next call tries again.
///
/// # Errors
///
/// Returns [`DataLoadError`] if the table is not cached yet and the file
/// cannot be loaded.
pub fn shared(path: &Path) -> Result<&'static ReferenceTable, DataLoadError> {
    if let Some(table) = SHARED.get() {
        return Ok(table);
    }

    let table = load_reference_table(path)?;
    Ok(SHARED.get_or_init(|| table))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CommuneCode {
        CommuneCode::normalize(s).unwrap()
    }

    #[test]
    fn splits_geopoint_exactly() {
        let point = parse_geopoint("48.8566,2.3522").unwrap();
        assert!((point.latitude - 48.8566).abs() < f64::EPSILON);
        assert!((point.longitude - 2.3522).abs() < f64::EPSILON);

        let spaced = parse_geopoint(" 43.2965 , 5.3698 ").unwrap();
        assert!((spaced.latitude - 43.2965).abs() < f64::EPSILON);
        assert!((spaced.longitude - 5.3698).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_malformed_geopoint() {
        assert!(parse_geopoint("48.8566").is_none());
        assert!(parse_geopoint("48.8566,2.3522,10").is_none());
        assert!(parse_geopoint("north,east").is_none());
        assert!(parse_geopoint("").is_none());
        assert!(parse_geopoint("NaN,2.0").is_none());
    }

    #[test]
    fn parses_csv_and_pads_codes() {
        let csv = "code_commune_insee,nom_commune,_geopoint\n\
                   75056,Paris,\"48.8566,2.3522\"\n\
                   1004,Ambérieu-en-Bugey,\"45.9608,5.3729\"\n";
        let table = ReferenceTable::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        let ain = table.get(&code("01004")).unwrap();
        assert!((ain.latitude - 45.9608).abs() < f64::EPSILON);
        assert!((ain.longitude - 5.3729).abs() < f64::EPSILON);
        assert_eq!(table.rows()[1].commune_id.as_str(), "01004");
    }

    #[test]
    fn first_duplicate_wins() {
        let csv = "code_commune_insee,_geopoint\n\
                   75056,\"48.8566,2.3522\"\n\
                   75056,\"48.0,2.0\"\n";
        let table = ReferenceTable::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.duplicate_count(), 1);
        let paris = table.get(&code("75056")).unwrap();
        assert!((paris.latitude - 48.8566).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "code_commune_insee,latitude\n75056,48.8566\n";
        let err = ReferenceTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::MissingColumn {
                column: GEOPOINT_COLUMN
            }
        ));
    }

    #[test]
    fn bad_geopoint_reports_line() {
        let csv = "code_commune_insee,_geopoint\n\
                   75056,\"48.8566,2.3522\"\n\
                   13055,43.2965\n";
        let err = ReferenceTable::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            DataLoadError::Geopoint { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "43.2965");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_commune_code_is_an_error() {
        let csv = "code_commune_insee,_geopoint\n,\"48.8566,2.3522\"\n";
        assert!(matches!(
            ReferenceTable::from_reader(csv.as_bytes()),
            Err(DataLoadError::CommuneCode { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_reference_table(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
    }

    #[test]
    fn shared_table_is_loaded_once() {
        let path = paths::data_dir().join(paths::REFERENCE_CSV_FILE);
        let first = shared(&path).unwrap();
        let second = shared(Path::new("ignored/once/cached.csv")).unwrap();

        assert!(std::ptr::eq(first, second));
        assert!(first.get(&code("75056")).is_some());
    }
}
