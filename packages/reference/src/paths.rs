#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the `data/` directory.
//!
//! All paths are relative to the project root's `data/` directory unless an
//! environment override is set.

use std::path::{Path, PathBuf};

/// Environment variable that overrides [`reference_csv_path`].
pub const REFERENCE_CSV_ENV: &str = "GEORISK_REFERENCE_CSV";

/// File name of the bundled commune reference table.
pub const REFERENCE_CSV_FILE: &str = "insee_lat_lon.csv";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the `data/generated/` directory for rendered maps.
#[must_use]
pub fn generated_dir() -> PathBuf {
    data_dir().join("generated")
}

/// Returns the commune reference CSV path, honouring
/// [`REFERENCE_CSV_ENV`] when set to a non-empty value.
#[must_use]
pub fn reference_csv_path() -> PathBuf {
    std::env::var(REFERENCE_CSV_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| data_dir().join(REFERENCE_CSV_FILE), PathBuf::from)
}
