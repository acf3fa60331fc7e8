#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data model for the georisk toolchain.
//!
//! Every crate that touches a commune identifier goes through
//! [`CommuneCode`], so the five-character zero-padded form is the only
//! representation that can exist in memory. Join keys on both sides of the
//! risk/reference merge therefore compare equal whenever the source codes
//! denote the same commune, regardless of how the source formatted them.

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Width of an INSEE commune code.
pub const COMMUNE_CODE_LEN: usize = 5;

/// An INSEE commune code, always exactly [`COMMUNE_CODE_LEN`] characters
/// and left-padded with `'0'`.
///
/// Corsican codes (`2A004`, `2B033`) are alphanumeric, so the code is kept
/// as text and never round-tripped through an integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CommuneCode(String);

impl CommuneCode {
    /// Normalizes a raw commune identifier.
    ///
    /// Surrounding whitespace is trimmed and the result is left-padded with
    /// `'0'` to five characters (`"1234"` becomes `"01234"`).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCommuneCodeError`] if the trimmed input is empty,
    /// longer than five characters, or contains anything other than ASCII
    /// letters and digits.
    pub fn normalize(raw: &str) -> Result<Self, InvalidCommuneCodeError> {
        let trimmed = raw.trim();

        if trimmed.is_empty()
            || trimmed.len() > COMMUNE_CODE_LEN
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(InvalidCommuneCodeError {
                value: raw.to_string(),
            });
        }

        Ok(Self(format!(
            "{trimmed:0>width$}",
            width = COMMUNE_CODE_LEN
        )))
    }

    /// Normalizes a commune identifier that was stored as a number (which
    /// strips leading zeros, e.g. `1234` for Ain's `01234`).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCommuneCodeError`] if the number has more than five
    /// digits.
    pub fn from_number(value: u64) -> Result<Self, InvalidCommuneCodeError> {
        Self::normalize(&value.to_string())
    }

    /// Returns the normalized five-character code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the two-character département prefix (`"75"`, `"2A"`).
    ///
    /// Overseas départements use three characters (`"971"`) but the first
    /// two are still a stable grouping key.
    #[must_use]
    pub fn departement(&self) -> &str {
        &self.0[..2]
    }
}

impl std::fmt::Display for CommuneCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CommuneCode {
    type Err = InvalidCommuneCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl<'de> Deserialize<'de> for CommuneCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawCode {
            Text(String),
            Number(u64),
        }

        match RawCode::deserialize(deserializer)? {
            RawCode::Text(s) => Self::normalize(&s),
            RawCode::Number(n) => Self::from_number(n),
        }
        .map_err(serde::de::Error::custom)
    }
}

/// Error returned when a raw value cannot be turned into a [`CommuneCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCommuneCodeError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidCommuneCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid commune code {:?}: expected 1-{COMMUNE_CODE_LEN} alphanumeric characters",
            self.value
        )
    }
}

impl std::error::Error for InvalidCommuneCodeError {}

/// A WGS84 point. Internally the order is always latitude first; the few
/// external formats that expect longitude first convert explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from a `(latitude, longitude)` pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// One row of the commune reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRow {
    /// Normalized commune code.
    pub commune_id: CommuneCode,
    /// Representative latitude of the commune.
    pub latitude: f64,
    /// Representative longitude of the commune.
    pub longitude: f64,
}

impl ReferenceRow {
    /// Returns the row's position as a [`Coordinate`].
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Hazard registry endpoint to query.
///
/// Each variant is a path segment under the GASPAR API root.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskCategory {
    /// Natural-catastrophe ("CatNat") declarations.
    #[default]
    Catnat,
}

impl RiskCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Catnat]
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Catnat => "Natural catastrophe declarations",
        }
    }
}

/// A search radius in metres, bounded to
/// [`SearchRadius::MIN`]..=[`SearchRadius::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SearchRadius(u32);

impl SearchRadius {
    /// Smallest accepted radius, in metres.
    pub const MIN: u32 = 100;
    /// Largest accepted radius, in metres.
    pub const MAX: u32 = 5000;
    /// Radius used when the user does not pick one.
    pub const DEFAULT: Self = Self(1000);

    /// Creates a radius.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRadiusError`] if `meters` is outside
    /// [`Self::MIN`]..=[`Self::MAX`].
    pub const fn new(meters: u32) -> Result<Self, InvalidRadiusError> {
        if meters < Self::MIN || meters > Self::MAX {
            return Err(InvalidRadiusError { meters });
        }
        Ok(Self(meters))
    }

    /// Returns the radius in metres.
    #[must_use]
    pub const fn meters(self) -> u32 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for SearchRadius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} m", self.0)
    }
}

/// Error returned when a radius is outside the accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRadiusError {
    /// The rejected radius.
    pub meters: u32,
}

impl std::fmt::Display for InvalidRadiusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid radius {} m: expected {}-{}",
            self.meters,
            SearchRadius::MIN,
            SearchRadius::MAX
        )
    }
}

impl std::error::Error for InvalidRadiusError {}

/// One user-triggered lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Free-text postal address.
    pub address: String,
    /// Search radius around the geocoded point.
    pub radius: SearchRadius,
    /// Registry endpoint to query.
    pub category: RiskCategory,
}

/// A hazard declaration as returned by the registry.
///
/// Field names match the registry's JSON payload. Only `code_insee`,
/// `date_fin_evt` and `libelle_risque_jo` are relied upon; the rest are
/// carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRecord {
    /// Commune the declaration applies to.
    pub code_insee: CommuneCode,
    /// Event end date as sent by the registry (usually `dd/mm/yyyy`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_fin_evt: String,
    /// Hazard category label (e.g. `"Séisme"`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub libelle_risque_jo: String,
    /// Event start date.
    #[serde(default)]
    pub date_debut_evt: Option<String>,
    /// Commune name.
    #[serde(default)]
    pub libelle_commune: Option<String>,
    /// National declaration identifier.
    #[serde(default)]
    pub code_national_catnat: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A [`RiskRecord`] after the reference join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRiskRecord {
    /// The registry record, unchanged.
    #[serde(flatten)]
    pub record: RiskRecord,
    /// Commune coordinates, or `None` when the reference table has no row
    /// for [`RiskRecord::code_insee`].
    pub location: Option<Coordinate>,
}

impl MergedRiskRecord {
    /// Whether the record can be placed on a map.
    #[must_use]
    pub const fn is_located(&self) -> bool {
        self.location.is_some()
    }
}
