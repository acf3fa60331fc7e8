#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address geocoding for georisk.
//!
//! Converts a free-text French postal address into a coordinate using
//! Nominatim / `OpenStreetMap`, configured from the embedded
//! `services/nominatim.toml` (see [`service_registry`]).
//!
//! Every lookup resolves to a [`GeocodeOutcome`] rather than an error, so
//! the caller can tell "no match" apart from "service unavailable" and
//! "request failed" while still always having something to show the user.

pub mod address;
pub mod nominatim;
pub mod service_registry;

use georisk_risk_models::Coordinate;
use thiserror::Error;

use crate::service_registry::GeocodingService;

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The matched/canonical address returned by the geocoder.
    pub matched_address: Option<String>,
}

impl GeocodedAddress {
    /// Returns the position as a [`Coordinate`].
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

impl GeocodeError {
    /// Whether the failure means the service is down, overloaded or too
    /// slow, as opposed to a request the service rejected or garbled.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status(status) => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Parse { .. } => false,
        }
    }
}

/// Result of geocoding one address.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    /// The service returned a match.
    Found(GeocodedAddress),
    /// The service answered but found nothing, or the input was empty.
    NotFound,
    /// The service timed out, refused the connection, rate limited us or
    /// returned a server error.
    ServiceUnavailable {
        /// Description of the failure, for logs.
        reason: String,
    },
    /// Any other failure (unexpected status, undecodable body).
    TransportError {
        /// Description of the failure, for logs.
        reason: String,
    },
}

impl GeocodeOutcome {
    /// Collapses the outcome to an optional coordinate: `Some` only for
    /// [`Self::Found`].
    #[must_use]
    pub const fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Found(found) => Some(found.coordinate()),
            Self::NotFound | Self::ServiceUnavailable { .. } | Self::TransportError { .. } => None,
        }
    }
}

impl From<GeocodeError> for GeocodeOutcome {
    fn from(err: GeocodeError) -> Self {
        let reason = err.to_string();
        if err.is_unavailable() {
            Self::ServiceUnavailable { reason }
        } else {
            Self::TransportError { reason }
        }
    }
}

/// Builds the HTTP client for `service`, with its `User-Agent` and
/// request timeout.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the client cannot be constructed
/// (e.g., the TLS backend fails to initialize).
pub fn build_client(service: &GeocodingService) -> Result<reqwest::Client, GeocodeError> {
    Ok(reqwest::Client::builder()
        .user_agent(service.user_agent.as_str())
        .timeout(service.timeout())
        .build()?)
}

/// Geocodes a free-text address.
///
/// The address is cleaned with [`address::clean_address`] first; empty or
/// placeholder input resolves to [`GeocodeOutcome::NotFound`] without a
/// network call. A single request is made, with no retry.
pub async fn geocode_address(
    client: &reqwest::Client,
    service: &GeocodingService,
    raw_address: &str,
) -> GeocodeOutcome {
    let Some(address) = address::clean_address(raw_address) else {
        log::debug!("Address {raw_address:?} is empty after cleaning, skipping geocoder");
        return GeocodeOutcome::NotFound;
    };

    log::debug!("Geocoding {address:?} via {}", service.name);

    match nominatim::geocode_freeform(client, service, &address).await {
        Ok(Some(found)) => {
            log::info!(
                "Geocoded {address:?} to {} ({})",
                found.coordinate(),
                found.matched_address.as_deref().unwrap_or("no display name")
            );
            GeocodeOutcome::Found(found)
        }
        Ok(None) => {
            log::info!("No geocoding match for {address:?}");
            GeocodeOutcome::NotFound
        }
        Err(e) => {
            log::warn!("Geocoding {address:?} failed: {e}");
            e.into()
        }
    }
}
