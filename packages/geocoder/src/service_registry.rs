//! Compile-time embedded geocoding service configuration.
//!
//! The provider is defined in `services/nominatim.toml` and embedded at
//! compile time. The base URL can be redirected at runtime with the
//! [`BASE_URL_ENV`] environment variable (e.g. to a self-hosted instance).

use std::time::Duration;

use serde::Deserialize;

/// Environment variable that overrides [`GeocodingService::base_url`].
pub const BASE_URL_ENV: &str = "NOMINATIM_URL";

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Search endpoint URL.
    pub base_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Optional comma-separated ISO country filter (e.g., `"fr"`).
    #[serde(default)]
    pub country_codes: Option<String>,
}

impl GeocodingService {
    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns a copy pointing at `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.clone_into(&mut self.base_url);
        self
    }
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// Returns the embedded Nominatim configuration, without environment
/// overrides.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn embedded_service() -> GeocodingService {
    toml::de::from_str(NOMINATIM_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse geocoding service 'nominatim': {e}"))
}

/// Returns the Nominatim configuration with [`BASE_URL_ENV`] applied.
#[must_use]
pub fn nominatim_service() -> GeocodingService {
    let service = embedded_service();

    match std::env::var(BASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => {
            log::info!("Using geocoder at {url} ({BASE_URL_ENV})");
            service.with_base_url(url.trim())
        }
        _ => service,
    }
}
