//! Embedded GeoRisques endpoint configuration.
//!
//! Defined in `services/georisques.toml`; the API root can be redirected at
//! runtime with [`BASE_URL_ENV`].

use georisk_risk_models::RiskCategory;
use serde::Deserialize;

/// Environment variable that overrides [`RegistryEndpoint::base_url`].
pub const BASE_URL_ENV: &str = "GEORISQUES_URL";

/// Hazard registry API root.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEndpoint {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// GASPAR API root; the category is appended as a path segment.
    pub base_url: String,
}

impl RegistryEndpoint {
    /// Returns the URL for a category (e.g. `.../gaspar/catnat`).
    #[must_use]
    pub fn category_url(&self, category: RiskCategory) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            category.as_ref()
        )
    }

    /// Returns a copy pointing at `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.clone_into(&mut self.base_url);
        self
    }
}

const GEORISQUES_TOML: &str = include_str!("../services/georisques.toml");

/// Returns the embedded endpoint, without environment overrides.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn embedded_endpoint() -> RegistryEndpoint {
    toml::de::from_str(GEORISQUES_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse registry endpoint 'georisques': {e}"))
}

/// Returns the endpoint with [`BASE_URL_ENV`] applied.
#[must_use]
pub fn georisques_endpoint() -> RegistryEndpoint {
    let endpoint = embedded_endpoint();

    match std::env::var(BASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => {
            log::info!("Using hazard registry at {url} ({BASE_URL_ENV})");
            endpoint.with_base_url(url.trim())
        }
        _ => endpoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_endpoint_parses() {
        let endpoint = embedded_endpoint();
        assert_eq!(endpoint.id, "georisques");
        assert_eq!(endpoint.base_url, "https://georisques.gouv.fr/api/v1/gaspar");
    }

    #[test]
    fn category_url_appends_segment() {
        let endpoint = embedded_endpoint();
        assert_eq!(
            endpoint.category_url(RiskCategory::Catnat),
            "https://georisques.gouv.fr/api/v1/gaspar/catnat"
        );

        let slashed = endpoint.with_base_url("http://localhost:3000/gaspar/");
        assert_eq!(
            slashed.category_url(RiskCategory::Catnat),
            "http://localhost:3000/gaspar/catnat"
        );
    }
}
