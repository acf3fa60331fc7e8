//! Nominatim free-form search.
//!
//! The public instance allows at most 1 request per second and requires an
//! identifying `User-Agent`; both are the caller's responsibility (the
//! interactive session issues one request per user action).
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use serde::Deserialize;

use crate::service_registry::GeocodingService;
use crate::{GeocodeError, GeocodedAddress};

/// Builds the free-form search request for `query`.
#[must_use]
pub fn build_request(
    client: &reqwest::Client,
    service: &GeocodingService,
    query: &str,
) -> reqwest::RequestBuilder {
    let mut request = client
        .get(&service.base_url)
        .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")]);

    if let Some(codes) = service.country_codes.as_deref() {
        request = request.query(&[("countrycodes", codes)]);
    }

    request
}

/// Geocodes a free-form address using Nominatim.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the request fails, the server answers with a
/// non-success status, or the response cannot be parsed.
pub async fn geocode_freeform(
    client: &reqwest::Client,
    service: &GeocodingService,
    query: &str,
) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let response = build_request(client, service, query).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GeocodeError::Status(status));
    }

    parse_response(&response.json::<serde_json::Value>().await?)
}

/// One entry of a `jsonv2` search response. Nominatim sends coordinates
/// as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Parses a search response, keeping the best (first) match.
///
/// # Errors
///
/// Returns [`GeocodeError::Parse`] if the body is not an array of places or
/// the first place has non-numeric coordinates.
pub fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let places: Vec<Place> =
        serde_json::from_value(body.clone()).map_err(|e| GeocodeError::Parse {
            message: format!("unexpected search response: {e}"),
        })?;

    places.into_iter().next().map(Place::into_address).transpose()
}

impl Place {
    fn into_address(self) -> Result<GeocodedAddress, GeocodeError> {
        let coordinate = |name: &str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| GeocodeError::Parse {
                    message: format!("{name} {raw:?} is not a number: {e}"),
                })
        };

        Ok(GeocodedAddress {
            latitude: coordinate("lat", &self.lat)?,
            longitude: coordinate("lon", &self.lon)?,
            matched_address: self.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_registry::embedded_service;

    #[test]
    fn keeps_first_match() {
        let body = serde_json::json!([{
            "lat": "48.8588897",
            "lon": "2.3200410",
            "display_name": "Paris, Île-de-France, France métropolitaine, France"
        }]);
        let found = parse_response(&body).unwrap().unwrap();
        assert!((found.latitude - 48.858_889_7).abs() < 1e-7);
        assert!((found.longitude - 2.320_041).abs() < 1e-7);
        assert!(found.matched_address.unwrap().starts_with("Paris"));
    }

    #[test]
    fn no_match_is_none() {
        assert!(parse_response(&serde_json::json!([])).unwrap().is_none());
    }

    #[test]
    fn rejects_non_numeric_lat() {
        let body = serde_json::json!([{ "lat": "nord", "lon": "2.35" }]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_non_array_body() {
        let body = serde_json::json!({"error": "Unable to geocode"});
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_numeric_lat() {
        let body = serde_json::json!([{ "lat": 48.85, "lon": "2.35" }]);
        assert!(parse_response(&body).is_err());
    }

    #[test]
    fn request_carries_query_and_country_filter() {
        let client = reqwest::Client::new();
        let service = embedded_service();
        let request = build_request(&client, &service, "10 rue de Rivoli, Paris")
            .build()
            .unwrap();

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("q".to_string(), "10 rue de Rivoli, Paris".to_string())));
        assert!(pairs.contains(&("format".to_string(), "jsonv2".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "1".to_string())));
        assert!(pairs.contains(&("countrycodes".to_string(), "fr".to_string())));
    }

    #[test]
    fn request_without_country_filter() {
        let client = reqwest::Client::new();
        let mut service = embedded_service();
        service.country_codes = None;
        let request = build_request(&client, &service, "Lyon").build().unwrap();

        assert!(!request.url().query_pairs().any(|(k, _)| k == "countrycodes"));
    }
}
