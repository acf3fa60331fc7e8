#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! GeoRisques GASPAR API client.
//!
//! Queries `GET {base_url}/{category}?latlon={lon},{lat}&rayon={metres}`
//! for hazard declarations around a point. The registry expects longitude
//! first; everything else in georisk is latitude first, and the swap happens
//! only in [`latlon_param`].
//!
//! A query resolves to a [`RiskQueryOutcome`]. Callers that only want
//! records use [`RiskQueryOutcome::into_records`], which maps every failure
//! to an empty list after logging the cause.

pub mod endpoint;

use georisk_risk_models::{Coordinate, RiskCategory, RiskRecord, SearchRadius};
use thiserror::Error;

use crate::endpoint::RegistryEndpoint;

/// Errors from decoding a registry response.
#[derive(Debug, Error)]
pub enum RiskQueryError {
    /// The payload has no `data` array.
    #[error("Response has no 'data' array")]
    MissingData,
}

/// Result of one registry query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskQueryOutcome {
    /// 2xx with a decodable payload. May be empty.
    Records(Vec<RiskRecord>),
    /// The registry answered with a non-success status.
    HttpStatus(u16),
    /// The request never got a response (DNS, connection, TLS, ...).
    Transport {
        /// Description of the failure, for logs.
        reason: String,
    },
    /// 2xx but the body could not be decoded.
    Malformed {
        /// Description of the failure, for logs.
        reason: String,
    },
}

impl RiskQueryOutcome {
    /// Returns the records, or an empty list for any failure.
    ///
    /// The failure cause is logged so that "no data" and "request failed"
    /// remain distinguishable in logs even though callers see the same
    /// empty list.
    #[must_use]
    pub fn into_records(self) -> Vec<RiskRecord> {
        match self {
            Self::Records(records) => records,
            Self::HttpStatus(status) => {
                log::warn!("Hazard registry returned HTTP {status}, treating as no data");
                Vec::new()
            }
            Self::Transport { reason } => {
                log::warn!("Hazard registry request failed ({reason}), treating as no data");
                Vec::new()
            }
            Self::Malformed { reason } => {
                log::warn!("Hazard registry response undecodable ({reason}), treating as no data");
                Vec::new()
            }
        }
    }

    /// Whether the query reached the registry and got a decodable answer.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Records(_))
    }

    /// Short user-facing description of a failed query, `None` on success.
    #[must_use]
    pub fn failure_note(&self) -> Option<String> {
        match self {
            Self::Records(_) => None,
            Self::HttpStatus(status) => Some(format!("registry returned HTTP {status}")),
            Self::Transport { .. } => Some("registry unreachable".to_string()),
            Self::Malformed { .. } => Some("registry response unreadable".to_string()),
        }
    }
}

/// Formats a coordinate for the registry's `latlon` parameter.
///
/// Despite the parameter name, the registry wants **longitude first**:
/// `"{longitude},{latitude}"`.
#[must_use]
pub fn latlon_param(coordinate: Coordinate) -> String {
    format!("{},{}", coordinate.longitude, coordinate.latitude)
}

/// Builds the registry request for hazards within `radius` of `coordinate`.
#[must_use]
pub fn build_request(
    client: &reqwest::Client,
    endpoint: &RegistryEndpoint,
    coordinate: Coordinate,
    radius: SearchRadius,
    category: RiskCategory,
) -> reqwest::RequestBuilder {
    client.get(endpoint.category_url(category)).query(&[
        ("latlon", latlon_param(coordinate)),
        ("rayon", radius.meters().to_string()),
    ])
}

/// Decodes a registry payload into records.
///
/// Individual entries whose `code_insee` cannot be normalized (or that are
/// otherwise malformed) are skipped with a warning; the rest are kept in
/// order.
///
/// # Errors
///
/// Returns [`RiskQueryError::MissingData`] if the payload has no `data`
/// array.
pub fn parse_payload(body: &serde_json::Value) -> Result<Vec<RiskRecord>, RiskQueryError> {
    let data = body["data"]
        .as_array()
        .ok_or(RiskQueryError::MissingData)?;

    let mut records = Vec::with_capacity(data.len());
    for (i, entry) in data.iter().enumerate() {
        match serde_json::from_value::<RiskRecord>(entry.clone()) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping registry entry {i}: {e}"),
        }
    }

    if records.len() < data.len() {
        log::warn!(
            "Kept {} of {} registry entries",
            records.len(),
            data.len()
        );
    }

    Ok(records)
}

/// Queries the registry for hazards near `coordinate`.
///
/// One attempt, no retry, no client-imposed timeout.
pub async fn get_risks(
    client: &reqwest::Client,
    endpoint: &RegistryEndpoint,
    coordinate: Coordinate,
    radius: SearchRadius,
    category: RiskCategory,
) -> RiskQueryOutcome {
    log::info!(
        "Querying {} {category} within {radius} of {coordinate}",
        endpoint.name
    );

    let resp = match build_request(client, endpoint, coordinate, radius, category)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            return RiskQueryOutcome::Transport {
                reason: e.to_string(),
            };
        }
    };

    let status = resp.status();
    if !status.is_success() {
        log::debug!("Registry request to {} returned {status}", resp.url());
        return RiskQueryOutcome::HttpStatus(status.as_u16());
    }

    let body = match resp.json::<serde_json::Value>().await {
        Ok(body) => body,
        Err(e) => {
            return RiskQueryOutcome::Malformed {
                reason: e.to_string(),
            };
        }
    };

    match parse_payload(&body) {
        Ok(records) => {
            log::info!("Registry returned {} record(s)", records.len());
            RiskQueryOutcome::Records(records)
        }
        Err(e) => RiskQueryOutcome::Malformed {
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::embedded_endpoint;

    fn query_pairs(request: &reqwest::Request) -> Vec<(String, String)> {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn latlon_param_puts_longitude_first() {
        assert_eq!(latlon_param(Coordinate::new(48.85, 2.35)), "2.35,48.85");
        assert_eq!(
            latlon_param(Coordinate::new(44.8378, -0.5792)),
            "-0.5792,44.8378"
        );
    }

    #[test]
    fn request_sends_lon_lat_and_radius() {
        let client = reqwest::Client::new();
        let request = build_request(
            &client,
            &embedded_endpoint(),
            Coordinate::new(48.85, 2.35),
            SearchRadius::new(1000).unwrap(),
            RiskCategory::Catnat,
        )
        .build()
        .unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/api/v1/gaspar/catnat");

        let pairs = query_pairs(&request);
        assert!(pairs.contains(&("latlon".to_string(), "2.35,48.85".to_string())));
        assert!(pairs.contains(&("rayon".to_string(), "1000".to_string())));
    }

    #[test]
    fn parses_payload_data() {
        let body = serde_json::json!({
            "results": 2,
            "page": 1,
            "data": [
                {
                    "code_national_catnat": "INTE9900627A",
                    "date_debut_evt": "25/12/1999",
                    "date_fin_evt": "29/12/1999",
                    "libelle_risque_jo": "Inondations et/ou Coulées de Boue",
                    "code_insee": "75056",
                    "libelle_commune": "Paris"
                },
                {
                    "date_fin_evt": "01/07/2003",
                    "libelle_risque_jo": "Mouvements de terrain",
                    "code_insee": 1004
                }
            ]
        });

        let records = parse_payload(&body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code_insee.as_str(), "75056");
        assert_eq!(records[1].code_insee.as_str(), "01004");
    }

    #[test]
    fn skips_entries_with_bad_codes() {
        let body = serde_json::json!({
            "data": [
                { "code_insee": "", "date_fin_evt": "01/01/2000", "libelle_risque_jo": "Séisme" },
                { "code_insee": "13055", "date_fin_evt": "01/01/2000", "libelle_risque_jo": "Séisme" }
            ]
        });

        let records = parse_payload(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code_insee.as_str(), "13055");
    }

    #[test]
    fn empty_data_is_success() {
        let body = serde_json::json!({ "data": [] });
        assert!(parse_payload(&body).unwrap().is_empty());
    }

    #[test]
    fn missing_data_is_an_error() {
        let body = serde_json::json!({ "message": "Not found" });
        assert!(matches!(
            parse_payload(&body),
            Err(RiskQueryError::MissingData)
        ));
    }

    #[test]
    fn failures_collapse_to_empty_records() {
        assert!(RiskQueryOutcome::HttpStatus(500).into_records().is_empty());
        assert!(RiskQueryOutcome::HttpStatus(404).into_records().is_empty());
        assert!(
            RiskQueryOutcome::Transport {
                reason: "connection refused".to_string()
            }
            .into_records()
            .is_empty()
        );
        assert!(
            RiskQueryOutcome::Malformed {
                reason: "eof".to_string()
            }
            .into_records()
            .is_empty()
        );
    }

    #[test]
    fn failure_notes() {
        assert_eq!(RiskQueryOutcome::Records(Vec::new()).failure_note(), None);
        assert_eq!(
            RiskQueryOutcome::HttpStatus(503).failure_note().as_deref(),
            Some("registry returned HTTP 503")
        );
        assert!(!RiskQueryOutcome::HttpStatus(503).is_success());
    }
}
