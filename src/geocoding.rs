//! City resolution against the Open-Meteo geocoding API
//!
//! A city term is looked up directly first. When that misses and the term
//! names a prefecture, the prefecture's representative city is tried once.

use crate::http::{GuardedClient, endpoint};
use crate::models::{ResolvedLocation, SearchLocation};
use crate::{TenkiError, prefecture};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

pub const NOT_FOUND_MESSAGE: &str = "検索結果がヒットしませんでした。";
pub const GEOCODING_FETCH_ERROR_MESSAGE: &str =
    "位置情報サービスへの接続に失敗しました。しばらくしてから再度お試しください。";
pub const GEOCODING_PARSE_ERROR_MESSAGE: &str =
    "位置情報サービスの応答形式が不正です。しばらくしてから再度お試しください。";

/// Outcome of resolving a city term
pub type SearchResult = Result<ResolvedLocation, TenkiError>;

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<SearchLocation>>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    http: GuardedClient,
    base_url: String,
}

impl Geocoder {
    pub fn new(http: GuardedClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Resolve a romaji city term, falling back to the prefecture table.
    #[instrument(skip(self))]
    pub async fn resolve(&self, city_term: &str) -> SearchResult {
        let normalized = city_term.to_lowercase();

        if let Some(location) = self.search(&normalized).await?.into_iter().next() {
            debug!(
                "Found location: {} ({})",
                location.name,
                location.format_coordinates()
            );
            return Ok(ResolvedLocation {
                location,
                is_prefecture_substitute: false,
            });
        }

        let Some(city) = prefecture::representative_city(&normalized) else {
            warn!("No results found for '{}'", normalized);
            return Err(TenkiError::not_found(NOT_FOUND_MESSAGE));
        };

        info!(
            "No direct match for '{}', retrying with representative city '{}'",
            normalized, city
        );
        match self.search(city).await?.into_iter().next() {
            Some(location) => Ok(ResolvedLocation {
                location,
                is_prefecture_substitute: true,
            }),
            None => {
                warn!("No results found for representative city '{}'", city);
                Err(TenkiError::not_found(NOT_FOUND_MESSAGE))
            }
        }
    }

    /// Single geocoding query restricted to Japan, at most one candidate.
    pub async fn search(&self, name: &str) -> Result<Vec<SearchLocation>, TenkiError> {
        let url = format!(
            "{}?name={}&count=1&language=ja&format=json&countryCode=JP",
            endpoint(&self.base_url, "search"),
            urlencoding::encode(name)
        );

        let body = self
            .http
            .fetch("geocoding", self.http.get(&url))
            .await
            .map_err(|e| {
                warn!("Geocoding request for '{}' failed: {}", name, e);
                TenkiError::upstream_connection(GEOCODING_FETCH_ERROR_MESSAGE)
            })?;

        let response: GeocodingResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!("Failed to parse geocoding response for '{}': {}", name, e);
            TenkiError::upstream_shape(GEOCODING_PARSE_ERROR_MESSAGE)
        })?;

        Ok(response.results.unwrap_or_default())
    }
}

/// Notice shown when a prefecture's representative city stood in for the input.
#[must_use]
pub fn fallback_notice(original_city: &str, location_name: &str) -> String {
    format!("「{original_city}」が見つからなかったため、主要都市（{location_name}）で検索しています。")
}
