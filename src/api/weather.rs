use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::{TenkiError, geocoding::fallback_notice, models::WeatherSnapshot, validation};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WeatherParams {
    city: Option<String>,
    original_city: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherResponse {
    pub ok: bool,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub current: WeatherSnapshot,
}

pub(super) async fn get_weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> Result<Json<WeatherResponse>, TenkiError> {
    let Query(params) = params.map_err(|_| TenkiError::validation("city query is required"))?;
    let query = validation::weather_query(params.city.as_deref(), params.original_city.as_deref())?;

    let resolved = state.geocoder.resolve(&query.city).await?;
    let location = resolved.location;

    let current = state
        .forecast
        .fetch(location.latitude, location.longitude)
        .await?;

    let notice = resolved
        .is_prefecture_substitute
        .then(|| fallback_notice(&query.original_city, &location.name));
    info!(
        "Weather for '{}' resolved to {}{}",
        query.city,
        location.name,
        if notice.is_some() { " (prefecture fallback)" } else { "" }
    );

    Ok(Json(WeatherResponse {
        ok: true,
        city: location.name,
        country: location.country,
        notice,
        current,
    }))
}
