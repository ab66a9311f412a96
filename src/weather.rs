use crate::TenkiError;
use crate::http::{GuardedClient, endpoint};
use crate::models::WeatherSnapshot;
use tracing::{info, instrument, warn};

pub const FORECAST_FETCH_ERROR_MESSAGE: &str = "Failed to fetch weather data";
pub const FORECAST_PARSE_ERROR_MESSAGE: &str = "Invalid weather data response";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";
const TIMEZONE: &str = "Asia/Tokyo";

#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: GuardedClient,
    base_url: String,
}

impl ForecastClient {
    pub fn new(http: GuardedClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Current conditions at the given coordinates.
    #[instrument(skip(self))]
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot, TenkiError> {
        let url = format!(
            "{}?latitude={}&longitude={}&current={}&timezone={}",
            endpoint(&self.base_url, "forecast"),
            latitude,
            longitude,
            CURRENT_FIELDS,
            urlencoding::encode(TIMEZONE)
        );

        let body = self
            .http
            .fetch("forecast", self.http.get(&url))
            .await
            .map_err(|e| {
                warn!("Forecast request failed: {}", e);
                TenkiError::upstream_connection(FORECAST_FETCH_ERROR_MESSAGE)
            })?;

        let response: openmeteo::ForecastResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!("Failed to parse forecast response: {}", e);
            TenkiError::upstream_shape(FORECAST_PARSE_ERROR_MESSAGE)
        })?;

        let snapshot = WeatherSnapshot::from(response.current);
        info!(
            "Current weather at {:.4}, {:.4}: {} ({:?})",
            latitude,
            longitude,
            snapshot.format_temperature(),
            snapshot.condition()
        );
        Ok(snapshot)
    }
}

/// `OpenMeteo` API response structures
mod openmeteo {
    use super::WeatherSnapshot;
    use serde::Deserialize;

    /// Forecast response restricted to the `current` block
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub current: CurrentData,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        pub time: String,
        #[serde(rename = "temperature_2m")]
        pub temperature: f64,
        #[serde(rename = "relative_humidity_2m")]
        pub humidity: Option<f64>,
        pub weather_code: Option<i32>,
        #[serde(rename = "wind_speed_10m")]
        pub wind_speed: Option<f64>,
    }

    impl From<CurrentData> for WeatherSnapshot {
        fn from(current: CurrentData) -> Self {
            Self {
                time: current.time,
                temperature_c: current.temperature,
                humidity: current.humidity,
                weather_code: current.weather_code,
                wind_speed: current.wind_speed,
            }
        }
    }

}
