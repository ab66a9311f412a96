use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    TenkiConfig,
    geocoding::Geocoder,
    http::GuardedClient,
    romaji::RomajiConverter,
    speech::SpeechSynthesizer,
    weather::ForecastClient,
};

mod romaji;
mod speech;
mod weather;

pub use romaji::ConvertResponse;
pub use weather::WeatherResponse;

/// Shared, read-only handles used by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub geocoder: Geocoder,
    pub forecast: ForecastClient,
    pub speech: SpeechSynthesizer,
    pub converter: RomajiConverter,
    /// Await converter initialization instead of answering 503
    pub await_converter: bool,
}

impl AppState {
    pub fn from_config(config: &TenkiConfig, converter: RomajiConverter) -> reqwest::Result<Self> {
        let http = GuardedClient::new(config.services.timeout())?;
        Ok(Self {
            geocoder: Geocoder::new(http.clone(), &config.services.geocoding_base_url),
            forecast: ForecastClient::new(http.clone(), &config.services.forecast_base_url),
            speech: SpeechSynthesizer::new(http, &config.services.voicevox_engine_url),
            converter,
            await_converter: config.converter.await_ready,
        })
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weather", get(weather::get_weather))
        .route("/convert-to-romaji", post(romaji::convert_to_romaji))
        .route("/speech", get(speech::get_speech))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
