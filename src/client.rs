//! Client side of the search flow.
//!
//! Mirrors what the browser UI does: convert the typed city to a romaji
//! search term through the server, fall back to local transliteration, then
//! ask `/weather` and optionally `/speech`.

use crate::api::{ConvertResponse, WeatherResponse};
use crate::error::ErrorBody;
use crate::http::{GuardedClient, endpoint};
use crate::romaji;
use crate::validation::CONVERSION_TEXT_MAX_CHARS;
use axum::body::Bytes;
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const NOT_FOUND_MESSAGE: &str = "検索結果がヒットしませんでした。";
const WEATHER_FETCH_ERROR_MESSAGE: &str = "天気情報の取得に失敗しました";
const API_CONNECTION_ERROR_MESSAGE: &str = "API サーバーへ接続できませんでした";
const EMPTY_CITY_MESSAGE: &str = "都市名を入力してください";
const SPEECH_ERROR_MESSAGE: &str = "読み上げ音声の生成に失敗しました";

/// Failures shown to the person running a lookup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    EmptyCity(&'static str),
    #[error("{0}")]
    Weather(String),
    #[error("{0}")]
    Speech(String),
    #[error("speech request already in progress")]
    SpeechBusy,
    #[error("{0}")]
    Connection(&'static str),
}

#[derive(Serialize)]
struct ConvertRequest<'a> {
    text: &'a str,
}

/// Turns user input into the search term sent to `/weather`.
#[derive(Debug, Clone)]
pub struct SearchTermResolver {
    http: GuardedClient,
    server_url: String,
}

impl SearchTermResolver {
    pub fn new(http: GuardedClient, server_url: impl Into<String>) -> Self {
        Self {
            http,
            server_url: server_url.into(),
        }
    }

    /// Never fails: any problem with the server conversion falls back to
    /// transliterating the raw input.
    pub async fn to_search_term(&self, input: &str) -> String {
        let length = input.chars().count();
        if (1..=CONVERSION_TEXT_MAX_CHARS).contains(&length) {
            match self.convert_remote(input).await {
                Ok(romaji) => return romaji,
                Err(reason) => debug!("Server conversion unavailable ({}), transliterating locally", reason),
            }
        }
        romaji::transliterate(input)
    }

    async fn convert_remote(&self, input: &str) -> Result<String, String> {
        let request = self
            .http
            .post(&endpoint(&self.server_url, "convert-to-romaji"))
            .json(&ConvertRequest { text: input });
        let body = self
            .http
            .fetch("romaji conversion", request)
            .await
            .map_err(|e| e.to_string())?;
        let response: ConvertResponse = serde_json::from_slice(&body).map_err(|e| e.to_string())?;
        Ok(response.romaji)
    }
}

/// Terminal counterpart of the search panel
#[derive(Debug)]
pub struct WeatherClient {
    http: GuardedClient,
    server_url: String,
    resolver: SearchTermResolver,
    speaking: AtomicBool,
}

impl WeatherClient {
    pub fn new(server_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let server_url = server_url.into();
        let http = GuardedClient::new(timeout)?;
        Ok(Self {
            resolver: SearchTermResolver::new(http.clone(), server_url.clone()),
            http,
            server_url,
            speaking: AtomicBool::new(false),
        })
    }

    /// Look up the current weather for what the user typed.
    pub async fn lookup(&self, input: &str) -> Result<WeatherResponse, ClientError> {
        let original_city = input.trim();
        if original_city.is_empty() {
            return Err(ClientError::EmptyCity(EMPTY_CITY_MESSAGE));
        }

        let term = self.resolver.to_search_term(original_city).await;
        debug!("Search term for '{}': {}", original_city, term);

        let url = format!(
            "{}?city={}&originalCity={}",
            endpoint(&self.server_url, "weather"),
            urlencoding::encode(&term),
            urlencoding::encode(original_city)
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|_| ClientError::Connection(API_CONNECTION_ERROR_MESSAGE))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|_| ClientError::Connection(API_CONNECTION_ERROR_MESSAGE))?;

        if status.is_success() {
            if let Ok(weather) = serde_json::from_slice::<WeatherResponse>(&body) {
                if weather.ok {
                    return Ok(weather);
                }
            }
        }
        Err(ClientError::Weather(weather_error_message(status, &body)))
    }

    /// Fetch the spoken summary of `weather` as WAV bytes.
    ///
    /// Only one speech request may be in flight at a time.
    pub async fn speak(
        &self,
        weather: &WeatherResponse,
        speaker: Option<u32>,
    ) -> Result<Bytes, ClientError> {
        let Some(_guard) = SpeakingGuard::acquire(&self.speaking) else {
            return Err(ClientError::SpeechBusy);
        };
        self.request_speech(weather, speaker).await
    }

    async fn request_speech(
        &self,
        weather: &WeatherResponse,
        speaker: Option<u32>,
    ) -> Result<Bytes, ClientError> {
        let text = weather.current.speech_summary(&weather.city);
        let mut url = format!(
            "{}?text={}",
            endpoint(&self.server_url, "speech"),
            urlencoding::encode(&text)
        );
        if let Some(speaker) = speaker {
            url.push_str(&format!("&speaker={speaker}"));
        }

        let speech_error = || ClientError::Speech(SPEECH_ERROR_MESSAGE.to_string());
        let response = self.http.get(&url).send().await.map_err(|_| speech_error())?;
        let status = response.status();
        let body = response.bytes().await.map_err(|_| speech_error())?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| SPEECH_ERROR_MESSAGE.to_string());
        Err(ClientError::Speech(message))
    }
}

/// Holds the single speech slot; released on drop, including when the
/// request future is cancelled mid-flight.
struct SpeakingGuard<'a>(&'a AtomicBool);

impl<'a> SpeakingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::AcqRel)).then(|| Self(flag))
    }
}

impl Drop for SpeakingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn weather_error_message(status: StatusCode, body: &[u8]) -> String {
    if status == StatusCode::NOT_FOUND {
        return NOT_FOUND_MESSAGE.to_string();
    }
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .unwrap_or_else(|| WEATHER_FETCH_ERROR_MESSAGE.to_string())
}
