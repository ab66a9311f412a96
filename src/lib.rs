//! `tenki` - current weather for Japanese cities
//!
//! Resolves a city typed in Japanese or romaji to coordinates, fetches the
//! current conditions and can read them out through a VOICEVOX engine.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod models;
pub mod prefecture;
pub mod romaji;
pub mod speech;
pub mod validation;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::{AppState, WeatherResponse};
pub use client::{SearchTermResolver, WeatherClient};
pub use config::TenkiConfig;
pub use error::TenkiError;
pub use geocoding::{Geocoder, SearchResult};
pub use models::{ResolvedLocation, SearchLocation, WeatherSnapshot};
pub use romaji::{RomajiConverter, normalize};
pub use speech::SpeechSynthesizer;
pub use weather::ForecastClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TenkiError>;
