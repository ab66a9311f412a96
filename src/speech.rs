//! VOICEVOX speech synthesis
//!
//! The engine works in two calls: `audio_query` turns text into an
//! engine-specific JSON query, and `synthesis` renders that query as WAV.
//! The query is forwarded verbatim, never parsed.

use crate::TenkiError;
use crate::http::{GuardedClient, endpoint};
use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, instrument, warn};

pub const DEFAULT_SPEAKER: u32 = 1;
pub const ENGINE_CONNECTION_ERROR_MESSAGE: &str = "VOICEVOXエンジンへの接続に失敗しました。";
pub const SYNTHESIS_ERROR_MESSAGE: &str = "音声の生成に失敗しました。";

/// WAV audio on success, a 502-class error otherwise
pub type VoicevoxSynthesisResult = Result<Bytes, TenkiError>;

#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    http: GuardedClient,
    engine_url: String,
}

impl SpeechSynthesizer {
    pub fn new(http: GuardedClient, engine_url: impl Into<String>) -> Self {
        Self {
            http,
            engine_url: engine_url.into(),
        }
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn synthesize(&self, text: &str, speaker: u32) -> VoicevoxSynthesisResult {
        let query_url = format!(
            "{}?speaker={}&text={}",
            endpoint(&self.engine_url, "audio_query"),
            speaker,
            urlencoding::encode(text)
        );
        let query = self
            .http
            .fetch("voicevox audio_query", self.http.post(&query_url))
            .await
            .map_err(|e| {
                warn!("VOICEVOX audio_query failed: {}", e);
                TenkiError::upstream_connection(ENGINE_CONNECTION_ERROR_MESSAGE)
            })?;

        let synthesis_url = format!(
            "{}?speaker={}",
            endpoint(&self.engine_url, "synthesis"),
            speaker
        );
        let request = self
            .http
            .post(&synthesis_url)
            .header(CONTENT_TYPE, "application/json")
            .body(query);
        let audio = self
            .http
            .fetch("voicevox synthesis", request)
            .await
            .map_err(|e| {
                warn!("VOICEVOX synthesis failed: {}", e);
                TenkiError::upstream_connection(SYNTHESIS_ERROR_MESSAGE)
            })?;

        info!("Synthesized {} bytes of audio with speaker {}", audio.len(), speaker);
        Ok(audio)
    }
}
