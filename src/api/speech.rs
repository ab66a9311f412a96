use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::{TenkiError, validation};

#[derive(Debug, Deserialize)]
pub(super) struct SpeechParams {
    text: Option<String>,
    speaker: Option<String>,
}

pub(super) async fn get_speech(
    State(state): State<AppState>,
    params: Result<Query<SpeechParams>, QueryRejection>,
) -> Result<Response, TenkiError> {
    let Query(params) = params.map_err(|_| TenkiError::validation("読み上げテキストが不正です。"))?;
    let query = validation::speech_query(params.text.as_deref(), params.speaker.as_deref())?;

    let audio = state.speech.synthesize(&query.text, query.speaker).await?;

    Ok((
        [(CONTENT_TYPE, "audio/wav"), (CACHE_CONTROL, "no-store")],
        audio,
    )
        .into_response())
}
