use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AppState;
use crate::{TenkiError, validation};

#[derive(Debug, Deserialize)]
pub(super) struct ConvertRequest {
    text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConvertResponse {
    pub ok: bool,
    pub romaji: String,
}

pub(super) async fn convert_to_romaji(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ConvertResponse>, TenkiError> {
    if state.await_converter {
        state.converter.wait_ready().await?;
    } else {
        state.converter.ensure_ready()?;
    }

    // body limit exceeded or unreadable
    let body = body.map_err(|_| TenkiError::validation("Invalid JSON"))?;
    // Content-Type is not required, any body is parsed as JSON
    let request: ConvertRequest = serde_json::from_slice(&body).map_err(|e| {
        if e.is_data() {
            TenkiError::validation("Invalid request")
        } else {
            TenkiError::validation("Invalid JSON")
        }
    })?;
    let text = validation::conversion_text(&request.text)?;

    let romaji = state.converter.convert(text)?;
    debug!("Converted '{}' to '{}'", text, romaji);

    Ok(Json(ConvertResponse { ok: true, romaji }))
}
