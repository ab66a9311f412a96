//! Request input validation. Everything here runs before any outbound call.

use crate::TenkiError;
use crate::speech::DEFAULT_SPEAKER;
use regex::Regex;
use std::sync::LazyLock;

pub const CITY_MAX_CHARS: usize = 100;
pub const SPEECH_TEXT_MAX_CHARS: usize = 300;
pub const CONVERSION_TEXT_MAX_CHARS: usize = 100;
pub const SPEAKER_MAX: u32 = 999_999;

const CITY_INVALID_MESSAGE: &str = "city query is required";
const SPEECH_INVALID_MESSAGE: &str = "読み上げテキストが不正です。";
const CONVERSION_INVALID_MESSAGE: &str = "Invalid request";

static CITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}\s\-'.]+$").expect("city pattern is a valid regex")
});

fn within(text: &str, max: usize) -> bool {
    (1..=max).contains(&text.chars().count())
}

/// Validated `/weather` query
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub city: String,
    /// What the user typed before romaji conversion, for the fallback notice
    pub original_city: String,
}

pub fn weather_query(
    city: Option<&str>,
    original_city: Option<&str>,
) -> Result<WeatherQuery, TenkiError> {
    let city = city
        .map(str::trim)
        .filter(|c| within(c, CITY_MAX_CHARS) && CITY_PATTERN.is_match(c))
        .ok_or_else(|| TenkiError::validation(CITY_INVALID_MESSAGE))?;

    let original_city = match original_city.map(str::trim) {
        None => city,
        Some(original) if within(original, CITY_MAX_CHARS) => original,
        Some(_) => return Err(TenkiError::validation(CITY_INVALID_MESSAGE)),
    };

    Ok(WeatherQuery {
        city: city.to_string(),
        original_city: original_city.to_string(),
    })
}

/// Validated `/speech` query
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechQuery {
    pub text: String,
    pub speaker: u32,
}

pub fn speech_query(text: Option<&str>, speaker: Option<&str>) -> Result<SpeechQuery, TenkiError> {
    let invalid = || TenkiError::validation(SPEECH_INVALID_MESSAGE);

    let text = text
        .filter(|t| within(t, SPEECH_TEXT_MAX_CHARS))
        .ok_or_else(invalid)?;

    let speaker = match speaker {
        None => DEFAULT_SPEAKER,
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|s| (1..=SPEAKER_MAX).contains(s))
            .ok_or_else(invalid)?,
    };

    Ok(SpeechQuery {
        text: text.to_string(),
        speaker,
    })
}

pub fn conversion_text(text: &str) -> Result<&str, TenkiError> {
    if within(text, CONVERSION_TEXT_MAX_CHARS) {
        Ok(text)
    } else {
        Err(TenkiError::validation(CONVERSION_INVALID_MESSAGE))
    }
}
