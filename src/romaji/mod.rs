//! Japanese text to romaji search terms
//!
//! - `normalize`: collapses long-vowel transliteration artifacts
//! - `analyzer`: morphological reading lookup (kanji to hiragana)
//! - `converter`: the process-wide converter and its readiness state

pub mod analyzer;
pub mod converter;
pub mod normalize;

pub use analyzer::{ReadingAnalyzer, VibratoAnalyzer};
pub use converter::{ConverterStatus, RomajiConverter};
pub use normalize::normalize;

use wana_kana::ConvertJapanese;

/// Transliterate kana (and pass-through romaji) without morphological analysis.
#[must_use]
pub fn transliterate(input: &str) -> String {
    normalize(&input.to_romaji())
}
