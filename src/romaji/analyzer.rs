//! Morphological reading lookup backed by a vibrato dictionary

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};
use vibrato::{Dictionary, Tokenizer};
use wana_kana::ConvertJapanese;

/// Converts Japanese text (kanji, kana, mixed) to its hiragana reading.
pub trait ReadingAnalyzer: Send + Sync {
    fn to_hiragana(&self, text: &str) -> Result<String>;
}

/// Reading analyzer over a vibrato system dictionary (IPADIC, UniDic, ...).
pub struct VibratoAnalyzer {
    tokenizer: Tokenizer,
    reading_field: usize,
}

impl VibratoAnalyzer {
    /// Load a compiled dictionary. Files ending in `.zst` are decompressed.
    ///
    /// Blocking: reading a system dictionary takes seconds.
    pub fn load(path: &Path, reading_field: usize) -> Result<Self> {
        info!("Loading morphological dictionary from {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open dictionary {}", path.display()))?;

        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "zst") {
            Box::new(zstd::Decoder::new(file).context("Failed to start zstd decoder")?)
        } else {
            Box::new(BufReader::new(file))
        };

        let dictionary = Dictionary::read(reader)
            .with_context(|| format!("Failed to read dictionary {}", path.display()))?;

        Ok(Self {
            tokenizer: Tokenizer::new(dictionary),
            reading_field,
        })
    }
}

impl ReadingAnalyzer for VibratoAnalyzer {
    fn to_hiragana(&self, text: &str) -> Result<String> {
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();

        let reading: String = worker
            .token_iter()
            .map(|token| reading_of(token.surface(), token.feature(), self.reading_field))
            .collect();
        debug!("Reading for '{}': {}", text, reading);

        Ok(reading.to_hiragana())
    }
}

/// Pick the reading column out of a CSV feature string, falling back to the
/// surface for unknown words.
fn reading_of<'a>(surface: &'a str, feature: &'a str, field: usize) -> &'a str {
    match feature.split(',').nth(field) {
        Some(reading) if !reading.is_empty() && reading != "*" => reading,
        _ => surface,
    }
}
