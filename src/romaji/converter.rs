//! Process-wide romaji converter with a one-shot readiness state.
//!
//! Initialization runs once in the background. Its outcome is published on a
//! `watch` channel that moves from `Initializing` to either `Ready` or
//! `Failed` and never changes afterwards.

use super::{ReadingAnalyzer, normalize};
use crate::TenkiError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use wana_kana::ConvertJapanese;

#[derive(Clone)]
enum ConverterState {
    Initializing,
    Ready(Arc<dyn ReadingAnalyzer>),
    Failed(String),
}

/// Observable readiness of the converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterStatus {
    Initializing,
    Ready,
    Failed(String),
}

#[derive(Clone)]
pub struct RomajiConverter {
    state: watch::Receiver<ConverterState>,
}

impl std::fmt::Debug for RomajiConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RomajiConverter")
            .field("status", &self.status())
            .finish()
    }
}

impl RomajiConverter {
    /// Spawn `init` on the runtime and publish its outcome once it settles.
    pub fn initialize<F>(init: F) -> Self
    where
        F: Future<Output = anyhow::Result<Arc<dyn ReadingAnalyzer>>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(ConverterState::Initializing);
        tokio::spawn(async move {
            let state = match init.await {
                Ok(analyzer) => {
                    info!("Romaji converter initialized");
                    ConverterState::Ready(analyzer)
                }
                Err(e) => {
                    error!("Failed to initialize romaji converter: {:#}", e);
                    ConverterState::Failed(e.to_string())
                }
            };
            let _ = tx.send(state);
        });
        Self { state: rx }
    }

    /// Converter that is ready immediately.
    pub fn ready(analyzer: Arc<dyn ReadingAnalyzer>) -> Self {
        let (_tx, rx) = watch::channel(ConverterState::Ready(analyzer));
        Self { state: rx }
    }

    /// Converter whose initialization already failed.
    pub fn failed<S: Into<String>>(reason: S) -> Self {
        let (_tx, rx) = watch::channel(ConverterState::Failed(reason.into()));
        Self { state: rx }
    }

    #[must_use]
    pub fn status(&self) -> ConverterStatus {
        let closed = self.state.has_changed().is_err();
        match &*self.state.borrow() {
            ConverterState::Initializing if closed => {
                ConverterStatus::Failed("initialization aborted".to_string())
            }
            ConverterState::Initializing => ConverterStatus::Initializing,
            ConverterState::Ready(_) => ConverterStatus::Ready,
            ConverterState::Failed(reason) => ConverterStatus::Failed(reason.clone()),
        }
    }

    /// Fail fast unless initialization has completed successfully.
    pub fn ensure_ready(&self) -> Result<(), TenkiError> {
        self.analyzer().map(|_| ())
    }

    /// Wait until initialization settles, then report its outcome.
    pub async fn wait_ready(&self) -> Result<(), TenkiError> {
        let mut rx = self.state.clone();
        let settled = rx
            .wait_for(|state| !matches!(state, ConverterState::Initializing))
            .await
            .map(|_| ());
        match settled {
            Ok(_) => self.ensure_ready(),
            // sender dropped without publishing: the init task died
            Err(_) => Err(TenkiError::initialization_failure("initialization aborted")),
        }
    }

    /// Convert Japanese text to a normalized romaji search term.
    pub fn convert(&self, text: &str) -> Result<String, TenkiError> {
        let analyzer = self.analyzer()?;
        let hiragana = analyzer
            .to_hiragana(text)
            .map_err(|e| TenkiError::conversion(e.to_string()))?;
        Ok(normalize(&hiragana.to_romaji()))
    }

    fn analyzer(&self) -> Result<Arc<dyn ReadingAnalyzer>, TenkiError> {
        match self.status() {
            ConverterStatus::Initializing => return Err(TenkiError::ServiceNotReady),
            ConverterStatus::Failed(reason) => {
                return Err(TenkiError::initialization_failure(reason));
            }
            ConverterStatus::Ready => {}
        }
        match &*self.state.borrow() {
            ConverterState::Ready(analyzer) => Ok(Arc::clone(analyzer)),
            _ => Err(TenkiError::ServiceNotReady),
        }
    }
}
