use tracing::warn;

use crate::languages::{Language, SOURCE_LANGUAGE_LIMIT};

/// Configuration for a live transcription session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Sample rate the service expects (16kHz)
    pub sample_rate: u32,

    /// Samples per audio block handed to the converter
    pub block_size: usize,

    /// Language hints for the transcription service, capped at
    /// [`SOURCE_LANGUAGE_LIMIT`]. Duplicates are allowed; sentinel entries
    /// mark unused slots.
    pub source_languages: Vec<Language>,

    /// Translation target; the sentinel disables translation.
    pub target_language: Language,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("live-{}", uuid::Uuid::new_v4()),
            sample_rate: 16000,
            block_size: 4096,
            source_languages: vec![crate::languages::SUPPORTED_LANGUAGES[0]],
            target_language: Language::NONE,
        }
    }
}

impl SessionConfig {
    /// Replace the source-language selection, enforcing the cap.
    pub fn with_source_languages(mut self, mut languages: Vec<Language>) -> Self {
        if languages.len() > SOURCE_LANGUAGE_LIMIT {
            warn!(
                "Ignoring source languages beyond the limit of {}",
                SOURCE_LANGUAGE_LIMIT
            );
            languages.truncate(SOURCE_LANGUAGE_LIMIT);
        }
        self.source_languages = languages;
        self
    }

    pub fn with_target_language(mut self, language: Language) -> Self {
        self.target_language = language;
        self
    }

    /// Display names of the active (non-sentinel) source languages.
    pub fn active_source_names(&self) -> Vec<&'static str> {
        self.source_languages
            .iter()
            .filter(|l| !l.is_none())
            .map(|l| l.name)
            .collect()
    }

    /// System instruction sent during channel setup.
    pub fn system_instruction(&self) -> String {
        format!(
            "You are a real-time transcription service. Your primary function is to accurately transcribe the user's speech. The user might be speaking in one of the following languages: {}.",
            self.active_source_names().join(", ")
        )
    }
}
