use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed (and possibly translated) utterance.
///
/// Immutable once created; the pipeline produces exactly one per flushed
/// turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    /// Accumulated turn text as transcribed
    pub original_text: String,

    /// Identified source language display name (not a locale code)
    pub source_lang: String,

    /// Translated text, present when a translation was attempted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,

    /// Target language display name, present alongside `translated_text`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_lang: Option<String>,

    /// When the turn was flushed (not when the model calls resolved)
    pub timestamp: DateTime<Utc>,
}

/// In-memory, insertion-ordered list of completed utterances, newest
/// first. Lives only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct History {
    records: Vec<Transcription>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a completed record; it becomes the newest entry.
    pub fn prepend(&mut self, record: Transcription) {
        self.records.insert(0, record);
    }

    pub fn records(&self) -> &[Transcription] {
        &self.records
    }

    pub fn latest(&self) -> Option<&Transcription> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
