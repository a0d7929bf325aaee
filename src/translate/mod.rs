//! Post-processing of completed turns: language identification and
//! optional translation.

pub mod gemini;

pub use gemini::GeminiTextModel;

use anyhow::Result;
use chrono::Utc;
use tracing::warn;

use crate::languages::Language;
use crate::session::Transcription;

/// Source language recorded when identification fails
pub const UNKNOWN_LANGUAGE: &str = "不明";

/// Translated text recorded when translation fails
pub const TRANSLATION_FAILED: &str = "翻訳に失敗しました";

/// Text-completion collaborator behind the two fixed prompts.
#[async_trait::async_trait]
pub trait TextModel: Send + Sync {
    /// Identify the language of `text`, returning its display name in that
    /// language itself (e.g. "日本語").
    async fn identify_language(&self, text: &str) -> Result<String>;

    /// Translate `text` from `source_lang` to `target_lang` (display names).
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

/// Run one completed turn through identification and optional translation.
///
/// `text` must be non-empty and non-whitespace; the session enforces this
/// before flushing. Failures of either call are swallowed: identification
/// failure records [`UNKNOWN_LANGUAGE`] as the source, translation failure
/// records [`TRANSLATION_FAILED`] as the translated text. The timestamp is
/// taken at flush time, before any model call resolves.
pub async fn process_turn(model: &dyn TextModel, text: &str, target: Language) -> Transcription {
    let timestamp = Utc::now();

    let source_lang = match model.identify_language(text).await {
        Ok(name) => name,
        Err(e) => {
            warn!("Language identification failed: {:#}", e);
            UNKNOWN_LANGUAGE.to_string()
        }
    };

    let mut record = Transcription {
        original_text: text.to_string(),
        source_lang,
        translated_text: None,
        target_lang: None,
        timestamp,
    };

    if !target.is_none() && target.name != record.source_lang {
        match model.translate(text, &record.source_lang, target.name).await {
            Ok(translated) => {
                record.translated_text = Some(translated);
                record.target_lang = Some(target.name.to_string());
            }
            Err(e) => {
                warn!("Translation failed: {:#}", e);
                record.translated_text = Some(TRANSLATION_FAILED.to_string());
                record.target_lang = Some(target.name.to_string());
            }
        }
    }

    record
}
