use anyhow::{Context, Result};
use serde::Deserialize;

use crate::languages::{find_by_code, Language};
use crate::session::SessionConfig;

/// Environment variable holding the Gemini API key. Kept out of the
/// config file so the credential never lands on disk.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub audio: AudioSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Model for the live audio channel
    pub live_model: String,
    /// Model for the identification/translation prompts
    pub text_model: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub block_size: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Locale codes of the source-language hints (up to 3)
    pub source_languages: Vec<String>,
    /// Locale code of the translation target, or "none"
    pub target_language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            audio: AudioSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            live_model: crate::live::LIVE_MODEL.to_string(),
            text_model: crate::translate::gemini::TEXT_MODEL.to_string(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            block_size: 4096,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            source_languages: vec!["ja-JP".to_string()],
            target_language: Language::NONE.code.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus `LINGUA_LIVE_*`
    /// environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("LINGUA_LIVE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Build a session configuration from the selected language codes.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut sources = Vec::new();
        for code in &self.session.source_languages {
            let language = find_by_code(code)
                .with_context(|| format!("Unknown source language code: {}", code))?;
            sources.push(language);
        }

        let target = find_by_code(&self.session.target_language)
            .with_context(|| format!("Unknown target language code: {}", self.session.target_language))?;

        let mut session = SessionConfig::default()
            .with_source_languages(sources)
            .with_target_language(target);
        session.sample_rate = self.audio.sample_rate;
        session.block_size = self.audio.block_size;

        Ok(session)
    }
}

/// Read the API credential from the environment.
pub fn api_key() -> Result<String> {
    std::env::var(API_KEY_ENV).with_context(|| format!("{} is not set", API_KEY_ENV))
}
