//! Gemini generateContent client for the identification and translation
//! prompts.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::debug;

use super::TextModel;

/// Model used for the text-completion prompts
pub const TEXT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ContentPart>>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

/// Calls the Gemini generateContent endpoint with the fixed prompt
/// templates.
pub struct GeminiTextModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiTextModel {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("generateContent request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("generateContent returned {}: {}", status, detail));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse generateContent response")?;

        let text = parsed
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .and_then(|p| p.text)
            .ok_or_else(|| anyhow!("generateContent response contained no text"))?;

        Ok(text.trim().to_string())
    }
}

#[async_trait::async_trait]
impl TextModel for GeminiTextModel {
    async fn identify_language(&self, text: &str) -> Result<String> {
        debug!("Identifying language ({} chars)", text.chars().count());
        let prompt = format!(
            "Identify the language of the following text. Respond with only the name of the language in that language itself (e.g., \"日本語\" for Japanese, \"English\" for English).\n\nText: \"{}\"",
            text
        );
        self.generate(prompt).await
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        debug!("Translating {} -> {}", source_lang, target_lang);
        let prompt = format!(
            "Translate the following text from {} to {}:\n\n{}",
            source_lang, target_lang, text
        );
        self.generate(prompt).await
    }
}
