use serde::Serialize;

/// Maximum number of source languages that can be selected for one session.
pub const SOURCE_LANGUAGE_LIMIT: usize = 3;

/// A language the transcription service can be hinted towards.
///
/// `name` is the display name in the language itself; it is what the
/// identification prompt returns and what translation prompts consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    /// Locale identifier, e.g. "ja-JP"
    pub code: &'static str,
    /// Display name, e.g. "日本語"
    pub name: &'static str,
}

impl Language {
    /// Placeholder for "no language selected" (no translation target,
    /// unused source slot). Distinct from every catalog entry.
    pub const NONE: Language = Language {
        code: "none",
        name: "N/A",
    };

    pub fn is_none(&self) -> bool {
        self.code == Self::NONE.code
    }

    /// Label shown when this language is the translation target. The
    /// sentinel reads "翻訳しない" there, not the unused-slot "N/A".
    pub fn target_label(&self) -> &'static str {
        if self.is_none() {
            "翻訳しない"
        } else {
            self.name
        }
    }
}

/// Fixed catalog of selectable languages.
///
/// Codes and names are unique within the catalog.
pub const SUPPORTED_LANGUAGES: [Language; 12] = [
    Language { code: "ja-JP", name: "日本語" },
    Language { code: "en-US", name: "English" },
    Language { code: "zh-CN", name: "中文 (簡体)" },
    Language { code: "ko-KR", name: "한국어" },
    Language { code: "es-ES", name: "Español" },
    Language { code: "fr-FR", name: "Français" },
    Language { code: "de-DE", name: "Deutsch" },
    Language { code: "it-IT", name: "Italiano" },
    Language { code: "pt-BR", name: "Português" },
    Language { code: "ru-RU", name: "Русский" },
    Language { code: "hi-IN", name: "हिन्दी" },
    Language { code: "ar-SA", name: "العربية" },
];

/// Look up a catalog language by its locale code. "none" resolves to the
/// sentinel.
pub fn find_by_code(code: &str) -> Option<Language> {
    if code == Language::NONE.code {
        return Some(Language::NONE);
    }
    SUPPORTED_LANGUAGES.iter().copied().find(|l| l.code == code)
}
