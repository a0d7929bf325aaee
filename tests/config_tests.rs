// Tests for configuration loading and session-config mapping

use lingua_live::{Config, Language, SOURCE_LANGUAGE_LIMIT};

#[test]
fn test_defaults_without_config_file() {
    let cfg = Config::load("/nonexistent/lingua-live").unwrap();

    assert_eq!(cfg.audio.sample_rate, 16000);
    assert_eq!(cfg.audio.block_size, 4096);
    assert_eq!(cfg.session.source_languages, vec!["ja-JP".to_string()]);
    assert_eq!(cfg.session.target_language, "none");
    assert_eq!(cfg.api.text_model, "gemini-2.5-flash");
}

#[test]
fn test_session_config_maps_codes_to_languages() {
    let mut cfg = Config::load("/nonexistent/lingua-live").unwrap();
    cfg.session.source_languages = vec!["ja-JP".to_string(), "en-US".to_string()];
    cfg.session.target_language = "en-US".to_string();

    let session = cfg.session_config().unwrap();
    assert_eq!(session.source_languages.len(), 2);
    assert_eq!(session.source_languages[0].name, "日本語");
    assert_eq!(session.target_language.name, "English");
    assert_eq!(session.sample_rate, 16000);
    assert_eq!(session.block_size, 4096);
}

#[test]
fn test_unknown_language_code_is_rejected() {
    let mut cfg = Config::load("/nonexistent/lingua-live").unwrap();
    cfg.session.source_languages = vec!["xx-XX".to_string()];
    assert!(cfg.session_config().is_err());
}

#[test]
fn test_source_selection_is_capped() {
    let mut cfg = Config::load("/nonexistent/lingua-live").unwrap();
    cfg.session.source_languages = vec![
        "ja-JP".to_string(),
        "en-US".to_string(),
        "ko-KR".to_string(),
        "fr-FR".to_string(),
    ];

    let session = cfg.session_config().unwrap();
    assert_eq!(session.source_languages.len(), SOURCE_LANGUAGE_LIMIT);
}

#[test]
fn test_duplicate_source_selections_are_allowed() {
    let mut cfg = Config::load("/nonexistent/lingua-live").unwrap();
    cfg.session.source_languages = vec!["ja-JP".to_string(), "ja-JP".to_string()];

    let session = cfg.session_config().unwrap();
    assert_eq!(session.source_languages.len(), 2);
}

#[test]
fn test_system_instruction_embeds_active_source_names() {
    let mut cfg = Config::load("/nonexistent/lingua-live").unwrap();
    cfg.session.source_languages = vec!["ja-JP".to_string(), "none".to_string(), "en-US".to_string()];

    let session = cfg.session_config().unwrap();
    let instruction = session.system_instruction();
    assert!(instruction.contains("日本語, English"));
    assert!(!instruction.contains(Language::NONE.name));
}
