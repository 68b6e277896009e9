/*!
 * Tests for app configuration
 */

use std::str::FromStr;

use readcast::app_config::{
    ArticleOptions, Config, SelectedArticle, Selection, SynthesisEngine, TranslationProvider,
};

#[test]
fn test_default_config_shouldValidate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(config.skip_existing);
    assert!(!config.include_clips);
    assert_eq!(config.target_language, "es");
    assert_eq!(config.synthesis.engine, SynthesisEngine::Edge);
    assert_eq!(config.translation.provider, TranslationProvider::LibreTranslate);
}

#[test]
fn test_validate_withDeepLAndNoKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::DeepL;
    assert!(config.validate().is_err());

    config.translation.api_key = "key".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withBadLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "not-a-language".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadBaseUrl_shouldFail() {
    let mut config = Config::default();
    config.feed.base_url = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_synthesis_engine_fromStr_shouldParseKnownEngines() {
    assert_eq!(SynthesisEngine::from_str("edge").unwrap(), SynthesisEngine::Edge);
    assert_eq!(SynthesisEngine::from_str("GTTS").unwrap(), SynthesisEngine::Gtts);
    assert!(SynthesisEngine::from_str("espeak").is_err());
    assert_eq!(SynthesisEngine::Gtts.to_string(), "gtts");
}

#[test]
fn test_translation_provider_fromStr_shouldParseKnownProviders() {
    assert_eq!(
        TranslationProvider::from_str("libretranslate").unwrap(),
        TranslationProvider::LibreTranslate
    );
    assert_eq!(
        TranslationProvider::from_str("DeepL").unwrap(),
        TranslationProvider::DeepL
    );
    assert!(TranslationProvider::from_str("google").is_err());
}

#[test]
fn test_config_fromEmptyJson_shouldApplyDefaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.output_dir.to_string_lossy(), "audio_articles");
    assert_eq!(config.feed.filename, "podcast.xml");
    assert_eq!(config.tools.ffmpeg.to_string_lossy(), "ffmpeg");
}

#[test]
fn test_config_serdeRoundtrip_shouldPreserveFields() {
    let mut config = Config::default();
    config.default_voice = "en-US-AriaNeural".to_string();
    config.include_clips = true;

    let json = serde_json::to_string(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.default_voice, "en-US-AriaNeural");
    assert!(parsed.include_clips);
}

#[test]
fn test_selection_parse_shouldReadPerArticleOverrides() {
    let json = r#"{
        "options": { "engine": "gtts", "include_clips": true },
        "wallabag": [
            { "id": "17", "voice": "es-MX-JorgeNeural" },
            { "id": "18", "language": "en", "include_clips": false }
        ]
    }"#;

    let selection: Selection = serde_json::from_str(json).unwrap();
    assert_eq!(selection.options.engine, Some(SynthesisEngine::Gtts));
    assert_eq!(selection.wallabag.len(), 2);
    assert!(selection.freshrss.is_empty());
    assert_eq!(selection.wallabag[0].voice.as_deref(), Some("es-MX-JorgeNeural"));
}

#[test]
fn test_article_options_resolve_shouldPreferArticleOverSelectionOverConfig() {
    let config = Config::default();

    let json = r#"{
        "options": { "voice": "selection-voice", "include_clips": true },
        "wallabag": [ { "id": "1", "voice": "article-voice" } ]
    }"#;
    let selection: Selection = serde_json::from_str(json).unwrap();
    let picked: &SelectedArticle = &selection.wallabag[0];

    let options = ArticleOptions::resolve(&config, Some(&selection.options), Some(picked));
    assert_eq!(options.voice, "article-voice");
    assert!(options.include_clips);
    assert_eq!(options.language, config.target_language);
    assert!(options.engine.is_none());

    // Without the article override the selection-level voice wins
    let options = ArticleOptions::resolve(&config, Some(&selection.options), None);
    assert_eq!(options.voice, "selection-voice");

    // Without any override the config default wins
    let options = ArticleOptions::resolve(&config, None, None);
    assert_eq!(options.voice, config.default_voice);
    assert!(!options.include_clips);
}
