/*!
 * Translation service built on the chunker and a pluggable back end.
 *
 * The service owns the whole degrade-gracefully contract: when the source
 * language already matches the target no request is made, and any failed
 * network call makes the operation return the original text unmodified.
 * Translation is never fatal to an episode.
 */

use anyhow::Result;
use log::{debug, info, warn};

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::language_utils;
use crate::providers::TranslationBackend;
use crate::providers::deepl::DeepL;
use crate::providers::libretranslate::LibreTranslate;

use super::chunker::{self, CHUNK_CHAR_BUDGET, MAX_TRANSLATION_CHARS};

/// Article translator with a back end selected once at construction
pub struct Translator {
    /// Back-end implementation
    backend: Box<dyn TranslationBackend>,
}

impl Translator {
    /// Create a translator from configuration
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let backend: Box<dyn TranslationBackend> = match config.provider {
            TranslationProvider::LibreTranslate => Box::new(LibreTranslate::new(
                config.endpoint.clone(),
                if config.api_key.is_empty() {
                    None
                } else {
                    Some(config.api_key.clone())
                },
                config.timeout_secs,
            )),
            TranslationProvider::DeepL => Box::new(DeepL::new(
                config.endpoint.clone(),
                config.api_key.clone(),
                config.timeout_secs,
            )),
        };

        Ok(Self { backend })
    }

    /// Create a translator around an explicit back end (used by tests)
    pub fn with_backend(backend: Box<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    /// Translate article text into the target language
    ///
    /// `declared_source` is the language the source service claims for the
    /// article; when absent the first part of the text is sampled for
    /// detection. Returns the input unmodified when no translation is
    /// needed or when any translation call fails.
    pub async fn translate(
        &self,
        text: &str,
        declared_source: Option<&str>,
        target: &str,
    ) -> String {
        let source = match declared_source {
            Some(code) => Some(code.to_string()),
            None => language_utils::detect_language(text),
        };

        if let Some(source_code) = &source {
            if language_utils::language_codes_match(source_code, target) {
                debug!(
                    "Source language '{}' matches target '{}', skipping translation",
                    source_code, target
                );
                return text.to_string();
            }
        }

        let bounded = chunker::truncate_to_budget(text);
        if bounded.len() < text.len() {
            info!(
                "Text exceeds the translation budget, truncating to {} characters",
                MAX_TRANSLATION_CHARS
            );
        }

        match self.translate_bounded(bounded, source.as_deref(), target).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(
                    "Translation via {} failed, narrating original text: {}",
                    self.backend.name(),
                    e
                );
                text.to_string()
            }
        }
    }

    /// Translate text already within the total budget, chunk by chunk
    async fn translate_bounded(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<String, crate::errors::ProviderError> {
        let char_count = text.chars().count();
        if char_count <= CHUNK_CHAR_BUDGET {
            return self.backend.translate(text, source, target).await;
        }

        let chunks = chunker::chunk_text(text);
        debug!(
            "Translating {} characters in {} chunks",
            char_count,
            chunks.len()
        );

        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let translated = self
                .backend
                .translate(chunk.text.trim(), source, target)
                .await?;
            parts.push(translated);
        }

        Ok(parts.join(" "))
    }
}
