/*!
 * Back-end implementations for machine translation services.
 *
 * This module contains client implementations for the supported
 * translation back ends:
 * - LibreTranslate: self-hosted translation server
 * - DeepL: hosted translation API
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation back ends
///
/// This trait defines the interface every back end must follow, allowing
/// them to be used interchangeably by the translation service. A back end
/// is selected once when the pipeline is constructed; callers never
/// dispatch on the provider name per call.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate one chunk of text
    ///
    /// # Arguments
    /// * `text` - The text to translate, already within the per-request budget
    /// * `source` - Source language short code, or None to let the service detect
    /// * `target` - Target language short code
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    ///
    /// A single attempt is made; the service never retries. The caller owns
    /// the documented fallback (returning the original text).
    async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<String, ProviderError>;

    /// Back-end display name for logs
    fn name(&self) -> &'static str;
}

pub mod libretranslate;
pub mod deepl;
