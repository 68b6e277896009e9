/*!
 * Narration engine backed by the Google Translate TTS endpoint.
 *
 * The endpoint accepts short text fragments only, so the input is split at
 * natural boundaries and the returned MP3 payloads are appended into one
 * file; MP3 frames concatenate cleanly without re-encoding.
 */

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::errors::SynthesisError;
use crate::translation::chunk_text_with_budget;

use super::NarrationEngine;

/// Maximum characters accepted per TTS request
const TTS_FRAGMENT_BUDGET: usize = 200;

/// Endpoint serving synthesized speech
const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Engine calling the Google Translate TTS endpoint
///
/// The `voice` argument of the uniform engine signature carries the
/// language short code here; this service has no per-speaker voices.
#[derive(Debug)]
pub struct GoogleTts {
    /// HTTP client for making requests
    client: Client,
}

impl GoogleTts {
    /// Create an engine with the given per-request timeout
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client }
    }

    async fn fetch_fragment(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesisError> {
        let response = self
            .client
            .get(TTS_ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::RequestFailed(format!(
                "TTS endpoint answered {}",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl NarrationEngine for GoogleTts {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let fragments = chunk_text_with_budget(text, TTS_FRAGMENT_BUDGET);
        debug!("Fetching {} TTS fragments for language {}", fragments.len(), voice);

        // Fetch everything before touching the filesystem; a failed
        // fragment must not leave a partial narration behind
        let mut audio = Vec::new();
        for fragment in &fragments {
            let piece = fragment.text.trim();
            if piece.is_empty() {
                continue;
            }
            audio.extend(self.fetch_fragment(piece, voice).await?);
        }

        let mut file = tokio::fs::File::create(output)
            .await
            .map_err(|e| SynthesisError::EngineFailed(e.to_string()))?;
        file.write_all(&audio)
            .await
            .map_err(|e| SynthesisError::EngineFailed(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| SynthesisError::EngineFailed(e.to_string()))?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "gtts"
    }
}
