use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::TranslationBackend;

/// DeepL API client
///
/// Works against both the free (`api-free.deepl.com`) and pro
/// (`api.deepl.com`) endpoints; the endpoint comes from configuration.
#[derive(Debug)]
pub struct DeepL {
    /// Base URL of the DeepL API
    base_url: String,
    /// API authentication key
    api_key: String,
    /// HTTP client for making requests
    client: Client,
}

/// Request payload for the /v2/translate endpoint
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    /// Texts to translate; always a single element here
    text: Vec<&'a str>,
    /// Target language code, upper-cased per the API contract
    target_lang: String,
    /// Source language code, omitted for server-side detection
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

/// Response payload from the /v2/translate endpoint
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

impl DeepL {
    /// Create a new client with the given endpoint and key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl TranslationBackend for DeepL {
    async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::AuthenticationError(
                "DeepL API key is missing".to_string(),
            ));
        }

        let request = TranslateRequest {
            text: vec![text],
            target_lang: target.to_uppercase(),
            source_lang: source.map(|s| s.to_uppercase()),
        };

        let response = self
            .client
            .post(format!("{}/v2/translate", self.base_url))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthenticationError(
                "DeepL rejected the API key".to_string(),
            ));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "no error body".to_string());
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| ProviderError::ParseError("empty translations array".to_string()))
    }

    fn name(&self) -> &'static str {
        "DeepL"
    }
}
