use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::app_config::WallabagConfig;
use crate::article::Article;
use crate::errors::SourceError;

use super::ArticleSource;

/// Wallabag client using the OAuth password grant
pub struct Wallabag {
    /// Service configuration
    config: WallabagConfig,
    /// HTTP client for making requests
    client: Client,
    /// Cached access token, None until the first authentication
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct EntriesResponse {
    #[serde(rename = "_embedded")]
    embedded: EmbeddedEntries,
}

#[derive(Debug, Deserialize)]
struct EmbeddedEntries {
    items: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: serde_json::Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, rename = "is_archived")]
    archived: Option<serde_json::Value>,
}

impl Wallabag {
    /// Create a client for the configured instance
    pub fn new(config: WallabagConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            config,
            client,
            token: None,
        }
    }

    /// Obtain an access token, reusing a cached one
    async fn authenticate(&mut self) -> Result<String, SourceError> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }

        let params = [
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/oauth/v2/token", self.base_url()))
            .form(&params)
            .send()
            .await
            .map_err(|e| SourceError::AuthenticationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::AuthenticationFailed(format!(
                "token endpoint answered {}",
                response.status().as_u16()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        info!("Authenticated with Wallabag");
        self.token = Some(body.access_token.clone());
        Ok(body.access_token)
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn entry_to_article(&self, entry: Entry) -> Article {
        Article::new(
            entry.id.to_string().trim_matches('"').to_string(),
            entry.title.unwrap_or_else(|| "Untitled".to_string()),
            entry.content.unwrap_or_default(),
        )
        .with_language(self.config.original_language.clone())
    }
}

#[async_trait]
impl ArticleSource for Wallabag {
    async fn get_articles(
        &mut self,
        _stream: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Article>, SourceError> {
        let token = self.authenticate().await?;

        let response = self
            .client
            .get(format!("{}/api/entries.json", self.base_url()))
            .bearer_auth(&token)
            .query(&[
                ("archive", "0".to_string()),
                ("perPage", limit.to_string()),
                ("order", "desc".to_string()),
                ("sort", "created".to_string()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::RequestFailed(format!(
                "entries endpoint answered {}",
                response.status().as_u16()
            )));
        }

        let body: EntriesResponse = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        debug!("Fetched {} Wallabag entries", body.embedded.items.len());
        Ok(body
            .embedded
            .items
            .into_iter()
            .map(|entry| self.entry_to_article(entry))
            .collect())
    }

    async fn get_article(&mut self, id: &str) -> Result<Article, SourceError> {
        let token = self.authenticate().await?;

        let response = self
            .client
            .get(format!("{}/api/entries/{}.json", self.base_url(), id))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::RequestFailed(format!(
                "entry endpoint answered {}",
                response.status().as_u16()
            )));
        }

        let entry: Entry = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        Ok(self.entry_to_article(entry))
    }

    async fn mark_read(&mut self, id: &str) -> Result<(), SourceError> {
        let token = self.authenticate().await?;

        let response = self
            .client
            .patch(format!("{}/api/entries/{}.json", self.base_url(), id))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "archive": 1 }))
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::RequestFailed(format!(
                "archive endpoint answered {}",
                response.status().as_u16()
            )));
        }

        // The service echoes the updated entry; anything else means the
        // update did not happen, and that is an error here
        let entry: Entry = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        let archived = match &entry.archived {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
            _ => false,
        };
        if !archived {
            return Err(SourceError::UnexpectedResponse {
                service: "Wallabag".to_string(),
                body: "entry not archived after update".to_string(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "Wallabag"
    }
}
