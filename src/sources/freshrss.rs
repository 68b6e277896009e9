use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::app_config::FreshRssConfig;
use crate::article::Article;
use crate::errors::SourceError;

use super::ArticleSource;

/// Google Reader read-state tag excluded when fetching unread items
const READ_STATE: &str = "user/-/state/com.google/read";

/// FreshRSS client speaking the Google Reader compatible API
pub struct FreshRss {
    /// Service configuration
    config: FreshRssConfig,
    /// HTTP client for making requests
    client: Client,
    /// Cached auth token, None until the first login
    token: Option<String>,
}

/// One category/label known to the service
#[derive(Debug, Clone)]
pub struct Category {
    /// Full stream id (user/-/label/<name>)
    pub id: String,
    /// Bare label name
    pub name: String,
}

/// One feed subscription known to the service
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Stream id (feed/<url-ish id>)
    pub id: String,
    /// Feed display title
    pub title: String,
    /// Labels the feed belongs to
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionList {
    #[serde(default)]
    subscriptions: Vec<SubscriptionEntry>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    categories: Vec<SubscriptionCategory>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionCategory {
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct StreamContents {
    #[serde(default)]
    items: Vec<StreamItem>,
}

#[derive(Debug, Deserialize)]
struct StreamItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<ItemContent>,
    #[serde(default)]
    content: Option<ItemContent>,
}

#[derive(Debug, Deserialize)]
struct ItemContent {
    #[serde(default)]
    content: String,
}

impl FreshRss {
    /// Create a client for the configured instance
    pub fn new(config: FreshRssConfig) -> Self {
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

    fn base_url(&self) -> String {
        format!("{}/api/greader.php", self.config.url.trim_end_matches('/'))
    }

    /// Log in via ClientLogin, reusing a cached token
    async fn authenticate(&mut self) -> Result<String, SourceError> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }

        let params = [
            ("Email", self.config.username.as_str()),
            ("Passwd", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/accounts/ClientLogin", self.base_url()))
            .form(&params)
            .send()
            .await
            .map_err(|e| SourceError::AuthenticationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::AuthenticationFailed(format!(
                "ClientLogin answered {}",
                response.status().as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        let token = body
            .lines()
            .find_map(|line| line.strip_prefix("Auth="))
            .map(|token| token.to_string())
            .ok_or_else(|| {
                SourceError::AuthenticationFailed("no Auth token in response".to_string())
            })?;

        info!("Authenticated with FreshRSS");
        self.token = Some(token.clone());
        Ok(token)
    }

    fn auth_header(token: &str) -> String {
        format!("GoogleLogin auth={}", token)
    }

    /// List all categories (labels) on the service
    pub async fn list_categories(&mut self) -> Result<Vec<Category>, SourceError> {
        let token = self.authenticate().await?;

        let response = self
            .client
            .get(format!("{}/reader/api/0/tag/list", self.base_url()))
            .header("Authorization", Self::auth_header(&token))
            .query(&[("output", "json")])
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let body: TagList = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        Ok(body
            .tags
            .into_iter()
            .filter_map(|tag| {
                tag.id.split_once("/label/").map(|(_, name)| Category {
                    name: name.to_string(),
                    id: tag.id.clone(),
                })
            })
            .collect())
    }

    /// List all feed subscriptions on the service
    pub async fn list_feeds(&mut self) -> Result<Vec<Subscription>, SourceError> {
        let token = self.authenticate().await?;

        let response = self
            .client
            .get(format!("{}/reader/api/0/subscription/list", self.base_url()))
            .header("Authorization", Self::auth_header(&token))
            .query(&[("output", "json")])
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let body: SubscriptionList = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        Ok(body
            .subscriptions
            .into_iter()
            .map(|sub| Subscription {
                id: sub.id,
                title: sub.title,
                categories: sub.categories.into_iter().map(|c| c.label).collect(),
            })
            .collect())
    }

    fn item_to_article(&self, item: StreamItem) -> Article {
        let content = item
            .summary
            .map(|c| c.content)
            .filter(|c| !c.is_empty())
            .or_else(|| item.content.map(|c| c.content))
            .unwrap_or_default();

        Article::new(
            item.id,
            item.title.unwrap_or_else(|| "Untitled".to_string()),
            content,
        )
        .with_language(self.config.original_language.clone())
    }
}

#[async_trait]
impl ArticleSource for FreshRss {
    async fn get_articles(
        &mut self,
        stream: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Article>, SourceError> {
        let token = self.authenticate().await?;

        let stream_path = match stream {
            None | Some("reading-list") => "reading-list".to_string(),
            Some(stream_id) => format!("contents/{}", stream_id),
        };

        let mut query = vec![("n", limit.to_string()), ("output", "json".to_string())];
        if self.config.unread_only {
            query.push(("xt", READ_STATE.to_string()));
        }

        let response = self
            .client
            .get(format!(
                "{}/reader/api/0/stream/{}",
                self.base_url(),
                stream_path
            ))
            .header("Authorization", Self::auth_header(&token))
            .query(&query)
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::RequestFailed(format!(
                "stream endpoint answered {}",
                response.status().as_u16()
            )));
        }

        let body: StreamContents = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        debug!("Fetched {} FreshRSS items", body.items.len());
        Ok(body
            .items
            .into_iter()
            .map(|item| self.item_to_article(item))
            .collect())
    }

    async fn get_article(&mut self, id: &str) -> Result<Article, SourceError> {
        // The Reader API has no single-item endpoint; fetch a window of
        // the reading list and pick the item out of it
        let articles = self.get_articles(None, 100).await?;
        articles
            .into_iter()
            .find(|article| article.id == id)
            .ok_or_else(|| SourceError::RequestFailed(format!("item {} not found", id)))
    }

    async fn mark_read(&mut self, id: &str) -> Result<(), SourceError> {
        let token = self.authenticate().await?;

        let params = [("i", id), ("a", READ_STATE)];
        let response = self
            .client
            .post(format!("{}/reader/api/0/edit-tag", self.base_url()))
            .header("Authorization", Self::auth_header(&token))
            .form(&params)
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::RequestFailed(format!(
                "edit-tag answered {}",
                response.status().as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        // Same policy as Wallabag: anything but the documented "OK" body
        // is an error the caller may log and ignore
        if body.trim() != "OK" {
            return Err(SourceError::UnexpectedResponse {
                service: "FreshRSS".to_string(),
                body: body.lines().next().unwrap_or("").to_string(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "FreshRSS"
    }
}
