/*!
 * Article source clients.
 *
 * This module contains client implementations for the supported
 * read-it-later/RSS services:
 * - Wallabag: OAuth password grant + entries API
 * - FreshRSS: Google Reader compatible API
 *
 * Authentication and session handling live entirely inside each client;
 * the pipeline treats auth failures as "no articles available". Both
 * clients apply the same read-status policy: an unexpected response body
 * from `mark_read` is an error the caller logs and ignores.
 */

use async_trait::async_trait;

use crate::article::Article;
use crate::errors::SourceError;

pub mod freshrss;
pub mod wallabag;

pub use freshrss::FreshRss;
pub use wallabag::Wallabag;

/// Common trait for article providers
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch up to `limit` articles from a stream or category
    ///
    /// `stream` is provider-specific: a Google Reader stream id for
    /// FreshRSS, ignored by Wallabag. None means the provider default.
    async fn get_articles(
        &mut self,
        stream: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Article>, SourceError>;

    /// Fetch one article by its provider-side id
    async fn get_article(&mut self, id: &str) -> Result<Article, SourceError>;

    /// Mark one article as read on the provider
    async fn mark_read(&mut self, id: &str) -> Result<(), SourceError>;

    /// Provider display name for logs
    fn name(&self) -> &'static str;
}
