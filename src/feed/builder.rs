/*!
 * Podcast feed serialization.
 *
 * Produces an RSS 2.0 document with the iTunes podcast extension. Items
 * are ordered by descending publish timestamp at serialization time, and
 * the document write is all-or-nothing: the feed is serialized into a
 * temporary file in the output directory and renamed over the target.
 */

use chrono::Utc;
use log::info;
use rss::extension::itunes::{ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder};
use rss::{
    Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder,
};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use url::Url;

use crate::app_config::FeedConfig;
use crate::errors::FeedError;

use super::{Episode, EpisodeCatalog};

/// MIME type of every enclosure this feed publishes
const ENCLOSURE_MIME: &str = "audio/mpeg";

/// Feed document builder bound to one channel configuration
#[derive(Debug, Clone)]
pub struct FeedBuilder {
    /// Channel-level configuration
    config: FeedConfig,

    /// Directory the feed document is written into
    output_dir: PathBuf,
}

/// Format whole seconds as the HH:MM:SS form players expect
fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

impl FeedBuilder {
    /// Create a builder for the given channel and output directory
    pub fn new(config: FeedConfig, output_dir: PathBuf) -> Self {
        Self { config, output_dir }
    }

    /// Enclosure URL for an episode file
    fn enclosure_url(&self, episode: &Episode) -> Result<String, FeedError> {
        let filename = episode
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| FeedError::SerializeFailed("episode file has no name".to_string()))?;

        let base = Url::parse(&format!("{}/", self.config.base_url.trim_end_matches('/')))
            .map_err(|e| FeedError::SerializeFailed(format!("base URL: {}", e)))?;
        let url = base
            .join(&filename)
            .map_err(|e| FeedError::SerializeFailed(format!("enclosure URL: {}", e)))?;

        Ok(url.to_string())
    }

    fn build_item(&self, episode: &Episode) -> Result<Item, FeedError> {
        let url = self.enclosure_url(episode)?;

        let enclosure = EnclosureBuilder::default()
            .url(url.clone())
            .length(episode.size_bytes.to_string())
            .mime_type(ENCLOSURE_MIME.to_string())
            .build();

        // The enclosure URL doubles as the stable globally-unique id
        let guid = GuidBuilder::default().value(url).permalink(true).build();

        let itunes = ITunesItemExtensionBuilder::default()
            .duration(Some(format_duration(episode.duration_secs)))
            .build();

        let mut item = ItemBuilder::default()
            .title(Some(episode.title.clone()))
            .description(Some(episode.description_or_title().to_string()))
            .pub_date(Some(episode.published.to_rfc2822()))
            .enclosure(Some(enclosure))
            .guid(Some(guid))
            .itunes_ext(Some(itunes))
            .build();

        if let Some(category) = &episode.category {
            item.set_categories(vec![rss::Category {
                name: category.clone(),
                domain: None,
            }]);
        }

        Ok(item)
    }

    /// Build the channel document from a set of episodes
    pub fn build_channel(&self, episodes: &[Episode]) -> Result<Channel, FeedError> {
        // Descending publish timestamp, decided here and nowhere else
        let mut ordered: Vec<&Episode> = episodes.iter().collect();
        ordered.sort_by(|a, b| b.published.cmp(&a.published));

        let mut items = Vec::with_capacity(ordered.len());
        for episode in ordered {
            items.push(self.build_item(episode)?);
        }

        let mut builder = ChannelBuilder::default();
        builder
            .title(self.config.title.clone())
            .description(self.config.description.clone())
            .link(self.config.base_url.clone())
            .language(Some(self.config.language.clone()))
            .last_build_date(Some(Utc::now().to_rfc2822()))
            .items(items);

        let mut itunes = ITunesChannelExtensionBuilder::default();
        let mut has_itunes = false;
        if let Some(author) = &self.config.author {
            itunes.author(Some(author.clone()));
            has_itunes = true;
        }
        if let Some(image_url) = &self.config.image_url {
            itunes.image(Some(image_url.clone()));
            has_itunes = true;

            builder.image(Some(
                ImageBuilder::default()
                    .url(image_url.clone())
                    .title(self.config.title.clone())
                    .link(self.config.base_url.clone())
                    .build(),
            ));
        }
        if has_itunes {
            builder.itunes_ext(Some(itunes.build()));
        }

        Ok(builder.build())
    }

    /// Serialize and atomically write the feed document
    ///
    /// Either the complete valid document lands at the target path or no
    /// file is altered.
    pub fn write(&self, catalog: &EpisodeCatalog) -> Result<PathBuf, FeedError> {
        let channel = self.build_channel(catalog.episodes())?;
        let target = self.output_dir.join(&self.config.filename);

        let temp = NamedTempFile::new_in(&self.output_dir)
            .map_err(|e| FeedError::WriteFailed(e.to_string()))?;

        channel
            .pretty_write_to(temp.as_file(), b' ', 2)
            .map_err(|e| FeedError::SerializeFailed(e.to_string()))?;

        temp.persist(&target)
            .map_err(|e| FeedError::WriteFailed(e.to_string()))?;

        info!("Feed written: {:?} ({} episodes)", target, catalog.len());
        Ok(target)
    }
}
