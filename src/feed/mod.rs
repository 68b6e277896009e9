/*!
 * Episode catalog and podcast feed generation.
 *
 * Episodes are immutable once produced; the catalog only ever appends.
 * The feed document itself is rebuilt from scratch on every invocation,
 * either from the episodes of the current run or by re-scanning every
 * audio file already present in the output directory.
 */

use chrono::{DateTime, Utc};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::audio::{AudioProbe, Chapter};
use crate::errors::FeedError;
use crate::file_utils::FileManager;

pub mod builder;

pub use builder::FeedBuilder;

/// One published audio artifact plus its feed metadata
#[derive(Debug, Clone)]
pub struct Episode {
    /// Episode title
    pub title: String,

    /// Path of the published audio file
    pub path: PathBuf,

    /// Enclosure size in bytes
    pub size_bytes: u64,

    /// Total duration in whole seconds
    pub duration_secs: u64,

    /// Publish timestamp (file modification time)
    pub published: DateTime<Utc>,

    /// Optional category label
    pub category: Option<String>,

    /// Ordered chapter list, empty for narration-only episodes
    pub chapters: Vec<Chapter>,

    /// Feed description, falls back to the title when empty
    pub description: String,
}

/// `[Category] Title` filename convention used when rebuilding from disk
static CATEGORY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\s*(.*)$").expect("static regex"));

impl Episode {
    /// Build an episode record for a freshly produced file
    pub fn new(
        title: impl Into<String>,
        path: PathBuf,
        duration_secs: u64,
        category: Option<String>,
        chapters: Vec<Chapter>,
        description: impl Into<String>,
    ) -> Self {
        let size_bytes = FileManager::file_size(&path);
        let published = FileManager::modified_time(&path);

        Self {
            title: title.into(),
            path,
            size_bytes,
            duration_secs,
            published,
            category,
            chapters,
            description: description.into(),
        }
    }

    /// Derive an episode from a bare audio file on disk
    ///
    /// Title comes from the filename minus its extension; a `[Category]`
    /// prefix, when present, becomes the category label.
    pub fn infer_from_file(path: &Path, duration_secs: u64) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let (category, title) = match CATEGORY_PREFIX.captures(&stem) {
            Some(caps) => (Some(caps[1].to_string()), caps[2].to_string()),
            None => (None, stem.clone()),
        };
        let title = if title.is_empty() { stem } else { title };

        Self::new(title.clone(), path.to_path_buf(), duration_secs, category, Vec::new(), title)
    }

    /// Description with the documented title fallback applied
    pub fn description_or_title(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.title
        } else {
            &self.description
        }
    }
}

/// Append-only set of episodes produced or discovered during a run
#[derive(Debug, Default)]
pub struct EpisodeCatalog {
    episodes: Vec<Episode>,
}

impl EpisodeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly produced episode
    pub fn add(&mut self, episode: Episode) {
        self.episodes.push(episode);
    }

    /// Whether the catalog holds any episodes
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Number of cataloged episodes
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    /// All episodes in insertion order
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Rebuild the catalog by scanning every audio file in a directory
    pub async fn rebuild_from_dir(dir: &Path, probe: &AudioProbe) -> Result<Self, FeedError> {
        let files = FileManager::find_files(dir, "mp3")
            .map_err(|e| FeedError::ScanFailed(e.to_string()))?;

        debug!("Rebuilding catalog from {} files in {:?}", files.len(), dir);

        let mut catalog = Self::new();
        for file in files {
            let duration_ms = probe.duration_ms_or_estimate(&file).await;
            catalog.add(Episode::infer_from_file(&file, duration_ms / 1000));
        }

        Ok(catalog)
    }
}
