use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory where episode audio and the feed document are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Whether an existing episode file satisfies a repeat request
    #[serde(default = "default_true")]
    pub skip_existing: bool,

    /// Whether embedded clips are folded into episodes by default
    #[serde(default)]
    pub include_clips: bool,

    /// Default narration voice
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Target language code (ISO) for narration
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Narration synthesis config
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Wallabag source config, absent when the source is unused
    #[serde(default)]
    pub wallabag: Option<WallabagConfig>,

    /// FreshRSS source config, absent when the source is unused
    #[serde(default)]
    pub freshrss: Option<FreshRssConfig>,

    /// Podcast feed config
    #[serde(default)]
    pub feed: FeedConfig,

    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            skip_existing: true,
            include_clips: false,
            default_voice: default_voice(),
            target_language: default_target_language(),
            synthesis: SynthesisConfig::default(),
            translation: TranslationConfig::default(),
            wallabag: None,
            freshrss: None,
            feed: FeedConfig::default(),
            tools: ToolsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration after loading and overriding
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("output_dir must not be empty"));
        }

        crate::language_utils::normalize_to_part1_or_part2t(&self.target_language)
            .map_err(|_| anyhow!("Invalid target language code: {}", self.target_language))?;

        if self.translation.provider == TranslationProvider::DeepL
            && self.translation.api_key.is_empty()
        {
            return Err(anyhow!("DeepL requires an API key"));
        }

        url::Url::parse(&self.feed.base_url)
            .map_err(|_| anyhow!("Invalid feed base URL: {}", self.feed.base_url))?;

        Ok(())
    }
}

/// Narration engine type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisEngine {
    // @engine: edge-tts subprocess (Microsoft neural voices)
    #[default]
    Edge,
    // @engine: Google Translate TTS endpoint
    Gtts,
}

impl SynthesisEngine {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Edge => "Edge TTS",
            Self::Gtts => "Google TTS",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Edge => "edge".to_string(),
            Self::Gtts => "gtts".to_string(),
        }
    }
}

impl std::fmt::Display for SynthesisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for SynthesisEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "edge" => Ok(Self::Edge),
            "gtts" => Ok(Self::Gtts),
            _ => Err(anyhow!("Invalid synthesis engine: {}", s)),
        }
    }
}

/// Narration synthesis configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Engine to use
    #[serde(default)]
    pub engine: SynthesisEngine,

    /// Request timeout in seconds (HTTP-backed engines)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            engine: SynthesisEngine::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: LibreTranslate (self-hosted server)
    #[default]
    LibreTranslate,
    // @provider: DeepL API
    DeepL,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::LibreTranslate => "LibreTranslate",
            Self::DeepL => "DeepL",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::LibreTranslate => "libretranslate".to_string(),
            Self::DeepL => "deepl".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "libretranslate" => Ok(Self::LibreTranslate),
            "deepl" => Ok(Self::DeepL),
            _ => Err(anyhow!("Invalid translation provider: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Service URL
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,

    /// API key, may be empty for open LibreTranslate instances
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            endpoint: default_translation_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Wallabag service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WallabagConfig {
    /// Instance base URL
    pub url: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Account username
    pub username: String,

    /// Account password
    pub password: String,

    /// Maximum articles fetched per run
    #[serde(default = "default_article_limit")]
    pub limit: usize,

    /// Language the instance's articles are written in, if known
    #[serde(default, rename = "original-language")]
    pub original_language: Option<String>,
}

/// FreshRSS service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FreshRssConfig {
    /// Instance base URL
    pub url: String,

    /// Account username
    pub username: String,

    /// Account password (API password)
    pub password: String,

    /// Maximum articles fetched per stream
    #[serde(default = "default_article_limit")]
    pub limit: usize,

    /// Whether to fetch unread articles only
    #[serde(default = "default_true")]
    pub unread_only: bool,

    /// Specific categories to process; empty means the whole reading list
    #[serde(default)]
    pub categories: Vec<CategorySelection>,

    /// Specific feeds to process
    #[serde(default)]
    pub feeds: Vec<FeedSelection>,

    /// Language the instance's articles are written in, if known
    #[serde(default, rename = "original-language")]
    pub original_language: Option<String>,
}

/// One category picked for processing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategorySelection {
    /// Label name as known to FreshRSS
    pub name: String,

    /// Per-category article limit override
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One feed picked for processing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedSelection {
    /// Stream id (feed/...)
    pub id: String,

    /// Display name override
    #[serde(default)]
    pub name: Option<String>,

    /// Per-feed article limit override
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Podcast feed channel configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedConfig {
    /// Base URL episodes are served from
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Channel title
    #[serde(default = "default_feed_title")]
    pub title: String,

    /// Channel description
    #[serde(default = "default_feed_description")]
    pub description: String,

    /// Channel language code
    #[serde(default = "default_target_language")]
    pub language: String,

    /// Channel author shown by podcast players
    #[serde(default)]
    pub author: Option<String>,

    /// Channel artwork URL
    #[serde(default)]
    pub image_url: Option<String>,

    /// Feed document filename inside the output directory
    #[serde(default = "default_feed_filename")]
    pub filename: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            title: default_feed_title(),
            description: default_feed_description(),
            language: default_target_language(),
            author: None,
            image_url: None,
            filename: default_feed_filename(),
        }
    }
}

/// Locations of the external tools the pipeline shells out to
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolsConfig {
    /// Concatenation tool
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Duration probe
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,

    /// Clip audio extractor
    #[serde(default = "default_ytdlp")]
    pub ytdlp: PathBuf,

    /// Edge TTS front end
    #[serde(default = "default_edge_tts")]
    pub edge_tts: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            ytdlp: default_ytdlp(),
            edge_tts: default_edge_tts(),
        }
    }
}

/// Per-article overrides loaded from a selection file
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Selection {
    /// Global option overrides for this run
    #[serde(default)]
    pub options: SelectionOptions,

    /// Selected Wallabag articles
    #[serde(default)]
    pub wallabag: Vec<SelectedArticle>,

    /// Selected FreshRSS articles
    #[serde(default)]
    pub freshrss: Vec<SelectedArticle>,
}

/// Run-wide option overrides in a selection file
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SelectionOptions {
    /// Engine override
    #[serde(default)]
    pub engine: Option<SynthesisEngine>,

    /// Voice override
    #[serde(default)]
    pub voice: Option<String>,

    /// Target language override
    #[serde(default)]
    pub language: Option<String>,

    /// Clip inclusion override
    #[serde(default)]
    pub include_clips: Option<bool>,

    /// Skip-existing override
    #[serde(default)]
    pub skip_existing: Option<bool>,
}

/// One article picked for processing, with optional overrides
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SelectedArticle {
    /// Provider-side article id
    pub id: String,

    /// Title hint shown before the article is fetched
    #[serde(default)]
    pub title: Option<String>,

    /// Voice override for this article
    #[serde(default)]
    pub voice: Option<String>,

    /// Target language override for this article
    #[serde(default)]
    pub language: Option<String>,

    /// Engine override for this article
    #[serde(default)]
    pub engine: Option<SynthesisEngine>,

    /// Clip inclusion override for this article
    #[serde(default)]
    pub include_clips: Option<bool>,
}

/// Options one article is processed with, after all overrides resolve
#[derive(Debug, Clone)]
pub struct ArticleOptions {
    /// Narration voice
    pub voice: String,

    /// Target language code
    pub language: String,

    /// Whether embedded clips are folded in
    pub include_clips: bool,

    /// Engine override, None for the configured default
    pub engine: Option<SynthesisEngine>,
}

impl ArticleOptions {
    /// Resolve per-article overrides over selection and global defaults
    pub fn resolve(config: &Config, selection: Option<&SelectionOptions>, article: Option<&SelectedArticle>) -> Self {
        let voice = article
            .and_then(|a| a.voice.clone())
            .or_else(|| selection.and_then(|s| s.voice.clone()))
            .unwrap_or_else(|| config.default_voice.clone());

        let language = article
            .and_then(|a| a.language.clone())
            .or_else(|| selection.and_then(|s| s.language.clone()))
            .unwrap_or_else(|| config.target_language.clone());

        let include_clips = article
            .and_then(|a| a.include_clips)
            .or_else(|| selection.and_then(|s| s.include_clips))
            .unwrap_or(config.include_clips);

        let engine = article
            .and_then(|a| a.engine)
            .or_else(|| selection.and_then(|s| s.engine));

        Self {
            voice,
            language,
            include_clips,
            engine,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("audio_articles")
}

fn default_voice() -> String {
    "es-ES-AlvaroNeural".to_string()
}

fn default_target_language() -> String {
    "es".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_translation_endpoint() -> String {
    "http://localhost:5000".to_string()
}

fn default_article_limit() -> usize {
    10
}

fn default_base_url() -> String {
    "http://localhost:8005".to_string()
}

fn default_feed_title() -> String {
    "Narrated Articles".to_string()
}

fn default_feed_description() -> String {
    "Articles converted to audio".to_string()
}

fn default_feed_filename() -> String {
    "podcast.xml".to_string()
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_ytdlp() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_edge_tts() -> PathBuf {
    PathBuf::from("edge-tts")
}
