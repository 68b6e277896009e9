/*!
 * # readcast - Articles to podcast episodes
 *
 * A Rust library for turning read-it-later/RSS articles into narrated
 * podcast episodes.
 *
 * ## Features
 *
 * - Fetch articles from Wallabag and FreshRSS
 * - Translate long articles in bounded chunks with natural cut points
 * - Narrate text through interchangeable TTS engines (edge-tts, Google TTS)
 * - Fold externally referenced video clips into the episode audio
 * - Lossless stream-copy assembly with ID3 chapter markers
 * - Publish everything as an RSS 2.0 podcast feed
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `article`: Article model and markup cleanup
 * - `sources`: Clients for the article source services:
 *   - `sources::wallabag`: Wallabag API client
 *   - `sources::freshrss`: FreshRSS (Google Reader API) client
 * - `translation`: Chunked translation:
 *   - `translation::chunker`: Budgeted splitting at natural boundaries
 *   - `translation::service`: Same-language gate and fallback handling
 * - `providers`: Clients for the translation back ends:
 *   - `providers::libretranslate`: LibreTranslate client
 *   - `providers::deepl`: DeepL client
 * - `synthesis`: Narration engines behind one trait
 * - `clips`: Embedded clip extraction and download
 * - `audio`: Duration probing, assembly, chapter markers
 * - `feed`: Episode catalog and podcast feed serialization
 * - `app_controller`: Batch orchestration and status
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities and detection
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod article;
pub mod audio;
pub mod clips;
pub mod errors;
pub mod feed;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod sources;
pub mod synthesis;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{BatchStatus, Controller};
pub use article::Article;
pub use errors::{AppError, AssemblyError, ClipError, FeedError, ProviderError, SourceError, SynthesisError};
pub use feed::{Episode, EpisodeCatalog, FeedBuilder};
pub use language_utils::{detect_language, language_codes_match, normalize_to_part1_or_part2t};
pub use translation::Translator;
