/*!
 * External clip handling.
 *
 * Articles may embed video references whose audio belongs in the episode:
 * - `extract`: finds embedded references in raw markup and canonicalizes
 *   the different URL spellings of the same video
 * - `download`: fetches one audio track per resolved reference through the
 *   external yt-dlp tool
 */

pub mod extract;
pub mod download;

pub use download::ClipDownloader;
pub use extract::{ClipSource, extract_clip_sources};
