/*!
 * Clip audio download through the external yt-dlp tool.
 */

use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::errors::ClipError;

use super::extract::ClipSource;

/// Downloader invoking yt-dlp for best-available audio as MP3
#[derive(Debug, Clone)]
pub struct ClipDownloader {
    /// Path or name of the yt-dlp binary
    binary: PathBuf,
}

impl ClipDownloader {
    /// Create a downloader around the given binary
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Fetch the audio track for one clip into the working directory
    ///
    /// One call produces one compressed audio file. Failures are reported
    /// per clip; callers drop the segment and keep the episode going.
    pub async fn download(
        &self,
        source: &ClipSource,
        workdir: &Path,
    ) -> Result<PathBuf, ClipError> {
        let final_path = workdir.join(format!("clip_{}.mp3", source.id));
        let template = workdir.join(format!("clip_{}.%(ext)s", source.id));

        info!("Downloading clip audio: {}", source.url);
        debug!("Invoking {:?} -> {:?}", self.binary, final_path);

        let result = Command::new(&self.binary)
            .arg("-x")
            .arg("--audio-format")
            .arg("mp3")
            .arg("--no-playlist")
            .arg("-o")
            .arg(&template)
            .arg(&source.url)
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClipError::ToolMissing(
                    self.binary.to_string_lossy().to_string(),
                ));
            }
            Err(e) => {
                return Err(ClipError::DownloadFailed {
                    url: source.url.clone(),
                    message: e.to_string(),
                });
            }
        };

        if !output.status.success() {
            return Err(ClipError::DownloadFailed {
                url: source.url.clone(),
                message: crate::file_utils::last_stderr_line(&output.stderr),
            });
        }

        if !final_path.is_file() {
            return Err(ClipError::MissingOutput(source.url.clone()));
        }

        Ok(final_path)
    }
}
