/*!
 * Media duration probing.
 *
 * The precise path asks ffprobe; when that is unavailable the duration is
 * estimated from the file size under a fixed bytes-per-second constant.
 * The two paths are deliberately separate functions so the estimate never
 * masquerades as a measurement.
 */

use anyhow::{Context, Result, anyhow};
use log::debug;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::file_utils::FileManager;

/// Bytes per second of 128 kbit/s MP3, the encoding every engine emits
pub const ESTIMATE_BYTES_PER_SEC: u64 = 16_000;

/// Duration probe around the external ffprobe tool
#[derive(Debug, Clone)]
pub struct AudioProbe {
    /// Path or name of the ffprobe binary
    binary: PathBuf,
}

impl AudioProbe {
    /// Create a probe around the given binary
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Measure a file's duration in milliseconds via ffprobe
    pub async fn duration_ms(&self, path: &Path) -> Result<u64> {
        let output = Command::new(&self.binary)
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(path)
            .output()
            .await
            .with_context(|| format!("Failed to run {:?}", self.binary))?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed for {:?}: {}",
                path,
                crate::file_utils::last_stderr_line(&output.stderr)
            ));
        }

        let seconds: f64 = String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse()
            .with_context(|| format!("Unparseable ffprobe duration for {:?}", path))?;

        Ok((seconds * 1000.0).round() as u64)
    }

    /// Duration in milliseconds, estimating from size when probing fails
    pub async fn duration_ms_or_estimate(&self, path: &Path) -> u64 {
        match self.duration_ms(path).await {
            Ok(ms) => ms,
            Err(e) => {
                debug!("Falling back to size-based duration estimate: {}", e);
                estimate_duration_secs(FileManager::file_size(path)) * 1000
            }
        }
    }
}

/// Estimate whole seconds of audio from a file size
///
/// Last-resort only; accurate within the tolerance of constant-bitrate
/// encodes and meaningless for anything else.
pub fn estimate_duration_secs(size_bytes: u64) -> u64 {
    size_bytes / ESTIMATE_BYTES_PER_SEC
}
