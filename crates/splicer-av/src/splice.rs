//! Clip splicing: one encode invocation per range, in order, stopping at the
//! first failure.

use std::path::{Path, PathBuf};
use std::time::Duration;

use splicer_core::{ClipRange, Error, OutputPrefix, Result};

use crate::command::ToolCommand;

/// The two inputs every clip is cut from.
#[derive(Debug, Clone, Copy)]
pub struct MediaSources<'a> {
    /// URL or path of the video stream.
    pub video: &'a str,
    /// URL or path of the audio stream.
    pub audio: &'a str,
}

/// Runs the encode tool over a sequence of ranges.
///
/// Each range becomes `{prefix}-{offset + i + 1}.{extension}` inside the
/// output directory. On failure at range `i`, clips `0..i` stay on disk and
/// nothing for `i` or later is left behind.
#[derive(Debug, Clone)]
pub struct ClipSplicer {
    ffmpeg: PathBuf,
    output_dir: PathBuf,
    extension: String,
    timeout: Option<Duration>,
}

impl ClipSplicer {
    pub fn new(ffmpeg: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            output_dir: output_dir.into(),
            extension: "mp4".into(),
            timeout: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Build the encode invocation for a single range.
    ///
    /// Video and audio are trimmed independently and muxed into `output_name`,
    /// which is resolved relative to the output directory.
    pub fn clip_command(
        &self,
        sources: MediaSources<'_>,
        range: &ClipRange,
        output_name: &str,
    ) -> ToolCommand {
        let trim = [
            "-ss".to_string(),
            range.start_timestamp(),
            "-to".to_string(),
            range.end_timestamp(),
        ];

        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.args(["-hide_banner", "-loglevel", "error"])
            .args(trim.clone())
            .args(["-i", sources.video])
            .args(trim)
            .args(["-i", sources.audio])
            .arg(output_name)
            .current_dir(&self.output_dir)
            .timeout(self.timeout);
        cmd
    }

    /// Encode every range in order and return the paths written.
    ///
    /// # Errors
    ///
    /// [`Error::Encode`] carrying the index of the first range whose encode
    /// could not be run or exited non-zero. Later ranges are not attempted.
    /// [`Error::Internal`] if a clip number would exceed `u64::MAX`.
    pub async fn run(
        &self,
        sources: MediaSources<'_>,
        prefix: &OutputPrefix,
        ranges: &[ClipRange],
        offset: u64,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(ranges.len());

        for (i, range) in ranges.iter().enumerate() {
            let number = (i as u64)
                .checked_add(1)
                .and_then(|n| offset.checked_add(n))
                .ok_or_else(|| {
                    Error::Internal(format!("clip numbering exhausted for prefix {prefix}"))
                })?;
            let name = prefix.file_name(number, &self.extension);
            let path = self.output_dir.join(&name);

            tracing::debug!(
                index = i,
                output = %name,
                start = %range.start_timestamp(),
                end = %range.end_timestamp(),
                "Encoding clip"
            );

            let failure = match self.clip_command(sources, range, &name).status().await {
                Ok(output) if output.success() => {
                    written.push(path);
                    continue;
                }
                Ok(output) => {
                    let stderr = output.stderr.trim();
                    tracing::warn!(
                        index = i,
                        output = %name,
                        status = %output.status,
                        stderr = %stderr,
                        "Encode failed"
                    );
                    if stderr.is_empty() {
                        format!("exited with status {}", output.status)
                    } else {
                        format!("exited with status {}: {stderr}", output.status)
                    }
                }
                Err(e) => {
                    tracing::warn!(index = i, output = %name, error = %e, "Encode could not run");
                    e.to_string()
                }
            };

            discard_partial(&path).await;
            return Err(Error::encode(i, failure));
        }

        Ok(written)
    }
}

/// Remove whatever the failed invocation left at `path`.
async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed partial clip {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove partial clip {}: {e}", path.display()),
    }
}
