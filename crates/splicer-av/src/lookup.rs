//! Video search and per-video stream metadata.
//!
//! Both are thin wrappers over an external extraction tool. [`MediaLookup`]
//! is the seam the HTTP layer depends on; [`YtDlpLookup`] is the production
//! implementation that shells out to `yt-dlp` and reshapes its JSON.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use splicer_core::{Error, Result};

use crate::command::ToolCommand;

/// One hit from a video search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: Option<String>,
    pub channel: Option<String>,
    /// Human-readable length, e.g. `4:13` or `1:02:05`.
    pub duration: Option<String>,
    pub views: Option<u64>,
    pub thumbnails: Vec<String>,
    pub url_suffix: String,
}

/// Stream URLs and metadata for a single video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchInfo {
    pub title: Option<String>,
    pub duration: Option<String>,
    pub channel: Option<String>,
    /// Chapter list exactly as the extractor reports it.
    pub chapters: Option<serde_json::Value>,
    pub video: String,
    pub audio: String,
    /// URL of the English automatic captions in WebVTT form.
    pub captions: Option<String>,
}

#[async_trait]
pub trait MediaLookup: Send + Sync {
    /// Search for videos matching `term`.
    async fn search(&self, term: &str, max_results: usize) -> Result<Vec<SearchResult>>;

    /// Resolve stream URLs and metadata for `video_id`.
    async fn watch(&self, video_id: &str) -> Result<WatchInfo>;
}

// ---------------------------------------------------------------------------
// yt-dlp implementation
// ---------------------------------------------------------------------------

const WATCH_URL: &str = "https://youtube.com/watch?v=";

pub struct YtDlpLookup {
    ytdlp: PathBuf,
    timeout: Duration,
}

impl YtDlpLookup {
    pub fn new(ytdlp: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ytdlp: ytdlp.into(),
            timeout,
        }
    }

    async fn dump_json(&self, target: String, flat: bool) -> Result<String> {
        let mut cmd = ToolCommand::new(self.ytdlp.clone());
        if flat {
            cmd.arg("--flat-playlist");
        } else {
            cmd.arg("--no-playlist");
        }
        cmd.args(["-J", "--no-warnings"])
            .arg(target)
            .timeout(Some(self.timeout));

        let output = cmd
            .execute()
            .await
            .map_err(|e| Error::Lookup(e.to_string()))?;
        Ok(output.stdout)
    }
}

#[async_trait]
impl MediaLookup for YtDlpLookup {
    async fn search(&self, term: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let json = self
            .dump_json(format!("ytsearch{max_results}:{term}"), true)
            .await?;
        let mut results = parse_search(&json)?;
        results.truncate(max_results);
        Ok(results)
    }

    async fn watch(&self, video_id: &str) -> Result<WatchInfo> {
        validate_video_id(video_id)?;
        let json = self.dump_json(format!("{WATCH_URL}{video_id}"), false).await?;
        parse_watch(&json)
    }
}

fn validate_video_id(video_id: &str) -> Result<()> {
    let valid = !video_id.is_empty()
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::validation(format!("invalid video id: {video_id:?}")))
    }
}

// ---------------------------------------------------------------------------
// JSON reshaping
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Playlist {
    #[serde(default)]
    entries: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    id: String,
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    view_count: Option<u64>,
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    fulltitle: Option<String>,
    duration_string: Option<String>,
    channel: Option<String>,
    chapters: Option<serde_json::Value>,
    #[serde(default)]
    requested_formats: Vec<Format>,
    automatic_captions: Option<HashMap<String, Vec<CaptionSource>>>,
}

#[derive(Debug, Deserialize)]
struct Format {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CaptionSource {
    ext: Option<String>,
    url: Option<String>,
}

/// Reshape `yt-dlp --flat-playlist -J ytsearchN:...` output.
pub fn parse_search(json: &str) -> Result<Vec<SearchResult>> {
    let playlist: Playlist = serde_json::from_str(json)
        .map_err(|e| Error::Lookup(format!("unreadable search output: {e}")))?;

    Ok(playlist
        .entries
        .into_iter()
        .map(|entry| SearchResult {
            url_suffix: format!("/watch?v={}", entry.id),
            duration: entry.duration.map(format_length),
            channel: entry.channel.or(entry.uploader),
            thumbnails: entry.thumbnails.into_iter().map(|t| t.url).collect(),
            views: entry.view_count,
            title: entry.title,
            id: entry.id,
        })
        .collect())
}

/// Reshape `yt-dlp -J <url>` output.
pub fn parse_watch(json: &str) -> Result<WatchInfo> {
    let info: VideoInfo = serde_json::from_str(json)
        .map_err(|e| Error::Lookup(format!("unreadable video info: {e}")))?;

    let mut formats = info.requested_formats.into_iter();
    let (Some(video), Some(audio)) = (formats.next(), formats.next()) else {
        return Err(Error::Lookup(
            "video info has no separate video and audio formats".into(),
        ));
    };

    let captions = info
        .automatic_captions
        .as_ref()
        .and_then(|captions| captions.get("en-en"))
        .and_then(|sources| {
            sources
                .iter()
                .find(|s| s.ext.as_deref() == Some("vtt"))
                .and_then(|s| s.url.clone())
        });

    Ok(WatchInfo {
        title: info.fulltitle,
        duration: info.duration_string,
        channel: info.channel,
        chapters: info.chapters,
        video: video.url,
        audio: audio.url,
        captions,
    })
}

/// `m:ss` below an hour, `h:mm:ss` above.
fn format_length(seconds: f64) -> String {
    let total = seconds.max(0.0).trunc() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_entries_are_reshaped() {
        let raw = json!({
            "_type": "playlist",
            "entries": [
                {
                    "id": "abc123",
                    "title": "First",
                    "channel": "Chan",
                    "duration": 253.0,
                    "view_count": 1200,
                    "thumbnails": [{"url": "https://i.example/1.jpg", "height": 90}]
                },
                {"id": "def456", "uploader": "Uploader", "duration": 3725}
            ]
        });
        let results = parse_search(&raw.to_string()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url_suffix, "/watch?v=abc123");
        assert_eq!(results[0].duration.as_deref(), Some("4:13"));
        assert_eq!(results[0].views, Some(1200));
        assert_eq!(results[0].thumbnails, vec!["https://i.example/1.jpg"]);
        assert_eq!(results[1].channel.as_deref(), Some("Uploader"));
        assert_eq!(results[1].duration.as_deref(), Some("1:02:05"));
        assert!(results[1].title.is_none());
    }

    #[test]
    fn watch_info_picks_formats_and_captions() {
        let raw = json!({
            "fulltitle": "A Video",
            "duration_string": "3:07",
            "channel": "Chan",
            "chapters": [{"start_time": 0.0, "end_time": 60.0, "title": "Intro"}],
            "requested_formats": [
                {"url": "https://v.example/video", "vcodec": "vp9"},
                {"url": "https://v.example/audio", "acodec": "opus"}
            ],
            "automatic_captions": {
                "en-en": [
                    {"ext": "json3", "url": "https://c.example/json3"},
                    {"ext": "vtt", "url": "https://c.example/vtt"}
                ]
            }
        });
        let info = parse_watch(&raw.to_string()).unwrap();
        assert_eq!(info.title.as_deref(), Some("A Video"));
        assert_eq!(info.duration.as_deref(), Some("3:07"));
        assert_eq!(info.video, "https://v.example/video");
        assert_eq!(info.audio, "https://v.example/audio");
        assert_eq!(info.captions.as_deref(), Some("https://c.example/vtt"));
        assert_eq!(info.chapters.unwrap()[0]["title"], "Intro");
    }

    #[test]
    fn captions_absent_without_vtt() {
        let raw = json!({
            "requested_formats": [{"url": "v"}, {"url": "a"}],
            "automatic_captions": {"en-en": [{"ext": "srv1", "url": "x"}]}
        });
        assert!(parse_watch(&raw.to_string()).unwrap().captions.is_none());

        let raw = json!({"requested_formats": [{"url": "v"}, {"url": "a"}]});
        assert!(parse_watch(&raw.to_string()).unwrap().captions.is_none());
    }

    #[test]
    fn watch_without_format_pair_is_lookup_error() {
        let raw = json!({"requested_formats": [{"url": "only-one"}]});
        let err = parse_watch(&raw.to_string()).unwrap_err();
        assert!(matches!(err, Error::Lookup(_)));
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn video_id_is_checked() {
        assert!(validate_video_id("dQw4w9WgXcQ").is_ok());
        assert!(validate_video_id("a-b_c").is_ok());
        assert!(validate_video_id("").is_err());
        assert!(validate_video_id("x&list=y").is_err());
    }

    #[tokio::test]
    async fn missing_ytdlp_is_lookup_error() {
        let lookup = YtDlpLookup::new("/nonexistent/yt-dlp", Duration::from_secs(5));
        let err = lookup.search("cats", 3).await.unwrap_err();
        assert!(matches!(err, Error::Lookup(_)));
    }
}
