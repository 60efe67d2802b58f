//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a scratch output directory, a
//! stand-in encoder script, and a full [`AppContext`]. The
//! [`TestHarness::with_server`] constructor starts Axum on a random port for
//! HTTP-level testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use splicer_av::{MediaLookup, SearchResult, ToolRegistry, WatchInfo, FFMPEG};
use splicer_core::config::Config;
use splicer_server::context::AppContext;
use splicer_server::router::build_router;

/// Stand-in encoder. Writes its arguments to the output file (its last
/// argument), exits 1 when any range touches second 42, and sleeps briefly
/// when a range touches second 7 so concurrent requests overlap. A range
/// touching second 11 writes half its output, stalls for a second, then
/// finishes.
const FAKE_FFMPEG: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then echo "ffmpeg version fake"; exit 0; fi
for last; do :; done
case "$*" in
  *0:00:42*) echo "simulated encode failure" >&2; exit 1 ;;
  *0:00:07*) sleep 0.2 ;;
  *0:00:11*) printf 'partial' > "$last"; sleep 1; printf 'done' >> "$last"; exit 0 ;;
esac
printf '%s\n' "$*" > "$last"
"#;

/// Test harness wrapping a fully-constructed [`AppContext`] writing into a
/// temporary directory.
pub struct TestHarness {
    pub ctx: AppContext,
    _root: tempfile::TempDir,
    output_dir: PathBuf,
}

impl TestHarness {
    /// Create a new harness with the fake encoder and an empty output dir.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let output_dir = root.path().join("clips");
        std::fs::create_dir(&output_dir).expect("failed to create output dir");
        let ffmpeg = write_fake_ffmpeg(root.path());

        let mut config = Config::default();
        config.output.directory = output_dir.clone();
        config.tools.ffmpeg_path = Some(ffmpeg.clone());

        let tools = ToolRegistry::with_paths([(FFMPEG, ffmpeg)]);
        let ctx = AppContext::with_tools(config, tools).with_lookup(Arc::new(FakeLookup));

        Self {
            ctx,
            _root: root,
            output_dir,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create an empty file in the output directory.
    pub fn touch(&self, name: &str) {
        std::fs::write(self.output_dir.join(name), b"").expect("failed to touch file");
    }

    /// Sorted names in the output directory.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.output_dir)
            .expect("failed to read output dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Contents the fake encoder wrote for `name`.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.output_dir.join(name)).expect("failed to read clip")
    }
}

#[cfg(unix)]
fn write_fake_ffmpeg(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    std::fs::write(&path, FAKE_FFMPEG).expect("failed to write fake ffmpeg");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("failed to chmod fake ffmpeg");
    path
}

#[cfg(not(unix))]
fn write_fake_ffmpeg(dir: &Path) -> PathBuf {
    dir.join("fake-ffmpeg")
}

/// Build a `/splice` body.
pub fn splice_body(tags: &[&str], clips: &[(f64, f64)]) -> serde_json::Value {
    serde_json::json!({
        "tags": tags,
        "video": "https://media.example/video",
        "audio": "https://media.example/audio",
        "clips": clips
            .iter()
            .map(|&(start, end)| serde_json::json!({"start": start, "end": end}))
            .collect::<Vec<_>>(),
    })
}

/// In-memory lookup backend.
pub struct FakeLookup;

#[async_trait]
impl MediaLookup for FakeLookup {
    async fn search(&self, term: &str, max_results: usize) -> splicer_core::Result<Vec<SearchResult>> {
        Ok((0..max_results.min(3))
            .map(|i| SearchResult {
                id: format!("vid{i}"),
                title: Some(format!("{term} #{i}")),
                channel: Some("Test Channel".into()),
                duration: Some("1:00".into()),
                views: Some(100),
                thumbnails: Vec::new(),
                url_suffix: format!("/watch?v=vid{i}"),
            })
            .collect())
    }

    async fn watch(&self, video_id: &str) -> splicer_core::Result<WatchInfo> {
        if video_id == "broken" {
            return Err(splicer_core::Error::Lookup("no formats".into()));
        }
        Ok(WatchInfo {
            title: Some(format!("Video {video_id}")),
            duration: Some("3:07".into()),
            channel: Some("Test Channel".into()),
            chapters: None,
            video: format!("https://media.example/{video_id}/video"),
            audio: format!("https://media.example/{video_id}/audio"),
            captions: None,
        })
    }
}
