//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, output, tools and lookup sections. Every section defaults sensibly
//! so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub output: OutputConfig,
    pub tools: ToolsConfig,
    pub lookup: LookupConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.output.directory.as_os_str().is_empty() {
            warnings.push("output.directory is empty; clips will be written to the working directory".into());
        }

        let ext = self.output.extension.as_str();
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
            warnings.push(format!(
                "output.extension '{ext}' should be a bare extension such as 'mp4'"
            ));
        }

        if self.tools.encode_timeout_secs == Some(0) {
            warnings.push("tools.encode_timeout_secs is 0; every encode will time out".into());
        }

        if self.lookup.max_results == 0 {
            warnings.push("lookup.max_results is 0; searches will return nothing".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8000,
        }
    }
}

/// Where and how spliced clips are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("clips"),
            extension: "mp4".into(),
        }
    }
}

/// Paths and limits for external CLI tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ytdlp_path: Option<PathBuf>,
    /// `None` waits for the encoder indefinitely.
    pub encode_timeout_secs: Option<u64>,
    pub lookup_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ytdlp_path: None,
            encode_timeout_secs: None,
            lookup_timeout_secs: 60,
        }
    }
}

impl ToolsConfig {
    pub fn encode_timeout(&self) -> Option<Duration> {
        self.encode_timeout_secs.map(Duration::from_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

/// Video search / metadata lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub max_results: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self { max_results: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.output.directory, PathBuf::from("clips"));
        assert_eq!(config.output.extension, "mp4");
        assert!(config.tools.ffmpeg_path.is_none());
        assert!(config.tools.encode_timeout().is_none());
        assert_eq!(config.tools.lookup_timeout(), Duration::from_secs(60));
        assert_eq!(config.lookup.max_results, 10);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::from_json(
            r#"{"output": {"directory": "/srv/clips"}, "tools": {"encode_timeout_secs": 90}}"#,
        )
        .unwrap();
        assert_eq!(config.output.directory, PathBuf::from("/srv/clips"));
        assert_eq!(config.output.extension, "mp4");
        assert_eq!(config.tools.encode_timeout(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn invalid_json_is_validation_error() {
        let err = Config::from_json("{").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(Some(&dir.path().join("nope.json")));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("splicer.json");
        std::fs::write(&path, r#"{"server": {"port": 9100}}"#).unwrap();
        let config = Config::load_or_default(Some(&path));
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        config.output.extension = ".mp4".into();
        config.tools.encode_timeout_secs = Some(0);
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3, "{warnings:?}");
    }
}
