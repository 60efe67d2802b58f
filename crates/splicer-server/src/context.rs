//! Application context shared across all route handlers via Axum state.
//!
//! [`AppContext`] wraps the process-wide pieces (configuration, tag index,
//! tool registry, splice orchestrator, lookup backend) in `Arc`s so cloning
//! it per request is cheap.

use std::path::PathBuf;
use std::sync::Arc;

use splicer_av::{ClipSplicer, MediaLookup, OffsetReservations, ToolRegistry, YtDlpLookup};
use splicer_av::{FFMPEG, YT_DLP};
use splicer_core::config::Config;
use splicer_core::TagIndex;

use crate::orchestrator::SpliceOrchestrator;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub tags: Arc<TagIndex>,
    pub tools: Arc<ToolRegistry>,
    pub orchestrator: Arc<SpliceOrchestrator>,
    pub lookup: Arc<dyn MediaLookup>,
}

impl AppContext {
    /// Build a context from configuration, discovering tools on the way.
    pub fn new(config: Config) -> Self {
        let tools = ToolRegistry::discover(&config.tools);
        Self::with_tools(config, tools)
    }

    /// Build a context around an already-populated tool registry.
    ///
    /// A tool missing from the registry falls back to its bare name so a
    /// later `PATH` change can still satisfy it; the failure surfaces per
    /// request instead of at startup.
    pub fn with_tools(config: Config, tools: ToolRegistry) -> Self {
        let ffmpeg = resolve_or_bare(&tools, FFMPEG);
        let ytdlp = resolve_or_bare(&tools, YT_DLP);

        let tags = Arc::new(TagIndex::new());
        let splicer = ClipSplicer::new(ffmpeg, config.output.directory.clone())
            .with_extension(config.output.extension.clone())
            .with_timeout(config.tools.encode_timeout());
        let orchestrator = Arc::new(SpliceOrchestrator::new(
            tags.clone(),
            Arc::new(OffsetReservations::new()),
            splicer,
        ));
        let lookup: Arc<dyn MediaLookup> =
            Arc::new(YtDlpLookup::new(ytdlp, config.tools.lookup_timeout()));

        Self {
            config: Arc::new(config),
            tags,
            tools: Arc::new(tools),
            orchestrator,
            lookup,
        }
    }

    /// Swap the search / metadata backend.
    pub fn with_lookup(mut self, lookup: Arc<dyn MediaLookup>) -> Self {
        self.lookup = lookup;
        self
    }
}

fn resolve_or_bare(tools: &ToolRegistry, name: &str) -> PathBuf {
    match tools.require(name) {
        Ok(path) => path.to_path_buf(),
        Err(e) => {
            tracing::warn!("{e}; will try `{name}` at request time");
            PathBuf::from(name)
        }
    }
}
