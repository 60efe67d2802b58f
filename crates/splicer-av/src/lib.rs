//! # splicer-av
//!
//! External tool plumbing for the splice service.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and yt-dlp.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support and guaranteed child cleanup.
//! - **Filename allocation** ([`naming`]) -- next free numeric suffix for a
//!   prefix, plus per-prefix reservations for concurrent requests.
//! - **Clip splicing** ([`ClipSplicer`]) -- one ffmpeg invocation per range,
//!   fail-fast.
//! - **Media lookup** ([`MediaLookup`]) -- video search and stream metadata via
//!   yt-dlp.

pub mod command;
pub mod lookup;
pub mod naming;
pub mod splice;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use lookup::{MediaLookup, SearchResult, WatchInfo, YtDlpLookup};
pub use naming::{next_offset, scan_offset, OffsetReservations};
pub use splice::{ClipSplicer, MediaSources};
pub use tools::{ToolInfo, ToolRegistry, FFMPEG, YT_DLP};
