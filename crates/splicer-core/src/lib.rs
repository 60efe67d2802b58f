//! splicer-core: shared errors, configuration, the splice request model, and
//! the process-wide tag index.
//!
//! This crate is the foundational dependency for the other splicer-* crates.

pub mod clip;
pub mod config;
pub mod error;
pub mod tags;

// Re-export the most commonly used items at the crate root.
pub use clip::{format_timestamp, ClipRange, OutputPrefix, SpliceRequest, PREFIX_SEPARATOR};
pub use error::{Error, Result};
pub use tags::TagIndex;
