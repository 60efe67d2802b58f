//! Output filename allocation.
//!
//! The output directory itself is the counter: the highest numeric suffix
//! already on disk for a prefix is the offset, and a request's clips continue
//! from `offset + 1`. [`OffsetReservations`] layers an in-memory high-water
//! mark on top so that concurrent requests sharing a prefix never receive
//! overlapping numbers.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use splicer_core::{Error, OutputPrefix, Result, PREFIX_SEPARATOR};

/// Highest numeric suffix among `entries` that start with `prefix`, or 0.
///
/// The extension is stripped, the rest is split on `-`, and the last segment
/// is parsed as an integer. Entries whose last segment is not a number are
/// skipped.
pub fn next_offset<I, S>(prefix: &str, entries: I) -> u64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .filter_map(|entry| suffix_number(prefix, entry.as_ref()))
        .max()
        .unwrap_or(0)
}

fn suffix_number(prefix: &str, name: &str) -> Option<u64> {
    if !name.starts_with(prefix) {
        return None;
    }
    let stem = name.rsplit_once('.').map_or(name, |(stem, _ext)| stem);
    let last = stem.rsplit(PREFIX_SEPARATOR).next()?;
    match last.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::trace!("Ignoring {name:?}: suffix {last:?} is not a clip number");
            None
        }
    }
}

/// [`next_offset`] over the current listing of `dir`.
///
/// Names that are not valid UTF-8 cannot match a prefix and are skipped.
pub fn scan_offset(prefix: &str, dir: &Path) -> Result<u64> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(next_offset(prefix, names))
}

/// Per-prefix high-water marks for numbers handed out but possibly not yet
/// written to disk.
///
/// One entry is kept per distinct prefix for the life of the process. Like
/// the tag index, it is bounded by the label combinations clients submit.
#[derive(Debug, Default)]
pub struct OffsetReservations {
    reserved: DashMap<String, Arc<Mutex<u64>>>,
}

impl OffsetReservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `count` consecutive numbers for `prefix` and return the offset
    /// they start after.
    ///
    /// The directory is rescanned while the prefix's lock is held, so files
    /// added by other means are honoured, and two callers with the same prefix
    /// always receive disjoint ranges. The scan runs on the blocking pool and
    /// only the per-prefix lock is held across it.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the directory cannot be listed, and [`Error::Internal`]
    /// once the numbers for `prefix` would exceed `u64::MAX`.
    pub async fn reserve(&self, prefix: &OutputPrefix, dir: &Path, count: usize) -> Result<u64> {
        let slot = self
            .reserved
            .entry(prefix.as_str().to_string())
            .or_default()
            .clone();
        let mut high_water = slot.lock().await;

        let scan_prefix = prefix.as_str().to_string();
        let scan_dir = dir.to_path_buf();
        let on_disk = tokio::task::spawn_blocking(move || scan_offset(&scan_prefix, &scan_dir))
            .await
            .map_err(|e| Error::Internal(format!("directory scan for {prefix} failed: {e}")))??;

        let offset = on_disk.max(*high_water);
        *high_water = u64::try_from(count)
            .ok()
            .and_then(|count| offset.checked_add(count))
            .ok_or_else(|| {
                Error::Internal(format!("clip numbering exhausted for prefix {prefix}"))
            })?;
        Ok(offset)
    }
}
