//! Splice request model: clip ranges, the request body, and the output prefix
//! derived from a request's label set.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator between labels in a prefix and between a prefix and its number.
pub const PREFIX_SEPARATOR: char = '-';

// ---------------------------------------------------------------------------
// ClipRange
// ---------------------------------------------------------------------------

/// A `[start, end]` window into the source media, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub start: f64,
    pub end: f64,
}

impl ClipRange {
    /// Build a range, rejecting anything outside `0 <= start < end`.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        let range = Self { start, end };
        range.check(0)?;
        Ok(range)
    }

    fn check(&self, index: usize) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(Error::validation(format!(
                "clips[{index}]: start and end must be finite numbers"
            )));
        }
        if self.start < 0.0 {
            return Err(Error::validation(format!(
                "clips[{index}]: start must not be negative (got {})",
                self.start
            )));
        }
        if self.start >= self.end {
            return Err(Error::validation(format!(
                "clips[{index}]: start ({}) must be before end ({})",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Start position formatted for the encode tool.
    pub fn start_timestamp(&self) -> String {
        format_timestamp(self.start)
    }

    /// End position formatted for the encode tool.
    pub fn end_timestamp(&self) -> String {
        format_timestamp(self.end)
    }
}

/// Format seconds as `H:MM:SS`, truncating any fractional part.
///
/// Hours are not wrapped into days, so `100000.0` becomes `27:46:40`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

// ---------------------------------------------------------------------------
// SpliceRequest
// ---------------------------------------------------------------------------

/// Body of `POST /splice`.
///
/// Labels are held as an ordered set, so duplicates collapse and iteration is
/// always sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpliceRequest {
    #[serde(rename = "tags")]
    pub labels: BTreeSet<String>,
    #[serde(rename = "video")]
    pub video_source: String,
    #[serde(rename = "audio")]
    pub audio_source: String,
    #[serde(rename = "clips")]
    pub ranges: Vec<ClipRange>,
}

impl SpliceRequest {
    /// Parse and validate a raw JSON body.
    ///
    /// Both malformed JSON and semantically invalid fields come back as
    /// [`Error::Validation`].
    pub fn from_json(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(Error::validation("request body is empty"));
        }
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| Error::validation(format!("invalid splice request: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    /// Check every field beyond what the JSON shape already guarantees.
    pub fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(Error::validation("tags must not be empty"));
        }
        for label in &self.labels {
            validate_label(label)?;
        }
        if self.video_source.trim().is_empty() {
            return Err(Error::validation("video must not be empty"));
        }
        if self.audio_source.trim().is_empty() {
            return Err(Error::validation("audio must not be empty"));
        }
        if self.ranges.is_empty() {
            return Err(Error::validation("clips must not be empty"));
        }
        for (i, range) in self.ranges.iter().enumerate() {
            range.check(i)?;
        }
        Ok(())
    }

    /// The filename stem shared by every clip of this request.
    pub fn prefix(&self) -> OutputPrefix {
        OutputPrefix::from_labels(&self.labels)
    }
}

fn validate_label(label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(Error::validation("tags must not contain empty strings"));
    }
    if label == "." || label == ".." || label.contains(['/', '\\']) {
        return Err(Error::validation(format!(
            "tag {label:?} cannot be used in a file name"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// OutputPrefix
// ---------------------------------------------------------------------------

/// Sorted labels joined by [`PREFIX_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputPrefix(String);

impl OutputPrefix {
    /// Derive the prefix from a label set.
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut sorted: Vec<&str> = labels.into_iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();
        Self(sorted.join(&PREFIX_SEPARATOR.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Output file name for clip number `n`: `{prefix}-{n}.{extension}`.
    pub fn file_name(&self, n: u64, extension: &str) -> String {
        format!("{}{PREFIX_SEPARATOR}{n}.{extension}", self.0)
    }
}

impl fmt::Display for OutputPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OutputPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn prefix_ignores_label_order() {
        let a = OutputPrefix::from_labels(&vec!["outro".to_string(), "intro".to_string()]);
        let b = OutputPrefix::from_labels(&vec!["intro".to_string(), "outro".to_string()]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "intro-outro");
    }

    #[test]
    fn prefix_file_name() {
        let prefix = OutputPrefix::from_labels(&vec!["intro".to_string()]);
        assert_eq!(prefix.file_name(4, "mp4"), "intro-4.mp4");
    }

    #[test]
    fn timestamp_truncates_fraction() {
        assert_eq!(format_timestamp(0.0), "0:00:00");
        assert_eq!(format_timestamp(5.9), "0:00:05");
        assert_eq!(format_timestamp(61.2), "0:01:01");
        assert_eq!(format_timestamp(3725.0), "1:02:05");
        assert_eq!(format_timestamp(100_000.0), "27:46:40");
    }

    #[test]
    fn range_rejects_inverted_and_negative() {
        assert!(ClipRange::new(0.0, 5.0).is_ok());
        assert!(ClipRange::new(5.0, 5.0).is_err());
        assert!(ClipRange::new(6.0, 5.0).is_err());
        assert!(ClipRange::new(-1.0, 5.0).is_err());
        assert!(ClipRange::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn parses_valid_request() {
        let req = SpliceRequest::from_json(&body(json!({
            "tags": ["outro", "intro", "intro"],
            "video": "https://example.com/v",
            "audio": "https://example.com/a",
            "clips": [{"start": 0, "end": 5}, {"start": 5.5, "end": 10}]
        })))
        .unwrap();

        assert_eq!(req.labels.len(), 2);
        assert_eq!(req.prefix().as_str(), "intro-outro");
        assert_eq!(req.ranges.len(), 2);
        assert_eq!(req.ranges[1].start, 5.5);
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = SpliceRequest::from_json(&body(json!({
            "tags": ["intro"],
            "video": "v",
            "clips": []
        })))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("audio"), "unexpected: {err}");
    }

    #[test]
    fn malformed_json_is_validation_error() {
        let err = SpliceRequest::from_json(b"{not json").unwrap_err();
        assert_eq!(err.http_status(), 400);

        let err = SpliceRequest::from_json(b"").unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn rejects_bad_fields() {
        let cases = [
            json!({"tags": [], "video": "v", "audio": "a", "clips": [{"start": 0, "end": 1}]}),
            json!({"tags": [""], "video": "v", "audio": "a", "clips": [{"start": 0, "end": 1}]}),
            json!({"tags": ["../x"], "video": "v", "audio": "a", "clips": [{"start": 0, "end": 1}]}),
            json!({"tags": ["a"], "video": " ", "audio": "a", "clips": [{"start": 0, "end": 1}]}),
            json!({"tags": ["a"], "video": "v", "audio": "a", "clips": []}),
            json!({"tags": ["a"], "video": "v", "audio": "a", "clips": [{"start": 3, "end": 1}]}),
            json!({"tags": "a", "video": "v", "audio": "a", "clips": [{"start": 0, "end": 1}]}),
        ];
        for case in cases {
            let err = SpliceRequest::from_json(&body(case.clone())).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "accepted {case}");
        }
    }

    #[test]
    fn range_error_names_index() {
        let err = SpliceRequest::from_json(&body(json!({
            "tags": ["a"],
            "video": "v",
            "audio": "a",
            "clips": [{"start": 0, "end": 1}, {"start": 2, "end": 2}]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("clips[1]"), "unexpected: {err}");
    }
}
