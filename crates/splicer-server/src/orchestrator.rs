//! Request-level coordination of a splice.
//!
//! Validation, prefix derivation, tag indexing, number reservation and the
//! encode loop happen here so the HTTP handler only has to translate the
//! outcome into a response.

use std::path::PathBuf;
use std::sync::Arc;

use splicer_av::{ClipSplicer, MediaSources, OffsetReservations};
use splicer_core::{OutputPrefix, Result, SpliceRequest, TagIndex};

/// What a successful splice produced.
#[derive(Debug, Clone)]
pub struct SpliceOutcome {
    pub prefix: OutputPrefix,
    /// Highest number that existed (or was reserved) before this request.
    pub offset: u64,
    pub files: Vec<PathBuf>,
}

pub struct SpliceOrchestrator {
    tags: Arc<TagIndex>,
    reservations: Arc<OffsetReservations>,
    splicer: ClipSplicer,
}

impl SpliceOrchestrator {
    pub fn new(
        tags: Arc<TagIndex>,
        reservations: Arc<OffsetReservations>,
        splicer: ClipSplicer,
    ) -> Self {
        Self {
            tags,
            reservations,
            splicer,
        }
    }

    pub fn splicer(&self) -> &ClipSplicer {
        &self.splicer
    }

    /// Parse, validate and run a raw `POST /splice` body.
    pub async fn splice_json(&self, body: &[u8]) -> Result<SpliceOutcome> {
        let request = SpliceRequest::from_json(body)?;
        self.splice(&request).await
    }

    /// Run an already-parsed request.
    ///
    /// Labels are merged into the tag index once the request is valid, before
    /// any encode runs, so a request that fails mid-splice still contributes
    /// its labels.
    pub async fn splice(&self, request: &SpliceRequest) -> Result<SpliceOutcome> {
        request.validate()?;

        let prefix = request.prefix();
        let added = self.tags.merge(&request.labels);
        if added > 0 {
            tracing::debug!("Indexed {added} new tag(s)");
        }

        let offset = self
            .reservations
            .reserve(&prefix, self.splicer.output_dir(), request.ranges.len())
            .await?;

        tracing::info!(
            prefix = %prefix,
            offset,
            clips = request.ranges.len(),
            "Splicing clips"
        );

        let sources = MediaSources {
            video: &request.video_source,
            audio: &request.audio_source,
        };
        let files = self
            .splicer
            .run(sources, &prefix, &request.ranges, offset)
            .await?;

        Ok(SpliceOutcome {
            prefix,
            offset,
            files,
        })
    }
}
