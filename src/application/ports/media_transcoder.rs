use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Container-level facts about a media file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaProbe {
    pub duration_sec: f64,
    pub has_video_stream: bool,
}

/// Subprocess-backed audio extraction, compression and segmentation.
#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaProbe, TranscoderError>;

    /// Transcode to canonical mono 16 kHz audio at the target bitrate,
    /// returning the path of the produced file.
    async fn transcode(
        &self,
        src: &Path,
        target_bitrate_kbps: u32,
    ) -> Result<PathBuf, TranscoderError>;

    /// Split into numbered segment files of at most `segment_duration_sec`
    /// each, with per-segment timestamps reset. Returns the paths in order.
    async fn segment(
        &self,
        audio: &Path,
        segment_duration_sec: u64,
    ) -> Result<Vec<PathBuf>, TranscoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscoderError {
    #[error("probe failed: {0}")]
    ProbeFailed(String),
    #[error("transcode failed: {0}")]
    TranscodeFailed(String),
    #[error("segmentation failed: {0}")]
    SegmentFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
