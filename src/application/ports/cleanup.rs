use async_trait::async_trait;

/// Converts a raw concatenated transcript into cleaned, speaker-labeled
/// Markdown.
#[async_trait]
pub trait TranscriptCleanup: Send + Sync {
    async fn clean(&self, raw_transcript: &str) -> Result<String, CleanupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("cleanup api key is not configured")]
    NotConfigured,
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
