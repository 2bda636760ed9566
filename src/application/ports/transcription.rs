use async_trait::async_trait;

/// Converts one audio segment to raw text.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        audio_data: &[u8],
        filename: &str,
    ) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription api key is not configured")]
    NotConfigured,
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
}
