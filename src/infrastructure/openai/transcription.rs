use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::config::OpenAiSettings;

/// Speech-to-text over the OpenAI audio transcriptions endpoint.
pub struct OpenAiTranscriptionEngine {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiTranscriptionEngine {
    pub fn new(api_key: Option<String>, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: model.unwrap_or_else(|| "gpt-4o-transcribe".to_string()),
        }
    }

    pub fn from_settings(settings: &OpenAiSettings) -> Self {
        Self::new(
            settings.api_key.clone(),
            Some(settings.base_url.clone()),
            Some(settings.transcribe_model.clone()),
        )
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[async_trait]
impl TranscriptionEngine for OpenAiTranscriptionEngine {
    async fn transcribe(
        &self,
        audio_data: &[u8],
        filename: &str,
    ) -> Result<String, TranscriptionError> {
        // A missing key fails on first use, not at construction.
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TranscriptionError::NotConfigured)?;

        let url = format!("{}/audio/transcriptions", self.base_url);
        let file_part = multipart::Part::bytes(audio_data.to_vec())
            .file_name(filename.to_string())
            .mime_str("audio/mpeg")
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;
        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", file_part);

        tracing::debug!(model = %self.model, filename = %filename, "Sending audio segment for transcription");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("parse response: {}", e)))?;

        tracing::debug!(chars = result.text.len(), "Segment transcription completed");
        Ok(result.text.trim().to_string())
    }
}
