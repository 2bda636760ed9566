use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{CleanupError, TranscriptCleanup};
use crate::config::OpenAiSettings;

const SYSTEM_PROMPT: &str = "You are a transcript editor. Clean transcripts by removing filler words (um, uh, like when not meaningful), stutters, and false starts; normalize numbers into numerals; correct punctuation and casing; and group lines into paragraphs. Add speaker labels as Speaker 1, Speaker 2, etc. If the source language is not English, keep that language. Output only clean Markdown as plain text. Do not wrap the output in code fences or backticks.";

fn user_prompt(raw_transcript: &str) -> String {
    format!(
        "Raw transcript:\n\n{}\n\nRequirements:\n- Remove disfluencies and false starts\n- Normalize numbers to digits (e.g., twenty five -> 25)\n- Punctuate and paragraph appropriately\n- Label speakers as Speaker 1, Speaker 2, ...\n- Output in Markdown only",
        raw_transcript
    )
}

/// Transcript cleanup and speaker labeling over the OpenAI chat
/// completions endpoint.
pub struct OpenAiCleanupService {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiCleanupService {
    pub fn new(api_key: Option<String>, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
        }
    }

    pub fn from_settings(settings: &OpenAiSettings) -> Self {
        Self::new(
            settings.api_key.clone(),
            Some(settings.base_url.clone()),
            Some(settings.cleanup_model.clone()),
        )
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TranscriptCleanup for OpenAiCleanupService {
    async fn clean(&self, raw_transcript: &str) -> Result<String, CleanupError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CleanupError::NotConfigured)?;

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(raw_transcript),
                },
            ],
            temperature: 0.2,
        };

        tracing::debug!(model = %self.model, chars = raw_transcript.len(), "Sending transcript for cleanup");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CleanupError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(CleanupError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CleanupError::ApiRequestFailed(format!("parse response: {}", e)))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CleanupError::InvalidResponse("no completion choices".to_string()))?;

        Ok(text.trim().to_string())
    }
}
