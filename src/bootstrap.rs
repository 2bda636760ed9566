//! Composition root: wires the default adapters into a `JobService`.

use std::sync::Arc;

use crate::application::ports::ArtifactStoreError;
use crate::application::services::{JobRegistry, JobService};
use crate::config::Settings;
use crate::infrastructure::media::FfmpegTranscoder;
use crate::infrastructure::openai::{OpenAiCleanupService, OpenAiTranscriptionEngine};
use crate::infrastructure::storage::ArtifactStoreFactory;

/// Build a fully wired `JobService` from settings: ffmpeg transcoding,
/// OpenAI transcription and cleanup, and the storage backend the settings
/// select.
pub fn build_job_service(settings: &Settings) -> Result<JobService, ArtifactStoreError> {
    let registry = Arc::new(JobRegistry::new());
    let store = ArtifactStoreFactory::create(&settings.storage, Arc::clone(&registry))?;

    let transcoder = Arc::new(FfmpegTranscoder::new());
    let engine = Arc::new(OpenAiTranscriptionEngine::from_settings(&settings.openai));
    let cleanup = Arc::new(OpenAiCleanupService::from_settings(&settings.openai));

    Ok(JobService::new(
        registry,
        store,
        transcoder,
        engine,
        cleanup,
        settings.chunking,
    ))
}
