use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::Instrument;

use crate::application::ports::{
    ArtifactStore, ArtifactStoreError, CleanupError, MediaTranscoder, TranscoderError,
    TranscriptCleanup, TranscriptionEngine, TranscriptionError,
};
use crate::application::services::{JobPatch, JobRegistry};
use crate::application::services::transcript::{assemble_raw_transcript, strip_code_fences};
use crate::config::ChunkingSettings;
use crate::domain::{JobId, JobMetadata, JobStatus, artifact, plan};

/// The submitted file, held in memory until it is written into the job's
/// workspace.
pub struct SubmittedMedia {
    pub data: Bytes,
    pub original_filename: String,
    pub mime_type: String,
}

/// Drives one job through the pipeline stages, updating the registry and
/// the artifact store as it goes. Stages run strictly sequentially; the
/// first stage failure is terminal for the job.
pub struct TranscriptionPipeline {
    registry: Arc<JobRegistry>,
    store: Arc<dyn ArtifactStore>,
    transcoder: Arc<dyn MediaTranscoder>,
    engine: Arc<dyn TranscriptionEngine>,
    cleanup: Arc<dyn TranscriptCleanup>,
    chunking: ChunkingSettings,
}

impl TranscriptionPipeline {
    pub fn new(
        registry: Arc<JobRegistry>,
        store: Arc<dyn ArtifactStore>,
        transcoder: Arc<dyn MediaTranscoder>,
        engine: Arc<dyn TranscriptionEngine>,
        cleanup: Arc<dyn TranscriptCleanup>,
        chunking: ChunkingSettings,
    ) -> Self {
        Self {
            registry,
            store,
            transcoder,
            engine,
            cleanup,
            chunking,
        }
    }

    /// Run the job to a terminal state. Any stage error is captured on the
    /// job record; nothing propagates to the caller.
    pub async fn run(&self, job_id: JobId, media: SubmittedMedia) {
        let span = tracing::info_span!(
            "transcription_job",
            job_id = %job_id,
            filename = %media.original_filename,
        );
        async {
            match self.process(job_id, &media).await {
                Ok(()) => {
                    tracing::info!("Transcription job completed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Transcription job failed");
                    self.registry
                        .update(
                            job_id,
                            JobPatch {
                                status: Some(JobStatus::Error),
                                progress: Some(100),
                                message: Some(e.to_string()),
                                ..Default::default()
                            },
                        )
                        .await;
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process(&self, job_id: JobId, media: &SubmittedMedia) -> Result<(), PipelineError> {
        // The workspace is owned exclusively by this pipeline run and must
        // be gone on every exit path, success or failure.
        let workspace = tempfile::Builder::new().prefix("transcribe-").tempdir()?;

        let outcome = self.run_stages(job_id, media, workspace.path()).await;

        if let Err(e) = workspace.close() {
            tracing::warn!(error = %e, "Failed to remove job workspace");
        }
        outcome
    }

    async fn run_stages(
        &self,
        job_id: JobId,
        media: &SubmittedMedia,
        workspace: &Path,
    ) -> Result<(), PipelineError> {
        self.update(job_id, 5, "Uploading source...").await;

        let src_name = Path::new(&media.original_filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let src_path = workspace.join(&src_name);
        tokio::fs::write(&src_path, &media.data).await?;

        self.store
            .put(
                job_id,
                &artifact::original_name(&src_name),
                media.data.clone(),
                &media.mime_type,
            )
            .await
            .map_err(PipelineError::Store)?;
        if let Some(job) = self.registry.get(job_id).await {
            let meta = JobMetadata {
                job_id,
                display_name: job.display_name,
                original_filename: job.original_filename,
                created_at: job.created_at,
            };
            self.store
                .put(
                    job_id,
                    artifact::META_JSON,
                    serde_json::to_vec(&meta)?.into(),
                    "application/json",
                )
                .await
                .map_err(PipelineError::Store)?;
        }

        self.message(job_id, "Analyzing media...").await;
        let probe = self
            .transcoder
            .probe(&src_path)
            .await
            .map_err(PipelineError::MediaAnalysis)?;
        tracing::debug!(
            container_duration_sec = probe.duration_sec,
            has_video = probe.has_video_stream,
            "Source analyzed"
        );

        let stage_msg = if probe.has_video_stream {
            "Extracting audio..."
        } else {
            "Compressing audio..."
        };
        self.message(job_id, stage_msg).await;
        let audio_path = self
            .transcoder
            .transcode(&src_path, self.chunking.bitrate_kbps)
            .await
            .map_err(PipelineError::Transcode)?;

        // The transcode can change the effective duration, so measure the
        // produced audio rather than trusting the container probe.
        let audio_probe = self
            .transcoder
            .probe(&audio_path)
            .await
            .map_err(PipelineError::MediaAnalysis)?;

        let chunk_plan = plan(
            audio_probe.duration_sec,
            self.chunking.bitrate_kbps,
            self.chunking.max_chunk_mb,
            self.chunking.max_duration_sec,
        );
        let segment_paths = if chunk_plan.needs_split {
            self.message(job_id, "Splitting into chunks...").await;
            self.transcoder
                .segment(&audio_path, chunk_plan.segment_duration_sec)
                .await
                .map_err(PipelineError::Split)?
        } else {
            vec![audio_path.clone()]
        };
        if segment_paths.is_empty() {
            return Err(PipelineError::NoSegments);
        }

        for (index, segment) in segment_paths.iter().enumerate() {
            let data = tokio::fs::read(segment).await?;
            self.store
                .put(
                    job_id,
                    &artifact::segment_name(index),
                    data.into(),
                    "audio/mpeg",
                )
                .await
                .map_err(PipelineError::Store)?;
        }

        // Segments are transcribed one at a time, in order: assembly depends
        // on ordering, and this bounds concurrent load on the service.
        let total = segment_paths.len();
        let mut fragments = Vec::with_capacity(total);
        for (index, segment) in segment_paths.iter().enumerate() {
            let progress = 10 + ((index * 60) / total) as u8;
            self.update(
                job_id,
                progress,
                &format!("Transcribing chunk {}/{}...", index + 1, total),
            )
            .await;

            let data = tokio::fs::read(segment).await?;
            let text = self
                .engine
                .transcribe(&data, &artifact::segment_filename(index))
                .await
                .map_err(PipelineError::Transcription)?;
            fragments.push(text);
        }

        let raw = assemble_raw_transcript(&fragments);
        self.store
            .put(
                job_id,
                artifact::RAW_TRANSCRIPT,
                raw.clone().into(),
                "text/plain; charset=utf-8",
            )
            .await
            .map_err(PipelineError::Store)?;

        self.update(job_id, 85, "Cleaning transcript...").await;
        let cleaned_raw = self
            .cleanup
            .clean(&raw)
            .await
            .map_err(PipelineError::Cleanup)?;
        let cleaned = strip_code_fences(&cleaned_raw);
        self.store
            .put(
                job_id,
                artifact::CLEANED_MARKDOWN,
                cleaned.clone().into(),
                "text/markdown; charset=utf-8",
            )
            .await
            .map_err(PipelineError::Store)?;

        self.registry
            .update(
                job_id,
                JobPatch {
                    status: Some(JobStatus::Completed),
                    progress: Some(100),
                    message: Some("Done".to_string()),
                    result: Some(cleaned),
                },
            )
            .await;
        Ok(())
    }

    async fn update(&self, job_id: JobId, progress: u8, message: &str) {
        self.registry
            .update(
                job_id,
                JobPatch {
                    status: Some(JobStatus::Processing),
                    progress: Some(progress),
                    message: Some(message.to_string()),
                    ..Default::default()
                },
            )
            .await;
    }

    async fn message(&self, job_id: JobId, message: &str) {
        self.registry
            .update(
                job_id,
                JobPatch {
                    message: Some(message.to_string()),
                    ..Default::default()
                },
            )
            .await;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("media analysis: {0}")]
    MediaAnalysis(TranscoderError),
    #[error("audio transcode: {0}")]
    Transcode(TranscoderError),
    #[error("audio split: {0}")]
    Split(TranscoderError),
    #[error("no segments produced")]
    NoSegments,
    #[error("transcription: {0}")]
    Transcription(TranscriptionError),
    #[error("transcript cleanup: {0}")]
    Cleanup(CleanupError),
    #[error("artifact store: {0}")]
    Store(ArtifactStoreError),
    #[error("encode job metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("workspace io: {0}")]
    Io(#[from] std::io::Error),
}
