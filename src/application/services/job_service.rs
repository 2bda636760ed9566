use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::ports::{
    ArtifactStore, ArtifactStoreError, MediaTranscoder, TranscriptCleanup, TranscriptionEngine,
};
use crate::application::services::transcript::strip_code_fences;
use crate::application::services::{JobRegistry, RegistryError, SubmittedMedia, TranscriptionPipeline};
use crate::config::ChunkingSettings;
use crate::domain::{Job, JobId, JobMetadata, JobStatus, artifact};

/// Point-in-time view of a job, safe to hand to a polling caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            progress: job.progress,
            message: job.message.clone(),
            created_at: Some(job.created_at),
            updated_at: Some(job.updated_at),
        }
    }

    /// Snapshot reconstructed from durable storage alone, after the
    /// in-process record was lost to a restart.
    fn recovered(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobStatus::Completed,
            progress: 100,
            message: "Done".to_string(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: JobId,
    pub display_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// The upward-facing contract of the core: submit a file, poll status,
/// fetch the result, list and delete jobs. This is everything the API
/// layer consumes.
pub struct JobService {
    registry: Arc<JobRegistry>,
    store: Arc<dyn ArtifactStore>,
    pipeline: Arc<TranscriptionPipeline>,
}

impl JobService {
    pub fn new(
        registry: Arc<JobRegistry>,
        store: Arc<dyn ArtifactStore>,
        transcoder: Arc<dyn MediaTranscoder>,
        engine: Arc<dyn TranscriptionEngine>,
        cleanup: Arc<dyn TranscriptCleanup>,
        chunking: ChunkingSettings,
    ) -> Self {
        let pipeline = Arc::new(TranscriptionPipeline::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            transcoder,
            engine,
            cleanup,
            chunking,
        ));
        Self {
            registry,
            store,
            pipeline,
        }
    }

    /// Create a job and spawn its pipeline as a fire-and-forget background
    /// task. Pipeline failures land on the job record, never here.
    pub async fn submit(
        &self,
        data: Bytes,
        original_filename: &str,
        mime_type: &str,
    ) -> Result<JobId, RegistryError> {
        let job = Job::new(original_filename);
        let job_id = job.id;
        self.registry.create(job).await?;

        let media = SubmittedMedia {
            data,
            original_filename: original_filename.to_string(),
            mime_type: mime_type.to_string(),
        };
        let pipeline = Arc::clone(&self.pipeline);
        tokio::spawn(async move {
            pipeline.run(job_id, media).await;
        });

        tracing::info!(job_id = %job_id, filename = %original_filename, "Transcription job submitted");
        Ok(job_id)
    }

    /// Latest known snapshot, or `None` for an id unknown to both the
    /// registry and the store. After a restart the registry is empty, so a
    /// durable final transcript is taken as proof of completion.
    pub async fn status(&self, job_id: JobId) -> Option<JobSnapshot> {
        if let Some(job) = self.registry.get(job_id).await {
            return Some(JobSnapshot::from_job(&job));
        }
        match self.store.exists(job_id, artifact::CLEANED_MARKDOWN).await {
            Ok(true) => Some(JobSnapshot::recovered(job_id)),
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Artifact lookup failed during status check");
                None
            }
        }
    }

    /// The cleaned Markdown transcript, or `None` when the job is unknown
    /// or not yet completed.
    pub async fn result(&self, job_id: JobId) -> Option<String> {
        match self.store.get_text(job_id, artifact::CLEANED_MARKDOWN).await {
            Ok(markdown) => Some(strip_code_fences(&markdown)),
            Err(ArtifactStoreError::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to fetch job result");
                None
            }
        }
    }

    /// Summaries of every known job, newest first: live registry entries
    /// merged with jobs only the store remembers. Missing or corrupt stored
    /// metadata degrades to the id as display name.
    pub async fn list(&self) -> Vec<JobSummary> {
        let mut summaries: Vec<JobSummary> = self
            .registry
            .list()
            .await
            .into_iter()
            .map(|job| JobSummary {
                job_id: job.id,
                display_name: job.display_name,
                created_at: Some(job.created_at),
            })
            .collect();
        let known: HashSet<JobId> = summaries.iter().map(|s| s.job_id).collect();

        match self.store.list_job_ids().await {
            Ok(ids) => {
                for job_id in ids.into_iter().filter(|id| !known.contains(id)) {
                    let meta = self
                        .store
                        .get_json(job_id, artifact::META_JSON)
                        .await
                        .ok()
                        .flatten()
                        .and_then(|value| serde_json::from_value::<JobMetadata>(value).ok());
                    summaries.push(JobSummary {
                        job_id,
                        display_name: meta
                            .as_ref()
                            .map(|m| m.display_name.clone())
                            .filter(|name| !name.is_empty())
                            .unwrap_or_else(|| job_id.to_string()),
                        created_at: meta.map(|m| m.created_at),
                    });
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list stored jobs");
            }
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Remove the job's artifacts and registry entry. Returns the number of
    /// artifacts deleted; deleting an unknown id is not an error.
    pub async fn delete(&self, job_id: JobId) -> Result<usize, ArtifactStoreError> {
        let deleted = self.store.delete_prefix(job_id).await?;
        self.registry.delete(job_id).await;
        tracing::info!(job_id = %job_id, artifacts_deleted = deleted, "Job deleted");
        Ok(deleted)
    }
}
