use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{ArtifactStore, ArtifactStoreError};
use crate::application::services::{JobPatch, JobRegistry};
use crate::domain::{JobId, artifact};

/// Ephemeral artifact store, backed only by the `result` field of the
/// in-process job records. Everything except the final transcript is
/// dropped, and nothing survives a restart.
pub struct EphemeralArtifactStore {
    registry: Arc<JobRegistry>,
}

impl EphemeralArtifactStore {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait::async_trait]
impl ArtifactStore for EphemeralArtifactStore {
    async fn put(
        &self,
        job_id: JobId,
        name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), ArtifactStoreError> {
        if name != artifact::CLEANED_MARKDOWN {
            return Ok(());
        }
        let markdown = String::from_utf8(data.to_vec())
            .map_err(|e| ArtifactStoreError::UploadFailed(e.to_string()))?;
        self.registry
            .update(
                job_id,
                JobPatch {
                    result: Some(markdown),
                    ..Default::default()
                },
            )
            .await;
        Ok(())
    }

    async fn get_text(&self, job_id: JobId, name: &str) -> Result<String, ArtifactStoreError> {
        if name == artifact::CLEANED_MARKDOWN {
            if let Some(result) = self.registry.get(job_id).await.and_then(|job| job.result) {
                return Ok(result);
            }
        }
        Err(ArtifactStoreError::NotFound(artifact::job_key(
            job_id, name,
        )))
    }

    async fn get_json(
        &self,
        _job_id: JobId,
        _name: &str,
    ) -> Result<Option<serde_json::Value>, ArtifactStoreError> {
        Ok(None)
    }

    async fn exists(&self, job_id: JobId, name: &str) -> Result<bool, ArtifactStoreError> {
        if name != artifact::CLEANED_MARKDOWN {
            return Ok(false);
        }
        Ok(self
            .registry
            .get(job_id)
            .await
            .is_some_and(|job| job.result.is_some()))
    }

    async fn list_job_ids(&self) -> Result<Vec<JobId>, ArtifactStoreError> {
        Ok(self
            .registry
            .list()
            .await
            .into_iter()
            .map(|job| job.id)
            .collect())
    }

    async fn delete_prefix(&self, job_id: JobId) -> Result<usize, ArtifactStoreError> {
        let had_result = self
            .registry
            .get(job_id)
            .await
            .is_some_and(|job| job.result.is_some());
        Ok(usize::from(had_result))
    }
}
