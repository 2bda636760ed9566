use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::JobId;

/// Storage capability for job artifacts, keyed by job id and artifact name.
///
/// Two variants exist: an ephemeral in-process store and a durable
/// prefix-addressed object store. The backend is selected once at
/// composition time; callers never branch on which one they hold.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(
        &self,
        job_id: JobId,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ArtifactStoreError>;

    async fn get_text(&self, job_id: JobId, name: &str) -> Result<String, ArtifactStoreError>;

    /// Fetch and parse a JSON artifact. Returns `Ok(None)` when the stored
    /// bytes are not valid JSON.
    async fn get_json(
        &self,
        job_id: JobId,
        name: &str,
    ) -> Result<Option<serde_json::Value>, ArtifactStoreError>;

    async fn exists(&self, job_id: JobId, name: &str) -> Result<bool, ArtifactStoreError>;

    /// Ids of all jobs known to the store.
    async fn list_job_ids(&self) -> Result<Vec<JobId>, ArtifactStoreError>;

    /// Delete every artifact under the job's prefix. Idempotent; returns
    /// the number of artifacts removed.
    async fn delete_prefix(&self, job_id: JobId) -> Result<usize, ArtifactStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactStoreError {
    #[error("store configuration: {0}")]
    Configuration(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("list failed: {0}")]
    ListFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
