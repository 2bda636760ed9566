use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as StorePath;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload};
use uuid::Uuid;

use crate::application::ports::{ArtifactStore, ArtifactStoreError};
use crate::config::StorageSettings;
use crate::domain::{JobId, artifact};

const JOBS_ROOT: &str = "jobs";

/// Durable artifact store over an S3 bucket. Keys follow the
/// `jobs/<id>/<name>` layout so one prefix holds everything a job produced.
pub struct S3ArtifactStore {
    inner: Arc<dyn ObjectStore>,
}

impl S3ArtifactStore {
    pub fn new(settings: &StorageSettings) -> Result<Self, ArtifactStoreError> {
        let bucket = settings
            .bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ArtifactStoreError::Configuration("bucket is required".to_string()))?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = settings.region.as_deref() {
            builder = builder.with_region(region);
        }
        if let Some(access_key_id) = settings.access_key_id.as_deref() {
            builder = builder.with_access_key_id(access_key_id);
        }
        if let Some(secret) = settings.secret_access_key.as_deref() {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(endpoint) = settings.endpoint.as_deref() {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }
        let store = builder
            .build()
            .map_err(|e| ArtifactStoreError::Configuration(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(store),
        })
    }

    fn key(job_id: JobId, name: &str) -> StorePath {
        StorePath::from(artifact::job_key(job_id, name))
    }
}

#[async_trait::async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(
        &self,
        job_id: JobId,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ArtifactStoreError> {
        let path = Self::key(job_id, name);
        let opts = PutOptions {
            attributes: Attributes::from_iter([(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            )]),
            ..Default::default()
        };
        self.inner
            .put_opts(&path, PutPayload::from(data), opts)
            .await
            .map_err(|e| ArtifactStoreError::UploadFailed(e.to_string()))?;
        Ok(())
    }

    async fn get_text(&self, job_id: JobId, name: &str) -> Result<String, ArtifactStoreError> {
        let path = Self::key(job_id, name);
        let result = self.inner.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => {
                ArtifactStoreError::NotFound(path.to_string())
            }
            other => ArtifactStoreError::DownloadFailed(other.to_string()),
        })?;
        let bytes = result
            .bytes()
            .await
            .map_err(|e| ArtifactStoreError::DownloadFailed(e.to_string()))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ArtifactStoreError::DownloadFailed(e.to_string()))
    }

    async fn get_json(
        &self,
        job_id: JobId,
        name: &str,
    ) -> Result<Option<serde_json::Value>, ArtifactStoreError> {
        let text = self.get_text(job_id, name).await?;
        Ok(serde_json::from_str(&text).ok())
    }

    async fn exists(&self, job_id: JobId, name: &str) -> Result<bool, ArtifactStoreError> {
        let path = Self::key(job_id, name);
        match self.inner.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(ArtifactStoreError::DownloadFailed(e.to_string())),
        }
    }

    async fn list_job_ids(&self) -> Result<Vec<JobId>, ArtifactStoreError> {
        let prefix = StorePath::from(JOBS_ROOT);
        let mut stream = self.inner.list(Some(&prefix));
        let mut ids = HashSet::new();
        while let Some(entry) = stream.next().await {
            let meta = entry.map_err(|e| ArtifactStoreError::ListFailed(e.to_string()))?;
            let mut parts = meta.location.parts();
            let root = parts.next();
            let id_part = parts.next();
            if let (Some(root), Some(id_part)) = (root, id_part) {
                if root.as_ref() == JOBS_ROOT {
                    if let Ok(uuid) = Uuid::parse_str(id_part.as_ref()) {
                        ids.insert(JobId::from_uuid(uuid));
                    }
                }
            }
        }
        Ok(ids.into_iter().collect())
    }

    async fn delete_prefix(&self, job_id: JobId) -> Result<usize, ArtifactStoreError> {
        let prefix = StorePath::from(artifact::job_prefix(job_id));
        let locations = self
            .inner
            .list(Some(&prefix))
            .map_ok(|meta| meta.location)
            .boxed();

        let mut deleted = 0usize;
        let mut results = self.inner.delete_stream(locations);
        while let Some(result) = results.next().await {
            match result {
                Ok(_) => deleted += 1,
                // Already gone is fine: deletion is idempotent.
                Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(ArtifactStoreError::DeleteFailed(e.to_string())),
            }
        }
        Ok(deleted)
    }
}
