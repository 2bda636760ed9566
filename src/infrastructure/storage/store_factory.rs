use std::sync::Arc;

use crate::application::ports::{ArtifactStore, ArtifactStoreError};
use crate::application::services::JobRegistry;
use crate::config::StorageSettings;

use super::memory_store::EphemeralArtifactStore;
use super::s3_store::S3ArtifactStore;

/// Selects the artifact store backend once, at composition time: durable S3
/// when a bucket is configured, the in-process store otherwise.
pub struct ArtifactStoreFactory;

impl ArtifactStoreFactory {
    pub fn create(
        settings: &StorageSettings,
        registry: Arc<JobRegistry>,
    ) -> Result<Arc<dyn ArtifactStore>, ArtifactStoreError> {
        if settings.is_durable() {
            let store = S3ArtifactStore::new(settings)?;
            Ok(Arc::new(store))
        } else {
            tracing::info!("No storage bucket configured, using in-process artifact store");
            Ok(Arc::new(EphemeralArtifactStore::new(registry)))
        }
    }
}
