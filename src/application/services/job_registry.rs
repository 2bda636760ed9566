use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{Job, JobId, JobStatus};

/// Partial update applied to a job. Absent fields are left untouched.
#[derive(Debug, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub message: Option<String>,
    pub result: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("job already exists: {0}")]
    DuplicateId(JobId),
}

/// Concurrent-safe in-process job map, the single source of truth for live
/// job status. One instance is shared by reference between the pipelines
/// and the upward-facing service.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, job: Job) -> Result<(), RegistryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RegistryError::DuplicateId(job.id));
        }
        jobs.insert(job.id, job);
        Ok(())
    }

    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Merge a patch into a job and stamp `updated_at`. No-op for unknown
    /// ids and for jobs already in a terminal state; progress never moves
    /// backwards.
    pub async fn update(&self, id: JobId, patch: JobPatch) {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&id) else {
            return;
        };
        if job.status.is_terminal() {
            return;
        }
        if let Some(status) = patch.status {
            job.status = status;
        }
        if let Some(progress) = patch.progress {
            job.progress = job.progress.max(progress);
        }
        if let Some(message) = patch.message {
            job.message = message;
        }
        if let Some(result) = patch.result {
            job.result = Some(result);
        }
        job.updated_at = Utc::now();
    }

    /// All jobs, newest first.
    pub async fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    pub async fn delete(&self, id: JobId) -> bool {
        self.jobs.write().await.remove(&id).is_some()
    }
}
