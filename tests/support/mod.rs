#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use murmur::application::ports::{
    ArtifactStore, ArtifactStoreError, CleanupError, MediaProbe, MediaTranscoder, TranscoderError,
    TranscriptCleanup, TranscriptionEngine, TranscriptionError,
};
use murmur::application::services::{JobRegistry, JobService};
use murmur::config::ChunkingSettings;
use murmur::domain::{Job, JobId, artifact};

/// Transcoder double that fabricates files instead of shelling out.
pub struct StubTranscoder {
    pub duration_sec: f64,
    pub has_video: bool,
    pub fail_probe: bool,
}

impl StubTranscoder {
    pub fn with_duration(duration_sec: f64) -> Self {
        Self {
            duration_sec,
            has_video: false,
            fail_probe: false,
        }
    }
}

#[async_trait]
impl MediaTranscoder for StubTranscoder {
    async fn probe(&self, _path: &Path) -> Result<MediaProbe, TranscoderError> {
        if self.fail_probe {
            return Err(TranscoderError::ProbeFailed("no such stream".to_string()));
        }
        Ok(MediaProbe {
            duration_sec: self.duration_sec,
            has_video_stream: self.has_video,
        })
    }

    async fn transcode(
        &self,
        src: &Path,
        _target_bitrate_kbps: u32,
    ) -> Result<PathBuf, TranscoderError> {
        let audio = src.with_file_name("audio.mp3");
        tokio::fs::write(&audio, b"stub audio").await?;
        Ok(audio)
    }

    async fn segment(
        &self,
        audio: &Path,
        segment_duration_sec: u64,
    ) -> Result<Vec<PathBuf>, TranscoderError> {
        let dir = audio
            .parent()
            .map(|p| p.join("segments"))
            .ok_or_else(|| TranscoderError::SegmentFailed("no parent".to_string()))?;
        tokio::fs::create_dir_all(&dir).await?;

        let count = (self.duration_sec / segment_duration_sec as f64).ceil().max(1.0) as usize;
        let mut paths = Vec::with_capacity(count);
        for index in 0..count {
            let path = dir.join(format!("part-{:03}.mp3", index));
            tokio::fs::write(&path, format!("segment {}", index)).await?;
            paths.push(path);
        }
        Ok(paths)
    }
}

/// Engine double that echoes the segment filename it was given, optionally
/// failing on the nth call.
pub struct EchoEngine {
    pub fail_on_call: Option<usize>,
    calls: AtomicUsize,
}

impl EchoEngine {
    pub fn new() -> Self {
        Self {
            fail_on_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for EchoEngine {
    async fn transcribe(
        &self,
        _audio_data: &[u8],
        filename: &str,
    ) -> Result<String, TranscriptionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(TranscriptionError::ApiRequestFailed(
                "status 500: engine exploded".to_string(),
            ));
        }
        Ok(format!("transcript of {}", filename))
    }
}

/// Cleanup double that wraps its input in a Markdown fence, the way a model
/// that ignores instructions would.
pub struct FencingCleanup;

#[async_trait]
impl TranscriptCleanup for FencingCleanup {
    async fn clean(&self, raw_transcript: &str) -> Result<String, CleanupError> {
        Ok(format!("```markdown\n{}\n```", raw_transcript))
    }
}

/// In-memory stand-in for the durable backend: a keyed byte map with the
/// same prefix semantics as the real object store.
#[derive(Default)]
pub struct FakeDurableStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl FakeDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, job_id: JobId, name: &str, data: &str) {
        self.objects
            .lock()
            .await
            .insert(artifact::job_key(job_id, name), Bytes::from(data.to_string()));
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ArtifactStore for FakeDurableStore {
    async fn put(
        &self,
        job_id: JobId,
        name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), ArtifactStoreError> {
        self.objects
            .lock()
            .await
            .insert(artifact::job_key(job_id, name), data);
        Ok(())
    }

    async fn get_text(&self, job_id: JobId, name: &str) -> Result<String, ArtifactStoreError> {
        let key = artifact::job_key(job_id, name);
        let objects = self.objects.lock().await;
        let data = objects
            .get(&key)
            .ok_or_else(|| ArtifactStoreError::NotFound(key.clone()))?;
        String::from_utf8(data.to_vec())
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
        let key = artifact::job_key(job_id, name);
        Ok(self.objects.lock().await.contains_key(&key))
    }

    async fn list_job_ids(&self) -> Result<Vec<JobId>, ArtifactStoreError> {
        let objects = self.objects.lock().await;
        let mut ids = Vec::new();
        for key in objects.keys() {
            let mut parts = key.split('/');
            if parts.next() == Some("jobs") {
                if let Some(id) = parts.next().and_then(|raw| raw.parse::<JobId>().ok()) {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
        Ok(ids)
    }

    async fn delete_prefix(&self, job_id: JobId) -> Result<usize, ArtifactStoreError> {
        let prefix = artifact::job_prefix(job_id);
        let mut objects = self.objects.lock().await;
        let doomed: Vec<String> = objects
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in &doomed {
            objects.remove(key);
        }
        Ok(doomed.len())
    }
}

pub fn test_chunking() -> ChunkingSettings {
    ChunkingSettings::default()
}

pub fn build_service(
    registry: Arc<JobRegistry>,
    store: Arc<dyn ArtifactStore>,
    transcoder: Arc<dyn MediaTranscoder>,
    engine: Arc<dyn TranscriptionEngine>,
    cleanup: Arc<dyn TranscriptCleanup>,
) -> JobService {
    JobService::new(registry, store, transcoder, engine, cleanup, test_chunking())
}

pub async fn wait_for_terminal(registry: &JobRegistry, job_id: JobId) -> Job {
    for _ in 0..500 {
        if let Some(job) = registry.get(job_id).await {
            if job.status.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {} did not reach a terminal state in time", job_id);
}
