use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::application::ports::{MediaProbe, MediaTranscoder, TranscoderError};

const AUDIO_FILENAME: &str = "audio.mp3";
const SEGMENT_DIR: &str = "segments";
const SEGMENT_PATTERN: &str = "part-%03d.mp3";

/// Media transcoder shelling out to ffmpeg/ffprobe. Both binaries must be
/// on PATH; the output files land next to their inputs.
pub struct FfmpegTranscoder {
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
}

#[async_trait]
impl MediaTranscoder for FfmpegTranscoder {
    async fn probe(&self, path: &Path) -> Result<MediaProbe, TranscoderError> {
        let output = Command::new(&self.ffprobe_bin)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output()
            .await?;
        if !output.status.success() {
            return Err(TranscoderError::ProbeFailed(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr),
            )));
        }

        let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| TranscoderError::ProbeFailed(format!("parse ffprobe output: {}", e)))?;
        let duration_sec = parsed
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);
        let has_video_stream = parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("video"));

        Ok(MediaProbe {
            duration_sec,
            has_video_stream,
        })
    }

    async fn transcode(
        &self,
        src: &Path,
        target_bitrate_kbps: u32,
    ) -> Result<PathBuf, TranscoderError> {
        let audio_path = src.with_file_name(AUDIO_FILENAME);
        tracing::debug!(
            src = %src.display(),
            bitrate_kbps = target_bitrate_kbps,
            "Transcoding to mono 16 kHz mp3"
        );

        let output = Command::new(&self.ffmpeg_bin)
            .arg("-y")
            .arg("-i")
            .arg(src)
            .args(["-vn", "-ac", "1", "-ar", "16000", "-b:a"])
            .arg(format!("{}k", target_bitrate_kbps))
            .arg(&audio_path)
            .output()
            .await?;
        if !output.status.success() {
            return Err(TranscoderError::TranscodeFailed(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr),
            )));
        }

        Ok(audio_path)
    }

    async fn segment(
        &self,
        audio: &Path,
        segment_duration_sec: u64,
    ) -> Result<Vec<PathBuf>, TranscoderError> {
        let segments_dir = audio
            .parent()
            .map(|parent| parent.join(SEGMENT_DIR))
            .ok_or_else(|| {
                TranscoderError::SegmentFailed("audio path has no parent directory".to_string())
            })?;
        tokio::fs::create_dir_all(&segments_dir).await?;

        let output = Command::new(&self.ffmpeg_bin)
            .arg("-y")
            .arg("-i")
            .arg(audio)
            .args(["-f", "segment", "-segment_time"])
            .arg(segment_duration_sec.to_string())
            .args(["-reset_timestamps", "1", "-c", "copy"])
            .arg(segments_dir.join(SEGMENT_PATTERN))
            .output()
            .await?;
        if !output.status.success() {
            return Err(TranscoderError::SegmentFailed(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr),
            )));
        }

        let mut parts = Vec::new();
        let mut entries = tokio::fs::read_dir(&segments_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().starts_with("part-") {
                parts.push(entry.path());
            }
        }
        parts.sort();

        tracing::debug!(segments = parts.len(), "Audio split into segments");
        Ok(parts)
    }
}
