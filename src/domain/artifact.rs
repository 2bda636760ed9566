//! Artifact key namespace. Every artifact a job produces lives under the
//! `jobs/<id>/` prefix so a whole job can be deleted by prefix.

use super::JobId;

pub const META_JSON: &str = "meta.json";
pub const RAW_TRANSCRIPT: &str = "raw.txt";
pub const CLEANED_MARKDOWN: &str = "cleaned.md";

pub fn job_prefix(job_id: JobId) -> String {
    format!("jobs/{}/", job_id)
}

pub fn job_key(job_id: JobId, name: &str) -> String {
    format!("{}{}", job_prefix(job_id), name)
}

pub fn segment_name(index: usize) -> String {
    format!("segments/{}", segment_filename(index))
}

/// Zero-padded segment filename, matching the segmenter's output pattern.
pub fn segment_filename(index: usize) -> String {
    format!("part-{:03}.mp3", index)
}

pub fn original_name(filename: &str) -> String {
    format!("original/{}", filename)
}
