mod job_registry;
mod job_service;
mod pipeline;
mod transcript;

pub use job_registry::{JobPatch, JobRegistry, RegistryError};
pub use job_service::{JobService, JobSnapshot, JobSummary};
pub use pipeline::{PipelineError, SubmittedMedia, TranscriptionPipeline};
pub use transcript::{assemble_raw_transcript, strip_code_fences};
