mod artifact_store;
mod cleanup;
mod media_transcoder;
mod transcription;

pub use artifact_store::{ArtifactStore, ArtifactStoreError};
pub use cleanup::{CleanupError, TranscriptCleanup};
pub use media_transcoder::{MediaProbe, MediaTranscoder, TranscoderError};
pub use transcription::{TranscriptionEngine, TranscriptionError};
