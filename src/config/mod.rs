mod settings;

pub use settings::{ChunkingSettings, OpenAiSettings, Settings, StorageSettings};
