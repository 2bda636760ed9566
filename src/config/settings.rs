use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub openai: OpenAiSettings,
    pub chunking: ChunkingSettings,
}

/// Durable object storage configuration. An absent bucket selects the
/// ephemeral in-process store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint: Option<String>,
}

impl StorageSettings {
    pub fn is_durable(&self) -> bool {
        self.bucket.as_deref().is_some_and(|b| !b.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub transcribe_model: String,
    pub cleanup_model: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            transcribe_model: "gpt-4o-transcribe".to_string(),
            cleanup_model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Ceilings the chunk planner works against.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChunkingSettings {
    pub bitrate_kbps: u32,
    pub max_chunk_mb: u64,
    pub max_duration_sec: u64,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            bitrate_kbps: 48,
            max_chunk_mb: 24,
            max_duration_sec: 1400,
        }
    }
}

impl Settings {
    /// Load settings from the environment, reading a `.env` file first if
    /// one is present. Unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = ChunkingSettings::default();
        let openai_defaults = OpenAiSettings::default();
        Self {
            storage: StorageSettings {
                bucket: var("S3_BUCKET"),
                region: var("AWS_REGION"),
                access_key_id: var("AWS_ACCESS_KEY_ID"),
                secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
                endpoint: var("S3_ENDPOINT"),
            },
            openai: OpenAiSettings {
                api_key: var("OPENAI_API_KEY"),
                base_url: var("OPENAI_BASE_URL").unwrap_or(openai_defaults.base_url),
                transcribe_model: var("OPENAI_TRANSCRIBE_MODEL")
                    .unwrap_or(openai_defaults.transcribe_model),
                cleanup_model: var("OPENAI_CLEANUP_MODEL").unwrap_or(openai_defaults.cleanup_model),
            },
            chunking: ChunkingSettings {
                bitrate_kbps: parsed("TRANSCRIBE_AUDIO_BITRATE_KBPS", defaults.bitrate_kbps),
                max_chunk_mb: parsed("TRANSCRIBE_MAX_CHUNK_MB", defaults.max_chunk_mb),
                max_duration_sec: parsed("TRANSCRIBE_MAX_DURATION_SEC", defaults.max_duration_sec),
            },
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    var(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}
