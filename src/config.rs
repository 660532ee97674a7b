use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the clipscribe pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Batch processing settings
    pub processing: ProcessingConfig,

    /// Audio extraction and chunking settings
    pub audio: AudioConfig,

    /// Speech-to-text service settings
    pub transcription: TranscriptionConfig,

    /// Content generation settings
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Supported video file extensions
    pub supported_extensions: Vec<String>,

    /// Generate titles/description/tags/timestamps after transcription
    pub generate_details: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target audio container format
    pub audio_format: String,

    /// Chunk window length in milliseconds
    pub chunk_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Endpoint of the speech-to-text service
    pub api_endpoint: String,

    /// API key for the service
    pub api_key: Option<String>,

    /// Model to use for transcription
    pub model: String,

    /// Timeout for transcription requests (seconds)
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Endpoint of the chat-completions service
    pub api_endpoint: String,

    /// API key for the service
    pub api_key: Option<String>,

    /// Model to use for generation
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate per request
    pub max_tokens: u32,

    /// System persona sent with every generation request
    pub persona: String,
}

impl Config {
    /// Load configuration from an explicit file, or from the default locations
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let raw = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&raw)?;
            tracing::info!("📄 Loaded configuration from: {}", path.display());
            return Ok(config);
        }

        let config_paths = ["clipscribe.toml", "config/clipscribe.toml"];

        for candidate in &config_paths {
            if let Ok(raw) = std::fs::read_to_string(candidate) {
                match toml::from_str(&raw) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", candidate);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", candidate, e);
                    }
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.transcription.api_key = Some(api_key.clone());
            self.content.api_key = Some(api_key);
        }

        if let Ok(chunk_ms) = std::env::var("CLIPSCRIBE_CHUNK_MS") {
            if let Ok(ms) = chunk_ms.parse() {
                self.audio.chunk_duration_ms = ms;
            }
        }

        if let Ok(model) = std::env::var("CLIPSCRIBE_CONTENT_MODEL") {
            self.content.model = model;
        }
    }

    /// Validate configuration, checked at startup before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.transcription.api_key.is_none() {
            return Err(anyhow!(
                "OpenAI API key not found in environment variables. Please set 'OPENAI_API_KEY'."
            ));
        }

        if self.audio.chunk_duration_ms == 0 {
            return Err(anyhow!("chunk_duration_ms must be greater than 0"));
        }

        if self.processing.supported_extensions.is_empty() {
            return Err(anyhow!("at least one video extension must be configured"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig {
                supported_extensions: vec!["mp4".to_string()],
                generate_details: true,
            },
            audio: AudioConfig {
                audio_format: "mp3".to_string(),
                chunk_duration_ms: 30_000, // 30 second windows
            },
            transcription: TranscriptionConfig {
                api_endpoint: "https://api.openai.com/v1/audio/transcriptions".to_string(),
                api_key: None,
                model: "whisper-1".to_string(),
                timeout_seconds: 120,
            },
            content: ContentConfig {
                api_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                api_key: None,
                model: "gpt-4".to_string(),
                temperature: 0.7,
                max_tokens: 1500,
                persona: "You are a master class content creator.".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.transcription.api_key = Some(api_key.clone());
        self.config.content.api_key = Some(api_key);
        self
    }

    pub fn with_chunk_duration_ms(mut self, chunk_ms: u64) -> Self {
        self.config.audio.chunk_duration_ms = chunk_ms;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.processing.supported_extensions = extensions;
        self
    }

    pub fn generate_details(mut self, enable: bool) -> Self {
        self.config.processing.generate_details = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.audio.chunk_duration_ms, 30_000);
        assert_eq!(config.transcription.model, "whisper-1");
        assert_eq!(config.content.model, "gpt-4");
        assert!(config.processing.generate_details);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_api_key("sk-test".to_string())
            .with_chunk_duration_ms(10_000)
            .generate_details(false)
            .build();

        assert_eq!(config.transcription.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.content.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.audio.chunk_duration_ms, 10_000);
        assert!(!config.processing.generate_details);
    }

    #[test]
    fn test_validation_requires_api_key() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new()
            .with_api_key("sk-test".to_string())
            .build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_file_errors_surface() {
        // A missing explicit file is an error, not a silent default
        let missing = Path::new("/nonexistent/clipscribe.toml");
        assert!(Config::load(Some(missing)).is_err());

        // And so is an unparseable one
        let temp_dir = tempfile::TempDir::new().unwrap();
        let bad = temp_dir.path().join("clipscribe.toml");
        std::fs::write(&bad, "not = [valid").unwrap();
        assert!(Config::load(Some(&bad)).is_err());
    }

    #[test]
    fn test_validation_rejects_zero_chunk_window() {
        let config = ConfigBuilder::new()
            .with_api_key("sk-test".to_string())
            .with_chunk_duration_ms(0)
            .build();
        assert!(config.validate().is_err());
    }
}
