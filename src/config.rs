//! Configuration management for the voicechat relay
//!
//! All engine paths and tunables live in one [`Config`] built at startup and
//! handed to the adapter constructors; nothing reads scattered globals.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Relay configuration, loaded from a TOML file with env overrides
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Speech recognizer configuration
    pub stt: SttConfig,

    /// Language model configuration
    pub llm: LlmConfig,

    /// Speech synthesizer configuration
    pub tts: TtsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Web-servable directory for published audio artifacts
    pub audio_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            audio_dir: PathBuf::from("temp_audio"),
        }
    }
}

/// Speech recognizer (whisper.cpp CLI) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SttConfig {
    /// Recognizer binary
    pub binary: PathBuf,

    /// Recognizer model file
    pub model: PathBuf,

    /// Deadline for one recognition run, in seconds
    pub timeout_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("whisper-cli"),
            model: PathBuf::from("models/ggml-tiny.bin"),
            timeout_secs: 120,
        }
    }
}

/// Language model (OpenAI-compatible chat API) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Base URL of the chat completions API
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// API key; `LLM_API_KEY` env overrides the file value
    pub api_key: Option<String>,

    /// Optional system prompt prepended to every request
    pub system_prompt: Option<String>,

    /// Request deadline, in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            system_prompt: None,
            timeout_secs: 60,
        }
    }
}

/// Speech synthesizer (Coqui TTS CLI) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TtsConfig {
    /// Synthesizer binary
    pub binary: PathBuf,

    /// Synthesizer model checkpoint
    pub model: PathBuf,

    /// Synthesizer model configuration file
    pub config: PathBuf,

    /// Speaker identity passed to the synthesizer
    pub speaker: String,

    /// Deadline for one synthesis run, in seconds
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tts"),
            model: PathBuf::from("coqui_utils/checkpoint_1260000-inference.pth"),
            config: PathBuf::from("coqui_utils/config.json"),
            speaker: "wibowo".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location
    ///
    /// A missing file yields the built-in defaults. `LLM_API_KEY` in the
    /// environment always wins over the file value.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let config: Self = toml::from_str(&raw)?;
            tracing::debug!(path = %path.display(), "loaded configuration file");
            config
        } else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            Self::default()
        };

        if let Ok(key) = std::env::var("LLM_API_KEY")
            && !key.is_empty()
        {
            config.llm.api_key = Some(key);
        }

        Ok(config)
    }

    /// Default configuration file location
    ///
    /// # Errors
    ///
    /// Returns error if no home directory can be determined
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "voicechat-relay")
            .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

impl SttConfig {
    /// Recognition deadline as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LlmConfig {
    /// Request deadline as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TtsConfig {
    /// Synthesis deadline as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
