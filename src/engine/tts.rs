//! Text-to-speech via the Coqui TTS CLI

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use uuid::Uuid;

use super::SpeechSynthesizer;
use crate::config::TtsConfig;
use crate::{Error, Result};

/// Synthesizer adapter backed by the `tts` command
///
/// Output files land in the OS temp directory under a fresh unique name;
/// the caller owns them afterwards. The adapter does not serialize
/// invocations: every run writes to its own output path, so concurrent
/// calls only conflict if the engine itself keeps shared state.
pub struct CoquiCli {
    config: TtsConfig,
}

impl CoquiCli {
    /// Create a synthesizer adapter from configuration
    #[must_use]
    pub const fn new(config: TtsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SpeechSynthesizer for CoquiCli {
    async fn synthesize(&self, text: &str) -> Result<PathBuf> {
        // Fast-fail before spawning anything
        if !self.config.model.exists() {
            return Err(Error::Tts(format!(
                "TTS model not found at {}",
                self.config.model.display()
            )));
        }
        if !self.config.config.exists() {
            return Err(Error::Tts(format!(
                "TTS config not found at {}",
                self.config.config.display()
            )));
        }

        let out_path = std::env::temp_dir().join(format!("tts_{}.wav", Uuid::new_v4()));

        tracing::debug!(
            binary = %self.config.binary.display(),
            speaker = %self.config.speaker,
            chars = text.len(),
            "starting synthesis"
        );

        let mut command = Command::new(&self.config.binary);
        command
            .arg("--text")
            .arg(text)
            .arg("--model_path")
            .arg(&self.config.model)
            .arg("--config_path")
            .arg(&self.config.config)
            .arg("--speaker_idx")
            .arg(&self.config.speaker)
            .arg("--out_path")
            .arg(&out_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.config.timeout(), command.output())
            .await
            .map_err(|_| Error::Timeout {
                stage: "synthesizer",
                secs: self.config.timeout_secs,
            })?
            .map_err(|e| Error::Tts(format!("failed to run synthesizer: {e}")))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Tts(format!(
                "synthesizer exited with code {code}: {}",
                stderr.trim()
            )));
        }

        let non_empty = tokio::fs::metadata(&out_path)
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if !non_empty {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Tts(format!(
                "synthesizer output missing or empty: {}",
                stderr.trim()
            )));
        }

        tracing::info!(path = %out_path.display(), "synthesis complete");
        Ok(out_path)
    }
}
