use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voicechat_relay::Config;
use voicechat_relay::api::{ApiServer, ApiState, maintenance};
use voicechat_relay::engine::{
    ChatCompletions, CoquiCli, SpeechSynthesizer, SpeechToText, WhisperCli,
};

/// Voicechat relay - voice in, spoken reply out
#[derive(Parser)]
#[command(name = "voicechat", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "VOICECHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(long, env = "VOICECHAT_PORT")]
    port: Option<u16>,

    /// Directory for published audio (overrides the config file)
    #[arg(long, env = "VOICECHAT_AUDIO_DIR")]
    audio_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe an audio file through the recognizer and print the text
    Transcribe {
        /// Audio file (.wav, .mp3 or .m4a)
        file: PathBuf,
    },
    /// Synthesize text through the synthesizer and print the output path
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Delete published audio older than the threshold
    Sweep {
        /// Age threshold in hours
        #[arg(long, default_value = "24")]
        max_age_hours: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voicechat_relay=info",
        1 => "info,voicechat_relay=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = cli.audio_dir {
        config.server.audio_dir = dir;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Transcribe { file } => cmd_transcribe(&config, &file).await,
            Command::Say { text } => cmd_say(&config, &text).await,
            Command::Sweep { max_age_hours } => cmd_sweep(&config, max_age_hours),
        };
    }

    tracing::info!(
        port = config.server.port,
        audio_dir = %config.server.audio_dir.display(),
        "starting voicechat relay"
    );

    let state = Arc::new(ApiState {
        stt: Arc::new(WhisperCli::new(config.stt.clone())),
        llm: Arc::new(ChatCompletions::new(config.llm.clone())?),
        tts: Arc::new(CoquiCli::new(config.tts.clone())),
        audio_dir: config.server.audio_dir.clone(),
    });

    ApiServer::new(state, config.server.port).run().await?;

    Ok(())
}

/// Run a single file through the recognizer
async fn cmd_transcribe(config: &Config, file: &PathBuf) -> anyhow::Result<()> {
    let audio = std::fs::read(file)?;
    let extension = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .ok_or_else(|| anyhow::anyhow!("file has no extension: {}", file.display()))?;

    let stt = WhisperCli::new(config.stt.clone());
    let text = stt.transcribe(&audio, &extension).await?;
    println!("{}", text.trim());

    Ok(())
}

/// Run text through the synthesizer
async fn cmd_say(config: &Config, text: &str) -> anyhow::Result<()> {
    let tts = CoquiCli::new(config.tts.clone());
    let path = tts.synthesize(text).await?;
    println!("{}", path.display());

    Ok(())
}

/// Sweep the published audio directory once
fn cmd_sweep(config: &Config, max_age_hours: u64) -> anyhow::Result<()> {
    let deleted = maintenance::sweep(&config.server.audio_dir, max_age_hours)?;
    println!("Deleted {deleted} old audio files");

    Ok(())
}
