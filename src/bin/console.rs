//! Console client for the voicechat relay
//!
//! Records from the microphone, posts the clip to the relay, prints the
//! conversation, and plays the spoken reply.

use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use voicechat_relay::audio::{AudioCapture, AudioPlayback, SAMPLE_RATE, samples_to_wav, wav_to_samples};

/// Console client for the voicechat relay
#[derive(Parser)]
#[command(name = "voicechat-console", version, about)]
struct Cli {
    /// Relay base URL
    #[arg(long, env = "VOICECHAT_SERVER", default_value = "http://localhost:8000")]
    server: String,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Relay response for one turn
#[derive(Deserialize)]
struct ChatReply {
    transcription: String,
    response: String,
    audio_url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let server = cli.server.trim_end_matches('/').to_string();
    let client = reqwest::Client::new();
    let mut capture = AudioCapture::new()?;

    // (user utterance, assistant reply) turns; in-memory only
    let mut log: Vec<(String, String)> = Vec::new();

    println!("Voicechat console - talking to {server}");
    println!("[Enter] start/stop recording, 'log' show conversation, 'clear' reset, 'quit' exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut recording = false;

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "quit" | "exit" => break,
            "clear" => {
                log.clear();
                println!("(conversation cleared)");
            }
            "log" => {
                if log.is_empty() {
                    println!("(no conversation yet)");
                }
                for (user, assistant) in &log {
                    println!("You: {user}");
                    println!("Assistant: {assistant}");
                }
            }
            "" if !recording => {
                capture.start()?;
                recording = true;
                println!("Recording... press Enter to stop.");
            }
            "" => {
                capture.stop();
                recording = false;

                let samples = capture.take_buffer();
                if samples.is_empty() {
                    println!("(no audio captured)");
                    continue;
                }

                match chat_turn(&client, &server, &samples).await {
                    Ok(reply) => {
                        println!("You: {}", reply.transcription);
                        println!("Assistant: {}", reply.response);
                        log.push((reply.transcription.clone(), reply.response.clone()));

                        if let Err(e) = play_reply(&client, &server, &reply.audio_url).await {
                            eprintln!("(playback failed: {e})");
                        }
                    }
                    Err(e) => {
                        let detail = format!("{e}");
                        eprintln!("Error: {detail}");
                        log.push(("Error occurred".to_string(), detail));
                    }
                }
            }
            other => println!("unknown command: {other}"),
        }
    }

    Ok(())
}

/// Send one recorded utterance through the relay
async fn chat_turn(
    client: &reqwest::Client,
    server: &str,
    samples: &[f32],
) -> anyhow::Result<ChatReply> {
    let wav = samples_to_wav(samples, SAMPLE_RATE)?;

    let part = reqwest::multipart::Part::bytes(wav)
        .file_name("voice.wav")
        .mime_str("audio/wav")?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = client
        .post(format!("{server}/voice-chat"))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("{status} - {body}");
    }

    Ok(response.json().await?)
}

/// Fetch the published reply audio and play it
async fn play_reply(client: &reqwest::Client, server: &str, audio_url: &str) -> anyhow::Result<()> {
    let bytes = client
        .get(format!("{server}{audio_url}"))
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let (samples, rate) = wav_to_samples(&bytes)?;

    // cpal playback blocks; keep it off the async runtime
    tokio::task::spawn_blocking(move || -> voicechat_relay::Result<()> {
        AudioPlayback::new(rate)?.play(samples)
    })
    .await??;

    Ok(())
}
