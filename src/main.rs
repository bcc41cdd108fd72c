use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use tts_timeline::logger::init_logger;
use tts_timeline::progress::LogProgressObserver;
use tts_timeline::{GeminiSynthesizer, TimelineConfig, TtsTimeline, VoiceName};

/// Озвучивание субтитров в одну дорожку
#[derive(Parser, Debug)]
#[command(name = "tts-timeline", version, about = "Render SRT subtitles into a single timed speech track")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize every subtitle and mix the speech into a WAV file
    Render {
        /// Input SRT file
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,

        /// Voice name (Puck, Charon, Kore, Fenrir, Zephyr)
        #[arg(long)]
        voice: Option<VoiceName>,

        /// Maximum number of concurrent synthesis requests
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,

        /// Path to JSON configuration file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// List available voices
    Voices,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    match cli.command {
        Commands::Voices => {
            for voice in VoiceName::all() {
                println!("{:<8} {}", voice.as_str(), voice.description());
            }
            Ok(())
        }
        Commands::Render {
            input,
            output,
            voice,
            concurrency,
            config,
        } => render(input, output, voice, concurrency, config).await,
    }
}

async fn render(
    input: PathBuf,
    output: PathBuf,
    voice: Option<VoiceName>,
    concurrency: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => TimelineConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TimelineConfig::default(),
    }
    .with_env_overrides();

    if let Some(voice) = voice {
        config.voice = voice;
    }
    if let Some(limit) = concurrency {
        config.concurrency_limit = limit;
    }
    config.validate()?;

    let content = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let synthesizer = GeminiSynthesizer::new(&config)?;

    let cancellation_token = CancellationToken::new();
    let token_clone = cancellation_token.clone();
    let ctrl_c_handler = tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            warn!("Received Ctrl+C signal, stopping after the current chunk...");
            token_clone.cancel();
        }
    });

    let timeline = TtsTimeline::new(config, Arc::new(synthesizer))
        .with_observer(Arc::new(LogProgressObserver))
        .with_cancellation(cancellation_token);

    let result = timeline.render_srt_to_wav(&content, &output).await;
    ctrl_c_handler.abort();

    let composition = result?;
    if !composition.dropped.is_empty() {
        warn!("Segments without speech: {}", composition.dropped.join(", "));
    }
    info!(
        "Done: {} segments, {:.2}s of audio written to {}",
        composition.synthesized,
        composition.buffer.duration_seconds(),
        output.display()
    );
    Ok(())
}
