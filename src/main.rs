use anyhow::Result;
use clap::Parser;
use lingua_live::audio::{AudioBackendFactory, AudioSource, CaptureConfig};
use lingua_live::{
    Config, GeminiLiveConnector, GeminiTextModel, LiveSession, SOURCE_LANGUAGE_LIMIT,
    SUPPORTED_LANGUAGES,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "lingua-live")]
#[command(about = "Real-time speech transcription and translation", long_about = None)]
struct Cli {
    /// Source language hints (locale codes, up to 3), e.g. -s ja-JP -s en-US
    #[arg(short = 's', long = "source")]
    sources: Vec<String>,

    /// Translation target (locale code); omit to disable translation
    #[arg(short = 't', long = "target")]
    target: Option<String>,

    /// Replay a WAV file through the session instead of the microphone
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = "config/lingua-live")]
    config: String,

    /// Print the language catalog and exit
    #[arg(long)]
    list_languages: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if cli.list_languages {
        println!("Supported languages (select up to {} sources):", SOURCE_LANGUAGE_LIMIT);
        for language in SUPPORTED_LANGUAGES {
            println!("  {:6}  {}", language.code, language.name);
        }
        return Ok(());
    }

    let mut cfg = Config::load(&cli.config)?;
    if !cli.sources.is_empty() {
        cfg.session.source_languages = cli.sources.clone();
    }
    if let Some(target) = &cli.target {
        cfg.session.target_language = target.clone();
    }

    let api_key = lingua_live::config::api_key()?;
    let session_config = cfg.session_config()?;

    info!("lingua-live v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Source languages: {}; target: {}",
        session_config.active_source_names().join(", "),
        session_config.target_language.target_label()
    );

    let capture_config = CaptureConfig {
        target_sample_rate: cfg.audio.sample_rate,
        block_size: cfg.audio.block_size,
    };
    let source = match cli.wav {
        Some(path) => AudioSource::File(path),
        None => AudioSource::Microphone,
    };
    let backend = AudioBackendFactory::create(source, capture_config)?;

    let model = Arc::new(GeminiTextModel::new(api_key.clone(), cfg.api.text_model.clone()));
    let connector = GeminiLiveConnector::new(api_key, cfg.api.live_model.clone());

    let session = LiveSession::new(session_config, model);
    session.start(backend, &connector).await?;

    info!("Recording; press Ctrl-C to stop");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            session.stop().await?;
        }
        _ = session.closed() => {}
    }

    session.wait_for_pipeline().await;

    let stats = session.stats().await;
    info!(
        "Session finished: {} turns in {:.1}s",
        stats.turns_completed, stats.duration_secs
    );

    if let Some(error) = session.last_error().await {
        eprintln!("{}", error);
    }

    let history = session.history().await;
    if history.is_empty() {
        println!("No transcriptions recorded.");
    } else {
        println!("--- Transcriptions (newest first) ---");
        for record in &history {
            println!("[{}] {}", record.source_lang, record.original_text);
            if let (Some(translated), Some(target)) = (&record.translated_text, &record.target_lang)
            {
                println!("  -> [{}] {}", target, translated);
            }
        }
    }

    Ok(())
}
