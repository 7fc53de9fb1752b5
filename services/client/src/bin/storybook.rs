//! services/client/src/bin/storybook.rs

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use storybook_client_lib::{
    config::Config,
    error::ClientError,
    viewmodel::{
        AppContext, DecideOutcome, PageSource, PriorSessionResolution, RunPlan, SaveChoice,
        SessionOrchestrator,
    },
};
use storybook_core::{Language, Voice};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VoiceArg {
    Male,
    Female,
}

impl From<VoiceArg> for Voice {
    fn from(value: VoiceArg) -> Self {
        match value {
            VoiceArg::Male => Voice::Male,
            VoiceArg::Female => Voice::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PriorArg {
    Resume,
    End,
    Discard,
}

impl From<PriorArg> for PriorSessionResolution {
    fn from(value: PriorArg) -> Self {
        match value {
            PriorArg::Resume => PriorSessionResolution::Resume,
            PriorArg::End => PriorSessionResolution::End,
            PriorArg::Discard => PriorSessionResolution::Discard,
        }
    }
}

/// Reads a photographed storybook with the storybook backend.
#[derive(Debug, Parser)]
#[command(name = "storybook", version, about)]
struct Args {
    /// Device id to log in with (defaults to DEVICE_ID or the stored id).
    #[arg(long, env = "DEVICE_ID")]
    device_id: Option<String>,

    /// Page photos in reading order; the first one is the cover.
    #[arg(long, num_args = 1.., required = true)]
    pages: Vec<PathBuf>,

    #[arg(long, value_enum, default_value = "female")]
    voice: VoiceArg,

    /// Language code for translations, e.g. `en` or `ko`.
    #[arg(long)]
    language: Option<String>,

    /// What to do with a session that is still active.
    #[arg(long, value_enum, default_value = "end")]
    prior: PriorArg,

    /// Discard the session at the end instead of saving it.
    #[arg(long)]
    discard: bool,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let args = Args::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Build the Shared AppContext ---
    let ctx = Arc::new(AppContext::from_config(config.clone())?);

    // --- 3. Walk the Session ---
    let plan = RunPlan {
        device_id: args.device_id,
        language: args.language.map(Language::new),
        voice: args.voice.into(),
        pages: args.pages.into_iter().map(PageSource::File).collect(),
        resolution: Some(args.prior.into()),
        choice: if args.discard {
            SaveChoice::Discard
        } else {
            SaveChoice::Save
        },
        discard_on_error: true,
    };

    let report = SessionOrchestrator::new(ctx).run(plan).await?;

    // --- 4. Report ---
    for page in &report.pages {
        info!(
            page_index = page.page_index,
            clips = page.audio.clips.len(),
            "{} / {}",
            page.content.ocr_text,
            page.content.translated_text
        );
    }
    if !report.unready_pages.is_empty() {
        warn!(pages = ?report.unready_pages, "Some pages were still processing when reading moved on");
    }
    match report.summary.as_ref().and_then(|s| s.stats.map(|stats| (s, stats))) {
        Some((summary, stats)) => info!(
            pages_read = stats.pages_read(),
            words_read = stats.total_words_read,
            seconds = stats.total_time_spent,
            learned_words = summary.words.len(),
            "Session finished"
        ),
        None => warn!("Session finished without statistics"),
    }
    if let Some(summary) = &report.summary {
        for word in &summary.words {
            info!("{}: {}", word.word, word.meaning);
        }
    }
    match report.decision {
        Some(DecideOutcome::Discarded) => info!("Session discarded"),
        Some(_) => info!("Session saved"),
        None => {}
    }

    Ok(())
}
