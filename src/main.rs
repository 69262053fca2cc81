//! # News Video
//!
//! Turns a news article URL into a short narrated video: the article is
//! fetched and summarized, the summary is read aloud by a speech service,
//! and ffmpeg renders the narration over the article's image with a
//! headline banner.
//!
//! ## Usage
//!
//! ```sh
//! # Browse a Google Sheet of {Title, URL} rows and render on request
//! news_video --sheet-key 1AbC... --creds credentials.json
//!
//! # Render one article and exit
//! news_video --url https://example.com/story
//! ```
//!
//! ## Architecture
//!
//! Each render runs one sequential pipeline:
//! 1. **Fetching**: download the page, extract title, body and top image
//! 2. **Narration**: summarize the body and synthesize speech
//! 3. **Imagery**: download the top image or search for one by title
//! 4. **Composition**: render the video with ffmpeg
//!
//! The interactive session walks the article list with `prev`/`next` and
//! renders the selected record on `generate`.

use clap::Parser;
use std::error::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod ffmpeg;
mod images;
mod models;
mod navigator;
mod pipeline;
mod scrapers;
mod session;
mod sources;
mod summary;
mod tts;
mod utils;
mod video;

use cli::Cli;
use config::{AppConfig, Credentials};
use navigator::Navigator;
use pipeline::Pipeline;
use session::{Session, SessionCommand, SessionEvent};
use sources::{FileSource, SheetSource};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_video starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    // Early check: ensure the work dir is writable
    if let Err(e) = ensure_writable_dir(&config.work_dir).await {
        error!(
            path = %config.work_dir.display(),
            error = %e,
            "Work directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let mut pipeline = Pipeline::from_config(&config)?;

    // ---- One-shot: explicit URL ----
    if let Some(url) = &args.url {
        let output = pipeline
            .run(url, args.title.as_deref(), &config.output_path)
            .await?;
        println!("Video ready: {}", output.output_path.display());
        info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Execution complete");
        return Ok(());
    }

    let navigator = load_navigator(&config).await?;

    // ---- One-shot: record by position ----
    if let Some(index) = args.index {
        let record = navigator
            .items()
            .get(index)
            .cloned()
            .ok_or_else(|| format!("index {index} is out of range for {} records", navigator.len()))?;
        let output = pipeline
            .run(&record.url, Some(&record.title), &config.output_path)
            .await?;
        println!("Video ready: {}", output.output_path.display());
        info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Execution complete");
        return Ok(());
    }

    // ---- Interactive session ----
    let mut session = Session::new(navigator, pipeline, config.output_path.clone());
    run_interactive(&mut session, args.auto_generate).await?;

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Session closed");
    Ok(())
}

/// Read the article list from the local file if one is configured,
/// otherwise from the sheet.
async fn load_navigator(config: &AppConfig) -> Result<Navigator, Box<dyn Error>> {
    let navigator = match &config.records_file {
        Some(path) => Navigator::load(&FileSource::new(path)).await?,
        None => load_sheet(config).await?,
    };
    if navigator.is_empty() {
        warn!("The article list is empty; nothing to render");
    }
    Ok(navigator)
}

async fn load_sheet(config: &AppConfig) -> Result<Navigator, Box<dyn Error>> {
    let sheet_key = config
        .sheet_key
        .as_deref()
        .ok_or("no article list: set --sheet-key or --records-file")?;
    let credentials = Credentials::load(&config.credentials_file)?;
    if credentials.is_empty() {
        warn!(
            path = %config.credentials_file.display(),
            "Credentials file has neither api_key nor access_token"
        );
    }
    let source = SheetSource::new(sheet_key, &config.worksheet, credentials)?
        .with_api_base(&config.sheets_api_url);
    Ok(Navigator::load(&source).await?)
}

async fn run_interactive<S, E>(session: &mut Session<S, E>, auto_generate: bool) -> Result<(), Box<dyn Error>>
where
    S: tts::SpeechSynthesizer,
    E: video::VideoEncoder,
{
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_event(&session.handle(SessionCommand::Current).await);
    println!("Commands: prev, next, current, generate, list, quit");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command: SessionCommand = match line.parse() {
            Ok(c) => c,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        let event = session.handle(command).await;
        print_event(&event);
        if event == SessionEvent::Quit {
            break;
        }
        if auto_generate && command.is_navigation() && matches!(event, SessionEvent::Selected { .. }) {
            print_event(&session.handle(SessionCommand::Generate).await);
        }
    }
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Selected { index, total, record } => {
            println!("[{}/{}] {}", index + 1, total, record.title);
            println!("      {}", record.url);
        }
        SessionEvent::Empty => println!("The article list is empty."),
        SessionEvent::Listing { cursor, records } => {
            for (i, record) in records.iter().enumerate() {
                let marker = if Some(i) == *cursor { '>' } else { ' ' };
                println!("{marker} {:>3}  {}", i + 1, record.title);
            }
        }
        SessionEvent::Generated(output) => {
            println!("Video ready: {}", output.output_path.display());
        }
        SessionEvent::Failed { stage, message } => {
            println!("Generation failed during {stage}: {message}");
        }
        SessionEvent::Quit => println!("Bye."),
    }
}
