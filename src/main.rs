use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};

use clipscribe::config::Config;
use clipscribe::pipeline::BatchProcessor;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("clipscribe=info,warn")
        .init();

    let matches = Command::new("clipscribe")
        .version("0.1.0")
        .about("Batch video transcription and YouTube metadata generation")
        .arg(
            Arg::new("video-dir")
                .short('d')
                .long("video-dir")
                .value_name("DIR")
                .help("Directory containing videos to process")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a configuration file"),
        )
        .arg(
            Arg::new("skip-details")
                .long("skip-details")
                .help("Only produce transcripts, skip metadata generation")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let video_dir = PathBuf::from(matches.get_one::<String>("video-dir").unwrap());
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);

    if matches.get_flag("verbose") {
        info!("Verbose logging enabled");
    }

    // Load configuration; an explicitly named file that fails to load is
    // fatal, only the default search-path lookup falls back to defaults
    let mut config = match config_path {
        Some(ref path) => Config::load(Some(path))?,
        None => Config::load(None).unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };
    config.apply_env();

    if matches.get_flag("skip-details") {
        config.processing.generate_details = false;
    }

    // Missing credential is fatal before any file is touched
    config.validate()?;

    info!("🚀 clipscribe starting...");
    info!("📁 Video directory: {}", video_dir.display());
    info!("📝 Metadata generation: {}", config.processing.generate_details);

    // Validate input directory
    if !video_dir.exists() {
        error!("Input directory does not exist: {}", video_dir.display());
        return Err(anyhow::anyhow!("Input directory not found"));
    }

    let processor = BatchProcessor::new(config)?;

    let start_time = std::time::Instant::now();
    let summary = processor.run(&video_dir).await?;
    let duration = start_time.elapsed();

    info!("🎉 Processing completed in {:.2}s", duration.as_secs_f64());
    info!("✅ Transcribed: {}", summary.transcribed);
    info!("⏭️  Skipped: {}", summary.skipped);
    info!("📊 Total: {}", summary.total);

    Ok(())
}
