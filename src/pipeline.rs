use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::audio::AudioExtractor;
use crate::config::Config;
use crate::content::ContentGenerator;
use crate::transcription::TranscriptionClient;
use crate::video::VideoScanner;

/// Counts for one batch run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub transcribed: usize,
    pub skipped: usize,
}

/// Path of the derived-metadata file: `<video-stem>_youtubedetails.txt`
pub fn details_path(video_path: &Path) -> PathBuf {
    let stem = video_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    let file_name = format!("{}_youtubedetails.txt", stem);

    match video_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

/// Sequential batch driver: one video is fully processed, including all of
/// its chunk-level requests, before the next begins.
pub struct BatchProcessor {
    config: Config,
    scanner: VideoScanner,
    extractor: AudioExtractor,
    transcriber: TranscriptionClient,
    generator: ContentGenerator,
}

impl BatchProcessor {
    pub fn new(config: Config) -> Result<Self> {
        // One HTTP client for the whole run, shared by both API clients
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.transcription.timeout_seconds))
            .build()?;

        let scanner = VideoScanner::new(&config.processing.supported_extensions);
        let extractor = AudioExtractor::new(&config.audio);
        let transcriber = TranscriptionClient::new(
            config.transcription.clone(),
            client.clone(),
            extractor.clone(),
        );
        let generator = ContentGenerator::new(config.content.clone(), client);

        Ok(Self {
            config,
            scanner,
            extractor,
            transcriber,
            generator,
        })
    }

    /// Process every video in a folder: convert, transcribe, derive details
    pub async fn run(&self, folder: &Path) -> Result<RunSummary> {
        let videos = self.scanner.discover_videos(folder).await?;

        if videos.is_empty() {
            warn!("No videos found in {}", folder.display());
            return Ok(RunSummary::default());
        }

        info!("📹 Found {} videos to process", videos.len());

        let mut summary = RunSummary::default();

        for (index, video_path) in videos.iter().enumerate() {
            info!(
                "📹 Processing video {}/{}: {}",
                index + 1,
                videos.len(),
                video_path.display()
            );
            summary.total += 1;

            let audio_path = match self.extractor.convert_to_audio(video_path).await {
                Ok(path) => path,
                Err(e) => {
                    error!("❌ Conversion failed for {}: {}", video_path.display(), e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let transcript = match self.transcriber.transcribe_audio(&audio_path).await {
                Ok(transcript) => transcript,
                Err(e) => {
                    error!("❌ Transcription failed for {}: {}", video_path.display(), e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let transcript_path = match self.write_transcript(video_path, &transcript).await? {
                Some(path) => path,
                None => {
                    warn!(
                        "⚠️ Failed to transcribe video (empty transcript): {}",
                        video_path.display()
                    );
                    summary.skipped += 1;
                    continue;
                }
            };
            info!("💾 Transcript saved to: {}", transcript_path.display());

            if self.config.processing.generate_details {
                // Generation failures are not recovered; they abort the run
                let bundle = self.generator.generate_bundle(&transcript).await?;

                let details_file = details_path(video_path);
                tokio::fs::write(&details_file, bundle.render()).await?;
                info!("💾 Video details saved to: {}", details_file.display());
            }

            summary.transcribed += 1;
        }

        Ok(summary)
    }

    /// Write the transcript file next to its video.
    ///
    /// An empty or all-whitespace transcript produces no file at all;
    /// `None` tells the caller to skip the video's remaining outputs.
    async fn write_transcript(
        &self,
        video_path: &Path,
        transcript: &str,
    ) -> Result<Option<PathBuf>> {
        if transcript.trim().is_empty() {
            return Ok(None);
        }

        let transcript_path = video_path.with_extension("txt");
        tokio::fs::write(&transcript_path, transcript).await?;
        Ok(Some(transcript_path))
    }
}
