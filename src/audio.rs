use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::AudioConfig;

/// Failures from the external media tool, surfaced as distinct error kinds
/// instead of leaking into later pipeline stages as confusing read errors.
#[derive(Debug, Error)]
pub enum MediaToolError {
    #[error("ffmpeg exited with {status} converting {}", .path.display())]
    ConversionFailed {
        path: PathBuf,
        status: std::process::ExitStatus,
    },

    #[error("ffmpeg produced no usable audio output at {}", .path.display())]
    MissingOutput { path: PathBuf },

    #[error("ffmpeg exited with {status} exporting chunk {index}")]
    ChunkExportFailed {
        index: usize,
        status: std::process::ExitStatus,
    },

    #[error("ffprobe failed for {}", .path.display())]
    ProbeFailed { path: PathBuf },
}

/// One fixed-duration window of an audio stream.
///
/// Chunks are zero-indexed and cover the stream start-to-end with no overlap
/// and no gaps; the last chunk is truncated to the remainder, never padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpec {
    pub index: usize,
    pub start_ms: u64,
    pub duration_ms: u64,
}

/// Partition an audio stream of `total_ms` into `window_ms` chunks.
///
/// Pure function of the two lengths: `ceil(total/window)` chunks, all but the
/// last exactly `window_ms` long.
pub fn plan_chunks(total_ms: u64, window_ms: u64) -> Vec<ChunkSpec> {
    if window_ms == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0u64;
    let mut index = 0usize;

    while start < total_ms {
        let duration = window_ms.min(total_ms - start);
        chunks.push(ChunkSpec {
            index,
            start_ms: start,
            duration_ms: duration,
        });
        start += duration;
        index += 1;
    }

    chunks
}

/// Path for a chunk's temporary audio file: `<audio-stem>_chunk<index>.mp3`,
/// next to the audio file it was cut from.
pub fn chunk_path(audio_path: &Path, index: usize) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    let file_name = format!("{}_chunk{}.mp3", stem, index);

    match audio_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

/// Audio extraction and chunk export via ffmpeg
#[derive(Clone)]
pub struct AudioExtractor {
    /// Target audio container format
    pub audio_format: String,
    /// Chunk window length in milliseconds
    pub chunk_duration_ms: u64,
}

impl AudioExtractor {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            audio_format: config.audio_format.clone(),
            chunk_duration_ms: config.chunk_duration_ms,
        }
    }

    /// Audio path derived 1:1 from a video path by swapping the extension
    pub fn audio_output_path(&self, video_path: &Path) -> PathBuf {
        video_path.with_extension(&self.audio_format)
    }

    /// Demux the audio track of a video into a standalone audio file,
    /// keeping only the highest-quality audio stream.
    pub async fn convert_to_audio(&self, video_path: &Path) -> Result<PathBuf> {
        let audio_path = self.audio_output_path(video_path);

        info!("🎵 Extracting audio: {}", video_path.display());

        let status = tokio::process::Command::new("ffmpeg")
            .args([
                "-i",
                video_path.to_str().ok_or_else(|| anyhow!("non-UTF8 video path"))?,
                "-q:a",
                "0", // Highest quality audio
                "-map",
                "a", // Audio stream only
                "-y", // Overwrite existing
                audio_path.to_str().ok_or_else(|| anyhow!("non-UTF8 audio path"))?,
            ])
            .status()
            .await?;

        if !status.success() {
            return Err(MediaToolError::ConversionFailed {
                path: video_path.to_path_buf(),
                status,
            }
            .into());
        }

        // ffmpeg can exit zero and still write nothing useful for some inputs
        match tokio::fs::metadata(&audio_path).await {
            Ok(meta) if meta.len() > 0 => {}
            _ => {
                return Err(MediaToolError::MissingOutput { path: audio_path }.into());
            }
        }

        info!("✅ Audio extracted: {}", audio_path.display());
        Ok(audio_path)
    }

    /// Probe the length of an audio stream in milliseconds
    pub async fn probe_duration(&self, audio_path: &Path) -> Result<u64> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                audio_path.to_str().ok_or_else(|| anyhow!("non-UTF8 audio path"))?,
            ])
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaToolError::ProbeFailed {
                path: audio_path.to_path_buf(),
            }
            .into());
        }

        let json_str = String::from_utf8(output.stdout)?;
        let ffprobe_data: serde_json::Value = serde_json::from_str(&json_str)?;

        let duration_seconds: f64 = ffprobe_data["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| MediaToolError::ProbeFailed {
                path: audio_path.to_path_buf(),
            })?;

        Ok((duration_seconds * 1000.0).round() as u64)
    }

    /// Materialize one chunk to its temporary file
    pub async fn export_chunk(&self, audio_path: &Path, spec: &ChunkSpec) -> Result<PathBuf> {
        let chunk_file = chunk_path(audio_path, spec.index);

        let start = format!("{:.3}", spec.start_ms as f64 / 1000.0);
        let duration = format!("{:.3}", spec.duration_ms as f64 / 1000.0);

        let status = tokio::process::Command::new("ffmpeg")
            .args([
                "-i",
                audio_path.to_str().ok_or_else(|| anyhow!("non-UTF8 audio path"))?,
                "-ss",
                &start,
                "-t",
                &duration,
                "-c",
                "copy", // Copy without re-encoding
                "-y",
                chunk_file.to_str().ok_or_else(|| anyhow!("non-UTF8 chunk path"))?,
            ])
            .status()
            .await?;

        if !status.success() {
            return Err(MediaToolError::ChunkExportFailed {
                index: spec.index,
                status,
            }
            .into());
        }

        Ok(chunk_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_chunks_with_remainder() {
        let chunks = plan_chunks(75_000, 30_000);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].duration_ms, 30_000);
        assert_eq!(chunks[1].duration_ms, 30_000);
        assert_eq!(chunks[2].duration_ms, 15_000);
        assert_eq!(chunks[2].start_ms, 60_000);
    }

    #[test]
    fn test_plan_chunks_exact_multiple() {
        let chunks = plan_chunks(90_000, 30_000);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.duration_ms == 30_000));
    }

    #[test]
    fn test_plan_chunks_covers_stream_without_gaps() {
        let chunks = plan_chunks(123_456, 30_000);

        let mut expected_start = 0;
        for chunk in &chunks {
            assert_eq!(chunk.start_ms, expected_start);
            expected_start += chunk.duration_ms;
        }
        assert_eq!(expected_start, 123_456);
    }

    #[test]
    fn test_plan_chunks_short_stream() {
        let chunks = plan_chunks(5_000, 30_000);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].duration_ms, 5_000);
    }

    #[test]
    fn test_plan_chunks_empty_stream() {
        assert!(plan_chunks(0, 30_000).is_empty());
        assert!(plan_chunks(60_000, 0).is_empty());
    }

    #[test]
    fn test_chunk_path_naming() {
        let path = chunk_path(Path::new("/videos/demo.mp3"), 4);
        assert_eq!(path, PathBuf::from("/videos/demo_chunk4.mp3"));

        let path = chunk_path(Path::new("demo.mp3"), 0);
        assert_eq!(path, PathBuf::from("demo_chunk0.mp3"));
    }

    #[test]
    fn test_audio_output_path() {
        let extractor = AudioExtractor::new(&crate::config::Config::default().audio);
        let audio = extractor.audio_output_path(Path::new("/videos/demo.mp4"));
        assert_eq!(audio, PathBuf::from("/videos/demo.mp3"));
    }
}
