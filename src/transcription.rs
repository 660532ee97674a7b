use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::audio::{plan_chunks, AudioExtractor};
use crate::config::TranscriptionConfig;

/// Speech-to-text client for the Whisper API.
///
/// Holds one configured HTTP client; callers construct it once and reuse it
/// for the whole batch rather than re-creating clients per request.
pub struct TranscriptionClient {
    config: TranscriptionConfig,
    client: reqwest::Client,
    extractor: AudioExtractor,
}

impl TranscriptionClient {
    pub fn new(
        config: TranscriptionConfig,
        client: reqwest::Client,
        extractor: AudioExtractor,
    ) -> Self {
        Self {
            config,
            client,
            extractor,
        }
    }

    /// Path of the per-file chunk cache: `<audio-stem>_chunks.txt`
    pub fn cache_path(audio_path: &Path) -> PathBuf {
        let stem = audio_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy();
        let file_name = format!("{}_chunks.txt", stem);

        match audio_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
            _ => PathBuf::from(file_name),
        }
    }

    /// Transcribe an audio file chunk by chunk.
    ///
    /// An existing chunk cache short-circuits the whole operation: its content
    /// is returned verbatim and no requests are made. Otherwise chunks are
    /// processed strictly in order; a chunk whose request fails or comes back
    /// empty is logged and skipped with no placeholder, and its temporary file
    /// is removed before the next request begins either way.
    pub async fn transcribe_audio(&self, audio_path: &Path) -> Result<String> {
        let cache_file = Self::cache_path(audio_path);
        if cache_file.exists() {
            info!(
                "📄 Chunk cache '{}' already exists, skipping transcription",
                cache_file.display()
            );
            return Ok(tokio::fs::read_to_string(&cache_file).await?);
        }

        let total_ms = self.extractor.probe_duration(audio_path).await?;
        let chunks = plan_chunks(total_ms, self.extractor.chunk_duration_ms);

        info!(
            "✂️ Transcribing {} in {} chunks of {:.0}s",
            audio_path.display(),
            chunks.len(),
            self.extractor.chunk_duration_ms as f64 / 1000.0
        );

        let mut fragments: Vec<String> = Vec::new();
        let mut cache_content = String::new();

        for spec in &chunks {
            let chunk_file = self.extractor.export_chunk(audio_path, spec).await?;

            let attempt = self.transcribe_exported_chunk(&chunk_file).await;

            absorb_chunk_result(spec.index, attempt, &mut fragments, &mut cache_content);
        }

        tokio::fs::write(&cache_file, &cache_content).await?;

        info!(
            "✅ Transcribed {} of {} chunks for {}",
            fragments.len(),
            chunks.len(),
            audio_path.display()
        );

        Ok(fragments.join(" "))
    }

    /// Request one chunk's transcription and remove its temporary file.
    ///
    /// Removal is unconditional: it happens on success and failure alike,
    /// before the result is even inspected.
    async fn transcribe_exported_chunk(&self, chunk_file: &Path) -> Result<String> {
        let attempt = self.request_transcription(chunk_file).await;

        if let Err(e) = tokio::fs::remove_file(chunk_file).await {
            warn!(
                "Failed to remove chunk file {}: {}",
                chunk_file.display(),
                e
            );
        }

        attempt
    }

    /// One transcription request for one chunk file
    async fn request_transcription(&self, chunk_file: &Path) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI API key not configured"))?;

        let audio_data = tokio::fs::read(chunk_file).await?;
        let file_name = chunk_file
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio_data)
                    .file_name(file_name)
                    .mime_str("audio/mpeg")?,
            )
            .text("model", self.config.model.clone())
            .text("response_format", "text");

        let response = self
            .client
            .post(&self.config.api_endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Transcription API error {}: {}", status, text));
        }

        Ok(response.text().await?)
    }
}

/// Fold one chunk attempt into the running transcript.
///
/// A failed or empty chunk is logged and contributes nothing, not even a
/// placeholder; surviving fragments keep chunk order.
fn absorb_chunk_result(
    index: usize,
    attempt: Result<String>,
    fragments: &mut Vec<String>,
    cache_content: &mut String,
) {
    match attempt {
        Ok(text) if !text.trim().is_empty() => {
            let text = text.trim().to_string();
            debug!("Response for chunk {}: {}", index, text);
            cache_content.push_str(&format!("Chunk {}:\n{}\n\n", index, text));
            fragments.push(text);
        }
        Ok(_) => {
            warn!("⚠️ Chunk {} returned an empty transcription, skipping", index);
        }
        Err(e) => {
            warn!("⚠️ Chunk {} transcription failed, skipping: {}", index, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn test_client() -> TranscriptionClient {
        let config = Config::default();
        TranscriptionClient::new(
            config.transcription.clone(),
            reqwest::Client::new(),
            AudioExtractor::new(&config.audio),
        )
    }

    #[test]
    fn test_cache_path_naming() {
        let cache = TranscriptionClient::cache_path(Path::new("/videos/demo.mp3"));
        assert_eq!(cache, PathBuf::from("/videos/demo_chunks.txt"));
    }

    #[tokio::test]
    async fn test_existing_cache_short_circuits_transcription() {
        let temp_dir = TempDir::new().unwrap();
        let audio_path = temp_dir.path().join("demo.mp3");
        let cache_path = temp_dir.path().join("demo_chunks.txt");

        // No audio file exists; only the cache. If the cache check did not
        // run first, probing the missing audio would fail.
        let cached = "Chunk 0:\nhello world\n\n";
        tokio::fs::write(&cache_path, cached).await.unwrap();

        let client = test_client();
        let transcript = client.transcribe_audio(&audio_path).await.unwrap();

        assert_eq!(transcript, cached);
    }

    #[test]
    fn test_failed_chunk_skipped_without_placeholder() {
        let mut fragments = Vec::new();
        let mut cache = String::new();

        let texts = ["zero", "one", "two", "three", "four"];
        for (index, text) in texts.iter().enumerate() {
            let attempt = if index == 2 {
                Err(anyhow!("service unavailable"))
            } else {
                Ok(text.to_string())
            };
            absorb_chunk_result(index, attempt, &mut fragments, &mut cache);
        }

        assert_eq!(fragments, vec!["zero", "one", "three", "four"]);
        assert_eq!(fragments.join(" "), "zero one three four");
        assert!(!cache.contains("Chunk 2:"));
        assert!(cache.contains("Chunk 3:\nthree\n\n"));
    }

    #[test]
    fn test_all_empty_chunks_yield_empty_transcript() {
        let mut fragments = Vec::new();
        let mut cache = String::new();

        for index in 0..3 {
            absorb_chunk_result(index, Ok("   ".to_string()), &mut fragments, &mut cache);
        }

        assert!(fragments.is_empty());
        assert!(fragments.join(" ").is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_chunk_file_removed_when_request_fails() {
        let temp_dir = TempDir::new().unwrap();
        let chunk_file = temp_dir.path().join("demo_chunk0.mp3");
        tokio::fs::write(&chunk_file, b"mock chunk audio").await.unwrap();

        // Default config carries no API key, so the request fails before any
        // network traffic; removal is unconditional and must happen anyway.
        let client = test_client();
        let attempt = client.transcribe_exported_chunk(&chunk_file).await;

        assert!(attempt.is_err());
        assert!(!chunk_file.exists());
    }
}
