use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ContentConfig;

/// Chat message for the generation API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Publishing metadata derived from one transcript
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub titles: Vec<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub timestamps: String,
}

impl ContentBundle {
    /// Render the bundle as the four-section details file body
    pub fn render(&self) -> String {
        format!(
            "Titles:\n{}\n\nDescription:\n{}\n\nTags:\n{}\n\nTimestamps and Titles:\n{}\n",
            self.titles.join("\n"),
            self.description,
            self.tags.join(","),
            self.timestamps
        )
    }
}

/// Split free-form model output on newlines, dropping blank lines.
///
/// The service is not trusted to return any particular item count or layout;
/// ill-formatted output degrades to a shorter (possibly empty) list.
pub fn split_lines_nonempty(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a comma-delimited tag list, dropping empty items
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Text-generation client deriving publishing metadata from transcripts
pub struct ContentGenerator {
    config: ContentConfig,
    client: reqwest::Client,
}

impl ContentGenerator {
    pub fn new(config: ContentConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// One chat-completions request, returning the first choice trimmed
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI API key not configured"))?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };

        debug!("Sending generation request to {}", self.config.api_endpoint);

        let response = self
            .client
            .post(&self.config.api_endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Generation API error {}: {}", status, text));
        }

        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .first()
            .ok_or_else(|| anyhow!("No response from generation API"))?
            .message
            .content
            .trim()
            .to_string();

        Ok(content)
    }

    /// Derive titles, description, tags and a timestamp outline from a
    /// transcript. The four requests are independent of each other.
    pub async fn generate_bundle(&self, transcript: &str) -> Result<ContentBundle> {
        info!("📝 Generating video details ({} transcript characters)", transcript.len());

        let persona = self.config.persona.as_str();

        let titles_raw = self
            .chat(
                persona,
                &format!(
                    "Generate 5 novel attention-grabbing titles for the following transcript:\n{}",
                    transcript
                ),
            )
            .await?;

        let description = self
            .chat(
                persona,
                &format!(
                    "Provide a description related to what users usually search for based on the following transcript:\n{}",
                    transcript
                ),
            )
            .await?;

        let tags_raw = self
            .chat(
                persona,
                &format!(
                    "Provide tags that users usually search for and are related to the following transcript:\n{}",
                    transcript
                ),
            )
            .await?;

        let timestamps = self
            .chat(
                persona,
                &format!(
                    "Provide timestamps and short interesting and attention-grabbing titles in a format that YouTube uses for the following transcript:\n{}",
                    transcript
                ),
            )
            .await?;

        Ok(ContentBundle {
            titles: split_lines_nonempty(&titles_raw),
            description,
            tags: split_tags(&tags_raw),
            timestamps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_drops_blanks() {
        let raw = "1. First title\n\n  2. Second title  \n";
        let titles = split_lines_nonempty(raw);
        assert_eq!(titles, vec!["1. First title", "2. Second title"]);
    }

    #[test]
    fn test_split_lines_tolerates_garbage() {
        assert!(split_lines_nonempty("").is_empty());
        assert!(split_lines_nonempty("   \n \n").is_empty());
    }

    #[test]
    fn test_split_tags() {
        let tags = split_tags("rust, tutorial , async,,video");
        assert_eq!(tags, vec!["rust", "tutorial", "async", "video"]);
    }

    #[test]
    fn test_split_tags_empty_input() {
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }

    #[test]
    fn test_bundle_render_has_four_sections() {
        let bundle = ContentBundle {
            titles: vec!["Title A".to_string(), "Title B".to_string()],
            description: "A description.".to_string(),
            tags: vec!["one".to_string(), "two".to_string()],
            timestamps: "00:00 Intro".to_string(),
        };

        let rendered = bundle.render();

        assert!(rendered.starts_with("Titles:\nTitle A\nTitle B\n\n"));
        assert!(rendered.contains("Description:\nA description.\n\n"));
        assert!(rendered.contains("Tags:\none,two\n\n"));
        assert!(rendered.ends_with("Timestamps and Titles:\n00:00 Intro\n"));
    }
}
