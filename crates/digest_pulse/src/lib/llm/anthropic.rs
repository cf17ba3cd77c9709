use std::{collections::HashMap, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{digest::template::fill_placeholders, Summarizer};

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    prompt_template: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AnthropicError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Empty summary in response")]
    EmptyContent,
}

impl AnthropicClient {
    pub const DEFAULT_PROMPT: &'static str = include_str!("./prompts/summary.txt");
    const API_VERSION: &'static str = "2023-06-01";
    const MAX_TOKENS: u32 = 1000;
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(api_key: impl Into<String>) -> Result<Self, AnthropicError> {
        let client = Client::builder().timeout(Self::REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com/v1".into(),
            model: <Self as Summarizer>::SUMMARIZER_MODEL.into(),
            prompt_template: Self::DEFAULT_PROMPT.into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Template with `{title}` and `{transcript}` placeholders
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    pub fn render_prompt(&self, transcript: &str, title: &str) -> String {
        fill_placeholders(
            &self.prompt_template,
            &HashMap::from([
                ("title", title.to_string()),
                ("transcript", transcript.to_string()),
            ]),
        )
    }

    pub async fn send_message_request(
        &self,
        user_content: impl Into<String>,
    ) -> Result<MessageResponse, AnthropicError> {
        let body = MessageRequest {
            model: &self.model,
            max_tokens: Self::MAX_TOKENS,
            messages: vec![RequestMessage {
                role: "user",
                content: user_content.into(),
            }],
        };

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(AnthropicError::Api { status, message });
        }

        Ok(resp.json::<MessageResponse>().await?)
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl MessageResponse {
    /// Trimmed text of the first content block, if it has any
    pub fn summary_text(&self) -> Option<String> {
        self.content
            .first()
            .map(|block| block.text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }
}

impl Summarizer for AnthropicClient {
    const SUMMARIZER_MODEL: &'static str = "claude-sonnet-4-20250514";
    type Error = AnthropicError;

    #[tracing::instrument(skip(self, transcript), fields(transcript_len = transcript.len()))]
    async fn summarize(&self, transcript: &str, title: &str) -> Result<String, Self::Error> {
        let response = self
            .send_message_request(self.render_prompt(transcript, title))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))?;

        let summary = response.summary_text().ok_or(AnthropicError::EmptyContent)?;

        tracing::info!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            summary_len = summary.len(),
            "Generated summary"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_interpolates_title_and_transcript() {
        let client = AnthropicClient::new("key").unwrap();
        let prompt = client.render_prompt("we talk about traits", "Traits 101");

        assert!(prompt.starts_with("Video Title: \"Traits 101\""));
        assert!(prompt.trim_end().ends_with("we talk about traits"));
    }

    #[test]
    fn test_placeholder_text_in_title_is_not_expanded() {
        let client = AnthropicClient::new("key")
            .unwrap()
            .with_prompt_template("T: {title}\nX: {transcript}");
        let prompt = client.render_prompt("the body", "Why {transcript} matters");

        assert_eq!(prompt, "T: Why {transcript} matters\nX: the body");
    }

    #[test]
    fn test_summary_text_is_trimmed_and_rejects_blank() {
        let response: MessageResponse = serde_json::from_value(serde_json::json!({
            "content": [{ "type": "text", "text": "  Key points.\n" }],
            "model": "claude",
            "usage": { "input_tokens": 10, "output_tokens": 3 }
        }))
        .unwrap();
        assert_eq!(response.summary_text().as_deref(), Some("Key points."));

        let blank: MessageResponse = serde_json::from_value(serde_json::json!({
            "content": [{ "type": "text", "text": "   " }],
            "model": "claude",
            "usage": { "input_tokens": 10, "output_tokens": 0 }
        }))
        .unwrap();
        assert_eq!(blank.summary_text(), None);
    }
}
