use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::{transcript::TranscriptAcquirer, types::TranscriptResult};

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Empty transcript for video {0}")]
    Empty(String),
    #[error("Transcript fetching is disabled")]
    Disabled,
}

/// `youtube-transcriptor` on RapidAPI
#[derive(Debug, Clone)]
pub struct RapidApiTranscriptClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    transcription: Vec<TranscriptEntry>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    subtitle: String,
}

impl RapidApiTranscriptClient {
    const HOST: &'static str = "youtube-transcriptor.p.rapidapi.com";
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

    pub fn new(api_key: impl Into<String>) -> Result<Self, TranscriptError> {
        let client = Client::builder().timeout(Self::REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: format!("https://{}", Self::HOST),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Standard thumbnail that renders reliably in email clients
    pub fn default_thumbnail_url(video_id: &str) -> String {
        format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg")
    }
}

impl TranscriptAcquirer for RapidApiTranscriptClient {
    type Error = TranscriptError;

    #[tracing::instrument(skip(self))]
    async fn transcript_and_thumbnail(&self, video_id: &str) -> Result<TranscriptResult, Self::Error> {
        let resp = self
            .client
            .get(format!("{}/transcript", self.base_url))
            .query(&[("video_id", video_id), ("lang", "en")])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", Self::HOST)
            .header("Accept", "application/json")
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(TranscriptError::Api { status, message });
        }

        // the API answers with a single element array
        let response = resp
            .json::<Vec<TranscriptResponse>>()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TranscriptError::Empty(video_id.to_string()))?;

        build_transcript_result(video_id, response)
    }
}

fn build_transcript_result(
    video_id: &str,
    response: TranscriptResponse,
) -> Result<TranscriptResult, TranscriptError> {
    let transcript = response
        .transcription
        .iter()
        .map(|entry| entry.subtitle.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if transcript.is_empty() {
        return Err(TranscriptError::Empty(video_id.to_string()));
    }

    let thumbnail_url = response
        .thumbnails
        .into_iter()
        .map(|t| t.url)
        .find(|url| url.contains(".jpg") && !url.contains('?'))
        .unwrap_or_else(|| RapidApiTranscriptClient::default_thumbnail_url(video_id));

    tracing::debug!(%video_id, length = transcript.len(), %thumbnail_url, "Retrieved transcript");

    Ok(TranscriptResult {
        transcript,
        thumbnail_url,
    })
}
