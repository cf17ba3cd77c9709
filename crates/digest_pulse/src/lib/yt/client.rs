use std::time::Duration;

use itertools::Itertools;
use reqwest::Client;
use serde_json::Value;

use crate::{
    parser::{apply_video_details, parse_search_results},
    types::Video,
    yt::VideoDiscoverer,
};

#[derive(Debug, thiserror::Error)]
pub enum YouTubeError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Parse(#[from] crate::error::Error),
}

/// YouTube Data API v3 client
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_key: impl Into<String>) -> Result<Self, YouTubeError> {
        let client = Client::builder().timeout(Self::REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: "https://www.googleapis.com/youtube/v3".into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn get_json(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value, YouTubeError> {
        let resp = self
            .client
            .get(format!("{}/{endpoint}", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, endpoint, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(YouTubeError::Api { status, message });
        }

        Ok(resp.json::<Value>().await?)
    }

    /// Fills duration and view count from the `videos` endpoint in one batch call
    #[tracing::instrument(skip_all, fields(count = videos.len()))]
    async fn enrich(&self, videos: &mut [Video]) -> Result<(), YouTubeError> {
        if videos.is_empty() {
            return Ok(());
        }
        let ids = videos.iter().map(|v| v.id.as_str()).join(",");
        let json = self
            .get_json(
                "videos",
                &[("id", ids.as_str()), ("part", "snippet,statistics,contentDetails")],
            )
            .await?;

        apply_video_details(videos, &json)?;
        Ok(())
    }
}

impl VideoDiscoverer for YouTubeClient {
    type Error = YouTubeError;

    #[tracing::instrument(skip(self))]
    async fn channel_videos(
        &self,
        channel_id: &str,
        max_results: usize,
    ) -> Result<Vec<Video>, Self::Error> {
        let max_results = max_results.to_string();
        let json = self
            .get_json(
                "search",
                &[
                    ("channelId", channel_id),
                    ("part", "snippet"),
                    ("order", "date"),
                    ("type", "video"),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        let mut videos = parse_search_results(&json)?;

        // duration and views are nice to have; a failed lookup keeps the search results
        if let Err(e) = self.enrich(&mut videos).await {
            tracing::warn!(error = %e, %channel_id, "Failed to fetch video details");
        }

        tracing::info!(%channel_id, count = videos.len(), "Retrieved channel videos");
        Ok(videos)
    }
}
