use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A video as reported by the discoverer. Never persisted directly; only its
/// id and the summary derived from it reach the ledger.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_id: String,
    pub channel_name: String,
    pub published_at: DateTime<Utc>,
    pub duration: String,
    pub view_count: i64,
    pub url: String,
}

impl Video {
    pub const WATCH_BASE_URL: &'static str = "https://www.youtube.com/watch";

    pub fn watch_url(video_id: &str) -> String {
        format!("{}?v={}", Self::WATCH_BASE_URL, video_id)
    }
}

/// Transcript text together with the thumbnail picked for the digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptResult {
    pub transcript: String,
    pub thumbnail_url: String,
}
