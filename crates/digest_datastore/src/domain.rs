use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored channel. Owned by the ledger, read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub handle: Option<String>,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Channel {
            id: id.into(),
            name: name.into(),
            handle: None,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }
}

/// Delivery status of a summary. `New` moves to `Processed` once, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SummaryStatus {
    #[default]
    New,
    Processed,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::New => "New",
            SummaryStatus::Processed => "Processed",
        }
    }
}

impl fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown summary status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for SummaryStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(SummaryStatus::New),
            "Processed" => Ok(SummaryStatus::Processed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// An AI generated summary of a single video, as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    pub video_id: String,
    pub video_title: String,
    pub channel_name: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub status: SummaryStatus,
    pub video_url: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: String,
    pub duration: String,
    pub view_count: i64,
}

impl Summary {
    /// Still waiting to go out in a digest
    pub fn is_pending(&self) -> bool {
        self.status == SummaryStatus::New
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_ledger_text() {
        for status in [SummaryStatus::New, SummaryStatus::Processed] {
            let parsed: SummaryStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = "Sent".parse::<SummaryStatus>();
        assert!(matches!(result, Err(ParseStatusError(s)) if s == "Sent"));
    }

    #[test]
    fn test_channel_builder_sets_handle() {
        let channel = Channel::new("UC123", "Rust Talks").with_handle("@rusttalks");
        assert_eq!(channel.handle.as_deref(), Some("@rusttalks"));
        assert_eq!(Channel::new("UC1", "x").handle, None);
    }
}
