//! # YouTube Data API parser
//!
//! Turns the JSON bodies of the `search` and `videos` endpoints into [`Video`]s.

use std::{collections::HashMap, sync::LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::Error, types::Video};

static ISO8601_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration regex is valid")
});

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    channel_id: String,
    channel_title: String,
    published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    statistics: Option<Statistics>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

/// Parses a `search` response into videos, most recent first as returned.
///
/// Items without a `videoId` (channels, playlists) are skipped.
#[tracing::instrument(skip(json))]
pub fn parse_search_results(json: &Value) -> Result<Vec<Video>, Error> {
    if !json.is_object() {
        return Err(Error::ParseError("Search response is not a JSON object"));
    }
    let response = serde_json::from_value::<ListResponse<SearchItem>>(json.clone())?;

    let videos = response
        .items
        .into_iter()
        .filter_map(|SearchItem { id, snippet }| {
            let video_id = id.video_id.filter(|id| !id.is_empty())?;
            Some(Video {
                url: Video::watch_url(&video_id),
                id: video_id,
                title: snippet.title,
                description: snippet.description,
                channel_id: snippet.channel_id,
                channel_name: snippet.channel_title,
                published_at: snippet.published_at,
                ..Default::default()
            })
        })
        .collect();

    Ok(videos)
}

/// Copies duration and view count from a `videos` response onto matching videos.
///
/// Videos missing from the response are left untouched.
#[tracing::instrument(skip_all)]
pub fn apply_video_details(videos: &mut [Video], json: &Value) -> Result<(), Error> {
    let response = serde_json::from_value::<ListResponse<VideoItem>>(json.clone())?;
    let details = response
        .items
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect::<HashMap<_, _>>();

    for video in videos.iter_mut() {
        let Some(item) = details.get(&video.id) else {
            continue;
        };
        if let Some(duration) = item
            .content_details
            .as_ref()
            .and_then(|c| c.duration.as_deref())
            .and_then(format_iso8601_duration)
        {
            video.duration = duration;
        }
        if let Some(view_count) = item
            .statistics
            .as_ref()
            .and_then(|s| s.view_count.as_deref())
            .and_then(|v| v.parse::<i64>().ok())
        {
            video.view_count = view_count;
        }
    }

    Ok(())
}

/// Renders an ISO-8601 duration such as `PT1H2M3S` as `1:02:03` (or `4:05`
/// when under an hour).
pub fn format_iso8601_duration(duration: &str) -> Option<String> {
    let caps = ISO8601_DURATION_RE.captures(duration)?;
    let part = |idx: usize| -> u64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    let hours = part(1) * 24 + part(2);
    let minutes = part(3);
    let seconds = part(4);

    if hours > 0 {
        Some(format!("{hours}:{minutes:02}:{seconds:02}"))
    } else {
        Some(format!("{minutes}:{seconds:02}"))
    }
}
