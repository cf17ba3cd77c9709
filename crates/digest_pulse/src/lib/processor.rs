pub mod builder;
pub mod config;

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use digest_datastore::{Channel, DataStore, Summary, SummaryStatus};
use futures::future::join_all;
use rand_core::{OsRng, RngCore};
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::{
    processor::config::ProcessorConfig,
    transcript::TranscriptAcquirer,
    types::{TranscriptResult, Video},
    yt::VideoDiscoverer,
    Summarizer,
};

/// Fixed pause between two videos of the same channel, keeps the discovery
/// and transcript APIs from throttling us
pub const INTER_VIDEO_DELAY: Duration = Duration::from_secs(2);

/// Fallback transcripts shorter than this are replaced by a generic sentence
pub const MIN_FALLBACK_TRANSCRIPT_LEN: usize = 50;

pub const TRUNCATION_MARKER: &str = "... [truncated]";

// The core channel -> transcript -> summary processor
#[derive(Debug)]
pub struct VideoProcessor<D, Y, T, S>
where
    D: DataStore + Send + Sync + 'static,
    Y: VideoDiscoverer + Send + Sync + 'static,
    T: TranscriptAcquirer + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    store: D,
    discoverer: Y,
    transcripts: T,
    summarizer: S,
    config: ProcessorConfig,
}

/// Totals of one `process_new_videos` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub channels_total: usize,
    pub channels_failed: usize,
    pub channels_not_started: usize,
    pub videos_processed: usize,
    pub videos_skipped: usize,
    pub videos_failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoOutcome {
    Processed(Summary),
    /// The ledger already had the video, nothing was done
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub pending_summaries: usize,
    pub last_check: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ChannelReport {
    processed: usize,
    skipped: usize,
    failed: usize,
}

enum ChannelOutcome {
    Completed(ChannelReport),
    Failed,
    NotStarted,
}

impl<D, Y, T, S> VideoProcessor<D, Y, T, S>
where
    D: DataStore + Send + Sync + 'static,
    Y: VideoDiscoverer + Send + Sync + 'static,
    T: TranscriptAcquirer + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    pub fn store(&self) -> &D {
        &self.store
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Processes new videos of every monitored channel.
    ///
    /// At most `max_concurrent_channels` channels run at once. A failing
    /// channel is logged and counted but never aborts its siblings; the only
    /// error returned is failing to read the channel list itself.
    #[tracing::instrument(skip_all)]
    pub async fn process_new_videos(&self, cancel: &CancellationToken) -> anyhow::Result<RunReport> {
        tracing::info!("Starting video processing cycle");

        let channels = self
            .store
            .list_channels()
            .await
            .context("Failed to get channels")?;

        if channels.is_empty() {
            tracing::info!("No channels configured for monitoring");
            return Ok(RunReport::default());
        }

        tracing::info!(count = channels.len(), "Processing channels");

        let gate = Semaphore::new(self.config.max_concurrent_channels);
        // one slot per channel so a failing channel never waits on the queue
        let (error_tx, mut error_rx) = mpsc::channel::<anyhow::Error>(channels.len());

        let outcomes = join_all(
            channels
                .iter()
                .map(|channel| self.admit_channel(channel, &gate, cancel, error_tx.clone())),
        )
        .await;
        drop(error_tx);

        let mut report = RunReport {
            channels_total: channels.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                ChannelOutcome::Completed(channel) => {
                    report.videos_processed += channel.processed;
                    report.videos_skipped += channel.skipped;
                    report.videos_failed += channel.failed;
                }
                ChannelOutcome::Failed => report.channels_failed += 1,
                ChannelOutcome::NotStarted => report.channels_not_started += 1,
            }
        }

        let mut errors = Vec::new();
        while let Ok(err) = error_rx.try_recv() {
            errors.push(err);
        }
        if !errors.is_empty() {
            tracing::warn!(error_count = errors.len(), "Some channels failed to process");
            for err in &errors {
                tracing::error!(error = ?err, "Channel processing error");
            }
        }

        tracing::info!(?report, "Completed video processing cycle");
        Ok(report)
    }

    /// Waits for a slot in the admission gate, then processes the channel
    async fn admit_channel(
        &self,
        channel: &Channel,
        gate: &Semaphore,
        cancel: &CancellationToken,
        error_tx: mpsc::Sender<anyhow::Error>,
    ) -> ChannelOutcome {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = gate.acquire() => permit.ok(),
        };
        let Some(_permit) = permit else {
            tracing::info!(channel_id = %channel.id, "Channel not started, run cancelled");
            return ChannelOutcome::NotStarted;
        };

        match self.process_channel(channel, cancel).await {
            Ok(report) => ChannelOutcome::Completed(report),
            Err(err) => {
                // logged once, by the run summary
                let err = err.context(format!("channel {} ({})", channel.name, channel.id));
                if let Err(unsent) = error_tx.try_send(err) {
                    tracing::error!(error = ?unsent.into_inner(), "Channel processing error");
                }
                ChannelOutcome::Failed
            }
        }
    }

    /// Processes the latest videos of a single channel, one after the other
    #[tracing::instrument(skip_all, fields(channel_id = %channel.id, channel_name = %channel.name))]
    async fn process_channel(
        &self,
        channel: &Channel,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ChannelReport> {
        let videos = self
            .discoverer
            .channel_videos(&channel.id, self.config.max_videos_per_channel)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get channel videos: {e}"))?;

        tracing::debug!(count = videos.len(), "Retrieved videos from channel");

        let mut report = ChannelReport::default();
        for (idx, video) in videos.iter().enumerate() {
            if idx > 0 {
                tracing::debug!(delay = ?INTER_VIDEO_DELAY, "Rate limiting before next video");
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(INTER_VIDEO_DELAY) => {}
                }
            }
            if cancel.is_cancelled() {
                tracing::info!(remaining = videos.len() - idx, "Run cancelled, stopping channel");
                break;
            }

            match self.process_video(video).await {
                Ok(VideoOutcome::Processed(_)) => report.processed += 1,
                Ok(VideoOutcome::Skipped) => report.skipped += 1,
                Err(err) => {
                    tracing::error!(
                        error = ?err,
                        video_id = %video.id,
                        title = %video.title,
                        "Failed to process video"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            total_videos = videos.len(),
            processed_videos = report.processed,
            "Completed channel processing"
        );

        Ok(report)
    }

    /// Transcribes, summarizes and records a single video.
    ///
    /// Videos the ledger already knows are skipped, so calling this twice for
    /// the same id yields one summary and one processed mark.
    #[tracing::instrument(skip_all, fields(video_id = %video.id))]
    pub async fn process_video(&self, video: &Video) -> anyhow::Result<VideoOutcome> {
        let already_processed = self
            .store
            .is_video_processed(&video.id)
            .await
            .context("Failed to check if video is processed")?;
        if already_processed {
            tracing::debug!("Video already processed, skipping");
            return Ok(VideoOutcome::Skipped);
        }

        let TranscriptResult {
            transcript,
            thumbnail_url,
        } = self.acquire_transcript(video).await;

        let transcript = truncate_transcript(transcript, self.config.max_transcript_length);

        let summary_text = self
            .summarizer
            .summarize(&transcript, &video.title)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to generate summary: {e}"))?;

        let summary = Summary {
            id: generate_summary_id(),
            video_id: video.id.clone(),
            video_title: video.title.clone(),
            channel_name: video.channel_name.clone(),
            summary: summary_text,
            created_at: Utc::now(),
            status: SummaryStatus::New,
            video_url: video.url.clone(),
            published_at: video.published_at,
            thumbnail_url,
            duration: video.duration.clone(),
            view_count: video.view_count,
        };

        self.store
            .save_summary(&summary)
            .await
            .context("Failed to save summary")?;

        self.store
            .mark_video_processed(&video.id)
            .await
            .context("Failed to mark video as processed")?;

        tracing::info!(
            title = %video.title,
            summary_len = summary.summary.len(),
            "Successfully processed video"
        );

        Ok(VideoOutcome::Processed(summary))
    }

    /// Real transcript when the acquirer answers in time, otherwise a
    /// synthetic one built from the video metadata
    async fn acquire_transcript(&self, video: &Video) -> TranscriptResult {
        let attempt = tokio::time::timeout(
            self.config.transcript_timeout,
            self.transcripts.transcript_and_thumbnail(&video.id),
        )
        .await;

        let reason = match attempt {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", self.config.transcript_timeout),
        };

        tracing::warn!(error = %reason, "Transcript failed, using video description as fallback");
        TranscriptResult {
            transcript: fallback_transcript(video),
            thumbnail_url: fallback_thumbnail_url(&video.id),
        }
    }

    /// Summaries still waiting for a digest. Nothing is modified; the caller
    /// marks them processed once the digest went out.
    #[tracing::instrument(skip_all)]
    pub async fn process_pending_summaries_for_email(&self) -> anyhow::Result<Vec<Summary>> {
        let summaries = self
            .store
            .list_pending_summaries()
            .await
            .context("Failed to get pending summaries")?;

        tracing::info!(count = summaries.len(), "Retrieved pending summaries for email");
        Ok(summaries)
    }

    pub async fn summary_stats(&self) -> anyhow::Result<SummaryStats> {
        let pending = self
            .store
            .list_pending_summaries()
            .await
            .context("Failed to get pending summaries")?;

        Ok(SummaryStats {
            pending_summaries: pending.len(),
            last_check: Utc::now(),
        })
    }
}

/// Title and description of the video, or a generic sentence when those are
/// too thin to summarize
pub fn fallback_transcript(video: &Video) -> String {
    let transcript = format!(
        "Video Title: {}\n\nVideo Description: {}",
        video.title, video.description
    );
    if transcript.chars().count() >= MIN_FALLBACK_TRANSCRIPT_LEN {
        return transcript;
    }

    format!(
        "Video Title: {}\n\nThis video discusses topics related to the title. Please watch the video for detailed content.",
        video.title
    )
}

pub fn fallback_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

/// Keeps the first `max_len` characters and appends [`TRUNCATION_MARKER`]
/// when anything was cut
pub fn truncate_transcript(mut transcript: String, max_len: usize) -> String {
    if let Some((byte_idx, _)) = transcript.char_indices().nth(max_len) {
        transcript.truncate(byte_idx);
        transcript.push_str(TRUNCATION_MARKER);
        tracing::debug!(max_len, "Truncated long transcript");
    }
    transcript
}

/// `sum_` followed by 8 random bytes in hex, or by the current unix time in
/// nanoseconds when the OS RNG is unavailable
pub fn generate_summary_id() -> String {
    let mut bytes = [0u8; 8];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => {
            let hex = bytes.iter().map(|b| format!("{b:02x}")).collect::<String>();
            format!("sum_{hex}")
        }
        Err(e) => {
            tracing::warn!(error = %e, "OS randomness unavailable, using timestamp id");
            format!("sum_{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str, description: &str) -> Video {
        Video {
            id: "vid1".into(),
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fallback_uses_title_and_description() {
        let transcript = fallback_transcript(&video(
            "Async Rust in practice",
            "We build a scheduler from scratch",
        ));
        assert_eq!(
            transcript,
            "Video Title: Async Rust in practice\n\nVideo Description: We build a scheduler from scratch"
        );
    }

    #[test]
    fn test_short_fallback_uses_generic_sentence() {
        // 49 characters with the labels, just under the threshold
        let transcript = fallback_transcript(&video("Short", "0123456789"));
        assert!(transcript.starts_with("Video Title: Short\n\nThis video discusses"));
        assert!(!transcript.contains("0123456789"));
    }

    #[test]
    fn test_fallback_thumbnail_is_max_resolution() {
        assert_eq!(
            fallback_thumbnail_url("abc"),
            "https://img.youtube.com/vi/abc/maxresdefault.jpg"
        );
    }

    #[test]
    fn test_truncate_appends_marker_only_when_cut() {
        let long = "x".repeat(120);
        let truncated = truncate_transcript(long, 100);
        assert_eq!(truncated.len(), 100 + TRUNCATION_MARKER.len());
        assert!(truncated.ends_with(TRUNCATION_MARKER));

        let exact = "y".repeat(100);
        assert_eq!(truncate_transcript(exact.clone(), 100), exact);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let truncated = truncate_transcript("héllo wörld".to_string(), 2);
        assert_eq!(truncated, format!("hé{TRUNCATION_MARKER}"));
    }

    #[test]
    fn test_summary_id_is_prefixed_hex() {
        let id = generate_summary_id();
        let hex = id.strip_prefix("sum_").expect("id should be prefixed");
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_summary_id());
    }
}
