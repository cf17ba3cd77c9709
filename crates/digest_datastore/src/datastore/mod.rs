use std::future::Future;

use crate::{Channel, Summary};

pub mod memory;
pub mod postgres;

/// Persistence contract consumed by the digest pipeline.
///
/// Implementations must be safe to call concurrently from several channel
/// tasks: summary writes and processed marks may interleave freely.
pub trait DataStore {
    fn list_channels(&self) -> impl Future<Output = anyhow::Result<Vec<Channel>>> + Send;

    /// Adds a channel to monitor. Re-adding an existing id is a no-op.
    fn add_channel(&self, channel: &Channel) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn is_video_processed(&self, video_id: &str)
        -> impl Future<Output = anyhow::Result<bool>> + Send;

    /// Marking an already processed video is a no-op, not an error.
    fn mark_video_processed(&self, video_id: &str)
        -> impl Future<Output = anyhow::Result<()>> + Send;

    fn save_summary(&self, summary: &Summary) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Summaries whose status is still `New`, oldest first.
    fn list_pending_summaries(&self) -> impl Future<Output = anyhow::Result<Vec<Summary>>> + Send;

    /// Moves the given summaries from `New` to `Processed`. Unknown ids are ignored.
    fn mark_summaries_processed(
        &self,
        summary_ids: &[String],
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl<T: DataStore + Send + Sync> DataStore for &T {
    async fn list_channels(&self) -> anyhow::Result<Vec<Channel>> {
        (**self).list_channels().await
    }

    async fn add_channel(&self, channel: &Channel) -> anyhow::Result<()> {
        (**self).add_channel(channel).await
    }

    async fn is_video_processed(&self, video_id: &str) -> anyhow::Result<bool> {
        (**self).is_video_processed(video_id).await
    }

    async fn mark_video_processed(&self, video_id: &str) -> anyhow::Result<()> {
        (**self).mark_video_processed(video_id).await
    }

    async fn save_summary(&self, summary: &Summary) -> anyhow::Result<()> {
        (**self).save_summary(summary).await
    }

    async fn list_pending_summaries(&self) -> anyhow::Result<Vec<Summary>> {
        (**self).list_pending_summaries().await
    }

    async fn mark_summaries_processed(&self, summary_ids: &[String]) -> anyhow::Result<()> {
        (**self).mark_summaries_processed(summary_ids).await
    }
}
