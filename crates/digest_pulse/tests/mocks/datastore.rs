use std::sync::{Arc, Mutex};

use digest_datastore::{Channel, DataStore, MemoryDataStore, Summary};

/// In-memory ledger that records digest batches and can fail on demand
#[derive(Clone, Default)]
pub struct MockDataStore {
    pub inner: MemoryDataStore,
    pub marked_batches: Arc<Mutex<Vec<Vec<String>>>>,
    pub fail_with: Option<String>,
    /// Fails only `mark_video_processed`
    pub fail_mark_video_with: Option<String>,
}

impl MockDataStore {
    pub fn with_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            inner: MemoryDataStore::with_channels(channels),
            ..Default::default()
        }
    }

    /// Every ledger call fails with `msg`
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_video_marks(mut self, msg: &str) -> Self {
        self.fail_mark_video_with = Some(msg.to_string());
        self
    }

    pub fn summaries(&self) -> Vec<Summary> {
        self.inner.summaries().unwrap()
    }

    fn check(&self) -> anyhow::Result<()> {
        match self.fail_with {
            Some(ref msg) => Err(anyhow::anyhow!("{}", msg)),
            None => Ok(()),
        }
    }
}

impl DataStore for MockDataStore {
    async fn list_channels(&self) -> anyhow::Result<Vec<Channel>> {
        self.check()?;
        self.inner.list_channels().await
    }

    async fn add_channel(&self, channel: &Channel) -> anyhow::Result<()> {
        self.check()?;
        self.inner.add_channel(channel).await
    }

    async fn is_video_processed(&self, video_id: &str) -> anyhow::Result<bool> {
        self.check()?;
        self.inner.is_video_processed(video_id).await
    }

    async fn mark_video_processed(&self, video_id: &str) -> anyhow::Result<()> {
        self.check()?;
        if let Some(ref msg) = self.fail_mark_video_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.inner.mark_video_processed(video_id).await
    }

    async fn save_summary(&self, summary: &Summary) -> anyhow::Result<()> {
        self.check()?;
        self.inner.save_summary(summary).await
    }

    async fn list_pending_summaries(&self) -> anyhow::Result<Vec<Summary>> {
        self.check()?;
        self.inner.list_pending_summaries().await
    }

    async fn mark_summaries_processed(&self, summary_ids: &[String]) -> anyhow::Result<()> {
        self.check()?;
        self.marked_batches.lock().unwrap().push(summary_ids.to_vec());
        self.inner.mark_summaries_processed(summary_ids).await
    }
}
