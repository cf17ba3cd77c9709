//! In-memory ledger.
//!
//! Cloning shares the underlying state, which lets tests keep a handle on the
//! store after handing it to the pipeline.

use std::{
    collections::HashSet,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{datastore::DataStore, Channel, Summary, SummaryStatus};

#[derive(Debug, Default)]
struct Ledger {
    channels: Vec<Channel>,
    processed_videos: HashSet<String>,
    summaries: Vec<Summary>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDataStore {
    ledger: Arc<RwLock<Ledger>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let store = Self::default();
        if let Ok(mut ledger) = store.ledger.write() {
            ledger.channels.extend(channels);
        }
        store
    }

    /// Every summary ever saved, regardless of status
    pub fn summaries(&self) -> anyhow::Result<Vec<Summary>> {
        Ok(self.read()?.summaries.clone())
    }

    pub fn processed_video_ids(&self) -> anyhow::Result<HashSet<String>> {
        Ok(self.read()?.processed_videos.clone())
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, Ledger>> {
        self.ledger
            .read()
            .map_err(|_| anyhow::anyhow!("In-memory ledger lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<RwLockWriteGuard<'_, Ledger>> {
        self.ledger
            .write()
            .map_err(|_| anyhow::anyhow!("In-memory ledger lock poisoned"))
    }
}

impl DataStore for MemoryDataStore {
    async fn list_channels(&self) -> anyhow::Result<Vec<Channel>> {
        Ok(self.read()?.channels.clone())
    }

    async fn add_channel(&self, channel: &Channel) -> anyhow::Result<()> {
        let mut ledger = self.write()?;
        if !ledger.channels.iter().any(|c| c.id == channel.id) {
            ledger.channels.push(channel.clone());
        }
        Ok(())
    }

    async fn is_video_processed(&self, video_id: &str) -> anyhow::Result<bool> {
        Ok(self.read()?.processed_videos.contains(video_id))
    }

    async fn mark_video_processed(&self, video_id: &str) -> anyhow::Result<()> {
        self.write()?.processed_videos.insert(video_id.to_string());
        Ok(())
    }

    async fn save_summary(&self, summary: &Summary) -> anyhow::Result<()> {
        let mut ledger = self.write()?;
        if ledger.summaries.iter().any(|s| s.id == summary.id) {
            anyhow::bail!("Summary {} already exists", summary.id);
        }
        ledger.summaries.push(summary.clone());
        Ok(())
    }

    async fn list_pending_summaries(&self) -> anyhow::Result<Vec<Summary>> {
        let mut pending = self
            .read()?
            .summaries
            .iter()
            .filter(|s| s.is_pending())
            .cloned()
            .collect::<Vec<_>>();
        pending.sort_by_key(|s| s.created_at);
        Ok(pending)
    }

    async fn mark_summaries_processed(&self, summary_ids: &[String]) -> anyhow::Result<()> {
        if summary_ids.is_empty() {
            return Ok(());
        }
        let ids = summary_ids.iter().map(String::as_str).collect::<HashSet<_>>();

        let mut ledger = self.write()?;
        let mut updated = 0;
        for summary in ledger
            .summaries
            .iter_mut()
            .filter(|s| ids.contains(s.id.as_str()))
        {
            if summary.status == SummaryStatus::New {
                updated += 1;
            }
            summary.status = SummaryStatus::Processed;
        }
        tracing::debug!(requested = ids.len(), updated, "Marked summaries as processed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn summary(id: &str, minutes_ago: i64) -> Summary {
        let created_at = Utc::now() - Duration::minutes(minutes_ago);
        Summary {
            id: id.to_string(),
            video_id: format!("vid-{id}"),
            video_title: "A title".to_string(),
            channel_name: "A channel".to_string(),
            summary: "A summary".to_string(),
            created_at,
            status: SummaryStatus::New,
            video_url: format!("https://www.youtube.com/watch?v=vid-{id}"),
            published_at: created_at,
            thumbnail_url: String::new(),
            duration: "4:05".to_string(),
            view_count: 10,
        }
    }

    #[tokio::test]
    async fn test_pending_excludes_processed_summaries() {
        let store = MemoryDataStore::new();
        store.save_summary(&summary("a", 3)).await.unwrap();
        store.save_summary(&summary("b", 2)).await.unwrap();
        store.save_summary(&summary("c", 1)).await.unwrap();

        store
            .mark_summaries_processed(&["b".to_string()])
            .await
            .unwrap();

        let pending = store.list_pending_summaries().await.unwrap();
        let ids = pending.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "c"], "pending should be oldest first without b");
        assert!(pending.iter().all(Summary::is_pending));

        // Processed never flips back
        store
            .mark_summaries_processed(&["b".to_string(), "unknown".to_string()])
            .await
            .unwrap();
        let all = store.summaries().unwrap();
        let b = all.iter().find(|s| s.id == "b").unwrap();
        assert_eq!(b.status, SummaryStatus::Processed);
    }

    #[tokio::test]
    async fn test_mark_video_processed_is_idempotent() {
        let store = MemoryDataStore::new();
        assert!(!store.is_video_processed("v1").await.unwrap());

        store.mark_video_processed("v1").await.unwrap();
        store.mark_video_processed("v1").await.unwrap();

        assert!(store.is_video_processed("v1").await.unwrap());
        assert_eq!(store.processed_video_ids().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_channel_ignores_duplicates() {
        let store = MemoryDataStore::with_channels([Channel::new("UC1", "One")]);
        store.add_channel(&Channel::new("UC1", "Renamed")).await.unwrap();
        store.add_channel(&Channel::new("UC2", "Two")).await.unwrap();

        let channels = store.list_channels().await.unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].name, "One");
    }

    #[tokio::test]
    async fn test_duplicate_summary_id_is_rejected() {
        let store = MemoryDataStore::new();
        store.save_summary(&summary("a", 1)).await.unwrap();
        assert!(store.save_summary(&summary("a", 1)).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_do_not_lose_records() {
        let store = MemoryDataStore::new();
        let handles = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.save_summary(&summary(&i.to_string(), 0)).await?;
                    store.mark_video_processed(&format!("vid-{i}")).await
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.summaries().unwrap().len(), 16);
        assert_eq!(store.processed_video_ids().unwrap().len(), 16);
    }
}
