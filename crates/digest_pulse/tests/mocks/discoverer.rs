use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use digest_pulse::{types::Video, yt::VideoDiscoverer};

/// Serves canned videos per channel and tracks how many channels are being
/// discovered at the same time
#[derive(Clone, Default)]
pub struct MockDiscoverer {
    pub videos: HashMap<String, Vec<Video>>,
    pub failing_channels: HashSet<String>,
    pub delay: Duration,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub active: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
}

impl MockDiscoverer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(mut self, channel_id: &str, videos: Vec<Video>) -> Self {
        self.videos.insert(channel_id.to_string(), videos);
        self
    }

    pub fn failing_channel(mut self, channel_id: &str) -> Self {
        self.failing_channels.insert(channel_id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl VideoDiscoverer for MockDiscoverer {
    type Error = anyhow::Error;

    async fn channel_videos(
        &self,
        channel_id: &str,
        max_results: usize,
    ) -> Result<Vec<Video>, Self::Error> {
        self.calls.lock().unwrap().push(channel_id.to_string());

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.failing_channels.contains(channel_id) {
            return Err(anyhow::anyhow!("quota exceeded for {channel_id}"));
        }

        Ok(self
            .videos
            .get(channel_id)
            .map(|videos| videos.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}
