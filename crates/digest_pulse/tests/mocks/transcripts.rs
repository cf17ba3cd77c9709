use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use digest_pulse::{transcript::TranscriptAcquirer, types::TranscriptResult};

#[derive(Clone)]
pub struct MockTranscripts {
    pub transcript: String,
    pub thumbnail_url: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
    pub delay: Duration,
}

impl MockTranscripts {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            thumbnail_url: "https://i.ytimg.com/vi/mock/hqdefault.jpg".to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new("")
        }
    }

    /// Answers only after `delay`, long enough to trip the transcript timeout
    pub fn slow(transcript: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(transcript)
        }
    }
}

impl TranscriptAcquirer for MockTranscripts {
    type Error = anyhow::Error;

    async fn transcript_and_thumbnail(&self, video_id: &str) -> Result<TranscriptResult, Self::Error> {
        self.calls.lock().unwrap().push(video_id.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        Ok(TranscriptResult {
            transcript: self.transcript.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
        })
    }
}
