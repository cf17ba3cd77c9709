use std::sync::{Arc, Mutex};

use digest_pulse::Summarizer;

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeCall {
    pub transcript: String,
    pub title: String,
}

#[derive(Clone)]
pub struct MockSummarizer {
    pub summary: String,
    pub calls: Arc<Mutex<Vec<SummarizeCall>>>,
    pub fail_with: Option<String>,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            summary: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl Summarizer for MockSummarizer {
    const SUMMARIZER_MODEL: &'static str = "mock-claude";
    type Error = anyhow::Error;

    async fn summarize(&self, transcript: &str, title: &str) -> Result<String, Self::Error> {
        self.calls.lock().unwrap().push(SummarizeCall {
            transcript: transcript.to_string(),
            title: title.to_string(),
        });
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.summary.clone())
    }
}
