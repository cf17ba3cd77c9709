use std::sync::{Arc, Mutex};

use digest_datastore::Summary;
use digest_pulse::digest::DigestMailer;

#[derive(Clone, Default)]
pub struct MockMailer {
    /// Summary ids of every digest handed to the mailer
    pub sent: Arc<Mutex<Vec<Vec<String>>>>,
    pub fail_with: Option<String>,
}

impl MockMailer {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl DigestMailer for MockMailer {
    type Error = anyhow::Error;

    async fn send_digest(&self, summaries: &[Summary]) -> Result<(), Self::Error> {
        self.sent
            .lock()
            .unwrap()
            .push(summaries.iter().map(|s| s.id.clone()).collect());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(())
    }
}
