pub mod smtp;
pub mod template;

use std::{
    fmt::{Debug, Display},
    future::Future,
};

use anyhow::Context;
use digest_datastore::{DataStore, Summary};

use crate::{transcript::TranscriptAcquirer, yt::VideoDiscoverer, Summarizer, VideoProcessor};

pub use smtp::{MailerError, SmtpMailer, SmtpSettings};

/// Delivers a batch of summaries to the reader.
pub trait DigestMailer {
    type Error: Debug + Display + Send + Sync + 'static;

    fn send_digest(
        &self,
        summaries: &[Summary],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl<M: DigestMailer + Send + Sync> DigestMailer for &M {
    type Error = M::Error;

    fn send_digest(
        &self,
        summaries: &[Summary],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        (**self).send_digest(summaries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestOutcome {
    NothingPending,
    /// Number of summaries sent and marked processed
    Delivered(usize),
}

/// Sends every pending summary in one digest, then marks exactly those
/// summaries processed.
///
/// A mailer failure leaves all of them pending for the next attempt.
#[tracing::instrument(skip_all)]
pub async fn deliver_pending_digest<D, Y, T, S, M>(
    processor: &VideoProcessor<D, Y, T, S>,
    mailer: &M,
) -> anyhow::Result<DigestOutcome>
where
    D: DataStore + Send + Sync + 'static,
    Y: VideoDiscoverer + Send + Sync + 'static,
    T: TranscriptAcquirer + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    M: DigestMailer + Send + Sync,
{
    let pending = processor.process_pending_summaries_for_email().await?;
    if pending.is_empty() {
        tracing::info!("No pending summaries to send");
        return Ok(DigestOutcome::NothingPending);
    }

    mailer
        .send_digest(&pending)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send email digest: {e}"))?;

    let ids = pending.iter().map(|s| s.id.clone()).collect::<Vec<_>>();
    processor
        .store()
        .mark_summaries_processed(&ids)
        .await
        .context("Digest sent but failed to mark summaries as processed")?;

    tracing::info!(count = ids.len(), "Delivered digest and marked summaries processed");
    Ok(DigestOutcome::Delivered(ids.len()))
}
