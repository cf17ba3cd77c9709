pub mod rapidapi;

use std::{fmt::Debug, fmt::Display, future::Future};

use crate::types::TranscriptResult;

pub use rapidapi::{RapidApiTranscriptClient, TranscriptError};

/// Fetches the spoken transcript of a video plus a thumbnail for the digest.
pub trait TranscriptAcquirer {
    type Error: Debug + Display + Send + Sync + 'static;

    fn transcript_and_thumbnail(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<TranscriptResult, Self::Error>> + Send;
}

/// Runtime choice of transcript backend.
///
/// `Disabled` fails every request, which sends each video down the
/// description fallback path of the pipeline.
#[derive(Debug, Clone)]
pub enum TranscriptSource {
    RapidApi(RapidApiTranscriptClient),
    Disabled,
}

impl TranscriptSource {
    pub fn from_api_key(api_key: Option<String>) -> Result<Self, TranscriptError> {
        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => Ok(TranscriptSource::RapidApi(RapidApiTranscriptClient::new(key)?)),
            None => {
                tracing::warn!("No transcript API key provided, summaries will use video descriptions");
                Ok(TranscriptSource::Disabled)
            }
        }
    }
}

impl TranscriptAcquirer for TranscriptSource {
    type Error = TranscriptError;

    async fn transcript_and_thumbnail(&self, video_id: &str) -> Result<TranscriptResult, Self::Error> {
        match self {
            TranscriptSource::RapidApi(client) => client.transcript_and_thumbnail(video_id).await,
            TranscriptSource::Disabled => Err(TranscriptError::Disabled),
        }
    }
}
