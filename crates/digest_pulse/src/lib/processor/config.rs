use std::time::Duration;

use crate::error::Error;

/// Tunables of a processing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Channels processed at the same time
    pub max_concurrent_channels: usize,
    /// Most recent videos fetched per channel per run
    pub max_videos_per_channel: usize,
    /// Upper bound on a single transcript request
    pub transcript_timeout: Duration,
    /// Characters of transcript handed to the summarizer before truncation
    pub max_transcript_length: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_channels: 3,
            max_videos_per_channel: 1,
            transcript_timeout: Duration::from_secs(30),
            max_transcript_length: 15_000,
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_concurrent_channels == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent_channels must be greater than 0",
            ));
        }
        if self.max_videos_per_channel == 0 {
            return Err(Error::InvalidConfig(
                "max_videos_per_channel must be greater than 0",
            ));
        }
        if self.transcript_timeout.is_zero() {
            return Err(Error::InvalidConfig("transcript_timeout must be greater than 0"));
        }
        if self.max_transcript_length == 0 {
            return Err(Error::InvalidConfig(
                "max_transcript_length must be greater than 0",
            ));
        }
        Ok(())
    }
}
