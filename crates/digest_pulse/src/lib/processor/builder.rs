use std::time::Duration;

use digest_datastore::DataStore;

use crate::{
    error::Error, processor::config::ProcessorConfig, transcript::TranscriptAcquirer,
    yt::VideoDiscoverer, Summarizer, VideoProcessor,
};

pub struct VideoProcessorBuilder<D = (), Y = (), T = (), S = ()> {
    store: D,
    discoverer: Y,
    transcripts: T,
    summarizer: S,
    config: ProcessorConfig,
}

impl VideoProcessorBuilder {
    pub fn new() -> Self {
        Self {
            store: (),
            discoverer: (),
            transcripts: (),
            summarizer: (),
            config: ProcessorConfig::default(),
        }
    }
}

impl Default for VideoProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, Y, T, S> VideoProcessorBuilder<D, Y, T, S> {
    pub fn store<D2: DataStore + Send + Sync + 'static>(
        self,
        store: D2,
    ) -> VideoProcessorBuilder<D2, Y, T, S> {
        VideoProcessorBuilder {
            store,
            discoverer: self.discoverer,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            config: self.config,
        }
    }

    pub fn discoverer<Y2: VideoDiscoverer + Send + Sync + 'static>(
        self,
        discoverer: Y2,
    ) -> VideoProcessorBuilder<D, Y2, T, S> {
        VideoProcessorBuilder {
            store: self.store,
            discoverer,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            config: self.config,
        }
    }

    pub fn transcripts<T2: TranscriptAcquirer + Send + Sync + 'static>(
        self,
        transcripts: T2,
    ) -> VideoProcessorBuilder<D, Y, T2, S> {
        VideoProcessorBuilder {
            store: self.store,
            discoverer: self.discoverer,
            transcripts,
            summarizer: self.summarizer,
            config: self.config,
        }
    }

    pub fn summarizer<S2: Summarizer + Send + Sync + 'static>(
        self,
        summarizer: S2,
    ) -> VideoProcessorBuilder<D, Y, T, S2> {
        VideoProcessorBuilder {
            store: self.store,
            discoverer: self.discoverer,
            transcripts: self.transcripts,
            summarizer,
            config: self.config,
        }
    }

    pub fn config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_concurrent_channels(mut self, max_concurrent_channels: usize) -> Self {
        self.config.max_concurrent_channels = max_concurrent_channels;
        self
    }

    pub fn max_videos_per_channel(mut self, max_videos_per_channel: usize) -> Self {
        self.config.max_videos_per_channel = max_videos_per_channel;
        self
    }

    pub fn transcript_timeout(mut self, transcript_timeout: Duration) -> Self {
        self.config.transcript_timeout = transcript_timeout;
        self
    }

    pub fn max_transcript_length(mut self, max_transcript_length: usize) -> Self {
        self.config.max_transcript_length = max_transcript_length;
        self
    }
}

impl<D, Y, T, S> VideoProcessorBuilder<D, Y, T, S>
where
    D: DataStore + Send + Sync + 'static,
    Y: VideoDiscoverer + Send + Sync + 'static,
    T: TranscriptAcquirer + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    pub fn build(self) -> Result<VideoProcessor<D, Y, T, S>, Error> {
        self.config.validate()?;

        Ok(VideoProcessor {
            store: self.store,
            discoverer: self.discoverer,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            config: self.config,
        })
    }
}
