pub mod digest;
mod error;
mod llm;
pub mod parser;
mod processor;
pub mod tracing;
pub mod transcript;
pub mod types;
pub mod yt;

pub use error::Error;
pub use llm::anthropic;
pub use llm::summarizer::Summarizer;
pub use processor::{
    builder::VideoProcessorBuilder, config::ProcessorConfig, fallback_thumbnail_url,
    fallback_transcript, generate_summary_id, truncate_transcript, RunReport, SummaryStats,
    VideoOutcome, VideoProcessor, INTER_VIDEO_DELAY, TRUNCATION_MARKER,
};
