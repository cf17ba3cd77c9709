pub mod anthropic;
pub mod summarizer;
