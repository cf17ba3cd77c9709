use std::{fmt::Debug, fmt::Display, future::Future};

pub trait Summarizer {
    const SUMMARIZER_MODEL: &'static str;

    type Error: Debug + Display + Send + Sync + 'static;

    /// Summarizes `transcript` of the video titled `title`
    fn summarize(
        &self,
        transcript: &str,
        title: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
