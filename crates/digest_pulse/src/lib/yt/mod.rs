pub mod client;

use std::{fmt::Debug, fmt::Display, future::Future};

use crate::types::Video;

/// Lists the most recent uploads of a channel.
pub trait VideoDiscoverer {
    type Error: Debug + Display + Send + Sync + 'static;

    /// Up to `max_results` videos of `channel_id`, newest first.
    fn channel_videos(
        &self,
        channel_id: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<Video>, Self::Error>> + Send;
}
