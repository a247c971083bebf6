use crate::core::{Playlist, SearchItem, VideoInfo};
use anyhow::Result;
use async_trait::async_trait;

/// A site that can answer metadata, search and playlist queries.
#[async_trait]
pub trait MediaSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bare video ID check.
    fn validate_id(&self, s: &str) -> bool;

    /// Video URL check.
    fn validate_url(&self, s: &str) -> bool;

    /// Playlist or channel, as an ID or a URL.
    fn validate_playlist(&self, s: &str) -> bool;

    /// Reduce a video ID or URL to its canonical ID.
    fn video_id(&self, s: &str) -> Option<String>;

    /// Reduce a playlist or channel ID or URL to a canonical playlist ID.
    fn playlist_id(&self, s: &str) -> Option<String>;

    async fn info(&self, id: &str) -> Result<VideoInfo>;

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>>;

    async fn playlist(&self, id: &str) -> Result<Playlist>;
}
