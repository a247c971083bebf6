use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub duration: Option<u64>,
    pub view_count: Option<u64>,
    pub formats: Vec<VideoFormat>,
    pub related_videos: Vec<RelatedVideo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFormat {
    pub itag: String,
    pub url: String,
    pub mime_type: String,
    pub has_audio: bool,
    pub has_video: bool,
    pub quality_label: Option<String>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub bitrate: Option<u64>,
    pub audio_bitrate: Option<u64>,
}

/// What a format carries, derived from its audio/video flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    AudioOnly,
    VideoOnly,
    AudioVideo,
}

impl VideoFormat {
    pub fn kind(&self) -> Option<MediaKind> {
        match (self.has_audio, self.has_video) {
            (true, true) => Some(MediaKind::AudioVideo),
            (true, false) => Some(MediaKind::AudioOnly),
            (false, true) => Some(MediaKind::VideoOnly),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedVideo {
    pub id: String,
    pub title: Option<String>,
    /// Popularity as shown by the site, e.g. "1.2M views" or "3,456".
    pub view_count: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchKind {
    Video,
    Playlist,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: String,
    pub title: Option<String>,
    pub link: String,
    pub kind: SearchKind,
}
