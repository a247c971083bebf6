use crate::core::format::{select_format, FormatPreference};
use crate::core::{
    Error, Launcher, MediaSource, PlayableReference, PlaylistReference, Result, Target, VideoInfo,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct PlaybackOptions {
    pub preference: FormatPreference,
    /// Don't print titles to stdout.
    pub quiet: bool,
    /// Write each video's info as JSON here before playing it.
    pub save_info: Option<PathBuf>,
}

/// Plays videos and playlists one stream at a time.
pub struct Player {
    source: Arc<dyn MediaSource>,
    launcher: Arc<dyn Launcher>,
    pub options: PlaybackOptions,
}

impl Player {
    pub fn new(
        source: Arc<dyn MediaSource>,
        launcher: Arc<dyn Launcher>,
        options: PlaybackOptions,
    ) -> Self {
        Self {
            source,
            launcher,
            options,
        }
    }

    /// Play a resolved target. Returns the info of the last video played, or
    /// `None` for an empty playlist.
    pub async fn play(&self, target: Target) -> Result<Option<VideoInfo>> {
        match target {
            Target::Playlist(playlist) => self.play_playlist(&playlist).await,
            Target::Video(video) => self.play_video(video).await.map(Some),
        }
    }

    pub async fn play_playlist(&self, reference: &PlaylistReference) -> Result<Option<VideoInfo>> {
        let playlist = self
            .source
            .playlist(&reference.id)
            .await
            .map_err(|e| Error::fetch(format!("playlist {}", reference.id), e))?;

        info!("Playing playlist: {}", playlist.title);

        let mut last = None;
        for item in playlist.items {
            last = Some(self.play_video(PlayableReference::Id(item.id)).await?);
        }

        info!("End of playlist");

        Ok(last)
    }

    pub async fn play_video(&self, reference: PlayableReference) -> Result<VideoInfo> {
        let info = match reference {
            PlayableReference::Fetched(info) => *info,
            PlayableReference::Id(id) => self
                .source
                .info(&id)
                .await
                .map_err(|e| Error::fetch(format!("video {}", id), e))?,
        };

        if let Some(path) = &self.options.save_info {
            save_info(&info, path).await?;
        }

        let format = select_format(&info.formats, self.options.preference)?;
        debug!(
            "Selected format {} ({}) for {}",
            format.itag, format.mime_type, info.id
        );

        if !self.options.quiet {
            println!("{}", info.title);
        }

        self.launcher.launch(&format.url).await?;

        Ok(info)
    }
}

async fn save_info(info: &VideoInfo, path: &Path) -> Result<()> {
    let snapshot = |source| Error::Snapshot {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(info).map_err(|e| snapshot(std::io::Error::other(e)))?;
    tokio::fs::write(path, json).await.map_err(snapshot)?;

    debug!("Saved video info to {}", path.display());
    Ok(())
}
