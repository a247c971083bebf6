use crate::core::{Error, MediaSource, Result, VideoInfo};
use std::sync::Arc;
use tracing::{debug, info};

/// One playable video, either still to be fetched or already fetched.
///
/// `Fetched` is for callers that already hold the metadata, so playing it
/// does not hit the source again. Mix and radio go through `Id` because they
/// only know the related video's ID.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayableReference {
    Id(String),
    Fetched(Box<VideoInfo>),
}

/// A playlist whose items are listed only when it gets played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistReference {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Playlist(PlaylistReference),
    Video(PlayableReference),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The input itself was an ID or URL.
    Direct,
    /// The target is the top search result.
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub target: Target,
    pub origin: Origin,
}

/// State of the `--id` option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdArg {
    /// Not given.
    #[default]
    Absent,
    /// Given without a value: the positional words are the ID.
    UseDefault,
    Explicit(String),
}

impl IdArg {
    pub fn is_present(&self) -> bool {
        !matches!(self, IdArg::Absent)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub search: bool,
    pub id: IdArg,
}

pub struct Resolver {
    source: Arc<dyn MediaSource>,
}

impl Resolver {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, input: &str, options: &ResolveOptions) -> Result<Resolution> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::Input("Nothing to do: no video selected".to_string()));
        }

        if !options.search {
            if let Some(target) = self.classify(input) {
                debug!("{:?} is a direct {} reference", input, self.source.name());
                return Ok(Resolution {
                    target,
                    origin: Origin::Direct,
                });
            }

            if options.id.is_present() {
                debug!("{:?} is neither a valid ID or URL, searching for it", input);
            }
        }

        self.search(input).await
    }

    /// Playlist patterns win over video patterns, so a watch URL carrying a
    /// `list=` plays the whole list.
    pub fn classify(&self, s: &str) -> Option<Target> {
        if self.source.validate_playlist(s) {
            if let Some(id) = self.source.playlist_id(s) {
                return Some(Target::Playlist(PlaylistReference { id }));
            }
        }

        if self.source.validate_url(s) || self.source.validate_id(s) {
            if let Some(id) = self.source.video_id(s) {
                return Some(Target::Video(PlayableReference::Id(id)));
            }
        }

        None
    }

    async fn search(&self, query: &str) -> Result<Resolution> {
        let results = self
            .source
            .search(query)
            .await
            .map_err(|e| Error::fetch(format!("search results for {:?}", query), e))?;

        // TODO: let the user pick among the results instead of taking the first
        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| Error::Search(query.to_string()))?;

        info!("Search for {:?} selected {}", query, first.link);

        match self.classify(&first.link) {
            Some(target) => Ok(Resolution {
                target,
                origin: Origin::Search,
            }),
            None => Err(Error::Input(format!(
                "{:?} is neither a valid video or playlist URL",
                first.link
            ))),
        }
    }
}
