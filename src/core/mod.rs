pub mod continuation;
pub mod error;
pub mod format;
pub mod launcher;
pub mod metadata;
pub mod player;
pub mod resolver;
pub mod session;
pub mod source;

pub use continuation::{rank_related, ContinuationPlan, ModeFlags, RadioOptions};
pub use error::{Error, Result};
pub use format::{select_format, FormatPreference};
pub use launcher::{Launcher, ProcessLauncher};
pub use metadata::{
    MediaKind, Playlist, PlaylistItem, RelatedVideo, SearchItem, SearchKind, VideoFormat, VideoInfo,
};
pub use player::{PlaybackOptions, Player};
pub use resolver::{
    IdArg, Origin, PlayableReference, PlaylistReference, Resolution, ResolveOptions, Resolver,
    Target,
};
pub use session::{SelectOptions, Session};
pub use source::MediaSource;
