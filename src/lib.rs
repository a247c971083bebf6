pub mod cli;
pub mod config;
pub mod core;
pub mod extractors;
pub mod utils;

pub use crate::core::{Launcher, MediaSource, Player, Resolver, Session, VideoInfo};
pub use extractors::YouTubeSource;
