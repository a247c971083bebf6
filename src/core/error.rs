use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Empty or unrecognized selector.
    #[error("{0}")]
    Input(String),

    #[error("search for {0:?} returned no results")]
    Search(String),

    #[error("failed to fetch {what}: {source:#}")]
    Fetch {
        what: String,
        #[source]
        source: anyhow::Error,
    },

    /// No acceptable format, or the player exited unsuccessfully.
    #[error("{0}")]
    Playback(String),

    #[error("could not start player {program:?}: {source}")]
    Process {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write video info to {}: {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn fetch(what: impl Into<String>, source: anyhow::Error) -> Self {
        Error::Fetch {
            what: what.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
