use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Player executable, called as `<player> <stream url>`.
    pub player: String,
    /// Where `--saveinfo` without a value writes.
    pub info_path: PathBuf,
    pub user_agent: String,
    /// HTTP timeout in seconds.
    pub timeout: u64,
    /// Stop listing a playlist after this many items.
    pub playlist_limit: usize,
    pub radio_max_depth: Option<usize>,
    pub radio_skip_visited: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: "mpv".to_string(),
            info_path: PathBuf::from("info.json"),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout: 30,
            playlist_limit: 100,
            radio_max_depth: None,
            radio_skip_visited: true,
        }
    }
}

impl Config {
    /// Load from `path`, or from the first default location that exists.
    /// No file at all means defaults. Call `validate` once overrides are in.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = std::env::var_os("YTMP_CONFIG") {
            paths.push(PathBuf::from(path));
        }
        if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(dir).join("ytmp").join("config.toml"));
        }
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".config").join("ytmp").join("config.toml"));
        }
        paths
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.player.trim().is_empty() {
            anyhow::bail!("player must not be empty");
        }
        if self.playlist_limit == 0 {
            anyhow::bail!("playlist_limit must be at least 1");
        }
        if self.timeout == 0 {
            anyhow::bail!("timeout must be at least 1 second");
        }
        Ok(())
    }
}
