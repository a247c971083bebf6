use crate::core::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Hands one stream URL to something that plays it and waits until it is done.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, stream_url: &str) -> Result<()>;
}

/// Runs an external player executable (`mpv` by default) in the foreground.
pub struct ProcessLauncher {
    pub program: String,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, stream_url: &str) -> Result<()> {
        debug!("Spawning {} for {}", self.program, stream_url);

        let mut child = Command::new(&self.program)
            .arg(stream_url)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Process {
                program: self.program.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| Error::Process {
            program: self.program.clone(),
            source,
        })?;

        if status.success() {
            return Ok(());
        }

        Err(Error::Playback(match status.code() {
            Some(code) => format!("Player exited with status {}", code),
            None => "Player was terminated by a signal".to_string(),
        }))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exit_status_maps_to_result() {
        assert!(ProcessLauncher::new("true").launch("ignored").await.is_ok());

        let err = ProcessLauncher::new("false").launch("ignored").await.unwrap_err();
        assert!(matches!(err, Error::Playback(ref msg) if msg.contains("status 1")));
    }

    #[tokio::test]
    async fn test_missing_player_is_a_process_error() {
        let err = ProcessLauncher::new("ytmp-no-such-player")
            .launch("ignored")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Process { .. }));
    }
}
