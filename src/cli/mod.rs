use crate::config::Config;
use crate::core::{
    FormatPreference, IdArg, ModeFlags, PlaybackOptions, Player, ProcessLauncher, RadioOptions,
    ResolveOptions, SelectOptions, Session,
};
use crate::extractors::YouTubeSource;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ytmp")]
#[command(about = "Play YouTube videos, playlists, mixes and radios in an external player")]
#[command(version)]
pub struct Cli {
    /// Video, playlist or channel ID/URL, or search terms
    #[arg(value_name = "STRING")]
    pub words: Vec<String>,

    /// Play the selected playlist and/or video, then exit
    #[arg(short = 'x', long)]
    pub play: bool,

    /// After the playlist or video is over, play its related videos once
    #[arg(short, long)]
    pub mix: bool,

    /// At the end, don't exit but start an endless radio instead
    #[arg(short, long)]
    pub radio: bool,

    /// Search for the positional words and use the first result
    #[arg(short, long)]
    pub search: bool,

    /// Use the given ID or URL; without a value the positional words are used
    #[arg(
        short = 'i',
        long = "id",
        visible_alias = "url",
        visible_short_alias = 'u',
        value_name = "ID",
        num_args = 0..=1
    )]
    pub id: Option<Option<String>>,

    /// Audio-only, never ever show video
    #[arg(short, long)]
    pub audio: bool,

    /// Optimize for video (with --audio: formats with video, ranked by audio)
    #[arg(short, long)]
    pub video: bool,

    /// Player executable, must be able to play http streams [default: mpv]
    #[arg(short, long)]
    pub player: Option<String>,

    /// Save the latest video info as JSON, optionally to the given file
    #[arg(long, value_name = "FILE", num_args = 0..=1, require_equals = true)]
    pub saveinfo: Option<Option<PathBuf>>,

    /// Don't print titles to stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Log progress to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of hops a radio walks away from its first video
    #[arg(long, value_name = "N")]
    pub radio_depth: Option<usize>,
}

impl Cli {
    pub fn id_arg(&self) -> IdArg {
        match &self.id {
            None => IdArg::Absent,
            Some(None) => IdArg::UseDefault,
            Some(Some(id)) => IdArg::Explicit(id.clone()),
        }
    }

    /// The string to resolve: the `--id` value, else the positional words.
    pub fn input(&self) -> String {
        match self.id_arg() {
            IdArg::Explicit(id) => id,
            _ => self.words.join(" "),
        }
    }

    pub fn select_options(&self, config: &Config) -> SelectOptions {
        SelectOptions {
            resolve: ResolveOptions {
                search: self.search,
                id: self.id_arg(),
            },
            modes: ModeFlags {
                play: self.play,
                mix: self.mix,
                radio: self.radio,
            },
            radio: RadioOptions {
                max_depth: self.radio_depth.or(config.radio_max_depth),
                skip_visited: config.radio_skip_visited,
            },
        }
    }

    pub fn playback_options(&self, config: &Config) -> PlaybackOptions {
        PlaybackOptions {
            preference: FormatPreference {
                audio: self.audio,
                video: self.video,
            },
            quiet: self.quiet,
            save_info: self
                .saveinfo
                .as_ref()
                .map(|path| path.clone().unwrap_or_else(|| config.info_path.clone())),
        }
    }

    /// Load the config file and apply the command line on top of it.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(player) = &self.player {
            config.player = player.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub async fn run(&self) -> Result<()> {
        let config = self.config()?;

        let mut input = self.input();
        if input.trim().is_empty() {
            input = prompt("Which video to play? ").await?;
        }

        let source = Arc::new(YouTubeSource::new(&config)?);
        let launcher = Arc::new(ProcessLauncher::new(config.player.clone()));
        let player = Player::new(source.clone(), launcher, self.playback_options(&config));
        let session = Session::new(source, player);

        info!("Selecting {:?}", input);
        match session.run(&input, &self.select_options(&config)).await? {
            Some(last) => eprintln!("Done. Last video: {}", last.title),
            None => eprintln!("Done."),
        }

        Ok(())
    }
}

async fn prompt(question: &str) -> Result<String> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(question.as_bytes()).await?;
    stderr.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_three_state() {
        let cli = Cli::parse_from(["ytmp", "never", "gonna"]);
        assert_eq!(cli.id_arg(), IdArg::Absent);
        assert_eq!(cli.input(), "never gonna");

        let cli = Cli::parse_from(["ytmp", "--id", "--", "dQw4w9WgXcQ"]);
        assert_eq!(cli.id_arg(), IdArg::UseDefault);
        assert_eq!(cli.input(), "dQw4w9WgXcQ");

        let cli = Cli::parse_from(["ytmp", "--url=dQw4w9WgXcQ"]);
        assert_eq!(cli.id_arg(), IdArg::Explicit("dQw4w9WgXcQ".to_string()));
        assert_eq!(cli.input(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::parse_from(["ytmp", "-a", "-v", "-r", "-q", "--saveinfo", "lofi"]);
        let config = Config::default();

        let playback = cli.playback_options(&config);
        assert_eq!(playback.preference, FormatPreference { audio: true, video: true });
        assert!(playback.quiet);
        assert_eq!(playback.save_info, Some(PathBuf::from("info.json")));

        let select = cli.select_options(&config);
        assert_eq!(select.modes, ModeFlags { play: false, mix: false, radio: true });
        assert!(select.radio.skip_visited);
        assert_eq!(cli.input(), "lofi");

        let cli = Cli::parse_from(["ytmp", "--saveinfo=out.json", "--radio-depth", "3", "x"]);
        assert_eq!(cli.playback_options(&config).save_info, Some(PathBuf::from("out.json")));
        assert_eq!(cli.select_options(&config).radio.max_depth, Some(3));
    }

    #[test]
    fn test_player_flag_overrides_config_file() -> Result<()> {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "player = \"\"")?;
        let path = file.path().to_string_lossy().into_owned();

        let cli = Cli::parse_from(["ytmp", "--config", &path, "--player", "mpv", "x"]);
        assert_eq!(cli.config()?.player, "mpv");

        let cli = Cli::parse_from(["ytmp", "--config", &path, "x"]);
        assert!(cli.config().is_err());

        let cli = Cli::parse_from(["ytmp", "--player", "", "x"]);
        assert!(cli.config().is_err());
        Ok(())
    }
}
