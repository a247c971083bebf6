use crate::core::{
    ContinuationPlan, MediaSource, ModeFlags, Player, RadioOptions, ResolveOptions, Resolver,
    Result, VideoInfo,
};
use std::sync::Arc;
use tracing::debug;

/// Everything the user asked for about what to play.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub resolve: ResolveOptions,
    pub modes: ModeFlags,
    pub radio: RadioOptions,
}

/// Resolve, play, then run whichever continuations apply.
pub struct Session {
    resolver: Resolver,
    player: Player,
}

impl Session {
    pub fn new(source: Arc<dyn MediaSource>, player: Player) -> Self {
        Self {
            resolver: Resolver::new(source),
            player,
        }
    }

    /// Returns the last video played, `None` if nothing was.
    pub async fn run(&self, input: &str, options: &SelectOptions) -> Result<Option<VideoInfo>> {
        let resolution = self.resolver.resolve(input, &options.resolve).await?;
        let plan = ContinuationPlan::decide(resolution.origin, &resolution.target, options.modes);
        debug!("Resolved {:?}, continuation {:?}", resolution, plan);

        let Some(mut info) = self.player.play(resolution.target).await? else {
            return Ok(None);
        };

        if plan.mix {
            info = self.player.play_mix(info).await?;
        }
        if plan.radio {
            info = self.player.play_radio(info, &options.radio).await;
        }

        Ok(Some(info))
    }
}
