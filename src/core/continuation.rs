//! Mix and radio: what to play after the selected video or playlist ends.
//!
//! Both walk the `related_videos` of the last played video. A mix plays that
//! list once, in the order the site returned it. A radio ranks the list by
//! view count and descends into every video it manages to play, skipping the
//! ones that fail.

use crate::core::{Origin, PlayableReference, Player, RelatedVideo, Result, Target, VideoInfo};
use crate::utils::parse_view_count;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use tracing::{debug, info};

/// Continuation flags as given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub play: bool,
    pub mix: bool,
    pub radio: bool,
}

impl ModeFlags {
    /// No flag given: the continuation is picked from how the target was found.
    pub fn is_default(&self) -> bool {
        !self.play && !self.mix && !self.radio
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContinuationPlan {
    pub mix: bool,
    pub radio: bool,
}

impl ContinuationPlan {
    /// | origin | target   | mix             | radio             |
    /// |--------|----------|-----------------|-------------------|
    /// | direct | playlist | mix             | radio             |
    /// | direct | video    | mix             | radio or default  |
    /// | search | playlist | mix             | radio or default  |
    /// | search | video    | mix or default  | radio or default  |
    pub fn decide(origin: Origin, target: &Target, flags: ModeFlags) -> Self {
        let default = flags.is_default();
        let playlist = matches!(target, Target::Playlist(_));

        match (origin, playlist) {
            (Origin::Direct, true) => Self {
                mix: flags.mix,
                radio: flags.radio,
            },
            (Origin::Direct, false) | (Origin::Search, true) => Self {
                mix: flags.mix,
                radio: flags.radio || default,
            },
            (Origin::Search, false) => Self {
                mix: flags.mix || default,
                radio: flags.radio || default,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RadioOptions {
    /// Stop descending past this many hops from the starting video.
    pub max_depth: Option<usize>,
    /// Never play the same video twice in one radio.
    pub skip_visited: bool,
}

/// Related videos ordered by view count, most viewed first. Equal counts keep
/// their original order.
pub fn rank_related(related: &[RelatedVideo]) -> Vec<&RelatedVideo> {
    let mut ranked: Vec<(f64, &RelatedVideo)> = related
        .iter()
        .map(|video| (parse_view_count(&video.view_count), video))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().map(|(_, video)| video).collect()
}

impl Player {
    pub async fn play_mix(&self, info: VideoInfo) -> Result<VideoInfo> {
        info!("Playing YouTube Mix of: {}", info.title);

        let mut last = None;
        for related in &info.related_videos {
            last = Some(self.play_video(PlayableReference::Id(related.id.clone())).await?);
        }

        info!("Mix is over");

        Ok(last.unwrap_or(info))
    }

    /// Endless radio seeded by `info`. Only returns once every branch is
    /// exhausted (or cut by `options`); failures never escape.
    pub async fn play_radio(&self, info: VideoInfo, options: &RadioOptions) -> VideoInfo {
        info!("Playing radio for {}", info.title);

        let mut visited = HashSet::new();
        visited.insert(info.id.clone());

        self.play_radio_recursive(info, options, &mut visited, 0).await
    }

    fn play_radio_recursive<'a>(
        &'a self,
        info: VideoInfo,
        options: &'a RadioOptions,
        visited: &'a mut HashSet<String>,
        depth: usize,
    ) -> BoxFuture<'a, VideoInfo> {
        async move {
            if options.max_depth.is_some_and(|max| depth >= max) {
                debug!("Radio reached depth {} at {}", depth, info.id);
                return info;
            }

            let candidates: Vec<String> = rank_related(&info.related_videos)
                .into_iter()
                .map(|video| video.id.clone())
                .collect();

            let mut last = info;
            for id in candidates {
                if options.skip_visited && !visited.insert(id.clone()) {
                    debug!("Radio skipping already played {}", id);
                    continue;
                }

                match self.play_video(PlayableReference::Id(id.clone())).await {
                    Ok(played) => {
                        last = self
                            .play_radio_recursive(played, options, visited, depth + 1)
                            .await;
                    }
                    Err(e) => {
                        debug!("Radio skipping {}: {}", id, e);
                        continue;
                    }
                }
            }

            last
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlaylistReference;

    fn related(id: &str, views: &str) -> RelatedVideo {
        RelatedVideo {
            id: id.to_string(),
            title: None,
            view_count: views.to_string(),
        }
    }

    #[test]
    fn test_rank_related_by_magnitude() {
        let list = vec![
            related("a", "1.2M"),
            related("b", "500K"),
            related("c", "2Mrd"),
            related("d", "900"),
        ];
        let order: Vec<&str> = rank_related(&list).iter().map(|v| v.view_count.as_str()).collect();
        assert_eq!(order, ["2Mrd", "1.2M", "500K", "900"]);
    }

    #[test]
    fn test_rank_related_is_stable() {
        let list = vec![related("a", "1K"), related("b", "1,000"), related("c", "2K")];
        let order: Vec<&str> = rank_related(&list).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[test]
    fn test_decision_table() {
        let video = Target::Video(PlayableReference::Id("dQw4w9WgXcQ".to_string()));
        let playlist = Target::Playlist(PlaylistReference {
            id: "PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI".to_string(),
        });
        let none = ModeFlags::default();
        let play = ModeFlags { play: true, ..Default::default() };
        let mix = ModeFlags { mix: true, ..Default::default() };

        let plan = |origin, target, flags| ContinuationPlan::decide(origin, target, flags);

        assert_eq!(plan(Origin::Direct, &video, none), ContinuationPlan { mix: false, radio: true });
        assert_eq!(plan(Origin::Direct, &playlist, none), ContinuationPlan { mix: false, radio: false });
        assert_eq!(plan(Origin::Search, &playlist, none), ContinuationPlan { mix: false, radio: true });
        assert_eq!(plan(Origin::Search, &video, none), ContinuationPlan { mix: true, radio: true });

        assert_eq!(plan(Origin::Search, &video, play), ContinuationPlan::default());
        assert_eq!(plan(Origin::Direct, &video, mix), ContinuationPlan { mix: true, radio: false });
    }
}
