use crate::core::{Error, MediaKind, Result, VideoFormat};

/// Which streams the user wants, straight from `--audio` / `--video`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatPreference {
    pub audio: bool,
    pub video: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    AudioAndVideo,
    AudioOnly,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quality {
    HighestVideo,
    HighestAudio,
}

impl FormatPreference {
    fn filter(&self) -> Filter {
        if self.video {
            Filter::AudioAndVideo
        } else if self.audio {
            Filter::AudioOnly
        } else {
            Filter::Audio
        }
    }

    fn quality(&self) -> Quality {
        // `-av` keeps the muxed filter but ranks by audio
        if self.video && !self.audio {
            Quality::HighestVideo
        } else {
            Quality::HighestAudio
        }
    }
}

impl Filter {
    fn accepts(self, format: &VideoFormat) -> bool {
        match (self, format.kind()) {
            (Filter::AudioAndVideo, Some(MediaKind::AudioVideo)) => true,
            (Filter::AudioOnly, Some(MediaKind::AudioOnly)) => true,
            (Filter::Audio, Some(MediaKind::AudioOnly | MediaKind::AudioVideo)) => true,
            _ => false,
        }
    }
}

fn video_rank(f: &VideoFormat) -> (u32, u32, u64) {
    (
        f.height.unwrap_or(0),
        f.fps.unwrap_or(0),
        f.bitrate.unwrap_or(0),
    )
}

fn audio_rank(f: &VideoFormat) -> (u64, u64) {
    (f.audio_bitrate.unwrap_or(0), f.bitrate.unwrap_or(0))
}

/// Pick the one format to play. Ties go to the earliest format in the list.
pub fn select_format<'a>(
    formats: &'a [VideoFormat],
    preference: FormatPreference,
) -> Result<&'a VideoFormat> {
    let filter = preference.filter();
    let candidates = formats.iter().filter(|f| filter.accepts(f));

    // min_by keeps the first of equal elements, so compare in reverse
    let best = match preference.quality() {
        Quality::HighestVideo => candidates.min_by(|a, b| video_rank(b).cmp(&video_rank(a))),
        Quality::HighestAudio => candidates.min_by(|a, b| audio_rank(b).cmp(&audio_rank(a))),
    };

    best.ok_or_else(|| Error::Playback("Could not get an appropriate format".to_string()))
}
