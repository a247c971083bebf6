use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "gaming.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

fn video_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid regex"))
}

fn playlist_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:PL(?:[A-Za-z0-9_-]{16}|[A-Za-z0-9_-]{32})",
            r"|(?:UU|FL|LL)[A-Za-z0-9_-]{22}",
            r"|(?:RDCLAK5uy_|OLAK5uy_)[A-Za-z0-9_-]{33})$",
        ))
        .expect("valid regex")
    })
}

fn channel_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("valid regex"))
}

pub fn validate_video_id(s: &str) -> bool {
    video_id_re().is_match(s)
}

pub fn validate_video_url(s: &str) -> bool {
    Url::parse(s).ok().and_then(|url| video_id_from_url(&url)).is_some()
}

pub fn validate_playlist(s: &str) -> bool {
    extract_playlist_id(s).is_some()
}

/// Canonical video ID from a bare ID or any supported video URL.
pub fn extract_video_id(s: &str) -> Option<String> {
    let s = s.trim();
    if validate_video_id(s) {
        return Some(s.to_string());
    }
    Url::parse(s).ok().and_then(|url| video_id_from_url(&url))
}

fn video_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;

    let candidate = if host == "youtu.be" {
        url.path_segments()?.next().map(|s| s.to_string())
    } else if VIDEO_HOSTS.contains(&host) {
        match url.query_pairs().find(|(key, _)| key == "v") {
            Some((_, v)) => Some(v.to_string()),
            None => {
                let mut segments = url.path_segments()?;
                match segments.next() {
                    Some("embed" | "v" | "shorts" | "live" | "e") => {
                        segments.next().map(|s| s.to_string())
                    }
                    _ => None,
                }
            }
        }
    } else {
        None
    };

    candidate.filter(|id| validate_video_id(id))
}

/// Canonical playlist ID from a playlist ID, a channel ID, or a URL pointing
/// at either. Channels map to their uploads playlist.
pub fn extract_playlist_id(s: &str) -> Option<String> {
    let s = s.trim();
    if playlist_id_re().is_match(s) {
        return Some(s.to_string());
    }
    if channel_id_re().is_match(s) {
        return Some(uploads_playlist(s));
    }

    let url = Url::parse(s).ok()?;
    let host = url.host_str()?;
    if !VIDEO_HOSTS.contains(&host) && host != "youtu.be" {
        return None;
    }

    if let Some((_, list)) = url.query_pairs().find(|(key, _)| key == "list") {
        if playlist_id_re().is_match(&list) {
            return Some(list.to_string());
        }
    }

    let mut segments = url.path_segments()?;
    if segments.next() == Some("channel") {
        if let Some(channel) = segments.next().filter(|c| channel_id_re().is_match(c)) {
            return Some(uploads_playlist(channel));
        }
    }

    None
}

fn uploads_playlist(channel_id: &str) -> String {
    format!("UU{}", &channel_id[2..])
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={}", playlist_id)
}

/// Turn a popularity label like "1.2M", "3,456 views" or "5Mrd" into a
/// number. Unparsable labels count as zero.
pub fn parse_view_count(label: &str) -> f64 {
    let cleaned = label.replace(',', "");
    let cleaned = cleaned.trim();

    let end = cleaned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(cleaned.len());
    let value: f64 = match cleaned[..end].parse() {
        Ok(value) => value,
        Err(_) => return 0.0,
    };

    let suffix = cleaned[end..].trim_start();
    let multiplier = if suffix.starts_with("Mrd") {
        1e9
    } else if suffix.starts_with('K') || suffix.starts_with('k') {
        1e3
    } else if suffix.starts_with('M') {
        1e6
    } else if suffix.starts_with('B') {
        1e9
    } else {
        1.0
    };

    value * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_count() {
        assert_eq!(parse_view_count("900"), 900.0);
        assert_eq!(parse_view_count("500K"), 500_000.0);
        assert_eq!(parse_view_count("1.2M"), 1_200_000.0);
        assert_eq!(parse_view_count("2Mrd"), 2_000_000_000.0);
        assert_eq!(parse_view_count("3.4B views"), 3_400_000_000.0);
        assert_eq!(parse_view_count("1,234,567 views"), 1_234_567.0);
        assert_eq!(parse_view_count("No views"), 0.0);
        assert_eq!(parse_view_count(""), 0.0);
    }

    #[test]
    fn test_video_id_extraction() {
        let cases = [
            "dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
        ];
        for case in cases {
            assert_eq!(extract_video_id(case).as_deref(), Some("dQw4w9WgXcQ"), "{}", case);
        }

        assert_eq!(extract_video_id("never gonna give you up"), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
    }

    #[test]
    fn test_playlist_id_extraction() {
        let list = "PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI";
        assert_eq!(extract_playlist_id(list).as_deref(), Some(list));
        assert_eq!(
            extract_playlist_id(&format!("https://www.youtube.com/playlist?list={}", list)).as_deref(),
            Some(list)
        );
        assert_eq!(
            extract_playlist_id(&format!("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list={}", list))
                .as_deref(),
            Some(list)
        );
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/channel/UCuAXFkgsw1L7xaCfnd5JJOw").as_deref(),
            Some("UUuAXFkgsw1L7xaCfnd5JJOw")
        );
        assert_eq!(extract_playlist_id("dQw4w9WgXcQ"), None);
        assert_eq!(extract_playlist_id("lofi beats"), None);

        // ordinary words with a playlist-like prefix are search terms
        for word in ["FLASHBACKSONG", "PLAYLISTSONGS", "RDXLOFIBEATS", "PLAYLISTSONGSFOREVER"] {
            assert_eq!(extract_playlist_id(word), None, "{}", word);
            assert!(!validate_playlist(word), "{}", word);
        }

        let album = "OLAK5uy_kMdDSfmkQEb6Cy5DE56h1Gj4wMdGx2TdM";
        assert_eq!(extract_playlist_id(album).as_deref(), Some(album));
    }
}
