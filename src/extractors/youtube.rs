use crate::config::Config;
use crate::core::{
    MediaSource, Playlist, PlaylistItem, RelatedVideo, SearchItem, SearchKind, VideoFormat,
    VideoInfo,
};
use crate::utils;
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

const BASE_URL: &str = "https://www.youtube.com";

pub struct YouTubeSource {
    client: reqwest::Client,
    playlist_limit: usize,
}

impl YouTubeSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            playlist_limit: config.playlist_limit,
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Accept-Encoding", "identity")
            .header("Cookie", "CONSENT=YES+1")
            .header("DNT", "1")
            .header("Upgrade-Insecure-Requests", "1")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: HTTP {}", url, response.status());
        }

        let html = response.text().await?;
        if html.is_empty() {
            anyhow::bail!("Empty response from {}", url);
        }

        Ok(html)
    }

    async fn browse_continuation(&self, html: &str, token: &str) -> Result<Value> {
        let api_key = ytcfg_value(html, "INNERTUBE_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("No innertube API key in playlist page"))?;
        let client_version = ytcfg_value(html, "INNERTUBE_CLIENT_VERSION")
            .unwrap_or_else(|| "2.20240101.00.00".to_string());

        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": &client_version,
                    "hl": "en",
                }
            },
            "continuation": token,
        });

        let response = self
            .client
            .post(format!("{}/youtubei/v1/browse?key={}", BASE_URL, api_key))
            .header("Origin", BASE_URL)
            .header("Referer", format!("{}/", BASE_URL))
            .header("X-Youtube-Client-Name", "1")
            .header("X-Youtube-Client-Version", client_version.as_str())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Build a `VideoInfo` from a watch page.
    pub fn parse_watch_page(html: &str, video_id: &str) -> Result<VideoInfo> {
        let player_response = extract_json_var(html, "ytInitialPlayerResponse")?;

        if let Some(status) = player_response
            .pointer("/playabilityStatus/status")
            .and_then(|v| v.as_str())
        {
            if status != "OK" {
                let reason = player_response
                    .pointer("/playabilityStatus/reason")
                    .and_then(|v| v.as_str())
                    .unwrap_or(status);
                anyhow::bail!("Video {} is not playable: {}", video_id, reason);
            }
        }

        let video_details = player_response
            .get("videoDetails")
            .ok_or_else(|| anyhow::anyhow!("No video details found"))?;

        let title = video_details
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown Title")
            .to_string();

        let author = video_details
            .get("author")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let duration = video_details
            .get("lengthSeconds")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<u64>().ok());

        let view_count = video_details
            .get("viewCount")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<u64>().ok());

        let formats = player_response
            .get("streamingData")
            .map(parse_formats)
            .unwrap_or_default();

        // related videos are a nice-to-have; a page without them still plays
        let related_videos = match extract_json_var(html, "ytInitialData") {
            Ok(initial_data) => parse_related(&initial_data),
            Err(e) => {
                tracing::debug!("No related videos for {}: {}", video_id, e);
                Vec::new()
            }
        };

        Ok(VideoInfo {
            id: video_id.to_string(),
            title,
            author,
            duration,
            view_count,
            formats,
            related_videos,
        })
    }

    /// Ordered results of a search page.
    pub fn parse_search_page(html: &str) -> Result<Vec<SearchItem>> {
        let initial_data = extract_json_var(html, "ytInitialData")?;

        let mut renderers = Vec::new();
        collect_renderers(
            &initial_data,
            &["videoRenderer", "playlistRenderer", "channelRenderer"],
            &mut renderers,
        );

        let items = renderers
            .into_iter()
            .filter_map(|(key, renderer)| {
                let title = renderer.get("title").and_then(text);
                let (kind, id, link) = match key {
                    "videoRenderer" => {
                        let id = renderer.get("videoId")?.as_str()?;
                        (SearchKind::Video, id, utils::watch_url(id))
                    }
                    "playlistRenderer" => {
                        let id = renderer.get("playlistId")?.as_str()?;
                        (SearchKind::Playlist, id, utils::playlist_url(id))
                    }
                    _ => {
                        let id = renderer.get("channelId")?.as_str()?;
                        (SearchKind::Channel, id, format!("{}/channel/{}", BASE_URL, id))
                    }
                };
                Some(SearchItem {
                    id: id.to_string(),
                    title,
                    link,
                    kind,
                })
            })
            .collect();

        Ok(items)
    }

    /// Title, items and continuation token of the first playlist page.
    pub fn parse_playlist_page(html: &str, playlist_id: &str) -> Result<(Playlist, Option<String>)> {
        let initial_data = extract_json_var(html, "ytInitialData")?;

        let title = initial_data
            .pointer("/metadata/playlistMetadataRenderer/title")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .or_else(|| {
                initial_data
                    .pointer("/header/playlistHeaderRenderer/title")
                    .and_then(text)
            })
            .or_else(|| {
                initial_data
                    .pointer("/microformat/microformatDataRenderer/title")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            });

        let (items, continuation) = parse_playlist_items(&initial_data);

        let title = match title {
            Some(title) => title,
            None if items.is_empty() => {
                let alert = initial_data
                    .pointer("/alerts/0/alertRenderer/text")
                    .and_then(text)
                    .unwrap_or_else(|| "playlist not found".to_string());
                anyhow::bail!("Could not load playlist {}: {}", playlist_id, alert);
            }
            None => playlist_id.to_string(),
        };

        Ok((
            Playlist {
                id: playlist_id.to_string(),
                title,
                items,
            },
            continuation,
        ))
    }
}

#[async_trait]
impl MediaSource for YouTubeSource {
    fn name(&self) -> &'static str {
        "YouTube"
    }

    fn validate_id(&self, s: &str) -> bool {
        utils::validate_video_id(s)
    }

    fn validate_url(&self, s: &str) -> bool {
        utils::validate_video_url(s)
    }

    fn validate_playlist(&self, s: &str) -> bool {
        utils::validate_playlist(s)
    }

    fn video_id(&self, s: &str) -> Option<String> {
        utils::extract_video_id(s)
    }

    fn playlist_id(&self, s: &str) -> Option<String> {
        utils::extract_playlist_id(s)
    }

    async fn info(&self, id: &str) -> Result<VideoInfo> {
        let html = self.fetch_page(&utils::watch_url(id)).await?;
        let info = Self::parse_watch_page(&html, id)?;
        tracing::debug!(
            "{}: {} formats, {} related videos",
            id,
            info.formats.len(),
            info.related_videos.len()
        );
        Ok(info)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>> {
        let url = format!(
            "{}/results?search_query={}",
            BASE_URL,
            urlencoding::encode(query)
        );
        let html = self.fetch_page(&url).await?;
        Self::parse_search_page(&html)
    }

    async fn playlist(&self, id: &str) -> Result<Playlist> {
        let html = self.fetch_page(&utils::playlist_url(id)).await?;
        let (mut playlist, mut continuation) = Self::parse_playlist_page(&html, id)?;

        while let Some(token) = continuation.take() {
            if playlist.items.len() >= self.playlist_limit {
                break;
            }
            let page = self.browse_continuation(&html, &token).await?;
            let (items, next) = parse_playlist_items(&page);
            tracing::debug!("Fetched {} more items of playlist {}", items.len(), id);
            if items.is_empty() {
                break;
            }
            playlist.items.extend(items);
            continuation = next;
        }

        playlist.items.truncate(self.playlist_limit);
        Ok(playlist)
    }
}

/// Parse the JSON object assigned to `name` somewhere in a page's scripts.
fn extract_json_var(html: &str, name: &str) -> Result<Value> {
    let patterns = [
        format!(r#"var\s+{}\s*=\s*"#, name),
        format!(r#"window\[["']{}["']\]\s*=\s*"#, name),
        format!(r#"["']?{}["']?\s*[=:]\s*"#, name),
    ];

    for pattern in &patterns {
        let re = Regex::new(pattern)?;
        for found in re.find_iter(html) {
            let rest = &html[found.end()..];
            if !rest.starts_with('{') {
                continue;
            }
            // the object is followed by more script, so read just one value
            let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
            if let Some(Ok(value)) = values.next() {
                return Ok(value);
            }
        }
    }

    anyhow::bail!("Could not find {} in page", name);
}

fn ytcfg_value(html: &str, key: &str) -> Option<String> {
    let re = Regex::new(&format!(r#""{}"\s*:\s*"([^"]+)""#, key)).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// `{"simpleText": ..}`, `{"runs": [{"text": ..}]}` or `{"content": ..}`.
fn text(value: &Value) -> Option<String> {
    if let Some(s) = value.as_str() {
        return Some(s.to_string());
    }
    if let Some(s) = value.get("simpleText").and_then(|v| v.as_str()) {
        return Some(s.to_string());
    }
    if let Some(s) = value.get("content").and_then(|v| v.as_str()) {
        return Some(s.to_string());
    }
    let runs = value.get("runs")?.as_array()?;
    Some(
        runs.iter()
            .filter_map(|run| run.get("text").and_then(|t| t.as_str()))
            .collect(),
    )
}

/// Depth-first, in document order, without descending into a match.
fn collect_renderers<'a>(
    value: &'a Value,
    keys: &[&'static str],
    out: &mut Vec<(&'static str, &'a Value)>,
) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_renderers(item, keys, out);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                match keys.iter().find(|k| **k == key.as_str()) {
                    Some(k) => out.push((*k, child)),
                    None => collect_renderers(child, keys, out),
                }
            }
        }
        _ => {}
    }
}

fn parse_formats(streaming_data: &Value) -> Vec<VideoFormat> {
    let mut formats = Vec::new();

    for list in ["formats", "adaptiveFormats"] {
        let Some(entries) = streaming_data.get(list).and_then(|v| v.as_array()) else {
            continue;
        };
        tracing::debug!("Found {} {}", entries.len(), list);
        formats.extend(entries.iter().filter_map(parse_format));
    }

    formats
}

fn parse_format(format: &Value) -> Option<VideoFormat> {
    let itag = format
        .get("itag")
        .and_then(|v| v.as_i64())
        .map(|i| i.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    // ciphered formats would need the player JS to unlock
    let Some(url) = format.get("url").and_then(|v| v.as_str()) else {
        tracing::debug!("Format {} has no direct URL, skipping", itag);
        return None;
    };

    let mime_type = format
        .get("mimeType")
        .and_then(|v| v.as_str())
        .unwrap_or("video/mp4")
        .to_string();

    let has_video = mime_type.starts_with("video/");
    let muxed = mime_type
        .split("codecs=")
        .nth(1)
        .is_some_and(|codecs| codecs.contains(','));
    let audio_quality = format.get("audioQuality").and_then(|v| v.as_str());
    let has_audio = mime_type.starts_with("audio/") || muxed || audio_quality.is_some();

    let bitrate = format
        .get("averageBitrate")
        .or_else(|| format.get("bitrate"))
        .and_then(|v| v.as_u64());

    let audio_bitrate = if !has_audio {
        None
    } else if !has_video {
        bitrate
    } else {
        audio_quality.map(|q| match q {
            "AUDIO_QUALITY_HIGH" => 256_000,
            "AUDIO_QUALITY_MEDIUM" => 128_000,
            _ => 48_000,
        })
    };

    Some(VideoFormat {
        itag,
        url: url.to_string(),
        mime_type,
        has_audio,
        has_video,
        quality_label: format
            .get("qualityLabel")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        height: format
            .get("height")
            .and_then(|v| v.as_u64())
            .and_then(|h| u32::try_from(h).ok()),
        fps: format
            .get("fps")
            .and_then(|v| v.as_u64())
            .and_then(|f| u32::try_from(f).ok()),
        bitrate,
        audio_bitrate,
    })
}

fn parse_related(initial_data: &Value) -> Vec<RelatedVideo> {
    let root = initial_data
        .pointer("/contents/twoColumnWatchNextResults/secondaryResults")
        .unwrap_or(initial_data);

    let mut renderers = Vec::new();
    collect_renderers(root, &["compactVideoRenderer", "lockupViewModel"], &mut renderers);

    renderers
        .into_iter()
        .filter_map(|(key, renderer)| match key {
            "compactVideoRenderer" => {
                let id = renderer.get("videoId")?.as_str()?.to_string();
                let view_count = renderer
                    .get("shortViewCountText")
                    .and_then(text)
                    .or_else(|| renderer.get("viewCountText").and_then(text))
                    .unwrap_or_default();
                Some(RelatedVideo {
                    id,
                    title: renderer.get("title").and_then(text),
                    view_count,
                })
            }
            _ => {
                if renderer.get("contentType").and_then(|v| v.as_str())
                    != Some("LOCKUP_CONTENT_TYPE_VIDEO")
                {
                    return None;
                }
                let id = renderer.get("contentId")?.as_str()?.to_string();
                let metadata = renderer.pointer("/metadata/lockupMetadataViewModel");
                let view_count = metadata
                    .and_then(|m| m.pointer("/metadata/contentMetadataViewModel/metadataRows"))
                    .and_then(|rows| rows.as_array())
                    .into_iter()
                    .flatten()
                    .filter_map(|row| row.get("metadataParts")?.as_array())
                    .flatten()
                    .filter_map(|part| part.get("text").and_then(text))
                    .find(|t| t.contains("view"))
                    .unwrap_or_default();
                Some(RelatedVideo {
                    id,
                    title: metadata.and_then(|m| m.get("title")).and_then(text),
                    view_count,
                })
            }
        })
        .collect()
}

fn parse_playlist_items(data: &Value) -> (Vec<PlaylistItem>, Option<String>) {
    let mut renderers = Vec::new();
    collect_renderers(
        data,
        &["playlistVideoRenderer", "continuationItemRenderer"],
        &mut renderers,
    );

    let mut items = Vec::new();
    let mut continuation = None;
    for (key, renderer) in renderers {
        if key == "continuationItemRenderer" {
            continuation = renderer
                .pointer("/continuationEndpoint/continuationCommand/token")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            continue;
        }
        if let Some(id) = renderer.get("videoId").and_then(|v| v.as_str()) {
            items.push(PlaylistItem {
                id: id.to_string(),
                title: renderer.get("title").and_then(text),
            });
        }
    }

    (items, continuation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCH_PAGE: &str = r#"<html><script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"videoDetails":{"videoId":"dQw4w9WgXcQ","title":"Never Gonna Give You Up","author":"Rick Astley","lengthSeconds":"212","viewCount":"1500000000"},"streamingData":{"formats":[{"itag":18,"url":"https://rr.example/18","mimeType":"video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"","bitrate":500000,"height":360,"fps":30,"qualityLabel":"360p","audioQuality":"AUDIO_QUALITY_LOW"}],"adaptiveFormats":[{"itag":251,"url":"https://rr.example/251","mimeType":"audio/webm; codecs=\"opus\"","bitrate":150000,"audioQuality":"AUDIO_QUALITY_MEDIUM"},{"itag":137,"signatureCipher":"s=abc&url=https%3A%2F%2Frr.example%2F137","mimeType":"video/mp4; codecs=\"avc1.640028\"","bitrate":4000000,"height":1080}]}};var meta = {};</script>
<script>var ytInitialData = {"contents":{"twoColumnWatchNextResults":{"secondaryResults":{"secondaryResults":{"results":[{"compactVideoRenderer":{"videoId":"yPYZpwSpKmA","title":{"simpleText":"Together Forever"},"shortViewCountText":{"simpleText":"12M views"}}},{"compactVideoRenderer":{"videoId":"djV11Xbc914","title":{"runs":[{"text":"Take "},{"text":"On Me"}]},"viewCountText":{"simpleText":"2,345,678 views"}}}]}}}}};</script></html>"#;

    #[test]
    fn test_parse_watch_page() -> Result<()> {
        let info = YouTubeSource::parse_watch_page(WATCH_PAGE, "dQw4w9WgXcQ")?;

        assert_eq!(info.title, "Never Gonna Give You Up");
        assert_eq!(info.author.as_deref(), Some("Rick Astley"));
        assert_eq!(info.duration, Some(212));

        // the ciphered 1080p format is skipped
        let itags: Vec<&str> = info.formats.iter().map(|f| f.itag.as_str()).collect();
        assert_eq!(itags, ["18", "251"]);
        assert!(info.formats[0].has_audio && info.formats[0].has_video);
        assert!(info.formats[1].has_audio && !info.formats[1].has_video);
        assert_eq!(info.formats[1].audio_bitrate, Some(150_000));

        assert_eq!(info.related_videos.len(), 2);
        assert_eq!(info.related_videos[0].id, "yPYZpwSpKmA");
        assert_eq!(info.related_videos[0].view_count, "12M views");
        assert_eq!(info.related_videos[1].title.as_deref(), Some("Take On Me"));
        assert_eq!(info.related_videos[1].view_count, "2,345,678 views");
        Ok(())
    }

    #[test]
    fn test_oversized_dimensions_are_dropped() {
        let format = serde_json::json!({
            "itag": 399,
            "url": "https://rr.example/399",
            "mimeType": "video/mp4; codecs=\"av01.0.08M.08\"",
            "bitrate": 2000000,
            "height": 4294967297u64,
            "fps": 30,
        });

        let parsed = parse_format(&format).unwrap();
        assert_eq!(parsed.height, None);
        assert_eq!(parsed.fps, Some(30));
    }

    #[test]
    fn test_unplayable_video() {
        let html = r#"<script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"ERROR","reason":"Video unavailable"}};</script>"#;
        let err = YouTubeSource::parse_watch_page(html, "xxxxxxxxxxx").unwrap_err();
        assert!(err.to_string().contains("Video unavailable"));
    }

    #[test]
    fn test_parse_search_page_keeps_order() -> Result<()> {
        let html = r#"<script>var ytInitialData = {"contents":{"sectionListRenderer":{"contents":[{"itemSectionRenderer":{"contents":[{"adSlotRenderer":{}},{"playlistRenderer":{"playlistId":"PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI","title":{"simpleText":"Hits"}}},{"videoRenderer":{"videoId":"dQw4w9WgXcQ","title":{"runs":[{"text":"Rick"}]}}},{"channelRenderer":{"channelId":"UCuAXFkgsw1L7xaCfnd5JJOw","title":{"simpleText":"Rick Astley"}}}]}}]}}};</script>"#;

        let results = YouTubeSource::parse_search_page(html)?;

        let kinds: Vec<SearchKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, [SearchKind::Playlist, SearchKind::Video, SearchKind::Channel]);
        assert_eq!(
            results[0].link,
            "https://www.youtube.com/playlist?list=PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI"
        );
        assert_eq!(results[1].link, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert!(utils::validate_playlist(&results[2].link));
        Ok(())
    }

    #[test]
    fn test_parse_playlist_page() -> Result<()> {
        let html = r#"<script>var ytInitialData = {"metadata":{"playlistMetadataRenderer":{"title":"Eighties"}},"contents":{"items":[{"playlistVideoRenderer":{"videoId":"dQw4w9WgXcQ","title":{"runs":[{"text":"Rick"}]}}},{"playlistVideoRenderer":{"videoId":"djV11Xbc914"}},{"continuationItemRenderer":{"continuationEndpoint":{"continuationCommand":{"token":"NEXT"}}}}]}};</script>"#;

        let (playlist, continuation) = YouTubeSource::parse_playlist_page(html, "PLtest")?;

        assert_eq!(playlist.title, "Eighties");
        let ids: Vec<&str> = playlist.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["dQw4w9WgXcQ", "djV11Xbc914"]);
        assert_eq!(continuation.as_deref(), Some("NEXT"));
        Ok(())
    }

    #[test]
    fn test_missing_playlist() {
        let html = r#"<script>var ytInitialData = {"alerts":[{"alertRenderer":{"text":{"simpleText":"The playlist does not exist."}}}]};</script>"#;
        let err = YouTubeSource::parse_playlist_page(html, "PLgone").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
