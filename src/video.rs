/// Video id extraction from the active tab URL

use url::Url;

use crate::error::VideoError;

/// Id used when no tab API is available (standalone development)
pub const PLACEHOLDER_VIDEO_ID: &str = "test_video_id";

/// What the host reports about the active tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabLocation {
    /// No tab API at all (standalone development)
    NoHost,
    /// Host present, but the tab exposes no URL (restricted page, failed query)
    Unknown,
    Url(String),
}

/// Read the `v` query parameter of a watch URL
///
/// Examples:
/// - https://www.youtube.com/watch?v=dQw4w9WgXcQ → dQw4w9WgXcQ
/// - https://www.youtube.com/watch?list=PL1&v=abc → abc
/// - https://www.youtube.com/feed/trending → None
pub fn video_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Resolve the id to analyse. Only a missing tab API falls back to the
/// placeholder; a host tab without a URL has no id.
pub fn resolve_video_id(location: &TabLocation) -> Result<String, VideoError> {
    match location {
        TabLocation::NoHost => Ok(PLACEHOLDER_VIDEO_ID.to_string()),
        TabLocation::Unknown => Err(VideoError::NotAVideoPage),
        TabLocation::Url(url) => video_id_from_url(url).ok_or(VideoError::NotAVideoPage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_from_watch_url() {
        assert_eq!(
            video_id_from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            video_id_from_url("https://www.youtube.com/watch?list=PL1&v=abc123&t=42s"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_video_id_missing() {
        assert_eq!(video_id_from_url("https://www.youtube.com/feed/trending"), None);
        assert_eq!(video_id_from_url("https://www.youtube.com/watch?v="), None);
        assert_eq!(video_id_from_url("not-a-url"), None);
        assert_eq!(video_id_from_url(""), None);
    }

    #[test]
    fn test_resolve_video_id() {
        assert_eq!(resolve_video_id(&TabLocation::NoHost), Ok("test_video_id".to_string()));
        assert_eq!(
            resolve_video_id(&TabLocation::Url("https://www.youtube.com/watch?v=vid1".to_string())),
            Ok("vid1".to_string())
        );
        assert_eq!(
            resolve_video_id(&TabLocation::Url("chrome://extensions".to_string())),
            Err(VideoError::NotAVideoPage)
        );
    }

    #[test]
    fn test_host_tab_without_url_has_no_id() {
        // Must not fall back to the placeholder, or the live service gets queried
        assert_eq!(resolve_video_id(&TabLocation::Unknown), Err(VideoError::NotAVideoPage));
    }
}
