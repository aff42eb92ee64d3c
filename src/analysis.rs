/// Data structures for the analysis payload returned by the moderation service
use serde::{Deserialize, Serialize};

/// Moderation decision assigned to a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Pass,
    Mask,
    AutoHide,
}

/// Descriptive fields about the video. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub channel: Option<String>,
}

/// Comment counters. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_comments: Option<u64>,
    pub filtered_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub author: String,
    pub published_at: String,
    pub original: String,
    pub processed: String,
    pub action: Action,
    pub risk_score: f64,
    #[serde(default)]
    pub violation_tags: Vec<String>,
}

/// Result of analysing one video's comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub video_info: VideoInfo,
    #[serde(default)]
    pub stats: Stats,
    #[serde(rename = "results", default)]
    pub comments: Vec<CommentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_service_payload() {
        let json = r#"{
            "video_info": {"title": "Review", "channel": "Tech", "duration": "10:01"},
            "stats": {"total_comments": 12, "filtered_count": 2, "spam_count": 1},
            "results": [{
                "author": "@someone",
                "published_at": "1 minute ago",
                "original": "hello",
                "processed": "hello",
                "action": "AUTO_HIDE",
                "risk_score": 0.91,
                "violation_tags": ["AI_SPAM"]
            }]
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.video_info.title.as_deref(), Some("Review"));
        assert_eq!(result.stats.total_comments, Some(12));
        assert_eq!(result.comments.len(), 1);
        assert_eq!(result.comments[0].action, Action::AutoHide);
        assert_eq!(result.comments[0].violation_tags, vec!["AI_SPAM".to_string()]);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let result: AnalysisResult = serde_json::from_str(r#"{"results": []}"#).unwrap();

        assert_eq!(result.video_info, VideoInfo::default());
        assert_eq!(result.stats.filtered_count, None);
        assert!(result.comments.is_empty());
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(serde_json::to_string(&Action::Pass).unwrap(), "\"PASS\"");
        assert_eq!(serde_json::to_string(&Action::Mask).unwrap(), "\"MASK\"");
        assert_eq!(serde_json::to_string(&Action::AutoHide).unwrap(), "\"AUTO_HIDE\"");
    }
}
