/// Analysis data sources: the live moderation service and a fixed fixture

use std::rc::Rc;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::analysis::{Action, AnalysisResult, CommentSummary, Stats, VideoInfo};
use crate::config::{AppConfig, DataSourceKind};
use crate::error::FetchError;

const ANALYZE_PATH: &str = "/api/workflow/analyze-youtube";

/// Produces the analysis for a video id
#[async_trait(?Send)]
pub trait AnalysisSource {
    async fn fetch(&self, video_id: &str) -> Result<AnalysisResult, FetchError>;
}

/// Build the source chosen at startup
pub fn build_source(kind: DataSourceKind, config: &AppConfig) -> Rc<dyn AnalysisSource> {
    match kind {
        DataSourceKind::Live => {
            info!("Using live analysis service at {}", config.api_base_url);
            Rc::new(LiveSource::new(Client::new(), &config.api_base_url, config.max_pages))
        }
        DataSourceKind::Fixture => {
            info!("Using fixture analysis data");
            Rc::new(FixtureSource)
        }
    }
}

pub struct LiveSource {
    http: Client,
    base_url: String,
    max_pages: u32,
}

impl LiveSource {
    pub fn new(http: Client, base_url: &str, max_pages: u32) -> Self {
        LiveSource {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_pages,
        }
    }

    fn request_url(&self, video_id: &str) -> Result<Url, FetchError> {
        let endpoint = format!("{}{}", self.base_url, ANALYZE_PATH);
        let max_pages = self.max_pages.to_string();

        Url::parse_with_params(&endpoint, &[("video_id", video_id), ("max_pages", max_pages.as_str())])
            .map_err(|e| FetchError::Transport(format!("bad endpoint {}: {}", endpoint, e)))
    }
}

#[async_trait(?Send)]
impl AnalysisSource for LiveSource {
    async fn fetch(&self, video_id: &str) -> Result<AnalysisResult, FetchError> {
        let url = self.request_url(video_id)?;
        debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Analysis service returned {} for {}", status, video_id);
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<AnalysisResult>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Fixed three-comment report, used during standalone development
#[derive(Debug, Default)]
pub struct FixtureSource;

impl FixtureSource {
    pub fn fixture() -> AnalysisResult {
        AnalysisResult {
            video_info: VideoInfo {
                title: Some("Pixel 7 Review: The Best Android Phone?".to_string()),
                channel: Some("Tech Reviewer".to_string()),
            },
            stats: Stats {
                total_comments: Some(120),
                filtered_count: Some(15),
            },
            comments: vec![
                CommentSummary {
                    author: "@TheDiscfanatic".to_string(),
                    published_at: "1 minute ago".to_string(),
                    original: "Was glad to see the Pixel 7 win those two awards...".to_string(),
                    processed: "Was glad to see the Pixel 7 win those two awards...".to_string(),
                    action: Action::Pass,
                    risk_score: 0.05,
                    violation_tags: vec![],
                },
                CommentSummary {
                    author: "@Hater123".to_string(),
                    published_at: "5 minutes ago".to_string(),
                    original: "야이 개새끼야 ㅋㅋ 니네 집 주소 다 털었다".to_string(),
                    processed: "야이 **** ㅋㅋ 니네 집 주소 다 털었다".to_string(),
                    action: Action::AutoHide,
                    risk_score: 0.98,
                    violation_tags: vec!["SYSTEM_KEYWORD".to_string(), "AI_AGGRESSION".to_string()],
                },
                CommentSummary {
                    author: "@Spammer".to_string(),
                    published_at: "10 minutes ago".to_string(),
                    original: "돈 버는 법 알려드림. 링크 클릭 -> http://...".to_string(),
                    processed: "돈 버는 법 알려드림. 링크 클릭 -> http://...".to_string(),
                    action: Action::Mask,
                    risk_score: 0.85,
                    violation_tags: vec!["AI_SPAM".to_string()],
                },
            ],
        }
    }
}

#[async_trait(?Send)]
impl AnalysisSource for FixtureSource {
    async fn fetch(&self, video_id: &str) -> Result<AnalysisResult, FetchError> {
        info!("[fixture] Fetching analysis for {}", video_id);
        Ok(Self::fixture())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_request_url() {
        let source = LiveSource::new(Client::new(), "http://localhost:8000/", 2);

        let url = source.request_url("abc 123").unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/workflow/analyze-youtube?video_id=abc+123&max_pages=2"
        );
    }

    #[test]
    fn test_request_url_rejects_bad_base() {
        let source = LiveSource::new(Client::new(), "not a url", 1);
        assert!(matches!(source.request_url("x"), Err(FetchError::Transport(_))));
    }

    #[test]
    fn test_fixture_shape() {
        let result = block_on(FixtureSource.fetch("test_video_id")).unwrap();

        assert_eq!(result.stats.total_comments, Some(120));
        assert_eq!(result.stats.filtered_count, Some(15));
        let actions: Vec<Action> = result.comments.iter().map(|c| c.action).collect();
        assert_eq!(actions, vec![Action::Pass, Action::AutoHide, Action::Mask]);
    }
}
